#![warn(clippy::all)]
#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]
#![doc = include_str!("../README.md")]

mod batch;
mod catalog;
pub mod config;
pub mod errors;
pub mod invariants;
mod load;
mod model;
pub mod plot;
mod process;
pub mod protocol;
mod results;
mod setup;

pub use batch::LoadBatch;
pub use catalog::{LoadPathKind, COMMON_PARAMETERS};
pub use config::DriverConfig;
pub use errors::{
    ConfigFileError, ConfigurationError, DriverError, ExecutionError, ParseError, ValidationError,
};
pub use invariants::{SignConvention, StrainInvariants, StressInvariants, Voigt};
pub use load::{Comparator, Load, StopCondition, DEFAULT_STOP_MARKER};
pub use model::DriverModel;
pub use plot::{PlotSeries, PlotUnits, QuadPlot};
pub use process::{DriverProcess, ExternalDriver};
pub use results::{
    DriverResults, ResultTable, StateVariables, STATE_VARIABLE_PATTERN, STRAIN_COLUMNS,
    STRESS_COLUMNS, TIME_COLUMNS,
};
pub use setup::{CleanupReport, ModelSetup, SetupStage, DEFAULT_CLEANUP_EXTENSIONS};
