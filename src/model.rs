//! A prepared setup bundled with the process that runs it.

use std::path::PathBuf;

use crate::errors::DriverError;
use crate::process::{DriverProcess, ExternalDriver};
use crate::results::DriverResults;
use crate::setup::ModelSetup;

/// Setup plus driver, ready to run and read back.
#[derive(Debug)]
pub struct DriverModel<P: DriverProcess = ExternalDriver> {
    /// Input files and load stages.
    pub setup: ModelSetup,
    /// Driver that executes the run.
    pub process: P,
}

impl<P: DriverProcess> DriverModel<P> {
    /// Bundle `setup` with `process`.
    #[must_use]
    pub fn new(setup: ModelSetup, process: P) -> Self {
        Self { setup, process }
    }

    /// Run the driver on the setup's folder.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when input files are missing or the run fails.
    pub fn run_model(&mut self) -> Result<(), DriverError> {
        self.setup.run(&self.process)
    }

    /// Location of the output table.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.setup.output_path()
    }

    /// Read the output table of the last run.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Parse`] when the table is missing or malformed.
    pub fn load_results(&self) -> Result<DriverResults, DriverError> {
        Ok(DriverResults::load(&self.output_path())?)
    }
}
