//! Error types produced while describing, writing, running and reading driver tests.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::LoadPathKind;

/// Error returned when a load cannot be built from the supplied description.
///
/// # Examples
///
/// ```
/// use incdriver::{Load, ValidationError};
///
/// let error = Load::from_name("SimpleShear", [("ninc", 10.0)])
///     .expect_err("unknown load path is rejected");
/// assert!(matches!(error, ValidationError::UnknownKind { .. }));
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Returned when the load path name is not part of the catalog.
    #[error("`{name}` is not a known load path; allowed paths are: {}", .allowed.join(", "))]
    UnknownKind {
        /// Name that was requested.
        name: String,
        /// Every name the catalog accepts.
        allowed: Vec<&'static str>,
    },
    /// Returned when the parameter keys differ from the set the load path requires.
    #[error(
        "load path {kind} expects parameters [{}] (missing: [{}], unexpected: [{}])",
        .expected.join(", "),
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    ParameterMismatch {
        /// Load path being validated.
        kind: LoadPathKind,
        /// Parameters the load path requires.
        expected: Vec<&'static str>,
        /// Required parameters absent from the input.
        missing: Vec<String>,
        /// Supplied parameters the load path does not accept.
        unexpected: Vec<String>,
    },
    /// Returned when the same parameter is supplied more than once.
    #[error("load path {kind} received parameter `{name}` more than once")]
    DuplicateParameter {
        /// Load path being validated.
        kind: LoadPathKind,
        /// Repeated parameter name.
        name: String,
    },
}

/// Error returned when a setup is asked to do something its current state does not allow.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Returned when the load file is requested while no loads are stored.
    #[error("no loads stored in the setup; add at least one load before writing the load file")]
    EmptyLoadBatch,
    /// Returned when the driver is run before every input file has been written.
    #[error("input files not written yet: {}", .missing.join(", "))]
    FilesNotWritten {
        /// Input files that still have to be written.
        missing: Vec<String>,
    },
    /// Returned when an initial stress does not have six Cartesian components.
    #[error("initial stress needs 6 components (received {0})")]
    InvalidInitialStress(usize),
    /// Returned when a run is requested without an executable to run.
    #[error("no incremental driver executable configured")]
    MissingExecutable,
}

/// Error returned when the driver output table cannot be read.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Returned when the output file cannot be opened or read.
    #[error("cannot read output table {}: {source}", .path.display())]
    Io {
        /// Location of the output table.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Returned when the table has no header row.
    #[error("output table has no header row")]
    EmptyHeader,
    /// Returned when a data row has a different number of values than the header.
    #[error("line {line}: expected {expected} values, found {found}")]
    RaggedRow {
        /// One-based line number in the file.
        line: usize,
        /// Number of header columns.
        expected: usize,
        /// Number of values on the line.
        found: usize,
    },
    /// Returned when a value cannot be read as a number.
    #[error("line {line}: column `{column}` holds `{token}`, which is not a number")]
    InvalidNumber {
        /// One-based line number in the file.
        line: usize,
        /// Column the value belongs to.
        column: String,
        /// Offending text.
        token: String,
    },
    /// Returned when the header names the same column twice.
    #[error("column `{0}` appears more than once in the header")]
    DuplicateColumn(String),
    /// Returned when a required column is absent.
    #[error("column `{0}` is not present in the output table")]
    MissingColumn(String),
}

/// Error returned when the external driver executable fails.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// Returned when the process cannot be started.
    #[error("cannot start {}: {source}", .program.display())]
    Spawn {
        /// Executable that was launched.
        program: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Returned when the process exits with a non-zero status.
    #[error("{} exited with status {code}", .program.display())]
    NonZeroExit {
        /// Executable that was launched.
        program: PathBuf,
        /// Reported exit code.
        code: i32,
    },
    /// Returned when the process ends without an exit code, e.g. killed by a signal.
    #[error("{} was terminated before reporting an exit status", .program.display())]
    Terminated {
        /// Executable that was launched.
        program: PathBuf,
    },
}

/// Error returned when a test configuration file cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Returned when the file cannot be read.
    #[error("cannot read configuration {}: {source}", .path.display())]
    Io {
        /// Location of the configuration file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// Returned when the file is not a valid test description.
    #[error("invalid configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Umbrella error for operations that touch several stages of a driver run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// A load failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The setup was used out of order.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// The output table could not be read.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The external driver failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// The configuration file could not be loaded.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),
    /// A required input file could not be written.
    #[error("cannot write {}: {source}", .path.display())]
    Io {
        /// File or folder being written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
}
