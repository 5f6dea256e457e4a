//! Execution of the external incremental driver.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{info, warn};

use crate::errors::ExecutionError;

/// Something that can run the driver on a folder of input files.
///
/// The call blocks until the run is over. No timeout is applied, so a driver that
/// never returns blocks the caller.
pub trait DriverProcess {
    /// Run the driver with `working_dir` as its working directory.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutionError`] when the run cannot be started or does not succeed.
    fn execute(&self, working_dir: &Path) -> Result<(), ExecutionError>;
}

/// The driver as an executable on disk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalDriver {
    /// Location of the executable.
    executable: PathBuf,
    /// Extra command line arguments.
    args: Vec<OsString>,
}

impl ExternalDriver {
    /// Wrap the executable at `executable`.
    ///
    /// Relative paths are resolved by the operating system against the working
    /// directory of the run, so prefer absolute paths.
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            args: Vec::new(),
        }
    }

    /// Pass extra arguments to the executable.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Location of the executable.
    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }
}

impl DriverProcess for ExternalDriver {
    fn execute(&self, working_dir: &Path) -> Result<(), ExecutionError> {
        info!(
            program = %self.executable.display(),
            folder = %working_dir.display(),
            "running incremental driver"
        );
        let status = Command::new(&self.executable)
            .args(&self.args)
            .current_dir(working_dir)
            .stdin(Stdio::null())
            .status()
            .map_err(|source| ExecutionError::Spawn {
                program: self.executable.clone(),
                source,
            })?;

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => {
                warn!(program = %self.executable.display(), code, "incremental driver failed");
                Err(ExecutionError::NonZeroExit {
                    program: self.executable.clone(),
                    code,
                })
            }
            None => Err(ExecutionError::Terminated {
                program: self.executable.clone(),
            }),
        }
    }
}
