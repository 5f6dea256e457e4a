//! Input file emission and run orchestration for one driver test.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::batch::LoadBatch;
use crate::errors::{ConfigurationError, DriverError};
use crate::load::Load;
use crate::process::DriverProcess;
use crate::protocol::{
    write_commented_line, DEFAULT_COMMENT_GAP, DEFAULT_LOADS_FILE, DEFAULT_OUTPUT_FILE,
    END_MARKER, INITIAL_CONDITIONS_COMMENT_GAP, INITIAL_CONDITIONS_FILE, PARAMETERS_FILE,
    STRESS_LABELS,
};

/// File extensions removed by a default folder cleanup.
pub const DEFAULT_CLEANUP_EXTENSIONS: [&str; 3] = ["inp", "bat", "txt"];

/// Progress of a setup towards a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetupStage {
    /// No loads stored yet.
    Unconfigured,
    /// Loads stored, input files missing or stale.
    LoadsAttached,
    /// All three input files written for the current loads.
    FilesWritten,
    /// The driver ran on the current input files.
    Executed,
}

/// Which input files are current.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct WrittenFiles {
    /// `parameters.inp` is current.
    parameters: bool,
    /// `initialconditions.inp` is current.
    initial_conditions: bool,
    /// The load file is current.
    loads: bool,
}

/// Outcome of [`ModelSetup::clear_folder`].
#[derive(Debug, Default)]
pub struct CleanupReport {
    /// Files that were removed.
    pub deleted: Vec<PathBuf>,
    /// Files that could not be removed, with the reason.
    pub failed: Vec<(PathBuf, io::Error)>,
}

impl CleanupReport {
    /// Whether every matching file was removed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Writes the driver input files for one constitutive model and runs the driver.
///
/// All files live in one target folder. Nothing depends on the process working
/// directory.
///
/// # Examples
/// ```no_run
/// use incdriver::{ExternalDriver, Load, LoadPathKind, ModelSetup};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut setup = ModelSetup::new("runs/triaxial", "NAMC");
/// setup.add_load(Load::new(
///     LoadPathKind::TriaxialStrain,
///     [("ninc", 100.0), ("maxiter", 1000.0), ("dtime", 1.0), ("every", 1.0), ("ddstran_1", -0.001)],
/// )?);
/// setup.write_parameters_file([("G", 100.0), ("nu", 0.3)])?;
/// setup.write_initial_conditions_file(&[-100.0, -100.0, -100.0, 0.0, 0.0, 0.0], [("e", 0.7)])?;
/// setup.write_loads()?;
/// setup.run(&ExternalDriver::new("/opt/driver/incrementalDriver"))?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ModelSetup {
    /// Name of the constitutive model, first line of the parameters file.
    model_name: String,
    /// Folder holding the input and output files.
    folder: PathBuf,
    /// Name of the table the driver writes.
    output_file: String,
    /// Name of the load file.
    loads_file: String,
    /// Blanks before comments in the parameters and load files.
    comment_gap: usize,
    /// Blanks before comments in the initial conditions file.
    initial_conditions_gap: usize,
    /// Loads in execution order.
    loads: LoadBatch,
    /// Which input files are current.
    written: WrittenFiles,
    /// Whether the driver ran on the current files.
    executed: bool,
}

impl ModelSetup {
    /// Create a setup writing into `folder` for the model `model_name`.
    #[must_use]
    pub fn new(folder: impl Into<PathBuf>, model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
            folder: folder.into(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            loads_file: DEFAULT_LOADS_FILE.to_string(),
            comment_gap: DEFAULT_COMMENT_GAP,
            initial_conditions_gap: INITIAL_CONDITIONS_COMMENT_GAP,
            loads: LoadBatch::new(),
            written: WrittenFiles::default(),
            executed: false,
        }
    }

    /// Use `name` for the driver output table.
    #[must_use]
    pub fn with_output_file(mut self, name: impl Into<String>) -> Self {
        self.output_file = name.into();
        self
    }

    /// Use `name` for the load file.
    #[must_use]
    pub fn with_loads_file(mut self, name: impl Into<String>) -> Self {
        self.loads_file = name.into();
        self
    }

    /// Put `gap` blanks before the comments of the parameters and load files.
    #[must_use]
    pub fn with_comment_gap(mut self, gap: usize) -> Self {
        self.comment_gap = gap;
        self
    }

    /// Put `gap` blanks before the comments of the initial conditions file.
    #[must_use]
    pub fn with_initial_conditions_gap(mut self, gap: usize) -> Self {
        self.initial_conditions_gap = gap;
        self
    }

    /// Name of the constitutive model.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Folder holding the input and output files.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Name of the driver output table.
    #[must_use]
    pub fn output_file(&self) -> &str {
        &self.output_file
    }

    /// Full path of the driver output table.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.folder.join(&self.output_file)
    }

    /// Name of the load file.
    #[must_use]
    pub fn loads_file(&self) -> &str {
        &self.loads_file
    }

    /// Stored loads.
    #[must_use]
    pub fn loads(&self) -> &LoadBatch {
        &self.loads
    }

    /// Current progress of the setup.
    #[must_use]
    pub fn stage(&self) -> SetupStage {
        let WrittenFiles {
            parameters,
            initial_conditions,
            loads,
        } = self.written;
        if self.executed {
            SetupStage::Executed
        } else if parameters && initial_conditions && loads {
            SetupStage::FilesWritten
        } else if self.loads.is_empty() {
            SetupStage::Unconfigured
        } else {
            SetupStage::LoadsAttached
        }
    }

    /// Append one load.
    pub fn add_load(&mut self, load: Load) {
        self.invalidate_loads();
        self.loads.push(load);
    }

    /// Append several loads, keeping their order. Accepts a [`LoadBatch`] by value.
    pub fn add_loads<I: IntoIterator<Item = Load>>(&mut self, loads: I) {
        self.invalidate_loads();
        self.loads.extend(loads);
    }

    /// Remove every stored load.
    pub fn clear_loads(&mut self) {
        self.invalidate_loads();
        self.loads.clear();
    }

    /// Write `parameters.inp`: model name, property count and one value per property.
    ///
    /// Properties are written in the order given because the driver reads them by
    /// position.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Io`] when the file cannot be written.
    pub fn write_parameters_file<I, K>(&mut self, properties: I) -> Result<PathBuf, DriverError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let properties: Vec<(K, f64)> = properties.into_iter().collect();
        let gap = self.comment_gap;
        let path = self.write_file(PARAMETERS_FILE, |writer| {
            write_commented_line(writer, self.model_name.as_str(), "Model name", gap)?;
            write_commented_line(writer, &properties.len(), "Number of properties", gap)?;
            for (name, value) in &properties {
                write_commented_line(writer, value, name.as_ref(), gap)?;
            }
            Ok(())
        })?;
        self.written.parameters = true;
        self.executed = false;
        Ok(path)
    }

    /// Write `initialconditions.inp`: six stress components and the state variables.
    ///
    /// The state variable count is always written, including when it is zero.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Io`] when the file cannot be written.
    pub fn write_initial_conditions_file<I, K>(
        &mut self,
        stress: &[f64; 6],
        state_variables: I,
    ) -> Result<PathBuf, DriverError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let state_variables: Vec<(K, f64)> = state_variables.into_iter().collect();
        let gap = self.initial_conditions_gap;
        let path = self.write_file(INITIAL_CONDITIONS_FILE, |writer| {
            write_commented_line(writer, &stress.len(), "ntens, tension is positive", gap)?;
            for (value, label) in stress.iter().zip(STRESS_LABELS) {
                write_commented_line(writer, value, label, gap)?;
            }
            write_commented_line(
                writer,
                &state_variables.len(),
                "Number of state variables",
                gap,
            )?;
            for (name, value) in &state_variables {
                let comment = format!("{} - init value", name.as_ref());
                write_commented_line(writer, value, &comment, gap)?;
            }
            Ok(())
        })?;
        self.written.initial_conditions = true;
        self.executed = false;
        Ok(path)
    }

    /// Write the load file: output table name, every load in order and `*End`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::EmptyLoadBatch`] when no loads are stored and
    /// [`DriverError::Io`] when the file cannot be written.
    pub fn write_loads(&mut self) -> Result<PathBuf, DriverError> {
        if self.loads.is_empty() {
            return Err(ConfigurationError::EmptyLoadBatch.into());
        }
        let gap = self.comment_gap;
        let path = self.write_file(&self.loads_file, |writer| {
            writeln!(writer, "{}", self.output_file)?;
            self.loads.write_to(writer, gap)?;
            write!(writer, "{END_MARKER}")
        })?;
        self.written.loads = true;
        self.executed = false;
        Ok(path)
    }

    /// Run the driver on the written input files and wait for it to finish.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::FilesNotWritten`] when an input file is missing or
    /// stale and [`DriverError::Execution`] when the driver fails.
    pub fn run(&mut self, process: &dyn DriverProcess) -> Result<(), DriverError> {
        let missing = self.missing_files();
        if !missing.is_empty() {
            return Err(ConfigurationError::FilesNotWritten { missing }.into());
        }
        process.execute(&self.folder)?;
        info!(model = %self.model_name, folder = %self.folder.display(), "driver run finished");
        self.executed = true;
        Ok(())
    }

    /// Delete every file in the folder whose extension is one of `extensions`.
    ///
    /// A file that cannot be removed is logged and reported without stopping the pass.
    /// A missing folder has nothing to clean.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Io`] when the folder exists but cannot be listed.
    pub fn clear_folder(&mut self, extensions: &[&str]) -> Result<CleanupReport, DriverError> {
        self.clear_folder_with(extensions, |path| fs::remove_file(path))
    }

    /// Cleanup pass with `remove` deleting each matching file.
    fn clear_folder_with<F>(
        &mut self,
        extensions: &[&str],
        mut remove: F,
    ) -> Result<CleanupReport, DriverError>
    where
        F: FnMut(&Path) -> io::Result<()>,
    {
        let mut report = CleanupReport::default();
        let entries = match fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(report),
            Err(source) => {
                return Err(DriverError::Io {
                    path: self.folder.clone(),
                    source,
                })
            }
        };

        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(error) => {
                    warn!(folder = %self.folder.display(), %error, "cannot read folder entry");
                    continue;
                }
            };
            let matches = path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| extensions.contains(&ext));
            if !matches {
                continue;
            }
            match remove(&path) {
                Ok(()) => {
                    info!(path = %path.display(), "deleted");
                    self.forget_file(&path);
                    report.deleted.push(path);
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "cannot delete file");
                    report.failed.push((path, error));
                }
            }
        }
        Ok(report)
    }

    /// Create `file_name` in the folder and fill it with `body`.
    fn write_file<F>(&self, file_name: &str, body: F) -> Result<PathBuf, DriverError>
    where
        F: FnOnce(&mut BufWriter<File>) -> io::Result<()>,
    {
        fs::create_dir_all(&self.folder).map_err(|source| DriverError::Io {
            path: self.folder.clone(),
            source,
        })?;
        let path = self.folder.join(file_name);
        let result = File::create(&path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            body(&mut writer)?;
            writer.flush()
        });
        match result {
            Ok(()) => {
                debug!(path = %path.display(), "input file written");
                Ok(path)
            }
            Err(source) => Err(DriverError::Io { path, source }),
        }
    }

    /// Names of the input files that are not current.
    fn missing_files(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if !self.written.parameters {
            missing.push(PARAMETERS_FILE.to_string());
        }
        if !self.written.initial_conditions {
            missing.push(INITIAL_CONDITIONS_FILE.to_string());
        }
        if !self.written.loads {
            missing.push(self.loads_file.clone());
        }
        missing
    }

    /// Mark the load file stale after the loads change.
    fn invalidate_loads(&mut self) {
        self.written.loads = false;
        self.executed = false;
    }

    /// Mark an input file stale after it was deleted.
    fn forget_file(&mut self, path: &Path) {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            return;
        };
        if name == PARAMETERS_FILE {
            self.written.parameters = false;
        } else if name == INITIAL_CONDITIONS_FILE {
            self.written.initial_conditions = false;
        } else if name == self.loads_file {
            self.written.loads = false;
        } else {
            return;
        }
        self.executed = false;
    }
}

impl fmt::Display for ModelSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Constitutive model name: {}", self.model_name)?;
        writeln!(f, "Folder path: {}", self.folder.display())?;
        write!(f, "Number of stored loads: {}", self.loads.len())
    }
}
