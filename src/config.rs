//! Element test descriptions read from TOML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::errors::{ConfigFileError, ConfigurationError, DriverError, ValidationError};
use crate::load::{Comparator, Load, StopCondition, DEFAULT_STOP_MARKER};
use crate::process::ExternalDriver;
use crate::protocol::{DEFAULT_LOADS_FILE, DEFAULT_OUTPUT_FILE};
use crate::setup::ModelSetup;

/// Complete description of one element test.
///
/// # Examples
/// ```
/// use incdriver::DriverConfig;
///
/// let config = DriverConfig::from_toml_str(r#"
///     initial_stress = [-100.0, -100.0, -100.0, 0.0, 0.0, 0.0]
///
///     [model]
///     name = "NAMC"
///     folder = "runs/creep"
///
///     [[loads]]
///     kind = "PureCreep"
///     parameters = { ninc = 10, maxiter = 100, dtime = 1.0, every = 1 }
/// "#).unwrap();
/// let setup = config.build_setup().unwrap();
/// assert_eq!(setup.loads().len(), 1);
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriverConfig {
    /// Model and file locations.
    pub model: ModelSection,
    /// Material properties in the order the model reads them.
    #[serde(default)]
    pub properties: Vec<NamedValue>,
    /// Initial stress in driver order, tension positive.
    pub initial_stress: Vec<f64>,
    /// Initial state variables in the order the model reads them.
    #[serde(default)]
    pub state_variables: Vec<NamedValue>,
    /// Stages in execution order.
    #[serde(default)]
    pub loads: Vec<LoadSpec>,
}

/// The `[model]` table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelSection {
    /// Name written at the top of `parameters.inp`.
    pub name: String,
    /// Folder receiving the input and output files.
    pub folder: PathBuf,
    /// Driver executable, required only to run.
    #[serde(default)]
    pub executable: Option<PathBuf>,
    /// Name of the output table.
    #[serde(default = "default_output_file")]
    pub output_file: String,
    /// Name of the load file.
    #[serde(default = "default_loads_file")]
    pub loads_file: String,
}

/// Default output table name.
fn default_output_file() -> String {
    DEFAULT_OUTPUT_FILE.to_string()
}

/// Default load file name.
fn default_loads_file() -> String {
    DEFAULT_LOADS_FILE.to_string()
}

/// A named scalar, used for properties and state variables.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamedValue {
    /// Label written as the inline comment.
    pub name: String,
    /// Value written to the file.
    pub value: f64,
}

/// One `[[loads]]` entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadSpec {
    /// Driver name of the load path.
    pub kind: String,
    /// Parameter values keyed by name.
    pub parameters: BTreeMap<String, f64>,
    /// Optional early stop.
    #[serde(default)]
    pub stop: Option<StopSpec>,
}

/// Stop condition of a `[[loads]]` entry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopSpec {
    /// Left-hand side of the inequality.
    pub expression: String,
    /// `less` or `greater`.
    pub comparator: Comparator,
    /// Threshold.
    pub value: f64,
    /// Symbol introducing the condition.
    #[serde(default = "default_marker")]
    pub marker: String,
}

/// Default stop condition marker.
fn default_marker() -> String {
    DEFAULT_STOP_MARKER.to_string()
}

impl LoadSpec {
    /// Validate the entry into a [`Load`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for an unknown kind or a wrong parameter set.
    pub fn build(&self) -> Result<Load, ValidationError> {
        let load = Load::from_name(
            &self.kind,
            self.parameters
                .iter()
                .map(|(name, value)| (name.as_str(), *value)),
        )?;
        Ok(match &self.stop {
            Some(stop) => load.with_stop_condition(StopCondition::new(
                stop.expression.as_str(),
                stop.comparator,
                stop.value,
                stop.marker.as_str(),
            )),
            None => load,
        })
    }
}

impl DriverConfig {
    /// Parse a configuration from TOML text. Paths are kept as written.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Toml`] when the text is not a valid description.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigFileError> {
        Ok(toml::from_str(text)?)
    }

    /// Read a configuration file.
    ///
    /// Relative `folder` and `executable` paths are resolved against the directory of
    /// the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::Io`] when the file cannot be read and
    /// [`ConfigFileError::Toml`] when it is not a valid description.
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let io_error = |source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        };
        let text = fs::read_to_string(path).map_err(io_error)?;
        let mut config = Self::from_toml_str(&text)?;

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let base = parent.canonicalize().map_err(io_error)?;
        config.model.folder = base.join(&config.model.folder);
        if let Some(executable) = config.model.executable.take() {
            config.model.executable = Some(base.join(executable));
        }
        debug!(
            path = %path.display(),
            folder = %config.model.folder.display(),
            loads = config.loads.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Properties as `(name, value)` pairs.
    #[must_use]
    pub fn properties(&self) -> Vec<(&str, f64)> {
        pairs(&self.properties)
    }

    /// State variables as `(name, value)` pairs.
    #[must_use]
    pub fn state_variables(&self) -> Vec<(&str, f64)> {
        pairs(&self.state_variables)
    }

    /// The initial stress as six components.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidInitialStress`] unless exactly six
    /// components are given.
    pub fn initial_stress(&self) -> Result<[f64; 6], ConfigurationError> {
        <[f64; 6]>::try_from(self.initial_stress.as_slice())
            .map_err(|_| ConfigurationError::InvalidInitialStress(self.initial_stress.len()))
    }

    /// Validate every load entry, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] of the first invalid entry.
    pub fn build_loads(&self) -> Result<Vec<Load>, ValidationError> {
        self.loads.iter().map(LoadSpec::build).collect()
    }

    /// Create the setup with every load attached. Nothing is written yet.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Validation`] when a load entry is invalid.
    pub fn build_setup(&self) -> Result<ModelSetup, DriverError> {
        let mut setup = ModelSetup::new(&self.model.folder, self.model.name.as_str())
            .with_output_file(self.model.output_file.as_str())
            .with_loads_file(self.model.loads_file.as_str());
        setup.add_loads(self.build_loads()?);
        Ok(setup)
    }

    /// Create the setup and write its three input files.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError`] when a load is invalid, the initial stress is malformed,
    /// there are no loads or a file cannot be written.
    pub fn write_inputs(&self) -> Result<ModelSetup, DriverError> {
        let stress = self.initial_stress()?;
        let mut setup = self.build_setup()?;
        setup.write_parameters_file(self.properties())?;
        setup.write_initial_conditions_file(&stress, self.state_variables())?;
        setup.write_loads()?;
        Ok(setup)
    }

    /// The driver named in the `[model]` table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingExecutable`] when no executable is set.
    pub fn process(&self) -> Result<ExternalDriver, ConfigurationError> {
        self.model
            .executable
            .as_ref()
            .map(ExternalDriver::new)
            .ok_or(ConfigurationError::MissingExecutable)
    }
}

/// Borrow named values as pairs.
fn pairs(values: &[NamedValue]) -> Vec<(&str, f64)> {
    values
        .iter()
        .map(|entry| (entry.name.as_str(), entry.value))
        .collect()
}
