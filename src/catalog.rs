//! Catalog of the load paths ("popular paths") understood by the incremental driver.
//!
//! The catalog is the only place that knows which parameters a load path needs. The
//! load writer asks it for the driving parameter instead of matching on kinds itself.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::ValidationError;

/// Parameters shared by every load path, in the order they are written.
pub const COMMON_PARAMETERS: [&str; 4] = ["ninc", "maxiter", "dtime", "every"];

/// Standard element test protocols accepted by the driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoadPathKind {
    /// Oedometric compression with a prescribed axial strain increment.
    OedometricStrain,
    /// Oedometric compression with a prescribed axial stress increment.
    OedometricStress,
    /// Drained triaxial test with a prescribed axial strain increment.
    TriaxialStrain,
    /// Drained triaxial test with a prescribed axial stress increment.
    TriaxialStress,
    /// Undrained triaxial test driven by a deviatoric strain increment.
    TriaxialUndrainedStrain,
    /// Undrained triaxial test driven by a deviatoric stress increment.
    TriaxialUndrainedStress,
    /// Stress relaxation at constant strain.
    PureRelaxation,
    /// Creep at constant stress.
    PureCreep,
    /// Creep at constant volume.
    UndrainedCreep,
}

impl LoadPathKind {
    /// Every load path in the catalog.
    pub const ALL: [LoadPathKind; 9] = [
        LoadPathKind::OedometricStrain,
        LoadPathKind::OedometricStress,
        LoadPathKind::TriaxialStrain,
        LoadPathKind::TriaxialStress,
        LoadPathKind::TriaxialUndrainedStrain,
        LoadPathKind::TriaxialUndrainedStress,
        LoadPathKind::PureRelaxation,
        LoadPathKind::PureCreep,
        LoadPathKind::UndrainedCreep,
    ];

    /// Name used by the driver in the load header line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LoadPathKind::OedometricStrain => "OedometricE1",
            LoadPathKind::OedometricStress => "OedometricS1",
            LoadPathKind::TriaxialStrain => "TriaxialE1",
            LoadPathKind::TriaxialStress => "TriaxialS1",
            LoadPathKind::TriaxialUndrainedStrain => "TriaxialUEq",
            LoadPathKind::TriaxialUndrainedStress => "TriaxialUq",
            LoadPathKind::PureRelaxation => "PureRelaxation",
            LoadPathKind::PureCreep => "PureCreep",
            LoadPathKind::UndrainedCreep => "UndrainedCreep",
        }
    }

    /// Short description of the protocol.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            LoadPathKind::OedometricStrain => "oedometric, axial strain controlled",
            LoadPathKind::OedometricStress => "oedometric, axial stress controlled",
            LoadPathKind::TriaxialStrain => "drained triaxial, axial strain controlled",
            LoadPathKind::TriaxialStress => "drained triaxial, axial stress controlled",
            LoadPathKind::TriaxialUndrainedStrain => "undrained triaxial, deviatoric strain controlled",
            LoadPathKind::TriaxialUndrainedStress => "undrained triaxial, deviatoric stress controlled",
            LoadPathKind::PureRelaxation => "relaxation at constant strain",
            LoadPathKind::PureCreep => "creep at constant stress",
            LoadPathKind::UndrainedCreep => "creep at constant volume",
        }
    }

    /// Stress or strain increment that drives the path, if the path has one.
    ///
    /// Oedometric paths keep the lateral strain constant and drained triaxial paths keep
    /// the lateral stress constant. Undrained paths hold the volume and apply Roscoe's
    /// deviatoric increment.
    #[must_use]
    pub const fn driving_parameter(self) -> Option<&'static str> {
        match self {
            LoadPathKind::OedometricStrain | LoadPathKind::TriaxialStrain => Some("ddstran_1"),
            LoadPathKind::OedometricStress | LoadPathKind::TriaxialStress => Some("ddstress_1"),
            LoadPathKind::TriaxialUndrainedStrain => Some("ddstran_2"),
            LoadPathKind::TriaxialUndrainedStress => Some("ddstress_2"),
            LoadPathKind::PureRelaxation
            | LoadPathKind::PureCreep
            | LoadPathKind::UndrainedCreep => None,
        }
    }

    /// Full set of parameters the path requires.
    ///
    /// # Examples
    /// ```
    /// use incdriver::LoadPathKind;
    ///
    /// let required = LoadPathKind::TriaxialStrain.required_parameters();
    /// assert_eq!(required, ["ninc", "maxiter", "dtime", "every", "ddstran_1"]);
    /// ```
    #[must_use]
    pub fn required_parameters(self) -> Vec<&'static str> {
        COMMON_PARAMETERS
            .iter()
            .copied()
            .chain(self.driving_parameter())
            .collect()
    }

    /// Check that `keys` is exactly the required parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::ParameterMismatch`] when a required key is missing or
    /// an extra key is present.
    pub fn validate<'a, I>(self, keys: I) -> Result<(), ValidationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let supplied: BTreeSet<&str> = keys.into_iter().collect();
        let expected = self.required_parameters();

        let missing: Vec<String> = expected
            .iter()
            .filter(|key| !supplied.contains(**key))
            .map(|key| (*key).to_string())
            .collect();
        let unexpected: Vec<String> = supplied
            .iter()
            .filter(|key| !expected.iter().any(|required| required == *key))
            .map(|key| (*key).to_string())
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::ParameterMismatch {
                kind: self,
                expected,
                missing,
                unexpected,
            })
        }
    }

    /// Names of every path in the catalog.
    #[must_use]
    pub fn names() -> Vec<&'static str> {
        LoadPathKind::ALL.iter().map(|kind| kind.name()).collect()
    }
}

impl fmt::Display for LoadPathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LoadPathKind {
    type Err = ValidationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        LoadPathKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| ValidationError::UnknownKind {
                name: name.to_string(),
                allowed: LoadPathKind::names(),
            })
    }
}
