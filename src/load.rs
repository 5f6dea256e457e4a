//! Validated load stages and their serialization into the driver's load file.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use crate::catalog::{LoadPathKind, COMMON_PARAMETERS};
use crate::errors::ValidationError;
use crate::protocol::write_commented_line;

/// Marker the driver uses to recognise a stop condition in a load header.
pub const DEFAULT_STOP_MARKER: &str = "?";

/// Direction of a stop condition inequality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// The stage ends once the expression drops below the threshold.
    Less,
    /// The stage ends once the expression rises above the threshold.
    Greater,
}

impl Comparator {
    /// Symbol written into the load header.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Comparator::Less => '<',
            Comparator::Greater => '>',
        }
    }
}

/// Symbolic inequality that lets the driver end a stage early.
#[derive(Clone, Debug, PartialEq)]
pub struct StopCondition {
    /// Left-hand side, e.g. `stress(1)` or an expression over several outputs.
    expression: String,
    /// Direction of the inequality.
    comparator: Comparator,
    /// Right-hand threshold.
    value: f64,
    /// Symbol that introduces the condition in the header.
    marker: String,
}

impl StopCondition {
    /// Create a condition `expression <comparator> value` introduced by `marker`.
    #[must_use]
    pub fn new(
        expression: impl Into<String>,
        comparator: Comparator,
        value: f64,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            expression: expression.into(),
            comparator,
            value,
            marker: marker.into(),
        }
    }

    /// Left-hand side of the inequality.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Direction of the inequality.
    #[must_use]
    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    /// Right-hand threshold.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Symbol that introduces the condition.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

impl fmt::Display for StopCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.marker,
            self.expression,
            self.comparator.symbol(),
            self.value
        )
    }
}

/// One stage of an element test, validated against the load path catalog.
///
/// # Examples
/// ```
/// use incdriver::{Comparator, Load, LoadPathKind};
///
/// let mut load = Load::new(
///     LoadPathKind::TriaxialStrain,
///     [("ninc", 100.0), ("maxiter", 1000.0), ("dtime", 1.0), ("every", 1.0), ("ddstran_1", -0.001)],
/// )
/// .expect("parameters match the catalog");
/// load.attach_stop_condition("stress(1)", Comparator::Less, -300.0, "?");
///
/// let mut text = Vec::new();
/// load.write_to(&mut text, 2).unwrap();
/// assert_eq!(
///     String::from_utf8(text).unwrap(),
///     "*TriaxialE1 ? stress(1) < -300\n\
///      100 1000 1 : 1  # ninc maxiter dtime : every\n\
///      -0.001  # ddstran_1\n"
/// );
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Load {
    /// Test protocol of the stage.
    kind: LoadPathKind,
    /// Parameter values keyed by name, exactly the set the catalog requires.
    parameters: BTreeMap<String, f64>,
    /// Optional early termination condition.
    stop_condition: Option<StopCondition>,
}

impl Load {
    /// Build a load after checking `parameters` against the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateParameter`] when a key is repeated and
    /// [`ValidationError::ParameterMismatch`] when the keys are not exactly the set
    /// required by `kind`.
    pub fn new<I, K>(kind: LoadPathKind, parameters: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let mut collected: BTreeMap<String, f64> = BTreeMap::new();
        for (key, value) in parameters {
            match collected.entry(key.into()) {
                Entry::Occupied(entry) => {
                    return Err(ValidationError::DuplicateParameter {
                        kind,
                        name: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(value);
                }
            }
        }
        let parameters = collected;
        kind.validate(parameters.keys().map(String::as_str))?;
        Ok(Self {
            kind,
            parameters,
            stop_condition: None,
        })
    }

    /// Build a load from the driver name of its load path.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownKind`] for names outside the catalog and
    /// [`ValidationError::ParameterMismatch`] for a wrong parameter set.
    pub fn from_name<I, K>(name: &str, parameters: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let kind: LoadPathKind = name.parse()?;
        Self::new(kind, parameters)
    }

    /// Test protocol of the stage.
    #[must_use]
    pub fn kind(&self) -> LoadPathKind {
        self.kind
    }

    /// Value of a single parameter.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.parameters.get(name).copied()
    }

    /// All parameter values keyed by name.
    #[must_use]
    pub fn parameters(&self) -> &BTreeMap<String, f64> {
        &self.parameters
    }

    /// Stop condition attached to the stage, if any.
    #[must_use]
    pub fn stop_condition(&self) -> Option<&StopCondition> {
        self.stop_condition.as_ref()
    }

    /// Attach a stop condition, replacing any condition set before.
    pub fn attach_stop_condition(
        &mut self,
        expression: impl Into<String>,
        comparator: Comparator,
        value: f64,
        marker: impl Into<String>,
    ) {
        self.stop_condition = Some(StopCondition::new(expression, comparator, value, marker));
    }

    /// Builder form of [`Load::attach_stop_condition`].
    #[must_use]
    pub fn with_stop_condition(mut self, condition: StopCondition) -> Self {
        self.stop_condition = Some(condition);
        self
    }

    /// Write the header line, the common values line and the driving value line.
    ///
    /// `gap` is the number of blanks between the data and the inline comments.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `writer`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W, gap: usize) -> io::Result<()> {
        match &self.stop_condition {
            Some(condition) => writeln!(writer, "*{} {}", self.kind, condition)?,
            None => writeln!(writer, "*{}", self.kind)?,
        }

        let [ninc, maxiter, dtime, every] = COMMON_PARAMETERS.map(|key| self.parameters[key]);
        let common = format!("{ninc} {maxiter} {dtime} : {every}");
        write_commented_line(writer, &common, "ninc maxiter dtime : every", gap)?;

        if let Some(key) = self.kind.driving_parameter() {
            write_commented_line(writer, &self.parameters[key], key, gap)?;
        }
        Ok(())
    }
}

impl fmt::Display for Load {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        let mut first = true;
        for key in self.kind.required_parameters() {
            let separator = if first { " (" } else { ", " };
            write!(f, "{separator}{key} = {}", self.parameters[key])?;
            first = false;
        }
        f.write_str(")")?;
        if let Some(condition) = &self.stop_condition {
            write!(f, " until {condition}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> Vec<(&'static str, f64)> {
        vec![("ninc", 50.0), ("maxiter", 200.0), ("dtime", 0.5), ("every", 5.0)]
    }

    fn with(kind: LoadPathKind, extra: &[(&'static str, f64)]) -> Result<Load, ValidationError> {
        let mut parameters = common();
        parameters.extend_from_slice(extra);
        Load::new(kind, parameters)
    }

    fn value_for(key: &str) -> (&'static str, f64) {
        match key {
            "ddstran_1" => ("ddstran_1", -0.001),
            "ddstress_1" => ("ddstress_1", -2.0),
            "ddstran_2" => ("ddstran_2", 0.002),
            "ddstress_2" => ("ddstress_2", 1.5),
            other => panic!("unexpected driving parameter {other}"),
        }
    }

    fn render(load: &Load) -> String {
        let mut buffer = Vec::new();
        load.write_to(&mut buffer, 10).expect("writing to a Vec cannot fail");
        String::from_utf8(buffer).expect("valid utf-8")
    }

    #[test]
    fn every_kind_accepts_exactly_its_required_set() {
        for kind in LoadPathKind::ALL {
            let extra: Vec<_> = kind.driving_parameter().map(value_for).into_iter().collect();
            let load = with(kind, &extra).expect("required set accepted");
            assert_eq!(load.kind(), kind);
            assert_eq!(load.parameters().len(), kind.required_parameters().len());
        }
    }

    #[test]
    fn every_kind_rejects_an_extra_key() {
        for kind in LoadPathKind::ALL {
            let mut extra: Vec<_> = kind.driving_parameter().map(value_for).into_iter().collect();
            extra.push(("temperature", 20.0));
            let error = with(kind, &extra).expect_err("extra key rejected");
            assert!(matches!(
                error,
                ValidationError::ParameterMismatch { ref unexpected, .. } if unexpected == &["temperature"]
            ));
        }
    }

    #[test]
    fn repeated_key_is_rejected_instead_of_overwritten() {
        let error = Load::new(
            LoadPathKind::PureCreep,
            [
                ("ninc", 10.0),
                ("ninc", 999.0),
                ("maxiter", 100.0),
                ("dtime", 1.0),
                ("every", 1.0),
            ],
        )
        .expect_err("repeated key rejected");
        assert_eq!(
            error,
            ValidationError::DuplicateParameter {
                kind: LoadPathKind::PureCreep,
                name: "ninc".to_string(),
            }
        );
    }

    #[test]
    fn every_kind_rejects_any_missing_key() {
        for kind in LoadPathKind::ALL {
            let mut full = common();
            full.extend(kind.driving_parameter().map(value_for));
            for skipped in 0..full.len() {
                let partial: Vec<_> = full
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != skipped)
                    .map(|(_, pair)| *pair)
                    .collect();
                let error = Load::new(kind, partial).expect_err("missing key rejected");
                match error {
                    ValidationError::ParameterMismatch { missing, .. } => {
                        assert_eq!(missing, vec![full[skipped].0.to_string()]);
                    }
                    other => panic!("unexpected error: {other:?}"),
                }
            }
        }
    }

    #[test]
    fn from_name_rejects_unknown_paths() {
        let error = Load::from_name("Cyclic", common()).expect_err("unknown path rejected");
        assert!(matches!(error, ValidationError::UnknownKind { .. }));
    }

    #[test]
    fn header_has_no_suffix_without_stop_condition() {
        let load = with(LoadPathKind::PureCreep, &[]).expect("valid load");
        let text = render(&load);
        assert_eq!(
            text,
            "*PureCreep\n50 200 0.5 : 5          # ninc maxiter dtime : every\n"
        );
    }

    #[test]
    fn driving_value_follows_common_line() {
        let load = with(LoadPathKind::TriaxialUndrainedStress, &[("ddstress_2", 1.5)])
            .expect("valid load");
        let lines: Vec<String> = render(&load).lines().map(str::to_string).collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "*TriaxialUq");
        assert_eq!(lines[2], "1.5          # ddstress_2");
    }

    #[test]
    fn stop_condition_is_written_verbatim_in_header() {
        let mut load = with(LoadPathKind::OedometricStress, &[("ddstress_1", -2.0)])
            .expect("valid load");
        load.attach_stop_condition("stress(1)+stress(2)", Comparator::Greater, 400.0, "$");
        let text = render(&load);
        assert!(text.starts_with("*OedometricS1 $ stress(1)+stress(2) > 400\n"));
    }

    #[test]
    fn later_stop_condition_replaces_earlier_one() {
        let mut load = with(LoadPathKind::TriaxialStrain, &[("ddstran_1", -0.001)])
            .expect("valid load");
        load.attach_stop_condition("stress(1)", Comparator::Less, -300.0, DEFAULT_STOP_MARKER);
        load.attach_stop_condition("stran(1)", Comparator::Less, -0.2, DEFAULT_STOP_MARKER);

        let condition = load.stop_condition().expect("condition stored");
        assert_eq!(condition.expression(), "stran(1)");
        let header = render(&load).lines().next().map(str::to_string);
        assert_eq!(header.as_deref(), Some("*TriaxialE1 ? stran(1) < -0.2"));
    }

    #[test]
    fn display_lists_parameters_in_catalog_order() {
        let load = with(LoadPathKind::TriaxialStrain, &[("ddstran_1", -0.001)])
            .expect("valid load")
            .with_stop_condition(StopCondition::new("stran(1)", Comparator::Less, -0.1, "?"));
        assert_eq!(
            load.to_string(),
            "TriaxialE1 (ninc = 50, maxiter = 200, dtime = 0.5, every = 5, ddstran_1 = -0.001) until ? stran(1) < -0.1"
        );
    }
}
