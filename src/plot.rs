//! Chart-ready series derived from driver results.
//!
//! Nothing is drawn here. The series are plain data that can be serialized and handed to
//! an external plotting tool.

use serde::Serialize;

use crate::invariants::SignConvention;
use crate::results::DriverResults;

/// Unit labels used in axis titles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlotUnits {
    /// Unit of stress values.
    pub stress: String,
    /// Unit of strain values.
    pub strain: String,
}

impl Default for PlotUnits {
    fn default() -> Self {
        Self {
            stress: "kPa".to_string(),
            strain: "-".to_string(),
        }
    }
}

/// One x/y line with its labels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlotSeries {
    /// Chart title.
    pub title: String,
    /// Horizontal axis label, unit included.
    pub x_label: String,
    /// Vertical axis label, unit included.
    pub y_label: String,
    /// Horizontal values.
    pub x: Vec<f64>,
    /// Vertical values, same length as `x`.
    pub y: Vec<f64>,
}

impl PlotSeries {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Axis label with its unit in brackets.
fn label(name: &str, unit: &str) -> String {
    format!("{name} [{unit}]")
}

/// Standard 2x2 element test chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct QuadPlot {
    /// Sign convention used for p, ev and ea.
    pub convention: SignConvention,
    /// Deviatoric stress against axial strain.
    pub q_axial_strain: PlotSeries,
    /// Deviatoric stress against mean stress.
    pub q_p: PlotSeries,
    /// Volumetric strain against axial strain.
    pub volumetric_axial_strain: PlotSeries,
    /// Volumetric strain against mean stress.
    pub volumetric_p: PlotSeries,
}

impl QuadPlot {
    /// Build the four panels from `results`.
    ///
    /// # Examples
    /// ```no_run
    /// use std::path::Path;
    /// use incdriver::{DriverResults, PlotUnits, QuadPlot, SignConvention};
    ///
    /// let results = DriverResults::load(Path::new("runs/triaxial/output.txt")).unwrap();
    /// let chart = QuadPlot::new(&results, SignConvention::default(), &PlotUnits::default());
    /// println!("{}", serde_json::to_string_pretty(&chart).unwrap());
    /// ```
    #[must_use]
    pub fn new(results: &DriverResults, convention: SignConvention, units: &PlotUnits) -> Self {
        let p = results.mean_stress(convention);
        let q = results.deviatoric_stress();
        let ev = results.volumetric_strain(convention);
        let ea = results.axial_strain(convention);

        let p_label = label("p", &units.stress);
        let q_label = label("q", &units.stress);
        let ev_label = label("ev", &units.strain);
        let ea_label = label("ea", &units.strain);

        Self {
            convention,
            q_axial_strain: PlotSeries {
                title: "Deviatoric stress vs axial strain".to_string(),
                x_label: ea_label.clone(),
                y_label: q_label.clone(),
                x: ea.clone(),
                y: q.clone(),
            },
            q_p: PlotSeries {
                title: "Stress path".to_string(),
                x_label: p_label.clone(),
                y_label: q_label,
                x: p.clone(),
                y: q,
            },
            volumetric_axial_strain: PlotSeries {
                title: "Volumetric strain vs axial strain".to_string(),
                x_label: ea_label,
                y_label: ev_label.clone(),
                x: ea,
                y: ev.clone(),
            },
            volumetric_p: PlotSeries {
                title: "Volumetric strain vs mean stress".to_string(),
                x_label: p_label,
                y_label: ev_label,
                x: p,
                y: ev,
            },
        }
    }

    /// Panels in row-major order.
    #[must_use]
    pub fn panels(&self) -> [&PlotSeries; 4] {
        [
            &self.q_axial_strain,
            &self.q_p,
            &self.volumetric_axial_strain,
            &self.volumetric_p,
        ]
    }
}

/// Deviatoric stress against mean stress, for a single chart.
#[must_use]
pub fn stress_path(
    results: &DriverResults,
    convention: SignConvention,
    units: &PlotUnits,
) -> PlotSeries {
    PlotSeries {
        title: "Stress path".to_string(),
        x_label: label("p", &units.stress),
        y_label: label("q", &units.stress),
        x: results.mean_stress(convention),
        y: results.deviatoric_stress(),
    }
}

/// Deviatoric strain against volumetric strain, for a single chart.
#[must_use]
pub fn strain_path(
    results: &DriverResults,
    convention: SignConvention,
    units: &PlotUnits,
) -> PlotSeries {
    PlotSeries {
        title: "Strain path".to_string(),
        x_label: label("ev", &units.strain),
        y_label: label("eq", &units.strain),
        x: results.volumetric_strain(convention),
        y: results.deviatoric_strain(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::results::ResultTable;

    fn results() -> DriverResults {
        let text = "\
time(1) time(2) stress(1) stress(2) stress(3) stress(4) stress(5) stress(6) stran(1) stran(2) stran(3) stran(4) stran(5) stran(6)
0 0 -100 -100 -100 0 0 0 0 0 0 0 0 0
1 1 -160 -100 -100 0 0 0 -0.02 0.005 0.005 0 0 0
";
        let table = ResultTable::parse(text).expect("table parses");
        DriverResults::from_table(&table).expect("columns present")
    }

    #[test]
    fn quad_plot_panels_share_axes() {
        let chart = QuadPlot::new(
            &results(),
            SignConvention::CompressionPositive,
            &PlotUnits::default(),
        );
        assert_eq!(chart.q_p.x, chart.volumetric_p.x);
        assert_eq!(chart.q_axial_strain.x, chart.volumetric_axial_strain.x);
        assert_eq!(chart.q_p.x_label, "p [kPa]");
        assert_eq!(chart.volumetric_p.y_label, "ev [-]");
        assert!(chart.panels().iter().all(|panel| panel.len() == 2));

        assert_relative_eq!(chart.q_p.x[1], 120.0, epsilon = 1.0e-12);
        assert_relative_eq!(chart.q_p.y[1], 60.0, epsilon = 1.0e-12);
        assert_relative_eq!(chart.q_axial_strain.x[1], 0.02, epsilon = 1.0e-12);
        assert_relative_eq!(chart.volumetric_p.y[1], 0.01, epsilon = 1.0e-12);
    }

    #[test]
    fn single_charts_use_custom_units() {
        let units = PlotUnits {
            stress: "MPa".to_string(),
            strain: "%".to_string(),
        };
        let stress = stress_path(&results(), SignConvention::TensionPositive, &units);
        assert_eq!(stress.x_label, "p [MPa]");
        assert_relative_eq!(stress.x[1], -120.0, epsilon = 1.0e-12);

        let strain = strain_path(&results(), SignConvention::TensionPositive, &units);
        assert_eq!(strain.y_label, "eq [%]");
        assert_relative_eq!(strain.x[1], -0.01, epsilon = 1.0e-12);
    }

    #[test]
    fn serializes_to_json() {
        let chart = QuadPlot::new(&results(), SignConvention::default(), &PlotUnits::default());
        let value = serde_json::to_value(&chart).expect("chart serializes");
        assert_eq!(value["convention"], "compression-positive");
        assert_eq!(value["q_p"]["title"], "Stress path");
        assert_eq!(value["q_p"]["x"].as_array().map(Vec::len), Some(2));
    }
}
