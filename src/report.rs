use crate::summary::{RunSummary, StatePoint};
use incdriver::{LoadPathKind, SignConvention};
use std::fmt::Write;

/// Render the catalog of load paths with their parameters.
#[must_use]
pub fn render_paths() -> String {
    let mut output = String::new();
    for kind in LoadPathKind::ALL {
        writeln!(&mut output, "{:<16} {}", kind.name(), kind.description())
            .expect("writing to string cannot fail");
        writeln!(
            &mut output,
            "{:<16} parameters: {}",
            "",
            kind.required_parameters().join(", ")
        )
        .expect("writing to string cannot fail");
    }
    output
}

/// Render a textual summary of a driver run.
#[must_use]
pub fn render_summary(summary: &RunSummary) -> String {
    let mut output = String::new();

    let convention = match summary.convention {
        SignConvention::CompressionPositive => "compression positive",
        SignConvention::TensionPositive => "tension positive",
    };
    writeln!(
        &mut output,
        "Element test: {} increments ({convention})",
        summary.increments
    )
    .expect("writing to string cannot fail");

    if summary.state_variables.is_empty() {
        output.push_str("State variables: none\n");
    } else {
        writeln!(
            &mut output,
            "State variables: {}",
            summary.state_variables.join(", ")
        )
        .expect("writing to string cannot fail");
    }

    for (label, point) in [
        ("Initial", summary.first),
        ("Peak q", summary.peak),
        ("Final", summary.last),
    ] {
        match point {
            Some(point) => render_point(&mut output, label, &point),
            None => writeln!(&mut output, "{label:<8} not available (empty table)")
                .expect("writing to string cannot fail"),
        }
    }

    output
}

/// Append one state line.
fn render_point(output: &mut String, label: &str, point: &StatePoint) {
    writeln!(
        output,
        "{label:<8} row {:>5}  t = {:<10.4} p = {:+.3e}  q = {:+.3e}  ev = {:+.3e}  eq = {:+.3e}",
        point.row, point.time, point.p, point.q, point.volumetric, point.deviatoric
    )
    .expect("writing to string cannot fail");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(row: usize, q: f64) -> StatePoint {
        StatePoint {
            row,
            time: row as f64,
            p: 100.0,
            q,
            volumetric: 0.0,
            deviatoric: 0.01,
        }
    }

    #[test]
    fn formats_human_readable_report() {
        let summary = RunSummary {
            convention: SignConvention::CompressionPositive,
            increments: 3,
            state_variables: vec!["statev(1)".to_string()],
            first: Some(point(0, 0.0)),
            last: Some(point(2, 120.0)),
            peak: Some(point(1, 150.0)),
        };
        let report = render_summary(&summary);
        assert!(report.contains("3 increments (compression positive)"));
        assert!(report.contains("State variables: statev(1)"));
        assert!(report.contains("q = +1.500e2"));
        assert!(report.starts_with("Element test"));
    }

    #[test]
    fn reports_empty_tables() {
        let summary = RunSummary {
            convention: SignConvention::TensionPositive,
            increments: 0,
            state_variables: Vec::new(),
            first: None,
            last: None,
            peak: None,
        };
        let report = render_summary(&summary);
        assert!(report.contains("State variables: none"));
        assert!(report.contains("Final    not available"));
    }

    #[test]
    fn lists_every_load_path() {
        let paths = render_paths();
        for kind in LoadPathKind::ALL {
            assert!(paths.contains(kind.name()));
        }
        assert!(paths.contains("ninc, maxiter, dtime, every, ddstress_2"));
    }
}
