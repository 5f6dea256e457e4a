use crate::report::{render_paths, render_summary};
use crate::summary::summarize;
use incdriver::{
    DriverConfig, DriverModel, DriverResults, PlotUnits, QuadPlot, SignConvention,
    DEFAULT_CLEANUP_EXTENSIONS,
};
use std::error::Error;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// List the load path catalog.
pub fn paths() -> String {
    render_paths()
}

/// Write the three input files described by `config`.
pub fn write(config: &Path) -> Result<String, Box<dyn Error>> {
    let config = DriverConfig::load(config)?;
    let setup = config.write_inputs()?;
    Ok(format!(
        "Wrote {} load(s) for {} into {}\n",
        setup.loads().len(),
        setup.model_name(),
        setup.folder().display()
    ))
}

/// Write the input files, run the driver and summarize its output.
pub fn run(config: &Path, clean: bool) -> Result<String, Box<dyn Error>> {
    let config = DriverConfig::load(config)?;
    let process = config.process()?;

    if clean {
        let report = config.build_setup()?.clear_folder(&DEFAULT_CLEANUP_EXTENSIONS)?;
        for (path, error) in &report.failed {
            warn!(path = %path.display(), %error, "left in place");
        }
        info!(deleted = report.deleted.len(), "folder cleaned");
    }

    let mut model = DriverModel::new(config.write_inputs()?, process);
    model.run_model()?;
    let results = model.load_results()?;
    Ok(render_summary(&summarize(
        &results,
        SignConvention::CompressionPositive,
    )))
}

/// Summarize an existing output table, optionally exporting the chart series.
pub fn invariants(
    output: &Path,
    tension_positive: bool,
    json: Option<&Path>,
) -> Result<String, Box<dyn Error>> {
    let convention = if tension_positive {
        SignConvention::TensionPositive
    } else {
        SignConvention::CompressionPositive
    };
    let results = DriverResults::load(output)?;

    if let Some(json) = json {
        let chart = QuadPlot::new(&results, convention, &PlotUnits::default());
        fs::write(json, serde_json::to_string_pretty(&chart)?)?;
        info!(path = %json.display(), "chart series exported");
    }

    Ok(render_summary(&summarize(&results, convention)))
}
