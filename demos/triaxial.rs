use incdriver::{
    Comparator, DriverModel, ExternalDriver, Load, LoadPathKind, ModelSetup, PlotUnits, QuadPlot,
    SignConvention,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let executable = std::env::args()
        .nth(1)
        .ok_or("usage: triaxial <path to incremental driver>")?;
    let folder = std::env::temp_dir().join("incdriver-triaxial");

    let mut setup = ModelSetup::new(&folder, "NAMC");
    let mut shear = Load::new(
        LoadPathKind::TriaxialStrain,
        [
            ("ninc", 200.0),
            ("maxiter", 1000.0),
            ("dtime", 1.0),
            ("every", 5.0),
            ("ddstran_1", -0.0005),
        ],
    )?;
    shear.attach_stop_condition("stress(1)", Comparator::Less, -600.0, "?");
    setup.add_load(shear);
    setup.add_load(Load::new(
        LoadPathKind::UndrainedCreep,
        [("ninc", 100.0), ("maxiter", 1000.0), ("dtime", 10.0), ("every", 5.0)],
    )?);

    setup.write_parameters_file([("G", 100.0), ("nu", 0.3), ("Mtc", 1.3)])?;
    setup.write_initial_conditions_file(&[-100.0, -100.0, -100.0, 0.0, 0.0, 0.0], [("e", 0.7)])?;
    setup.write_loads()?;

    let mut model = DriverModel::new(setup, ExternalDriver::new(executable));
    model.run_model()?;

    let results = model.load_results()?;
    let chart = QuadPlot::new(&results, SignConvention::CompressionPositive, &PlotUnits::default());
    for (p, q) in chart.q_p.x.iter().zip(&chart.q_p.y) {
        println!("p = {p:>10.2}  q = {q:>10.2}");
    }

    Ok(())
}
