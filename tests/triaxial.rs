#![warn(clippy::pedantic)]

use std::fs;
use std::path::{Path, PathBuf};

use approx::assert_relative_eq;
use incdriver::{
    Comparator, ConfigurationError, DriverConfig, DriverError, DriverModel, DriverProcess,
    ExecutionError, Load, LoadPathKind, ModelSetup, PlotUnits, QuadPlot, SetupStage,
    SignConvention, DEFAULT_CLEANUP_EXTENSIONS,
};

const OUTPUT: &str = "\
time(1) time(2) stress(1) stress(2) stress(3) stress(4) stress(5) stress(6) stran(1) stran(2) stran(3) stran(4) stran(5) stran(6) statev(1) statev(2)
0.0 0.0 -100.0 -100.0 -100.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.0 0.70 0.0
1.0 1.0 -200.0 -100.0 -100.0 0.0 0.0 0.0 -0.010 0.002 0.002 0.0 0.0 0.0 0.69 0.1
2.0 2.0 -300.0 -100.0 -100.0 0.0 0.0 0.0 -0.020 0.004 0.004 0.0 0.0 0.0 0.68 0.2
";

/// Stands in for the driver: checks the inputs are in place and writes a canned table.
struct FakeDriver;

impl DriverProcess for FakeDriver {
    fn execute(&self, working_dir: &Path) -> Result<(), ExecutionError> {
        let spawn_error = |source| ExecutionError::Spawn {
            program: PathBuf::from("fake-driver"),
            source,
        };
        let loads = fs::read_to_string(working_dir.join("test.inp")).map_err(spawn_error)?;
        let output = loads.lines().next().unwrap_or("output.txt");
        fs::write(working_dir.join(output), OUTPUT).map_err(spawn_error)
    }
}

fn line(data: &str, comment: &str, gap: usize) -> String {
    format!("{data}{}# {comment}\n", " ".repeat(gap))
}

fn triaxial_load() -> Load {
    let mut load = Load::new(
        LoadPathKind::TriaxialStrain,
        [
            ("ninc", 100.0),
            ("maxiter", 1000.0),
            ("dtime", 1.0),
            ("every", 1.0),
            ("ddstran_1", -0.001),
        ],
    )
    .expect("valid triaxial load");
    load.attach_stop_condition("stress(1)", Comparator::Less, -300.0, "?");
    load
}

fn prepared_setup(folder: &Path) -> ModelSetup {
    let mut setup = ModelSetup::new(folder, "NAMC");
    setup.add_load(triaxial_load());
    setup
        .write_parameters_file([("G", 100.0), ("nu", 0.3)])
        .expect("parameters written");
    setup
        .write_initial_conditions_file(&[-100.0, -100.0, -100.0, 0.0, 0.0, 0.0], [("e", 0.7)])
        .expect("initial conditions written");
    setup.write_loads().expect("loads written");
    setup
}

#[test]
fn input_files_match_driver_layout() {
    let dir = tempfile::tempdir().expect("temporary directory");
    prepared_setup(dir.path());

    let parameters = fs::read_to_string(dir.path().join("parameters.inp")).expect("parameters");
    let expected = [
        line("NAMC", "Model name", 10),
        line("2", "Number of properties", 10),
        line("100", "G", 10),
        line("0.3", "nu", 10),
    ]
    .concat();
    assert_eq!(parameters, expected);

    let initial = fs::read_to_string(dir.path().join("initialconditions.inp"))
        .expect("initial conditions");
    let expected = [
        line("6", "ntens, tension is positive", 15),
        line("-100", "s11", 15),
        line("-100", "s22", 15),
        line("-100", "s33", 15),
        line("0", "s12", 15),
        line("0", "s13", 15),
        line("0", "s23", 15),
        line("1", "Number of state variables", 15),
        line("0.7", "e - init value", 15),
    ]
    .concat();
    assert_eq!(initial, expected);

    let loads = fs::read_to_string(dir.path().join("test.inp")).expect("load file");
    let expected = [
        "output.txt\n".to_string(),
        "*TriaxialE1 ? stress(1) < -300\n".to_string(),
        line("100 1000 1 : 1", "ninc maxiter dtime : every", 10),
        line("-0.001", "ddstran_1", 10),
        "*End".to_string(),
    ]
    .concat();
    assert_eq!(loads, expected);
}

#[test]
fn run_and_read_back_invariants() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let mut model = DriverModel::new(prepared_setup(dir.path()), FakeDriver);
    model.run_model().expect("fake run succeeds");
    assert_eq!(model.setup.stage(), SetupStage::Executed);

    let results = model.load_results().expect("results load");
    assert_eq!(results.row_count(), 3);
    assert_eq!(
        results.state_variables().names,
        ["statev(1)", "statev(2)"]
    );

    let p = results.mean_stress(SignConvention::CompressionPositive);
    let q = results.deviatoric_stress();
    assert_relative_eq!(p[2], 500.0 / 3.0, epsilon = 1.0e-9);
    assert_relative_eq!(q[2], 200.0, epsilon = 1.0e-9);

    let ev = results.volumetric_strain(SignConvention::CompressionPositive);
    let eq = results.deviatoric_strain();
    assert_relative_eq!(ev[1], 0.006, epsilon = 1.0e-12);
    assert_relative_eq!(eq[1], 2.0 / 3.0 * 0.012, epsilon = 1.0e-12);

    let chart = QuadPlot::new(&results, SignConvention::default(), &PlotUnits::default());
    assert_eq!(chart.q_axial_strain.x, results.axial_strain(SignConvention::default()));
}

#[test]
fn editing_loads_requires_rewriting_them() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let mut setup = prepared_setup(dir.path());
    setup.add_load(
        Load::new(
            LoadPathKind::PureCreep,
            [("ninc", 10.0), ("maxiter", 100.0), ("dtime", 1.0), ("every", 1.0)],
        )
        .expect("valid creep load"),
    );

    let error = setup.run(&FakeDriver).expect_err("stale load file");
    assert!(matches!(
        error,
        DriverError::Configuration(ConfigurationError::FilesNotWritten { ref missing })
            if missing == &["test.inp"]
    ));

    setup.write_loads().expect("loads rewritten");
    setup.run(&FakeDriver).expect("fresh files run");
}

#[test]
fn cleanup_removes_inputs_and_outputs() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let mut model = DriverModel::new(prepared_setup(dir.path()), FakeDriver);
    model.run_model().expect("fake run succeeds");
    fs::write(dir.path().join("notes.md"), "keep me").expect("unrelated file");

    let report = model
        .setup
        .clear_folder(&DEFAULT_CLEANUP_EXTENSIONS)
        .expect("folder listed");
    assert!(report.is_clean());
    assert_eq!(report.deleted.len(), 4);
    assert!(dir.path().join("notes.md").is_file());
    assert_eq!(model.setup.stage(), SetupStage::LoadsAttached);
}

#[test]
fn configuration_writes_the_same_files() {
    let programmatic = tempfile::tempdir().expect("temporary directory");
    prepared_setup(programmatic.path());

    let configured = tempfile::tempdir().expect("temporary directory");
    let path = configured.path().join("triaxial.toml");
    fs::write(
        &path,
        r#"
initial_stress = [-100.0, -100.0, -100.0, 0.0, 0.0, 0.0]

[model]
name = "NAMC"
folder = "run"

[[properties]]
name = "G"
value = 100.0

[[properties]]
name = "nu"
value = 0.3

[[state_variables]]
name = "e"
value = 0.7

[[loads]]
kind = "TriaxialE1"
parameters = { ninc = 100, maxiter = 1000, dtime = 1.0, every = 1, ddstran_1 = -0.001 }
stop = { expression = "stress(1)", comparator = "less", value = -300.0 }
"#,
    )
    .expect("config written");

    let setup = DriverConfig::load(&path)
        .expect("config loads")
        .write_inputs()
        .expect("inputs written");

    for name in ["parameters.inp", "initialconditions.inp", "test.inp"] {
        let expected = fs::read_to_string(programmatic.path().join(name)).expect("reference");
        let actual = fs::read_to_string(setup.folder().join(name)).expect("configured");
        assert_eq!(actual, expected, "{name} differs");
    }
}

#[cfg(unix)]
#[test]
fn external_driver_runs_from_configuration() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().expect("temporary directory");
    let script = dir.path().join("driver.sh");
    fs::write(
        &script,
        format!("#!/bin/sh\ncat > output.txt <<'TABLE'\n{OUTPUT}TABLE\n"),
    )
    .expect("script written");
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).expect("script executable");

    let path = dir.path().join("creep.toml");
    fs::write(
        &path,
        r#"
initial_stress = [-100.0, -100.0, -100.0, 0.0, 0.0, 0.0]

[model]
name = "Elastic"
folder = "run"
executable = "driver.sh"

[[loads]]
kind = "PureCreep"
parameters = { ninc = 10, maxiter = 100, dtime = 1.0, every = 1 }
"#,
    )
    .expect("config written");

    let config = DriverConfig::load(&path).expect("config loads");
    let process = config.process().expect("executable configured");
    let mut model = DriverModel::new(config.write_inputs().expect("inputs written"), process);
    model.run_model().expect("script runs");

    let results = model.load_results().expect("results load");
    assert_eq!(results.row_count(), 3);
}

#[cfg(unix)]
#[test]
fn failing_driver_reports_exit_code() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let mut model = DriverModel::new(
        prepared_setup(dir.path()),
        incdriver::ExternalDriver::new("sh").with_args(["-c", "exit 2"]),
    );
    let error = model.run_model().expect_err("failure surfaces");
    assert!(matches!(
        error,
        DriverError::Execution(ExecutionError::NonZeroExit { code: 2, .. })
    ));
    assert_eq!(model.setup.stage(), SetupStage::FilesWritten);
}
