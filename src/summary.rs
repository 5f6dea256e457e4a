use incdriver::{DriverResults, SignConvention};

/// State of the sample at one output increment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatePoint {
    /// Output row the values come from.
    pub row: usize,
    /// Time column `time(1)`.
    pub time: f64,
    /// Mean stress.
    pub p: f64,
    /// Deviatoric stress.
    pub q: f64,
    /// Volumetric strain.
    pub volumetric: f64,
    /// Deviatoric strain.
    pub deviatoric: f64,
}

/// Key numbers of a finished run, ready for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Convention used for p and the volumetric strain.
    pub convention: SignConvention,
    /// Number of output increments.
    pub increments: usize,
    /// Names of the state variable columns.
    pub state_variables: Vec<String>,
    /// First output increment.
    pub first: Option<StatePoint>,
    /// Last output increment.
    pub last: Option<StatePoint>,
    /// Increment with the largest deviatoric stress.
    pub peak: Option<StatePoint>,
}

/// Reduce the results of a run to the values shown in the report.
#[must_use]
pub fn summarize(results: &DriverResults, convention: SignConvention) -> RunSummary {
    let p = results.mean_stress(convention);
    let q = results.deviatoric_stress();
    let volumetric = results.volumetric_strain(convention);
    let deviatoric = results.deviatoric_strain();
    let time = results.time().column(0);

    let point = |row: usize| StatePoint {
        row,
        time: time[row],
        p: p[row],
        q: q[row],
        volumetric: volumetric[row],
        deviatoric: deviatoric[row],
    };

    let increments = results.row_count();
    let peak = q
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(row, _)| point(row));

    RunSummary {
        convention,
        increments,
        state_variables: results.state_variables().names.clone(),
        first: (increments > 0).then(|| point(0)),
        last: increments.checked_sub(1).map(point),
        peak,
    }
}
