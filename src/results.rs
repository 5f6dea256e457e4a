//! Reading the driver output table and deriving invariants from it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ndarray::{Array2, ArrayView1, Axis};
use tracing::debug;

use crate::errors::ParseError;
use crate::invariants::{
    deviatoric_strain, deviatoric_stress, mean_stress, volumetric_strain, SignConvention, Voigt,
};

/// Time columns written by the driver.
pub const TIME_COLUMNS: [&str; 2] = ["time(1)", "time(2)"];

/// Stress columns written by the driver.
pub const STRESS_COLUMNS: [&str; 6] = [
    "stress(1)",
    "stress(2)",
    "stress(3)",
    "stress(4)",
    "stress(5)",
    "stress(6)",
];

/// Strain columns written by the driver.
pub const STRAIN_COLUMNS: [&str; 6] = [
    "stran(1)", "stran(2)", "stran(3)", "stran(4)", "stran(5)", "stran(6)",
];

/// Substring identifying state variable columns.
pub const STATE_VARIABLE_PATTERN: &str = "statev";

/// Whitespace-delimited table with a header row, as written by the driver.
#[derive(Clone, Debug, PartialEq)]
pub struct ResultTable {
    /// Column names in header order.
    columns: Vec<String>,
    /// Position of each column.
    index: HashMap<String, usize>,
    /// Values, one row per output increment.
    data: Array2<f64>,
}

impl ResultTable {
    /// Read and parse the table at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Io`] when the file cannot be read, or any error of
    /// [`ResultTable::parse`].
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let text = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text)?;
        debug!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.columns.len(),
            "output table loaded"
        );
        Ok(table)
    }

    /// Parse a table from text. Blank lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::EmptyHeader`] for text without a header row,
    /// [`ParseError::DuplicateColumn`] for a repeated column name,
    /// [`ParseError::RaggedRow`] for a row of the wrong width and
    /// [`ParseError::InvalidNumber`] for a value that is not a number.
    ///
    /// # Examples
    /// ```
    /// use incdriver::ResultTable;
    ///
    /// let table = ResultTable::parse("a b\n1 2\n3 4\n").unwrap();
    /// assert_eq!(table.row_count(), 2);
    /// assert_eq!(table.column("b").unwrap().to_vec(), [2.0, 4.0]);
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (_, header) = lines.next().ok_or(ParseError::EmptyHeader)?;
        let columns: Vec<String> = header.split_whitespace().map(str::to_string).collect();
        let mut index = HashMap::with_capacity(columns.len());
        for (position, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), position).is_some() {
                return Err(ParseError::DuplicateColumn(name.clone()));
            }
        }

        let mut rows: Vec<Vec<f64>> = Vec::new();
        for (line_number, line) in lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() != columns.len() {
                return Err(ParseError::RaggedRow {
                    line: line_number,
                    expected: columns.len(),
                    found: tokens.len(),
                });
            }
            let row = tokens
                .iter()
                .zip(&columns)
                .map(|(token, column)| {
                    token.parse::<f64>().map_err(|_| ParseError::InvalidNumber {
                        line: line_number,
                        column: column.clone(),
                        token: (*token).to_string(),
                    })
                })
                .collect::<Result<Vec<f64>, ParseError>>()?;
            rows.push(row);
        }

        let mut data = Array2::zeros((rows.len(), columns.len()));
        for (mut target, row) in data.rows_mut().into_iter().zip(&rows) {
            for (cell, value) in target.iter_mut().zip(row) {
                *cell = *value;
            }
        }

        Ok(Self {
            columns,
            index,
            data,
        })
    }

    /// Column names in header order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of output increments.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.data.nrows()
    }

    /// All values, one row per output increment.
    #[must_use]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Values of one column.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingColumn`] when the column is absent.
    pub fn column(&self, name: &str) -> Result<ArrayView1<'_, f64>, ParseError> {
        let position = self.position(name)?;
        Ok(self.data.column(position))
    }

    /// Copy the named columns, in the given order, into a new array.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingColumn`] for the first absent column.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Array2<f64>, ParseError> {
        let positions = names
            .iter()
            .map(|name| self.position(name.as_ref()))
            .collect::<Result<Vec<usize>, ParseError>>()?;
        Ok(self.data.select(Axis(1), &positions))
    }

    /// Names of the columns containing `pattern`, in header order.
    #[must_use]
    pub fn columns_containing(&self, pattern: &str) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|name| name.contains(pattern))
            .map(String::as_str)
            .collect()
    }

    /// The two time columns.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingColumn`] when a time column is absent.
    pub fn time(&self) -> Result<Array2<f64>, ParseError> {
        self.select(&TIME_COLUMNS)
    }

    /// The six stress columns.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingColumn`] when a stress column is absent.
    pub fn stress(&self) -> Result<Array2<f64>, ParseError> {
        self.select(&STRESS_COLUMNS)
    }

    /// The six strain columns.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingColumn`] when a strain column is absent.
    pub fn strain(&self) -> Result<Array2<f64>, ParseError> {
        self.select(&STRAIN_COLUMNS)
    }

    /// Every state variable column found in the header.
    ///
    /// The number of state variables depends on the model, so the columns are
    /// discovered by name instead of assumed.
    #[must_use]
    pub fn state_variables(&self) -> StateVariables {
        let names: Vec<String> = self
            .columns_containing(STATE_VARIABLE_PATTERN)
            .into_iter()
            .map(str::to_string)
            .collect();
        let positions: Vec<usize> = names.iter().map(|name| self.index[name]).collect();
        StateVariables {
            values: self.data.select(Axis(1), &positions),
            names,
        }
    }

    /// Position of a column in the header.
    fn position(&self, name: &str) -> Result<usize, ParseError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ParseError::MissingColumn(name.to_string()))
    }
}

/// State variable columns of an output table.
#[derive(Clone, Debug, PartialEq)]
pub struct StateVariables {
    /// Column names in header order.
    pub names: Vec<String>,
    /// Values, one row per output increment and one column per name.
    pub values: Array2<f64>,
}

impl StateVariables {
    /// Number of state variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table had no state variable columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Values of one state variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        let position = self.names.iter().position(|candidate| candidate == name)?;
        Some(self.values.column(position))
    }
}

/// Columns of a finished driver run with the derived invariants.
///
/// Raw values are kept in the driver's tension-positive convention. Sign conventions
/// only change the derived series.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverResults {
    /// `time(1)` and `time(2)`.
    time: Array2<f64>,
    /// `stress(1..6)`.
    stress: Array2<f64>,
    /// `stran(1..6)`.
    strain: Array2<f64>,
    /// `statev(..)` columns.
    state_variables: StateVariables,
}

impl DriverResults {
    /// Select the time, stress, strain and state variable columns of `table`.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingColumn`] when a time, stress or strain column is
    /// absent.
    pub fn from_table(table: &ResultTable) -> Result<Self, ParseError> {
        Ok(Self {
            time: table.time()?,
            stress: table.stress()?,
            strain: table.strain()?,
            state_variables: table.state_variables(),
        })
    }

    /// Read the output table at `path` and select its columns.
    ///
    /// # Errors
    ///
    /// Returns any error of [`ResultTable::from_path`] or [`DriverResults::from_table`].
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        Self::from_table(&ResultTable::from_path(path)?)
    }

    /// Number of output increments.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.stress.nrows()
    }

    /// `time(1)` and `time(2)`, one row per increment.
    #[must_use]
    pub fn time(&self) -> &Array2<f64> {
        &self.time
    }

    /// Raw stress rows.
    #[must_use]
    pub fn stress(&self) -> &Array2<f64> {
        &self.stress
    }

    /// Raw strain rows.
    #[must_use]
    pub fn strain(&self) -> &Array2<f64> {
        &self.strain
    }

    /// State variable columns.
    #[must_use]
    pub fn state_variables(&self) -> &StateVariables {
        &self.state_variables
    }

    /// Mean stress of every increment.
    #[must_use]
    pub fn mean_stress(&self, convention: SignConvention) -> Vec<f64> {
        voigt_rows(&self.stress)
            .map(|row| convention.apply(mean_stress(&row)))
            .collect()
    }

    /// Deviatoric stress of every increment.
    #[must_use]
    pub fn deviatoric_stress(&self) -> Vec<f64> {
        voigt_rows(&self.stress)
            .map(|row| deviatoric_stress(&row))
            .collect()
    }

    /// Volumetric strain of every increment.
    #[must_use]
    pub fn volumetric_strain(&self, convention: SignConvention) -> Vec<f64> {
        voigt_rows(&self.strain)
            .map(|row| convention.apply(volumetric_strain(&row)))
            .collect()
    }

    /// Deviatoric strain of every increment.
    #[must_use]
    pub fn deviatoric_strain(&self) -> Vec<f64> {
        voigt_rows(&self.strain)
            .map(|row| deviatoric_strain(&row))
            .collect()
    }

    /// Axial strain `stran(1)` of every increment.
    #[must_use]
    pub fn axial_strain(&self, convention: SignConvention) -> Vec<f64> {
        self.strain
            .column(0)
            .iter()
            .map(|value| convention.apply(*value))
            .collect()
    }
}

/// Rows of a six-column array as [`Voigt`] vectors.
fn voigt_rows(array: &Array2<f64>) -> impl Iterator<Item = Voigt> + '_ {
    array
        .rows()
        .into_iter()
        .map(|row| Voigt::from_iterator(row.iter().copied()))
}
