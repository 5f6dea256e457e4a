//! Line-level conventions of the incremental driver's text input files.
//!
//! Every data line the driver reads may carry a trailing comment: the value, a run of
//! blanks, the comment character and the comment text. The driver reads values by
//! position, so comments are for humans only.

use std::fmt::Display;
use std::io::{self, Write};

/// File holding the model name and the material properties.
pub const PARAMETERS_FILE: &str = "parameters.inp";

/// File holding the initial stress and the initial state variables.
pub const INITIAL_CONDITIONS_FILE: &str = "initialconditions.inp";

/// Default name of the file holding the load sequence.
pub const DEFAULT_LOADS_FILE: &str = "test.inp";

/// Default name of the table the driver writes its results to.
pub const DEFAULT_OUTPUT_FILE: &str = "output.txt";

/// Marker closing the load sequence.
pub const END_MARKER: &str = "*End";

/// Character that starts an inline comment.
pub const COMMENT_CHAR: char = '#';

/// Blanks between data and comment in the parameters and load files.
pub const DEFAULT_COMMENT_GAP: usize = 10;

/// Blanks between data and comment in the initial conditions file.
pub const INITIAL_CONDITIONS_COMMENT_GAP: usize = 15;

/// Labels of the six Cartesian stress components, in the order the driver reads them.
pub const STRESS_LABELS: [&str; 6] = ["s11", "s22", "s33", "s12", "s13", "s23"];

/// Write `data` followed by `gap` blanks and a `# comment`, terminated by a newline.
///
/// # Examples
/// ```
/// use incdriver::protocol::write_commented_line;
///
/// let mut buffer = Vec::new();
/// write_commented_line(&mut buffer, &0.3, "nu", 4).unwrap();
/// assert_eq!(String::from_utf8(buffer).unwrap(), "0.3    # nu\n");
/// ```
///
/// # Errors
///
/// Returns any error raised by `writer`.
pub fn write_commented_line<W, D>(writer: &mut W, data: &D, comment: &str, gap: usize) -> io::Result<()>
where
    W: Write + ?Sized,
    D: Display + ?Sized,
{
    writeln!(
        writer,
        "{}{:width$}{} {}",
        data,
        "",
        COMMENT_CHAR,
        comment,
        width = gap
    )
}
