//! Ordered sequence of load stages forming one element test.

use std::io::{self, Write};
use std::slice;

use crate::load::Load;

/// Loads executed one after the other by the driver.
///
/// Insertion order is the execution order. Loads are validated when they are built, so
/// the batch accepts any [`Load`] without further checks.
///
/// # Examples
/// ```
/// use incdriver::{Load, LoadBatch, LoadPathKind};
///
/// let common = [("ninc", 10.0), ("maxiter", 100.0), ("dtime", 1.0), ("every", 1.0)];
/// let mut batch = LoadBatch::new();
/// batch.push(Load::new(LoadPathKind::PureCreep, common).unwrap());
/// batch.extend([
///     Load::new(LoadPathKind::PureRelaxation, common).unwrap(),
///     Load::new(LoadPathKind::UndrainedCreep, common).unwrap(),
/// ]);
/// assert_eq!(batch.len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadBatch {
    /// Stored loads in execution order.
    loads: Vec<Load>,
}

impl LoadBatch {
    /// Create an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self { loads: Vec::new() }
    }

    /// Append one load.
    pub fn push(&mut self, load: Load) {
        self.loads.push(load);
    }

    /// Remove every load.
    pub fn clear(&mut self) {
        self.loads.clear();
    }

    /// Number of stored loads.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Whether the batch holds no loads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Stored loads in execution order.
    #[must_use]
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    /// Iterate over the loads in execution order.
    pub fn iter(&self) -> slice::Iter<'_, Load> {
        self.loads.iter()
    }

    /// Write every load, in order, with `gap` blanks before the inline comments.
    ///
    /// # Errors
    ///
    /// Returns any error raised by `writer`.
    pub fn write_to<W: Write + ?Sized>(&self, writer: &mut W, gap: usize) -> io::Result<()> {
        for load in &self.loads {
            load.write_to(writer, gap)?;
        }
        Ok(())
    }
}

impl Extend<Load> for LoadBatch {
    fn extend<I: IntoIterator<Item = Load>>(&mut self, loads: I) {
        self.loads.extend(loads);
    }
}

impl FromIterator<Load> for LoadBatch {
    fn from_iter<I: IntoIterator<Item = Load>>(loads: I) -> Self {
        Self {
            loads: loads.into_iter().collect(),
        }
    }
}

impl IntoIterator for LoadBatch {
    type Item = Load;
    type IntoIter = std::vec::IntoIter<Load>;

    fn into_iter(self) -> Self::IntoIter {
        self.loads.into_iter()
    }
}

impl<'a> IntoIterator for &'a LoadBatch {
    type Item = &'a Load;
    type IntoIter = slice::Iter<'a, Load>;

    fn into_iter(self) -> Self::IntoIter {
        self.loads.iter()
    }
}
