use crate::model::difficulty::Difficulty;

/// Candidate questions grouped by difficulty band.
///
/// Each band keeps the order it was supplied in. Items are expected to carry
/// the band they are stored under; this is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionPools<T> {
    bands: [Vec<T>; 3],
}

impl<T> QuestionPools<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            bands: [Vec::new(), Vec::new(), Vec::new()],
        }
    }

    /// Replace the pool for `band`.
    pub fn insert(&mut self, band: Difficulty, items: Vec<T>) {
        self.bands[band.index()] = items;
    }

    /// Builder-style variant of [`QuestionPools::insert`].
    #[must_use]
    pub fn with(mut self, band: Difficulty, items: Vec<T>) -> Self {
        self.insert(band, items);
        self
    }

    #[must_use]
    pub fn get(&self, band: Difficulty) -> &[T] {
        &self.bands[band.index()]
    }

    /// Number of candidates across every band.
    #[must_use]
    pub fn total_len(&self) -> usize {
        self.bands.iter().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bands.iter().all(Vec::is_empty)
    }
}

impl<T> Default for QuestionPools<T> {
    fn default() -> Self {
        Self::new()
    }
}
