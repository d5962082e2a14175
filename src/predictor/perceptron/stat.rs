
/// Container for [PerceptronPredictor](super::PerceptronPredictor) runtime
/// stats. Only updates are counted: lookups never change any state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PerceptronStats {
    /// Number of non-squashed updates
    pub updates: usize,

    /// Number of squashed updates (ignored)
    pub squashed: usize,

    /// Number of updates that adjusted the weights
    pub trained: usize,

    /// Number of updates where the output was correct and confident
    pub skipped: usize,

    /// Number of updates where the recomputed output disagreed with the
    /// resolved outcome
    pub mispredicted: usize,
}
impl PerceptronStats {
    /// Fraction of updates that caused training.
    pub fn training_rate(&self) -> f64 {
        if self.updates == 0 { return 0.0; }
        self.trained as f64 / self.updates as f64
    }
}
