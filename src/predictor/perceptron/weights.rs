
use bitvec::prelude::*;
use crate::branch::Outcome;

/// The range of values a single weight may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WeightRange {
    pub min: i32,
    pub max: i32,
}
impl WeightRange {
    /// Weights only saturate at the limits of [i32].
    pub const FULL: Self = Self { min: i32::MIN, max: i32::MAX };

    /// The range of a two's complement integer with `bits` bits.
    /// `bits` must be in `2..=32`.
    pub fn signed_bits(bits: u32) -> Self {
        debug_assert!((2..=32).contains(&bits));
        let max = ((1i64 << (bits - 1)) - 1) as i32;
        let min = (-(1i64 << (bits - 1))) as i32;
        Self { min, max }
    }

    /// Add `delta` to `w`, clamping the result to this range.
    #[inline]
    pub fn adjust(&self, w: i32, delta: i32) -> i32 {
        w.saturating_add(delta).clamp(self.min, self.max)
    }
}

/// The result of presenting a resolved outcome to a [Perceptron].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Training {
    /// The output was correct and at least as large as the threshold.
    Skipped,

    /// The weights were adjusted.
    Trained {
        /// Whether the output disagreed with the outcome
        mispredicted: bool,
    },
}

/// Perceptron [with integer weights].
///
/// See the following papers:
///
/// - "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001)
/// - "Neural Methods for Dynamic Branch Prediction" (Jiménez and Lin, 2002)
///
/// Each weight `weights[i]` is paired with bit `i` of global history, where
/// a set bit contributes `+1` and a clear bit contributes `-1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Perceptron {
    pub bias: i32,
    pub weights: Vec<i32>,
}
impl Perceptron {
    pub fn new(history_length: usize) -> Self {
        Self { bias: 0, weights: vec![0; history_length] }
    }

    /// Reset the state.
    pub fn reset(&mut self) {
        self.bias = 0;
        self.weights.fill(0);
    }

    /// Return a reference to the list of weights.
    pub fn weights(&self) -> &[i32] {
        &self.weights
    }

    /// Given the relevant slice of global history, compute the output value.
    /// The predicted outcome is determined by the sign of the output.
    pub fn output(&self, history: &BitSlice<usize, Lsb0>) -> i64 {
        debug_assert!(history.len() >= self.weights.len());
        let sum: i64 = self.weights.iter()
            .zip(history.iter().by_vals())
            .map(|(w, bit)| if bit { *w as i64 } else { -(*w as i64) })
            .sum();
        self.bias as i64 + sum
    }

    /// Given some outcome, adjust the weights.
    ///
    /// Training occurs after a misprediction, or when the magnitude of the
    /// output is below `threshold`.
    pub fn train(&mut self,
        history: &BitSlice<usize, Lsb0>,
        outcome: Outcome,
        threshold: i32,
        range: WeightRange,
    ) -> Training
    {
        let y = self.output(history);
        let t = outcome.sign();
        let mispredicted = Outcome::from_output(y) != outcome;
        if !mispredicted && y.abs() >= threshold as i64 {
            return Training::Skipped;
        }

        // When a bit in the history matches the outcome, increment the
        // corresponding weight. Otherwise, decrement the corresponding weight.
        let t = t as i32;
        self.bias = range.adjust(self.bias, t);
        for (w, bit) in self.weights.iter_mut().zip(history.iter().by_vals()) {
            let x = if bit { 1 } else { -1 };
            *w = range.adjust(*w, t * x);
        }
        Training::Trained { mispredicted }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn output_uses_history_signs() {
        let p = Perceptron { bias: 1, weights: vec![2, 3, 4] };
        let history = bitvec![usize, Lsb0; 1, 0, 1, 1];
        // 1 + 2 - 3 + 4
        assert_eq!(p.output(&history), 4);
    }

    #[test]
    fn signed_bits_range() {
        assert_eq!(WeightRange::signed_bits(8), WeightRange { min: -128, max: 127 });
        assert_eq!(WeightRange::signed_bits(2), WeightRange { min: -2, max: 1 });
        assert_eq!(WeightRange::signed_bits(32), WeightRange::FULL);
        assert_eq!(WeightRange::FULL.adjust(i32::MAX, 1), i32::MAX);
        assert_eq!(WeightRange::signed_bits(2).adjust(-2, -1), -2);
    }

    #[test]
    fn train_follows_history_correlation() {
        let mut p = Perceptron::new(2);
        let history = bitvec![usize, Lsb0; 1, 0];
        let res = p.train(&history, Outcome::T, 10, WeightRange::FULL);
        assert_eq!(res, Training::Trained { mispredicted: false });
        assert_eq!(p.bias, 1);
        assert_eq!(p.weights, vec![1, -1]);

        let res = p.train(&history, Outcome::N, 10, WeightRange::FULL);
        assert_eq!(res, Training::Trained { mispredicted: true });
        assert_eq!(p.bias, 0);
        assert_eq!(p.weights, vec![0, 0]);
    }
}
