
use serde::{ Deserialize, Serialize };
use std::path::Path;

use crate::error::{ Error, Result };
use crate::history::HistoryRegister;
use crate::predictor::perceptron::*;

/// Coefficient used to calculate the training threshold.
const THETA_COEFF: f64 = 1.93;
/// Bias used to calculate the training threshold.
const THETA_BIAS: f64 = 14.0;

/// The training threshold suggested for some history length.
///
/// From "Dynamic Branch Prediction with Perceptrons" (Jiménez and Lin, 2001),
/// this is `floor(1.93 * history_length + 14)`.
pub fn derive_threshold(history_length: usize) -> i32 {
    (THETA_COEFF * history_length as f64 + THETA_BIAS).floor() as i32
}

/// Configuration for a [`PerceptronPredictor`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PerceptronConfig {
    /// Number of perceptrons (rows) in the table. Must be a power of two.
    pub n_perceptron: usize,

    /// Number of global history bits used by each perceptron.
    /// `history_length + 1` must be a power of two.
    pub history_length: usize,

    /// Training threshold. When absent, [derive_threshold] is used.
    pub threshold: Option<i32>,

    /// Number of low program counter bits to discard when indexing.
    pub inst_shift_amt: u32,

    /// Width of each weight in bits. When absent, weights are only bounded
    /// by the range of [i32].
    pub weight_bits: Option<u32>,
}

impl Default for PerceptronConfig {
    fn default() -> Self {
        Self {
            n_perceptron: 1024,
            history_length: 31,
            threshold: None,
            inst_shift_amt: 2,
            weight_bits: None,
        }
    }
}

impl PerceptronConfig {
    /// Parse a configuration from JSON. Missing fields take default values.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read a JSON configuration from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    /// The threshold used for training.
    pub fn effective_threshold(&self) -> i32 {
        self.threshold.unwrap_or_else(|| derive_threshold(self.history_length))
    }

    /// The range of values each weight may take.
    pub fn weight_range(&self) -> Result<WeightRange> {
        match self.weight_bits {
            None => Ok(WeightRange::FULL),
            Some(bits) if (2..=32).contains(&bits) => {
                Ok(WeightRange::signed_bits(bits))
            },
            Some(bits) => Err(Error::InvalidWeightBits(bits)),
        }
    }

    /// Check the table layout.
    pub fn validate(&self) -> Result<()> {
        if !self.n_perceptron.is_power_of_two() {
            return Err(Error::InvalidTableSize(self.n_perceptron));
        }
        let row_size = self.history_length.checked_add(1)
            .filter(|n| n.is_power_of_two());
        if row_size.is_none() {
            return Err(Error::InvalidHistoryLength(self.history_length));
        }
        self.weight_range()?;
        Ok(())
    }

    /// Number of weights in each row (history weights and the bias).
    pub fn row_size(&self) -> usize {
        self.history_length + 1
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        let weight_bits = self.weight_bits.unwrap_or(32) as usize;
        self.n_perceptron * self.row_size() * weight_bits
    }

    /// Use this configuration to create a new [`PerceptronPredictor`].
    pub fn build(self) -> Result<PerceptronPredictor> {
        self.validate()?;
        let range = self.weight_range()?;
        let threshold = self.effective_threshold();
        let index_mask = self.n_perceptron - 1;

        log::debug!("index mask: {:#x}", index_mask);
        log::debug!("number of perceptrons: {}", self.n_perceptron);
        log::debug!("global history size: {}", self.history_length);
        log::debug!("instruction shift amount: {}", self.inst_shift_amt);
        log::debug!("training threshold: {}", threshold);

        let table = vec![Perceptron::new(self.history_length); self.n_perceptron];
        let ghr = HistoryRegister::new(self.row_size());
        Ok(PerceptronPredictor {
            threshold,
            index_mask,
            range,
            table,
            ghr,
            stat: PerceptronStats::default(),
            cfg: self,
        })
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn threshold_formula() {
        assert_eq!(derive_threshold(0), 14);
        assert_eq!(derive_threshold(7), 27);
        assert_eq!(derive_threshold(31), 73);
        assert_eq!(derive_threshold(63), 135);
    }

    #[test]
    fn explicit_threshold_overrides_formula() {
        let cfg = PerceptronConfig { threshold: Some(5), ..Default::default() };
        assert_eq!(cfg.effective_threshold(), 5);
        assert_eq!(PerceptronConfig::default().effective_threshold(), 73);
    }

    #[test]
    fn json_defaults() {
        let cfg = PerceptronConfig::from_json(
            r#"{ "n_perceptron": 64, "history_length": 15, "threshold": 20 }"#
        ).unwrap();
        assert_eq!(cfg.n_perceptron, 64);
        assert_eq!(cfg.history_length, 15);
        assert_eq!(cfg.threshold, Some(20));
        assert_eq!(cfg.inst_shift_amt, 2);
        assert_eq!(cfg.weight_bits, None);

        let res = PerceptronConfig::from_json(r#"{ "n_perceptrons": 64 }"#);
        assert!(matches!(res, Err(Error::Config(_))));
    }

    #[test]
    fn validate_reports_failed_invariant() {
        let cfg = PerceptronConfig { n_perceptron: 100, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::InvalidTableSize(100))));

        let cfg = PerceptronConfig { history_length: 32, ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidHistoryLength(32)));
        assert!(err.to_string().contains("history_length (32)"));

        let cfg = PerceptronConfig { weight_bits: Some(1), ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::InvalidWeightBits(1))));

        let cfg = PerceptronConfig { history_length: usize::MAX, ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::InvalidHistoryLength(_))));
    }

    #[test]
    fn storage_bits() {
        let cfg = PerceptronConfig {
            n_perceptron: 256,
            history_length: 15,
            weight_bits: Some(8),
            ..Default::default()
        };
        assert_eq!(cfg.storage_bits(), 256 * 16 * 8);
    }
}
