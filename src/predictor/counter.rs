//! Implementation of a saturating counter.

use crate::branch::Outcome;

/// Configuration for building a [`SaturatingCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounterConfig {
    pub max_t_state: u8,
    pub max_n_state: u8,
    pub default_state: Outcome,
}
impl SaturatingCounterConfig {
    /// A conventional 2-bit counter (weakly/strongly taken or not-taken).
    pub fn two_bit(default_state: Outcome) -> Self {
        Self { max_t_state: 1, max_n_state: 1, default_state }
    }

    /// Get the [approximate] number of storage bits.
    pub fn storage_bits(&self) -> usize {
        let states = self.max_t_state as usize + self.max_n_state as usize + 2;
        states.next_power_of_two().ilog2() as usize
    }

    pub fn build(self) -> SaturatingCounter {
        SaturatingCounter {
            cfg: self,
            state: self.default_state,
            ctr: 0,
        }
    }
}

/// An N-bit saturating counter used to follow the behavior of a branch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaturatingCounter {
    cfg: SaturatingCounterConfig,
    state: Outcome,
    ctr: u8,
}
impl SaturatingCounter {
    pub fn strengthen(&mut self) {
        let lim = match self.state {
            Outcome::T => self.cfg.max_t_state,
            Outcome::N => self.cfg.max_n_state,
        };
        self.ctr = self.ctr.saturating_add(1).min(lim);
    }

    pub fn weaken(&mut self) {
        if let Some(next) = self.ctr.checked_sub(1) {
            self.ctr = next;
        } else {
            self.state = !self.state;
        }
    }

    /// Return the strength of the current prediction.
    pub fn strength(&self) -> u8 { self.ctr }

    /// Reset the counter.
    pub fn reset(&mut self) {
        self.state = self.cfg.default_state;
        self.ctr = 0;
    }

    /// Return the current predicted direction.
    pub fn predict(&self) -> Outcome { self.state }

    /// Update the state of the counter.
    pub fn update(&mut self, outcome: Outcome) {
        let prediction = self.predict();
        if outcome != prediction {
            self.weaken();
        } else {
            self.strengthen();
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn two_bit_counter_hysteresis() {
        let mut ctr = SaturatingCounterConfig::two_bit(Outcome::N).build();
        assert_eq!(ctr.predict(), Outcome::N);

        // weakly not-taken -> weakly taken
        ctr.update(Outcome::T);
        assert_eq!(ctr.predict(), Outcome::T);
        ctr.update(Outcome::T);
        ctr.update(Outcome::T);
        assert_eq!(ctr.strength(), 1);

        // A single not-taken outcome only weakens the prediction
        ctr.update(Outcome::N);
        assert_eq!(ctr.predict(), Outcome::T);
        ctr.update(Outcome::N);
        assert_eq!(ctr.predict(), Outcome::N);

        ctr.reset();
        assert_eq!(ctr.predict(), Outcome::N);
        assert_eq!(ctr.strength(), 0);
    }

    #[test]
    fn storage_bits() {
        assert_eq!(SaturatingCounterConfig::two_bit(Outcome::N).storage_bits(), 2);
        let cfg = SaturatingCounterConfig {
            max_t_state: 3, max_n_state: 3, default_state: Outcome::N,
        };
        assert_eq!(cfg.storage_bits(), 3);
    }
}
