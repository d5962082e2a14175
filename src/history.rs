
use bitvec::prelude::*;
use std::ops::{ Range };
use crate::branch::Outcome;

/// A global history register.
///
/// Bit 0 is the most recent outcome. Each new outcome shifts the register
/// toward higher indices and the oldest bit falls off the end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryRegister {
    data: BitVec<usize, Lsb0>,
    len: usize,
}

// NOTE: This *reverses* the all of the bits and presents them in a format
// where the leftmost bit is the most-significant (index n) and the rightmost
// bit is the least-significant (index 0).
impl std::fmt::Display for HistoryRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let x: String = self.data.as_bitslice().iter().by_vals()
            .map(|b| if b { '1' } else { '0' })
            .rev()
            .collect();
        write!(f, "{}", x)
    }
}

impl HistoryRegister {
    /// Create a register with the specified length in bits.
    /// All bits in the register are initialized to zero.
    pub fn new(len: usize) -> Self {
        Self {
            data: bitvec![usize, Lsb0; 0; len],
            len,
        }
    }

    pub fn len(&self) -> usize { self.len }
    pub fn is_empty(&self) -> bool { self.len == 0 }
    pub fn data(&self) -> &BitSlice<usize, Lsb0> { &self.data }
}


impl HistoryRegister {
    /// Shift the register by 'n' bits.
    /// The bottom 'n' bits become zero, and the top 'n' bits are discarded.
    pub fn shift_by(&mut self, n: usize) {
        if n >= self.len {
            self.data.fill(false);
        } else {
            self.data.shift_right(n);
        }
    }

    /// Shift in a new outcome as the most recent bit.
    pub fn push(&mut self, outcome: Outcome) {
        if self.len == 0 { return; }
        self.shift_by(1);
        self.data.set(0, outcome.into());
    }

    /// Returns the bit at `idx` (0 is the most recent outcome).
    pub fn bit(&self, idx: usize) -> bool {
        self.data[idx]
    }

    /// Return some slice of bits.
    pub fn read(&self, range: Range<usize>) -> &BitSlice<usize, Lsb0> {
        &self.data[range]
    }

    /// Return the low (most recent) bits packed into a [u64].
    /// Only the low 64 bits are available this way.
    pub fn as_u64(&self) -> u64 {
        let n = self.len.min(64);
        if n == 0 { return 0; }
        self.data[..n].load::<u64>()
    }

    /// Clear every bit.
    pub fn clear(&mut self) {
        self.data.fill(false);
    }
}
