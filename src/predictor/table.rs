//! Types for implementing a table of predictors.

/// Interface to a direct-mapped table of predictor entries.
pub trait PredictorTable: Sized {
    /// The type of input to the table used to form an index.
    type Input;

    /// The type of entry in the table.
    type Entry;

    /// Returns the number of entries in the table.
    fn size(&self) -> usize;

    /// Given some input, return the corresponding index into the table.
    fn get_index(&self, input: Self::Input) -> usize;

    /// Returns a reference to an entry in the table.
    fn get_entry(&self, idx: usize) -> &Self::Entry;

    /// Returns a mutable reference to an entry in the table.
    fn get_entry_mut(&mut self, idx: usize) -> &mut Self::Entry;

    /// Returns a bitmask corresponding to the number of entries in the table.
    fn index_mask(&self) -> usize {
        debug_assert!(self.size().is_power_of_two());
        self.size() - 1
    }
}

/// Form a direct-mapped index from a program counter value.
///
/// The low `shift` bits cannot distinguish instructions and are discarded
/// before masking.
#[inline]
pub fn pc_index(pc: usize, shift: u32, mask: usize) -> usize {
    pc.checked_shr(shift).unwrap_or(0) & mask
}
