//! Reading and generating branch traces.

pub mod synthetic;

pub use synthetic::*;

use std::path::Path;
use crate::branch::*;
use crate::error::{ Error, Result };

/// A list of trace files, loaded one at a time.
pub struct BinaryTraceSet {
    /// A list of filenames
    pub files: Vec<String>,

    cur: usize,
}
impl BinaryTraceSet {
    pub fn new() -> Self {
        Self { files: Vec::new(), cur: 0 }
    }

    pub fn new_from_slice(strings: &[String]) -> Self {
        Self { files: strings.to_vec(), cur: 0 }
    }

    pub fn add_file(&mut self, s: impl ToString) {
        self.files.push(s.to_string());
    }
}
impl Default for BinaryTraceSet {
    fn default() -> Self { Self::new() }
}
impl Iterator for BinaryTraceSet {
    type Item = Result<BinaryTrace>;
    fn next(&mut self) -> Option<Self::Item> {
        let path = self.files.get(self.cur)?;
        self.cur += 1;
        Some(BinaryTrace::from_file(path))
    }
}


/// A trace of branch records.
///
/// On disk, each record is 24 bytes (little-endian):
///
/// | Offset | Size | Field                 |
/// |--------|------|-----------------------|
/// | 0      | 8    | program counter       |
/// | 8      | 8    | target address        |
/// | 16     | 4    | [BranchFlags]         |
/// | 20     | 4    | padding               |
///
pub struct BinaryTrace {
    pub data: Vec<BranchRecord>,
    pub name: String,
}
impl BinaryTrace {
    /// Size of a single record on disk.
    pub const RECORD_SIZE: usize = 24;

    /// Create a [BinaryTrace] from a list of records.
    pub fn from_records(name: impl ToString, data: Vec<BranchRecord>) -> Self {
        Self { data, name: name.to_string() }
    }

    /// Create a [BinaryTrace] from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let name = path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&name, &bytes)
    }

    /// Decode a [BinaryTrace] from raw bytes.
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.len() % Self::RECORD_SIZE != 0 {
            return Err(Error::InvalidTraceLength {
                name: name.to_string(),
                len: bytes.len(),
            });
        }
        let data = bytes.chunks_exact(Self::RECORD_SIZE)
            .map(decode_record)
            .collect();
        Ok(Self::from_records(name, data))
    }

    /// Encode all records in the on-disk format.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::with_capacity(self.data.len() * Self::RECORD_SIZE);
        for record in self.data.iter() {
            res.extend_from_slice(&(record.pc as u64).to_le_bytes());
            res.extend_from_slice(&(record.tgt as u64).to_le_bytes());
            res.extend_from_slice(&record.flags.0.to_le_bytes());
            res.extend_from_slice(&[0; 4]);
        }
        res
    }

    /// Write the trace to a file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_bytes())?;
        Ok(())
    }

    /// Return the number of records
    pub fn num_entries(&self) -> usize { self.data.len() }

    pub fn name(&self) -> &str { &self.name }

    /// Return a truncated slice of records
    pub fn as_slice_trunc(&self, limit: usize) -> &[BranchRecord] {
        &self.data[..limit.min(self.data.len())]
    }

    /// Return a slice of records.
    pub fn as_slice(&self) -> &[BranchRecord] {
        &self.data
    }
}

fn decode_record(chunk: &[u8]) -> BranchRecord {
    let mut pc = [0u8; 8];
    let mut tgt = [0u8; 8];
    let mut flags = [0u8; 4];
    pc.copy_from_slice(&chunk[0..8]);
    tgt.copy_from_slice(&chunk[8..16]);
    flags.copy_from_slice(&chunk[16..20]);
    BranchRecord {
        pc: u64::from_le_bytes(pc) as usize,
        tgt: u64::from_le_bytes(tgt) as usize,
        flags: BranchFlags(u32::from_le_bytes(flags)),
    }
}
