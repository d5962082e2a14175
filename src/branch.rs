//! Types for representing branches and branch outcomes.

/// Identifies the hardware thread context issuing a request.
pub type ThreadId = usize;

/// A branch outcome.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    /// Not taken
    N = 0,
    /// Taken
    T = 1
}

impl Outcome {
    /// Returns `+1` for taken and `-1` for not-taken.
    pub fn sign(self) -> i64 {
        match self {
            Self::T => 1,
            Self::N => -1,
        }
    }

    /// Interpret the sign of a perceptron output. Zero is taken.
    pub fn from_output(y: i64) -> Self {
        if y >= 0 { Self::T } else { Self::N }
    }
}

impl std::fmt::Debug for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = match self {
            Self::T => "t",
            Self::N => "n",
        };
        write!(f, "{}", s)
    }
}

impl std::ops::Not for Outcome {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Self::N => Self::T,
            Self::T => Self::N,
        }
    }
}

impl From<bool> for Outcome {
    fn from(x: bool) -> Self {
        match x {
            true => Self::T,
            false => Self::N
        }
    }
}
impl From<Outcome> for bool {
    fn from(x: Outcome) -> Self {
        matches!(x, Outcome::T)
    }
}

/// Representing different kinds of branch/control-flow instructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BranchKind {
    /// A direct conditional branch instruction.
    DirectBranch,

    /// A direct unconditional jump instruction.
    DirectJump,

    /// An indirect unconditional jump instruction.
    IndirectJump,

    /// A direct procedure call instruction.
    DirectCall,

    /// An indirect procedure call instruction.
    IndirectCall,

    /// A return instruction.
    Return,
}

/// Packed flags describing a [BranchRecord].
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchFlags(pub u32);
impl BranchFlags {
    pub const BRN_FLAG: u32   = 1 << 0;
    pub const JMP_FLAG: u32   = 1 << 1;
    pub const CALL_FLAG: u32  = 1 << 2;
    pub const RET_FLAG: u32   = 1 << 3;
    pub const IND_FLAG: u32   = 1 << 4;
    pub const TAKEN_FLAG: u32 = 1 << 5;

    /// 4-bit instruction length
    const ILEN_MASK: u32 = 0b1111_0000_0000_0000_0000_0000_0000_0000;

    pub fn new(kind: BranchKind, outcome: Outcome) -> Self {
        let kbits = match kind {
            BranchKind::DirectBranch => Self::BRN_FLAG,
            BranchKind::DirectJump   => Self::JMP_FLAG,
            BranchKind::IndirectJump => Self::JMP_FLAG | Self::IND_FLAG,
            BranchKind::DirectCall   => Self::CALL_FLAG,
            BranchKind::IndirectCall => Self::CALL_FLAG | Self::IND_FLAG,
            BranchKind::Return       => Self::RET_FLAG | Self::IND_FLAG,
        };
        let tbits = if bool::from(outcome) { Self::TAKEN_FLAG } else { 0 };
        Self(kbits | tbits)
    }

    pub fn ilen(&self) -> usize {
        ((self.0 & Self::ILEN_MASK) >> 28) as usize
    }

    pub fn is_brn(&self) -> bool { self.0 & Self::BRN_FLAG != 0 }
    pub fn is_jmp(&self) -> bool { self.0 & Self::JMP_FLAG != 0 }
    pub fn is_call(&self) -> bool { self.0 & Self::CALL_FLAG != 0 }
    pub fn is_ret(&self) -> bool { self.0 & Self::RET_FLAG != 0 }
    pub fn is_indirect(&self) -> bool { self.0 & Self::IND_FLAG != 0 }
    pub fn is_taken(&self) -> bool { self.0 & Self::TAKEN_FLAG != 0 }

    /// Decode the kind of branch.
    ///
    /// Records with no recognizable kind bits are treated as conditional
    /// branches, since the predictor only ever needs a direction for them.
    pub fn kind(&self) -> BranchKind {
        if self.is_ret() {
            BranchKind::Return
        } else if self.is_call() {
            if self.is_indirect() {
                BranchKind::IndirectCall
            } else {
                BranchKind::DirectCall
            }
        } else if self.is_jmp() {
            if self.is_indirect() {
                BranchKind::IndirectJump
            } else {
                BranchKind::DirectJump
            }
        } else {
            BranchKind::DirectBranch
        }
    }
}


/// A record of branch execution.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct BranchRecord {
    /// The program counter value for this branch
    pub pc: usize,

    /// The target address evaluated for this branch
    pub tgt: usize,

    pub flags: BranchFlags,
}
impl BranchRecord {
    pub fn new(pc: usize, tgt: usize, kind: BranchKind, outcome: Outcome)
        -> Self
    {
        Self { pc, tgt, flags: BranchFlags::new(kind, outcome) }
    }

    /// Shorthand for a conditional branch record.
    pub fn conditional(pc: usize, tgt: usize, outcome: Outcome) -> Self {
        Self::new(pc, tgt, BranchKind::DirectBranch, outcome)
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::from(self.flags.is_taken())
    }
    pub fn kind(&self) -> BranchKind {
        self.flags.kind()
    }
    pub fn ilen(&self) -> usize {
        self.flags.ilen()
    }

    /// Returns 'true' if this is a conditional instruction.
    pub fn is_conditional(&self) -> bool {
        matches!(self.kind(), BranchKind::DirectBranch)
    }

    /// Returns 'true' if this is an unconditional instruction.
    pub fn is_unconditional(&self) -> bool {
        !self.is_conditional()
    }
}
