//! Static and dynamic instruction representations.
//!
//! A [`StaticInst`] is what the trace produces: kind, program counter, target or
//! memory address, and register ids. A [`DynInst`] pairs it with the sequence
//! number assigned at fetch. The default `DynInst` is a NOP and doubles as the
//! empty-slot marker for every pipeline register.

use std::fmt;

/// Opaque register identifier.
pub type RegId = u8;

/// Byte distance between sequential instructions.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Instruction classes understood by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InstKind {
    /// No operation; also the empty-slot marker.
    #[default]
    Nop,
    /// Register-register ALU operation.
    RType,
    /// Register-immediate ALU operation.
    IType,
    /// Memory load.
    Load,
    /// Memory store.
    Store,
    /// Conditional branch.
    Branch,
    /// Direct jump.
    JType,
    /// System or trap instruction.
    Special,
    /// Jump through a register.
    JrType,
}

impl InstKind {
    /// Decodes a trace kind code.
    pub const fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Nop,
            1 => Self::RType,
            2 => Self::IType,
            3 => Self::Load,
            4 => Self::Store,
            5 => Self::Branch,
            6 => Self::JType,
            7 => Self::Special,
            8 => Self::JrType,
            _ => return None,
        })
    }

    /// Trace kind code for this class.
    pub const fn code(self) -> u8 {
        match self {
            Self::Nop => 0,
            Self::RType => 1,
            Self::IType => 2,
            Self::Load => 3,
            Self::Store => 4,
            Self::Branch => 5,
            Self::JType => 6,
            Self::Special => 7,
            Self::JrType => 8,
        }
    }

    /// Whether instructions of this kind write a destination register.
    pub const fn has_dest(self) -> bool {
        matches!(self, Self::RType | Self::IType | Self::Load)
    }

    /// Whether instructions of this kind read a first source register.
    pub const fn has_src1(self) -> bool {
        matches!(
            self,
            Self::RType | Self::IType | Self::Load | Self::Store | Self::Branch | Self::JrType
        )
    }

    /// Whether instructions of this kind read a second source register.
    pub const fn has_src2(self) -> bool {
        matches!(self, Self::RType | Self::Store | Self::Branch)
    }

    /// Whether this kind executes on the load/store unit.
    pub const fn is_mem(self) -> bool {
        matches!(self, Self::Load | Self::Store)
    }

    /// Whether this kind executes on the ALU.
    pub const fn is_alu(self) -> bool {
        !matches!(self, Self::Nop | Self::Load | Self::Store)
    }
}

impl fmt::Display for InstKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Nop => "NOP",
            Self::RType => "RTYPE",
            Self::IType => "ITYPE",
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Branch => "BRANCH",
            Self::JType => "JTYPE",
            Self::Special => "SPECIAL",
            Self::JrType => "JRTYPE",
        };
        f.write_str(name)
    }
}

/// An immutable decoded instruction as delivered by the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaticInst {
    /// Instruction class.
    pub kind: InstKind,
    /// Program counter.
    pub pc: u32,
    /// Branch/jump target, or the effective address of a load/store.
    pub addr: u32,
    /// Destination register (meaningful only when the kind has one).
    pub dest: RegId,
    /// First source register.
    pub src1: RegId,
    /// Second source register.
    pub src2: RegId,
}

impl StaticInst {
    /// A register-register ALU instruction.
    pub const fn rtype(pc: u32, dest: RegId, src1: RegId, src2: RegId) -> Self {
        Self {
            kind: InstKind::RType,
            pc,
            addr: 0,
            dest,
            src1,
            src2,
        }
    }

    /// A register-immediate ALU instruction.
    pub const fn itype(pc: u32, dest: RegId, src1: RegId) -> Self {
        Self {
            kind: InstKind::IType,
            pc,
            addr: 0,
            dest,
            src1,
            src2: 0,
        }
    }

    /// A load of `addr` into `dest`, base register `src1`.
    pub const fn load(pc: u32, dest: RegId, src1: RegId, addr: u32) -> Self {
        Self {
            kind: InstKind::Load,
            pc,
            addr,
            dest,
            src1,
            src2: 0,
        }
    }

    /// A store of `src2` to `addr`, base register `src1`.
    pub const fn store(pc: u32, src1: RegId, src2: RegId, addr: u32) -> Self {
        Self {
            kind: InstKind::Store,
            pc,
            addr,
            dest: 0,
            src1,
            src2,
        }
    }

    /// A conditional branch comparing `src1` and `src2`, resolving to `target`.
    pub const fn branch(pc: u32, src1: RegId, src2: RegId, target: u32) -> Self {
        Self {
            kind: InstKind::Branch,
            pc,
            addr: target,
            dest: 0,
            src1,
            src2,
        }
    }

    /// Fall-through address of this instruction.
    pub const fn next_pc(&self) -> u32 {
        self.pc.wrapping_add(INSTRUCTION_SIZE)
    }

    /// A branch whose recorded target differs from the fall-through address.
    pub const fn is_taken_branch(&self) -> bool {
        matches!(self.kind, InstKind::Branch) && self.addr != self.next_pc()
    }
}

/// A fetched instruction tagged with its program-order sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynInst {
    /// The decoded instruction.
    pub inst: StaticInst,
    /// Fetch order, starting at 1. Meaningless for NOPs.
    pub seq: u64,
}

impl DynInst {
    /// Wraps a static instruction with its sequence number.
    pub const fn new(inst: StaticInst, seq: u64) -> Self {
        Self { inst, seq }
    }

    /// The empty slot.
    pub const fn nop() -> Self {
        Self {
            inst: StaticInst {
                kind: InstKind::Nop,
                pc: 0,
                addr: 0,
                dest: 0,
                src1: 0,
                src2: 0,
            },
            seq: 0,
        }
    }

    /// Instruction class.
    pub const fn kind(&self) -> InstKind {
        self.inst.kind
    }

    /// Whether this slot is empty.
    pub const fn is_nop(&self) -> bool {
        matches!(self.inst.kind, InstKind::Nop)
    }

    /// Whether this instruction executes on the ALU.
    pub const fn is_alu(&self) -> bool {
        self.inst.kind.is_alu()
    }

    /// Whether this instruction executes on the load/store unit.
    pub const fn is_mem(&self) -> bool {
        self.inst.kind.is_mem()
    }

    /// Whether this instruction is a load.
    pub const fn is_load(&self) -> bool {
        matches!(self.inst.kind, InstKind::Load)
    }

    /// Whether this instruction writes a register.
    pub const fn has_dest(&self) -> bool {
        self.inst.kind.has_dest()
    }

    /// Whether this instruction reads a first source register.
    pub const fn has_src1(&self) -> bool {
        self.inst.kind.has_src1()
    }

    /// Whether this instruction reads a second source register.
    pub const fn has_src2(&self) -> bool {
        self.inst.kind.has_src2()
    }

    /// Destination register, if this kind writes one.
    pub const fn dest(&self) -> Option<RegId> {
        if self.has_dest() {
            Some(self.inst.dest)
        } else {
            None
        }
    }

    /// Source registers actually read by this instruction.
    pub fn sources(&self) -> impl Iterator<Item = RegId> {
        let a = self.has_src1().then_some(self.inst.src1);
        let b = self.has_src2().then_some(self.inst.src2);
        a.into_iter().chain(b)
    }

    /// Whether this is a taken branch.
    pub const fn is_taken(&self) -> bool {
        self.inst.is_taken_branch()
    }

    /// Whether `self` precedes `other` in program order.
    ///
    /// A NOP `other` is always younger. Otherwise `self` must be a real
    /// instruction with a smaller sequence number.
    pub const fn is_older_than(&self, other: &Self) -> bool {
        other.is_nop() || (!self.is_nop() && self.seq < other.seq)
    }
}

impl fmt::Display for DynInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nop() {
            return f.write_str("NOP");
        }
        let i = &self.inst;
        write!(
            f,
            "#{} {} pc={:#x} dst={} src1={} src2={} addr={:#x}",
            self.seq, i.kind, i.pc, i.dest, i.src1, i.src2, i.addr
        )
    }
}
