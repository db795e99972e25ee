use pipesim_core::isa::{DynInst, InstKind, RegId, StaticInst};

/// Fluent builder for a [`StaticInst`].
pub struct InstBuilder(StaticInst);

impl InstBuilder {
    pub fn new(kind: InstKind) -> Self {
        Self(StaticInst {
            kind,
            ..StaticInst::default()
        })
    }

    pub fn pc(mut self, pc: u32) -> Self {
        self.0.pc = pc;
        self
    }

    pub fn dest(mut self, reg: RegId) -> Self {
        self.0.dest = reg;
        self
    }

    pub fn src1(mut self, reg: RegId) -> Self {
        self.0.src1 = reg;
        self
    }

    pub fn src2(mut self, reg: RegId) -> Self {
        self.0.src2 = reg;
        self
    }

    pub fn addr(mut self, addr: u32) -> Self {
        self.0.addr = addr;
        self
    }

    pub fn build(self) -> StaticInst {
        self.0
    }

    /// Wraps the instruction with a sequence number.
    pub fn seq(self, seq: u64) -> DynInst {
        DynInst::new(self.0, seq)
    }
}

/// Program counter used for the instruction with sequence number `seq`.
pub fn pc_of(seq: u64) -> u32 {
    0x1000 + (seq as u32) * 4
}

/// `dest = src1 op src2`
pub fn alu(seq: u64, dest: RegId, src1: RegId, src2: RegId) -> DynInst {
    DynInst::new(StaticInst::rtype(pc_of(seq), dest, src1, src2), seq)
}

/// `dest = src1 op imm`
pub fn alui(seq: u64, dest: RegId, src1: RegId) -> DynInst {
    DynInst::new(StaticInst::itype(pc_of(seq), dest, src1), seq)
}

/// `dest = mem[addr]`, base register `base`.
pub fn load(seq: u64, dest: RegId, base: RegId, addr: u32) -> DynInst {
    DynInst::new(StaticInst::load(pc_of(seq), dest, base, addr), seq)
}

/// `mem[addr] = value`, base register `base`.
pub fn store(seq: u64, base: RegId, value: RegId, addr: u32) -> DynInst {
    DynInst::new(StaticInst::store(pc_of(seq), base, value, addr), seq)
}

/// A branch that redirects fetch (target is not the fall-through).
pub fn taken_branch(seq: u64) -> DynInst {
    let pc = pc_of(seq);
    DynInst::new(StaticInst::branch(pc, 1, 2, pc + 64), seq)
}

/// A branch whose target is the fall-through address.
pub fn not_taken_branch(seq: u64) -> DynInst {
    let pc = pc_of(seq);
    DynInst::new(StaticInst::branch(pc, 1, 2, pc + 4), seq)
}

/// Strips sequence numbers, for feeding a trace.
pub fn statics(insts: &[DynInst]) -> Vec<StaticInst> {
    insts.iter().map(|d| d.inst).collect()
}
