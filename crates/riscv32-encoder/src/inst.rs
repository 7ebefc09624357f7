//! Structured RISC-V instruction representation.

use crate::{error::EncodeError, regs::Gpr};

/// One instruction of the supported subset.
///
/// Branch and jump immediates are byte offsets relative to the address of
/// the instruction itself. `Lui` carries the 20-bit upper field, not the
/// shifted value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inst {
    /// LUI: rd = imm << 12
    Lui { rd: Gpr, imm: u32 },
    /// ADDI: rd = rs1 + imm
    Addi { rd: Gpr, rs1: Gpr, imm: i32 },
    /// LW: rd = mem32[rs1 + imm]
    Lw { rd: Gpr, rs1: Gpr, imm: i32 },
    /// LB: rd = sign_extend(mem8[rs1 + imm])
    Lb { rd: Gpr, rs1: Gpr, imm: i32 },
    /// SB: mem8[rs1 + imm] = rs2
    Sb { rs1: Gpr, rs2: Gpr, imm: i32 },
    /// BEQ: if rs1 == rs2, pc = pc + imm
    Beq { rs1: Gpr, rs2: Gpr, imm: i32 },
    /// BNE: if rs1 != rs2, pc = pc + imm
    Bne { rs1: Gpr, rs2: Gpr, imm: i32 },
    /// JAL: rd = pc + 4; pc = pc + imm
    Jal { rd: Gpr, imm: i32 },
}

impl Inst {
    /// Size of every instruction in the subset, in bytes.
    pub const SIZE: u32 = 4;

    /// Encode this instruction to its binary representation.
    pub fn encode(&self) -> Result<u32, EncodeError> {
        use crate::encode::*;
        match *self {
            Inst::Lui { rd, imm } => lui(rd, imm),
            Inst::Addi { rd, rs1, imm } => addi(rd, rs1, imm),
            Inst::Lw { rd, rs1, imm } => lw(rd, rs1, imm),
            Inst::Lb { rd, rs1, imm } => lb(rd, rs1, imm),
            Inst::Sb { rs1, rs2, imm } => sb(rs1, rs2, imm),
            Inst::Beq { rs1, rs2, imm } => beq(rs1, rs2, imm),
            Inst::Bne { rs1, rs2, imm } => bne(rs1, rs2, imm),
            Inst::Jal { rd, imm } => jal(rd, imm),
        }
    }

    /// Decode a word of the subset. See [`crate::decode_instruction`].
    pub fn decode(word: u32) -> Result<Inst, alloc::string::String> {
        crate::decode::decode_instruction(word)
    }

    /// PC-relative offset of a branch or jump, `None` for everything else.
    pub fn branch_offset(&self) -> Option<i32> {
        match *self {
            Inst::Beq { imm, .. } | Inst::Bne { imm, .. } | Inst::Jal { imm, .. } => Some(imm),
            _ => None,
        }
    }

    /// The same branch or jump with its offset replaced.
    ///
    /// Non-control-transfer instructions are returned unchanged.
    pub fn with_offset(self, offset: i32) -> Inst {
        match self {
            Inst::Beq { rs1, rs2, .. } => Inst::Beq {
                rs1,
                rs2,
                imm: offset,
            },
            Inst::Bne { rs1, rs2, .. } => Inst::Bne {
                rs1,
                rs2,
                imm: offset,
            },
            Inst::Jal { rd, .. } => Inst::Jal { rd, imm: offset },
            other => other,
        }
    }
}
