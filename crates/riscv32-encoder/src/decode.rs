//! RISC-V 32-bit instruction decoding.
//!
//! Maps encoded words of the supported subset back to [`Inst`]. Used by the
//! emulator and by round-trip tests.

use alloc::{format, string::String};

use crate::{
    format::{
        unpack_b_imm, unpack_i_imm, unpack_j_imm, unpack_s_imm, unpack_u_imm, OPCODE_BRANCH,
        OPCODE_JAL, OPCODE_LOAD, OPCODE_LUI, OPCODE_OP_IMM, OPCODE_STORE,
    },
    inst::Inst,
    regs::Gpr,
};

/// Decoded instruction fields.
///
/// Every immediate is extracted as if the word had that format; only the one
/// matching `opcode` is meaningful.
#[derive(Debug, Clone, Copy)]
pub struct DecodedFields {
    pub opcode: u8,
    pub rd: Gpr,
    pub rs1: Gpr,
    pub rs2: Gpr,
    pub funct3: u8,
    pub imm_i: i32,
    pub imm_s: i32,
    pub imm_b: i32,
    pub imm_j: i32,
    pub imm_u: u32,
}

/// Extract all fields from a 32-bit instruction word.
pub fn extract_fields(word: u32) -> DecodedFields {
    DecodedFields {
        opcode: (word & 0x7f) as u8,
        rd: Gpr::from_field(word >> 7),
        rs1: Gpr::from_field(word >> 15),
        rs2: Gpr::from_field(word >> 20),
        funct3: ((word >> 12) & 0x7) as u8,
        imm_i: unpack_i_imm(word),
        imm_s: unpack_s_imm(word),
        imm_b: unpack_b_imm(word),
        imm_j: unpack_j_imm(word),
        imm_u: unpack_u_imm(word),
    }
}

/// Decode a 32-bit instruction word into a structured representation.
pub fn decode_instruction(word: u32) -> Result<Inst, String> {
    let f = extract_fields(word);
    let opcode = f.opcode as u32;

    match (opcode, f.funct3) {
        (OPCODE_LUI, _) => Ok(Inst::Lui {
            rd: f.rd,
            imm: f.imm_u,
        }),
        (OPCODE_OP_IMM, 0x0) => Ok(Inst::Addi {
            rd: f.rd,
            rs1: f.rs1,
            imm: f.imm_i,
        }),
        (OPCODE_LOAD, 0x0) => Ok(Inst::Lb {
            rd: f.rd,
            rs1: f.rs1,
            imm: f.imm_i,
        }),
        (OPCODE_LOAD, 0x2) => Ok(Inst::Lw {
            rd: f.rd,
            rs1: f.rs1,
            imm: f.imm_i,
        }),
        (OPCODE_STORE, 0x0) => Ok(Inst::Sb {
            rs1: f.rs1,
            rs2: f.rs2,
            imm: f.imm_s,
        }),
        (OPCODE_BRANCH, 0x0) => Ok(Inst::Beq {
            rs1: f.rs1,
            rs2: f.rs2,
            imm: f.imm_b,
        }),
        (OPCODE_BRANCH, 0x1) => Ok(Inst::Bne {
            rs1: f.rs1,
            rs2: f.rs2,
            imm: f.imm_b,
        }),
        (OPCODE_JAL, _) => Ok(Inst::Jal {
            rd: f.rd,
            imm: f.imm_j,
        }),
        (OPCODE_OP_IMM | OPCODE_LOAD | OPCODE_STORE | OPCODE_BRANCH, funct3) => Err(format!(
            "Unsupported funct3 0x{:x} for opcode 0x{:02x}",
            funct3, opcode
        )),
        _ => Err(format!("Unknown opcode: 0x{:02x}", opcode)),
    }
}
