//! RISC-V 32-bit instruction encoding, one function per mnemonic.
//!
//! Each function forwards to the format packer with the opcode and
//! function code of its mnemonic. Registers are always valid (`Gpr` cannot
//! hold a number >= 32); immediates are range checked by the packer.

use crate::{
    error::EncodeError,
    format::{
        encode_b, encode_i, encode_j, encode_s, encode_u, OPCODE_BRANCH, OPCODE_JAL, OPCODE_LOAD,
        OPCODE_LUI, OPCODE_OP_IMM, OPCODE_STORE,
    },
    regs::Gpr,
};

const FUNCT3_ADDI: u32 = 0x0;
const FUNCT3_LB: u32 = 0x0;
const FUNCT3_LW: u32 = 0x2;
const FUNCT3_SB: u32 = 0x0;
const FUNCT3_BEQ: u32 = 0x0;
const FUNCT3_BNE: u32 = 0x1;

/// LUI: rd = imm20 << 12
pub fn lui(rd: Gpr, imm20: u32) -> Result<u32, EncodeError> {
    encode_u(OPCODE_LUI, rd, imm20)
}

/// ADDI: rd = rs1 + imm
pub fn addi(rd: Gpr, rs1: Gpr, imm: i32) -> Result<u32, EncodeError> {
    encode_i(OPCODE_OP_IMM, rd, FUNCT3_ADDI, rs1, imm)
}

/// LW: rd = mem32[rs1 + imm]
pub fn lw(rd: Gpr, rs1: Gpr, imm: i32) -> Result<u32, EncodeError> {
    encode_i(OPCODE_LOAD, rd, FUNCT3_LW, rs1, imm)
}

/// LB: rd = sign_extend(mem8[rs1 + imm])
pub fn lb(rd: Gpr, rs1: Gpr, imm: i32) -> Result<u32, EncodeError> {
    encode_i(OPCODE_LOAD, rd, FUNCT3_LB, rs1, imm)
}

/// SB: mem8[rs1 + imm] = rs2
pub fn sb(rs1: Gpr, rs2: Gpr, imm: i32) -> Result<u32, EncodeError> {
    encode_s(OPCODE_STORE, FUNCT3_SB, rs1, rs2, imm)
}

/// BEQ: if rs1 == rs2, pc = pc + offset
pub fn beq(rs1: Gpr, rs2: Gpr, offset: i32) -> Result<u32, EncodeError> {
    encode_b(OPCODE_BRANCH, FUNCT3_BEQ, rs1, rs2, offset)
}

/// BNE: if rs1 != rs2, pc = pc + offset
pub fn bne(rs1: Gpr, rs2: Gpr, offset: i32) -> Result<u32, EncodeError> {
    encode_b(OPCODE_BRANCH, FUNCT3_BNE, rs1, rs2, offset)
}

/// JAL: rd = pc + 4; pc = pc + offset
pub fn jal(rd: Gpr, offset: i32) -> Result<u32, EncodeError> {
    encode_j(OPCODE_JAL, rd, offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lui() {
        // lui a0, 0x12345
        assert_eq!(lui(Gpr::A0, 0x12345).unwrap(), 0x12345537);
        // lui t5, 0x74727
        assert_eq!(lui(Gpr::T5, 0x74727).unwrap(), 0x74727f37);
    }

    #[test]
    fn test_addi() {
        assert_eq!(addi(Gpr::A0, Gpr::A1, 5).unwrap(), 0x00558513);
        assert_eq!(addi(Gpr::A0, Gpr::A1, -5).unwrap(), 0xffb58513);
        // addi t5, t5, -1674
        assert_eq!(addi(Gpr::T5, Gpr::T5, -1674).unwrap(), 0x976f0f13);
    }

    #[test]
    fn test_lw() {
        assert_eq!(lw(Gpr::A0, Gpr::A1, 4).unwrap(), 0x0045a503);
    }

    #[test]
    fn test_lb() {
        // lb t2, 0(t0)
        assert_eq!(lb(Gpr::T2, Gpr::T0, 0).unwrap(), 0x00028383);
    }

    #[test]
    fn test_sb() {
        // sb t2, 0(t1)
        assert_eq!(sb(Gpr::T1, Gpr::T2, 0).unwrap(), 0x00730023);
    }

    #[test]
    fn test_beq() {
        assert_eq!(beq(Gpr::A0, Gpr::A1, 8).unwrap(), 0x00b50463);
        // beq t2, zero, 16
        assert_eq!(beq(Gpr::T2, Gpr::ZERO, 16).unwrap(), 0x00038863);
    }

    #[test]
    fn test_bne() {
        assert_eq!(bne(Gpr::A0, Gpr::A1, 8).unwrap(), 0x00b51463);
        // most negative branch only sets imm[12]
        assert_eq!(bne(Gpr::ZERO, Gpr::ZERO, -4096).unwrap(), 0x80001063);
    }

    #[test]
    fn test_jal() {
        assert_eq!(jal(Gpr::RA, 0).unwrap(), 0x000000ef);
        assert_eq!(jal(Gpr::ZERO, 0).unwrap(), 0x0000006f);
        assert_eq!(jal(Gpr::ZERO, 12).unwrap(), 0x00c0006f);
        assert_eq!(jal(Gpr::ZERO, -16).unwrap(), 0xff1ff06f);
    }

    #[test]
    fn test_out_of_range() {
        assert!(addi(Gpr::T0, Gpr::T0, 4096).is_err());
        assert!(lw(Gpr::T0, Gpr::T0, -2049).is_err());
        assert!(sb(Gpr::T0, Gpr::T0, 2048).is_err());
        assert!(lui(Gpr::T0, 0x80001000).is_err());
    }
}
