//! Field packing for the RV32I instruction formats.
//!
//! Each format places its register and immediate fields at fixed bit
//! positions. The B and J forms scatter their offset over several
//! non-contiguous slices; every slice has its own packing function here
//! (`b_imm_12`, `b_imm_10_5`, ...) together with the matching unpacking
//! function, so the layout of each slice can be checked on its own.
//!
//! Packing functions take the full immediate and return the slice already
//! shifted into its instruction bit position.

use core::fmt;

use crate::{error::EncodeError, regs::Gpr};

pub const OPCODE_LOAD: u32 = 0x03;
pub const OPCODE_OP_IMM: u32 = 0x13;
pub const OPCODE_STORE: u32 = 0x23;
pub const OPCODE_LUI: u32 = 0x37;
pub const OPCODE_BRANCH: u32 = 0x63;
pub const OPCODE_JAL: u32 = 0x6f;

/// Instruction encoding format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    I,
    S,
    B,
    U,
    J,
}

impl Format {
    /// Signed range `(min, max)` of the immediate this format can carry.
    ///
    /// For U this is the unsigned range of the 20-bit upper field.
    pub const fn imm_range(self) -> (i64, i64) {
        match self {
            Format::I | Format::S => (-2048, 2047),
            Format::B => (-4096, 4094),
            Format::J => (-1_048_576, 1_048_574),
            Format::U => (0, 0xf_ffff),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::I => "I",
            Format::S => "S",
            Format::B => "B",
            Format::U => "U",
            Format::J => "J",
        };
        f.write_str(name)
    }
}

fn check_range(format: Format, value: i64) -> Result<(), EncodeError> {
    let (min, max) = format.imm_range();
    if value < min || value > max {
        return Err(EncodeError::ImmediateOutOfRange {
            format,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_offset(format: Format, offset: i32) -> Result<(), EncodeError> {
    if offset & 1 != 0 {
        return Err(EncodeError::MisalignedOffset {
            format,
            value: offset,
        });
    }
    check_range(format, offset as i64)
}

// Register and function-code fields

fn rd_field(rd: Gpr) -> u32 {
    (rd.num() as u32) << 7
}

fn funct3_field(funct3: u32) -> u32 {
    (funct3 & 0x7) << 12
}

fn rs1_field(rs1: Gpr) -> u32 {
    (rs1.num() as u32) << 15
}

fn rs2_field(rs2: Gpr) -> u32 {
    (rs2.num() as u32) << 20
}

// I-type: imm[11:0] in bits 31:20

pub fn i_imm(imm: i32) -> u32 {
    ((imm as u32) & 0xfff) << 20
}

pub fn unpack_i_imm(word: u32) -> i32 {
    (word as i32) >> 20
}

// S-type: imm[11:5] in bits 31:25, imm[4:0] in bits 11:7

pub fn s_imm_11_5(imm: i32) -> u32 {
    (((imm as u32) >> 5) & 0x7f) << 25
}

pub fn s_imm_4_0(imm: i32) -> u32 {
    ((imm as u32) & 0x1f) << 7
}

pub fn unpack_s_imm(word: u32) -> i32 {
    let hi = ((word as i32) >> 25) << 5;
    let lo = ((word >> 7) & 0x1f) as i32;
    hi | lo
}

// B-type: imm[12] in bit 31, imm[10:5] in bits 30:25,
// imm[4:1] in bits 11:8, imm[11] in bit 7

pub fn b_imm_12(offset: i32) -> u32 {
    (((offset as u32) >> 12) & 0x1) << 31
}

pub fn b_imm_10_5(offset: i32) -> u32 {
    (((offset as u32) >> 5) & 0x3f) << 25
}

pub fn b_imm_4_1(offset: i32) -> u32 {
    (((offset as u32) >> 1) & 0xf) << 8
}

pub fn b_imm_11(offset: i32) -> u32 {
    (((offset as u32) >> 11) & 0x1) << 7
}

pub fn unpack_b_imm(word: u32) -> i32 {
    let imm_12 = ((word as i32) >> 31) << 12;
    let imm_11 = (((word >> 7) & 0x1) << 11) as i32;
    let imm_10_5 = (((word >> 25) & 0x3f) << 5) as i32;
    let imm_4_1 = (((word >> 8) & 0xf) << 1) as i32;
    imm_12 | imm_11 | imm_10_5 | imm_4_1
}

// J-type: imm[20] in bit 31, imm[10:1] in bits 30:21,
// imm[11] in bit 20, imm[19:12] in bits 19:12

pub fn j_imm_20(offset: i32) -> u32 {
    (((offset as u32) >> 20) & 0x1) << 31
}

pub fn j_imm_10_1(offset: i32) -> u32 {
    (((offset as u32) >> 1) & 0x3ff) << 21
}

pub fn j_imm_11(offset: i32) -> u32 {
    (((offset as u32) >> 11) & 0x1) << 20
}

pub fn j_imm_19_12(offset: i32) -> u32 {
    (((offset as u32) >> 12) & 0xff) << 12
}

pub fn unpack_j_imm(word: u32) -> i32 {
    let imm_20 = ((word as i32) >> 31) << 20;
    let imm_19_12 = (word & 0x000f_f000) as i32;
    let imm_11 = (((word >> 20) & 0x1) << 11) as i32;
    let imm_10_1 = (((word >> 21) & 0x3ff) << 1) as i32;
    imm_20 | imm_19_12 | imm_11 | imm_10_1
}

// U-type: imm[31:12] in bits 31:12

pub fn u_imm(imm20: u32) -> u32 {
    (imm20 & 0xf_ffff) << 12
}

pub fn unpack_u_imm(word: u32) -> u32 {
    word >> 12
}

/// Encode a U-type instruction. `imm20` is the upper 20 bits of the value.
pub fn encode_u(opcode: u32, rd: Gpr, imm20: u32) -> Result<u32, EncodeError> {
    check_range(Format::U, imm20 as i64)?;
    Ok(opcode | rd_field(rd) | u_imm(imm20))
}

/// Encode an I-type instruction.
pub fn encode_i(opcode: u32, rd: Gpr, funct3: u32, rs1: Gpr, imm: i32) -> Result<u32, EncodeError> {
    check_range(Format::I, imm as i64)?;
    Ok(opcode | rd_field(rd) | funct3_field(funct3) | rs1_field(rs1) | i_imm(imm))
}

/// Encode an S-type instruction. `rs1` is the base, `rs2` the stored value.
pub fn encode_s(
    opcode: u32,
    funct3: u32,
    rs1: Gpr,
    rs2: Gpr,
    imm: i32,
) -> Result<u32, EncodeError> {
    check_range(Format::S, imm as i64)?;
    Ok(opcode
        | s_imm_4_0(imm)
        | funct3_field(funct3)
        | rs1_field(rs1)
        | rs2_field(rs2)
        | s_imm_11_5(imm))
}

/// Encode a B-type instruction with a byte offset relative to the branch.
pub fn encode_b(
    opcode: u32,
    funct3: u32,
    rs1: Gpr,
    rs2: Gpr,
    offset: i32,
) -> Result<u32, EncodeError> {
    check_offset(Format::B, offset)?;
    Ok(opcode
        | b_imm_11(offset)
        | b_imm_4_1(offset)
        | funct3_field(funct3)
        | rs1_field(rs1)
        | rs2_field(rs2)
        | b_imm_10_5(offset)
        | b_imm_12(offset))
}

/// Encode a J-type instruction with a byte offset relative to the jump.
pub fn encode_j(opcode: u32, rd: Gpr, offset: i32) -> Result<u32, EncodeError> {
    check_offset(Format::J, offset)?;
    Ok(opcode
        | rd_field(rd)
        | j_imm_19_12(offset)
        | j_imm_11(offset)
        | j_imm_10_1(offset)
        | j_imm_20(offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_i_imm_extremes() {
        assert_eq!(i_imm(2047), 0x7ff0_0000);
        assert_eq!(i_imm(-2048), 0x8000_0000);
        assert_eq!(i_imm(-1), 0xfff0_0000);
        assert_eq!(unpack_i_imm(0xfff0_0000), -1);
    }

    #[test]
    fn test_s_slices() {
        // -1 fills both halves
        assert_eq!(s_imm_11_5(-1), 0xfe00_0000);
        assert_eq!(s_imm_4_0(-1), 0x0000_0f80);
        // 0x25 = 0b010_0101: hi slice 1, lo slice 5
        assert_eq!(s_imm_11_5(0x25), 1 << 25);
        assert_eq!(s_imm_4_0(0x25), 5 << 7);
        assert_eq!(unpack_s_imm(s_imm_11_5(-300) | s_imm_4_0(-300)), -300);
    }

    #[test]
    fn test_b_slices() {
        assert_eq!(b_imm_12(-4096), 1 << 31);
        assert_eq!(b_imm_11(-4096), 0);
        assert_eq!(b_imm_10_5(-4096), 0);
        assert_eq!(b_imm_4_1(-4096), 0);

        assert_eq!(b_imm_11(0x800), 1 << 7);
        assert_eq!(b_imm_10_5(0x7e0), 0x3f << 25);
        assert_eq!(b_imm_4_1(0x1e), 0xf << 8);
        // bit 0 is never encoded
        assert_eq!(b_imm_4_1(1), 0);
    }

    #[test]
    fn test_j_slices() {
        assert_eq!(j_imm_20(-2), 1 << 31);
        assert_eq!(j_imm_10_1(0x7fe), 0x3ff << 21);
        assert_eq!(j_imm_11(0x800), 1 << 20);
        assert_eq!(j_imm_19_12(0xff000), 0xff << 12);
        assert_eq!(j_imm_19_12(0x800), 0);
    }

    #[test]
    fn test_b_roundtrip_boundaries() {
        for offset in [-4096, -2, 0, 2, 16, -16, 2048, 4094] {
            let word = encode_b(OPCODE_BRANCH, 1, Gpr::T4, Gpr::T5, offset).unwrap();
            assert_eq!(unpack_b_imm(word), offset, "offset {}", offset);
        }
    }

    #[test]
    fn test_j_roundtrip_boundaries() {
        for offset in [-1_048_576, -16, 0, 12, 2048, 1_048_574] {
            let word = encode_j(OPCODE_JAL, Gpr::ZERO, offset).unwrap();
            assert_eq!(unpack_j_imm(word), offset, "offset {}", offset);
        }
    }

    #[test]
    fn test_range_errors() {
        assert_eq!(
            encode_i(OPCODE_OP_IMM, Gpr::T0, 0, Gpr::T0, 2048),
            Err(EncodeError::ImmediateOutOfRange {
                format: Format::I,
                value: 2048,
                min: -2048,
                max: 2047,
            })
        );
        assert!(encode_s(OPCODE_STORE, 0, Gpr::T1, Gpr::T2, -2049).is_err());
        assert!(encode_b(OPCODE_BRANCH, 0, Gpr::T1, Gpr::T2, 4096).is_err());
        assert!(encode_j(OPCODE_JAL, Gpr::ZERO, 1 << 20).is_err());
        assert!(encode_u(OPCODE_LUI, Gpr::T0, 0x10_0000).is_err());
    }

    #[test]
    fn test_odd_offsets_rejected() {
        assert_eq!(
            encode_b(OPCODE_BRANCH, 1, Gpr::T1, Gpr::T2, 3),
            Err(EncodeError::MisalignedOffset {
                format: Format::B,
                value: 3,
            })
        );
        assert!(matches!(
            encode_j(OPCODE_JAL, Gpr::ZERO, -7),
            Err(EncodeError::MisalignedOffset { format: Format::J, .. })
        ));
    }
}
