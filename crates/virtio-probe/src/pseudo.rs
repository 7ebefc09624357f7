//! The `li` pseudo-instruction.
//!
//! A 32-bit constant is split into a 20-bit upper part for `lui` and a
//! signed 12-bit lower part for `addi`. Because `addi` sign-extends, a lower
//! part of 0x800 or more is taken as negative and the upper part is bumped
//! by one to compensate.

use riscv32_encoder::{Gpr, Inst};

/// A constant split into `lui`/`addi` operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantSplit {
    /// 20-bit `lui` field.
    pub upper: u32,
    /// Signed 12-bit `addi` immediate, in [-2048, 2047].
    pub lower: i32,
}

impl ConstantSplit {
    /// `upper << 12` plus the sign-extended lower part, mod 2^32.
    pub fn reconstruct(&self) -> u32 {
        (self.upper << 12).wrapping_add(self.lower as u32)
    }
}

pub fn split_constant(value: u32) -> ConstantSplit {
    let mut lower = (value & 0xfff) as i32;
    let mut upper = value >> 12;
    if lower >= 0x800 {
        lower -= 0x1000;
        // wraps for values like 0xffff_f800
        upper = (upper + 1) & 0xf_ffff;
    }
    ConstantSplit { upper, lower }
}

/// Instructions loading `value` into `rd`.
///
/// `lui` is emitted only for a non-zero upper part. `addi` is emitted for a
/// non-zero lower part, or alone (from `zero`) when the upper part is zero,
/// so loading 0 is a single `addi rd, zero, 0`.
pub fn load_constant(rd: Gpr, value: u32) -> Vec<Inst> {
    let ConstantSplit { upper, lower } = split_constant(value);
    let mut insts = Vec::with_capacity(2);
    if upper != 0 {
        insts.push(Inst::Lui { rd, imm: upper });
        if lower != 0 {
            insts.push(Inst::Addi {
                rd,
                rs1: rd,
                imm: lower,
            });
        }
    } else {
        insts.push(Inst::Addi {
            rd,
            rs1: Gpr::ZERO,
            imm: lower,
        });
    }
    insts
}
