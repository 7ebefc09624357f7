//! RISC-V 32-bit instruction encoder.
//!
//! This crate encodes the small RV32I subset used by the probe image
//! generator (`lui`, `addi`, `lw`, `lb`, `sb`, `beq`, `bne`, `jal`) into
//! 32-bit instruction words. Every immediate is range checked: a value that
//! does not fit its field is an [`EncodeError`], never a silently truncated
//! word.

#![no_std]

extern crate alloc;

mod asm;
mod decode;
mod encode;
mod error;
pub mod format;
mod inst;
mod regs;

pub use asm::{assemble_code, assemble_instruction};
pub use decode::{decode_instruction, extract_fields, DecodedFields};
pub use encode::*;
pub use error::EncodeError;
pub use format::Format;
pub use inst::Inst;
pub use regs::Gpr;
