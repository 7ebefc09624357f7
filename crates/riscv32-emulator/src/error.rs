//! Error types for the RISC-V 32 emulator.

use alloc::string::String;
use core::fmt;

use thiserror::Error;

/// Kind of memory access that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccessKind {
    Read,
    Write,
    InstructionFetch,
}

impl fmt::Display for MemoryAccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemoryAccessKind::Read => "read",
            MemoryAccessKind::Write => "write",
            MemoryAccessKind::InstructionFetch => "instruction fetch",
        };
        f.write_str(name)
    }
}

/// Errors that can occur during emulation.
///
/// The memory bus does not know the PC; it reports faults with `pc: 0` and
/// the executor fills in the real value with [`EmulatorError::at_pc`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmulatorError {
    #[error("Instruction limit exceeded: executed {executed} instructions (limit: {limit}) at PC 0x{pc:08x}")]
    InstructionLimitExceeded { limit: u64, executed: u64, pc: u32 },

    #[error("Invalid memory {kind} at address 0x{address:08x} (size: {size} bytes) at PC 0x{pc:08x}")]
    InvalidMemoryAccess {
        address: u32,
        size: usize,
        kind: MemoryAccessKind,
        pc: u32,
    },

    #[error("Unaligned memory access at address 0x{address:08x} (requires {alignment} byte alignment) at PC 0x{pc:08x}")]
    UnalignedAccess { address: u32, alignment: usize, pc: u32 },

    #[error("Invalid instruction 0x{instruction:08x} at PC 0x{pc:08x}: {reason}")]
    InvalidInstruction {
        pc: u32,
        instruction: u32,
        reason: String,
    },
}

impl EmulatorError {
    /// Get the PC where the error occurred.
    pub fn pc(&self) -> u32 {
        match self {
            EmulatorError::InstructionLimitExceeded { pc, .. }
            | EmulatorError::InvalidMemoryAccess { pc, .. }
            | EmulatorError::UnalignedAccess { pc, .. }
            | EmulatorError::InvalidInstruction { pc, .. } => *pc,
        }
    }

    /// The same error attributed to `at`.
    pub fn at_pc(mut self, at: u32) -> Self {
        match &mut self {
            EmulatorError::InstructionLimitExceeded { pc, .. }
            | EmulatorError::InvalidMemoryAccess { pc, .. }
            | EmulatorError::UnalignedAccess { pc, .. }
            | EmulatorError::InvalidInstruction { pc, .. } => *pc = at,
        }
        self
    }
}
