//! Logging infrastructure for the RISC-V 32 emulator.

use core::fmt;

use riscv32_encoder::{Gpr, Inst};

/// Logging verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// No logging.
    None,
    /// Only record the error that stops a step.
    Errors,
    /// Log each instruction execution, and errors.
    Instructions,
    /// Instruction log plus a `log::trace!` line per step.
    Verbose,
}

/// Log entry for a single instruction execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstLog {
    /// Addi
    Arithmetic {
        cycle: u64,
        pc: u32,
        inst: Inst,
        rd: Gpr,
        rs1_val: i32,
        rd_old: i32,
        rd_new: i32,
    },
    /// Lw, Lb
    Load {
        cycle: u64,
        pc: u32,
        inst: Inst,
        rd: Gpr,
        addr: u32,
        rd_old: i32,
        rd_new: i32,
    },
    /// Sb
    Store {
        cycle: u64,
        pc: u32,
        inst: Inst,
        addr: u32,
        value: u8,
    },
    /// Beq, Bne
    Branch {
        cycle: u64,
        pc: u32,
        inst: Inst,
        rs1_val: i32,
        rs2_val: i32,
        taken: bool,
        target_pc: u32,
    },
    /// Jal
    Jump {
        cycle: u64,
        pc: u32,
        inst: Inst,
        target_pc: u32,
    },
    /// Lui
    Immediate {
        cycle: u64,
        pc: u32,
        inst: Inst,
        rd: Gpr,
        rd_old: i32,
        rd_new: i32,
    },
}

impl InstLog {
    /// Get the cycle count for this log entry.
    pub fn cycle(&self) -> u64 {
        match self {
            InstLog::Arithmetic { cycle, .. }
            | InstLog::Load { cycle, .. }
            | InstLog::Store { cycle, .. }
            | InstLog::Branch { cycle, .. }
            | InstLog::Jump { cycle, .. }
            | InstLog::Immediate { cycle, .. } => *cycle,
        }
    }

    /// Get the PC for this log entry.
    pub fn pc(&self) -> u32 {
        match self {
            InstLog::Arithmetic { pc, .. }
            | InstLog::Load { pc, .. }
            | InstLog::Store { pc, .. }
            | InstLog::Branch { pc, .. }
            | InstLog::Jump { pc, .. }
            | InstLog::Immediate { pc, .. } => *pc,
        }
    }

    /// Get the executed instruction.
    pub fn inst(&self) -> Inst {
        match self {
            InstLog::Arithmetic { inst, .. }
            | InstLog::Load { inst, .. }
            | InstLog::Store { inst, .. }
            | InstLog::Branch { inst, .. }
            | InstLog::Jump { inst, .. }
            | InstLog::Immediate { inst, .. } => *inst,
        }
    }

    /// Set the cycle count for this log entry.
    pub fn set_cycle(mut self, value: u64) -> Self {
        match &mut self {
            InstLog::Arithmetic { cycle, .. }
            | InstLog::Load { cycle, .. }
            | InstLog::Store { cycle, .. }
            | InstLog::Branch { cycle, .. }
            | InstLog::Jump { cycle, .. }
            | InstLog::Immediate { cycle, .. } => *cycle = value,
        }
        self
    }
}

impl fmt::Display for InstLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:4}] 0x{:08x}: {:?}", self.cycle(), self.pc(), self.inst())?;

        match self {
            InstLog::Arithmetic {
                rd,
                rs1_val,
                rd_old,
                rd_new,
                ..
            } => {
                write!(f, "\n    {}: {} -> {} (rs1={})", rd, rd_old, rd_new, rs1_val)?;
            }
            InstLog::Load {
                rd,
                addr,
                rd_old,
                rd_new,
                ..
            } => {
                write!(f, "\n    {}: {} -> {}", rd, rd_old, rd_new)?;
                write!(f, " (mem[0x{:08x}])", addr)?;
            }
            InstLog::Store { addr, value, .. } => {
                write!(f, "\n    mem[0x{:08x}] <- 0x{:02x}", addr, value)?;
            }
            InstLog::Branch {
                rs1_val,
                rs2_val,
                taken,
                target_pc,
                ..
            } => {
                if *taken {
                    write!(f, "\n    taken -> 0x{:08x}", target_pc)?;
                } else {
                    write!(f, "\n    not taken")?;
                }
                write!(f, " (rs1={}, rs2={})", rs1_val, rs2_val)?;
            }
            InstLog::Jump { target_pc, .. } => {
                write!(f, "\n    -> 0x{:08x}", target_pc)?;
            }
            InstLog::Immediate {
                rd, rd_old, rd_new, ..
            } => {
                write!(f, "\n    {}: 0x{:08x} -> 0x{:08x}", rd, *rd_old as u32, *rd_new as u32)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn test_display_store() {
        let log = InstLog::Store {
            cycle: 0,
            pc: 0x8000_0030,
            inst: Inst::Sb {
                rs1: Gpr::T1,
                rs2: Gpr::T2,
                imm: 0,
            },
            addr: 0x0300_0000,
            value: b'P',
        }
        .set_cycle(7);
        let text = format!("{}", log);
        assert!(text.starts_with("[   7] 0x80000030: Sb"));
        assert!(text.ends_with("mem[0x03000000] <- 0x50"));
    }

    #[test]
    fn test_display_branch_not_taken() {
        let log = InstLog::Branch {
            cycle: 3,
            pc: 0x8000_0010,
            inst: Inst::Bne {
                rs1: Gpr::T4,
                rs2: Gpr::T5,
                imm: 12,
            },
            rs1_val: 1,
            rs2_val: 1,
            taken: false,
            target_pc: 0x8000_001c,
        };
        assert!(format!("{}", log).contains("not taken (rs1=1, rs2=1)"));
    }
}
