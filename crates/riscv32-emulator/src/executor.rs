//! Instruction executor for RISC-V 32-bit instructions.

use riscv32_encoder::{Gpr, Inst};

use crate::{error::EmulatorError, logging::InstLog, memory::Memory};

/// Result of executing a single instruction.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// New PC value (None means PC += 4)
    pub new_pc: Option<u32>,
    /// A jump to itself; nothing further can happen.
    pub should_halt: bool,
    /// Log entry for this instruction (cycle not yet set)
    pub log: InstLog,
}

/// Helper to read register (x0 always returns 0)
fn read_reg(regs: &[i32; 32], reg: Gpr) -> i32 {
    if reg.num() == 0 {
        0
    } else {
        regs[reg.num() as usize]
    }
}

/// Helper to write register (x0 writes are ignored). Returns the old value.
fn write_reg(regs: &mut [i32; 32], reg: Gpr, value: i32) -> i32 {
    let old = read_reg(regs, reg);
    if reg.num() != 0 {
        regs[reg.num() as usize] = value;
    }
    old
}

fn effective_address(regs: &[i32; 32], base: Gpr, imm: i32) -> u32 {
    read_reg(regs, base).wrapping_add(imm) as u32
}

/// Execute a decoded instruction at `pc`.
pub fn execute_instruction(
    inst: Inst,
    pc: u32,
    regs: &mut [i32; 32],
    memory: &mut Memory,
) -> Result<ExecutionResult, EmulatorError> {
    let mut new_pc = None;
    let mut should_halt = false;

    let log = match inst {
        Inst::Lui { rd, imm } => {
            let value = (imm << 12) as i32;
            let rd_old = write_reg(regs, rd, value);
            InstLog::Immediate {
                cycle: 0,
                pc,
                inst,
                rd,
                rd_old,
                rd_new: read_reg(regs, rd),
            }
        }
        Inst::Addi { rd, rs1, imm } => {
            let rs1_val = read_reg(regs, rs1);
            let rd_old = write_reg(regs, rd, rs1_val.wrapping_add(imm));
            InstLog::Arithmetic {
                cycle: 0,
                pc,
                inst,
                rd,
                rs1_val,
                rd_old,
                rd_new: read_reg(regs, rd),
            }
        }
        Inst::Lw { rd, rs1, imm } => {
            let addr = effective_address(regs, rs1, imm);
            let value = memory.read_u32(addr).map_err(|e| e.at_pc(pc))? as i32;
            let rd_old = write_reg(regs, rd, value);
            InstLog::Load {
                cycle: 0,
                pc,
                inst,
                rd,
                addr,
                rd_old,
                rd_new: read_reg(regs, rd),
            }
        }
        Inst::Lb { rd, rs1, imm } => {
            let addr = effective_address(regs, rs1, imm);
            // sign-extend
            let value = memory.read_u8(addr).map_err(|e| e.at_pc(pc))? as i8 as i32;
            let rd_old = write_reg(regs, rd, value);
            InstLog::Load {
                cycle: 0,
                pc,
                inst,
                rd,
                addr,
                rd_old,
                rd_new: read_reg(regs, rd),
            }
        }
        Inst::Sb { rs1, rs2, imm } => {
            let addr = effective_address(regs, rs1, imm);
            let value = read_reg(regs, rs2) as u8;
            memory.write_u8(addr, value).map_err(|e| e.at_pc(pc))?;
            InstLog::Store {
                cycle: 0,
                pc,
                inst,
                addr,
                value,
            }
        }
        Inst::Beq { rs1, rs2, imm } | Inst::Bne { rs1, rs2, imm } => {
            let rs1_val = read_reg(regs, rs1);
            let rs2_val = read_reg(regs, rs2);
            let taken = match inst {
                Inst::Beq { .. } => rs1_val == rs2_val,
                _ => rs1_val != rs2_val,
            };
            let target_pc = pc.wrapping_add(imm as u32);
            if taken {
                new_pc = Some(target_pc);
            }
            InstLog::Branch {
                cycle: 0,
                pc,
                inst,
                rs1_val,
                rs2_val,
                taken,
                target_pc,
            }
        }
        Inst::Jal { rd, imm } => {
            write_reg(regs, rd, pc.wrapping_add(4) as i32);
            let target_pc = pc.wrapping_add(imm as u32);
            new_pc = Some(target_pc);
            should_halt = target_pc == pc;
            InstLog::Jump {
                cycle: 0,
                pc,
                inst,
                target_pc,
            }
        }
    };

    Ok(ExecutionResult {
        new_pc,
        should_halt,
        log,
    })
}
