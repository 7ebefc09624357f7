//! Helper functions for testing RISC-V code.
//!
//! Programs are given as assembly text (see `riscv32_encoder::assemble_code`)
//! or as `Inst` slices, loaded at the RAM start and run until they halt by
//! jumping to themselves (`j 0`). On failure the helpers panic with the
//! error, the emulator state and the last executed instructions.

use alloc::{format, string::String, vec::Vec};

use riscv32_encoder::{assemble_code, Gpr, Inst};

use crate::{emulator::Riscv32Emulator, error::EmulatorError, logging::LogLevel};

/// Create an emulator from assembly code.
pub fn debug_riscv32_asm(asm: &str) -> Result<Riscv32Emulator, EmulatorError> {
    let code = assemble_code(asm).map_err(|e| EmulatorError::InvalidInstruction {
        pc: 0,
        instruction: 0,
        reason: format!("Assembly error: {}", e),
    })?;
    Ok(Riscv32Emulator::new(&code).with_log_level(LogLevel::Instructions))
}

/// Create an emulator from instruction structs.
pub fn debug_riscv32_ops(ops: &[Inst]) -> Result<Riscv32Emulator, EmulatorError> {
    let mut code = Vec::new();
    for (i, op) in ops.iter().enumerate() {
        let word = op.encode().map_err(|e| EmulatorError::InvalidInstruction {
            pc: (i * 4) as u32,
            instruction: 0,
            reason: format!("Encoding error: {}", e),
        })?;
        code.extend_from_slice(&word.to_le_bytes());
    }
    Ok(Riscv32Emulator::new(&code).with_log_level(LogLevel::Instructions))
}

/// Format error with emulator state and logs.
fn format_error(emu: &Riscv32Emulator, error: &EmulatorError, asm: &str) -> String {
    let mut result = String::new();
    result.push_str("=== RISC-V Execution Error ===\n\n");
    result.push_str(&format!("Error: {}\n", error));
    result.push_str(&format!("PC: 0x{:08x}\n\n", error.pc()));
    result.push_str(&emu.dump_state());

    // Show last 10 logs
    let logs = emu.get_logs();
    if !logs.is_empty() {
        result.push_str("\nLast execution logs:\n");
        let start = logs.len().saturating_sub(10);
        for log in &logs[start..] {
            result.push_str(&format!("{}\n", log));
        }
    }

    result.push_str(&format!("\nCode:\n{}\n", asm));
    result
}

/// Expect code to run until it halts, returning the emulator.
pub fn expect_halt(asm: &str) -> Riscv32Emulator {
    let mut emu = match debug_riscv32_asm(asm) {
        Ok(emu) => emu,
        Err(e) => panic!("{}\n\nCode:\n{}", e, asm),
    };
    if let Err(e) = emu.run_until_halt() {
        panic!("{}", format_error(&emu, &e, asm));
    }
    emu
}

/// Expect code to halt with a specific value in `reg`.
pub fn expect_register(asm: &str, reg: Gpr, expected: i32) {
    let emu = expect_halt(asm);
    let actual = emu.get_register(reg);
    if actual != expected {
        panic!(
            "Register {} mismatch: expected {}, got {}\n\n{}\nCode:\n{}",
            reg,
            expected,
            actual,
            emu.dump_state(),
            asm
        );
    }
}

/// Expect code to halt having written exactly `expected` to the UART.
pub fn expect_uart_output(asm: &str, expected: &[u8]) {
    let emu = expect_halt(asm);
    if emu.uart_output() != expected {
        panic!(
            "UART output mismatch: expected {:?}, got {:?}\n\n{}",
            String::from_utf8_lossy(expected),
            String::from_utf8_lossy(emu.uart_output()),
            emu.format_logs()
        );
    }
}

/// Expect code to fail with an error accepted by `check`.
pub fn expect_error<F>(asm: &str, check: F)
where
    F: FnOnce(&EmulatorError) -> bool,
{
    let mut emu = match debug_riscv32_asm(asm) {
        Ok(emu) => emu,
        Err(e) => panic!("{}\n\nCode:\n{}", e, asm),
    };
    match emu.run_until_halt() {
        Ok(_) => {
            panic!("Expected error but execution succeeded\n\nCode:\n{}", asm);
        }
        Err(e) => {
            if !check(&e) {
                panic!("Error check failed\n{}", format_error(&emu, &e, asm));
            }
        }
    }
}

/// Expect code to fail with an InvalidMemoryAccess error.
pub fn expect_memory_error(asm: &str) {
    expect_error(asm, |e| {
        matches!(e, EmulatorError::InvalidMemoryAccess { .. })
    });
}

/// Expect code to fail with an UnalignedAccess error.
pub fn expect_unaligned_error(asm: &str) {
    expect_error(asm, |e| matches!(e, EmulatorError::UnalignedAccess { .. }));
}
