//! Core RISC-V 32-bit emulator implementation.

use alloc::{format, string::String, vec::Vec};

use riscv32_encoder::{Gpr, Inst};

use crate::{
    error::EmulatorError,
    executor::execute_instruction,
    logging::{InstLog, LogLevel},
    memory::{Memory, DEFAULT_RAM_SIZE, DEFAULT_RAM_START},
};

/// Rolling log buffer capacity.
const LOG_CAPACITY: usize = 100;

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Normal step completed, continue execution
    Continue,
    /// The instruction jumped to itself; execution can make no further progress
    Halted,
}

/// RISC-V 32-bit emulator.
///
/// The image is loaded at the start of RAM and execution begins there.
pub struct Riscv32Emulator {
    regs: [i32; 32],
    pc: u32,
    memory: Memory,
    instruction_count: u64,
    max_instructions: u64,
    log_level: LogLevel,
    log_buffer: Vec<InstLog>,
    last_error: Option<EmulatorError>,
}

impl Riscv32Emulator {
    /// Create an emulator with `image` loaded at 0x80000000 and 64 KiB of RAM.
    pub fn new(image: &[u8]) -> Self {
        Self::with_ram(image, DEFAULT_RAM_START, DEFAULT_RAM_SIZE)
    }

    /// Create an emulator with a custom RAM placement.
    pub fn with_ram(image: &[u8], ram_start: u32, ram_size: usize) -> Self {
        Self {
            regs: [0; 32],
            pc: ram_start,
            memory: Memory::new(image, ram_start, ram_size),
            instruction_count: 0,
            max_instructions: 100_000,
            log_level: LogLevel::None,
            log_buffer: Vec::new(),
            last_error: None,
        }
    }

    /// Set the maximum number of instructions to execute.
    pub fn with_max_instructions(mut self, limit: u64) -> Self {
        self.max_instructions = limit;
        self
    }

    /// Set the logging level.
    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Set the value the VirtIO device reports in its magic register.
    pub fn with_virtio_magic(mut self, magic: u32) -> Self {
        self.memory.virtio.magic = magic;
        self
    }

    /// Map the UART at `base` instead of 0x03000000.
    pub fn with_uart_base(mut self, base: u32) -> Self {
        self.memory = self.memory.with_uart_base(base);
        self
    }

    /// Map the VirtIO device at `base` instead of 0x20000000.
    pub fn with_virtio_base(mut self, base: u32) -> Self {
        self.memory = self.memory.with_virtio_base(base);
        self
    }

    /// Execute a single instruction.
    pub fn step(&mut self) -> Result<StepResult, EmulatorError> {
        let result = self.try_step();
        if let Err(e) = &result {
            self.log_error(e);
        }
        result
    }

    fn try_step(&mut self) -> Result<StepResult, EmulatorError> {
        if self.instruction_count >= self.max_instructions {
            return Err(EmulatorError::InstructionLimitExceeded {
                limit: self.max_instructions,
                executed: self.instruction_count,
                pc: self.pc,
            });
        }

        let word = self
            .memory
            .fetch_instruction(self.pc)
            .map_err(|e| e.at_pc(self.pc))?;

        let inst = Inst::decode(word).map_err(|reason| EmulatorError::InvalidInstruction {
            pc: self.pc,
            instruction: word,
            reason,
        })?;

        // Counted before execution so the first instruction is cycle 1
        self.instruction_count += 1;

        let result = execute_instruction(inst, self.pc, &mut self.regs, &mut self.memory)?;

        self.pc = result.new_pc.unwrap_or(self.pc.wrapping_add(4));

        self.log_instruction(result.log.set_cycle(self.instruction_count));

        if result.should_halt {
            log::debug!(
                "halted at 0x{:08x} after {} instructions",
                self.pc,
                self.instruction_count
            );
            Ok(StepResult::Halted)
        } else {
            Ok(StepResult::Continue)
        }
    }

    /// Run until the program halts, returning the number of instructions executed.
    pub fn run_until_halt(&mut self) -> Result<u64, EmulatorError> {
        loop {
            if self.step()? == StepResult::Halted {
                return Ok(self.instruction_count);
            }
        }
    }

    /// Get the value of a register.
    pub fn get_register(&self, reg: Gpr) -> i32 {
        if reg.num() == 0 {
            0
        } else {
            self.regs[reg.num() as usize]
        }
    }

    /// Set the value of a register.
    ///
    /// Note: Writing to x0 (ZERO) is a no-op.
    pub fn set_register(&mut self, reg: Gpr, value: i32) {
        if reg.num() != 0 {
            self.regs[reg.num() as usize] = value;
        }
    }

    /// Get the current program counter.
    pub fn get_pc(&self) -> u32 {
        self.pc
    }

    /// Get the number of instructions executed so far.
    pub fn get_instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Bytes the program wrote to the UART.
    pub fn uart_output(&self) -> &[u8] {
        self.memory.uart().output()
    }

    /// Get a reference to the memory (for inspection).
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Get captured log entries.
    pub fn get_logs(&self) -> &[InstLog] {
        &self.log_buffer
    }

    /// Format all captured logs as a string.
    pub fn format_logs(&self) -> String {
        let mut result = String::new();
        for log in &self.log_buffer {
            result.push_str(&format!("{}\n", log));
        }
        result
    }

    /// The error that last stopped a step, recorded at any level but `None`.
    pub fn last_error(&self) -> Option<&EmulatorError> {
        self.last_error.as_ref()
    }

    /// Clear captured log messages.
    pub fn clear_logs(&mut self) {
        self.log_buffer.clear();
        self.last_error = None;
    }

    /// Dump the current emulator state as a human-readable string.
    pub fn dump_state(&self) -> String {
        let mut result = String::new();
        result.push_str(&format!("PC: 0x{:08x}\n", self.pc));
        result.push_str(&format!(
            "Instructions executed: {}\n",
            self.instruction_count
        ));
        result.push_str("\nRegisters:\n");

        for num in 0..32 {
            let Ok(reg) = Gpr::new(num) else { continue };
            let value = self.get_register(reg);
            if value != 0 || reg == Gpr::ZERO {
                result.push_str(&format!(
                    "  {} (x{}) = 0x{:08x} ({})\n",
                    reg,
                    num,
                    value as u32,
                    value
                ));
            }
        }

        if let Some(e) = &self.last_error {
            result.push_str(&format!("\nError: {}\n", e));
        }

        let output = self.uart_output();
        if !output.is_empty() {
            result.push_str(&format!(
                "\nUART: {:?}\n",
                String::from_utf8_lossy(output)
            ));
        }

        result
    }

    fn log_error(&mut self, e: &EmulatorError) {
        if self.log_level != LogLevel::None {
            log::error!("{}", e);
            self.last_error = Some(e.clone());
        }
    }

    /// Log an instruction based on the current log level.
    fn log_instruction(&mut self, log: InstLog) {
        match self.log_level {
            LogLevel::None | LogLevel::Errors => {}
            LogLevel::Instructions | LogLevel::Verbose => {
                if self.log_level == LogLevel::Verbose {
                    log::trace!("{}", log);
                }
                if self.log_buffer.len() >= LOG_CAPACITY {
                    self.log_buffer.remove(0);
                }
                self.log_buffer.push(log);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use riscv32_encoder::{addi, jal, lw};

    fn image(words: &[u32]) -> Vec<u8> {
        words.iter().flat_map(|w| w.to_le_bytes()).collect()
    }

    #[test]
    fn test_entry_at_ram_start() {
        let emu = Riscv32Emulator::new(&[]);
        assert_eq!(emu.get_pc(), 0x8000_0000);
    }

    #[test]
    fn test_log_buffer_rolls() {
        // addi a0, a0, 1 repeated, then halt
        let mut words = Vec::new();
        for _ in 0..150 {
            words.push(addi(Gpr::A0, Gpr::A0, 1).unwrap());
        }
        words.push(jal(Gpr::ZERO, 0).unwrap());
        let mut emu =
            Riscv32Emulator::new(&image(&words)).with_log_level(LogLevel::Instructions);
        assert_eq!(emu.run_until_halt(), Ok(151));
        assert_eq!(emu.get_register(Gpr::A0), 150);
        let logs = emu.get_logs();
        assert_eq!(logs.len(), 100);
        assert_eq!(logs[0].cycle(), 52);
        assert_eq!(logs[99].cycle(), 151);
    }

    #[test]
    fn test_no_logs_by_default() {
        let words = [jal(Gpr::ZERO, 0).unwrap()];
        let mut emu = Riscv32Emulator::new(&image(&words));
        assert_eq!(emu.step(), Ok(StepResult::Halted));
        assert!(emu.get_logs().is_empty());
    }

    #[test]
    fn test_errors_level_records_failure() {
        // lw from an unmapped address
        let words = [lw(Gpr::T0, Gpr::ZERO, 0x100).unwrap()];
        let mut emu = Riscv32Emulator::new(&image(&words)).with_log_level(LogLevel::Errors);
        let err = emu.step().unwrap_err();
        assert_eq!(emu.last_error(), Some(&err));
        // no instruction entries at this level
        assert!(emu.get_logs().is_empty());
        assert!(emu.dump_state().contains("Error: "));

        let mut quiet = Riscv32Emulator::new(&image(&words));
        assert!(quiet.step().is_err());
        assert_eq!(quiet.last_error(), None);
    }

    #[test]
    fn test_dump_state() {
        let words = [addi(Gpr::T0, Gpr::ZERO, -1).unwrap(), jal(Gpr::ZERO, 0).unwrap()];
        let mut emu = Riscv32Emulator::new(&image(&words));
        emu.run_until_halt().unwrap();
        let state = emu.dump_state();
        assert!(state.contains("PC: 0x80000004"));
        assert!(state.contains("t0 (x5) = 0xffffffff (-1)"));
    }
}
