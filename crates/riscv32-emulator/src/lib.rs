//! RISC-V 32-bit emulator for running generated images.
//!
//! Executes the instruction subset of `riscv32-encoder` against a small
//! memory bus: RAM at the load origin, a UART transmit register and a VirtIO
//! MMIO register block. Bytes written to the UART are captured so tests can
//! compare a program's output.

#![no_std]

extern crate alloc;

mod devices;
mod emulator;
mod error;
mod executor;
mod helpers;
mod logging;
mod memory;

pub use devices::{Uart, VirtioMmio, UART_LSR_OFFSET, UART_THR_OFFSET, VIRTIO_MAGIC};
pub use emulator::{Riscv32Emulator, StepResult};
pub use error::{EmulatorError, MemoryAccessKind};
pub use helpers::{
    debug_riscv32_asm, debug_riscv32_ops, expect_error, expect_halt, expect_memory_error,
    expect_register, expect_uart_output, expect_unaligned_error,
};
pub use logging::{InstLog, LogLevel};
pub use memory::{
    Memory, DEFAULT_RAM_SIZE, DEFAULT_RAM_START, DEFAULT_UART_BASE, DEFAULT_VIRTIO_BASE,
    DEVICE_WINDOW,
};
