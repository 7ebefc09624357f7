//! Memory bus for the RISC-V 32 emulator.
//!
//! Three regions are mapped: RAM holding the loaded image, the UART window
//! and the VirtIO MMIO window. Any other address faults. Instructions are
//! only fetched from RAM.

use alloc::{vec, vec::Vec};

use crate::{
    devices::{Uart, VirtioMmio},
    error::{EmulatorError, MemoryAccessKind},
};

/// Default RAM start address; images are loaded and entered here.
pub const DEFAULT_RAM_START: u32 = 0x8000_0000;
/// Default RAM size (64 KiB).
pub const DEFAULT_RAM_SIZE: usize = 64 * 1024;
pub const DEFAULT_UART_BASE: u32 = 0x0300_0000;
pub const DEFAULT_VIRTIO_BASE: u32 = 0x2000_0000;
/// Size of each device window.
pub const DEVICE_WINDOW: u32 = 0x1000;

enum Region {
    Ram(usize),
    Uart(u32),
    Virtio(u32),
}

/// RAM plus the two device windows.
pub struct Memory {
    ram: Vec<u8>,
    ram_start: u32,
    uart_base: u32,
    virtio_base: u32,
    pub(crate) uart: Uart,
    pub(crate) virtio: VirtioMmio,
}

impl Memory {
    /// Create a bus with `ram_size` bytes of RAM at `ram_start`, `image`
    /// copied to its start. RAM is grown to fit the image if needed.
    pub fn new(image: &[u8], ram_start: u32, ram_size: usize) -> Self {
        let mut ram = vec![0; ram_size.max(image.len())];
        ram[..image.len()].copy_from_slice(image);
        Self {
            ram,
            ram_start,
            uart_base: DEFAULT_UART_BASE,
            virtio_base: DEFAULT_VIRTIO_BASE,
            uart: Uart::new(),
            virtio: VirtioMmio::default(),
        }
    }

    /// Create a bus with the default layout.
    pub fn with_default_addresses(image: &[u8]) -> Self {
        Self::new(image, DEFAULT_RAM_START, DEFAULT_RAM_SIZE)
    }

    /// Map the UART window at `base`.
    pub fn with_uart_base(mut self, base: u32) -> Self {
        self.uart_base = base;
        self
    }

    /// Map the VirtIO window at `base`.
    pub fn with_virtio_base(mut self, base: u32) -> Self {
        self.virtio_base = base;
        self
    }

    pub fn uart_base(&self) -> u32 {
        self.uart_base
    }

    pub fn virtio_base(&self) -> u32 {
        self.virtio_base
    }

    fn region(
        &self,
        address: u32,
        size: usize,
        kind: MemoryAccessKind,
    ) -> Result<Region, EmulatorError> {
        let fault = EmulatorError::InvalidMemoryAccess {
            address,
            size,
            kind,
            pc: 0,
        };
        if let Some(offset) = address.checked_sub(self.ram_start) {
            let offset = offset as usize;
            if offset + size <= self.ram.len() {
                return Ok(Region::Ram(offset));
            }
        }
        if kind == MemoryAccessKind::InstructionFetch {
            return Err(fault);
        }
        if let Some(offset) = address.checked_sub(self.uart_base) {
            if offset < DEVICE_WINDOW {
                return Ok(Region::Uart(offset));
            }
        }
        if let Some(offset) = address.checked_sub(self.virtio_base) {
            if offset < DEVICE_WINDOW {
                return Ok(Region::Virtio(offset));
            }
        }
        Err(fault)
    }

    fn check_alignment(address: u32, alignment: usize) -> Result<(), EmulatorError> {
        if address as usize % alignment != 0 {
            return Err(EmulatorError::UnalignedAccess {
                address,
                alignment,
                pc: 0,
            });
        }
        Ok(())
    }

    /// Read a byte.
    pub fn read_u8(&self, address: u32) -> Result<u8, EmulatorError> {
        Ok(match self.region(address, 1, MemoryAccessKind::Read)? {
            Region::Ram(offset) => self.ram[offset],
            Region::Uart(offset) => self.uart.read_u8(offset),
            Region::Virtio(offset) => self.virtio.read_u8(offset),
        })
    }

    /// Read a little-endian 32-bit word. The address must be 4-byte aligned.
    pub fn read_u32(&self, address: u32) -> Result<u32, EmulatorError> {
        Self::check_alignment(address, 4)?;
        Ok(match self.region(address, 4, MemoryAccessKind::Read)? {
            Region::Ram(offset) => u32::from_le_bytes([
                self.ram[offset],
                self.ram[offset + 1],
                self.ram[offset + 2],
                self.ram[offset + 3],
            ]),
            Region::Uart(offset) => self.uart.read_u8(offset) as u32,
            Region::Virtio(offset) => self.virtio.read_u32(offset),
        })
    }

    /// Write a byte. Writes to the VirtIO window are ignored.
    pub fn write_u8(&mut self, address: u32, value: u8) -> Result<(), EmulatorError> {
        match self.region(address, 1, MemoryAccessKind::Write)? {
            Region::Ram(offset) => self.ram[offset] = value,
            Region::Uart(offset) => self.uart.write_u8(offset, value),
            Region::Virtio(_) => {}
        }
        Ok(())
    }

    /// Fetch a 32-bit instruction. Only RAM is executable.
    pub fn fetch_instruction(&self, address: u32) -> Result<u32, EmulatorError> {
        Self::check_alignment(address, 4)?;
        match self.region(address, 4, MemoryAccessKind::InstructionFetch)? {
            Region::Ram(offset) => Ok(u32::from_le_bytes([
                self.ram[offset],
                self.ram[offset + 1],
                self.ram[offset + 2],
                self.ram[offset + 3],
            ])),
            _ => Err(EmulatorError::InvalidMemoryAccess {
                address,
                size: 4,
                kind: MemoryAccessKind::InstructionFetch,
                pc: 0,
            }),
        }
    }

    pub fn ram_start(&self) -> u32 {
        self.ram_start
    }

    /// Get a reference to the RAM region (for inspection).
    pub fn ram(&self) -> &[u8] {
        &self.ram
    }

    pub fn uart(&self) -> &Uart {
        &self.uart
    }

    pub fn virtio(&self) -> &VirtioMmio {
        &self.virtio
    }
}
