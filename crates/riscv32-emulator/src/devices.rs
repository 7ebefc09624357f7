//! Memory-mapped devices: a 16550-style UART and a VirtIO MMIO header.

use alloc::vec::Vec;

/// Transmit holding register.
pub const UART_THR_OFFSET: u32 = 0x0;
/// Line status register.
pub const UART_LSR_OFFSET: u32 = 0x5;

/// THR empty | transmitter idle.
const LSR_TX_IDLE: u8 = 0x60;

/// Output-only UART. Every byte stored to THR is captured.
#[derive(Debug, Clone, Default)]
pub struct Uart {
    output: Vec<u8>,
}

impl Uart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_u8(&self, offset: u32) -> u8 {
        match offset {
            UART_LSR_OFFSET => LSR_TX_IDLE,
            _ => 0,
        }
    }

    pub fn write_u8(&mut self, offset: u32, value: u8) {
        if offset == UART_THR_OFFSET {
            log::trace!("uart: {:?}", value as char);
            self.output.push(value);
        }
    }

    /// Bytes written to THR so far, in order.
    pub fn output(&self) -> &[u8] {
        &self.output
    }
}

const VIRTIO_MAGIC_OFFSET: u32 = 0x000;
const VIRTIO_VERSION_OFFSET: u32 = 0x004;
const VIRTIO_DEVICE_ID_OFFSET: u32 = 0x008;
const VIRTIO_VENDOR_ID_OFFSET: u32 = 0x00c;

/// "virt" in little-endian byte order.
pub const VIRTIO_MAGIC: u32 = 0x7472_6976;
/// "QEMU"
const VIRTIO_VENDOR_QEMU: u32 = 0x554d_4551;

/// Read-only identification registers of a VirtIO MMIO device.
///
/// Unknown offsets read as zero and writes are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtioMmio {
    pub magic: u32,
    pub version: u32,
    pub device_id: u32,
    pub vendor_id: u32,
}

impl Default for VirtioMmio {
    fn default() -> Self {
        Self {
            magic: VIRTIO_MAGIC,
            version: 2,
            // entropy source
            device_id: 9,
            vendor_id: VIRTIO_VENDOR_QEMU,
        }
    }
}

impl VirtioMmio {
    pub fn read_u32(&self, offset: u32) -> u32 {
        match offset {
            VIRTIO_MAGIC_OFFSET => self.magic,
            VIRTIO_VERSION_OFFSET => self.version,
            VIRTIO_DEVICE_ID_OFFSET => self.device_id,
            VIRTIO_VENDOR_ID_OFFSET => self.vendor_id,
            _ => 0,
        }
    }

    /// Byte view of the little-endian registers.
    pub fn read_u8(&self, offset: u32) -> u8 {
        let word = self.read_u32(offset & !3);
        (word >> ((offset & 3) * 8)) as u8
    }
}
