//! Build configuration for the probe image.

use riscv32_encoder::Gpr;

/// Registers the probe program uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeRegisters {
    /// VirtIO MMIO base address.
    pub device_base: Gpr,
    /// Value read from the magic register.
    pub device_value: Gpr,
    /// Expected magic value.
    pub expected: Gpr,
    /// Address of the next message byte.
    pub cursor: Gpr,
    /// UART base address.
    pub port: Gpr,
    /// Current message byte.
    pub byte: Gpr,
}

impl Default for ProbeRegisters {
    fn default() -> Self {
        Self {
            device_base: Gpr::T3,
            device_value: Gpr::T4,
            expected: Gpr::T5,
            cursor: Gpr::T0,
            port: Gpr::T1,
            byte: Gpr::T2,
        }
    }
}

/// Addresses, sizes and messages of a probe image.
///
/// The data segment starts right after the text capacity, so string
/// addresses are `load_origin + text_capacity + offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    pub uart_base: u32,
    pub virtio_base: u32,
    /// Value the device's magic register must hold ("virt").
    pub expected_magic: u32,
    pub load_origin: u32,
    /// Maximum text size in bytes; the text is padded to exactly this.
    pub text_capacity: u32,
    pub regs: ProbeRegisters,
    pub pass_message: String,
    pub fail_message: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            uart_base: 0x0300_0000,
            virtio_base: 0x2000_0000,
            expected_magic: 0x7472_6976,
            load_origin: 0x8000_0000,
            text_capacity: 0x1000,
            regs: ProbeRegisters::default(),
            pass_message: String::from("PASS: VirtIO Found\n"),
            fail_message: String::from("FAIL: Magic Mismatch\n"),
        }
    }
}

impl ProbeConfig {
    /// Address of the first byte of the data segment.
    pub fn data_base(&self) -> u32 {
        self.load_origin.wrapping_add(self.text_capacity)
    }

    pub fn with_uart_base(mut self, base: u32) -> Self {
        self.uart_base = base;
        self
    }

    pub fn with_virtio_base(mut self, base: u32) -> Self {
        self.virtio_base = base;
        self
    }

    pub fn with_expected_magic(mut self, magic: u32) -> Self {
        self.expected_magic = magic;
        self
    }

    pub fn with_load_origin(mut self, origin: u32) -> Self {
        self.load_origin = origin;
        self
    }

    pub fn with_text_capacity(mut self, capacity: u32) -> Self {
        self.text_capacity = capacity;
        self
    }

    pub fn with_regs(mut self, regs: ProbeRegisters) -> Self {
        self.regs = regs;
        self
    }

    pub fn with_messages(mut self, pass: impl Into<String>, fail: impl Into<String>) -> Self {
        self.pass_message = pass.into();
        self.fail_message = fail.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = ProbeConfig::default();
        assert_eq!(cfg.data_base(), 0x8000_1000);
        assert_eq!(cfg.regs.cursor, Gpr::T0);
        assert_eq!(cfg.pass_message.len(), 19);
    }

    #[test]
    fn test_data_base_follows_origin() {
        let cfg = ProbeConfig::default()
            .with_load_origin(0x4000_0000)
            .with_text_capacity(0x200);
        assert_eq!(cfg.data_base(), 0x4000_0200);
    }
}
