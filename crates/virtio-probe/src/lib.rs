//! Generator for the VirtIO probe image.
//!
//! The image is a flat binary loaded at 0x80000000: a text segment of at most
//! 4 KiB, zero padded to exactly 4 KiB, followed by a data segment holding
//! NUL-terminated strings. The program reads the magic register of a VirtIO
//! MMIO device, compares it with the expected signature and prints a PASS or
//! FAIL line to a memory-mapped UART before spinning forever.
//!
//! ```no_run
//! use virtio_probe::{build_image, ProbeConfig};
//!
//! let image = build_image(&ProbeConfig::default())?;
//! std::fs::write("virtio_test.bin", &image.bytes)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod asm;
mod config;
mod error;
mod image;
mod program;
mod pseudo;
mod strings;

pub use asm::{Label, Text, TextAssembler};
pub use config::{ProbeConfig, ProbeRegisters};
pub use error::GenError;
pub use image::{build_image, link, Image};
pub use program::{emit_probe, emit_puts, ProbeLabels};
pub use pseudo::{load_constant, split_constant, ConstantSplit};
pub use strings::StringTable;
