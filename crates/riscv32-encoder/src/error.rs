//! Encoding errors.

use thiserror::Error;

use crate::format::Format;

/// An operand that cannot be represented in its instruction field.
///
/// All operands of the probe program are build-time constants, so any of
/// these is a bug in the generator and aborts the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// Immediate (or branch/jump offset) outside the field's signed range.
    #[error("{format}-type immediate {value} out of range [{min}, {max}]")]
    ImmediateOutOfRange {
        format: Format,
        value: i64,
        min: i64,
        max: i64,
    },
    /// Branch/jump offset with bit 0 set; B and J forms cannot encode it.
    #[error("{format}-type offset {value} is not a multiple of 2")]
    MisalignedOffset { format: Format, value: i32 },
    /// Register number outside `0..32`.
    #[error("register number {0} out of range (must be < 32)")]
    InvalidRegister(u8),
}
