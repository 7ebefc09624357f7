use riscv32_encoder::EncodeError;
use thiserror::Error;

use crate::asm::Label;

/// Errors that abort image generation. No output is produced on any of them.
#[derive(Debug, Error)]
pub enum GenError {
    #[error("encoding error: {0}")]
    Encode(#[from] EncodeError),

    #[error("text segment is {size} bytes, capacity is {capacity} bytes")]
    ImageTooLarge { size: usize, capacity: usize },

    #[error("label {0} is referenced but never bound")]
    UnboundLabel(Label),

    #[error("label {0} is bound twice")]
    LabelRebound(Label),

    #[error("label {0} belongs to a different assembler")]
    ForeignLabel(Label),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
