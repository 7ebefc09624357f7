//! Image layout: text, zero padding up to the text capacity, data.

use crate::{
    asm::{Text, TextAssembler},
    config::ProbeConfig,
    error::GenError,
    program::{emit_probe, ProbeLabels},
    strings::StringTable,
};

/// A generated probe image.
#[derive(Debug, Clone)]
pub struct Image {
    pub text: Text,
    pub labels: ProbeLabels,
    pub strings: StringTable,
    /// The flat binary: `capacity` bytes of padded text, then the data.
    pub bytes: Vec<u8>,
}

/// Lay out `text` and `data` into one flat binary.
///
/// Text larger than `capacity` is rejected; exactly `capacity` bytes is fine.
pub fn link(text: &[u8], data: &[u8], capacity: usize) -> Result<Vec<u8>, GenError> {
    if text.len() > capacity {
        return Err(GenError::ImageTooLarge {
            size: text.len(),
            capacity,
        });
    }
    let mut bytes = Vec::with_capacity(capacity + data.len());
    bytes.extend_from_slice(text);
    bytes.resize(capacity, 0);
    bytes.extend_from_slice(data);
    Ok(bytes)
}

/// Assemble the probe program for `cfg` and link it.
pub fn build_image(cfg: &ProbeConfig) -> Result<Image, GenError> {
    let mut asm = TextAssembler::new();
    let mut strings = StringTable::new(cfg.data_base());
    let labels = emit_probe(&mut asm, &mut strings, cfg)?;
    let text = asm.finish()?;

    let bytes = link(&text.to_bytes(), strings.data(), cfg.text_capacity as usize)?;
    log::debug!(
        "image: {} bytes text, {} bytes data, {} bytes total",
        text.len(),
        strings.data().len(),
        bytes.len()
    );

    Ok(Image {
        text,
        labels,
        strings,
        bytes,
    })
}
