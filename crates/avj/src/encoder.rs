//! Record to byte-buffer encoding.

use crate::header::{
    Header, Variant, CHANNELS_RGB, FORMAT_VERSION, MAX_CAPTION_LEN, MAX_EMBEDDING_LEN,
    MAX_MODE_LEN,
};
use crate::pixels::ColourMode;
use crate::types::{AvjError, AvjRecord, AvjResult, EmbeddingPair, ImageRecord};

/// Encode a record into a complete AVJ buffer.
///
/// The layout follows the record's variant. All validation happens before
/// the output buffer is allocated, so a failed call produces nothing.
pub fn encode(record: &AvjRecord) -> AvjResult<Vec<u8>> {
    let image = record.image();
    let embeddings = record.embeddings();

    check_len("caption", image.caption.len(), MAX_CAPTION_LEN)?;
    check_len("colour_mode", image.colour_mode.len(), MAX_MODE_LEN)?;
    check_channels(image)?;
    check_dimensions(image)?;

    let (text_len, image_len) = match embeddings {
        Some(pair) => embedding_lens(pair)?,
        None => (0, 0),
    };

    let header = Header {
        variant: record.variant(),
        version: FORMAT_VERSION,
        height: image.height,
        width: image.width,
        channels: image.channels,
        caption_len: image.caption.len() as u16,
        mode_len: image.colour_mode.len() as u8,
        text_embedding_len: text_len as u32,
        image_embedding_len: image_len as u32,
    };

    let total = header.variant.header_size()
        + image.caption.len()
        + image.colour_mode.len()
        + text_len
        + image_len
        + image.pixels.len();

    let mut out = Vec::with_capacity(total);
    header.write_into(&mut out);
    out.extend_from_slice(image.caption.as_bytes());
    out.extend_from_slice(image.colour_mode.as_bytes());
    if let Some(pair) = embeddings {
        write_f32s(&mut out, &pair.text);
        write_f32s(&mut out, &pair.image);
    }
    out.extend_from_slice(&image.pixels);

    debug_assert_eq!(out.len(), total);
    Ok(out)
}

/// Encode a record, insisting that it matches the requested layout.
pub fn encode_as(record: &AvjRecord, variant: Variant) -> AvjResult<Vec<u8>> {
    if record.variant() != variant {
        return Err(AvjError::VariantMismatch {
            record: record.variant(),
            requested: variant,
        });
    }
    encode(record)
}

fn check_len(field: &'static str, len: usize, max: usize) -> AvjResult<()> {
    if len > max {
        return Err(AvjError::FieldTooLarge { field, len, max });
    }
    Ok(())
}

fn check_channels(image: &ImageRecord) -> AvjResult<()> {
    if image.channels != CHANNELS_RGB {
        return Err(AvjError::UnsupportedChannels {
            found: image.channels,
            supported: CHANNELS_RGB,
        });
    }

    // Unknown mode strings are stored as-is; known ones must agree.
    if let Ok(mode) = image.colour_mode.parse::<ColourMode>() {
        let expected = mode.bytes_per_pixel() as u8;
        if expected != image.channels {
            return Err(AvjError::ChannelMismatch {
                colour_mode: image.colour_mode.clone(),
                expected,
                channels: image.channels,
            });
        }
    }
    Ok(())
}

fn check_dimensions(image: &ImageRecord) -> AvjResult<()> {
    if image.width == 0 || image.height == 0 {
        return Err(AvjError::ZeroDimension {
            width: image.width,
            height: image.height,
        });
    }

    let expected = image.width as u64 * image.height as u64 * image.channels as u64;
    if image.pixels.len() as u64 != expected {
        return Err(AvjError::DimensionMismatch {
            width: image.width,
            height: image.height,
            channels: image.channels,
            expected,
            actual: image.pixels.len(),
        });
    }
    Ok(())
}

fn embedding_lens(pair: &EmbeddingPair) -> AvjResult<(usize, usize)> {
    let text = pair.text.len().saturating_mul(4);
    let image = pair.image.len().saturating_mul(4);
    check_len("text_embedding", text, MAX_EMBEDDING_LEN)?;
    check_len("image_embedding", image, MAX_EMBEDDING_LEN)?;
    Ok((text, image))
}

fn write_f32s(out: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}
