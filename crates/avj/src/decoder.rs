//! Byte-buffer to record decoding.
//!
//! [`decode_view`] slices the input without copying; the returned
//! [`AvjView`] borrows from the buffer and cannot outlive it. [`decode`]
//! copies everything into an owned [`AvjRecord`].
//!
//! The pixel region is simply whatever follows the last declared region. It
//! is not checked against the header dimensions here; see
//! [`crate::pixels::reconstruct_pixels`].

use crate::header::{Header, Variant};
use crate::types::{AvjError, AvjRecord, AvjResult, EmbeddedRecord, EmbeddingPair, ImageRecord};

/// Raw little-endian f32 blocks of an embedded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbeddingBytes<'a> {
    pub text: &'a [u8],
    pub image: &'a [u8],
}

impl EmbeddingBytes<'_> {
    pub fn text_dim(&self) -> usize {
        self.text.len() / 4
    }

    pub fn image_dim(&self) -> usize {
        self.image.len() / 4
    }

    pub fn to_pair(&self) -> EmbeddingPair {
        EmbeddingPair {
            text: read_f32s(self.text),
            image: read_f32s(self.image),
        }
    }
}

/// A validated AVJ file borrowing its regions from the input buffer.
#[derive(Debug, Clone, Copy)]
pub struct AvjView<'a> {
    pub header: Header,
    pub caption: &'a str,
    pub colour_mode: &'a str,
    pub embeddings: Option<EmbeddingBytes<'a>>,
    pub pixels: &'a [u8],
}

impl AvjView<'_> {
    /// Copy the view into an owned record.
    pub fn to_record(&self) -> AvjRecord {
        let image = ImageRecord {
            width: self.header.width,
            height: self.header.height,
            channels: self.header.channels,
            colour_mode: self.colour_mode.to_string(),
            caption: self.caption.to_string(),
            pixels: self.pixels.to_vec(),
        };
        match self.embeddings {
            None => AvjRecord::Plain(image),
            Some(bytes) => AvjRecord::Embedded(EmbeddedRecord {
                image,
                embeddings: bytes.to_pair(),
            }),
        }
    }
}

/// Decode `buf` as an AVJ file of the given layout into an owned record.
pub fn decode(buf: &[u8], variant: Variant) -> AvjResult<AvjRecord> {
    decode_view(buf, variant).map(|view| view.to_record())
}

/// Decode `buf` without copying any region out of it.
pub fn decode_view(buf: &[u8], variant: Variant) -> AvjResult<AvjView<'_>> {
    let header = Header::parse(buf, variant)?;

    let offset = variant.header_size();
    let available = buf.len() - offset;
    let needed = header.declared_body_len();
    if needed > available as u64 {
        return Err(AvjError::TruncatedBody {
            offset,
            needed,
            available,
        });
    }

    let mut cursor = Cursor { buf, pos: offset };
    let caption_bytes = cursor.take(header.caption_len as usize);
    let mode_bytes = cursor.take(header.mode_len as usize);
    let text_bytes = cursor.take(header.text_embedding_len as usize);
    let image_bytes = cursor.take(header.image_embedding_len as usize);
    let pixels = cursor.rest();

    let caption = utf8("caption", caption_bytes, offset)?;
    let colour_mode = utf8("colour_mode", mode_bytes, offset + caption_bytes.len())?;

    let embeddings = match variant {
        Variant::Plain => None,
        Variant::Embedded => {
            check_embedding("text_embedding", header.text_embedding_len)?;
            check_embedding("image_embedding", header.image_embedding_len)?;
            Some(EmbeddingBytes {
                text: text_bytes,
                image: image_bytes,
            })
        }
    };

    Ok(AvjView {
        header,
        caption,
        colour_mode,
        embeddings,
        pixels,
    })
}

/// Slices consecutive regions. Callers check the total length first.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> &'a [u8] {
        let region = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        region
    }

    fn rest(self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

fn utf8<'a>(field: &'static str, bytes: &'a [u8], offset: usize) -> AvjResult<&'a str> {
    std::str::from_utf8(bytes).map_err(|source| AvjError::InvalidText {
        field,
        offset: offset + source.valid_up_to(),
        source,
    })
}

fn check_embedding(field: &'static str, len: u32) -> AvjResult<()> {
    if len % 4 != 0 {
        return Err(AvjError::MalformedEmbedding { field, len });
    }
    Ok(())
}

fn read_f32s(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::encode;

    fn plain_record() -> AvjRecord {
        AvjRecord::Plain(ImageRecord::rgb(2, 1, "hi", vec![255, 0, 0, 0, 255, 0]))
    }

    fn embedded_record() -> AvjRecord {
        AvjRecord::Embedded(EmbeddedRecord {
            image: ImageRecord::rgb(2, 1, "hi", vec![255, 0, 0, 0, 255, 0]),
            embeddings: EmbeddingPair {
                text: vec![0.25, -1.0, 3.5],
                image: vec![f32::MIN_POSITIVE, f32::MAX],
            },
        })
    }

    #[test]
    fn test_roundtrip_plain() {
        let record = plain_record();
        let buf = encode(&record).unwrap();
        assert_eq!(decode(&buf, Variant::Plain).unwrap(), record);
    }

    #[test]
    fn test_roundtrip_embedded() {
        let record = embedded_record();
        let buf = encode(&record).unwrap();
        assert_eq!(decode(&buf, Variant::Embedded).unwrap(), record);
    }

    #[test]
    fn test_view_borrows_input() {
        let buf = encode(&embedded_record()).unwrap();
        let view = decode_view(&buf, Variant::Embedded).unwrap();
        assert_eq!(view.caption, "hi");
        assert_eq!(view.colour_mode, "RGB");
        let emb = view.embeddings.unwrap();
        assert_eq!(emb.text_dim(), 3);
        assert_eq!(emb.image_dim(), 2);
        assert_eq!(view.pixels.as_ptr(), buf[buf.len() - 6..].as_ptr());
    }

    #[test]
    fn test_pixels_not_checked_against_dimensions() {
        let mut buf = encode(&plain_record()).unwrap();
        buf.extend_from_slice(&[1, 2, 3, 4]);
        let record = decode(&buf, Variant::Plain).unwrap();
        assert_eq!(record.image().pixels.len(), 10);

        buf.truncate(buf.len() - 10);
        let record = decode(&buf, Variant::Plain).unwrap();
        assert!(record.image().pixels.is_empty());
    }

    #[test]
    fn test_adversarial_caption_len() {
        let mut buf = encode(&plain_record()).unwrap();
        buf.truncate(20);
        buf[15] = 0xFF;
        buf[16] = 0xFF;
        let result = decode(&buf, Variant::Plain);
        assert!(matches!(
            result,
            Err(AvjError::TruncatedBody {
                offset: 18,
                available: 2,
                ..
            })
        ));
    }

    #[test]
    fn test_huge_embedding_lengths() {
        let mut buf = encode(&embedded_record()).unwrap();
        buf[18..22].copy_from_slice(&u32::MAX.to_le_bytes());
        buf[22..26].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            decode(&buf, Variant::Embedded),
            Err(AvjError::TruncatedBody { .. })
        ));
    }

    #[test]
    fn test_invalid_caption_utf8() {
        let mut buf = encode(&plain_record()).unwrap();
        buf[19] = 0xFF;
        assert!(matches!(
            decode(&buf, Variant::Plain),
            Err(AvjError::InvalidText {
                field: "caption",
                offset: 19,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_mode_utf8() {
        let mut buf = encode(&plain_record()).unwrap();
        buf[20] = 0xC3;
        assert!(matches!(
            decode(&buf, Variant::Plain),
            Err(AvjError::InvalidText {
                field: "colour_mode",
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_embedding_len() {
        let mut buf = encode(&embedded_record()).unwrap();
        // Shrink the text block by one byte; the extra byte spills into the
        // image block, keeping the total within the buffer.
        buf[18..22].copy_from_slice(&11u32.to_le_bytes());
        assert!(matches!(
            decode(&buf, Variant::Embedded),
            Err(AvjError::MalformedEmbedding {
                field: "text_embedding",
                len: 11
            })
        ));
    }

    #[test]
    fn test_plain_file_read_as_embedded_fails() {
        // A 29-byte plain file read with the 26-byte embedded header picks up
        // caption and mode bytes as embedding lengths.
        let buf = encode(&plain_record()).unwrap();
        assert!(decode(&buf, Variant::Embedded).is_err());
    }

    #[test]
    fn test_empty_embeddings() {
        let record = AvjRecord::Embedded(EmbeddedRecord {
            image: ImageRecord::rgb(1, 1, "", vec![1, 2, 3]),
            embeddings: EmbeddingPair::default(),
        });
        let buf = encode(&record).unwrap();
        assert_eq!(decode(&buf, Variant::Embedded).unwrap(), record);
    }
}
