//! Fixed-width AVJ header layout.
//!
//! Every field is little-endian and packed with no alignment padding:
//!
//! ```text
//! plain:    magic(4) version(u16) height(u32) width(u32) channels(u8) caption_len(u16) mode_len(u8)
//! embedded: <plain fields> text_embedding_len(u32) image_embedding_len(u32)
//! ```
//!
//! Both layouts share the same magic and version. Nothing in the header says
//! which layout follows, so callers name the [`Variant`] when decoding.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::types::{AvjError, AvjResult};

/// Magic bytes: "AVJ1"
pub const AVJ_MAGIC: [u8; 4] = *b"AVJ1";

/// Current format version.
pub const FORMAT_VERSION: u16 = 1;

/// Channel count written for RGB pixel planes.
pub const CHANNELS_RGB: u8 = 3;

/// Header size of the plain (image + caption) layout.
pub const PLAIN_HEADER_SIZE: usize = 18;

/// Header size of the embedded (image + caption + embeddings) layout.
pub const EMBEDDED_HEADER_SIZE: usize = PLAIN_HEADER_SIZE + 8;

/// Largest caption the `u16` length field can describe.
pub const MAX_CAPTION_LEN: usize = u16::MAX as usize;

/// Largest colour mode the `u8` length field can describe.
pub const MAX_MODE_LEN: usize = u8::MAX as usize;

/// Largest embedding block the `u32` length fields can describe.
pub const MAX_EMBEDDING_LEN: usize = u32::MAX as usize;

/// Which of the two header layouts a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Variant A: caption, colour mode, pixels.
    Plain,
    /// Variant B: caption, colour mode, text and image embeddings, pixels.
    Embedded,
}

impl Variant {
    pub fn header_size(self) -> usize {
        match self {
            Variant::Plain => PLAIN_HEADER_SIZE,
            Variant::Embedded => EMBEDDED_HEADER_SIZE,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Plain => f.write_str("plain"),
            Variant::Embedded => f.write_str("embedded"),
        }
    }
}

impl FromStr for Variant {
    type Err = AvjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "plain" => Ok(Variant::Plain),
            "b" | "embedded" => Ok(Variant::Embedded),
            other => Err(AvjError::InvalidInput(format!(
                "Unknown variant {other:?} (expected a/plain or b/embedded)"
            ))),
        }
    }
}

/// Decoded header fields.
///
/// The embedding lengths are always zero for the plain layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub variant: Variant,
    pub version: u16,
    pub height: u32,
    pub width: u32,
    pub channels: u8,
    pub caption_len: u16,
    pub mode_len: u8,
    pub text_embedding_len: u32,
    pub image_embedding_len: u32,
}

impl Header {
    /// Total bytes declared for the caption, mode and embedding regions.
    pub fn declared_body_len(&self) -> u64 {
        self.caption_len as u64
            + self.mode_len as u64
            + self.text_embedding_len as u64
            + self.image_embedding_len as u64
    }

    /// Append the header bytes for `self.variant` to `out`.
    pub fn write_into(&self, out: &mut Vec<u8>) {
        let mut header = [0u8; EMBEDDED_HEADER_SIZE];
        header[0..4].copy_from_slice(&AVJ_MAGIC);
        write_u16(&mut header[4..6], self.version);
        write_u32(&mut header[6..10], self.height);
        write_u32(&mut header[10..14], self.width);
        header[14] = self.channels;
        write_u16(&mut header[15..17], self.caption_len);
        header[17] = self.mode_len;
        write_u32(&mut header[18..22], self.text_embedding_len);
        write_u32(&mut header[22..26], self.image_embedding_len);

        out.extend_from_slice(&header[..self.variant.header_size()]);
    }

    /// Parse and check the fixed prefix of `buf`.
    ///
    /// Checks run in order: length, magic, version. Region lengths are not
    /// compared against the buffer here.
    pub fn parse(buf: &[u8], variant: Variant) -> AvjResult<Self> {
        let size = variant.header_size();
        if buf.len() < size {
            return Err(AvjError::TruncatedHeader {
                variant,
                expected: size,
                found: buf.len(),
            });
        }

        let magic = [buf[0], buf[1], buf[2], buf[3]];
        if magic != AVJ_MAGIC {
            return Err(AvjError::BadMagic {
                expected: AVJ_MAGIC,
                found: magic,
            });
        }

        let version = read_u16(&buf[4..6]);
        if version != FORMAT_VERSION {
            return Err(AvjError::UnsupportedVersion {
                found: version,
                supported: FORMAT_VERSION,
            });
        }

        let (text_embedding_len, image_embedding_len) = match variant {
            Variant::Plain => (0, 0),
            Variant::Embedded => (read_u32(&buf[18..22]), read_u32(&buf[22..26])),
        };

        Ok(Self {
            variant,
            version,
            height: read_u32(&buf[6..10]),
            width: read_u32(&buf[10..14]),
            channels: buf[14],
            caption_len: read_u16(&buf[15..17]),
            mode_len: buf[17],
            text_embedding_len,
            image_embedding_len,
        })
    }
}

// Little-endian byte helpers
fn write_u16(buf: &mut [u8], val: u16) {
    buf[..2].copy_from_slice(&val.to_le_bytes());
}
fn write_u32(buf: &mut [u8], val: u32) {
    buf[..4].copy_from_slice(&val.to_le_bytes());
}
fn read_u16(buf: &[u8]) -> u16 {
    u16::from_le_bytes([buf[0], buf[1]])
}
fn read_u32(buf: &[u8]) -> u32 {
    u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]])
}
