//! Core data types for AVJ records and codec errors.

use crate::header::{Variant, CHANNELS_RGB};
use crate::pixels::ColourMode;

/// Caption used when the caller does not supply one.
pub const DEFAULT_CAPTION: &str = "No description";

/// A raw, uncompressed pixel plane handed to the codec by an image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelPlane {
    pub width: u32,
    pub height: u32,
    pub colour_mode: String,
    pub pixels: Vec<u8>,
}

/// Image, dimensions and caption shared by both layouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub colour_mode: String,
    pub caption: String,
    pub pixels: Vec<u8>,
}

impl ImageRecord {
    /// Build an RGB record from an interleaved 8-bit pixel run.
    pub fn rgb(width: u32, height: u32, caption: impl Into<String>, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            channels: CHANNELS_RGB,
            colour_mode: "RGB".to_string(),
            caption: caption.into(),
            pixels,
        }
    }

    /// Build a record from a pixel plane produced by a capture source.
    ///
    /// The channel count follows the plane's colour mode, so a non-RGB plane
    /// yields a record the encoder rejects.
    pub fn from_plane(plane: PixelPlane, caption: impl Into<String>) -> Self {
        let channels = plane
            .colour_mode
            .parse::<ColourMode>()
            .map(|mode| mode.bytes_per_pixel() as u8)
            .unwrap_or(CHANNELS_RGB);
        Self {
            width: plane.width,
            height: plane.height,
            channels,
            colour_mode: plane.colour_mode,
            caption: caption.into(),
            pixels: plane.pixels,
        }
    }

    /// Borrow the pixel data as a plane, e.g. for an embedding source.
    pub fn plane(&self) -> PixelPlane {
        PixelPlane {
            width: self.width,
            height: self.height,
            colour_mode: self.colour_mode.clone(),
            pixels: self.pixels.clone(),
        }
    }
}

/// The text and image embedding vectors stored by the embedded layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmbeddingPair {
    pub text: Vec<f32>,
    pub image: Vec<f32>,
}

/// An image record together with its embeddings.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedRecord {
    pub image: ImageRecord,
    pub embeddings: EmbeddingPair,
}

/// A decoded or to-be-encoded AVJ file.
///
/// The layout is carried by the variant itself: a `Plain` record can never
/// hold embeddings and an `Embedded` record always holds both.
#[derive(Debug, Clone, PartialEq)]
pub enum AvjRecord {
    Plain(ImageRecord),
    Embedded(EmbeddedRecord),
}

impl AvjRecord {
    /// Which on-disk layout this record encodes to.
    pub fn variant(&self) -> Variant {
        match self {
            AvjRecord::Plain(_) => Variant::Plain,
            AvjRecord::Embedded(_) => Variant::Embedded,
        }
    }

    /// The image part of the record.
    pub fn image(&self) -> &ImageRecord {
        match self {
            AvjRecord::Plain(image) => image,
            AvjRecord::Embedded(rec) => &rec.image,
        }
    }

    /// The embeddings, if this is an embedded record.
    pub fn embeddings(&self) -> Option<&EmbeddingPair> {
        match self {
            AvjRecord::Plain(_) => None,
            AvjRecord::Embedded(rec) => Some(&rec.embeddings),
        }
    }

    pub fn caption(&self) -> &str {
        &self.image().caption
    }
}

impl From<ImageRecord> for AvjRecord {
    fn from(image: ImageRecord) -> Self {
        AvjRecord::Plain(image)
    }
}

impl From<EmbeddedRecord> for AvjRecord {
    fn from(rec: EmbeddedRecord) -> Self {
        AvjRecord::Embedded(rec)
    }
}

/// Errors that can occur while building, encoding, decoding or materializing
/// AVJ data.
#[derive(thiserror::Error, Debug)]
pub enum AvjError {
    // Input validation (encoder).
    #[error("Field too large: {field} is {len} bytes, max {max}")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error(
        "Dimension mismatch: {width}x{height}x{channels} needs {expected} pixel bytes, got {actual}"
    )]
    DimensionMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: u64,
        actual: usize,
    },

    #[error("Unsupported channels: {found} (this format version stores {supported})")]
    UnsupportedChannels { found: u8, supported: u8 },

    #[error("Channel mismatch: colour mode {colour_mode} has {expected} channels, record says {channels}")]
    ChannelMismatch {
        colour_mode: String,
        expected: u8,
        channels: u8,
    },

    #[error("Zero dimension: image is {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },

    #[error("Variant mismatch: record is {record}, requested {requested}")]
    VariantMismatch { record: Variant, requested: Variant },

    // Structural corruption (decoder).
    #[error("Truncated header: {variant} header needs {expected} bytes, buffer has {found}")]
    TruncatedHeader {
        variant: Variant,
        expected: usize,
        found: usize,
    },

    #[error("Bad magic: expected {expected:02X?}, found {found:02X?}")]
    BadMagic { expected: [u8; 4], found: [u8; 4] },

    #[error("Unsupported version: {found} (supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },

    #[error("Truncated body: regions from offset {offset} need {needed} bytes, {available} available")]
    TruncatedBody {
        offset: usize,
        needed: u64,
        available: usize,
    },

    #[error("Invalid text: {field} at offset {offset} is not UTF-8: {source}")]
    InvalidText {
        field: &'static str,
        offset: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Malformed embedding: {field} is {len} bytes, not a multiple of 4")]
    MalformedEmbedding { field: &'static str, len: u32 },

    // Lazy materialization (reconstruction).
    #[error("Pixel count mismatch: expected {expected} bytes, got {actual}")]
    PixelCountMismatch { expected: u64, actual: usize },

    #[error("Unknown colour mode: {0:?}")]
    UnknownColourMode(String),

    #[error("Unsupported conversion: cannot export {0} pixels as an image")]
    UnsupportedConversion(String),

    // Collaborators.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding error: {0}")]
    Embedding(String),
}

/// Convenience result type.
pub type AvjResult<T> = Result<T, AvjError>;
