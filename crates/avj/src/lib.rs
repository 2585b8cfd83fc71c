//! AVJ — a binary container bundling a raw image, a caption and optional
//! text/image embeddings in one file.

pub mod capture;
pub mod decoder;
pub mod embedding;
pub mod encoder;
pub mod header;
pub mod metadata;
pub mod pixels;
pub mod similarity;
pub mod storage;
pub mod types;

pub use capture::{capture_from_file, is_supported_format, pixel_plane};
pub use decoder::{decode, decode_view, AvjView, EmbeddingBytes};
pub use embedding::{
    embed_record, EmbeddingFile, EmbeddingSource, FallbackEmbeddings, EMBEDDING_DIM,
};
pub use encoder::{encode, encode_as};
pub use header::{Header, Variant};
pub use metadata::AvjMetadata;
pub use pixels::{reconstruct_pixels, ColourMode, PixelGrid};
pub use similarity::cosine_similarity;
pub use storage::{AvjReader, AvjWriter, MappedAvj};
pub use types::*;
