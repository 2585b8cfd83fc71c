//! avj command line — encode images into .avj files and read them back.

pub mod commands;
pub mod config;

pub use commands::{encode_image, export_png, read_metadata, validate, EncodeOptions};
pub use config::{resolve_embedding_dim, resolve_output_path, resolve_variant};
