//! Configuration loading and resolution.

use std::path::{Path, PathBuf};

use avj::{Variant, EMBEDDING_DIM};

/// Environment variable selecting the default layout.
pub const VARIANT_ENV: &str = "AVJ_VARIANT";

/// Environment variable overriding the fallback embedding dimension.
pub const EMBEDDING_DIM_ENV: &str = "AVJ_EMBEDDING_DIM";

/// Errors from configuration values.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Invalid variant in {source_name}: {value:?} (expected a/plain or b/embedded)")]
    InvalidVariant { source_name: String, value: String },

    #[error("Invalid embedding dimension in AVJ_EMBEDDING_DIM: {0:?}")]
    InvalidEmbeddingDim(String),
}

/// Resolve the file layout: explicit flag, then `AVJ_VARIANT`, then embedded.
pub fn resolve_variant(explicit: Option<&str>) -> Result<Variant, ConfigError> {
    if let Some(value) = explicit {
        return parse_variant(value, "--variant");
    }

    if let Ok(value) = std::env::var(VARIANT_ENV) {
        return parse_variant(&value, VARIANT_ENV);
    }

    Ok(Variant::Embedded)
}

fn parse_variant(value: &str, source_name: &str) -> Result<Variant, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidVariant {
        source_name: source_name.to_string(),
        value: value.to_string(),
    })
}

/// Resolve the zero-embedding dimension: `AVJ_EMBEDDING_DIM`, else 512.
pub fn resolve_embedding_dim() -> Result<usize, ConfigError> {
    match std::env::var(EMBEDDING_DIM_ENV) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidEmbeddingDim(value)),
        Err(_) => Ok(EMBEDDING_DIM),
    }
}

/// Resolve an output path.
///
/// Without an explicit path, `photo.png` encodes to `photo.png.avj` and
/// `photo.avj` exports to `photo.png`.
pub fn resolve_output_path(explicit: Option<&str>, input: &Path, extension: &str) -> PathBuf {
    if let Some(path) = explicit {
        return PathBuf::from(path);
    }

    let has_avj_ext = input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avj"));

    if has_avj_ext {
        input.with_extension(extension)
    } else {
        let mut name = input.as_os_str().to_owned();
        name.push(".");
        name.push(extension);
        PathBuf::from(name)
    }
}
