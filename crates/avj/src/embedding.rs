//! Embedding sources feeding the embedded layout.
//!
//! The codec never computes embeddings. A model-backed source lives outside
//! this crate and plugs in through [`EmbeddingSource`]; the sources here
//! replay vectors from a JSON file or produce zero vectors.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{AvjError, AvjResult, EmbeddedRecord, EmbeddingPair, ImageRecord, PixelPlane};

/// Default embedding dimension for CLIP ViT-B/32.
pub const EMBEDDING_DIM: usize = 512;

/// Something that can turn a caption and a pixel plane into vectors.
pub trait EmbeddingSource {
    fn embed_text(&mut self, caption: &str) -> AvjResult<Vec<f32>>;
    fn embed_image(&mut self, plane: &PixelPlane) -> AvjResult<Vec<f32>>;
}

/// Attach embeddings from `source` to an image record.
pub fn embed_record<S: EmbeddingSource + ?Sized>(
    source: &mut S,
    image: ImageRecord,
) -> AvjResult<EmbeddedRecord> {
    let text = source.embed_text(&image.caption)?;
    let image_vec = source.embed_image(&image.plane())?;
    Ok(EmbeddedRecord {
        image,
        embeddings: EmbeddingPair {
            text,
            image: image_vec,
        },
    })
}

/// Precomputed vectors loaded from `{"text": [...], "image": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingFile {
    pub text: Vec<f32>,
    pub image: Vec<f32>,
}

impl EmbeddingFile {
    pub fn load(path: &Path) -> AvjResult<Self> {
        let data = std::fs::read(path)?;
        let file: Self = serde_json::from_slice(&data)?;
        tracing::info!(
            "Loaded embeddings from {} (text dim {}, image dim {})",
            path.display(),
            file.text.len(),
            file.image.len()
        );
        Ok(file)
    }
}

impl EmbeddingSource for EmbeddingFile {
    fn embed_text(&mut self, _caption: &str) -> AvjResult<Vec<f32>> {
        Ok(self.text.clone())
    }

    fn embed_image(&mut self, _plane: &PixelPlane) -> AvjResult<Vec<f32>> {
        Ok(self.image.clone())
    }
}

/// Zero vectors of a fixed dimension, used when no real source is available.
#[derive(Debug, Clone)]
pub struct FallbackEmbeddings {
    dim: usize,
}

impl FallbackEmbeddings {
    pub fn new(dim: usize) -> AvjResult<Self> {
        if dim > u32::MAX as usize / 4 {
            return Err(AvjError::Embedding(format!(
                "Embedding dimension {dim} does not fit the header"
            )));
        }
        tracing::warn!(
            "No embedding source configured. Writing zero embeddings of dimension {dim}."
        );
        Ok(Self { dim })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }
}

impl EmbeddingSource for FallbackEmbeddings {
    fn embed_text(&mut self, _caption: &str) -> AvjResult<Vec<f32>> {
        tracing::debug!("Fallback text embedding");
        Ok(vec![0.0; self.dim])
    }

    fn embed_image(&mut self, _plane: &PixelPlane) -> AvjResult<Vec<f32>> {
        tracing::debug!("Fallback image embedding");
        Ok(vec![0.0; self.dim])
    }
}
