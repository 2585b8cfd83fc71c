//! Serializable summary of an AVJ file, without its pixel data.

use serde::Serialize;

use crate::decoder::AvjView;
use crate::header::{Variant, AVJ_MAGIC};
use crate::similarity::cosine_similarity;

/// Everything in a file except the pixels themselves.
#[derive(Debug, Clone, Serialize)]
pub struct AvjMetadata {
    pub magic: String,
    pub variant: Variant,
    pub version: u16,
    pub height: u32,
    pub width: u32,
    pub channels: u8,
    pub caption: String,
    pub colour_mode: String,
    pub pixel_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_embedding: Option<Vec<f32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_embedding: Option<Vec<f32>>,
    /// Cosine similarity between the text and image embeddings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_image_similarity: Option<f32>,
}

impl AvjMetadata {
    pub fn from_view(view: &AvjView<'_>) -> Self {
        let pair = view.embeddings.map(|bytes| bytes.to_pair());
        let similarity = pair
            .as_ref()
            .map(|p| cosine_similarity(&p.text, &p.image));
        let (text_embedding, image_embedding) = match pair {
            Some(p) => (Some(p.text), Some(p.image)),
            None => (None, None),
        };

        Self {
            magic: String::from_utf8_lossy(&AVJ_MAGIC).into_owned(),
            variant: view.header.variant,
            version: view.header.version,
            height: view.header.height,
            width: view.header.width,
            channels: view.header.channels,
            caption: view.caption.to_string(),
            colour_mode: view.colour_mode.to_string(),
            pixel_bytes: view.pixels.len(),
            text_embedding,
            image_embedding,
            text_image_similarity: similarity,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
