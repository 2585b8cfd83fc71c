//! Command implementations behind the `avj` binary.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use avj::{
    capture_from_file, embed_record, is_supported_format, pixel_plane, reconstruct_pixels,
    AvjMetadata, AvjRecord, AvjWriter, EmbeddingFile, EmbeddingSource, FallbackEmbeddings,
    ImageRecord, MappedAvj, Variant,
};

/// Options for `avj encode`.
#[derive(Debug, Clone)]
pub struct EncodeOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub caption: String,
    pub variant: Variant,
    pub embeddings: Option<PathBuf>,
    pub embedding_dim: usize,
}

/// What `avj encode` produced.
#[derive(Debug, Clone, Serialize)]
pub struct EncodeSummary {
    pub output: PathBuf,
    pub variant: Variant,
    pub width: u32,
    pub height: u32,
    pub bytes: u64,
}

/// Result of `avj validate`.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateReport {
    pub path: PathBuf,
    pub variant: Variant,
    pub bytes: usize,
    pub width: u32,
    pub height: u32,
    pub colour_mode: String,
    pub caption_bytes: usize,
    pub text_embedding_dim: Option<usize>,
    pub image_embedding_dim: Option<usize>,
    pub pixel_error: Option<String>,
}

impl ValidateReport {
    pub fn is_valid(&self) -> bool {
        self.pixel_error.is_none()
    }
}

/// Load an image, attach caption and (for the embedded layout) embeddings,
/// and write the .avj file.
pub fn encode_image(opts: &EncodeOptions) -> anyhow::Result<EncodeSummary> {
    if !is_supported_format(&opts.input) {
        anyhow::bail!(
            "Unsupported image format: {} (expected png, jpg, webp, gif, bmp or tiff)",
            opts.input.display()
        );
    }

    let img = capture_from_file(&opts.input)
        .with_context(|| format!("Failed to load image {}", opts.input.display()))?;
    let image = ImageRecord::from_plane(pixel_plane(&img), opts.caption.clone());
    let (width, height) = (image.width, image.height);

    let record = match opts.variant {
        Variant::Plain => {
            if opts.embeddings.is_some() {
                tracing::warn!("Ignoring --embeddings for the plain layout");
            }
            AvjRecord::Plain(image)
        }
        Variant::Embedded => {
            let mut source: Box<dyn EmbeddingSource> = match &opts.embeddings {
                Some(path) => Box::new(EmbeddingFile::load(path).with_context(|| {
                    format!("Failed to load embeddings {}", path.display())
                })?),
                None => Box::new(FallbackEmbeddings::new(opts.embedding_dim)?),
            };
            AvjRecord::Embedded(embed_record(source.as_mut(), image)?)
        }
    };

    AvjWriter::write_to_file(&record, &opts.output)
        .with_context(|| format!("Failed to write {}", opts.output.display()))?;
    let bytes = std::fs::metadata(&opts.output)?.len();

    tracing::info!(
        "Encoded {} as {} .avj ({bytes} bytes)",
        opts.input.display(),
        opts.variant
    );

    Ok(EncodeSummary {
        output: opts.output.clone(),
        variant: opts.variant,
        width,
        height,
        bytes,
    })
}

/// Decode everything except pixel contents.
pub fn read_metadata(input: &Path, variant: Variant) -> anyhow::Result<AvjMetadata> {
    let mapped = open(input)?;
    let view = mapped
        .view(variant)
        .with_context(|| format!("Invalid .avj file {}", input.display()))?;
    Ok(AvjMetadata::from_view(&view))
}

/// Rebuild the image and save it as PNG.
pub fn export_png(input: &Path, variant: Variant, output: &Path) -> anyhow::Result<()> {
    let mapped = open(input)?;
    let view = mapped
        .view(variant)
        .with_context(|| format!("Invalid .avj file {}", input.display()))?;

    let grid = reconstruct_pixels(
        view.pixels,
        view.header.width,
        view.header.height,
        view.colour_mode,
    )?;
    let img = grid.to_dynamic_image()?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    img.save_with_format(output, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    tracing::info!("Exported {} to {}", input.display(), output.display());
    Ok(())
}

/// Decode a file and check that its pixel region matches its dimensions.
///
/// Structural errors are returned as `Err`; a pixel mismatch is reported in
/// the returned report so the metadata is still shown.
pub fn validate(input: &Path, variant: Variant) -> anyhow::Result<ValidateReport> {
    let mapped = open(input)?;
    let view = mapped
        .view(variant)
        .with_context(|| format!("Invalid .avj file {}", input.display()))?;

    let pixel_error = reconstruct_pixels(
        view.pixels,
        view.header.width,
        view.header.height,
        view.colour_mode,
    )
    .err()
    .map(|e| e.to_string());

    if let Some(err) = &pixel_error {
        tracing::warn!("{}: {err}", input.display());
    }

    Ok(ValidateReport {
        path: input.to_path_buf(),
        variant,
        bytes: mapped.len(),
        width: view.header.width,
        height: view.header.height,
        colour_mode: view.colour_mode.to_string(),
        caption_bytes: view.caption.len(),
        text_embedding_dim: view.embeddings.map(|e| e.text_dim()),
        image_embedding_dim: view.embeddings.map(|e| e.image_dim()),
        pixel_error,
    })
}

fn open(input: &Path) -> anyhow::Result<MappedAvj> {
    let mapped =
        MappedAvj::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    if mapped.is_empty() {
        anyhow::bail!("Empty file: {}", input.display());
    }
    Ok(mapped)
}
