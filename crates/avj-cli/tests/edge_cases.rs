//! End-to-end tests for the avj command implementations.

use std::path::{Path, PathBuf};

use avj::{AvjRecord, AvjWriter, ImageRecord, Variant, EMBEDDING_DIM};
use avj_cli::commands::{encode_image, export_png, read_metadata, validate, EncodeOptions};
use image::{GenericImageView, Rgb, RgbImage};

// ─────────────────────── helpers ───────────────────────

/// Write a 2x1 red/green PNG and return its path.
fn write_png(dir: &Path) -> PathBuf {
    let mut img = RgbImage::new(2, 1);
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    img.put_pixel(1, 0, Rgb([0, 255, 0]));
    let path = dir.join("dot.png");
    img.save(&path).unwrap();
    path
}

fn options(dir: &Path, variant: Variant) -> EncodeOptions {
    EncodeOptions {
        input: write_png(dir),
        output: dir.join("out/dot.avj"),
        caption: "red and green".to_string(),
        variant,
        embeddings: None,
        embedding_dim: EMBEDDING_DIM,
    }
}

// ─────────────────────── encode ───────────────────────

#[test]
fn encode_plain_then_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), Variant::Plain);

    let summary = encode_image(&opts).unwrap();
    assert_eq!((summary.width, summary.height), (2, 1));
    assert_eq!(summary.bytes, 18 + 13 + 3 + 6);

    let meta = read_metadata(&opts.output, Variant::Plain).unwrap();
    assert_eq!(meta.caption, "red and green");
    assert_eq!(meta.colour_mode, "RGB");
    assert_eq!(meta.pixel_bytes, 6);
    assert!(meta.text_embedding.is_none());
}

#[test]
fn encode_embedded_with_fallback_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), Variant::Embedded);
    encode_image(&opts).unwrap();

    let meta = read_metadata(&opts.output, Variant::Embedded).unwrap();
    assert_eq!(meta.text_embedding.as_ref().unwrap().len(), EMBEDDING_DIM);
    assert_eq!(meta.image_embedding.as_ref().unwrap().len(), EMBEDDING_DIM);
    assert_eq!(meta.text_image_similarity, Some(0.0));
}

#[test]
fn encode_embedded_with_embedding_file() {
    let dir = tempfile::tempdir().unwrap();
    let emb_path = dir.path().join("emb.json");
    std::fs::write(&emb_path, r#"{"text": [0.6, 0.8], "image": [0.6, 0.8, 0.0]}"#).unwrap();

    let mut opts = options(dir.path(), Variant::Embedded);
    opts.embeddings = Some(emb_path);
    encode_image(&opts).unwrap();

    let meta = read_metadata(&opts.output, Variant::Embedded).unwrap();
    assert_eq!(meta.text_embedding.unwrap(), vec![0.6, 0.8]);
    assert_eq!(meta.image_embedding.unwrap(), vec![0.6, 0.8, 0.0]);
    // Different lengths: similarity degenerates to zero.
    assert_eq!(meta.text_image_similarity, Some(0.0));
}

#[test]
fn encode_missing_image_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), Variant::Plain);
    opts.input = dir.path().join("missing.png");
    let err = encode_image(&opts).unwrap_err();
    assert!(format!("{err:#}").contains("missing.png"));
}

#[test]
fn encode_rejects_non_image_extension() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), Variant::Plain);
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, b"not an image").unwrap();
    opts.input = notes;

    let err = encode_image(&opts).unwrap_err();
    assert!(format!("{err:#}").contains("Unsupported image format"));
    assert!(!opts.output.exists());
}

#[test]
fn encode_failure_keeps_existing_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path(), Variant::Plain);
    encode_image(&opts).unwrap();
    let before = std::fs::read(&opts.output).unwrap();

    opts.caption = "c".repeat(70_000);
    assert!(encode_image(&opts).is_err());
    assert_eq!(std::fs::read(&opts.output).unwrap(), before);
}

// ─────────────────────── decode / validate ───────────────────────

#[test]
fn export_png_restores_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), Variant::Embedded);
    encode_image(&opts).unwrap();

    let png = dir.path().join("restored/dot.png");
    export_png(&opts.output, Variant::Embedded, &png).unwrap();

    let img = image::open(&png).unwrap();
    assert_eq!(img.dimensions(), (2, 1));
    assert_eq!(img.to_rgb8().into_raw(), vec![255, 0, 0, 0, 255, 0]);
}

#[test]
fn wrong_variant_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), Variant::Plain);
    encode_image(&opts).unwrap();
    assert!(read_metadata(&opts.output, Variant::Embedded).is_err());
}

#[test]
fn validate_reports_pixel_mismatch_without_failing_decode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.avj");
    let record = AvjRecord::Plain(ImageRecord::rgb(2, 2, "four pixels", vec![7; 12]));
    AvjWriter::write_to_file(&record, &path).unwrap();

    // Drop the last pixel.
    let mut bytes = std::fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 3);
    std::fs::write(&path, &bytes).unwrap();

    let report = validate(&path, Variant::Plain).unwrap();
    assert!(!report.is_valid());
    assert!(report.pixel_error.unwrap().contains("expected 12"));

    let meta = read_metadata(&path, Variant::Plain).unwrap();
    assert_eq!(meta.caption, "four pixels");
    assert!(export_png(&path, Variant::Plain, &dir.path().join("x.png")).is_err());
}

#[test]
fn validate_good_file() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path(), Variant::Embedded);
    encode_image(&opts).unwrap();

    let report = validate(&opts.output, Variant::Embedded).unwrap();
    assert!(report.is_valid());
    assert_eq!(report.text_embedding_dim, Some(EMBEDDING_DIM));
    assert_eq!(report.caption_bytes, "red and green".len());
}

#[test]
fn validate_empty_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.avj");
    std::fs::write(&path, b"").unwrap();
    let err = validate(&path, Variant::Plain).unwrap_err();
    assert!(format!("{err:#}").contains("Empty file"));
}

#[test]
fn validate_garbage_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.avj");
    std::fs::write(&path, b"definitely not an avj file").unwrap();
    let err = validate(&path, Variant::Plain).unwrap_err();
    assert!(format!("{err:#}").contains("Bad magic"));
}
