//! Image loading and conversion to a raw pixel plane.

use std::path::Path;

use image::DynamicImage;

use crate::types::{AvjResult, PixelPlane};

/// Load an image from a file path.
pub fn capture_from_file(path: impl AsRef<Path>) -> AvjResult<DynamicImage> {
    let path = path.as_ref();
    let img = image::open(path)?;
    tracing::debug!(
        "Loaded {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );
    Ok(img)
}

/// Flatten an image into an interleaved 8-bit RGB plane.
///
/// Alpha and any higher bit depth are dropped.
pub fn pixel_plane(img: &DynamicImage) -> PixelPlane {
    let rgb = img.to_rgb8();
    PixelPlane {
        width: rgb.width(),
        height: rgb.height(),
        colour_mode: "RGB".to_string(),
        pixels: rgb.into_raw(),
    }
}

/// Whether `path` has an extension the `image` decoders handle.
pub fn is_supported_format(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "webp" | "gif" | "bmp" | "tiff" | "tif"
            )
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn png_bytes(img: &DynamicImage) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        img.write_with_encoder(encoder).unwrap();
        buf
    }

    #[test]
    fn test_plane_drops_alpha() {
        let mut rgba = RgbaImage::new(2, 1);
        rgba.put_pixel(0, 0, Rgba([10, 20, 30, 0]));
        rgba.put_pixel(1, 0, Rgba([40, 50, 60, 255]));
        let plane = pixel_plane(&DynamicImage::ImageRgba8(rgba));
        assert_eq!(plane.width, 2);
        assert_eq!(plane.height, 1);
        assert_eq!(plane.colour_mode, "RGB");
        assert_eq!(plane.pixels, vec![10, 20, 30, 40, 50, 60]);
    }

    #[test]
    fn test_file_capture() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.png");
        std::fs::write(&path, png_bytes(&DynamicImage::new_rgb8(4, 4))).unwrap();
        let img = capture_from_file(&path).unwrap();
        assert_eq!(pixel_plane(&img).pixels.len(), 48);
    }

    #[test]
    fn test_supported_formats() {
        assert!(is_supported_format("test.png"));
        assert!(is_supported_format("test.JPG"));
        assert!(is_supported_format("test.webp"));
        assert!(!is_supported_format("test.avj"));
        assert!(!is_supported_format("test.txt"));
        assert!(!is_supported_format(Path::new("no_extension")));
    }
}
