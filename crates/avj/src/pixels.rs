//! Lazy reconstruction of a 2-D pixel grid from a decoded pixel region.

use std::fmt;
use std::str::FromStr;

use image::{DynamicImage, GrayAlphaImage, GrayImage, RgbImage, RgbaImage};

use crate::types::{AvjError, AvjResult};

/// Pixel encodings a colour-mode string can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColourMode {
    L,
    La,
    I16,
    Rgb,
    YCbCr,
    Rgba,
    Cmyk,
}

impl ColourMode {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            ColourMode::L => 1,
            ColourMode::La | ColourMode::I16 => 2,
            ColourMode::Rgb | ColourMode::YCbCr => 3,
            ColourMode::Rgba | ColourMode::Cmyk => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColourMode::L => "L",
            ColourMode::La => "LA",
            ColourMode::I16 => "I;16",
            ColourMode::Rgb => "RGB",
            ColourMode::YCbCr => "YCbCr",
            ColourMode::Rgba => "RGBA",
            ColourMode::Cmyk => "CMYK",
        }
    }
}

impl fmt::Display for ColourMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColourMode {
    type Err = AvjError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(ColourMode::L),
            "LA" => Ok(ColourMode::La),
            "I;16" => Ok(ColourMode::I16),
            "RGB" => Ok(ColourMode::Rgb),
            "YCbCr" => Ok(ColourMode::YCbCr),
            "RGBA" => Ok(ColourMode::Rgba),
            "CMYK" => Ok(ColourMode::Cmyk),
            other => Err(AvjError::UnknownColourMode(other.to_string())),
        }
    }
}

/// A row-major pixel grid with interleaved channels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    pub mode: ColourMode,
    pub data: Vec<u8>,
}

impl PixelGrid {
    fn stride(&self) -> usize {
        self.width as usize * self.mode.bytes_per_pixel()
    }

    /// Channel bytes of the pixel at (x, y), or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.mode.bytes_per_pixel();
        let start = y as usize * self.stride() + x as usize * bpp;
        self.data.get(start..start + bpp)
    }

    /// Iterate over rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(self.stride().max(1))
    }

    /// Convert into an `image` buffer for export.
    pub fn to_dynamic_image(&self) -> AvjResult<DynamicImage> {
        let (w, h) = (self.width, self.height);
        let data = self.data.clone();
        let img = match self.mode {
            ColourMode::L => GrayImage::from_raw(w, h, data).map(DynamicImage::ImageLuma8),
            ColourMode::La => {
                GrayAlphaImage::from_raw(w, h, data).map(DynamicImage::ImageLumaA8)
            }
            ColourMode::Rgb => RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8),
            ColourMode::Rgba => RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8),
            other => return Err(AvjError::UnsupportedConversion(other.to_string())),
        };
        img.ok_or_else(|| AvjError::PixelCountMismatch {
            expected: expected_len(w, h, self.mode),
            actual: self.data.len(),
        })
    }
}

/// Reinterpret a flat pixel run as a grid of the given colour mode.
///
/// This is where the dimension invariant is enforced on the decode path.
pub fn reconstruct_pixels(
    pixel_bytes: &[u8],
    width: u32,
    height: u32,
    colour_mode: &str,
) -> AvjResult<PixelGrid> {
    let mode: ColourMode = colour_mode.parse()?;
    let expected = expected_len(width, height, mode);
    if pixel_bytes.len() as u64 != expected {
        return Err(AvjError::PixelCountMismatch {
            expected,
            actual: pixel_bytes.len(),
        });
    }
    Ok(PixelGrid {
        width,
        height,
        mode,
        data: pixel_bytes.to_vec(),
    })
}

fn expected_len(width: u32, height: u32, mode: ColourMode) -> u64 {
    width as u64 * height as u64 * mode.bytes_per_pixel() as u64
}
