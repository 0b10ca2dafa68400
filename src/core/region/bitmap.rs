//=========================================================================
// Pixel Buffers and Bitmaps
//=========================================================================
//
// Owned, bounds-checked pixel storage plus the bitmap scan that turns
// non-transparent pixels into region bands.
//
// Architecture:
// ```text
//   host bitmap source ──> PixelBuffer (RGBA, row-major, stride)
//                               │
//                               ▼
//   Bitmap { name, pixels: Option<PixelBuffer> }
//                               │  scan(key, tolerance)
//                               ▼
//   one row of opaque runs per scanline ──> BandBuilder
// ```
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::band::{push_span, Band, BandBuilder};
use crate::core::geometry::Color;

//=== Types ===============================================================

/// One RGBA pixel.
pub type Rgba = [u8; 4];

/// Errors raised while wrapping raw pixel memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PixelBufferError {
    /// The pixel vector does not match `stride * height`.
    #[error("pixel buffer holds {actual} pixels, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A row stride shorter than the row width.
    #[error("stride {stride} is smaller than width {width}")]
    StrideTooSmall { stride: usize, width: usize },
}

//=== PixelBuffer =========================================================

/// Row-major RGBA pixels with an explicit row stride (in pixels).
///
/// Padding pixels between `width` and `stride` are kept but never read by
/// row accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    stride: usize,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    //--- Construction -----------------------------------------------------

    /// Wraps tightly packed pixels (`stride == width`).
    pub fn new(width: usize, height: usize, pixels: Vec<Rgba>) -> Result<Self, PixelBufferError> {
        Self::with_stride(width, height, width, pixels)
    }

    /// Wraps pixels whose rows are `stride` pixels apart.
    pub fn with_stride(
        width: usize,
        height: usize,
        stride: usize,
        pixels: Vec<Rgba>,
    ) -> Result<Self, PixelBufferError> {
        if stride < width {
            return Err(PixelBufferError::StrideTooSmall { stride, width });
        }

        let expected = stride * height;
        if pixels.len() != expected {
            return Err(PixelBufferError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            stride,
            pixels,
        })
    }

    /// A buffer where every pixel has the same value.
    pub fn filled(width: usize, height: usize, pixel: Rgba) -> Self {
        Self {
            width,
            height,
            stride: width,
            pixels: vec![pixel; width * height],
        }
    }

    //--- Accessors --------------------------------------------------------

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.stride + x).copied()
    }

    /// Writes one pixel. Returns `false` when out of bounds.
    pub fn set(&mut self, x: usize, y: usize, pixel: Rgba) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        match self.pixels.get_mut(y * self.stride + x) {
            Some(slot) => {
                *slot = pixel;
                true
            }
            None => false,
        }
    }

    /// The visible part of row `y`.
    pub fn row(&self, y: usize) -> Option<&[Rgba]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.stride;
        self.pixels.get(start..start + self.width)
    }
}

//=== Bitmap ==============================================================

/// An image handed over by the host bitmap source.
///
/// A bitmap whose load failed is still representable so callers can check
/// [`Bitmap::exists`]; building a region from it fails with
/// [`super::RegionError::BitmapNotLoaded`].
#[derive(Debug, Clone)]
pub struct Bitmap {
    name: String,
    pixels: Option<PixelBuffer>,
    transparency_color: Option<Color>,
    opacity: u8,
}

impl Bitmap {
    pub fn loaded(name: impl Into<String>, pixels: PixelBuffer) -> Self {
        Self {
            name: name.into(),
            pixels: Some(pixels),
            transparency_color: None,
            opacity: 100,
        }
    }

    /// Placeholder for an image the host failed to load.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pixels: None,
            transparency_color: None,
            opacity: 100,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exists(&self) -> bool {
        self.pixels.is_some()
    }

    pub fn pixels(&self) -> Option<&PixelBuffer> {
        self.pixels.as_ref()
    }

    pub fn width(&self) -> usize {
        self.pixels.as_ref().map_or(0, PixelBuffer::width)
    }

    pub fn height(&self) -> usize {
        self.pixels.as_ref().map_or(0, PixelBuffer::height)
    }

    pub fn transparency_color(&self) -> Option<Color> {
        self.transparency_color
    }

    pub fn set_transparency_color(&mut self, color: Color) {
        self.transparency_color = Some(color);
    }

    pub fn opacity(&self) -> u8 {
        self.opacity
    }

    /// Sets drawing opacity in percent, clamped to `0..=100`.
    pub fn set_opacity(&mut self, opacity: i32) {
        self.opacity = opacity.clamp(0, 100) as u8;
    }
}

//=== Transparency Box ====================================================

/// Inclusive per-channel colour box treated as transparent.
#[derive(Debug, Clone, Copy)]
struct TransparencyBox {
    low: [u8; 3],
    high: [u8; 3],
}

impl TransparencyBox {
    fn new(key: Color, tolerance: Color) -> Self {
        Self {
            low: [
                key.r.saturating_sub(tolerance.r),
                key.g.saturating_sub(tolerance.g),
                key.b.saturating_sub(tolerance.b),
            ],
            high: [
                key.r.saturating_add(tolerance.r),
                key.g.saturating_add(tolerance.g),
                key.b.saturating_add(tolerance.b),
            ],
        }
    }

    /// Alpha is ignored.
    fn is_transparent(&self, pixel: Rgba) -> bool {
        (0..3).all(|c| pixel[c] >= self.low[c] && pixel[c] <= self.high[c])
    }
}

//=== Scan ================================================================

/// Converts every row's runs of opaque pixels into spans.
///
/// Pixel `(x, y)` of the buffer maps to client point `(x, y)`; callers move
/// the resulting region into place.
pub(crate) fn scan(pixels: &PixelBuffer, key: Color, tolerance: Color) -> Vec<Band> {
    let transparent = TransparencyBox::new(key, tolerance);
    let mut builder = BandBuilder::new();

    for y in 0..pixels.height() {
        let Some(row) = pixels.row(y) else {
            break;
        };

        let mut spans = Vec::new();
        let mut x = 0;
        while x < row.len() {
            if transparent.is_transparent(row[x]) {
                x += 1;
                continue;
            }

            let start = x;
            while x < row.len() && !transparent.is_transparent(row[x]) {
                x += 1;
            }
            push_span(&mut spans, start as i32, x as i32);
        }

        builder.push(y as i32, y as i32 + 1, spans);
    }

    builder.finish()
}

//=========================================================================
// Unit Tests
//=========================================================================
