//=========================================================================
// Hit Regions
//=========================================================================
//
// Pixel-exact point sets in client coordinates for hit-testing and
// collision detection between sprites.
//
// Architecture:
// ```text
//   Shape + Rect ──┐
//   &[Point]     ──┼──> raster / bitmap scan ──> Vec<Band> ──> Region
//   Bitmap       ──┘                                             │
//                                    move_by / hit_test / collision_test
// ```
//
// A region is stored as y-sorted bands of x-spans (see `band`). Bounds
// are cached and refreshed after every mutation.
//
//=========================================================================

mod band;
mod bitmap;
mod raster;

//=== External Dependencies ===============================================

use log::trace;
use thiserror::Error;

//=== Internal Dependencies ===============================================

use self::band::{Band, SetOp};
use crate::core::geometry::{Color, Point, Rect};

//=== Public API ==========================================================

pub use self::bitmap::{Bitmap, PixelBuffer, PixelBufferError, Rgba};

//=== RegionError =========================================================

/// Reasons a region constructor can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// A polygon needs at least three vertices.
    #[error("polygon needs at least 3 points, got {points}")]
    DegeneratePolygon { points: usize },

    /// The source bitmap failed to load and has no pixels.
    #[error("bitmap '{name}' is not loaded")]
    BitmapNotLoaded { name: String },

    /// The source bitmap is loaded but has zero width or height.
    #[error("bitmap has an empty pixel buffer")]
    EmptyPixelBuffer,
}

//=== Shape ===============================================================

/// Primitive shapes accepted by [`Region::from_shape`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Ellipse,
    Rectangle,
}

//=== Region ==============================================================

/// A 2D point set with a cached bounding rectangle.
///
/// Cloning duplicates the point set. [`Region::take`] moves the point set
/// out and leaves the source detached: a detached region reports
/// `exists() == false`, contains no points and ignores `move_by`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Region {
    bands: Vec<Band>,
    bounds: Rect,
    detached: bool,
}

impl Region {
    //--- Construction -----------------------------------------------------

    /// A region with no points.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_bands(bands: Vec<Band>) -> Self {
        let bounds = band::bounds(&bands);
        Self {
            bands,
            bounds,
            detached: false,
        }
    }

    /// Builds an ellipse inscribed in `rect`, or the rectangle itself.
    ///
    /// Reversed edges are normalized first. An empty rectangle yields an
    /// empty region.
    pub fn from_shape(shape: Shape, rect: Rect) -> Self {
        let rect = rect.normalized();
        match shape {
            Shape::Rectangle if rect.is_empty() => Self::empty(),
            Shape::Rectangle => {
                let mut builder = band::BandBuilder::new();
                builder.push(rect.top, rect.bottom, vec![band::Span::new(rect.left, rect.right)]);
                Self::from_bands(builder.finish())
            }
            Shape::Ellipse => Self::from_bands(raster::ellipse(rect)),
        }
    }

    /// Builds a polygon using the nonzero winding rule.
    ///
    /// The outline is closed automatically. Collinear vertices produce an
    /// empty region rather than an error.
    pub fn from_polygon(points: &[Point]) -> Result<Self, RegionError> {
        if points.len() < 3 {
            return Err(RegionError::DegeneratePolygon {
                points: points.len(),
            });
        }
        Ok(Self::from_bands(raster::polygon(points)))
    }

    /// Builds a region from every pixel of `bitmap` that lies outside the
    /// inclusive colour box `transparent ± tolerance`.
    ///
    /// The bitmap's top-left pixel maps to the client origin; use
    /// [`Region::move_by`] to place it.
    pub fn from_bitmap(
        bitmap: &Bitmap,
        transparent: Color,
        tolerance: Color,
    ) -> Result<Self, RegionError> {
        let Some(pixels) = bitmap.pixels() else {
            return Err(RegionError::BitmapNotLoaded {
                name: bitmap.name().to_owned(),
            });
        };
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(RegionError::EmptyPixelBuffer);
        }

        let bands = bitmap::scan(pixels, transparent, tolerance);
        trace!(
            target: "region",
            "scanned '{}' ({}x{}) into {} bands",
            bitmap.name(),
            pixels.width(),
            pixels.height(),
            bands.len()
        );
        Ok(Self::from_bands(bands))
    }

    /// Moves the point set out, leaving `self` detached.
    pub fn take(&mut self) -> Self {
        std::mem::replace(
            self,
            Self {
                bands: Vec::new(),
                bounds: Rect::default(),
                detached: true,
            },
        )
    }

    //--- Queries ----------------------------------------------------------

    /// False for a region whose contents were moved out with [`Region::take`].
    pub fn exists(&self) -> bool {
        !self.detached
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Bounding rectangle, `Rect::default()` when empty.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Number of pixels in the point set.
    pub fn area(&self) -> i64 {
        band::area(&self.bands)
    }

    pub fn hit_test(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(x, y) && band::contains(&self.bands, x, y)
    }

    /// True when both regions share at least one point.
    pub fn hit_test_region(&self, other: &Region) -> bool {
        if self.bounds.intersect(other.bounds).is_none() {
            return false;
        }
        band::overlaps(&self.bands, &other.bands)
    }

    /// Center of the bounding rectangle of the overlap, or `None` when the
    /// regions do not touch.
    ///
    /// This is the bounds center, not the centroid of the shared pixels.
    pub fn collision_center(&self, other: &Region) -> Option<Point> {
        if !self.hit_test_region(other) {
            return None;
        }
        let overlap = band::combine(&self.bands, &other.bands, SetOp::Intersect);
        Some(band::bounds(&overlap).center())
    }

    /// Like [`Region::collision_center`] but returns
    /// [`Point::NO_COLLISION`] when there is no overlap.
    pub fn collision_test(&self, other: &Region) -> Point {
        self.collision_center(other).unwrap_or(Point::NO_COLLISION)
    }

    //--- Mutation ---------------------------------------------------------

    /// Translates every point. No-op on a detached region.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        if self.detached || self.bands.is_empty() {
            return;
        }
        self.bands = band::translate(&self.bands, dx, dy);
        self.bounds = band::bounds(&self.bands);
    }

    //--- Combination ------------------------------------------------------

    fn combine(&self, other: &Region, op: SetOp) -> Region {
        Self::from_bands(band::combine(&self.bands, &other.bands, op))
    }

    pub fn union(&self, other: &Region) -> Region {
        self.combine(other, SetOp::Union)
    }

    pub fn intersection(&self, other: &Region) -> Region {
        self.combine(other, SetOp::Intersect)
    }

    /// Points of `self` that are not in `other`.
    pub fn difference(&self, other: &Region) -> Region {
        self.combine(other, SetOp::Difference)
    }

    pub fn xor(&self, other: &Region) -> Region {
        self.combine(other, SetOp::Xor)
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
