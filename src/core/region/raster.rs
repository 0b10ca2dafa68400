//=========================================================================
// Shape Rasterization
//=========================================================================
//
// Turns ellipses and polygons into band lists by sampling pixel centers.
//
// A pixel (x, y) belongs to a shape when the point (x + 0.5, y + 0.5)
// lies inside it. Each row is converted into spans and handed to the
// BandBuilder, which merges identical neighbouring rows.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::band::{push_span, Band, BandBuilder, Span};
use crate::core::geometry::{Point, Rect};

//=== Ellipse =============================================================

/// Ellipse inscribed in `rect`.
pub(crate) fn ellipse(rect: Rect) -> Vec<Band> {
    let rect = rect.normalized();
    if rect.is_empty() {
        return Vec::new();
    }

    let cx = f64::from(rect.left + rect.right) / 2.0;
    let cy = f64::from(rect.top + rect.bottom) / 2.0;
    let rx = f64::from(rect.width()) / 2.0;
    let ry = f64::from(rect.height()) / 2.0;

    let mut builder = BandBuilder::new();

    for y in rect.top..rect.bottom {
        let dy = (f64::from(y) + 0.5 - cy) / ry;
        let t = 1.0 - dy * dy;
        if t <= 0.0 {
            continue;
        }

        let dx = rx * t.sqrt();
        let left = ((cx - dx).round() as i32).max(rect.left);
        let right = ((cx + dx).round() as i32).min(rect.right);

        if left < right {
            builder.push(y, y + 1, vec![Span::new(left, right)]);
        }
    }

    builder.finish()
}

//=== Polygon =============================================================

/// Polygon fill with the nonzero winding rule.
///
/// The outline is implicitly closed. Horizontal edges never cross a
/// pixel-center row and are skipped.
pub(crate) fn polygon(points: &[Point]) -> Vec<Band> {
    let (Some(min_y), Some(max_y)) = (
        points.iter().map(|p| p.y).min(),
        points.iter().map(|p| p.y).max(),
    ) else {
        return Vec::new();
    };

    let mut builder = BandBuilder::new();
    let mut crossings: Vec<(f64, i32)> = Vec::with_capacity(points.len());

    for y in min_y..max_y {
        let sample_y = f64::from(y) + 0.5;
        crossings.clear();

        for (i, p0) in points.iter().enumerate() {
            let p1 = points[(i + 1) % points.len()];
            if p0.y == p1.y {
                continue;
            }

            let (y0, y1) = (f64::from(p0.y), f64::from(p1.y));
            if sample_y < y0.min(y1) || sample_y >= y0.max(y1) {
                continue;
            }

            let x = f64::from(p0.x) + (sample_y - y0) * f64::from(p1.x - p0.x) / (y1 - y0);
            let direction = if p1.y > p0.y { 1 } else { -1 };
            crossings.push((x, direction));
        }

        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut spans = Vec::new();
        let mut winding = 0;
        let mut start = 0.0;

        for &(x, direction) in &crossings {
            let before = winding;
            winding += direction;

            if before == 0 && winding != 0 {
                start = x;
            } else if before != 0 && winding == 0 {
                let left = (start - 0.5).ceil() as i32;
                let right = (x - 0.5).ceil() as i32;
                push_span(&mut spans, left, right);
            }
        }

        builder.push(y, y + 1, spans);
    }

    builder.finish()
}

//=========================================================================
// Unit Tests
//=========================================================================
