//=========================================================================
// Band Storage
//=========================================================================
//
// Scanline representation shared by every region operation.
//
// Layout:
// ```text
//   Band { top: 0, bottom: 3, spans: [0..4) [6..9) }   rows 0-2
//   Band { top: 3, bottom: 5, spans: [0..9) }          rows 3-4
// ```
//
// Invariants:
// - Bands are sorted by `top` and never overlap vertically
// - Spans inside a band are sorted, non-empty and never touch
// - No band has an empty span list
// - Vertically adjacent bands with identical spans are merged
//
// The invariants make the representation canonical, so two regions
// covering the same pixels compare equal.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::geometry::Rect;

//=== Span ================================================================

/// Horizontal run `[left, right)` inside a band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub left: i32,
    pub right: i32,
}

impl Span {
    pub(crate) const fn new(left: i32, right: i32) -> Self {
        Self { left, right }
    }
}

//=== Band ================================================================

/// Rows `[top, bottom)` that all share the same spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Band {
    pub top: i32,
    pub bottom: i32,
    pub spans: Vec<Span>,
}

//=== SetOp ===============================================================

/// Boolean combination applied point-wise to two regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SetOp {
    Union,
    Intersect,
    Difference,
    Xor,
}

impl SetOp {
    fn keep(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Intersect => in_a && in_b,
            Self::Difference => in_a && !in_b,
            Self::Xor => in_a != in_b,
        }
    }
}

//=== BandBuilder =========================================================

/// Accumulates rows or bands top to bottom while keeping the invariants.
///
/// Callers must push in increasing `top` order.
#[derive(Debug, Default)]
pub(crate) struct BandBuilder {
    bands: Vec<Band>,
}

impl BandBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends rows `[top, bottom)` covered by `spans`.
    ///
    /// Empty span lists are dropped. When the previous band ends at `top`
    /// with the same spans, it is stretched instead of adding a new band.
    pub(crate) fn push(&mut self, top: i32, bottom: i32, mut spans: Vec<Span>) {
        spans.retain(|s| s.left < s.right);
        if spans.is_empty() || bottom <= top {
            return;
        }

        if let Some(last) = self.bands.last_mut() {
            if last.bottom == top && last.spans == spans {
                last.bottom = bottom;
                return;
            }
        }

        self.bands.push(Band { top, bottom, spans });
    }

    pub(crate) fn finish(self) -> Vec<Band> {
        self.bands
    }
}

//=== Span Helpers ========================================================

/// Appends `[left, right)` to a sorted span list, merging with the last
/// span when they touch or overlap.
pub(crate) fn push_span(spans: &mut Vec<Span>, left: i32, right: i32) {
    if right <= left {
        return;
    }

    match spans.last_mut() {
        Some(last) if left <= last.right => {
            last.right = last.right.max(right);
        }
        _ => spans.push(Span::new(left, right)),
    }
}

/// Applies `op` to two sorted span lists of the same row range.
fn combine_spans(a: &[Span], b: &[Span], op: SetOp) -> Vec<Span> {
    let mut edges: Vec<i32> = a
        .iter()
        .chain(b.iter())
        .flat_map(|s| [s.left, s.right])
        .collect();
    edges.sort_unstable();
    edges.dedup();

    let mut out = Vec::new();
    let (mut ia, mut ib) = (0, 0);

    for window in edges.windows(2) {
        let (x0, x1) = (window[0], window[1]);

        while ia < a.len() && a[ia].right <= x0 {
            ia += 1;
        }
        while ib < b.len() && b[ib].right <= x0 {
            ib += 1;
        }

        let in_a = ia < a.len() && a[ia].left <= x0;
        let in_b = ib < b.len() && b[ib].left <= x0;

        if op.keep(in_a, in_b) {
            push_span(&mut out, x0, x1);
        }
    }

    out
}

//=== Region Algebra ======================================================

/// Combines two band lists into a new canonical band list.
///
/// Sweeps over every distinct band edge of both operands; between two
/// consecutive edges each operand contributes at most one band, whose
/// spans are combined with [`combine_spans`].
pub(crate) fn combine(a: &[Band], b: &[Band], op: SetOp) -> Vec<Band> {
    let mut edges: Vec<i32> = a
        .iter()
        .chain(b.iter())
        .flat_map(|band| [band.top, band.bottom])
        .collect();
    edges.sort_unstable();
    edges.dedup();

    let mut builder = BandBuilder::new();
    let (mut ia, mut ib) = (0, 0);

    for window in edges.windows(2) {
        let (y0, y1) = (window[0], window[1]);

        while ia < a.len() && a[ia].bottom <= y0 {
            ia += 1;
        }
        while ib < b.len() && b[ib].bottom <= y0 {
            ib += 1;
        }

        let spans_a: &[Span] = match a.get(ia) {
            Some(band) if band.top <= y0 => &band.spans,
            _ => &[],
        };
        let spans_b: &[Span] = match b.get(ib) {
            Some(band) if band.top <= y0 => &band.spans,
            _ => &[],
        };

        builder.push(y0, y1, combine_spans(spans_a, spans_b, op));
    }

    builder.finish()
}

/// Bounding rectangle of a band list, `Rect::default()` when empty.
pub(crate) fn bounds(bands: &[Band]) -> Rect {
    let (Some(first), Some(last)) = (bands.first(), bands.last()) else {
        return Rect::default();
    };

    let mut left = i32::MAX;
    let mut right = i32::MIN;
    for band in bands {
        // Spans are sorted, so only the outer ones matter.
        if let (Some(l), Some(r)) = (band.spans.first(), band.spans.last()) {
            left = left.min(l.left);
            right = right.max(r.right);
        }
    }

    Rect::new(left, first.top, right, last.bottom)
}

/// Point membership using binary search on bands, then on spans.
pub(crate) fn contains(bands: &[Band], x: i32, y: i32) -> bool {
    let idx = bands.partition_point(|band| band.bottom <= y);
    let Some(band) = bands.get(idx) else {
        return false;
    };
    if band.top > y {
        return false;
    }

    let idx = band.spans.partition_point(|span| span.right <= x);
    band.spans.get(idx).is_some_and(|span| span.left <= x)
}

/// True if any point is shared, without building the intersection.
pub(crate) fn overlaps(a: &[Band], b: &[Band]) -> bool {
    let (mut ia, mut ib) = (0, 0);

    while ia < a.len() && ib < b.len() {
        let (ba, bb) = (&a[ia], &b[ib]);

        if ba.bottom <= bb.top {
            ia += 1;
        } else if bb.bottom <= ba.top {
            ib += 1;
        } else {
            if spans_overlap(&ba.spans, &bb.spans) {
                return true;
            }
            if ba.bottom <= bb.bottom {
                ia += 1;
            } else {
                ib += 1;
            }
        }
    }

    false
}

fn spans_overlap(a: &[Span], b: &[Span]) -> bool {
    let (mut ia, mut ib) = (0, 0);

    while ia < a.len() && ib < b.len() {
        let (sa, sb) = (a[ia], b[ib]);
        if sa.right <= sb.left {
            ia += 1;
        } else if sb.right <= sa.left {
            ib += 1;
        } else {
            return true;
        }
    }

    false
}

/// Shifts every band and span in place.
pub(crate) fn translate(bands: &[Band], dx: i32, dy: i32) -> Vec<Band> {
    let mut builder = BandBuilder::new();
    for band in bands {
        let mut spans = Vec::with_capacity(band.spans.len());
        for span in &band.spans {
            push_span(&mut spans, span.left.saturating_add(dx), span.right.saturating_add(dx));
        }
        builder.push(band.top.saturating_add(dy), band.bottom.saturating_add(dy), spans);
    }
    builder.finish()
}

/// Number of covered pixels.
pub(crate) fn area(bands: &[Band]) -> i64 {
    bands
        .iter()
        .map(|band| {
            let width: i64 = band
                .spans
                .iter()
                .map(|s| i64::from(s.right - s.left))
                .sum();
            width * i64::from(band.bottom - band.top)
        })
        .sum()
}

//=========================================================================
// Unit Tests
//=========================================================================
