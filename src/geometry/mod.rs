//! # Geometry
//!
//! Rectangles, extent ranges and the coordinate transform that maps a
//! reference area's relative (inline, block) coordinates onto the page.
//!
//! Page coordinates have their origin at the top-left corner of the media
//! with y growing downward, the same convention the renderer uses.

use serde::{Deserialize, Serialize};

use crate::model::Edges;

/// An axis-aligned rectangle in points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Shrink the rectangle by the given edges. Never goes negative.
    pub fn inset(&self, edges: &Edges) -> Rect {
        Rect {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }
}

/// A min/opt/max range for block-progression extents.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinOptMax {
    pub min: f64,
    pub opt: f64,
    pub max: f64,
}

impl MinOptMax {
    pub fn fixed(value: f64) -> Self {
        Self {
            min: value,
            opt: value,
            max: value,
        }
    }

    /// Build a range, reordering the bounds so that `min <= opt <= max`.
    pub fn new(min: f64, opt: f64, max: f64) -> Self {
        let min = min.min(opt).min(max);
        let max = max.max(opt).max(min);
        Self {
            min,
            opt: opt.clamp(min, max),
            max,
        }
    }
}

/// Writing modes supported for page and region reference areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WritingMode {
    /// Lines run left to right, stacked top to bottom.
    #[default]
    LrTb,
    /// Lines run right to left, stacked top to bottom.
    RlTb,
    /// Lines run top to bottom, stacked right to left.
    TbRl,
}

/// Normalize a reference orientation to one of 0, 90, 180 or 270.
///
/// Values that are not a multiple of 90 are logged and treated as 0.
pub fn normalize_orientation(degrees: i32) -> i32 {
    if degrees % 90 != 0 {
        log::warn!("Invalid reference-orientation {degrees}; using 0");
        return 0;
    }
    degrees.rem_euclid(360)
}

/// Inline/block dimensions of a reference area after orientation and
/// writing mode are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RelDims {
    pub ipd: f64,
    pub bpd: f64,
}

/// A 2D affine transform: `(x, y) -> (a*x + c*y + e, b*x + d*y + f)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Ctm {
    pub const IDENTITY: Ctm = Ctm {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(tx: f64, ty: f64) -> Self {
        Ctm {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn multiply(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Transform a rectangle, returning the bounding box of its corners.
    pub fn transform_rect(&self, rect: &Rect) -> Rect {
        let corners = [
            self.transform_point(rect.x, rect.y),
            self.transform_point(rect.right(), rect.y),
            self.transform_point(rect.x, rect.bottom()),
            self.transform_point(rect.right(), rect.bottom()),
        ];
        let min_x = corners.iter().map(|c| c.0).fold(f64::INFINITY, f64::min);
        let min_y = corners.iter().map(|c| c.1).fold(f64::INFINITY, f64::min);
        let max_x = corners.iter().map(|c| c.0).fold(f64::NEG_INFINITY, f64::max);
        let max_y = corners.iter().map(|c| c.1).fold(f64::NEG_INFINITY, f64::max);
        Rect::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }

    /// Compute the transform for a reference area occupying `rect` on the
    /// page, rotated counter-clockwise by `orientation` degrees and laid out
    /// in `writing_mode`. Also returns the area's inline/block dimensions.
    pub fn for_reference_area(
        orientation: i32,
        writing_mode: WritingMode,
        rect: &Rect,
    ) -> (Ctm, RelDims) {
        let Rect {
            x,
            y,
            width: w,
            height: h,
        } = *rect;

        // Orientation frame: maps the rotated area's (u, v) onto the page.
        let (frame, frame_w, frame_h) = match normalize_orientation(orientation) {
            90 => (
                Ctm {
                    a: 0.0,
                    b: -1.0,
                    c: 1.0,
                    d: 0.0,
                    e: x,
                    f: y + h,
                },
                h,
                w,
            ),
            180 => (
                Ctm {
                    a: -1.0,
                    b: 0.0,
                    c: 0.0,
                    d: -1.0,
                    e: x + w,
                    f: y + h,
                },
                w,
                h,
            ),
            270 => (
                Ctm {
                    a: 0.0,
                    b: 1.0,
                    c: -1.0,
                    d: 0.0,
                    e: x + w,
                    f: y,
                },
                h,
                w,
            ),
            _ => (Ctm::translate(x, y), w, h),
        };

        // Writing mode: maps (inline, block) onto the frame's (u, v).
        let (mode, dims) = match writing_mode {
            WritingMode::LrTb => (
                Ctm::IDENTITY,
                RelDims {
                    ipd: frame_w,
                    bpd: frame_h,
                },
            ),
            WritingMode::RlTb => (
                Ctm {
                    a: -1.0,
                    b: 0.0,
                    c: 0.0,
                    d: 1.0,
                    e: frame_w,
                    f: 0.0,
                },
                RelDims {
                    ipd: frame_w,
                    bpd: frame_h,
                },
            ),
            WritingMode::TbRl => (
                Ctm {
                    a: 0.0,
                    b: 1.0,
                    c: -1.0,
                    d: 0.0,
                    e: frame_w,
                    f: 0.0,
                },
                RelDims {
                    ipd: frame_h,
                    bpd: frame_w,
                },
            ),
        };

        (frame.multiply(&mode), dims)
    }
}
