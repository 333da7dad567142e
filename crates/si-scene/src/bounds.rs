//! User-space bounding box computation. Deliberately a coarse
//! control-point union rather than true Bezier extents.
//!
//! Used for two things during resolution: sizing a mask's region when the
//! mask node didn't specify one explicitly, and resolving
//! `objectBoundingBox=true` gradient geometry (fractions of the painted
//! shape's box rather than the document viewport). Both are
//! approximations in the exact same direction real renderers take for a
//! fast pre-pass — they only need to be a safe superset of the true
//! geometric extent, never exact.

use si_core::PathSink;

/// An axis-aligned box in the coordinate space the path/shape commands
/// that produced it were expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Bounds =
        Bounds { min_x: f64::INFINITY, min_y: f64::INFINITY, max_x: f64::NEG_INFINITY, max_y: f64::NEG_INFINITY };

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    fn expand(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    #[must_use]
    pub fn union(self, other: Bounds) -> Bounds {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// `(x, y, width, height)`, clamped to zero-sized at the origin if
    /// still empty — callers feeding this to `si_core::Builder::masked`
    /// always have a concrete box to write.
    #[must_use]
    pub fn as_xywh(&self) -> (f64, f64, f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        (self.min_x, self.min_y, self.max_x - self.min_x, self.max_y - self.min_y)
    }

    /// Apply a full affine to all four corners and re-bound; correct even
    /// when `affine` rotates or skews, unlike transforming just the
    /// min/max corners.
    #[must_use]
    pub fn transform(&self, affine: [f64; 6]) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        let [a, b, c, d, e, f] = affine;
        let corners = [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.max_y),
        ];
        let mut out = Bounds::EMPTY;
        for (x, y) in corners {
            out.expand(a * x + c * y + e, b * x + d * y + f);
        }
        out
    }
}

/// A `PathSink` that unions every control point it sees into a running
/// box. Arc commands only carry an endpoint and radius, not a center, so
/// their contribution is a radius-padded box around the endpoint — always
/// a superset of the true arc extent.
#[derive(Debug, Default)]
pub struct BoundsCollector {
    bounds: Bounds,
}

impl BoundsCollector {
    #[must_use]
    pub fn new() -> Self {
        Self { bounds: Bounds::EMPTY }
    }

    #[must_use]
    pub fn finish(self) -> Bounds {
        self.bounds
    }
}

impl PathSink for BoundsCollector {
    fn move_to(&mut self, x: f64, y: f64) {
        self.bounds.expand(x, y);
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.bounds.expand(x, y);
    }
    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.bounds.expand(c1x, c1y);
        self.bounds.expand(c2x, c2y);
        self.bounds.expand(x, y);
    }
    fn cubic_to_shorthand(&mut self, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.bounds.expand(c2x, c2y);
        self.bounds.expand(x, y);
    }
    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.bounds.expand(cx, cy);
        self.bounds.expand(x, y);
    }
    fn quad_to_shorthand(&mut self, x: f64, y: f64) {
        self.bounds.expand(x, y);
    }
    fn close(&mut self) {}
    fn circle(&mut self, left: f64, top: f64, width: f64) {
        self.bounds.expand(left, top);
        self.bounds.expand(left + width, top + width);
    }
    fn ellipse(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.bounds.expand(left, top);
        self.bounds.expand(left + width, top + height);
    }
    fn arc_circle(&mut self, radius: f64, end_x: f64, end_y: f64, _large: bool, _cw: bool) {
        self.bounds.expand(end_x - radius, end_y - radius);
        self.bounds.expand(end_x + radius, end_y + radius);
    }
    fn arc_ellipse(&mut self, rx: f64, ry: f64, end_x: f64, end_y: f64, _large: bool, _cw: bool) {
        self.bounds.expand(end_x - rx, end_y - ry);
        self.bounds.expand(end_x + rx, end_y + ry);
    }
    fn end(&mut self) {}
}

/// Bounding box of a single path command sequence, in the space the
/// commands are expressed in.
#[must_use]
pub fn path_bounds(cmds: &[si_core::PathCmd]) -> Bounds {
    let mut collector = BoundsCollector::new();
    si_core::feed_path(cmds, &mut collector);
    collector.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use si_core::PathCmd;

    #[test]
    fn rectangle_bounds() {
        let cmds = vec![
            PathCmd::MoveTo(0.0, 0.0),
            PathCmd::LineTo(10.0, 0.0),
            PathCmd::LineTo(10.0, 10.0),
            PathCmd::LineTo(0.0, 10.0),
            PathCmd::Close,
        ];
        let b = path_bounds(&cmds);
        assert_eq!(b.as_xywh(), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn transform_rotates_box_correctly() {
        let b = Bounds { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
        // 90 degree rotation: (a,b,c,d) = (0,1,-1,0)
        let rotated = b.transform([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);
        assert_eq!(rotated.as_xywh(), (-10.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn empty_union_returns_other() {
        let empty = Bounds::EMPTY;
        let rect = Bounds { min_x: 1.0, min_y: 1.0, max_x: 2.0, max_y: 2.0 };
        assert_eq!(empty.union(rect), rect);
        assert_eq!(rect.union(empty), rect);
    }
}
