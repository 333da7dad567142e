//! Document-space bounding box computation over a decoded `CompactImage`,
//! generalized from a resolve-time concern in `si-scene` to a post-decode
//! one here. Same "coarse, control-point union" approximation as
//! `si-scene::bounds` — a renderer
//! wants this to size a surface or a dirty rect, never to rasterize
//! exactly.
//!
//! `si-scene` computes bounds against its own scene graph before the IR
//! even exists; this module computes the same kind of box by replaying
//! the already-encoded IR through the public `Visitor` seam, the way any
//! other IR consumer would. The two bounds types are intentionally
//! distinct — this crate depends only on `si-core`.

use si_core::{CompactImage, GroupInfo, ImageAsset, MaskedInfo, PathData, PathSink, Visitor};

/// An axis-aligned box in document space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl DocumentBounds {
    pub const EMPTY: DocumentBounds = DocumentBounds {
        min_x: f64::INFINITY,
        min_y: f64::INFINITY,
        max_x: f64::NEG_INFINITY,
        max_y: f64::NEG_INFINITY,
    };

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
    pub fn union(self, other: DocumentBounds) -> DocumentBounds {
        if self.is_empty() {
            return other;
        }
        if other.is_empty() {
            return self;
        }
        DocumentBounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    #[must_use]
    pub fn as_xywh(&self) -> (f64, f64, f64, f64) {
        if self.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        (self.min_x, self.min_y, self.max_x - self.min_x, self.max_y - self.min_y)
    }
}

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn compose(outer: [f64; 6], inner: [f64; 6]) -> [f64; 6] {
    let [a1, b1, c1, d1, e1, f1] = outer;
    let [a2, b2, c2, d2, e2, f2] = inner;
    [
        a1 * a2 + c1 * b2,
        b1 * a2 + d1 * b2,
        a1 * c2 + c1 * d2,
        b1 * c2 + d1 * d2,
        a1 * e2 + c1 * f2 + e1,
        b1 * e2 + d1 * f2 + f1,
    ]
}

fn apply(t: [f64; 6], x: f64, y: f64) -> (f64, f64) {
    let [a, b, c, d, e, f] = t;
    (a * x + c * y + e, b * x + d * y + f)
}

/// `PathSink` that transforms every control point by a fixed affine before
/// unioning it into a box. Arc commands only carry an endpoint and radius
/// (no center), so their contribution is a radius-padded box around the
/// transformed endpoint — always a superset of the true arc extent, same
/// as `si-scene`'s collector.
struct TransformingCollector {
    transform: [f64; 6],
    bounds: DocumentBounds,
}

impl TransformingCollector {
    fn new(transform: [f64; 6]) -> Self {
        Self { transform, bounds: DocumentBounds::EMPTY }
    }

    fn expand(&mut self, x: f64, y: f64) {
        let (tx, ty) = apply(self.transform, x, y);
        self.bounds.expand(tx, ty);
    }
}

impl PathSink for TransformingCollector {
    fn move_to(&mut self, x: f64, y: f64) {
        self.expand(x, y);
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.expand(x, y);
    }
    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.expand(c1x, c1y);
        self.expand(c2x, c2y);
        self.expand(x, y);
    }
    fn cubic_to_shorthand(&mut self, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.expand(c2x, c2y);
        self.expand(x, y);
    }
    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.expand(cx, cy);
        self.expand(x, y);
    }
    fn quad_to_shorthand(&mut self, x: f64, y: f64) {
        self.expand(x, y);
    }
    fn close(&mut self) {}
    fn circle(&mut self, left: f64, top: f64, width: f64) {
        self.expand(left, top);
        self.expand(left + width, top + width);
    }
    fn ellipse(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.expand(left, top);
        self.expand(left + width, top + height);
    }
    fn arc_circle(&mut self, radius: f64, end_x: f64, end_y: f64, _large: bool, _cw: bool) {
        self.expand(end_x - radius, end_y - radius);
        self.expand(end_x + radius, end_y + radius);
    }
    fn arc_ellipse(&mut self, rx: f64, ry: f64, end_x: f64, end_y: f64, _large: bool, _cw: bool) {
        self.expand(end_x - rx, end_y - ry);
        self.expand(end_x + rx, end_y + ry);
    }
    fn end(&mut self) {}
}

/// Accumulates a document-space bounding box while walking a `CompactImage`.
///
/// Holds a reference to the image's asset table so the `image` event — which
/// only carries an index over the wire — can still contribute
/// its rectangle. `clip_path` geometry is deliberately not unioned in: a
/// clip only ever shrinks what's visible, so including it would make the
/// box *less* conservative, not more.
pub struct DocumentBoundsVisitor<'a> {
    images: &'a [ImageAsset],
    stack: Vec<[f64; 6]>,
    bounds: DocumentBounds,
}

impl<'a> DocumentBoundsVisitor<'a> {
    #[must_use]
    pub fn new(image: &'a CompactImage) -> Self {
        Self { images: &image.images, stack: vec![IDENTITY], bounds: DocumentBounds::EMPTY }
    }

    fn current(&self) -> [f64; 6] {
        *self.stack.last().expect("identity transform always present")
    }

    #[must_use]
    pub fn finish(self) -> DocumentBounds {
        self.bounds
    }
}

impl Visitor for DocumentBoundsVisitor<'_> {
    fn group(&mut self, info: &GroupInfo) {
        let parent = self.current();
        let local = info.transform.unwrap_or(IDENTITY);
        self.stack.push(compose(parent, local));
    }

    fn end_group(&mut self) {
        self.stack.pop();
    }

    fn path(&mut self, path: &dyn PathData, _paint: &si_core::Paint) {
        let mut collector = TransformingCollector::new(self.current());
        let _ = path.visit(&mut collector);
        self.bounds = self.bounds.union(collector.bounds);
    }

    fn image(&mut self, image_number: u32) {
        let Some(asset) = self.images.get(image_number as usize) else { return };
        let t = self.current();
        let corners = [
            (asset.x, asset.y),
            (asset.x + asset.width, asset.y),
            (asset.x, asset.y + asset.height),
            (asset.x + asset.width, asset.y + asset.height),
        ];
        for (x, y) in corners {
            let (tx, ty) = apply(t, x, y);
            self.bounds.expand(tx, ty);
        }
    }

    fn masked(&mut self, _info: &MaskedInfo) {
        self.stack.push(self.current());
    }

    fn end_masked(&mut self) {
        self.stack.pop();
    }
}
