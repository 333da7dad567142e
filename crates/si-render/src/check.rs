//! Structural sanity checker: a `Visitor` that tracks group/masked
//! nesting depth and counts events
//! without caring about geometry, colors, or text content. `traverse`
//! itself already rejects unbalanced brackets (`SiError::UnbalancedGroups`/
//! `UnexpectedEndGroup`) before a document fully decodes; this is for a
//! caller that wants a summary of a document it already knows is well
//! formed — counts useful for picking a render strategy, or for asserting
//! test fixtures have the shape a test expects.

use si_core::{MaskedInfo, PathData, Visitor};

/// Counts and depth extremes collected over one traversal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StructuralStats {
    pub group_count: u32,
    pub masked_count: u32,
    pub path_count: u32,
    pub clip_path_count: u32,
    pub image_count: u32,
    pub text_count: u32,
    pub text_span_count: u32,
    pub max_depth: u32,
}

/// Drives `StructuralStats` while the document is walked. Depth tracking
/// doubles as a group-balance assertion: `depth` returns to zero exactly
/// when `end_vector` fires, for any document `traverse` accepted.
#[derive(Debug, Default)]
pub struct StructuralChecker {
    stats: StructuralStats,
    depth: u32,
}

impl StructuralChecker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn finish(self) -> StructuralStats {
        self.stats
    }

    fn enter(&mut self) {
        self.depth += 1;
        self.stats.max_depth = self.stats.max_depth.max(self.depth);
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl Visitor for StructuralChecker {
    fn group(&mut self, _info: &si_core::GroupInfo) {
        self.stats.group_count += 1;
        self.enter();
    }

    fn end_group(&mut self) {
        self.leave();
    }

    fn masked(&mut self, _info: &MaskedInfo) {
        self.stats.masked_count += 1;
        self.enter();
    }

    fn end_masked(&mut self) {
        self.leave();
    }

    fn path(&mut self, _path: &dyn PathData, _paint: &si_core::Paint) {
        self.stats.path_count += 1;
    }

    fn clip_path(&mut self, _path: &dyn PathData) {
        self.stats.clip_path_count += 1;
    }

    fn image(&mut self, _image_number: u32) {
        self.stats.image_count += 1;
    }

    fn text(&mut self, _paint: &si_core::Paint, _font_family: Option<&str>) {
        self.stats.text_count += 1;
    }

    fn text_span(&mut self, _span: &si_core::TextSpanInfo) {
        self.stats.text_span_count += 1;
    }
}
