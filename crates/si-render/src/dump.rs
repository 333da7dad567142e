//! Human-readable structural dump of a traversed document — a
//! debug/inspection consumer of `Visitor`, not a renderer. Useful for
//! snapshot-testing a `.si` file's shape without decoding it by hand.

use si_core::{GroupInfo, MaskedInfo, PathData, TextSpanInfo, VectorInfo, Visitor};

/// Writes one indented line per event into an owned `String`. Geometry
/// itself isn't expanded — this is a structural dump, not a path printer —
/// so `path`/`clip_path` lines only note that a path occurred.
#[derive(Debug, Default)]
pub struct DumpVisitor {
    out: String,
    depth: usize,
}

impl DumpVisitor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn finish(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }
}

impl Visitor for DumpVisitor {
    fn init(&mut self) {
        self.line("document");
        self.depth += 1;
    }

    fn vector(&mut self, info: &VectorInfo) {
        self.line(&format!("vector width={:?} height={:?} tint_mode={:?}", info.width, info.height, info.tint_mode));
    }

    fn group(&mut self, info: &GroupInfo) {
        self.line(&format!(
            "group transform={:?} alpha={:?} blend={:?}",
            info.transform, info.group_alpha, info.blend_mode
        ));
        self.depth += 1;
    }

    fn end_group(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("end_group");
    }

    fn path(&mut self, _path: &dyn PathData, paint: &si_core::Paint) {
        self.line(&format!("path fill={:?} stroke={:?}", paint.fill_color, paint.stroke_color));
    }

    fn clip_path(&mut self, _path: &dyn PathData) {
        self.line("clip_path");
    }

    fn image(&mut self, image_number: u32) {
        self.line(&format!("image #{image_number}"));
    }

    fn text(&mut self, paint: &si_core::Paint, font_family: Option<&str>) {
        self.line(&format!("text font_family={font_family:?} fill={:?}", paint.fill_color));
        self.depth += 1;
    }

    fn text_span(&mut self, span: &TextSpanInfo) {
        self.line(&format!("span {:?} font_family={:?} size={}", span.content, span.font_family, span.font_size));
    }

    fn text_multi_span_chunk(&mut self, chunk_index: u32) {
        self.line(&format!("chunk #{chunk_index}"));
    }

    fn text_end(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("text_end");
    }

    fn masked(&mut self, info: &MaskedInfo) {
        self.line(&format!("masked bounds={:?} uses_luma={}", info.mask_bounds, info.uses_luma));
        self.depth += 1;
    }

    fn masked_child(&mut self) {
        self.line("masked_child");
    }

    fn end_masked(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("end_masked");
    }

    fn end_vector(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("end_vector");
    }
}
