//! The `Visitor` trait driven by the traverser.
//!
//! The traverser decodes opcodes and calls these methods in document
//! order; a host renderer implements `Visitor` to turn them into draw
//! calls. Rasterization itself is out of scope here — `si-render`
//! ships a bounds collector and a debug dumper as reference consumers.

use crate::color::Paint;
use crate::error::{SiError, SiResult};
use crate::path::PathSink;

/// Post-composite tint mode applied over the whole rendered image. Not
/// enumerated by name in the spec's data model; the envelope reserves one
/// mode-index byte alongside the tint color, so this fixes a
/// concrete index assignment for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TintMode {
    #[default]
    SrcIn,
    Multiply,
    Screen,
    Add,
}

impl TintMode {
    #[must_use]
    pub fn to_index(self) -> u8 {
        match self {
            TintMode::SrcIn => 0,
            TintMode::Multiply => 1,
            TintMode::Screen => 2,
            TintMode::Add => 3,
        }
    }

    pub fn from_index(i: u8) -> SiResult<Self> {
        Ok(match i {
            0 => TintMode::SrcIn,
            1 => TintMode::Multiply,
            2 => TintMode::Screen,
            3 => TintMode::Add,
            _ => return Err(SiError::Malformed),
        })
    }
}

/// Blend mode for a group's content against its backdrop. The GROUP
/// opcode's flag bits have no spare bit for it — the category
/// range 128..135 exactly fills a 3-bit flag space with
/// hasTransform/hasTransformNumber/hasGroupAlpha. Resolved by writing it
/// as a single unconditional trailing byte after a GROUP opcode's
/// transform/alpha payload (see `builder.rs`/`traverser.rs`), so every
/// `group()` call still round-trips its blend mode without touching the
/// documented flag bits or opcode ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Darken,
    Lighten,
}

impl BlendMode {
    #[must_use]
    pub fn to_index(self) -> u8 {
        match self {
            BlendMode::Normal => 0,
            BlendMode::Multiply => 1,
            BlendMode::Screen => 2,
            BlendMode::Darken => 3,
            BlendMode::Lighten => 4,
        }
    }

    pub fn from_index(i: u8) -> SiResult<Self> {
        Ok(match i {
            0 => BlendMode::Normal,
            1 => BlendMode::Multiply,
            2 => BlendMode::Screen,
            3 => BlendMode::Darken,
            4 => BlendMode::Lighten,
            _ => return Err(SiError::Malformed),
        })
    }
}

/// Arguments accompanying the `vector` event — the document's opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorInfo {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub tint_color: Option<crate::color::Argb>,
    pub tint_mode: TintMode,
}

/// Arguments accompanying a `group` event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupInfo {
    pub transform: Option<[f64; 6]>,
    pub group_alpha: Option<f64>,
    pub blend_mode: BlendMode,
}

/// Arguments accompanying a `masked` event (mask materialization).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskedInfo {
    pub mask_bounds: Option<(f64, f64, f64, f64)>,
    pub uses_luma: bool,
}

/// A text span's resolved attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpanInfo {
    pub content: String,
    pub font_family: Option<String>,
    pub font_size: f64,
    pub paint: Paint,
}

/// A lazily-resolved path reference: either the path just written inline,
/// or a back-reference the traverser seeked the rewind readers to. The
/// visitor walks it with any `PathSink`, including its own bounds
/// collector, without disturbing the forward read position.
pub trait PathData {
    /// Replay this path's commands into `sink`.
    fn visit(&self, sink: &mut dyn PathSink) -> crate::error::SiResult<()>;
}

/// Operations the traverser invokes, in document order.
///
/// A bounds-collector can ignore every non-geometric method; a renderer
/// implements all of them. No method is named `accumulator` — state lives
/// in `Self`, threaded through as `&mut self` instead.
pub trait Visitor {
    fn init(&mut self) {}
    fn vector(&mut self, info: &VectorInfo) {
        let _ = info;
    }
    fn group(&mut self, info: &GroupInfo) {
        let _ = info;
    }
    fn end_group(&mut self) {}
    fn path(&mut self, path: &dyn PathData, paint: &Paint) {
        let _ = (path, paint);
    }
    fn clip_path(&mut self, path: &dyn PathData) {
        let _ = path;
    }
    fn image(&mut self, image_number: u32) {
        let _ = image_number;
    }
    fn text(&mut self, paint: &Paint, font_family: Option<&str>) {
        let _ = (paint, font_family);
    }
    fn text_span(&mut self, span: &TextSpanInfo) {
        let _ = span;
    }
    fn text_multi_span_chunk(&mut self, chunk_index: u32) {
        let _ = chunk_index;
    }
    fn text_end(&mut self) {}
    fn masked(&mut self, info: &MaskedInfo) {
        let _ = info;
    }
    fn masked_child(&mut self) {}
    fn end_masked(&mut self) {}
    fn end_vector(&mut self) {}
}

/// A `Visitor` that ignores every event. Useful as a baseline for tests
/// that only care about the traversal itself succeeding.
#[derive(Debug, Default)]
pub struct NullVisitor;

impl Visitor for NullVisitor {}
