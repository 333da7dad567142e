//! Pre-IR scene graph data model.
//!
//! Built by an external parser (SVG-like XML parsing is explicitly out of
//! scope here) and owned/mutated in place by [`crate::resolve::resolve`].
//! Every inheritable node carries a `paint`, `text_attrs`, optional
//! `transform`, `display` flag, `group_alpha`, `blend_mode`, and
//! `style_class` — the fields the stylesheet cascade and paint cascade
//! both read and write during resolution.

use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use si_core::{Argb, BlendMode, FillType, StrokeCap, StrokeJoin, TintMode};
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::id::NodeId;

// ─── Cascadable color & paint ───────────────────────────────────────────────

/// A color as it appears in the *source* graph: gradients are referenced by
/// id (`url(#grad1)`) rather than carrying resolved geometry inline — that
/// resolution happens in [`crate::resolve`] by walking the gradient's
/// parent chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SceneColor {
    Explicit(Argb),
    None,
    CurrentColor,
    GradientRef(NodeId),
}

/// A paint with every field optional, so cascading only fills what a node
/// left empty — applying a style only fills fields the node left empty,
/// `orInherit` semantics. The same `orInherit` rule governs paint
/// inheritance down the tree during the later resolve pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadePaint {
    pub fill_color: Option<SceneColor>,
    pub stroke_color: Option<SceneColor>,
    pub stroke_width: Option<f64>,
    pub stroke_miter_limit: Option<f64>,
    pub stroke_join: Option<StrokeJoin>,
    pub stroke_cap: Option<StrokeCap>,
    pub fill_type: Option<FillType>,
    pub stroke_dash_array: Option<Vec<f64>>,
    pub stroke_dash_offset: Option<f64>,
    /// SVG `fill-opacity`: multiplies into a solid fill's alpha at build
    /// time. It does *not* touch gradient stop alpha — stops carry their
    /// own alpha independently.
    pub fill_opacity: Option<f64>,
    pub stroke_opacity: Option<f64>,
}

impl CascadePaint {
    /// Fill every field this node left `None` from `ancestor`'s cascaded
    /// paint. Fields this node already set win.
    #[must_use]
    pub fn cascade(&self, ancestor: &CascadePaint) -> CascadePaint {
        CascadePaint {
            fill_color: self.fill_color.clone().or_else(|| ancestor.fill_color.clone()),
            stroke_color: self.stroke_color.clone().or_else(|| ancestor.stroke_color.clone()),
            stroke_width: self.stroke_width.or(ancestor.stroke_width),
            stroke_miter_limit: self.stroke_miter_limit.or(ancestor.stroke_miter_limit),
            stroke_join: self.stroke_join.or(ancestor.stroke_join),
            stroke_cap: self.stroke_cap.or(ancestor.stroke_cap),
            fill_type: self.fill_type.or(ancestor.fill_type),
            stroke_dash_array: self.stroke_dash_array.clone().or_else(|| ancestor.stroke_dash_array.clone()),
            stroke_dash_offset: self.stroke_dash_offset.or(ancestor.stroke_dash_offset),
            fill_opacity: self.fill_opacity.or(ancestor.fill_opacity),
            stroke_opacity: self.stroke_opacity.or(ancestor.stroke_opacity),
        }
    }

    /// Same `orInherit` merge used by [`Self::cascade`], applied when a
    /// stylesheet rule only wants to fill gaps, not override.
    #[must_use]
    pub fn or_inherit(&self, style: &CascadePaint) -> CascadePaint {
        self.cascade(style)
    }
}

/// Cascadable text attributes, mirroring the inheritable-fields pattern
/// `CascadePaint` uses. Minimal — font shaping and metrics are out of
/// scope here; only the attributes a `text`/`text_span` IR event carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextAttrs {
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
}

impl TextAttrs {
    #[must_use]
    pub fn cascade(&self, ancestor: &TextAttrs) -> TextAttrs {
        TextAttrs {
            font_family: self.font_family.clone().or_else(|| ancestor.font_family.clone()),
            font_size: self.font_size.or(ancestor.font_size),
        }
    }
}

// ─── Gradients ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientKind {
    Linear,
    Radial,
    Sweep,
}

/// A stop as authored: offset and color are present, but a stop color must
/// not itself be a gradient reference, enforced at resolve time as
/// `BadGradientStopColor` bubbling out of the eventual IR write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneGradientStop {
    pub offset: f64,
    pub color: SceneColor,
}

/// A `<linearGradient>`/`<radialGradient>`/`<sweepGradient>` node. Fields
/// left `None` fall back to the node named by `parent`, walked with cycle
/// detection during resolve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GradientNode {
    pub kind: Option<GradientKind>,
    pub parent: Option<NodeId>,
    pub object_bounding_box: Option<bool>,
    pub spread: Option<si_core::SpreadMethod>,
    pub transform: Option<[f64; 6]>,
    pub stops: Option<Vec<SceneGradientStop>>,
    // Geometry, keyed by `kind`. Unused fields for a given kind are ignored.
    pub x1: Option<f64>,
    pub y1: Option<f64>,
    pub x2: Option<f64>,
    pub y2: Option<f64>,
    pub cx: Option<f64>,
    pub cy: Option<f64>,
    pub r: Option<f64>,
    pub start_angle: Option<f64>,
    pub end_angle: Option<f64>,
}

impl GradientNode {
    /// `orInherit`-merge geometry/stops from `parent` (the node this
    /// gradient's `parent` id resolved to) — inherited geometry falls
    /// back to the parent's.
    #[must_use]
    pub fn inherit_from(&self, parent: &GradientNode) -> GradientNode {
        GradientNode {
            kind: self.kind.or(parent.kind),
            parent: self.parent,
            object_bounding_box: self.object_bounding_box.or(parent.object_bounding_box),
            spread: self.spread.or(parent.spread),
            transform: self.transform.or(parent.transform),
            stops: self.stops.clone().or_else(|| parent.stops.clone()),
            x1: self.x1.or(parent.x1),
            y1: self.y1.or(parent.y1),
            x2: self.x2.or(parent.x2),
            y2: self.y2.or(parent.y2),
            cx: self.cx.or(parent.cx),
            cy: self.cy.or(parent.cy),
            r: self.r.or(parent.r),
            start_angle: self.start_angle.or(parent.start_angle),
            end_angle: self.end_angle.or(parent.end_angle),
        }
    }
}

// ─── Path-bearing shapes ──────────────────────────────────────────────────

/// Freeform path data the scene graph carries, identical in shape to
/// `si_core::PathCmd` but kept as a distinct type so `si-scene` has no
/// compile-time coupling to the IR's dedup/codec internals beyond what it
/// feeds into the `Builder`.
pub type ScenePathCmd = si_core::PathCmd;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpanNode {
    pub content: String,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub paint: Option<CascadePaint>,
}

/// The node kinds the external parser can produce. `Masked` has no variant
/// here — it is synthesized by the resolver in memory only for the
/// duration of a single `resolve_node` call and is never a stored graph
/// node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Root,
    Group,
    Defs,
    Mask,
    Use { target: NodeId },
    Path { data: Vec<ScenePathCmd> },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Poly { points: Vec<(f64, f64)>, closed: bool },
    Gradient(GradientNode),
    Image { encoded: Vec<u8>, x: f64, y: f64, width: f64, height: f64 },
    Text { spans: Vec<TextSpanNode> },
}

impl NodeKind {
    /// CSS tag name used by the stylesheet cascade.
    #[must_use]
    pub fn tag_name(&self) -> &'static str {
        match self {
            NodeKind::Root => "svg",
            NodeKind::Group => "g",
            NodeKind::Defs => "defs",
            NodeKind::Mask => "mask",
            NodeKind::Use { .. } => "use",
            NodeKind::Path { .. } => "path",
            NodeKind::Rect { .. } => "rect",
            NodeKind::Ellipse { .. } => "ellipse",
            NodeKind::Poly { closed: true, .. } => "polygon",
            NodeKind::Poly { closed: false, .. } => "polyline",
            NodeKind::Gradient(GradientNode { kind: Some(GradientKind::Radial), .. }) => "radialGradient",
            NodeKind::Gradient(GradientNode { kind: Some(GradientKind::Sweep), .. }) => "sweepGradient",
            NodeKind::Gradient(_) => "linearGradient",
            NodeKind::Image { .. } => "image",
            NodeKind::Text { .. } => "text",
        }
    }
}

/// A node in the pre-IR scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub paint: CascadePaint,
    pub text_attrs: TextAttrs,
    pub transform: Option<[f64; 6]>,
    pub display: bool,
    pub group_alpha: Option<f64>,
    pub blend_mode: Option<BlendMode>,
    /// `mask="url(#id)"`.
    pub mask: Option<NodeId>,
    /// Whitespace-separated class tokens from `class="..."`, the set of
    /// class tokens computed from a node's `style_class` attribute.
    pub style_class: SmallVec<[String; 2]>,
}

impl SceneNode {
    #[must_use]
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            paint: CascadePaint::default(),
            text_attrs: TextAttrs::default(),
            transform: None,
            display: true,
            group_alpha: None,
            blend_mode: None,
            mask: None,
            style_class: SmallVec::new(),
        }
    }
}

// ─── Stylesheet ───────────────────────────────────────────────────────────

/// A single `tag[.class] { ... }` stylesheet rule, in source order — the
/// cascade walks the stylesheet list for a given tag in reverse insertion
/// order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleRule {
    pub tag: String,
    /// `None` matches any node of `tag` that has no class of its own.
    pub class: Option<String>,
    pub paint: CascadePaint,
    pub text_attrs: TextAttrs,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stylesheet {
    pub rules: Vec<StyleRule>,
}

// ─── Scene graph ───────────────────────────────────────────────────────────

/// The complete pre-IR document: a tree of [`SceneNode`]s plus the id
/// lookup table the resolver's `use`/`mask`/gradient-parent references
/// consult.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub graph: StableDiGraph<SceneNode, ()>,
    pub root: NodeIndex,
    pub id_index: HashMap<NodeId, NodeIndex>,
    pub stylesheet: Stylesheet,
    /// Document-level attributes matching `Builder::vector`'s own
    /// `(width?, height?, tint_color?, tint_mode?)` parameters — these
    /// live on the graph itself rather than the root node, since
    /// `Builder::vector` has no transform/mask parameters and the root
    /// node's own `paint`/`transform`/`mask` fields are therefore unused.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub tint_color: Option<Argb>,
    pub tint_mode: TintMode,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneNode::new(NodeId::intern("\0root"), NodeKind::Root));
        let mut id_index = HashMap::new();
        id_index.insert(NodeId::intern("\0root"), root);
        Self {
            graph,
            root,
            id_index,
            stylesheet: Stylesheet::default(),
            width: None,
            height: None,
            tint_color: None,
            tint_mode: TintMode::default(),
        }
    }

    /// Insert `node` as a child of `parent`, registering it by id if one
    /// was assigned.
    pub fn add_child(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let id = node.id;
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        idx
    }

    /// Children of `idx` in insertion order (the order `petgraph` returns
    /// edges added via `add_edge` is reverse-insertion; we restore
    /// document order here since the resolver and bounds pass both require
    /// left-to-right emission).
    #[must_use]
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut kids: Vec<_> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .collect();
        kids.reverse();
        kids
    }

    #[must_use]
    pub fn lookup(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_child_preserves_document_order() {
        let mut g = SceneGraph::new();
        let a = g.add_child(g.root, SceneNode::new(NodeId::intern("a"), NodeKind::Group));
        let b = g.add_child(g.root, SceneNode::new(NodeId::intern("b"), NodeKind::Group));
        assert_eq!(g.children(g.root), vec![a, b]);
    }

    #[test]
    fn lookup_finds_registered_ids() {
        let mut g = SceneGraph::new();
        let rect = g.add_child(
            g.root,
            SceneNode::new(NodeId::intern("r1"), NodeKind::Rect { x: 0.0, y: 0.0, width: 1.0, height: 1.0 }),
        );
        assert_eq!(g.lookup(NodeId::intern("r1")), Some(rect));
        assert_eq!(g.lookup(NodeId::intern("missing")), None);
    }
}
