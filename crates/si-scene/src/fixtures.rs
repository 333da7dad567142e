//! JSON scene-graph fixtures for tests. The production path never
//! touches `serde_json` — this module exists so resolver tests can
//! describe a document declaratively instead of hand-assembling a
//! `SceneGraph` with `petgraph` calls in every test.
//!
//! `si_core`'s own types only grow `serde` impls behind its opt-in `serde`
//! feature (the wire codec itself never touches it), so JSON fixtures here
//! still mirror the command/color shapes with their own deserializable
//! shadow types rather than leaning on that feature directly.

use crate::id::NodeId;
use crate::model::{
    CascadePaint, GradientKind, GradientNode, NodeKind, SceneColor, SceneGradientStop, SceneGraph, SceneNode,
    StyleRule, Stylesheet, TextAttrs, TextSpanNode,
};
use serde::Deserialize;
use si_core::PathCmd;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct FixtureDoc {
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub stylesheet: Vec<StyleRule>,
    #[serde(default)]
    pub children: Vec<FixtureNode>,
}

#[derive(Debug, Deserialize)]
pub struct FixtureNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub kind: FixtureKind,
    #[serde(default)]
    pub paint: CascadePaint,
    #[serde(default)]
    pub text_attrs: TextAttrs,
    #[serde(default)]
    pub transform: Option<[f64; 6]>,
    #[serde(default = "default_true")]
    pub display: bool,
    #[serde(default)]
    pub group_alpha: Option<f64>,
    #[serde(default)]
    pub mask: Option<String>,
    #[serde(default)]
    pub style_class: Vec<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FixtureGradientKind {
    Linear,
    Radial,
    Sweep,
}

#[derive(Debug, Deserialize)]
pub struct FixtureGradientStop {
    pub offset: f64,
    pub color: FixtureColor,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FixtureColor {
    Explicit { argb: u32 },
    None,
    CurrentColor,
    GradientRef { target: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FixtureKind {
    Group { children: Vec<FixtureNode> },
    Defs { children: Vec<FixtureNode> },
    Mask { children: Vec<FixtureNode> },
    Use { target: String },
    Path { data: Vec<FixturePathCmd> },
    Rect { x: f64, y: f64, width: f64, height: f64 },
    Ellipse { cx: f64, cy: f64, rx: f64, ry: f64 },
    Poly { points: Vec<(f64, f64)>, closed: bool },
    Gradient {
        kind: FixtureGradientKind,
        #[serde(default)]
        parent: Option<String>,
        #[serde(default)]
        object_bounding_box: Option<bool>,
        #[serde(default)]
        stops: Option<Vec<FixtureGradientStop>>,
        #[serde(default)]
        x1: Option<f64>,
        #[serde(default)]
        y1: Option<f64>,
        #[serde(default)]
        x2: Option<f64>,
        #[serde(default)]
        y2: Option<f64>,
        #[serde(default)]
        cx: Option<f64>,
        #[serde(default)]
        cy: Option<f64>,
        #[serde(default)]
        r: Option<f64>,
    },
    Image { x: f64, y: f64, width: f64, height: f64, encoded: Vec<u8> },
    Text { spans: Vec<FixtureSpan> },
}

#[derive(Debug, Deserialize)]
pub struct FixtureSpan {
    pub content: String,
    #[serde(default)]
    pub font_family: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
}

/// Mirrors `si_core::path::PathCmd`, one variant per wire command.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum FixturePathCmd {
    MoveTo { x: f64, y: f64 },
    LineTo { x: f64, y: f64 },
    CubicTo { c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64 },
    Close,
    Circle { left: f64, top: f64, width: f64 },
    Ellipse { left: f64, top: f64, width: f64, height: f64 },
}

impl From<FixturePathCmd> for PathCmd {
    fn from(c: FixturePathCmd) -> Self {
        match c {
            FixturePathCmd::MoveTo { x, y } => PathCmd::MoveTo(x, y),
            FixturePathCmd::LineTo { x, y } => PathCmd::LineTo(x, y),
            FixturePathCmd::CubicTo { c1x, c1y, c2x, c2y, x, y } => PathCmd::CubicTo(c1x, c1y, c2x, c2y, x, y),
            FixturePathCmd::Close => PathCmd::Close,
            FixturePathCmd::Circle { left, top, width } => PathCmd::Circle { left, top, width },
            FixturePathCmd::Ellipse { left, top, width, height } => PathCmd::Ellipse { left, top, width, height },
        }
    }
}

impl FixtureDoc {
    /// Parse and build in one step.
    pub fn from_json(text: &str) -> serde_json::Result<SceneGraph> {
        let doc: FixtureDoc = serde_json::from_str(text)?;
        Ok(doc.build())
    }

    #[must_use]
    pub fn build(self) -> SceneGraph {
        let mut graph = SceneGraph::new();
        graph.width = self.width;
        graph.height = self.height;
        graph.stylesheet = Stylesheet { rules: self.stylesheet };
        let root = graph.root;
        for child in self.children {
            add_fixture_node(&mut graph, root, child);
        }
        graph
    }
}

fn add_fixture_node(graph: &mut SceneGraph, parent: petgraph::graph::NodeIndex, fixture: FixtureNode) {
    let id = fixture.id.map(|s| NodeId::intern(&s)).unwrap_or_else(NodeId::anonymous);
    let (kind, grandchildren) = split_kind(fixture.kind);

    let mut node = SceneNode::new(id, kind);
    node.paint = fixture.paint;
    node.text_attrs = fixture.text_attrs;
    node.transform = fixture.transform;
    node.display = fixture.display;
    node.group_alpha = fixture.group_alpha;
    node.mask = fixture.mask.map(|s| NodeId::intern(&s));
    node.style_class = fixture.style_class.into();

    let idx = graph.add_child(parent, node);
    for child in grandchildren {
        add_fixture_node(graph, idx, child);
    }
}

fn split_kind(kind: FixtureKind) -> (NodeKind, Vec<FixtureNode>) {
    match kind {
        FixtureKind::Group { children } => (NodeKind::Group, children),
        FixtureKind::Defs { children } => (NodeKind::Defs, children),
        FixtureKind::Mask { children } => (NodeKind::Mask, children),
        FixtureKind::Use { target } => (NodeKind::Use { target: NodeId::intern(&target) }, Vec::new()),
        FixtureKind::Path { data } => {
            (NodeKind::Path { data: data.into_iter().map(Into::into).collect() }, Vec::new())
        }
        FixtureKind::Rect { x, y, width, height } => (NodeKind::Rect { x, y, width, height }, Vec::new()),
        FixtureKind::Ellipse { cx, cy, rx, ry } => (NodeKind::Ellipse { cx, cy, rx, ry }, Vec::new()),
        FixtureKind::Poly { points, closed } => (NodeKind::Poly { points, closed }, Vec::new()),
        FixtureKind::Gradient { kind, parent, object_bounding_box, stops, x1, y1, x2, y2, cx, cy, r } => {
            let gradient_kind = match kind {
                FixtureGradientKind::Linear => GradientKind::Linear,
                FixtureGradientKind::Radial => GradientKind::Radial,
                FixtureGradientKind::Sweep => GradientKind::Sweep,
            };
            let node = GradientNode {
                kind: Some(gradient_kind),
                parent: parent.map(|s| NodeId::intern(&s)),
                object_bounding_box,
                spread: None,
                transform: None,
                stops: stops.map(|ss| {
                    ss.into_iter()
                        .map(|s| SceneGradientStop { offset: s.offset, color: fixture_color(s.color) })
                        .collect()
                }),
                x1,
                y1,
                x2,
                y2,
                cx,
                cy,
                r,
                start_angle: None,
                end_angle: None,
            };
            (NodeKind::Gradient(node), Vec::new())
        }
        FixtureKind::Image { x, y, width, height, encoded } => {
            (NodeKind::Image { encoded, x, y, width, height }, Vec::new())
        }
        FixtureKind::Text { spans } => (
            NodeKind::Text {
                spans: spans
                    .into_iter()
                    .map(|s| TextSpanNode { content: s.content, font_family: s.font_family, font_size: s.font_size, paint: None })
                    .collect(),
            },
            Vec::new(),
        ),
    }
}

fn fixture_color(c: FixtureColor) -> SceneColor {
    match c {
        FixtureColor::Explicit { argb } => SceneColor::Explicit(si_core::Argb(argb)),
        FixtureColor::None => SceneColor::None,
        FixtureColor::CurrentColor => SceneColor::CurrentColor,
        FixtureColor::GradientRef { target } => SceneColor::GradientRef(NodeId::intern(&target)),
    }
}

#[allow(unused)]
pub fn style_rule(tag: &str, class: Option<&str>, paint: CascadePaint) -> StyleRule {
    StyleRule { tag: tag.to_string(), class: class.map(str::to_string), paint, text_attrs: TextAttrs::default() }
}
