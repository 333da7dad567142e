//! The two-pass resolver: stylesheet cascade, depth-first reference
//! resolution with cycle detection, mask materialization, and a
//! canonicalize-then-build split that keeps string/image table indices
//! stable across the whole document.
//!
//! Resolution happens in three stages rather than two, because a single
//! depth-first walk that both resolves references and feeds the builder
//! would conflate two concerns this implementation keeps separate:
//! walking the graph into an intermediate form, and driving the builder
//! from that form. Splitting them is what makes the canonicalization
//! pre-pass possible without invoking the builder twice:
//!
//! 1. **Pass A** ([`apply_stylesheet`]) — cascades stylesheet rules into
//!    every node's `paint`/`text_attrs` in place.
//! 2. **Pass B** ([`resolve_node`]) — depth-first walk producing a
//!    [`Resolved`] tree: pruning, cascading, reference resolution, mask
//!    materialization. No `Builder` calls happen here.
//! 3. **Canonicalize + emit** — a cheap walk of the `Resolved` tree
//!    assigns stable string/image indices ([`canon::Canonicalizer`]),
//!    then [`emit`] drives the `Builder` using those indices.

use crate::bounds::{path_bounds, Bounds};
use crate::canon::Canonicalizer;
use crate::config::ResolverConfig;
use crate::id::NodeId;
use crate::model::{
    CascadePaint, GradientKind, GradientNode, NodeKind, SceneColor, SceneGraph, SceneNode, TextSpanNode,
};
use crate::referrers::{Referrers, ReferrersGuard};
use crate::warning::{ResolveWarning, WarningSink};
use petgraph::graph::NodeIndex;
use si_core::{
    Argb, Builder, FillType, Gradient, GradientGeometry, ImageAsset, Paint, PathCmd, SiColor, SiError, SiResult,
    SpreadMethod, StrokeCap, StrokeJoin, TransformRef,
};

/// The fully-resolved, pre-canonicalization shape of a document: every
/// prune decision has been made, every reference followed, every mask
/// materialized. The only thing left before this can drive a `Builder` is
/// assigning string/image table indices.
#[derive(Debug, Clone)]
enum Resolved {
    Group {
        transform: Option<[f64; 6]>,
        group_alpha: Option<f64>,
        blend_mode: si_core::BlendMode,
        children: Vec<Resolved>,
    },
    Masked {
        mask_bounds: Option<(f64, f64, f64, f64)>,
        uses_luma: bool,
        target: Box<Resolved>,
        mask_children: Vec<Resolved>,
    },
    Path {
        cmds: Vec<PathCmd>,
        paint: Paint,
    },
    Image {
        asset: ImageAsset,
    },
    Text {
        paint: Paint,
        font_family: Option<String>,
        spans: Vec<ResolvedSpan>,
    },
}

#[derive(Debug, Clone)]
struct ResolvedSpan {
    content: String,
    font_family_override: Option<String>,
    font_size: f64,
    paint_override: Option<Paint>,
}

/// Run the full resolve pipeline, driving `warn` with every non-fatal
/// diagnostic noticed along the way. Nothing here ever aborts on a
/// diagnosable condition — a dangling reference or empty mask just drops
/// the offending content and keeps going — so a caller that doesn't care
/// can pass `&mut |_| {}`.
pub fn resolve(
    mut graph: SceneGraph,
    config: &ResolverConfig,
    warn: &mut dyn FnMut(ResolveWarning),
) -> SiResult<si_core::CompactImage> {
    apply_stylesheet(&mut graph);

    let mut referrers = Referrers::new();
    let mut warnings = WarningSink::new(warn);
    let root_paint = CascadePaint::default();
    let root_text = crate::model::TextAttrs::default();

    let mut top: Vec<Resolved> = Vec::new();
    for child in graph.children(graph.root) {
        if let Some(r) = resolve_node(&graph, child, &root_paint, &root_text, &mut referrers, &mut warnings, config) {
            top.push(r);
        }
    }

    let mut canon = Canonicalizer::new();
    for r in &top {
        canonicalize_one(r, &mut canon);
    }
    let strings_snapshot = canon_tables(&canon);

    let mut builder = Builder::new(config.builder);
    builder.init(strings_snapshot.0, strings_snapshot.1, strings_snapshot.2)?;
    builder.vector(graph.width, graph.height, graph.tint_color, graph.tint_mode)?;
    for r in &top {
        emit(r, &mut builder, &canon)?;
    }
    builder.end_vector()
}

/// `Canonicalizer` doesn't expose its tables except by consuming itself,
/// but `resolve` still needs `string_index`/`image_index` lookups during
/// `emit` afterward — so snapshot the tables by cloning rather than
/// consuming.
fn canon_tables(canon: &Canonicalizer) -> (Vec<ImageAsset>, Vec<String>, Vec<Vec<f64>>) {
    // `Canonicalizer::finish` is the only place that owns the tables;
    // reuse it on a clone so the original keeps serving index lookups.
    canon.clone().finish()
}

fn canonicalize_one(r: &Resolved, canon: &mut Canonicalizer) {
    match r {
        Resolved::Group { children, .. } => children.iter().for_each(|c| canonicalize_one(c, canon)),
        Resolved::Masked { target, mask_children, .. } => {
            canonicalize_one(target, canon);
            mask_children.iter().for_each(|c| canonicalize_one(c, canon));
        }
        Resolved::Path { .. } => {}
        Resolved::Image { asset } => {
            canon.intern_image(asset.clone());
        }
        Resolved::Text { font_family, spans, .. } => {
            if let Some(f) = font_family {
                canon.intern_string(f);
            }
            for s in spans {
                canon.intern_string(&s.content);
                if let Some(f) = &s.font_family_override {
                    canon.intern_string(f);
                }
            }
        }
    }
}

fn emit(r: &Resolved, builder: &mut Builder, canon: &Canonicalizer) -> SiResult<()> {
    match r {
        Resolved::Group { transform, group_alpha, blend_mode, children } => {
            builder.group(*transform, *group_alpha, *blend_mode)?;
            for c in children {
                emit(c, builder, canon)?;
            }
            builder.end_group()
        }
        Resolved::Masked { mask_bounds, uses_luma, target, mask_children } => {
            builder.masked(*mask_bounds, *uses_luma)?;
            emit(target, builder, canon)?;
            builder.masked_child()?;
            for c in mask_children {
                emit(c, builder, canon)?;
            }
            builder.end_masked()
        }
        Resolved::Path { cmds, paint } => builder.path(cmds, paint),
        Resolved::Image { asset } => {
            let idx = canon
                .image_index(asset)
                .ok_or(SiError::CanonicalizationMiss("image not interned during the dry run"))?;
            builder.image(idx)
        }
        Resolved::Text { paint, font_family, spans } => {
            let ff = font_family
                .as_deref()
                .map(|f| canon.string_index(f).ok_or(SiError::CanonicalizationMiss("font family not interned")))
                .transpose()?;
            builder.text(paint, ff)?;
            for s in spans {
                let content = canon
                    .string_index(&s.content)
                    .ok_or(SiError::CanonicalizationMiss("span content not interned"))?;
                let ff_override = s
                    .font_family_override
                    .as_deref()
                    .map(|f| canon.string_index(f).ok_or(SiError::CanonicalizationMiss("font family override not interned")))
                    .transpose()?;
                builder.text_span(content, ff_override, s.font_size, s.paint_override.as_ref())?;
            }
            builder.text_end()
        }
    }
}

// ─── Pass A: stylesheet ────────────────────────────────────────────────────

/// Apply every stylesheet rule to every node. Order within the graph
/// doesn't matter here — each node is judged solely by
/// its own tag/class, never by ancestors — so a flat iteration over all
/// nodes suffices.
fn apply_stylesheet(graph: &mut SceneGraph) {
    let rules = graph.stylesheet.rules.clone();
    for node in graph.graph.node_weights_mut() {
        let tag = node.kind.tag_name();
        for tag_candidate in [tag, ""] {
            for rule in rules.iter().rev() {
                if rule.tag != tag_candidate {
                    continue;
                }
                if let Some(class) = &rule.class {
                    if node.style_class.iter().any(|c| c == class) {
                        node.paint = node.paint.or_inherit(&rule.paint);
                        node.text_attrs = node.text_attrs.cascade(&rule.text_attrs);
                    }
                }
            }
        }
        for rule in rules.iter().rev() {
            if rule.tag == tag && rule.class.is_none() {
                node.paint = node.paint.or_inherit(&rule.paint);
                node.text_attrs = node.text_attrs.cascade(&rule.text_attrs);
            }
        }
    }
}

// ─── Pass B: resolve ────────────────────────────────────────────────────────

fn determinant(t: [f64; 6]) -> f64 {
    t[0] * t[3] - t[1] * t[2]
}

#[allow(clippy::too_many_arguments)]
fn resolve_node(
    graph: &SceneGraph,
    idx: NodeIndex,
    ancestor_paint: &CascadePaint,
    ancestor_text: &crate::model::TextAttrs,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
    config: &ResolverConfig,
) -> Option<Resolved> {
    let node = &graph.graph[idx];

    if referrers.contains(node.id) {
        warnings.push(ResolveWarning::ReferenceCycle { from: node.id, target: node.id });
        return None;
    }
    let _guard = referrers.enter(node.id);

    if !node.display {
        return None;
    }
    if let Some(t) = node.transform {
        if determinant(t).abs() < f64::EPSILON {
            return None;
        }
    }

    let paint = node.paint.cascade(ancestor_paint);
    let text = node.text_attrs.cascade(ancestor_text);

    let core = match &node.kind {
        NodeKind::Root | NodeKind::Group => {
            let children = resolve_children(graph, idx, &paint, &text, referrers, warnings, config);
            if children.is_empty() {
                None
            } else {
                Some(Resolved::Group { transform: None, group_alpha: None, blend_mode: si_core::BlendMode::Normal, children })
            }
        }
        NodeKind::Defs | NodeKind::Mask => None,
        NodeKind::Gradient(_) => None,
        NodeKind::Use { target } => resolve_use(graph, node, *target, &paint, &text, referrers, warnings, config),
        NodeKind::Path { data } => resolve_shape(graph, data.clone(), &paint, config, referrers, warnings),
        NodeKind::Rect { x, y, width, height } => {
            if *width <= 0.0 || *height <= 0.0 {
                None
            } else {
                resolve_shape(graph, rect_path(*x, *y, *width, *height), &paint, config, referrers, warnings)
            }
        }
        NodeKind::Ellipse { cx, cy, rx, ry } => {
            if *rx <= 0.0 || *ry <= 0.0 {
                None
            } else {
                resolve_shape(graph, ellipse_path(*cx, *cy, *rx, *ry), &paint, config, referrers, warnings)
            }
        }
        NodeKind::Poly { points, closed } => {
            if points.len() < 2 {
                None
            } else {
                resolve_shape(graph, poly_path(points, *closed), &paint, config, referrers, warnings)
            }
        }
        NodeKind::Image { encoded, x, y, width, height } => {
            if *width <= 0.0 || *height <= 0.0 {
                None
            } else {
                Some(Resolved::Image { asset: ImageAsset { x: *x, y: *y, width: *width, height: *height, encoded: encoded.clone() } })
            }
        }
        NodeKind::Text { spans } => resolve_text(graph, spans, &paint, &text, config, referrers, warnings),
    }?;

    let needs_wrap = node.transform.is_some()
        || node.group_alpha.is_some()
        || node.blend_mode.is_some_and(|b| b != si_core::BlendMode::Normal);
    let wrapped = if needs_wrap {
        Resolved::Group {
            transform: node.transform,
            group_alpha: node.group_alpha,
            blend_mode: node.blend_mode.unwrap_or_default(),
            children: vec![core],
        }
    } else {
        core
    };

    apply_mask(graph, node, wrapped, referrers, warnings, config)
}

fn resolve_children(
    graph: &SceneGraph,
    idx: NodeIndex,
    paint: &CascadePaint,
    text: &crate::model::TextAttrs,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
    config: &ResolverConfig,
) -> Vec<Resolved> {
    graph
        .children(idx)
        .into_iter()
        .filter_map(|c| resolve_node(graph, c, paint, text, referrers, warnings, config))
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn resolve_use(
    graph: &SceneGraph,
    node: &SceneNode,
    target: NodeId,
    paint: &CascadePaint,
    text: &crate::model::TextAttrs,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
    config: &ResolverConfig,
) -> Option<Resolved> {
    if target == node.id {
        warnings.push(ResolveWarning::ReferenceCycle { from: node.id, target });
        return None;
    }
    let Some(target_idx) = graph.lookup(target) else {
        warnings.push(ResolveWarning::DanglingReference { from: node.id, target });
        return None;
    };
    resolve_node(graph, target_idx, paint, text, referrers, warnings, config)
}

fn resolve_shape(
    graph: &SceneGraph,
    cmds: Vec<PathCmd>,
    paint: &CascadePaint,
    config: &ResolverConfig,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
) -> Option<Resolved> {
    if cmds.is_empty() {
        return None;
    }
    let bounds = path_bounds(&cmds);
    let resolved_paint = resolve_paint(graph, paint, bounds, config, referrers, warnings);
    Some(Resolved::Path { cmds, paint: resolved_paint })
}

#[allow(clippy::too_many_arguments)]
fn resolve_text(
    graph: &SceneGraph,
    spans: &[TextSpanNode],
    paint: &CascadePaint,
    text: &crate::model::TextAttrs,
    config: &ResolverConfig,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
) -> Option<Resolved> {
    if spans.is_empty() {
        return None;
    }
    let resolved_paint = resolve_paint(graph, paint, Bounds::EMPTY, config, referrers, warnings);
    let resolved_spans = spans
        .iter()
        .map(|s| {
            let font_size = s.font_size.or(text.font_size).unwrap_or(16.0);
            let paint_override = s.paint.as_ref().map(|p| {
                let merged = p.cascade(paint);
                resolve_paint(graph, &merged, Bounds::EMPTY, config, referrers, warnings)
            });
            ResolvedSpan {
                content: s.content.clone(),
                font_family_override: s.font_family.clone(),
                font_size,
                paint_override,
            }
        })
        .collect();
    Some(Resolved::Text { paint: resolved_paint, font_family: text.font_family.clone(), spans: resolved_spans })
}

/// When a node carries `mask=url(#id)`, wrap it in a synthetic `Masked`.
/// Any transform/alpha/blend the node itself carries was already
/// promoted onto an enclosing group by the
/// `needs_wrap` step in `resolve_node` before this runs, so the mask
/// always composites over the fully-transformed content.
fn apply_mask(
    graph: &SceneGraph,
    node: &SceneNode,
    inner: Resolved,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
    config: &ResolverConfig,
) -> Option<Resolved> {
    let Some(mask_id) = node.mask else {
        return Some(inner);
    };
    let Some(mask_idx) = graph.lookup(mask_id) else {
        warnings.push(ResolveWarning::DanglingReference { from: node.id, target: mask_id });
        return Some(inner);
    };
    if referrers.contains(mask_id) {
        warnings.push(ResolveWarning::ReferenceCycle { from: node.id, target: mask_id });
        return Some(inner);
    }
    let _guard = referrers.enter(mask_id);

    if !matches!(graph.graph[mask_idx].kind, NodeKind::Mask) {
        return Some(inner);
    }

    let default_paint = CascadePaint::default();
    let default_text = crate::model::TextAttrs::default();
    let mask_children = resolve_children(graph, mask_idx, &default_paint, &default_text, referrers, warnings, config);
    if mask_children.is_empty() {
        warnings.push(ResolveWarning::EmptyMask { mask: mask_id });
        return Some(inner);
    }

    let uses_luma = mask_content_needs_luma(&mask_children);
    let mask_bounds = Some(resolved_bounds(&mask_children).as_xywh());
    Some(Resolved::Masked { mask_bounds, uses_luma, target: Box::new(inner), mask_children })
}

/// A mask whose content is provably grayscale and fully opaque is
/// alpha-equivalent to its own luma, so the renderer
/// can skip a luminance pass. Any raster image, gradient, `currentColor`,
/// or non-grayscale explicit color makes that equivalence unsafe, so we
/// conservatively report `true` (needs luma) whenever we can't prove
/// otherwise.
fn mask_content_needs_luma(nodes: &[Resolved]) -> bool {
    nodes.iter().any(node_needs_luma)
}

fn node_needs_luma(n: &Resolved) -> bool {
    match n {
        Resolved::Group { children, .. } => mask_content_needs_luma(children),
        Resolved::Masked { target, mask_children, .. } => node_needs_luma(target) || mask_content_needs_luma(mask_children),
        Resolved::Path { paint, .. } => paint_needs_luma(paint),
        Resolved::Text { paint, spans, .. } => {
            paint_needs_luma(paint) || spans.iter().any(|s| s.paint_override.as_ref().is_some_and(paint_needs_luma))
        }
        Resolved::Image { .. } => true,
    }
}

fn paint_needs_luma(paint: &Paint) -> bool {
    color_needs_luma(&paint.fill_color) || color_needs_luma(&paint.stroke_color)
}

fn color_needs_luma(c: &SiColor) -> bool {
    match c {
        SiColor::Explicit(argb) => {
            let v = argb.0;
            let r = (v >> 16) & 0xff;
            let g = (v >> 8) & 0xff;
            let b = v & 0xff;
            !(r == g && g == b)
        }
        SiColor::None => false,
        SiColor::CurrentColor | SiColor::Gradient(_) => true,
    }
}

fn resolved_bounds(nodes: &[Resolved]) -> Bounds {
    nodes.iter().fold(Bounds::EMPTY, |acc, n| acc.union(node_bounds(n)))
}

fn node_bounds(n: &Resolved) -> Bounds {
    match n {
        Resolved::Group { transform, children, .. } => {
            let b = resolved_bounds(children);
            match transform {
                Some(t) => b.transform(*t),
                None => b,
            }
        }
        Resolved::Masked { target, .. } => node_bounds(target),
        Resolved::Path { cmds, .. } => path_bounds(cmds),
        Resolved::Image { asset } => {
            Bounds { min_x: asset.x, min_y: asset.y, max_x: asset.x + asset.width, max_y: asset.y + asset.height }
        }
        Resolved::Text { .. } => Bounds::EMPTY,
    }
}

// ─── Shape-to-path lowering ─────────────────────────────────────────────────

fn rect_path(x: f64, y: f64, w: f64, h: f64) -> Vec<PathCmd> {
    vec![
        PathCmd::MoveTo(x, y),
        PathCmd::LineTo(x + w, y),
        PathCmd::LineTo(x + w, y + h),
        PathCmd::LineTo(x, y + h),
        PathCmd::Close,
    ]
}

fn ellipse_path(cx: f64, cy: f64, rx: f64, ry: f64) -> Vec<PathCmd> {
    vec![PathCmd::Ellipse { left: cx - rx, top: cy - ry, width: rx * 2.0, height: ry * 2.0 }]
}

fn poly_path(points: &[(f64, f64)], closed: bool) -> Vec<PathCmd> {
    let mut cmds = Vec::with_capacity(points.len() + 1);
    let (x0, y0) = points[0];
    cmds.push(PathCmd::MoveTo(x0, y0));
    for &(x, y) in &points[1..] {
        cmds.push(PathCmd::LineTo(x, y));
    }
    if closed {
        cmds.push(PathCmd::Close);
    }
    cmds
}

// ─── Paint & gradient resolution ────────────────────────────────────────────

fn resolve_paint(
    graph: &SceneGraph,
    paint: &CascadePaint,
    shape_bounds: Bounds,
    config: &ResolverConfig,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
) -> Paint {
    let fill_color = resolve_color(graph, paint.fill_color.as_ref(), shape_bounds, config, referrers, warnings, paint.fill_opacity);
    let stroke_color =
        resolve_color(graph, paint.stroke_color.as_ref(), shape_bounds, config, referrers, warnings, paint.stroke_opacity);
    Paint {
        fill_color,
        stroke_color,
        stroke_width: paint.stroke_width,
        stroke_miter_limit: paint.stroke_miter_limit,
        stroke_join: paint.stroke_join.unwrap_or(StrokeJoin::Miter),
        stroke_cap: paint.stroke_cap.unwrap_or(StrokeCap::Butt),
        fill_type: paint.fill_type.unwrap_or(FillType::NonZero),
        stroke_dash_array: paint.stroke_dash_array.clone(),
        stroke_dash_offset: paint.stroke_dash_offset,
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_color(
    graph: &SceneGraph,
    color: Option<&SceneColor>,
    shape_bounds: Bounds,
    config: &ResolverConfig,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
    opacity: Option<f64>,
) -> SiColor {
    match color {
        None | Some(SceneColor::None) => SiColor::None,
        Some(SceneColor::CurrentColor) => SiColor::CurrentColor,
        Some(SceneColor::Explicit(argb)) => SiColor::Explicit(apply_opacity(*argb, opacity)),
        Some(SceneColor::GradientRef(id)) => {
            resolve_gradient_ref(graph, *id, shape_bounds, config, referrers, warnings).unwrap_or(SiColor::None)
        }
    }
}

fn apply_opacity(argb: Argb, opacity: Option<f64>) -> Argb {
    let Some(op) = opacity else { return argb };
    let op = op.clamp(0.0, 1.0);
    let v = argb.0;
    let a = (v >> 24) & 0xff;
    let r = (v >> 16) & 0xff;
    let g = (v >> 8) & 0xff;
    let b = v & 0xff;
    let new_a = ((a as f64) * op).round().clamp(0.0, 255.0) as u32;
    Argb((new_a << 24) | (r << 16) | (g << 8) | b)
}

fn resolve_gradient_ref(
    graph: &SceneGraph,
    id: NodeId,
    shape_bounds: Bounds,
    config: &ResolverConfig,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
) -> Option<SiColor> {
    let Some(idx) = graph.lookup(id) else {
        warnings.push(ResolveWarning::DanglingReference { from: id, target: id });
        return None;
    };
    if referrers.contains(id) {
        warnings.push(ResolveWarning::ReferenceCycle { from: id, target: id });
        return None;
    }
    let _guard = referrers.enter(id);
    let NodeKind::Gradient(start) = &graph.graph[idx].kind else {
        return None;
    };

    let merged = resolve_gradient_chain(graph, start, referrers, warnings);
    let kind = merged.kind.unwrap_or(GradientKind::Linear);
    let object_bounding_box = merged.object_bounding_box.unwrap_or(true);
    let spread = merged.spread.unwrap_or(SpreadMethod::Pad);

    let (vw, vh) = config.default_viewport;
    let (bx, by, bw, bh) = if shape_bounds.is_empty() { (0.0, 0.0, vw, vh) } else { shape_bounds.as_xywh() };

    let geometry = match kind {
        GradientKind::Linear => GradientGeometry::Linear {
            x1: merged.x1.unwrap_or(bx),
            y1: merged.y1.unwrap_or(by),
            x2: merged.x2.unwrap_or(bx + bw),
            y2: merged.y2.unwrap_or(by),
        },
        GradientKind::Radial => GradientGeometry::Radial {
            cx: merged.cx.unwrap_or(bx + bw / 2.0),
            cy: merged.cy.unwrap_or(by + bh / 2.0),
            r: merged.r.unwrap_or(bw.max(bh) / 2.0),
        },
        GradientKind::Sweep => GradientGeometry::Sweep {
            cx: merged.cx.unwrap_or(bx + bw / 2.0),
            cy: merged.cy.unwrap_or(by + bh / 2.0),
            start_angle: merged.start_angle.unwrap_or(0.0),
            end_angle: merged.end_angle.unwrap_or(360.0),
        },
    };

    let stops = merged
        .stops
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| match s.color {
            SceneColor::GradientRef(_) => {
                warnings.push(ResolveWarning::GradientStopIsGradient { gradient: id });
                None
            }
            other => Some(si_core::GradientStop { offset: s.offset, color: scene_color_to_si(&other) }),
        })
        .collect();

    Some(SiColor::Gradient(Box::new(Gradient {
        object_bounding_box,
        spread,
        transform: merged.transform.map(TransformRef::Inline),
        stops,
        geometry,
    })))
}

/// Walk a gradient's `parent` chain, merging inherited fields with
/// `orInherit` semantics, with cycle detection shared with the rest of the
/// resolver.
fn resolve_gradient_chain(
    graph: &SceneGraph,
    start: &GradientNode,
    referrers: &mut Referrers,
    warnings: &mut WarningSink,
) -> GradientNode {
    let mut merged = start.clone();
    let mut next = start.parent;
    let mut guards: Vec<ReferrersGuard<'_>> = Vec::new();

    while let Some(pid) = next {
        if referrers.contains(pid) {
            warnings.push(ResolveWarning::ReferenceCycle { from: pid, target: pid });
            break;
        }
        let Some(pidx) = graph.lookup(pid) else {
            warnings.push(ResolveWarning::DanglingReference { from: pid, target: pid });
            break;
        };
        guards.push(referrers.enter(pid));
        let NodeKind::Gradient(parent_node) = &graph.graph[pidx].kind else {
            break;
        };
        merged = merged.inherit_from(parent_node);
        next = parent_node.parent;
    }
    merged
}

fn scene_color_to_si(c: &SceneColor) -> SiColor {
    match c {
        SceneColor::Explicit(argb) => SiColor::Explicit(*argb),
        SceneColor::None => SiColor::None,
        SceneColor::CurrentColor => SiColor::CurrentColor,
        SceneColor::GradientRef(_) => SiColor::None,
    }
}
