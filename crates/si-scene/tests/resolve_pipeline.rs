//! End-to-end tests for the resolver, each driving the full
//! `FixtureDoc::from_json` -> `resolve` -> `si_core::traverse` path. Unlike
//! `resolve.rs`'s own helpers (all private), these exercise the pipeline
//! only through its public seams, the same way a real caller would.

use si_core::{traverse, GroupInfo, PathData, TextSpanInfo, Visitor};
use si_scene::{resolve, FixtureDoc, ResolveWarning, ResolverConfig};

#[derive(Default)]
struct RecordingVisitor {
    events: Vec<String>,
}

impl Visitor for RecordingVisitor {
    fn group(&mut self, info: &GroupInfo) {
        self.events.push(format!("group(transform={:?},blend={:?})", info.transform, info.blend_mode));
    }
    fn end_group(&mut self) {
        self.events.push("end_group".into());
    }
    fn path(&mut self, _path: &dyn PathData, paint: &si_core::Paint) {
        self.events.push(format!("path(fill={:?})", paint.fill_color));
    }
    fn masked(&mut self, info: &si_core::MaskedInfo) {
        self.events.push(format!("masked(uses_luma={})", info.uses_luma));
    }
    fn masked_child(&mut self) {
        self.events.push("masked_child".into());
    }
    fn end_masked(&mut self) {
        self.events.push("end_masked".into());
    }
    fn text(&mut self, _paint: &si_core::Paint, font_family: Option<&str>) {
        self.events.push(format!("text(font_family={font_family:?})"));
    }
    fn text_span(&mut self, span: &TextSpanInfo) {
        self.events.push(format!("span({:?})", span.content));
    }
}

fn names(v: &RecordingVisitor) -> Vec<&str> {
    v.events.iter().map(String::as_str).collect()
}

fn resolve_collecting(graph: si_scene::SceneGraph) -> (si_core::CompactImage, Vec<ResolveWarning>) {
    let mut warnings = Vec::new();
    let image = resolve(graph, &ResolverConfig::default(), &mut |w| warnings.push(w)).unwrap();
    (image, warnings)
}

#[test]
fn simple_rect_resolves_to_one_path() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                 "paint": {"fill_color": {"type": "explicit", "argb": 4278190335}}}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());
    assert_eq!(image.num_paths, 1);

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    assert_eq!(names(&visitor), vec!["path(fill=Explicit(Argb(4278190335)))"]);
}

#[test]
fn nested_group_promotes_transform_and_blend() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "group", "transform": [1,0,0,1,50,0],
                 "children": [
                    {"type": "rect", "x": 0, "y": 0, "width": 1, "height": 1,
                     "group_alpha": 0.5}
                 ]}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    let events = names(&visitor);
    assert!(events.iter().any(|e| e.starts_with("group(transform=Some([1.0, 0.0, 0.0, 1.0, 50.0, 0.0])")));
    assert!(events.contains(&"path(fill=None)"));
    assert_eq!(*events.last().unwrap(), "end_group");
}

#[test]
fn stylesheet_cascade_fills_unset_paint_fields() {
    let graph = FixtureDoc::from_json(
        r#"{
            "stylesheet": [
                {"tag": "rect", "paint": {"fill_color": {"type": "explicit", "argb": 4278255360}}}
            ],
            "children": [
                {"type": "rect", "x": 0, "y": 0, "width": 5, "height": 5}
            ]
        }"#,
    )
    .unwrap();

    let (image, _warnings) = resolve_collecting(graph);
    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    assert_eq!(names(&visitor), vec!["path(fill=Explicit(Argb(4278255360)))"]);
}

#[test]
fn use_reference_resolves_to_target_content() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "defs", "children": [
                    {"id": "rectDef", "type": "rect", "x": 0, "y": 0, "width": 3, "height": 3}
                ]},
                {"type": "use", "target": "rectDef"}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());
    assert_eq!(image.num_paths, 1);
}

#[test]
fn dangling_use_reference_is_reported_and_dropped() {
    let graph = FixtureDoc::from_json(
        r#"{"children": [{"type": "use", "target": "nowhere"}]}"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(image.children.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], ResolveWarning::DanglingReference { target, .. } if target.as_str() == "nowhere"));
}

#[test]
fn self_referential_use_terminates_as_a_cycle_warning() {
    let graph = FixtureDoc::from_json(
        r#"{"children": [{"id": "loopy", "type": "use", "target": "loopy"}]}"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(image.children.is_empty());
    assert_eq!(warnings.len(), 1);
    assert!(matches!(&warnings[0], ResolveWarning::ReferenceCycle { .. }));
}

#[test]
fn gradient_parent_chain_inherits_stops_and_geometry() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "defs", "children": [
                    {"id": "base", "type": "gradient", "kind": "linear",
                     "x1": 0, "y1": 0, "x2": 10, "y2": 0,
                     "stops": [
                        {"offset": 0.0, "color": {"type": "explicit", "argb": 4278190080}},
                        {"offset": 1.0, "color": {"type": "explicit", "argb": 4278190335}}
                     ]},
                    {"id": "derived", "type": "gradient", "kind": "linear", "parent": "base"}
                ]},
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                 "paint": {"fill_color": {"type": "gradientRef", "target": "derived"}}}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());
    assert_eq!(image.num_paths, 1);

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    assert!(matches!(&visitor.events[0], e if e.starts_with("path(fill=Gradient")));
}

#[test]
fn gradient_self_referential_parent_chain_breaks_the_cycle() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "defs", "children": [
                    {"id": "g1", "type": "gradient", "kind": "linear", "parent": "g1",
                     "stops": [{"offset": 0.0, "color": {"type": "explicit", "argb": 4278190080}}]}
                ]},
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                 "paint": {"fill_color": {"type": "gradientRef", "target": "g1"}}}
            ]
        }"#,
    )
    .unwrap();

    // The resolver must terminate rather than loop forever on the
    // self-referential parent chain, with the warning surfaced.
    let (image, warnings) = resolve_collecting(graph);
    assert_eq!(image.num_paths, 1);
    assert!(warnings.iter().any(|w| matches!(w, ResolveWarning::ReferenceCycle { .. })));
}

#[test]
fn mask_materializes_as_a_masked_node_wrapping_its_target() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "defs", "children": [
                    {"id": "m1", "type": "mask", "children": [
                        {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                         "paint": {"fill_color": {"type": "explicit", "argb": 4294967295}}}
                    ]}
                ]},
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "mask": "m1",
                 "paint": {"fill_color": {"type": "explicit", "argb": 4278190335}}}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    let events = names(&visitor);
    assert!(events[0].starts_with("masked"));
    assert!(events.contains(&"masked_child"));
    assert_eq!(*events.last().unwrap(), "end_masked");
}

#[test]
fn mask_referencing_non_mask_node_is_ignored() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"id": "notAMask", "type": "rect", "x": 0, "y": 0, "width": 1, "height": 1},
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "mask": "notAMask",
                 "paint": {"fill_color": {"type": "explicit", "argb": 4278190335}}}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    // Both rects resolve and draw as plain paths (the would-be mask source
    // is itself just a sibling rect once the mask reference is ignored),
    // neither wrapped in a `masked` event.
    assert!(!visitor.events.iter().any(|e| e.starts_with("masked")));
    assert_eq!(image.num_paths, 2);
}

#[test]
fn empty_mask_content_drops_the_mask_and_warns() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"id": "empty", "type": "mask", "children": []},
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "mask": "empty",
                 "paint": {"fill_color": {"type": "explicit", "argb": 4278190335}}}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.iter().any(|w| matches!(w, ResolveWarning::EmptyMask { .. })));

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    assert!(!visitor.events.iter().any(|e| e.starts_with("masked")));
    assert_eq!(image.num_paths, 1);
}

#[test]
fn hidden_node_is_pruned_entirely() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10, "display": false}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());
    assert!(image.children.is_empty());
}

#[test]
fn singular_transform_prunes_the_node() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "rect", "x": 0, "y": 0, "width": 10, "height": 10,
                 "transform": [0, 0, 0, 0, 0, 0]}
            ]
        }"#,
    )
    .unwrap();

    let (image, _warnings) = resolve_collecting(graph);
    assert!(image.children.is_empty());
}

#[test]
fn text_node_resolves_spans_with_font_and_paint_overrides() {
    let graph = FixtureDoc::from_json(
        r#"{
            "children": [
                {"type": "text", "text_attrs": {"font_size": 12.0}, "spans": [
                    {"content": "hello", "font_family": "Inter"},
                    {"content": "world"}
                ]}
            ]
        }"#,
    )
    .unwrap();

    let (image, warnings) = resolve_collecting(graph);
    assert!(warnings.is_empty());

    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    let events = names(&visitor);
    assert_eq!(events, vec!["text(font_family=None)", "span(\"hello\")", "span(\"world\")"]);
}

#[test]
fn plain_rect_with_no_promoted_attributes_has_no_wrapping_group() {
    let graph = FixtureDoc::from_json(
        r#"{"children": [{"type": "rect", "x": 0, "y": 0, "width": 1, "height": 1}]}"#,
    )
    .unwrap();

    let (image, _warnings) = resolve_collecting(graph);
    let mut visitor = RecordingVisitor::default();
    traverse(&image, &mut visitor).unwrap();
    assert_eq!(names(&visitor), vec!["path(fill=None)"], "no group wrapper when nothing needs promoting");
}

#[test]
fn no_op_sink_is_accepted_in_place_of_a_collecting_closure() {
    let graph = FixtureDoc::from_json(
        r#"{"children": [{"type": "use", "target": "nowhere"}]}"#,
    )
    .unwrap();

    let image = resolve(graph, &ResolverConfig::default(), &mut |_| {}).unwrap();
    assert!(image.children.is_empty());
}
