//! End-to-end documents, each driving the full stack: `Builder` ->
//! `write_envelope` -> `read_envelope` -> `traverse`. Unit tests inside
//! each module already cover these at their own layer; these integration
//! tests check the layers agree with each other on the same documents.

use si_core::{
    read_envelope, traverse, write_envelope, Argb, BlendMode, Builder, BuilderConfig, FillType, PathCmd, Paint,
    SiColor, SiError, StrokeCap, StrokeJoin, TintMode, Visitor,
};

fn rect() -> Vec<PathCmd> {
    vec![
        PathCmd::MoveTo(0.0, 0.0),
        PathCmd::LineTo(10.0, 0.0),
        PathCmd::LineTo(10.0, 10.0),
        PathCmd::LineTo(0.0, 10.0),
        PathCmd::Close,
    ]
}

fn red_fill() -> Paint {
    Paint {
        fill_color: SiColor::Explicit(Argb(0xffff_0000)),
        stroke_color: SiColor::None,
        stroke_width: None,
        stroke_miter_limit: None,
        stroke_join: StrokeJoin::Miter,
        stroke_cap: StrokeCap::Butt,
        fill_type: FillType::NonZero,
        stroke_dash_array: None,
        stroke_dash_offset: None,
    }
}

#[derive(Default)]
struct RecordingVisitor {
    events: Vec<String>,
}

impl Visitor for RecordingVisitor {
    fn init(&mut self) {
        self.events.push("init".into());
    }
    fn vector(&mut self, info: &si_core::VectorInfo) {
        self.events.push(format!("vector({:?},{:?})", info.width, info.height));
    }
    fn group(&mut self, _info: &si_core::GroupInfo) {
        self.events.push("group".into());
    }
    fn end_group(&mut self) {
        self.events.push("end_group".into());
    }
    fn path(&mut self, _path: &dyn si_core::PathData, _paint: &Paint) {
        self.events.push("path".into());
    }
    fn end_vector(&mut self) {
        self.events.push("end_vector".into());
    }
}

#[test]
fn empty_document_round_trips_through_envelope_and_traversal() {
    let mut b = Builder::new(BuilderConfig::default());
    b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
    b.vector(Some(100.0), Some(50.0), None, TintMode::default()).unwrap();
    let image = b.end_vector().unwrap();

    assert_eq!(image.num_paths, 0);
    assert_eq!(image.num_paints, 0);
    assert!(image.children.is_empty());
    assert!(image.args.is_empty());
    assert!(image.transforms.is_empty());

    let bytes = write_envelope(&image);
    let decoded = read_envelope(&bytes).unwrap();

    let mut visitor = RecordingVisitor::default();
    traverse(&decoded, &mut visitor).unwrap();
    assert_eq!(
        visitor.events,
        vec!["init".to_string(), "vector(Some(100.0),Some(50.0))".to_string(), "end_vector".to_string()]
    );
}

#[test]
fn one_red_rectangle_round_trips_through_envelope_and_traversal() {
    let mut b = Builder::new(BuilderConfig::default());
    b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
    b.vector(None, None, None, TintMode::default()).unwrap();
    b.path(&rect(), &red_fill()).unwrap();
    let image = b.end_vector().unwrap();

    assert_eq!(image.num_paths, 1);
    assert_eq!(image.num_paints, 1);

    let bytes = write_envelope(&image);
    let decoded = read_envelope(&bytes).unwrap();
    assert_eq!(decoded, image);

    let mut visitor = RecordingVisitor::default();
    traverse(&decoded, &mut visitor).unwrap();
    let names: Vec<&str> = visitor.events.iter().map(String::as_str).collect();
    assert_eq!(names, vec!["init", "vector(None,None)", "path", "end_vector"]);
}

#[test]
fn shared_path_dedups_on_second_emit() {
    let one = {
        let mut b = Builder::new(BuilderConfig::default());
        b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        b.vector(None, None, None, TintMode::default()).unwrap();
        b.path(&rect(), &red_fill()).unwrap();
        b.end_vector().unwrap()
    };
    let two = {
        let mut b = Builder::new(BuilderConfig::default());
        b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        b.vector(None, None, None, TintMode::default()).unwrap();
        let paint = red_fill();
        b.path(&rect(), &paint).unwrap();
        b.path(&rect(), &paint).unwrap();
        b.end_vector().unwrap()
    };

    assert_eq!(two.num_paths, 1, "both rectangles share one path-table slot");
    assert_eq!(two.num_paints, 1, "both paints are structurally equal");
    // Second emit is an opcode byte + two smallish-ints (path#, paint#) = 3 bytes.
    assert_eq!(two.children.len() - one.children.len(), 3);
    assert_eq!(two.args, one.args, "no new path/paint floats are appended on a dedup hit");

    let bytes = write_envelope(&two);
    let decoded = read_envelope(&bytes).unwrap();
    let mut visitor = RecordingVisitor::default();
    traverse(&decoded, &mut visitor).unwrap();
    let path_events = visitor.events.iter().filter(|e| *e == "path").count();
    assert_eq!(path_events, 2);
}

#[test]
fn linear_gradient_fill_round_trips_through_envelope_and_traversal() {
    use si_core::{Gradient, GradientGeometry, GradientStop, SpreadMethod};

    let gradient = Gradient {
        object_bounding_box: true,
        spread: SpreadMethod::Pad,
        transform: None,
        stops: vec![
            GradientStop { offset: 0.0, color: SiColor::Explicit(Argb(0xff00_0000)) },
            GradientStop { offset: 1.0, color: SiColor::Explicit(Argb(0xffff_ffff)) },
        ],
        geometry: GradientGeometry::Linear { x1: 0.0, y1: 0.0, x2: 1.0, y2: 0.0 },
    };
    let paint = Paint { fill_color: SiColor::Gradient(Box::new(gradient)), ..red_fill() };

    let mut b = Builder::new(BuilderConfig::default());
    b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
    b.vector(None, None, None, TintMode::default()).unwrap();
    b.path(&rect(), &paint).unwrap();
    let image = b.end_vector().unwrap();

    let bytes = write_envelope(&image);
    let decoded = read_envelope(&bytes).unwrap();
    assert_eq!(decoded, image);

    let mut visitor = RecordingVisitor::default();
    traverse(&decoded, &mut visitor).unwrap();
    assert!(visitor.events.contains(&"path".to_string()));
}

#[test]
fn nested_groups_stay_balanced_through_envelope_and_traversal() {
    let mut b = Builder::new(BuilderConfig::default());
    b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
    b.vector(None, None, None, TintMode::default()).unwrap();
    b.group(None, None, BlendMode::default()).unwrap();
    b.group(None, None, BlendMode::default()).unwrap();
    b.path(&rect(), &red_fill()).unwrap();
    b.end_group().unwrap();
    b.path(&rect(), &red_fill()).unwrap();
    b.end_group().unwrap();
    let image = b.end_vector().unwrap();

    let bytes = write_envelope(&image);
    let decoded = read_envelope(&bytes).unwrap();

    let mut visitor = RecordingVisitor::default();
    traverse(&decoded, &mut visitor).unwrap();
    let names: Vec<&str> = visitor.events.iter().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["init", "vector(None,None)", "group", "group", "path", "end_group", "path", "end_group", "end_vector"]
    );
}

#[test]
fn version_mismatch_rejected_without_consuming_body() {
    let mut b = Builder::new(BuilderConfig::default());
    b.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
    b.vector(None, None, None, TintMode::default()).unwrap();
    b.path(&rect(), &red_fill()).unwrap();
    let image = b.end_vector().unwrap();

    let mut bytes = write_envelope(&image);
    bytes[5] = 0x00;
    bytes[6] = 0x02; // version = 2, beyond FORMAT_VERSION

    let err = read_envelope(&bytes).unwrap_err();
    assert_eq!(err, SiError::UnsupportedVersion { found: 2, max_supported: si_core::FORMAT_VERSION });
}
