//! Property-style sweeps over the codec's core round-trip invariants,
//! beyond the handful of fixed values each module's own unit tests already
//! pin down. These deliberately range over representative values rather
//! than fuzzing — the crate has no fuzzing harness dependency, so a
//! representative sweep is the idiomatic middle ground here.

use si_core::path::{encoded_byte_len, RecordingSink};
use si_core::{feed_path, parse_path, read_color, write_color, Argb, ByteReader, ByteWriter, FloatReader, FloatWriter, PathCmd, SiColor};

/// `decode(encode(x)) == x` for all `x`, smallest encoding chosen.
#[test]
fn smallish_int_round_trips_across_the_whole_domain() {
    let samples: Vec<u32> = (0..2000)
        .chain([0xfd, 0xfe, 0xff, 0x1_00, 0xff_ff, 0x1_00_00, 0xffff_ffff, u32::MAX / 2])
        .collect();

    for v in samples {
        let mut w = ByteWriter::new();
        w.write_smallish_int(v);
        let bytes = w.into_bytes();

        let expected_len = if v <= 0xfd {
            1
        } else if v <= u32::from(u16::MAX) {
            3
        } else {
            5
        };
        assert_eq!(bytes.len(), expected_len, "wrong encoding length for {v}");

        let mut r = ByteReader::new(&bytes);
        assert_eq!(r.read_smallish_int().unwrap(), v, "round-trip failed for {v}");
        assert!(r.is_eof());
    }
}

/// Path round-trip and exact byte-length formula, swept over path shapes
/// of varying nybble parity (some end on a whole byte, some on a half
/// byte before the trailing `End`).
#[test]
fn path_round_trip_and_byte_length_across_shapes() {
    let shapes: Vec<Vec<PathCmd>> = vec![
        vec![],
        vec![PathCmd::MoveTo(1.0, 2.0)],
        vec![PathCmd::MoveTo(0.0, 0.0), PathCmd::LineTo(1.0, 1.0)],
        vec![PathCmd::MoveTo(0.0, 0.0), PathCmd::LineTo(1.0, 1.0), PathCmd::Close],
        vec![
            PathCmd::MoveTo(0.0, 0.0),
            PathCmd::CubicTo(1.0, 1.0, 2.0, 2.0, 3.0, 3.0),
            PathCmd::QuadToShorthand(4.0, 4.0),
            PathCmd::ArcToPointCircle { radius: 5.0, end_x: 1.0, end_y: 1.0, large: true, cw: false },
            PathCmd::ArcToPointEllipse { rx: 2.0, ry: 3.0, end_x: 0.0, end_y: 0.0, large: true, cw: true },
            PathCmd::Close,
        ],
    ];

    for cmds in shapes {
        let mut args_w = FloatWriter::new();
        let mut writer = si_core::PathWriter::new(&mut args_w);
        feed_path(&cmds, &mut writer);
        let bytes = writer.into_bytes();

        assert_eq!(bytes.len(), encoded_byte_len(&cmds), "byte-length formula mismatch for {cmds:?}");

        let floats = args_w.into_vec();
        let mut br = ByteReader::new(&bytes);
        let mut fr = FloatReader::new(&floats);
        let mut sink = RecordingSink::default();
        parse_path(&mut br, &mut fr, &mut sink).unwrap();

        assert_eq!(sink.cmds, cmds);
        assert!(br.is_eof());
        assert!(fr.is_eof());
    }
}

/// Any non-gradient-stop color round-trips exactly.
#[test]
fn color_round_trip_across_all_non_gradient_variants() {
    let colors = [
        SiColor::Explicit(Argb(0x0000_0000)),
        SiColor::Explicit(Argb(0xffff_ffff)),
        SiColor::Explicit(Argb::from_channels(128, 10, 20, 30)),
        SiColor::None,
        SiColor::CurrentColor,
    ];

    for color in colors {
        let mut bytes = ByteWriter::new();
        let mut args = FloatWriter::new();
        let mut transforms = FloatWriter::new();
        let bits = write_color(&color, &mut bytes, &mut args, &mut transforms, true).unwrap();

        let byte_vec = bytes.into_bytes();
        let arg_vec = args.into_vec();
        let transform_vec = transforms.into_vec();
        let mut br = ByteReader::new(&byte_vec);
        let mut fr = FloatReader::new(&arg_vec);
        let mut tr = FloatReader::new(&transform_vec);
        let decoded = read_color(bits, &mut br, &mut fr, &mut tr, true).unwrap();
        assert_eq!(decoded, color);
    }
}
