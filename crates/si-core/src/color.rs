//! Color & paint codec.
//!
//! Encodes solid/none/current-color/gradient colors, the paint record
//! that wraps fill+stroke, and the three gradient kinds (linear, radial,
//! sweep) with their stop lists, spread method, and optional transform.
//!
//! A gradient's transform, when present, is written either inline (its 6
//! floats appended to the shared `transforms` array) or as a back-reference
//! number into that same array, mirroring how a group's transform is
//! encoded. `si-scene`'s resolver doesn't currently dedup gradient
//! transforms against each other before constructing a `Gradient`, so in
//! practice every gradient reference writes its own inline transform — the
//! back-reference form exists in the wire format for a producer that does.

use crate::error::{SiError, SiResult};
use crate::io::{ByteReader, ByteWriter, FloatReader, FloatWriter};

/// Packed 32-bit ARGB color (8 bits per channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Argb(pub u32);

impl Argb {
    #[must_use]
    pub fn from_channels(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((u32::from(a) << 24) | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    #[must_use]
    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// Gradient spread (tile) method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpreadMethod {
    Pad,
    Reflect,
    Repeat,
}

impl SpreadMethod {
    fn from_bits(bits: u8) -> SiResult<Self> {
        Ok(match bits {
            0 => SpreadMethod::Pad,
            1 => SpreadMethod::Reflect,
            2 => SpreadMethod::Repeat,
            _ => return Err(SiError::Malformed),
        })
    }

    fn to_bits(self) -> u8 {
        match self {
            SpreadMethod::Pad => 0,
            SpreadMethod::Reflect => 1,
            SpreadMethod::Repeat => 2,
        }
    }
}

/// Gradient geometry, keyed by gradient type.
#[derive(Debug, Clone, PartialEq)]
pub enum GradientGeometry {
    Linear { x1: f64, y1: f64, x2: f64, y2: f64 },
    Radial { cx: f64, cy: f64, r: f64 },
    Sweep { cx: f64, cy: f64, start_angle: f64, end_angle: f64 },
}

impl GradientGeometry {
    fn type_bits(&self) -> u8 {
        match self {
            GradientGeometry::Linear { .. } => 0,
            GradientGeometry::Radial { .. } => 1,
            GradientGeometry::Sweep { .. } => 2,
        }
    }

    fn write_floats(&self, args: &mut FloatWriter) {
        match *self {
            GradientGeometry::Linear { x1, y1, x2, y2 } => {
                for v in [x1, y1, x2, y2] {
                    args.write(v);
                }
            }
            GradientGeometry::Radial { cx, cy, r } => {
                for v in [cx, cy, r] {
                    args.write(v);
                }
            }
            GradientGeometry::Sweep { cx, cy, start_angle, end_angle } => {
                for v in [cx, cy, start_angle, end_angle] {
                    args.write(v);
                }
            }
        }
    }

    fn read_floats(type_bits: u8, args: &mut FloatReader<'_>) -> SiResult<Self> {
        Ok(match type_bits {
            0 => {
                let v = args.read_n(4)?;
                GradientGeometry::Linear { x1: v[0], y1: v[1], x2: v[2], y2: v[3] }
            }
            1 => {
                let v = args.read_n(3)?;
                GradientGeometry::Radial { cx: v[0], cy: v[1], r: v[2] }
            }
            2 => {
                let v = args.read_n(4)?;
                GradientGeometry::Sweep { cx: v[0], cy: v[1], start_angle: v[2], end_angle: v[3] }
            }
            _ => return Err(SiError::Malformed),
        })
    }
}

/// One gradient stop. `color` must not itself be `SiColor::Gradient` —
/// enforced by `write_color`/`read_color`'s `allow_gradient = false` path,
/// which rejects it as `BadGradientStopColor`.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientStop {
    pub offset: f64,
    pub color: SiColor,
}

/// A gradient paint: type, stops, spread, geometry, and an optional
/// transform (either inline or a back-reference).
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub object_bounding_box: bool,
    pub spread: SpreadMethod,
    pub transform: Option<TransformRef>,
    pub stops: Vec<GradientStop>,
    pub geometry: GradientGeometry,
}

/// Either an inline affine or a back-reference to a previously written
/// one, the same "transform number" scheme a group's transform uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformRef {
    Inline([f64; 6]),
    Number(u32),
}

/// A resolved color value, tagged on the wire by a 2-bit color type.
#[derive(Debug, Clone, PartialEq)]
pub enum SiColor {
    Explicit(Argb),
    None,
    CurrentColor,
    Gradient(Box<Gradient>),
}

/// The 2-bit color type tag `write_color`/`read_color` use, exposed so
/// callers that must emit an opcode's flag bits before the color body
/// itself (every opcode in §3) can compute it without writing anything.
#[must_use]
pub fn color_type_bits(color: &SiColor) -> u8 {
    color.type_bits()
}

impl SiColor {
    fn type_bits(&self) -> u8 {
        match self {
            SiColor::Explicit(_) => 0,
            SiColor::None => 1,
            SiColor::CurrentColor => 2,
            SiColor::Gradient(_) => 3,
        }
    }
}

/// Write a color. `allow_gradient = false` is used for gradient stops,
/// where a nested gradient is a hard error. `transforms` is the
/// document-wide transform-number array, consulted only if this color
/// turns out to be a gradient carrying an inline transform.
pub fn write_color(
    color: &SiColor,
    bytes: &mut ByteWriter,
    args: &mut FloatWriter,
    transforms: &mut FloatWriter,
    allow_gradient: bool,
) -> SiResult<u8> {
    let bits = color.type_bits();
    if !allow_gradient && bits == 3 {
        return Err(SiError::BadGradientStopColor);
    }
    match color {
        SiColor::Explicit(argb) => bytes.write_u32(argb.0),
        SiColor::None | SiColor::CurrentColor => {}
        SiColor::Gradient(g) => write_gradient(g, bytes, args, transforms)?,
    }
    Ok(bits)
}

/// Read a color whose type bits were already extracted from an opcode's
/// flag bits (fill/stroke color type).
pub fn read_color(
    type_bits: u8,
    bytes: &mut ByteReader<'_>,
    args: &mut FloatReader<'_>,
    transforms: &mut FloatReader<'_>,
    allow_gradient: bool,
) -> SiResult<SiColor> {
    match type_bits {
        0 => Ok(SiColor::Explicit(Argb(bytes.read_u32()?))),
        1 => Ok(SiColor::None),
        2 => Ok(SiColor::CurrentColor),
        3 => {
            if !allow_gradient {
                return Err(SiError::BadGradientStopColor);
            }
            Ok(SiColor::Gradient(Box::new(read_gradient(bytes, args, transforms)?)))
        }
        _ => Err(SiError::Malformed),
    }
}

fn write_gradient(
    g: &Gradient,
    bytes: &mut ByteWriter,
    args: &mut FloatWriter,
    transforms: &mut FloatWriter,
) -> SiResult<()> {
    let has_transform = g.transform.is_some();
    let has_transform_number = matches!(g.transform, Some(TransformRef::Number(_)));
    let header = g.geometry.type_bits()
        | (u8::from(g.object_bounding_box) << 2)
        | (g.spread.to_bits() << 3)
        | (u8::from(has_transform) << 5)
        | (u8::from(has_transform_number) << 6);
    bytes.write_u8(header);

    if let Some(t) = g.transform {
        match t {
            TransformRef::Number(n) => bytes.write_smallish_int(n),
            TransformRef::Inline(affine) => transforms.write_affine(affine),
        }
    }

    bytes.write_smallish_int(g.stops.len() as u32);
    for stop in &g.stops {
        args.write(stop.offset);
    }
    for stop in &g.stops {
        let type_bits = write_color(&stop.color, bytes, args, transforms, false)?;
        bytes.write_u8(type_bits);
    }

    g.geometry.write_floats(args);
    Ok(())
}

fn read_gradient(
    bytes: &mut ByteReader<'_>,
    args: &mut FloatReader<'_>,
    transforms: &mut FloatReader<'_>,
) -> SiResult<Gradient> {
    let header = bytes.read_u8()?;
    let type_bits = header & 0b11;
    let object_bounding_box = (header >> 2) & 1 != 0;
    let spread = SpreadMethod::from_bits((header >> 3) & 0b11)?;
    let has_transform = (header >> 5) & 1 != 0;
    let has_transform_number = (header >> 6) & 1 != 0;

    let transform = if has_transform {
        Some(if has_transform_number {
            TransformRef::Number(bytes.read_smallish_int()?)
        } else {
            let v = transforms.read_n(6)?;
            TransformRef::Inline([v[0], v[1], v[2], v[3], v[4], v[5]])
        })
    } else {
        None
    };

    let stop_count = bytes.read_smallish_int()? as usize;
    let offsets = args.read_n(stop_count)?.to_vec();
    let mut stops = Vec::with_capacity(stop_count);
    for offset in offsets {
        let stop_type = bytes.read_u8()?;
        let color = read_color(stop_type, bytes, args, transforms, false)?;
        stops.push(GradientStop { offset, color });
    }

    let geometry = GradientGeometry::read_floats(type_bits, args)?;

    Ok(Gradient { object_bounding_box, spread, transform, stops, geometry })
}

// ─── Paint ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrokeJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrokeCap {
    Butt,
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillType {
    NonZero,
    EvenOdd,
}

/// Fill/stroke paint record. Absent `stroke_width`/`stroke_miter_limit`
/// mean "inherit the renderer's default" rather than a concrete value —
/// see `effective_stroke_width`/`effective_stroke_miter_limit` for the
/// defaults a consumer that needs a concrete number should fall back to.
#[derive(Debug, Clone, PartialEq)]
pub struct Paint {
    pub fill_color: SiColor,
    pub stroke_color: SiColor,
    pub stroke_width: Option<f64>,
    pub stroke_miter_limit: Option<f64>,
    pub stroke_join: StrokeJoin,
    pub stroke_cap: StrokeCap,
    pub fill_type: FillType,
    pub stroke_dash_array: Option<Vec<f64>>,
    pub stroke_dash_offset: Option<f64>,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            fill_color: SiColor::None,
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
}

impl Paint {
    /// Default stroke width (1.0) for consumers that need a concrete
    /// value rather than "absent means inherit".
    #[must_use]
    pub fn effective_stroke_width(&self) -> f64 {
        self.stroke_width.unwrap_or(1.0)
    }

    #[must_use]
    pub fn effective_stroke_miter_limit(&self) -> f64 {
        self.stroke_miter_limit.unwrap_or(4.0)
    }
}

const HEADER_HAS_WIDTH: u8 = 1 << 0;
const HEADER_HAS_MITER: u8 = 1 << 1;
const HEADER_JOIN_SHIFT: u8 = 2;
const HEADER_CAP_SHIFT: u8 = 4;
const HEADER_FILL_TYPE: u8 = 1 << 6;
const HEADER_HAS_DASH: u8 = 1 << 7;
const HEADER2_HAS_DASH_OFFSET: u8 = 1 << 0;

fn join_bits(j: StrokeJoin) -> u8 {
    match j {
        StrokeJoin::Miter => 0,
        StrokeJoin::Round => 1,
        StrokeJoin::Bevel => 2,
    }
}

fn join_from_bits(b: u8) -> SiResult<StrokeJoin> {
    Ok(match b {
        0 => StrokeJoin::Miter,
        1 => StrokeJoin::Round,
        2 => StrokeJoin::Bevel,
        _ => return Err(SiError::Malformed),
    })
}

fn cap_bits(c: StrokeCap) -> u8 {
    match c {
        StrokeCap::Butt => 0,
        StrokeCap::Round => 1,
        StrokeCap::Square => 2,
    }
}

fn cap_from_bits(b: u8) -> SiResult<StrokeCap> {
    Ok(match b {
        0 => StrokeCap::Butt,
        1 => StrokeCap::Round,
        2 => StrokeCap::Square,
        _ => return Err(SiError::Malformed),
    })
}

/// Write a paint's body (the caller has already written/flagged fill and
/// stroke color types on the owning opcode — see `builder.rs`). Returns
/// the two color type-bit pairs so the opcode flags can be set.
pub fn write_paint(
    paint: &Paint,
    bytes: &mut ByteWriter,
    args: &mut FloatWriter,
    transforms: &mut FloatWriter,
) -> SiResult<(u8, u8)> {
    let has_dash = paint.stroke_dash_array.is_some();
    let header = (u8::from(paint.stroke_width.is_some()) * HEADER_HAS_WIDTH)
        | (u8::from(paint.stroke_miter_limit.is_some()) * HEADER_HAS_MITER)
        | (join_bits(paint.stroke_join) << HEADER_JOIN_SHIFT)
        | (cap_bits(paint.stroke_cap) << HEADER_CAP_SHIFT)
        | (u8::from(matches!(paint.fill_type, FillType::EvenOdd)) * HEADER_FILL_TYPE)
        | (u8::from(has_dash) * HEADER_HAS_DASH);
    bytes.write_u8(header);

    if has_dash {
        let header2 = u8::from(paint.stroke_dash_offset.is_some()) * HEADER2_HAS_DASH_OFFSET;
        bytes.write_u8(header2);
    }

    let fill_bits = write_color(&paint.fill_color, bytes, args, transforms, true)?;
    let stroke_bits = write_color(&paint.stroke_color, bytes, args, transforms, true)?;

    if let Some(w) = paint.stroke_width {
        args.write(w);
    }
    if let Some(m) = paint.stroke_miter_limit {
        args.write(m);
    }
    if let Some(dashes) = &paint.stroke_dash_array {
        bytes.write_smallish_int(dashes.len() as u32);
        for d in dashes {
            args.write(*d);
        }
    }
    if let Some(offset) = paint.stroke_dash_offset {
        args.write(offset);
    }

    Ok((fill_bits, stroke_bits))
}

/// Read a paint's body given the fill/stroke color-type bits already
/// pulled from the owning opcode's flag bits.
pub fn read_paint(
    fill_type_bits: u8,
    stroke_type_bits: u8,
    bytes: &mut ByteReader<'_>,
    args: &mut FloatReader<'_>,
    transforms: &mut FloatReader<'_>,
) -> SiResult<Paint> {
    let header = bytes.read_u8()?;
    let has_width = header & HEADER_HAS_WIDTH != 0;
    let has_miter = header & HEADER_HAS_MITER != 0;
    let join = join_from_bits((header >> HEADER_JOIN_SHIFT) & 0b11)?;
    let cap = cap_from_bits((header >> HEADER_CAP_SHIFT) & 0b11)?;
    let fill_type = if header & HEADER_FILL_TYPE != 0 { FillType::EvenOdd } else { FillType::NonZero };
    let has_dash = header & HEADER_HAS_DASH != 0;

    let has_dash_offset = if has_dash {
        let header2 = bytes.read_u8()?;
        header2 & HEADER2_HAS_DASH_OFFSET != 0
    } else {
        false
    };

    let fill_color = read_color(fill_type_bits, bytes, args, transforms, true)?;
    let stroke_color = read_color(stroke_type_bits, bytes, args, transforms, true)?;

    let stroke_width = if has_width { Some(args.read()?) } else { None };
    let stroke_miter_limit = if has_miter { Some(args.read()?) } else { None };
    let stroke_dash_array = if has_dash {
        let n = bytes.read_smallish_int()? as usize;
        Some(args.read_n(n)?.to_vec())
    } else {
        None
    };
    let stroke_dash_offset = if has_dash_offset { Some(args.read()?) } else { None };

    Ok(Paint {
        fill_color,
        stroke_color,
        stroke_width,
        stroke_miter_limit,
        stroke_join: join,
        stroke_cap: cap,
        fill_type,
        stroke_dash_array,
        stroke_dash_offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip_color(color: SiColor) {
        let mut bytes = ByteWriter::new();
        let mut args = FloatWriter::new();
        let mut transforms = FloatWriter::new();
        let bits = write_color(&color, &mut bytes, &mut args, &mut transforms, true).unwrap();

        let bytes_vec = bytes.into_bytes();
        let args_vec = args.into_vec();
        let transforms_vec = transforms.into_vec();
        let mut br = ByteReader::new(&bytes_vec);
        let mut fr = FloatReader::new(&args_vec);
        let mut tr = FloatReader::new(&transforms_vec);
        let decoded = read_color(bits, &mut br, &mut fr, &mut tr, true).unwrap();
        assert_eq!(decoded, color);
    }

    #[test]
    fn explicit_color_round_trips() {
        roundtrip_color(SiColor::Explicit(Argb::from_channels(0xff, 0x11, 0x22, 0x33)));
    }

    #[test]
    fn none_and_current_round_trip() {
        roundtrip_color(SiColor::None);
        roundtrip_color(SiColor::CurrentColor);
    }

    #[test]
    fn linear_gradient_header_encodes_object_bounding_box_and_spread() {
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
        let color = SiColor::Gradient(Box::new(gradient.clone()));

        let mut bytes = ByteWriter::new();
        let mut args = FloatWriter::new();
        let mut transforms = FloatWriter::new();
        write_color(&color, &mut bytes, &mut args, &mut transforms, true).unwrap();
        let byte_vec = bytes.into_bytes();
        // header byte: type=0 (linear), oBB bit set -> 0b00000100
        assert_eq!(byte_vec[0], 0b0000_0100);

        roundtrip_color(color);
    }

    #[test]
    fn gradient_with_inline_transform_round_trips() {
        let gradient = Gradient {
            object_bounding_box: false,
            spread: SpreadMethod::Reflect,
            transform: Some(TransformRef::Inline([1.0, 0.0, 0.0, 1.0, 5.0, 5.0])),
            stops: vec![GradientStop { offset: 0.0, color: SiColor::None }],
            geometry: GradientGeometry::Radial { cx: 0.5, cy: 0.5, r: 0.5 },
        };
        roundtrip_color(SiColor::Gradient(Box::new(gradient)));
    }

    #[test]
    fn gradient_stop_cannot_be_gradient() {
        let nested = SiColor::Gradient(Box::new(Gradient {
            object_bounding_box: true,
            spread: SpreadMethod::Pad,
            transform: None,
            stops: vec![],
            geometry: GradientGeometry::Linear { x1: 0.0, y1: 0.0, x2: 1.0, y2: 0.0 },
        }));
        let mut bytes = ByteWriter::new();
        let mut args = FloatWriter::new();
        let mut transforms = FloatWriter::new();
        let err = write_color(&nested, &mut bytes, &mut args, &mut transforms, false).unwrap_err();
        assert_eq!(err, SiError::BadGradientStopColor);
    }

    #[test]
    fn paint_defaults_round_trip() {
        let paint = Paint::default();
        let mut bytes = ByteWriter::new();
        let mut args = FloatWriter::new();
        let mut transforms = FloatWriter::new();
        let (fill_bits, stroke_bits) = write_paint(&paint, &mut bytes, &mut args, &mut transforms).unwrap();

        let byte_vec = bytes.into_bytes();
        let arg_vec = args.into_vec();
        let transforms_vec = transforms.into_vec();
        let mut br = ByteReader::new(&byte_vec);
        let mut fr = FloatReader::new(&arg_vec);
        let mut tr = FloatReader::new(&transforms_vec);
        let decoded = read_paint(fill_bits, stroke_bits, &mut br, &mut fr, &mut tr).unwrap();
        assert_eq!(decoded, paint);
        assert_eq!(decoded.effective_stroke_width(), 1.0);
        assert_eq!(decoded.effective_stroke_miter_limit(), 4.0);
    }

    #[test]
    fn paint_with_dash_array_round_trips() {
        let mut paint = Paint::default();
        paint.stroke_color = SiColor::Explicit(Argb(0xff12_3456));
        paint.stroke_width = Some(2.5);
        paint.stroke_dash_array = Some(vec![4.0, 2.0, 4.0]);
        paint.stroke_dash_offset = Some(1.0);

        let mut bytes = ByteWriter::new();
        let mut args = FloatWriter::new();
        let mut transforms = FloatWriter::new();
        let (fill_bits, stroke_bits) = write_paint(&paint, &mut bytes, &mut args, &mut transforms).unwrap();

        let byte_vec = bytes.into_bytes();
        let arg_vec = args.into_vec();
        let transforms_vec = transforms.into_vec();
        let mut br = ByteReader::new(&byte_vec);
        let mut fr = FloatReader::new(&arg_vec);
        let mut tr = FloatReader::new(&transforms_vec);
        let decoded = read_paint(fill_bits, stroke_bits, &mut br, &mut fr, &mut tr).unwrap();
        assert_eq!(decoded, paint);
    }
}
