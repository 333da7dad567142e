//! Path command stream: the nybble-packed command codec.
//!
//! Two commands share one byte (high nybble first). There are 17 command
//! indices (0..16); index 0 is `End`, which always terminates a path and
//! is the reason a half-filled trailing byte decodes correctly — a
//! pending high nybble with an implicit zero low nybble *is* `End`.
//!
//! 17 opcode slots cannot fit a full circle×ellipse×large×small×cw×ccw
//! cross product (8 combinations) on top of the other 10 named commands
//! without going to 18. This folds the rarest combination — ellipse/large
//! arcs — into a single opcode that carries its sweep direction as an
//! explicit float argument instead of as a second opcode, keeping the
//! circle/small-arc opcodes (the common case) as dedicated slots.
//!
//! `PathSink` is the trait both directions of the duality implement: the
//! nybble `PathWriter` (this module) packs commands into bytes, the
//! nybble `parse_path` function unpacks bytes back into `PathSink` calls,
//! and `si-scene`'s bounds collector and `si-render`'s debug dumper reuse
//! the exact same trait to consume structured path data.

use crate::error::{SiError, SiResult};
use crate::io::{ByteReader, ByteWriter};

/// One of the 17 path command indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PathOp {
    End = 0,
    MoveTo = 1,
    LineTo = 2,
    CubicTo = 3,
    CubicToShorthand = 4,
    QuadTo = 5,
    QuadToShorthand = 6,
    Close = 7,
    Circle = 8,
    Ellipse = 9,
    ArcCircleSmallCw = 10,
    ArcCircleSmallCcw = 11,
    ArcCircleLargeCw = 12,
    ArcCircleLargeCcw = 13,
    ArcEllipseSmallCw = 14,
    ArcEllipseSmallCcw = 15,
    ArcEllipseLarge = 16,
}

impl PathOp {
    fn from_index(i: u8) -> SiResult<Self> {
        Ok(match i {
            0 => PathOp::End,
            1 => PathOp::MoveTo,
            2 => PathOp::LineTo,
            3 => PathOp::CubicTo,
            4 => PathOp::CubicToShorthand,
            5 => PathOp::QuadTo,
            6 => PathOp::QuadToShorthand,
            7 => PathOp::Close,
            8 => PathOp::Circle,
            9 => PathOp::Ellipse,
            10 => PathOp::ArcCircleSmallCw,
            11 => PathOp::ArcCircleSmallCcw,
            12 => PathOp::ArcCircleLargeCw,
            13 => PathOp::ArcCircleLargeCcw,
            14 => PathOp::ArcEllipseSmallCw,
            15 => PathOp::ArcEllipseSmallCcw,
            16 => PathOp::ArcEllipseLarge,
            _ => return Err(SiError::BadOpcode(i)),
        })
    }

    /// Number of `f64` args this command consumes from the args stream.
    fn arg_count(self) -> usize {
        match self {
            PathOp::End | PathOp::Close => 0,
            PathOp::MoveTo | PathOp::LineTo | PathOp::QuadToShorthand => 2,
            PathOp::QuadTo | PathOp::CubicToShorthand => 4,
            PathOp::CubicTo => 6,
            PathOp::Circle => 3,
            PathOp::Ellipse => 4,
            PathOp::ArcCircleSmallCw
            | PathOp::ArcCircleSmallCcw
            | PathOp::ArcCircleLargeCw
            | PathOp::ArcCircleLargeCcw => 3,
            PathOp::ArcEllipseSmallCw | PathOp::ArcEllipseSmallCcw => 4,
            PathOp::ArcEllipseLarge => 5,
        }
    }
}

/// Structured, in-memory path data: the same representation used for the
/// pre-IR scene graph and for the codec's own round-trip tests. Building
/// this from an SVG path-data *string* is the source parser's job and is
/// out of scope here.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PathCmd {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    CubicToShorthand(f64, f64, f64, f64),
    QuadTo(f64, f64, f64, f64),
    QuadToShorthand(f64, f64),
    Close,
    Circle { left: f64, top: f64, width: f64 },
    Ellipse { left: f64, top: f64, width: f64, height: f64 },
    /// `large`/`cw` select one of the four circle-arc opcodes.
    ArcToPointCircle { radius: f64, end_x: f64, end_y: f64, large: bool, cw: bool },
    /// `large`/`cw` select one of the three ellipse-arc opcodes (the
    /// large+ccw combination shares `ArcEllipseLarge` with `large+cw` and
    /// is distinguished by the `cw` field alone, not by opcode).
    ArcToPointEllipse { rx: f64, ry: f64, end_x: f64, end_y: f64, large: bool, cw: bool },
}

impl PathCmd {
    #[must_use]
    pub fn is_end(&self) -> bool {
        false // `End` is a wire-only terminator; `Vec<PathCmd>` is implicitly terminated.
    }

    fn feed<S: PathSink + ?Sized>(&self, sink: &mut S) {
        match *self {
            PathCmd::MoveTo(x, y) => sink.move_to(x, y),
            PathCmd::LineTo(x, y) => sink.line_to(x, y),
            PathCmd::CubicTo(c1x, c1y, c2x, c2y, x, y) => sink.cubic_to(c1x, c1y, c2x, c2y, x, y),
            PathCmd::CubicToShorthand(c2x, c2y, x, y) => sink.cubic_to_shorthand(c2x, c2y, x, y),
            PathCmd::QuadTo(cx, cy, x, y) => sink.quad_to(cx, cy, x, y),
            PathCmd::QuadToShorthand(x, y) => sink.quad_to_shorthand(x, y),
            PathCmd::Close => sink.close(),
            PathCmd::Circle { left, top, width } => sink.circle(left, top, width),
            PathCmd::Ellipse { left, top, width, height } => sink.ellipse(left, top, width, height),
            PathCmd::ArcToPointCircle { radius, end_x, end_y, large, cw } => {
                sink.arc_circle(radius, end_x, end_y, large, cw);
            }
            PathCmd::ArcToPointEllipse { rx, ry, end_x, end_y, large, cw } => {
                sink.arc_ellipse(rx, ry, end_x, end_y, large, cw);
            }
        }
    }
}

/// Feed a full command sequence (without a trailing `End` — callers of
/// `feed_path` append it) into any `PathSink`.
pub fn feed_path<S: PathSink + ?Sized>(cmds: &[PathCmd], sink: &mut S) {
    for cmd in cmds {
        cmd.feed(sink);
    }
    sink.end();
}

/// Dual destination for path commands: implemented by the nybble writer
/// (byte output), the bounds collector (`si-scene`), and debug dumpers.
pub trait PathSink {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64);
    fn cubic_to_shorthand(&mut self, c2x: f64, c2y: f64, x: f64, y: f64);
    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    fn quad_to_shorthand(&mut self, x: f64, y: f64);
    fn close(&mut self);
    fn circle(&mut self, left: f64, top: f64, width: f64);
    fn ellipse(&mut self, left: f64, top: f64, width: f64, height: f64);
    fn arc_circle(&mut self, radius: f64, end_x: f64, end_y: f64, large: bool, cw: bool);
    fn arc_ellipse(&mut self, rx: f64, ry: f64, end_x: f64, end_y: f64, large: bool, cw: bool);
    /// Terminates the path. The nybble writer flushes any pending
    /// half-byte here; other sinks can treat it as a no-op.
    fn end(&mut self);
}

// ─── Nybble writer ─────────────────────────────────────────────────────────

/// Packs `PathOp` indices two-per-byte into a byte stream, writing operand
/// floats into a separate `ByteWriter`-adjacent args array supplied by the
/// caller (matching the IR's "args array interleaved with opcodes" model —
/// here the path bytes and the float args are two parallel outputs).
pub struct PathWriter<'a> {
    bytes: ByteWriter,
    args: &'a mut crate::io::FloatWriter,
    pending_high: Option<u8>,
}

impl<'a> PathWriter<'a> {
    pub fn new(args: &'a mut crate::io::FloatWriter) -> Self {
        Self { bytes: ByteWriter::new(), args, pending_high: None }
    }

    fn push_nybble(&mut self, nybble: u8) {
        debug_assert!(nybble <= 0xf);
        match self.pending_high.take() {
            None => self.pending_high = Some(nybble),
            Some(high) => self.bytes.write_u8((high << 4) | nybble),
        }
    }

    fn push_op(&mut self, op: PathOp) {
        let index = op as u8;
        if index < 15 {
            self.push_nybble(index);
        } else {
            self.push_nybble(15);
            self.push_nybble(index - 14);
        }
    }

    /// Flush a half-written byte. `End`'s low nybble is implicitly zero,
    /// so flushing with a pending high nybble already encodes `End`.
    fn flush(&mut self) {
        if let Some(high) = self.pending_high.take() {
            self.bytes.write_u8(high << 4);
        }
    }

    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.bytes.into_bytes()
    }
}

impl PathSink for PathWriter<'_> {
    fn move_to(&mut self, x: f64, y: f64) {
        self.push_op(PathOp::MoveTo);
        self.args.write(x);
        self.args.write(y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.push_op(PathOp::LineTo);
        self.args.write(x);
        self.args.write(y);
    }

    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.push_op(PathOp::CubicTo);
        for v in [c1x, c1y, c2x, c2y, x, y] {
            self.args.write(v);
        }
    }

    fn cubic_to_shorthand(&mut self, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.push_op(PathOp::CubicToShorthand);
        for v in [c2x, c2y, x, y] {
            self.args.write(v);
        }
    }

    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.push_op(PathOp::QuadTo);
        for v in [cx, cy, x, y] {
            self.args.write(v);
        }
    }

    fn quad_to_shorthand(&mut self, x: f64, y: f64) {
        self.push_op(PathOp::QuadToShorthand);
        self.args.write(x);
        self.args.write(y);
    }

    fn close(&mut self) {
        self.push_op(PathOp::Close);
    }

    fn circle(&mut self, left: f64, top: f64, width: f64) {
        self.push_op(PathOp::Circle);
        for v in [left, top, width] {
            self.args.write(v);
        }
    }

    fn ellipse(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.push_op(PathOp::Ellipse);
        for v in [left, top, width, height] {
            self.args.write(v);
        }
    }

    fn arc_circle(&mut self, radius: f64, end_x: f64, end_y: f64, large: bool, cw: bool) {
        let op = match (large, cw) {
            (false, true) => PathOp::ArcCircleSmallCw,
            (false, false) => PathOp::ArcCircleSmallCcw,
            (true, true) => PathOp::ArcCircleLargeCw,
            (true, false) => PathOp::ArcCircleLargeCcw,
        };
        self.push_op(op);
        for v in [radius, end_x, end_y] {
            self.args.write(v);
        }
    }

    fn arc_ellipse(&mut self, rx: f64, ry: f64, end_x: f64, end_y: f64, large: bool, cw: bool) {
        if large {
            self.push_op(PathOp::ArcEllipseLarge);
            for v in [rx, ry, end_x, end_y, if cw { 1.0 } else { 0.0 }] {
                self.args.write(v);
            }
        } else {
            let op = if cw { PathOp::ArcEllipseSmallCw } else { PathOp::ArcEllipseSmallCcw };
            self.push_op(op);
            for v in [rx, ry, end_x, end_y] {
                self.args.write(v);
            }
        }
    }

    fn end(&mut self) {
        self.push_op(PathOp::End);
        self.flush();
    }
}

// ─── Nybble parser ─────────────────────────────────────────────────────────

/// Decode a nybble-packed path byte stream, dispatching each command to
/// `sink`, stopping at `End`. `args` must be positioned at the first
/// float belonging to this path.
pub fn parse_path<S: PathSink + ?Sized>(
    bytes: &mut ByteReader<'_>,
    args: &mut crate::io::FloatReader<'_>,
    sink: &mut S,
) -> SiResult<()> {
    let mut pending_low: Option<u8> = None;
    loop {
        let nybble = match pending_low.take() {
            Some(low) => low,
            None => {
                let byte = bytes.read_u8()?;
                pending_low = Some(byte & 0x0f);
                byte >> 4
            }
        };

        let index = if nybble == 15 {
            let next = match pending_low.take() {
                Some(low) => low,
                None => {
                    let byte = bytes.read_u8()?;
                    pending_low = Some(byte & 0x0f);
                    byte >> 4
                }
            };
            14 + next
        } else {
            nybble
        };

        let op = PathOp::from_index(index)?;
        dispatch_one(op, args, sink)?;
        if op == PathOp::End {
            return Ok(());
        }
    }
}

fn dispatch_one<S: PathSink + ?Sized>(
    op: PathOp,
    args: &mut crate::io::FloatReader<'_>,
    sink: &mut S,
) -> SiResult<()> {
    let n = op.arg_count();
    let vals = args.read_n(n)?.to_vec();
    match op {
        PathOp::End => sink.end(),
        PathOp::MoveTo => sink.move_to(vals[0], vals[1]),
        PathOp::LineTo => sink.line_to(vals[0], vals[1]),
        PathOp::CubicTo => sink.cubic_to(vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]),
        PathOp::CubicToShorthand => sink.cubic_to_shorthand(vals[0], vals[1], vals[2], vals[3]),
        PathOp::QuadTo => sink.quad_to(vals[0], vals[1], vals[2], vals[3]),
        PathOp::QuadToShorthand => sink.quad_to_shorthand(vals[0], vals[1]),
        PathOp::Close => sink.close(),
        PathOp::Circle => sink.circle(vals[0], vals[1], vals[2]),
        PathOp::Ellipse => sink.ellipse(vals[0], vals[1], vals[2], vals[3]),
        PathOp::ArcCircleSmallCw => sink.arc_circle(vals[0], vals[1], vals[2], false, true),
        PathOp::ArcCircleSmallCcw => sink.arc_circle(vals[0], vals[1], vals[2], false, false),
        PathOp::ArcCircleLargeCw => sink.arc_circle(vals[0], vals[1], vals[2], true, true),
        PathOp::ArcCircleLargeCcw => sink.arc_circle(vals[0], vals[1], vals[2], true, false),
        PathOp::ArcEllipseSmallCw => sink.arc_ellipse(vals[0], vals[1], vals[2], vals[3], false, true),
        PathOp::ArcEllipseSmallCcw => sink.arc_ellipse(vals[0], vals[1], vals[2], vals[3], false, false),
        PathOp::ArcEllipseLarge => {
            sink.arc_ellipse(vals[0], vals[1], vals[2], vals[3], true, vals[4] != 0.0);
        }
    }
    Ok(())
}

/// Byte length a fully-written path will occupy: `ceil(nybble_count / 2)`.
#[must_use]
pub fn encoded_byte_len(cmds: &[PathCmd]) -> usize {
    let mut nybbles = 0usize;
    for cmd in cmds {
        nybbles += nybble_count_for(cmd);
    }
    nybbles += 1; // End always contributes exactly one nybble.
    nybbles.div_ceil(2)
}

fn nybble_count_for(cmd: &PathCmd) -> usize {
    let index = match cmd {
        PathCmd::MoveTo(..) => PathOp::MoveTo as u8,
        PathCmd::LineTo(..) => PathOp::LineTo as u8,
        PathCmd::CubicTo(..) => PathOp::CubicTo as u8,
        PathCmd::CubicToShorthand(..) => PathOp::CubicToShorthand as u8,
        PathCmd::QuadTo(..) => PathOp::QuadTo as u8,
        PathCmd::QuadToShorthand(..) => PathOp::QuadToShorthand as u8,
        PathCmd::Close => PathOp::Close as u8,
        PathCmd::Circle { .. } => PathOp::Circle as u8,
        PathCmd::Ellipse { .. } => PathOp::Ellipse as u8,
        PathCmd::ArcToPointCircle { large, cw, .. } => match (large, cw) {
            (false, true) => PathOp::ArcCircleSmallCw as u8,
            (false, false) => PathOp::ArcCircleSmallCcw as u8,
            (true, true) => PathOp::ArcCircleLargeCw as u8,
            (true, false) => PathOp::ArcCircleLargeCcw as u8,
        },
        PathCmd::ArcToPointEllipse { large, cw, .. } => {
            if *large {
                PathOp::ArcEllipseLarge as u8
            } else if *cw {
                PathOp::ArcEllipseSmallCw as u8
            } else {
                PathOp::ArcEllipseSmallCcw as u8
            }
        }
    };
    if index < 15 { 1 } else { 2 }
}

/// A `PathSink` that discards every call. Used by the traverser to skip
/// over a freshly-written (non-back-referenced) path's bytes/args, which
/// advances both cursors without needing the decoded geometry itself —
/// the visitor re-decodes it lazily later via a `PathData` handle.
#[derive(Debug, Default)]
pub struct NullPathSink;

impl PathSink for NullPathSink {
    fn move_to(&mut self, _x: f64, _y: f64) {}
    fn line_to(&mut self, _x: f64, _y: f64) {}
    fn cubic_to(&mut self, _c1x: f64, _c1y: f64, _c2x: f64, _c2y: f64, _x: f64, _y: f64) {}
    fn cubic_to_shorthand(&mut self, _c2x: f64, _c2y: f64, _x: f64, _y: f64) {}
    fn quad_to(&mut self, _cx: f64, _cy: f64, _x: f64, _y: f64) {}
    fn quad_to_shorthand(&mut self, _x: f64, _y: f64) {}
    fn close(&mut self) {}
    fn circle(&mut self, _left: f64, _top: f64, _width: f64) {}
    fn ellipse(&mut self, _left: f64, _top: f64, _width: f64, _height: f64) {}
    fn arc_circle(&mut self, _radius: f64, _end_x: f64, _end_y: f64, _large: bool, _cw: bool) {}
    fn arc_ellipse(&mut self, _rx: f64, _ry: f64, _end_x: f64, _end_y: f64, _large: bool, _cw: bool) {}
    fn end(&mut self) {}
}

/// A `PathSink` that records every call as a `PathCmd`, used by tests to
/// assert `parse(encode(cmds)) == cmds`.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub cmds: Vec<PathCmd>,
    pub ended: bool,
}

impl PathSink for RecordingSink {
    fn move_to(&mut self, x: f64, y: f64) {
        self.cmds.push(PathCmd::MoveTo(x, y));
    }
    fn line_to(&mut self, x: f64, y: f64) {
        self.cmds.push(PathCmd::LineTo(x, y));
    }
    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.cmds.push(PathCmd::CubicTo(c1x, c1y, c2x, c2y, x, y));
    }
    fn cubic_to_shorthand(&mut self, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.cmds.push(PathCmd::CubicToShorthand(c2x, c2y, x, y));
    }
    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.cmds.push(PathCmd::QuadTo(cx, cy, x, y));
    }
    fn quad_to_shorthand(&mut self, x: f64, y: f64) {
        self.cmds.push(PathCmd::QuadToShorthand(x, y));
    }
    fn close(&mut self) {
        self.cmds.push(PathCmd::Close);
    }
    fn circle(&mut self, left: f64, top: f64, width: f64) {
        self.cmds.push(PathCmd::Circle { left, top, width });
    }
    fn ellipse(&mut self, left: f64, top: f64, width: f64, height: f64) {
        self.cmds.push(PathCmd::Ellipse { left, top, width, height });
    }
    fn arc_circle(&mut self, radius: f64, end_x: f64, end_y: f64, large: bool, cw: bool) {
        self.cmds.push(PathCmd::ArcToPointCircle { radius, end_x, end_y, large, cw });
    }
    fn arc_ellipse(&mut self, rx: f64, ry: f64, end_x: f64, end_y: f64, large: bool, cw: bool) {
        self.cmds.push(PathCmd::ArcToPointEllipse { rx, ry, end_x, end_y, large, cw });
    }
    fn end(&mut self) {
        self.ended = true;
    }
}
