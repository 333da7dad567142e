//! The IR traverser: decodes the opcode stream and drives a
//! `Visitor`. Paths are exposed lazily through `IrPathHandle` so a
//! bounds-only or structural consumer never pays for geometry decode it
//! doesn't use; paints and transforms are small and finite, so they are
//! decoded eagerly into concrete values and cached by dedup index.
//!
//! Unlike the source design's pair of "forward"/"rewind" readers sharing
//! one buffer, back-referenced paths here are resolved by handing the
//! visitor an `IrPathHandle` that borrows `CompactImage` directly and
//! builds its own short-lived reader when visited — the image's owned
//! buffers make an explicit rewind-and-restore dance unnecessary. Paints
//! and transforms need no handle at all: their first occurrence is
//! decoded once and cached, and a later back-reference is a cheap index
//! into that cache.

use crate::color::{read_paint, Paint};
use crate::error::{SiError, SiResult};
use crate::io::{ByteReader, FloatReader};
use crate::ir::{CompactImage, IrPathHandle};
use crate::opcode::{
    Category, ClipPathFlags, GroupFlags, PathFlags, TextFlags, END_GROUP_OP, IMAGE_OP,
    MASKED_CHILD_OP, TEXT_CHUNK_OP, TEXT_END_OP, TEXT_SPAN_OP,
};
use crate::path::{parse_path, NullPathSink};
use crate::visitor::{BlendMode, GroupInfo, MaskedInfo, TextSpanInfo, VectorInfo, Visitor};

/// Decode `image`'s opcode stream, driving `visitor` in document order.
/// Fails fast on any malformed byte; the visitor may already have
/// received a prefix of valid events when that happens — documenting
/// that is the caller's job.
pub fn traverse(image: &CompactImage, visitor: &mut dyn Visitor) -> SiResult<()> {
    visitor.init();
    visitor.vector(&VectorInfo {
        width: image.width,
        height: image.height,
        tint_color: image.tint_color,
        tint_mode: image.tint_mode,
    });

    let mut state = State::new(image);
    state.run(visitor)?;

    visitor.end_vector();
    Ok(())
}

struct State<'a> {
    image: &'a CompactImage,
    forward: ByteReader<'a>,
    args: FloatReader<'a>,
    transforms: FloatReader<'a>,
    path_table: Vec<(usize, usize)>,
    paint_table: Vec<Paint>,
    transform_table: Vec<[f64; 6]>,
    container_stack: Vec<u8>,
    group_depth: u32,
    current_text_paint: Option<Paint>,
    current_text_font_family: Option<String>,
}

impl<'a> State<'a> {
    fn new(image: &'a CompactImage) -> Self {
        Self {
            image,
            forward: ByteReader::new(&image.children),
            args: FloatReader::new(&image.args),
            transforms: FloatReader::new(&image.transforms),
            path_table: Vec::new(),
            paint_table: Vec::new(),
            transform_table: Vec::new(),
            container_stack: Vec::new(),
            group_depth: 0,
            current_text_paint: None,
            current_text_font_family: None,
        }
    }

    fn run(&mut self, visitor: &mut dyn Visitor) -> SiResult<()> {
        while !self.forward.is_eof() {
            let byte = self.forward.read_u8()?;
            match byte {
                MASKED_CHILD_OP => visitor.masked_child(),
                TEXT_SPAN_OP => self.handle_text_span(visitor)?,
                TEXT_CHUNK_OP => {
                    let chunk_index = self.forward.read_smallish_int()?;
                    visitor.text_multi_span_chunk(chunk_index);
                }
                TEXT_END_OP => {
                    self.current_text_paint = None;
                    self.current_text_font_family = None;
                    visitor.text_end();
                }
                END_GROUP_OP => {
                    let kind = self.container_stack.pop().ok_or(SiError::UnexpectedEndGroup)?;
                    if self.group_depth == 0 {
                        return Err(SiError::UnexpectedEndGroup);
                    }
                    self.group_depth -= 1;
                    if kind == 1 {
                        visitor.end_masked();
                    } else {
                        visitor.end_group();
                    }
                }
                IMAGE_OP => {
                    let image_number = self.forward.read_smallish_int()?;
                    visitor.image(image_number);
                }
                other => {
                    let category = Category::from_byte(other).ok_or(SiError::BadOpcode(other))?;
                    let flag_bits = other - category.base();
                    match category {
                        Category::Path => self.handle_path(flag_bits, visitor)?,
                        Category::Text => self.handle_text(flag_bits, visitor)?,
                        Category::Group => self.handle_group(flag_bits, visitor)?,
                        Category::ClipPath => self.handle_clip_path(flag_bits, visitor)?,
                        Category::Image | Category::EndGroup => unreachable!("handled above"),
                    }
                }
            }
        }

        if !self.forward.is_eof() || !self.args.is_eof() || !self.transforms.is_eof() {
            return Err(SiError::Malformed);
        }
        if self.group_depth != 0 || !self.container_stack.is_empty() {
            return Err(SiError::UnbalancedGroups);
        }
        if self.path_table.len() as u32 != self.image.num_paths
            || self.paint_table.len() as u32 != self.image.num_paints
        {
            return Err(SiError::Malformed);
        }
        Ok(())
    }

    fn string_at(&self, idx: usize) -> SiResult<String> {
        self.image.strings.get(idx).cloned().ok_or(SiError::Malformed)
    }

    fn resolve_path(&mut self, has_number: bool) -> SiResult<IrPathHandle<'a>> {
        if has_number {
            let n = self.forward.read_smallish_int()?;
            let &(byte_off, arg_off) = self
                .path_table
                .get(n as usize)
                .ok_or(SiError::BadBackReference { index: n, count: self.path_table.len() as u32 })?;
            Ok(IrPathHandle::new(self.image, byte_off, arg_off))
        } else {
            let byte_off = self.forward.seek();
            let arg_off = self.args.seek();
            parse_path(&mut self.forward, &mut self.args, &mut NullPathSink)?;
            self.path_table.push((byte_off, arg_off));
            Ok(IrPathHandle::new(self.image, byte_off, arg_off))
        }
    }

    fn resolve_paint(&mut self, has_number: bool, fill_bits: u8, stroke_bits: u8) -> SiResult<Paint> {
        if has_number {
            let n = self.forward.read_smallish_int()?;
            self.paint_table
                .get(n as usize)
                .cloned()
                .ok_or(SiError::BadBackReference { index: n, count: self.paint_table.len() as u32 })
        } else {
            let paint = read_paint(fill_bits, stroke_bits, &mut self.forward, &mut self.args, &mut self.transforms)?;
            self.paint_table.push(paint.clone());
            Ok(paint)
        }
    }

    fn resolve_transform(&mut self, has_transform: bool, has_number: bool) -> SiResult<Option<[f64; 6]>> {
        if !has_transform {
            return Ok(None);
        }
        if has_number {
            let n = self.forward.read_smallish_int()?;
            let t = *self
                .transform_table
                .get(n as usize)
                .ok_or(SiError::BadBackReference { index: n, count: self.transform_table.len() as u32 })?;
            Ok(Some(t))
        } else {
            let v = self.transforms.read_n(6)?;
            let t = [v[0], v[1], v[2], v[3], v[4], v[5]];
            self.transform_table.push(t);
            Ok(Some(t))
        }
    }

    fn handle_path(&mut self, flag_bits: u8, visitor: &mut dyn Visitor) -> SiResult<()> {
        let flags = PathFlags::from_bits(flag_bits);
        let path_data = self.resolve_path(flags.has_path_number)?;
        let paint = self.resolve_paint(flags.has_paint_number, flags.fill_color_type, flags.stroke_color_type)?;
        visitor.path(&path_data, &paint);
        Ok(())
    }

    fn handle_clip_path(&mut self, flag_bits: u8, visitor: &mut dyn Visitor) -> SiResult<()> {
        let flags = ClipPathFlags::from_bits(flag_bits);
        let path_data = self.resolve_path(flags.has_path_number)?;
        visitor.clip_path(&path_data);
        Ok(())
    }

    fn handle_group(&mut self, flag_bits: u8, visitor: &mut dyn Visitor) -> SiResult<()> {
        let flags = GroupFlags::from_bits(flag_bits);
        let transform = self.resolve_transform(flags.has_transform, flags.has_transform_number)?;
        let group_alpha = if flags.has_group_alpha { Some(self.args.read()?) } else { None };
        let blend_mode = BlendMode::from_index(self.forward.read_u8()?)?;
        let container_kind = self.forward.read_u8()?;
        self.container_stack.push(container_kind);
        self.group_depth += 1;

        if container_kind == 1 {
            let mask_flags = self.forward.read_u8()?;
            let uses_luma = mask_flags & 0b01 != 0;
            let has_bounds = mask_flags & 0b10 != 0;
            let mask_bounds = if has_bounds {
                let v = self.args.read_n(4)?;
                Some((v[0], v[1], v[2], v[3]))
            } else {
                None
            };
            let _ = (transform, group_alpha); // masked groups never carry these
            visitor.masked(&MaskedInfo { mask_bounds, uses_luma });
        } else {
            visitor.group(&GroupInfo { transform, group_alpha, blend_mode });
        }
        Ok(())
    }

    fn handle_text(&mut self, flag_bits: u8, visitor: &mut dyn Visitor) -> SiResult<()> {
        let flags = TextFlags::from_bits(flag_bits);
        let font_family = if flags.has_font_family {
            let idx = self.forward.read_smallish_int()? as usize;
            Some(self.string_at(idx)?)
        } else {
            None
        };
        let paint = self.resolve_paint(flags.has_paint_number, flags.fill_color_type, flags.stroke_color_type)?;
        self.current_text_paint = Some(paint.clone());
        self.current_text_font_family = font_family.clone();
        visitor.text(&paint, font_family.as_deref());
        Ok(())
    }

    fn handle_text_span(&mut self, visitor: &mut dyn Visitor) -> SiResult<()> {
        let content_idx = self.forward.read_smallish_int()? as usize;
        let content = self.string_at(content_idx)?;

        let flags = self.forward.read_u8()?;
        let has_font_family_override = flags & 0b01 != 0;
        let has_paint_override = flags & 0b10 != 0;

        let font_family = if has_font_family_override {
            let idx = self.forward.read_smallish_int()? as usize;
            Some(self.string_at(idx)?)
        } else {
            self.current_text_font_family.clone()
        };

        let font_size = self.args.read()?;

        let paint = if has_paint_override {
            let bits = self.forward.read_u8()?;
            let fill_bits = bits & 0b11;
            let stroke_bits = (bits >> 2) & 0b11;
            read_paint(fill_bits, stroke_bits, &mut self.forward, &mut self.args, &mut self.transforms)?
        } else {
            self.current_text_paint.clone().ok_or(SiError::Malformed)?
        };

        visitor.text_span(&TextSpanInfo { content, font_family, font_size, paint });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{Builder, BuilderConfig};
    use crate::color::{Argb, FillType, SiColor, StrokeCap, StrokeJoin};
    use crate::path::PathCmd;
    use crate::visitor::NullVisitor;

    fn rect_paint(color: u32) -> Paint {
        Paint {
            fill_color: SiColor::Explicit(Argb(color)),
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

    fn rect_cmds() -> Vec<PathCmd> {
        vec![
            PathCmd::MoveTo(0.0, 0.0),
            PathCmd::LineTo(10.0, 0.0),
            PathCmd::LineTo(10.0, 10.0),
            PathCmd::LineTo(0.0, 10.0),
            PathCmd::Close,
        ]
    }

    #[derive(Default)]
    struct RecordingVisitor {
        events: Vec<String>,
    }

    impl Visitor for RecordingVisitor {
        fn init(&mut self) {
            self.events.push("init".into());
        }
        fn vector(&mut self, info: &VectorInfo) {
            self.events.push(format!("vector({:?},{:?})", info.width, info.height));
        }
        fn group(&mut self, _info: &GroupInfo) {
            self.events.push("group".into());
        }
        fn end_group(&mut self) {
            self.events.push("end_group".into());
        }
        fn path(&mut self, _path: &dyn crate::visitor::PathData, paint: &Paint) {
            self.events.push(format!("path(fill={:?})", paint.fill_color));
        }
        fn end_vector(&mut self) {
            self.events.push("end_vector".into());
        }
    }

    #[test]
    fn empty_document_round_trips_through_traversal() {
        let mut builder = Builder::new(BuilderConfig::default());
        builder.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        builder.vector(Some(100.0), Some(50.0), None, Default::default()).unwrap();
        let image = builder.end_vector().unwrap();

        assert_eq!(image.num_paths, 0);
        assert_eq!(image.num_paints, 0);
        assert!(image.children.is_empty());

        let mut visitor = RecordingVisitor::default();
        traverse(&image, &mut visitor).unwrap();
        assert_eq!(
            visitor.events,
            vec!["init".to_string(), "vector(Some(100.0),Some(50.0))".to_string(), "end_vector".to_string()]
        );
    }

    #[test]
    fn single_path_round_trips_through_traversal() {
        let mut builder = Builder::new(BuilderConfig::default());
        builder.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        builder.vector(None, None, None, Default::default()).unwrap();
        builder.path(&rect_cmds(), &rect_paint(0xffff_0000)).unwrap();
        let image = builder.end_vector().unwrap();

        assert_eq!(image.num_paths, 1);
        assert_eq!(image.num_paints, 1);

        let mut visitor = NullVisitor;
        traverse(&image, &mut visitor).unwrap();
    }

    #[test]
    fn shared_path_and_paint_dedup_through_traversal() {
        let mut builder = Builder::new(BuilderConfig::default());
        builder.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        builder.vector(None, None, None, Default::default()).unwrap();
        let paint = rect_paint(0xff00_ff00);
        builder.path(&rect_cmds(), &paint).unwrap();
        builder.path(&rect_cmds(), &paint).unwrap();
        let image = builder.end_vector().unwrap();

        assert_eq!(image.num_paths, 1);
        assert_eq!(image.num_paints, 1);

        let mut visitor = RecordingVisitor::default();
        traverse(&image, &mut visitor).unwrap();
        let path_events: Vec<_> = visitor.events.iter().filter(|e| e.starts_with("path")).collect();
        assert_eq!(path_events.len(), 2);
    }

    #[test]
    fn nested_groups_stay_balanced_through_traversal() {
        let mut builder = Builder::new(BuilderConfig::default());
        builder.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        builder.vector(None, None, None, Default::default()).unwrap();
        builder.group(None, None, Default::default()).unwrap();
        builder.group(None, None, Default::default()).unwrap();
        builder.path(&rect_cmds(), &rect_paint(0xff00_0000)).unwrap();
        builder.end_group().unwrap();
        builder.path(&rect_cmds(), &rect_paint(0xff00_0000)).unwrap();
        builder.end_group().unwrap();
        let image = builder.end_vector().unwrap();

        let mut visitor = RecordingVisitor::default();
        traverse(&image, &mut visitor).unwrap();
        assert_eq!(
            visitor.events,
            vec![
                "init".to_string(),
                "vector(None,None)".to_string(),
                "group".to_string(),
                "group".to_string(),
                "path(fill=Explicit(Argb(4278190080)))".to_string(),
                "end_group".to_string(),
                "path(fill=Explicit(Argb(4278190080)))".to_string(),
                "end_group".to_string(),
                "end_vector".to_string(),
            ]
        );
    }

    #[test]
    fn unbalanced_groups_rejected_at_end_vector() {
        let mut builder = Builder::new(BuilderConfig::default());
        builder.init(Vec::new(), Vec::new(), Vec::new()).unwrap();
        builder.vector(None, None, None, Default::default()).unwrap();
        builder.group(None, None, Default::default()).unwrap();
        let err = builder.end_vector().unwrap_err();
        assert_eq!(err, SiError::UnbalancedGroups);
    }
}
