//! The IR writer: accepts a stream of high-level scene events and emits
//! the opcode byte stream plus the `args`/`transforms` float arrays.
//! Dedup tables for paths, paints, and transforms are maintained here;
//! `strings`/`float_lists`/`images` are installed once by `init` (already
//! canonicalized upstream by `si-scene::Canonicalizer`).

use crate::color::{self, Argb, Paint};
use crate::error::{SiError, SiResult};
use crate::io::{ByteWriter, FloatWidth, FloatWriter};
use crate::ir::{CompactImage, ImageAsset};
use crate::opcode::{
    Category, ClipPathFlags, GroupFlags, PathFlags, TextFlags, END_GROUP_OP, IMAGE_OP,
    MASKED_CHILD_OP, TEXT_CHUNK_OP, TEXT_END_OP, TEXT_SPAN_OP,
};
use crate::path::{feed_path, PathCmd, PathWriter};
use crate::visitor::{BlendMode, TintMode};

/// Policy knobs for how a document gets encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuilderConfig {
    /// Whether the IR's float arrays are 64-bit. Mirrors the IR's own
    /// `big_floats` flag; callers opt in for high-precision documents.
    pub big_floats: bool,
    /// Disable structural dedup of paths/paints/transforms, for debugging
    /// byte-for-byte output. Default on.
    pub dedup: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self { big_floats: false, dedup: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuilderState {
    Start,
    Initialized,
    VectorOpened,
    VectorClosed,
}

/// A structural-equality-keyed, insertion-ordered dedup table: indices are
/// assigned in insertion order, so decode can rebuild the same table from
/// just the entries it sees. Linear scan — documents stay small enough
/// that this beats the bookkeeping of a hash-keyed structure for
/// float-bearing keys.
#[derive(Debug, Default)]
struct DedupTable<K> {
    items: Vec<K>,
}

impl<K: PartialEq> DedupTable<K> {
    fn find(&self, key: &K) -> Option<u32> {
        self.items.iter().position(|k| k == key).map(|i| i as u32)
    }

    fn insert(&mut self, key: K) -> u32 {
        self.items.push(key);
        (self.items.len() - 1) as u32
    }

    fn len(&self) -> u32 {
        self.items.len() as u32
    }
}

/// The IR writer. See module docs.
pub struct Builder {
    config: BuilderConfig,
    state: BuilderState,
    group_depth: u32,

    width: Option<f64>,
    height: Option<f64>,
    tint_color: Option<Argb>,
    tint_mode: TintMode,

    children: ByteWriter,
    args: FloatWriter,
    transforms: FloatWriter,

    strings: Vec<String>,
    float_lists: Vec<Vec<f64>>,
    images: Vec<ImageAsset>,

    paths: DedupTable<Vec<PathCmd>>,
    paints: DedupTable<Paint>,
    transform_table: DedupTable<[f64; 6]>,
}

impl Builder {
    #[must_use]
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            state: BuilderState::Start,
            group_depth: 0,
            width: None,
            height: None,
            tint_color: None,
            tint_mode: TintMode::default(),
            children: ByteWriter::new(),
            args: FloatWriter::new(),
            transforms: FloatWriter::new(),
            strings: Vec::new(),
            float_lists: Vec::new(),
            images: Vec::new(),
            paths: DedupTable::default(),
            paints: DedupTable::default(),
            transform_table: DedupTable::default(),
        }
    }

    fn require(&self, ok: bool, what: &'static str) -> SiResult<()> {
        if ok {
            Ok(())
        } else {
            Err(SiError::BuilderMisuse(what))
        }
    }

    fn require_opened(&self, what: &'static str) -> SiResult<()> {
        self.require(self.state == BuilderState::VectorOpened, what)
    }

    /// Installs the canonical strings/float-lists/images tables. Must be
    /// the first call.
    pub fn init(
        &mut self,
        images: Vec<ImageAsset>,
        strings: Vec<String>,
        float_lists: Vec<Vec<f64>>,
    ) -> SiResult<()> {
        self.require(self.state == BuilderState::Start, "init called more than once")?;
        self.images = images;
        self.strings = strings;
        self.float_lists = float_lists;
        self.state = BuilderState::Initialized;
        Ok(())
    }

    /// Opens the document. Must be called right after `init`.
    pub fn vector(
        &mut self,
        width: Option<f64>,
        height: Option<f64>,
        tint_color: Option<Argb>,
        tint_mode: TintMode,
    ) -> SiResult<()> {
        self.require(self.state == BuilderState::Initialized, "vector called before init, or more than once")?;
        self.width = width;
        self.height = height;
        self.tint_color = tint_color;
        self.tint_mode = tint_mode;
        self.state = BuilderState::VectorOpened;
        log::trace!("vector opened width={width:?} height={height:?}");
        Ok(())
    }

    /// Resolves a transform through the dedup table shared between
    /// groups and gradients. Returns `Some(number)` on a hit; on a miss,
    /// appends the affine to the
    /// `transforms` array and registers it, returning `None` so the
    /// caller knows to mark `hasTransformNumber=false`.
    fn dedup_transform(&mut self, t: [f64; 6]) -> Option<u32> {
        if self.config.dedup {
            if let Some(n) = self.transform_table.find(&t) {
                return Some(n);
            }
        }
        self.transforms.write_affine(t);
        self.transform_table.insert(t);
        None
    }

    /// Pushes a group. `blend_mode` has no flag bit in the 3-bit GROUP
    /// opcode budget (see `visitor::BlendMode`); it is
    /// appended as an unconditional trailing byte, followed by a
    /// "container kind" byte (0 = plain group) shared with `masked`.
    pub fn group(
        &mut self,
        transform: Option<[f64; 6]>,
        group_alpha: Option<f64>,
        blend_mode: BlendMode,
    ) -> SiResult<()> {
        self.require_opened("group called outside an open vector")?;
        self.write_group_opcode(transform, group_alpha, blend_mode, 0)?;
        self.group_depth += 1;
        Ok(())
    }

    /// `masked(mask_bounds?, uses_luma)` shares the GROUP opcode and the
    /// END_GROUP bracket with `group`/`end_group` — any transform/alpha
    /// override is moved onto a *separate* enclosing `group()` by the
    /// resolver, so `masked` itself never carries one. Distinguished from
    /// a plain group by the trailing "container kind" byte.
    pub fn masked(&mut self, mask_bounds: Option<(f64, f64, f64, f64)>, uses_luma: bool) -> SiResult<()> {
        self.require_opened("masked called outside an open vector")?;
        self.write_group_opcode(None, None, BlendMode::Normal, 1)?;
        let flags = u8::from(uses_luma) | (u8::from(mask_bounds.is_some()) << 1);
        self.children.write_u8(flags);
        if let Some((x, y, w, h)) = mask_bounds {
            for v in [x, y, w, h] {
                self.args.write(v);
            }
        }
        self.group_depth += 1;
        Ok(())
    }

    fn write_group_opcode(
        &mut self,
        transform: Option<[f64; 6]>,
        group_alpha: Option<f64>,
        blend_mode: BlendMode,
        container_kind: u8,
    ) -> SiResult<()> {
        let transform_number = transform.and_then(|t| self.dedup_transform(t));
        let flags = GroupFlags {
            has_transform: transform.is_some(),
            has_transform_number: transform_number.is_some(),
            has_group_alpha: group_alpha.is_some(),
        };
        self.children.write_u8(flags.opcode());
        if let Some(n) = transform_number {
            self.children.write_smallish_int(n);
        }
        if let Some(alpha) = group_alpha {
            self.args.write(alpha);
        }
        self.children.write_u8(blend_mode.to_index());
        self.children.write_u8(container_kind);
        Ok(())
    }

    /// A sequencing marker separating the masked target's content from
    /// the mask subtree's content inside one `masked`/`end_masked`
    /// bracket.
    pub fn masked_child(&mut self) -> SiResult<()> {
        self.require_opened("masked_child called outside an open vector")?;
        self.children.write_u8(MASKED_CHILD_OP);
        Ok(())
    }

    /// Closes the nearest `group`/`masked` bracket.
    pub fn end_group(&mut self) -> SiResult<()> {
        self.require_opened("end_group called outside an open vector")?;
        if self.group_depth == 0 {
            return Err(SiError::BuilderMisuse("end_group called at depth 0"));
        }
        self.children.write_u8(END_GROUP_OP);
        self.group_depth -= 1;
        Ok(())
    }

    /// `end_masked()` is `end_group()` under another name (same bracket).
    pub fn end_masked(&mut self) -> SiResult<()> {
        self.end_group()
    }

    /// Emits a filled/stroked path, deduping both the path data and the
    /// paint against their respective tables.
    pub fn path(&mut self, cmds: &[PathCmd], paint: &Paint) -> SiResult<()> {
        self.require_opened("path called outside an open vector")?;

        let path_number = if self.config.dedup { self.paths.find(&cmds.to_vec()) } else { None };
        let paint_number = if self.config.dedup { self.paints.find(paint) } else { None };

        let fill_bits = color::color_type_bits(&paint.fill_color);
        let stroke_bits = color::color_type_bits(&paint.stroke_color);
        let flags = PathFlags {
            has_path_number: path_number.is_some(),
            has_paint_number: paint_number.is_some(),
            fill_color_type: fill_bits,
            stroke_color_type: stroke_bits,
        };
        self.children.write_u8(flags.opcode());

        match path_number {
            Some(n) => self.children.write_smallish_int(n),
            None => {
                let mut writer = PathWriter::new(&mut self.args);
                feed_path(cmds, &mut writer);
                self.children.extend_bytes(&writer.into_bytes());
                self.paths.insert(cmds.to_vec());
            }
        }

        match paint_number {
            Some(n) => self.children.write_smallish_int(n),
            None => {
                color::write_paint(paint, &mut self.children, &mut self.args, &mut self.transforms)?;
                self.paints.insert(paint.clone());
            }
        }

        log::trace!(
            "path emitted (path_number={:?}, paint_number={:?})",
            path_number,
            paint_number
        );
        Ok(())
    }

    /// Same path-number dedup mechanism as `path`, with no paint.
    pub fn clip_path(&mut self, cmds: &[PathCmd]) -> SiResult<()> {
        self.require_opened("clip_path called outside an open vector")?;
        let path_number = if self.config.dedup { self.paths.find(&cmds.to_vec()) } else { None };
        let flags = ClipPathFlags { has_path_number: path_number.is_some() };
        self.children.write_u8(flags.opcode());
        match path_number {
            Some(n) => self.children.write_smallish_int(n),
            None => {
                let mut writer = PathWriter::new(&mut self.args);
                feed_path(cmds, &mut writer);
                self.children.extend_bytes(&writer.into_bytes());
                self.paths.insert(cmds.to_vec());
            }
        }
        Ok(())
    }

    /// Emits an image reference: an index into the canonical `images`
    /// table installed by `init`.
    pub fn image(&mut self, image_number: u32) -> SiResult<()> {
        self.require_opened("image called outside an open vector")?;
        self.require(
            (image_number as usize) < self.images.len(),
            "image_number out of range of the canonical images table",
        )?;
        self.children.write_u8(IMAGE_OP);
        self.children.write_smallish_int(image_number);
        Ok(())
    }

    /// Opens a text block: same paint-dedup mechanism as `path`, plus an
    /// optional default font family (a string-table index).
    pub fn text(&mut self, paint: &Paint, font_family: Option<u32>) -> SiResult<()> {
        self.require_opened("text called outside an open vector")?;
        let paint_number = if self.config.dedup { self.paints.find(paint) } else { None };
        let fill_bits = color::color_type_bits(&paint.fill_color);
        let stroke_bits = color::color_type_bits(&paint.stroke_color);
        let flags = TextFlags {
            has_paint_number: paint_number.is_some(),
            has_font_family: font_family.is_some(),
            fill_color_type: fill_bits,
            stroke_color_type: stroke_bits,
        };
        self.children.write_u8(flags.opcode());
        if let Some(n) = font_family {
            self.children.write_smallish_int(n);
        }
        match paint_number {
            Some(n) => self.children.write_smallish_int(n),
            None => {
                color::write_paint(paint, &mut self.children, &mut self.args, &mut self.transforms)?;
                self.paints.insert(paint.clone());
            }
        }
        Ok(())
    }

    /// `text_span(content, font_family_override?, font_size, paint_override?)`.
    /// `content` and an override font family are both string-table
    /// indices (already canonicalized).
    pub fn text_span(
        &mut self,
        content: u32,
        font_family_override: Option<u32>,
        font_size: f64,
        paint_override: Option<&Paint>,
    ) -> SiResult<()> {
        self.require_opened("text_span called outside an open vector")?;
        self.children.write_u8(TEXT_SPAN_OP);
        self.children.write_smallish_int(content);

        let flags =
            u8::from(font_family_override.is_some()) | (u8::from(paint_override.is_some()) << 1);
        self.children.write_u8(flags);
        if let Some(ff) = font_family_override {
            self.children.write_smallish_int(ff);
        }
        self.args.write(font_size);
        if let Some(paint) = paint_override {
            let fill_bits = color::color_type_bits(&paint.fill_color);
            let stroke_bits = color::color_type_bits(&paint.stroke_color);
            self.children.write_u8(fill_bits | (stroke_bits << 2));
            color::write_paint(paint, &mut self.children, &mut self.args, &mut self.transforms)?;
        }
        Ok(())
    }

    /// An explicit grouping marker a caller inserts between spans
    /// belonging to different chunks (e.g. line-wrap boundaries).
    pub fn text_multi_span_chunk(&mut self, chunk_index: u32) -> SiResult<()> {
        self.require_opened("text_multi_span_chunk called outside an open vector")?;
        self.children.write_u8(TEXT_CHUNK_OP);
        self.children.write_smallish_int(chunk_index);
        Ok(())
    }

    pub fn text_end(&mut self) -> SiResult<()> {
        self.require_opened("text_end called outside an open vector")?;
        self.children.write_u8(TEXT_END_OP);
        Ok(())
    }

    /// Finalizes the IR. After this, no further events are accepted.
    pub fn end_vector(mut self) -> SiResult<CompactImage> {
        self.require_opened("end_vector called outside an open vector")?;
        if self.group_depth != 0 {
            return Err(SiError::UnbalancedGroups);
        }
        self.state = BuilderState::VectorClosed;
        log::debug!(
            "end_vector: {} children bytes, {} paths, {} paints",
            self.children.length(),
            self.paths.len(),
            self.paints.len()
        );
        Ok(CompactImage {
            width: self.width,
            height: self.height,
            float_width: FloatWidth::from_big_flag(self.config.big_floats),
            tint_color: self.tint_color,
            tint_mode: self.tint_mode,
            children: self.children.into_bytes(),
            args: self.args.into_vec(),
            transforms: self.transforms.into_vec(),
            strings: self.strings,
            float_lists: self.float_lists,
            images: self.images,
            num_paths: self.paths.len(),
            num_paints: self.paints.len(),
        })
    }
}
