//! The compact image entity: the frozen IR produced by `Builder::end_vector`
//! and consumed by `Traverser`.

use crate::color::Argb;
use crate::error::SiResult;
use crate::io::{ByteReader, FloatReader, FloatWidth};
use crate::path::parse_path;
use crate::visitor::{PathData, TintMode};

/// A raster image embedded in the document: position/size plus the
/// encoded (e.g. PNG) bytes, canonicalized once by the resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAsset {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub encoded: Vec<u8>,
}

/// The compact, position-independent IR for a 2D vector image.
///
/// Immutable after construction. A single contiguous `children` byte blob
/// plus two float arrays (`args`, `transforms`) carry the entire document;
/// `strings`/`float_lists`/`images` are indexed side tables.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactImage {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub float_width: FloatWidth,
    pub tint_color: Option<Argb>,
    pub tint_mode: TintMode,
    pub children: Vec<u8>,
    pub args: Vec<f64>,
    pub transforms: Vec<f64>,
    pub strings: Vec<String>,
    pub float_lists: Vec<Vec<f64>>,
    pub images: Vec<ImageAsset>,
    pub num_paths: u32,
    pub num_paints: u32,
}

/// A `PathData` handle pointing at a saved `(byte position, arg position)`
/// pair inside a `CompactImage`'s `children`/`args` arrays.
/// Cheap to construct — it borrows nothing until `visit` is called.
pub struct IrPathHandle<'a> {
    image: &'a CompactImage,
    byte_pos: usize,
    arg_pos: usize,
}

impl<'a> IrPathHandle<'a> {
    #[must_use]
    pub fn new(image: &'a CompactImage, byte_pos: usize, arg_pos: usize) -> Self {
        Self { image, byte_pos, arg_pos }
    }
}

impl PathData for IrPathHandle<'_> {
    fn visit(&self, sink: &mut dyn crate::path::PathSink) -> SiResult<()> {
        let mut bytes = ByteReader::new(&self.image.children);
        bytes.set_seek(self.byte_pos);
        let mut args = FloatReader::new(&self.image.args);
        args.set_seek(self.arg_pos);
        parse_path(&mut bytes, &mut args, sink)
    }
}
