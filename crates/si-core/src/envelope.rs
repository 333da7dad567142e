//! The `.si` file envelope: magic, version, flags, the two
//! float arrays, optional width/height/tint, the canonical side tables,
//! and finally the opcode stream.
//!
//! This is the one place the on-disk float width (`FloatWidth::F32` or
//! `F64`) is actually narrowed to or widened from the IR's internal `f64`
//! representation — every other module works purely in `f64`.

use crate::color::Argb;
use crate::error::{SiError, SiResult, FORMAT_VERSION};
use crate::io::{ByteReader, ByteWriter, FloatWidth};
use crate::ir::{CompactImage, ImageAsset};
use crate::visitor::TintMode;

const MAGIC: u32 = 0xB0B0_1E07;

const FLAG_HAS_WIDTH: u8 = 1 << 0;
const FLAG_HAS_HEIGHT: u8 = 1 << 1;
const FLAG_BIG_FLOATS: u8 = 1 << 2;
const FLAG_HAS_TINT: u8 = 1 << 3;

fn write_float_array(bytes: &mut ByteWriter, values: &[f64], width: FloatWidth) {
    for &v in values {
        match width {
            FloatWidth::F32 => bytes.write_u32((v as f32).to_bits()),
            FloatWidth::F64 => {
                let [lo, hi] = split_u64(v.to_bits());
                bytes.write_u32(lo);
                bytes.write_u32(hi);
            }
        }
    }
}

fn split_u64(v: u64) -> [u32; 2] {
    [(v & 0xffff_ffff) as u32, (v >> 32) as u32]
}

fn read_float_array(bytes: &mut ByteReader<'_>, len: usize, width: FloatWidth) -> SiResult<Vec<f64>> {
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let v = match width {
            FloatWidth::F32 => f64::from(f32::from_bits(bytes.read_u32()?)),
            FloatWidth::F64 => {
                let lo = u64::from(bytes.read_u32()?);
                let hi = u64::from(bytes.read_u32()?);
                f64::from_bits(lo | (hi << 32))
            }
        };
        out.push(v);
    }
    Ok(out)
}

fn write_string_table(bytes: &mut ByteWriter, strings: &[String]) {
    bytes.write_smallish_int(strings.len() as u32);
    for s in strings {
        let utf8 = s.as_bytes();
        bytes.write_smallish_int(utf8.len() as u32);
        bytes.extend_bytes(utf8);
    }
}

fn read_string_table(bytes: &mut ByteReader<'_>) -> SiResult<Vec<String>> {
    let count = bytes.read_smallish_int()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let len = bytes.read_smallish_int()? as usize;
        let mut buf = Vec::with_capacity(len);
        for _ in 0..len {
            buf.push(bytes.read_u8()?);
        }
        out.push(String::from_utf8(buf).map_err(|_| SiError::Malformed)?);
    }
    Ok(out)
}

fn write_float_list_table(bytes: &mut ByteWriter, lists: &[Vec<f64>], width: FloatWidth) {
    bytes.write_smallish_int(lists.len() as u32);
    for list in lists {
        bytes.write_smallish_int(list.len() as u32);
        write_float_array(bytes, list, width);
    }
}

fn read_float_list_table(bytes: &mut ByteReader<'_>, width: FloatWidth) -> SiResult<Vec<Vec<f64>>> {
    let count = bytes.read_smallish_int()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let len = bytes.read_smallish_int()? as usize;
        out.push(read_float_array(bytes, len, width)?);
    }
    Ok(out)
}

fn write_images_table(bytes: &mut ByteWriter, images: &[ImageAsset], width: FloatWidth) {
    bytes.write_smallish_int(images.len() as u32);
    for img in images {
        write_float_array(bytes, &[img.x, img.y, img.width, img.height], width);
        bytes.write_smallish_int(img.encoded.len() as u32);
        bytes.extend_bytes(&img.encoded);
    }
}

fn read_images_table(bytes: &mut ByteReader<'_>, width: FloatWidth) -> SiResult<Vec<ImageAsset>> {
    let count = bytes.read_smallish_int()? as usize;
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let geom = read_float_array(bytes, 4, width)?;
        let encoded_len = bytes.read_smallish_int()? as usize;
        let mut encoded = Vec::with_capacity(encoded_len);
        for _ in 0..encoded_len {
            encoded.push(bytes.read_u8()?);
        }
        out.push(ImageAsset { x: geom[0], y: geom[1], width: geom[2], height: geom[3], encoded });
    }
    Ok(out)
}

/// Serialize `image` to the `.si` on-disk layout.
#[must_use]
pub fn write_envelope(image: &CompactImage) -> Vec<u8> {
    let width = image.float_width;
    let mut header = ByteWriter::new();
    header.write_u32_be(MAGIC);
    header.write_u8(0);
    header.write_u16_be(FORMAT_VERSION);

    let flags = (u8::from(image.width.is_some()) * FLAG_HAS_WIDTH)
        | (u8::from(image.height.is_some()) * FLAG_HAS_HEIGHT)
        | (u8::from(width.is_big()) * FLAG_BIG_FLOATS)
        | (u8::from(image.tint_color.is_some()) * FLAG_HAS_TINT);
    header.write_u8(flags);

    header.write_u32_be(image.num_paths);
    header.write_u32_be(image.num_paints);
    header.write_u32_be(image.args.len() as u32);
    header.write_u32_be(image.transforms.len() as u32);

    write_float_array(&mut header, &image.args, width);
    write_float_array(&mut header, &image.transforms, width);

    if let Some(w) = image.width {
        write_float_array(&mut header, &[w], width);
    }
    if let Some(h) = image.height {
        write_float_array(&mut header, &[h], width);
    }
    if let Some(tint) = image.tint_color {
        header.write_u32(tint.0);
        header.write_u8(image.tint_mode.to_index());
    }

    write_string_table(&mut header, &image.strings);
    write_float_list_table(&mut header, &image.float_lists, width);
    write_images_table(&mut header, &image.images, width);

    header.extend_bytes(&image.children);
    header.into_bytes()
}

/// Deserialize a `.si` blob back into a `CompactImage`.
pub fn read_envelope(data: &[u8]) -> SiResult<CompactImage> {
    let mut bytes = ByteReader::new(data);

    let magic = bytes.read_u32_be()?;
    if magic != MAGIC {
        return Err(SiError::MalformedHeader);
    }
    let _padding = bytes.read_u8()?;
    let version = bytes.read_u16_be()?;
    if version > FORMAT_VERSION {
        return Err(SiError::UnsupportedVersion { found: version, max_supported: FORMAT_VERSION });
    }

    let flags = bytes.read_u8()?;
    let has_width = flags & FLAG_HAS_WIDTH != 0;
    let has_height = flags & FLAG_HAS_HEIGHT != 0;
    let width = FloatWidth::from_big_flag(flags & FLAG_BIG_FLOATS != 0);
    let has_tint = flags & FLAG_HAS_TINT != 0;

    let num_paths = bytes.read_u32_be()?;
    let num_paints = bytes.read_u32_be()?;
    let args_len = bytes.read_u32_be()? as usize;
    let transforms_len = bytes.read_u32_be()? as usize;

    let args = read_float_array(&mut bytes, args_len, width)?;
    let transforms = read_float_array(&mut bytes, transforms_len, width)?;

    let image_width = if has_width { Some(read_float_array(&mut bytes, 1, width)?[0]) } else { None };
    let image_height = if has_height { Some(read_float_array(&mut bytes, 1, width)?[0]) } else { None };
    let (tint_color, tint_mode) = if has_tint {
        let argb = Argb(bytes.read_u32()?);
        let mode = TintMode::from_index(bytes.read_u8()?)?;
        (Some(argb), mode)
    } else {
        (None, TintMode::default())
    };

    let strings = read_string_table(&mut bytes)?;
    let float_lists = read_float_list_table(&mut bytes, width)?;
    let images = read_images_table(&mut bytes, width)?;

    let children = data[bytes.seek()..].to_vec();

    Ok(CompactImage {
        width: image_width,
        height: image_height,
        float_width: width,
        tint_color,
        tint_mode,
        children,
        args,
        transforms,
        strings,
        float_lists,
        images,
        num_paths,
        num_paints,
    })
}
