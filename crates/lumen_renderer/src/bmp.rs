//! 32-bit BMP encoder.
//!
//! Writes a 14-byte file header, a 40-byte BITMAPINFOHEADER and the file
//! buffer of a [`Frame`] as is: BGRA pixels, bottom row first.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{RenderError, RenderResult};
use crate::frame::Frame;

const FILE_HEADER_SIZE: u32 = 14;
const INFO_HEADER_SIZE: u32 = 40;
const BITS_PER_PIXEL: u16 = 32;
/// 72 DPI
const PIXELS_PER_METER: i32 = 2835;

/// Encode `frame` as a BMP into `writer`.
pub fn write_bmp<W: Write>(frame: &Frame, writer: &mut W) -> RenderResult<()> {
    if frame.is_empty() {
        return Err(RenderError::EmptyFrame {
            width: frame.width(),
            height: frame.height(),
        });
    }

    let pixels = frame.file_bytes();
    let offset = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
    let image_size = pixels.len() as u32;

    // File header
    writer.write_all(b"BM")?;
    writer.write_u32::<LittleEndian>(offset + image_size)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u16::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(offset)?;

    // Info header. Positive height means bottom-up rows.
    writer.write_u32::<LittleEndian>(INFO_HEADER_SIZE)?;
    writer.write_i32::<LittleEndian>(frame.width() as i32)?;
    writer.write_i32::<LittleEndian>(frame.height() as i32)?;
    writer.write_u16::<LittleEndian>(1)?;
    writer.write_u16::<LittleEndian>(BITS_PER_PIXEL)?;
    writer.write_u32::<LittleEndian>(0)?; // BI_RGB
    writer.write_u32::<LittleEndian>(image_size)?;
    writer.write_i32::<LittleEndian>(PIXELS_PER_METER)?;
    writer.write_i32::<LittleEndian>(PIXELS_PER_METER)?;
    writer.write_u32::<LittleEndian>(0)?;
    writer.write_u32::<LittleEndian>(0)?;

    // 4 bytes per pixel, rows are already 4-byte aligned
    writer.write_all(pixels)?;
    Ok(())
}

/// Write `frame` to a BMP file at `path`.
pub fn save_bmp(frame: &Frame, path: impl AsRef<Path>) -> RenderResult<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    write_bmp(frame, &mut writer)?;
    writer.flush()?;
    log::debug!("Wrote {}x{} BMP to {:?}", frame.width(), frame.height(), path);
    Ok(())
}
