//! IM7 still image decoder
//!
//! Payload layout after decompression: 256 byte-triplet palette entries,
//! u16le width, u16le height, then a run-length-encoded stream of palette
//! indices covering exactly `width * height` pixels.

use std::io::Cursor;

use crate::{
    binary_utils::read_u16_le,
    formats::{lzss, read_rle_stream, DecodeError},
    graphics::{palette::Palette, RasterImage},
};

/// Decode a raw IM7 file (LZSS container included) into an RGB raster.
pub fn decode(data: &[u8]) -> Result<RasterImage, DecodeError> {
    let payload = lzss::unpack(data, true)?;
    decode_payload(&payload)
}

fn decode_payload(payload: &[u8]) -> Result<RasterImage, DecodeError> {
    let mut cursor = Cursor::new(payload);
    let palette = Palette::parse(&mut cursor)?;

    let width = read_u16_le(&mut cursor)?;
    let height = read_u16_le(&mut cursor)?;
    let pixel_count = width as usize * height as usize;

    let indices = read_rle_stream(&mut cursor, pixel_count)?;
    if indices.len() != pixel_count {
        return Err(DecodeError::DimensionMismatch {
            expected: pixel_count,
            actual: indices.len(),
        });
    }

    let mut pixels = Vec::with_capacity(pixel_count * 3);
    for index in indices {
        pixels.extend_from_slice(&palette.color(index));
    }

    Ok(RasterImage {
        width,
        height,
        pixels,
    })
}
