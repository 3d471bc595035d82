//! HI7 animation decoder
//!
//! Payload layout after decompression: a 32-byte ASCII type tag, one pad
//! byte, u32le id, u16le frame count, u16le loop count, then per frame a
//! 10-byte header (width, height, posX, posY, speed, all u16le) followed by
//! `width * height` packed 15-bit pixel words.
//!
//! Decoding takes two passes. The canvas is the union bounding box of all
//! frame rectangles and is only known once every header has been seen, so
//! the first pass scans headers and skips pixel data, and the second
//! materializes each frame into a canvas-sized raster.

use std::io::Cursor;

use crate::{
    binary_utils::{read_bytes, read_u16_le, read_u32_le, seek_to},
    formats::{lzss, DecodeError},
    graphics::{palette::decode_rgb555, RasterImage},
};

/// Loop count sentinel for "repeat forever".
pub const LOOP_FOREVER: u16 = 32767;

const HEADER_LEN: u64 = 41;

#[derive(Debug)]
pub struct AnimationFrame {
    pub width: u16,
    pub height: u16,
    pub pos_x: u16,
    pub pos_y: u16,
    /// Display delay hint in milliseconds.
    pub speed: u16,
    /// Canvas-sized raster; pixels outside the frame's own box stay black.
    pub raster: RasterImage,
}

#[derive(Debug)]
pub struct Animation {
    pub kind: String,
    pub id: u32,
    pub frame_count: u16,
    pub loop_count: u16,
    /// Canvas dimensions: the union bounding box of all frame rectangles.
    pub width: u16,
    pub height: u16,
    /// Top-left of the bounding box in the original coordinate space.
    pub offset_x: u16,
    pub offset_y: u16,
    pub frames: Vec<AnimationFrame>,
    /// Per-frame position relative to the canvas origin; present only when
    /// some frame differs from the canvas rectangle. Consumers use it to
    /// anchor moving sprites whose frames are not uniformly canvas-sized.
    pub frame_offsets: Option<Vec<(u16, u16)>>,
}

impl Animation {
    pub fn loops_forever(&self) -> bool {
        self.loop_count == LOOP_FOREVER
    }
}

struct FrameHeader {
    width: u16,
    height: u16,
    pos_x: u16,
    pos_y: u16,
    speed: u16,
}

fn read_frame_header(cursor: &mut Cursor<&[u8]>) -> Result<FrameHeader, DecodeError> {
    Ok(FrameHeader {
        width: read_u16_le(cursor)?,
        height: read_u16_le(cursor)?,
        pos_x: read_u16_le(cursor)?,
        pos_y: read_u16_le(cursor)?,
        speed: read_u16_le(cursor)?,
    })
}

/// Decode a raw HI7 file (LZSS container included).
pub fn decode(data: &[u8]) -> Result<Animation, DecodeError> {
    let payload = lzss::unpack(data, true)?;
    decode_payload(&payload)
}

fn decode_payload(payload: &[u8]) -> Result<Animation, DecodeError> {
    let mut cursor = Cursor::new(payload);

    let tag = read_bytes(&mut cursor, 32)?;
    let kind = String::from_utf8_lossy(&tag)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string();
    let _pad = read_bytes(&mut cursor, 1)?;

    let id = read_u32_le(&mut cursor)?;
    let frame_count = read_u16_le(&mut cursor)?;
    let loop_count = read_u16_le(&mut cursor)?;

    if frame_count == 0 {
        return Ok(Animation {
            kind,
            id,
            frame_count,
            loop_count,
            width: 0,
            height: 0,
            offset_x: 0,
            offset_y: 0,
            frames: Vec::new(),
            frame_offsets: None,
        });
    }

    // Pass 1: union bounding box across all frame rectangles.
    let mut min_left = u32::MAX;
    let mut min_top = u32::MAX;
    let mut max_right = 0u32;
    let mut max_bottom = 0u32;

    for _ in 0..frame_count {
        let header = read_frame_header(&mut cursor)?;
        min_left = min_left.min(header.pos_x as u32);
        min_top = min_top.min(header.pos_y as u32);
        max_right = max_right.max(header.pos_x as u32 + header.width as u32);
        max_bottom = max_bottom.max(header.pos_y as u32 + header.height as u32);

        let pixel_bytes = header.width as u64 * header.height as u64 * 2;
        let frame_end = cursor.position() + pixel_bytes;
        seek_to(&mut cursor, frame_end)?;
    }

    // Frame headers are all in-range u16, but their union need not be.
    // Rejecting here keeps the blit below within the raster.
    if max_right - min_left > u16::MAX as u32 || max_bottom - min_top > u16::MAX as u32 {
        return Err(DecodeError::CanvasTooLarge {
            width: max_right - min_left,
            height: max_bottom - min_top,
        });
    }

    let canvas_width = (max_right - min_left) as u16;
    let canvas_height = (max_bottom - min_top) as u16;
    let min_left = min_left as u16;
    let min_top = min_top as u16;

    // Pass 2: materialize each frame into a canvas-sized raster.
    seek_to(&mut cursor, HEADER_LEN)?;

    let mut frames = Vec::with_capacity(frame_count as usize);
    let mut offsets = Vec::with_capacity(frame_count as usize);

    for _ in 0..frame_count {
        let header = read_frame_header(&mut cursor)?;
        let mut raster = RasterImage::filled_black(canvas_width, canvas_height);
        let origin_x = header.pos_x - min_left;
        let origin_y = header.pos_y - min_top;

        for y in 0..header.height {
            for x in 0..header.width {
                let word = read_u16_le(&mut cursor)?;
                raster.set_pixel(origin_x + x, origin_y + y, decode_rgb555(word));
            }
        }

        offsets.push((origin_x, origin_y));
        frames.push(AnimationFrame {
            width: header.width,
            height: header.height,
            pos_x: header.pos_x,
            pos_y: header.pos_y,
            speed: header.speed,
            raster,
        });
    }

    let has_offset_frames = frames.iter().any(|frame| {
        frame.width != canvas_width
            || frame.height != canvas_height
            || frame.pos_x != min_left
            || frame.pos_y != min_top
    });

    Ok(Animation {
        kind,
        id,
        frame_count,
        loop_count,
        width: canvas_width,
        height: canvas_height,
        offset_x: min_left,
        offset_y: min_top,
        frames,
        frame_offsets: has_offset_frames.then_some(offsets),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::lzss::test_support::pack_literals;

    const WHITE: u16 = 0x7FFF;

    fn push_u16(payload: &mut Vec<u8>, value: u16) {
        payload.extend_from_slice(&value.to_le_bytes());
    }

    fn header(kind: &str, id: u32, frame_count: u16, loop_count: u16) -> Vec<u8> {
        let mut payload = vec![b' '; 32];
        payload[..kind.len()].copy_from_slice(kind.as_bytes());
        payload.push(0); // pad
        payload.extend_from_slice(&id.to_le_bytes());
        push_u16(&mut payload, frame_count);
        push_u16(&mut payload, loop_count);
        payload
    }

    fn push_frame(payload: &mut Vec<u8>, rect: (u16, u16, u16, u16), speed: u16, words: &[u16]) {
        let (width, height, pos_x, pos_y) = rect;
        push_u16(payload, width);
        push_u16(payload, height);
        push_u16(payload, pos_x);
        push_u16(payload, pos_y);
        push_u16(payload, speed);
        assert_eq!(words.len(), width as usize * height as usize);
        for &word in words {
            push_u16(payload, word);
        }
    }

    #[test]
    fn computes_the_union_bounding_box_and_frame_offsets() {
        let mut payload = header("WALK", 7, 2, 3);
        push_frame(&mut payload, (2, 1, 10, 5), 100, &[WHITE, WHITE]);
        push_frame(&mut payload, (1, 1, 11, 6), 80, &[31]); // pure blue

        let anim = decode(&pack_literals(&payload)).unwrap();
        assert_eq!(anim.kind, "WALK");
        assert_eq!(anim.id, 7);
        assert_eq!(anim.frame_count, 2);
        assert_eq!((anim.width, anim.height), (2, 2));
        assert_eq!((anim.offset_x, anim.offset_y), (10, 5));
        assert_eq!(anim.frame_offsets, Some(vec![(0, 0), (1, 1)]));
        assert!(!anim.loops_forever());

        // Frame rasters are canvas-sized, positioned, and black elsewhere
        let first = &anim.frames[0];
        assert_eq!((first.raster.width, first.raster.height), (2, 2));
        assert_eq!(&first.raster.pixels[0..6], &[255, 255, 255, 255, 255, 255]);
        assert_eq!(&first.raster.pixels[6..12], &[0, 0, 0, 0, 0, 0]);

        let second = &anim.frames[1];
        assert_eq!(second.speed, 80);
        assert_eq!(&second.raster.pixels[0..9], &[0; 9]);
        assert_eq!(&second.raster.pixels[9..12], &[0, 0, 255]);
    }

    #[test]
    fn single_frame_canvas_equals_the_frame_and_offsets_are_omitted() {
        let mut payload = header("IDLE", 1, 1, LOOP_FOREVER);
        push_frame(&mut payload, (2, 2, 4, 9), 50, &[0, WHITE, WHITE, 0]);

        let anim = decode(&pack_literals(&payload)).unwrap();
        assert_eq!((anim.width, anim.height), (2, 2));
        assert_eq!((anim.offset_x, anim.offset_y), (4, 9));
        assert_eq!(anim.frame_offsets, None);
        assert!(anim.loops_forever());
    }

    #[test]
    fn loop_sentinel_only_matches_32767() {
        let mut payload = header("X", 1, 1, 32766);
        push_frame(&mut payload, (1, 1, 0, 0), 10, &[0]);
        let anim = decode(&pack_literals(&payload)).unwrap();
        assert!(!anim.loops_forever());
        assert_eq!(anim.loop_count, 32766);
    }

    #[test]
    fn type_tag_is_trimmed() {
        let mut payload = header("FIRE", 2, 1, 0);
        push_frame(&mut payload, (1, 1, 0, 0), 10, &[0]);
        let anim = decode(&pack_literals(&payload)).unwrap();
        assert_eq!(anim.kind, "FIRE");
    }

    #[test]
    fn truncated_frame_data_is_an_error() {
        let mut payload = header("WALK", 7, 2, 3);
        push_frame(&mut payload, (2, 1, 10, 5), 100, &[WHITE, WHITE]);
        // Second frame header promises pixels that never arrive
        push_u16(&mut payload, 4);
        push_u16(&mut payload, 4);
        assert!(decode(&pack_literals(&payload)).is_err());
    }

    #[test]
    fn bounding_box_wider_than_u16_is_rejected() {
        // Both headers are in-range u16, but their union spans 70000 pixels
        // and cannot be materialized on a 16-bit canvas.
        let mut payload = header("WIDE", 3, 2, 0);
        push_frame(&mut payload, (40000, 1, 0, 0), 10, &vec![0u16; 40000]);
        push_frame(&mut payload, (40000, 1, 30000, 0), 10, &vec![0u16; 40000]);

        match decode(&pack_literals(&payload)) {
            Err(DecodeError::CanvasTooLarge { width, height }) => {
                assert_eq!((width, height), (70000, 1));
            }
            other => panic!("expected CanvasTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn zero_frames_yield_an_empty_animation() {
        let payload = header("NONE", 9, 0, 0);
        let anim = decode(&pack_literals(&payload)).unwrap();
        assert_eq!(anim.frames.len(), 0);
        assert_eq!((anim.width, anim.height), (0, 0));
        assert_eq!(anim.frame_offsets, None);
    }
}
