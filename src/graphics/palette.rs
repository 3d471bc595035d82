//! 5-bit colour conversion
//!
//! Two 5-bit-per-channel representations appear in the assets: still images
//! carry a 256-entry byte-triplet palette, animations store raw packed
//! 15-bit words per pixel. The triplet path scales to 8 bits with rounding,
//! the packed path truncates. Both behaviours are load-bearing for
//! pixel-exact output and must not be unified.

use std::io::{self, Cursor};

use crate::binary_utils::read_u8;

pub const PALETTE_SIZE: usize = 256;

/// 5-bit-per-channel palette entry (each channel 0-31).
#[derive(Clone, Copy, Debug, Default)]
pub struct Rgb5 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb5 {
    /// Expand to 8-bit RGB with rounding, so 0 maps to 0 and 31 to 255.
    pub fn to_rgb8(self) -> [u8; 3] {
        [scale_rounded(self.r), scale_rounded(self.g), scale_rounded(self.b)]
    }
}

fn scale_rounded(channel: u8) -> u8 {
    ((channel as u32 * 255 + 15) / 31) as u8
}

/// Fixed 256-slot palette as stored ahead of a still image's pixel data.
pub struct Palette {
    entries: [Rgb5; PALETTE_SIZE],
}

impl Palette {
    /// Parse 256 contiguous byte triplets. Stored channel bytes are divided
    /// by 8 down to the 5-bit range on load.
    pub fn parse(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let mut entries = [Rgb5::default(); PALETTE_SIZE];
        for entry in &mut entries {
            *entry = Rgb5 {
                r: read_u8(cursor)? / 8,
                g: read_u8(cursor)? / 8,
                b: read_u8(cursor)? / 8,
            };
        }
        Ok(Palette { entries })
    }

    pub fn color(&self, index: u8) -> [u8; 3] {
        self.entries[index as usize].to_rgb8()
    }
}

/// Decode a packed 15-bit colour word: red in bits 10-14, green in 5-9,
/// blue in 0-4, bit 15 unused. Channel scaling truncates.
pub fn decode_rgb555(word: u16) -> [u8; 3] {
    let r = ((word >> 10) & 0x1F) as u32;
    let g = ((word >> 5) & 0x1F) as u32;
    let b = (word & 0x1F) as u32;
    [
        (r * 255 / 31) as u8,
        (g * 255 / 31) as u8,
        (b * 255 / 31) as u8,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounded_scale_covers_full_range() {
        assert_eq!(scale_rounded(0), 0);
        assert_eq!(scale_rounded(31), 255);
        for c in 0..=31u8 {
            let exact = c as f64 * 255.0 / 31.0;
            assert_eq!(scale_rounded(c), exact.round() as u8);
        }
    }

    #[test]
    fn packed_path_truncates_where_triplet_path_rounds() {
        // 3 * 255 / 31 = 24.67...: the triplet path rounds up, the packed
        // path truncates.
        assert_eq!(scale_rounded(3), 25);
        let [r, _, _] = decode_rgb555(3 << 10);
        assert_eq!(r, 24);
    }

    #[test]
    fn rgb555_fields_are_extracted_from_the_right_bits() {
        let word = (31 << 10) | (16 << 5) | 1;
        assert_eq!(decode_rgb555(word), [255, 131, 8]);
        // Bit 15 is ignored
        assert_eq!(decode_rgb555(word | 0x8000), [255, 131, 8]);
        assert_eq!(decode_rgb555(0), [0, 0, 0]);
    }

    #[test]
    fn palette_parse_divides_stored_bytes_by_8() {
        let mut data = vec![0u8; PALETTE_SIZE * 3];
        data[3] = 248; // entry 1, red
        data[4] = 125; // entry 1, green -> 15 -> 123
        let mut cursor = Cursor::new(data.as_slice());
        let palette = Palette::parse(&mut cursor).unwrap();
        assert_eq!(palette.color(0), [0, 0, 0]);
        assert_eq!(palette.color(1), [255, 123, 0]);
    }

    #[test]
    fn palette_parse_requires_768_bytes() {
        let data = vec![0u8; 100];
        let mut cursor = Cursor::new(data.as_slice());
        assert!(Palette::parse(&mut cursor).is_err());
    }
}
