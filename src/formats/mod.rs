//! Decoders for the SAF4 asset formats
//!
//! Every asset file (IM7 still images, HI7 animations, ARS area maps and PTS
//! path maps) is wrapped in the same LZSS container, identified by a
//! big-endian "SAF4" magic number. The payload layout then depends on the
//! file extension.

use std::{fmt, io, io::Cursor};

use crate::binary_utils::read_u8;

pub mod animation;
pub mod image;
pub mod lzss;
pub mod tilemap;

/// "SAF4", stored big-endian ahead of the compressed stream.
pub const SAF4_MAGIC: u32 = 0x5341_4634;

/// Error type for asset decoding
#[derive(Debug)]
pub enum DecodeError {
    /// Leading magic number does not identify a SAF4 container
    BadMagic(u32),
    /// A read would run past the end of the available input
    Truncated { offset: usize, needed: usize },
    /// Decoded pixel/cell count does not match the declared dimensions
    DimensionMismatch { expected: usize, actual: usize },
    /// Cell value too large for the run encoding to represent
    CellOutOfRange(u16),
    /// Animation bounding box does not fit 16-bit canvas coordinates
    CanvasTooLarge { width: u32, height: u32 },
    /// I/O error
    Io(io::Error),
}

impl From<io::Error> for DecodeError {
    fn from(err: io::Error) -> Self {
        DecodeError::Io(err)
    }
}

impl From<DecodeError> for io::Error {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::Io(err) => err,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::BadMagic(found) => {
                write!(f, "Bad magic number {:#010x}, expected {:#010x}", found, SAF4_MAGIC)
            }
            DecodeError::Truncated { offset, needed } => {
                write!(f, "Input truncated: needed {} byte(s) at offset {}", needed, offset)
            }
            DecodeError::DimensionMismatch { expected, actual } => {
                write!(f, "Decoded {} element(s), dimensions declare {}", actual, expected)
            }
            DecodeError::CellOutOfRange(value) => {
                write!(f, "Cell value {} exceeds the run encoding range (max 999)", value)
            }
            DecodeError::CanvasTooLarge { width, height } => {
                write!(f, "Animation canvas {}x{} exceeds 16-bit dimensions", width, height)
            }
            DecodeError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Read a run-length-encoded byte stream until exactly `target` values have
/// been produced. A byte with its two high bits set is a run marker: the low
/// six bits give the count and the following byte the repeated value. Any
/// other byte stands for itself. Shared by the still-image pixel stream and
/// the tile map cell stream.
///
/// A run crossing the `target` boundary is clamped; trailing input past the
/// last needed value is left unread.
pub fn read_rle_stream(cursor: &mut Cursor<&[u8]>, target: usize) -> Result<Vec<u8>, DecodeError> {
    let mut values = Vec::with_capacity(target);

    while values.len() < target {
        let byte = read_u8(cursor)?;
        if byte & 0xC0 == 0xC0 {
            let count = (byte & 0x3F) as usize;
            let value = read_u8(cursor)?;
            let emitted = count.min(target - values.len());
            for _ in 0..emitted {
                values.push(value);
            }
        } else {
            values.push(byte);
        }
    }

    Ok(values)
}
