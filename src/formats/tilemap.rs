//! ARS/PTS tile map codec
//!
//! Area maps (ARS) and path maps (PTS) share one layout: u16le width and
//! height followed by the same run-length byte stream the still images use,
//! one byte per cell. Decoded maps are persisted in a compact run form where
//! a token `v + 1000 * count` stands for `count` cells of value `v` and a
//! bare `v` stands for a single cell. The codec is symmetric: this is the
//! one format the pipeline both reads and writes.

use std::io::Cursor;

use crate::{
    binary_utils::read_u16_le,
    formats::{lzss, read_rle_stream, DecodeError},
};

const RUN_FACTOR: u32 = 1000;
const MAX_RUN: usize = 999;

#[derive(Clone, Debug, PartialEq)]
pub struct TileMap {
    pub width: u16,
    pub height: u16,
    /// Flat row-major cell values, `width * height` of them.
    pub cells: Vec<u16>,
}

impl TileMap {
    /// Run-encode the flat cell sequence. Cell values must stay below 1000
    /// or the token arithmetic would corrupt silently; runs longer than 999
    /// are split.
    pub fn to_runs(&self) -> Result<Vec<u32>, DecodeError> {
        compress_runs(&self.cells)
    }
}

/// Decode a raw ARS/PTS file (LZSS container included).
pub fn decode(data: &[u8]) -> Result<TileMap, DecodeError> {
    let payload = lzss::unpack(data, true)?;
    let mut cursor = Cursor::new(payload.as_slice());

    let width = read_u16_le(&mut cursor)?;
    let height = read_u16_le(&mut cursor)?;
    let cell_count = width as usize * height as usize;

    let raw = read_rle_stream(&mut cursor, cell_count)?;
    if raw.len() != cell_count {
        return Err(DecodeError::DimensionMismatch {
            expected: cell_count,
            actual: raw.len(),
        });
    }

    Ok(TileMap {
        width,
        height,
        cells: raw.into_iter().map(u16::from).collect(),
    })
}

/// Encode a flat cell sequence into run tokens. A maximal run of `count > 1`
/// identical values `v` becomes `v + 1000 * count`; a singleton stays `v`.
pub fn compress_runs(cells: &[u16]) -> Result<Vec<u32>, DecodeError> {
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < cells.len() {
        let value = cells[i];
        if value as u32 >= RUN_FACTOR {
            return Err(DecodeError::CellOutOfRange(value));
        }

        let mut count = 1;
        while i + count < cells.len() && cells[i + count] == value && count < MAX_RUN {
            count += 1;
        }

        if count > 1 {
            tokens.push(value as u32 + RUN_FACTOR * count as u32);
        } else {
            tokens.push(value as u32);
        }
        i += count;
    }

    Ok(tokens)
}

/// Expand run tokens back into the flat cell sequence.
pub fn expand_runs(tokens: &[u32]) -> Vec<u16> {
    let mut cells = Vec::new();
    for &token in tokens {
        if token >= RUN_FACTOR {
            let value = (token % RUN_FACTOR) as u16;
            let count = token / RUN_FACTOR;
            for _ in 0..count {
                cells.push(value);
            }
        } else {
            cells.push(token as u16);
        }
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::lzss::test_support::pack_literals;

    #[test]
    fn decodes_a_packed_map() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&3u16.to_le_bytes());
        payload.extend_from_slice(&2u16.to_le_bytes());
        payload.extend_from_slice(&[0xC4, 0x01, 0x00, 0x05]);

        let map = decode(&pack_literals(&payload)).unwrap();
        assert_eq!((map.width, map.height), (3, 2));
        assert_eq!(map.cells, vec![1, 1, 1, 1, 0, 5]);
    }

    #[test]
    fn short_cell_stream_is_an_error() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&4u16.to_le_bytes());
        payload.extend_from_slice(&4u16.to_le_bytes());
        payload.extend_from_slice(&[0xC4, 0x01]);
        assert!(decode(&pack_literals(&payload)).is_err());
    }

    #[test]
    fn runs_compress_and_singletons_stay_bare() {
        let cells = vec![5, 5, 5, 7, 0, 0, 9];
        let tokens = compress_runs(&cells).unwrap();
        assert_eq!(tokens, vec![3005, 7, 2000, 9]);
    }

    #[test]
    fn a_singleton_is_never_marked_as_a_run_of_one() {
        let tokens = compress_runs(&[4]).unwrap();
        assert_eq!(tokens, vec![4]);
    }

    #[test]
    fn round_trips_arbitrary_sequences() {
        let samples: Vec<Vec<u16>> = vec![
            vec![],
            vec![0],
            vec![0, 0, 0, 0],
            vec![1, 2, 3, 4, 5],
            vec![999, 999, 0, 999],
            (0..500).map(|i| (i / 7) as u16).collect(),
        ];
        for cells in samples {
            let tokens = compress_runs(&cells).unwrap();
            assert_eq!(expand_runs(&tokens), cells, "cells {:?}", cells);
        }
    }

    #[test]
    fn long_runs_are_split_below_the_factor() {
        let cells = vec![3u16; 2500];
        let tokens = compress_runs(&cells).unwrap();
        assert_eq!(tokens, vec![999_003, 999_003, 502_003]);
        assert_eq!(expand_runs(&tokens), cells);
    }

    #[test]
    fn cell_values_at_or_above_1000_are_rejected() {
        match compress_runs(&[1, 1000, 2]) {
            Err(DecodeError::CellOutOfRange(1000)) => {}
            other => panic!("expected CellOutOfRange, got {:?}", other),
        }
    }
}
