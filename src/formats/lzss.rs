//! SAF4 container decompression
//!
//! Classic LZSS over a 4096-byte ring dictionary: a rolling flag word is
//! consumed one bit at a time (LSB first) to distinguish literal bytes from
//! 12-bit-offset back-references. The stream has no end marker; it simply
//! runs to the end of the input.

use std::io::Cursor;

use crate::{
    binary_utils::{read_u32_be, OutputBuffer},
    formats::{DecodeError, SAF4_MAGIC},
};

const DICT_SIZE: usize = 4096;
const MAX_MATCH_LEN: usize = 18;
const THRESHOLD: usize = 2;

/// Decompress a SAF4 LZSS stream. `check_magic` validates and skips the
/// 4-byte big-endian magic number ahead of the compressed data.
pub fn unpack(input: &[u8], check_magic: bool) -> Result<Vec<u8>, DecodeError> {
    Decompressor::new(input).run(check_magic)
}

struct Decompressor<'a> {
    input: &'a [u8],
    cursor: usize,
    dict: [u8; DICT_SIZE],
    write_pos: usize,
    // Low byte holds pending literal/back-reference flags; the 0xFF00 mask
    // doubles as the bits-remaining sentinel.
    flags: u16,
    output: OutputBuffer,
}

impl<'a> Decompressor<'a> {
    fn new(input: &'a [u8]) -> Self {
        Decompressor {
            input,
            cursor: 0,
            dict: [0u8; DICT_SIZE],
            write_pos: DICT_SIZE - MAX_MATCH_LEN,
            flags: 0,
            output: OutputBuffer::with_initial_capacity(input.len()),
        }
    }

    fn run(mut self, check_magic: bool) -> Result<Vec<u8>, DecodeError> {
        if check_magic {
            let mut cursor = Cursor::new(self.input);
            let magic = read_u32_be(&mut cursor)?;
            if magic != SAF4_MAGIC {
                return Err(DecodeError::BadMagic(magic));
            }
            self.cursor = 4;
        }

        while self.cursor < self.input.len() {
            self.flags >>= 1;
            if self.flags & 0x100 == 0 {
                self.flags = self.next_byte()? as u16 | 0xFF00;
            }

            if self.flags & 1 != 0 {
                let byte = self.next_byte()?;
                self.emit(byte);
            } else {
                let lo = self.next_byte()? as usize;
                let hi = self.next_byte()? as usize;
                let offset = lo | ((hi & 0xF0) << 4);
                let length = (hi & 0x0F) + THRESHOLD;

                // Byte-at-a-time so that a match may read bytes it is
                // writing in the same operation.
                for k in 0..=length {
                    let byte = self.dict[(offset + k) & (DICT_SIZE - 1)];
                    self.emit(byte);
                }
            }
        }

        Ok(self.output.into_bytes())
    }

    fn next_byte(&mut self) -> Result<u8, DecodeError> {
        if self.cursor >= self.input.len() {
            return Err(DecodeError::Truncated {
                offset: self.cursor,
                needed: 1,
            });
        }
        let byte = self.input[self.cursor];
        self.cursor += 1;
        Ok(byte)
    }

    fn emit(&mut self, byte: u8) {
        self.dict[self.write_pos] = byte;
        self.write_pos = (self.write_pos + 1) & (DICT_SIZE - 1);
        self.output.push(byte);
    }
}
