//! Base 256 encodation (length-prefixed raw bytes, 255-state randomized)

use super::{next_codeword, DecodeState};
use crate::decoder::bitstream::BitSource;
use crate::error::DecodeError;

/// Undo the 255-state randomization of the codeword at 1-based `position`
pub fn unrandomize(codeword: u8, position: usize) -> u8 {
    let pseudo_random = ((149 * position) % 255) + 1;
    (codeword as usize + 256 - pseudo_random) as u8
}

/// Decoder for one Base 256 segment
pub struct Base256Decoder;

impl Base256Decoder {
    /// Read the length field and copy the unrandomized bytes
    pub fn decode(source: &mut BitSource, state: &mut DecodeState) -> Result<(), DecodeError> {
        let mut position = 1 + source.byte_offset();
        let mut next = |source: &mut BitSource| -> Result<u8, DecodeError> {
            let value = unrandomize(next_codeword(source)?, position);
            position += 1;
            Ok(value)
        };

        let d1 = next(source)? as usize;
        let count = match d1 {
            0 => source.available() / 8,
            1..=249 => d1,
            _ => 250 * (d1 - 249) + next(source)? as usize,
        };

        state.bytes.reserve(count);
        for _ in 0..count {
            let byte = next(source)?;
            state.bytes.push(byte);
        }
        Ok(())
    }
}
