//! ANSI X12 encodation: CR, '*', '>', space, digits and upper-case letters

use super::{next_codeword, unpack_triplet, DecodeState};
use crate::decoder::bitstream::BitSource;
use crate::error::DecodeError;

const UNLATCH: u8 = 254;

/// Decoder for ANSI X12 segments
pub struct X12Decoder;

impl X12Decoder {
    /// Decode value triplets until unlatch or end of data
    pub fn decode(source: &mut BitSource, state: &mut DecodeState) -> Result<(), DecodeError> {
        loop {
            if source.available() == 8 {
                return Ok(());
            }
            let first = next_codeword(source)?;
            if first == UNLATCH {
                return Ok(());
            }
            let second = next_codeword(source)?;

            for value in unpack_triplet(first, second) {
                let c = match value {
                    0 => b'\r',
                    1 => b'*',
                    2 => b'>',
                    3 => b' ',
                    4..=13 => b'0' + (value - 4) as u8,
                    14..=39 => b'A' + (value - 14) as u8,
                    _ => {
                        return Err(DecodeError::FormatFailure(format!(
                            "invalid X12 value {value}"
                        )))
                    }
                };
                state.bytes.push(c);
            }

            if source.available() == 0 {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::decoder::modes::decode_codewords;

    #[test]
    fn test_x12_values() {
        // (0, 1, 2) and (3, 13, 39) packed as 1600a + 40b + c + 1
        let first: u32 = 43;
        let second: u32 = 5360;
        let content = decode_codewords(&[
            238,
            (first >> 8) as u8,
            (first & 0xFF) as u8,
            (second >> 8) as u8,
            (second & 0xFF) as u8,
        ])
        .unwrap();
        assert_eq!(content.bytes, b"\r*> 9Z");
    }

    #[test]
    fn test_unlatch_returns_to_ascii() {
        // "ABC" then unlatch and ASCII 'a'
        let content = decode_codewords(&[238, 89, 233, 254, 98]).unwrap();
        assert_eq!(content.bytes, b"ABCa");
    }
}
