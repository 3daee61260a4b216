//! C40 and Text encodations (three values per codeword pair)

use super::{next_codeword, unpack_triplet, DecodeState};
use crate::decoder::bitstream::BitSource;
use crate::error::DecodeError;

const UNLATCH: u8 = 254;

const C40_BASIC: &[u8; 40] = b"*** 0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const TEXT_BASIC: &[u8; 40] = b"*** 0123456789abcdefghijklmnopqrstuvwxyz";
const SHIFT2_SET: &[u8; 27] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_";
const TEXT_SHIFT3_SET: &[u8; 32] = b"`ABCDEFGHIJKLMNOPQRSTUVWXYZ{|}~\x7F";

const SHIFT2_FNC1: u32 = 27;
const SHIFT2_UPPER_SHIFT: u32 = 30;

/// Which basic character set the segment uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSet {
    /// Upper-case letters in the basic set
    C40,
    /// Lower-case letters in the basic set
    Text,
}

impl TextSet {
    fn basic(self) -> &'static [u8; 40] {
        match self {
            TextSet::C40 => C40_BASIC,
            TextSet::Text => TEXT_BASIC,
        }
    }

    fn shift3(self, value: u32) -> Option<u32> {
        match self {
            TextSet::C40 => Some(value + 96),
            TextSet::Text => TEXT_SHIFT3_SET.get(value as usize).map(|&c| c as u32),
        }
    }
}

/// Decoder for C40 and Text segments
pub struct C40TextDecoder;

impl C40TextDecoder {
    /// Decode value triplets in `set` until unlatch or end of data
    pub fn decode(
        source: &mut BitSource,
        state: &mut DecodeState,
        set: TextSet,
    ) -> Result<(), DecodeError> {
        let mut upper_shift = false;
        let mut shift = 0u8;

        loop {
            // A lone trailing codeword is read back in ASCII
            if source.available() == 8 {
                return Ok(());
            }
            let first = next_codeword(source)?;
            if first == UNLATCH {
                return Ok(());
            }
            let second = next_codeword(source)?;

            for value in unpack_triplet(first, second) {
                match shift {
                    0 => {
                        if value < 3 {
                            shift = value as u8 + 1;
                        } else {
                            let c = set.basic().get(value as usize).ok_or_else(|| {
                                DecodeError::FormatFailure(format!("invalid value {value}"))
                            })?;
                            state.push(*c as u32, &mut upper_shift);
                        }
                    }
                    1 => {
                        state.push(value, &mut upper_shift);
                        shift = 0;
                    }
                    2 => {
                        if let Some(&c) = SHIFT2_SET.get(value as usize) {
                            state.push(c as u32, &mut upper_shift);
                        } else if value == SHIFT2_FNC1 {
                            state.bytes.push(0x1D);
                        } else if value == SHIFT2_UPPER_SHIFT {
                            upper_shift = true;
                        } else {
                            return Err(DecodeError::FormatFailure(format!(
                                "invalid shift 2 value {value}"
                            )));
                        }
                        shift = 0;
                    }
                    _ => {
                        let c = set.shift3(value).ok_or_else(|| {
                            DecodeError::FormatFailure(format!("invalid shift 3 value {value}"))
                        })?;
                        state.push(c, &mut upper_shift);
                        shift = 0;
                    }
                }
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

    /// Pack three values the way an encoder would
    fn pair(a: u32, b: u32, c: u32) -> [u8; 2] {
        let v = 1600 * a + 40 * b + c + 1;
        [(v >> 8) as u8, (v & 0xFF) as u8]
    }

    #[test]
    fn test_c40_basic_set() {
        let content = decode_codewords(&[230, 89, 233]).unwrap();
        assert_eq!(content.bytes, b"ABC");
    }

    #[test]
    fn test_text_is_lower_case() {
        let [a, b] = pair(14, 15, 16);
        let content = decode_codewords(&[239, a, b]).unwrap();
        assert_eq!(content.bytes, b"abc");
    }

    #[test]
    fn test_shift_sets() {
        // Shift 2 '!', shift 1 raw 0x07, shift 3 (C40) value 1 -> 'a', then spaces
        let [a, b] = pair(1, 0, 0);
        let [c, d] = pair(7, 2, 1);
        let [e, f] = pair(3, 3, 3);
        let content = decode_codewords(&[230, a, b, c, d, e, f, 254]).unwrap();
        assert_eq!(content.bytes, b"!\x07a   ");
    }

    #[test]
    fn test_upper_shift_and_fnc1() {
        // Shift 2 upper shift, then 'A'; shift 2 FNC1
        let [a, b] = pair(1, 30, 14);
        let [c, d] = pair(1, 27, 3);
        let content = decode_codewords(&[230, a, b, c, d]).unwrap();
        assert_eq!(content.bytes, vec![0xC1, 0x1D, b' ']);
    }

    #[test]
    fn test_lone_trailing_codeword_is_ascii() {
        // C40 "ABC" followed by one codeword: ASCII 'B'
        let content = decode_codewords(&[230, 89, 233, 67]).unwrap();
        assert_eq!(content.bytes, b"ABCB");
    }

    #[test]
    fn test_invalid_shift2_value() {
        let [a, b] = pair(1, 28, 3);
        assert!(decode_codewords(&[230, a, b]).is_err());
    }
}
