//! ASCII encodation: the default mode and home of every latch codeword

use super::{next_codeword, DecodeState, Mode};
use crate::decoder::bitstream::BitSource;
use crate::error::DecodeError;

const PAD: u8 = 129;
const LATCH_C40: u8 = 230;
const LATCH_BASE256: u8 = 231;
const FNC1: u8 = 232;
const STRUCTURED_APPEND: u8 = 233;
const READER_PROGRAMMING: u8 = 234;
const UPPER_SHIFT: u8 = 235;
const MACRO_05: u8 = 236;
const MACRO_06: u8 = 237;
const LATCH_X12: u8 = 238;
const LATCH_TEXT: u8 = 239;
const LATCH_EDIFACT: u8 = 240;
const ECI: u8 = 241;
const UNLATCH: u8 = 254;

const GROUP_SEPARATOR: u8 = 0x1D;
const MACRO_TRAILER: &[u8] = b"\x1E\x04";

/// Decoder for ASCII codewords
pub struct AsciiDecoder;

impl AsciiDecoder {
    /// Decode ASCII codewords until a character is emitted, a latch is met,
    /// or the data runs out. Returns the next mode.
    pub fn decode(source: &mut BitSource, state: &mut DecodeState) -> Result<Mode, DecodeError> {
        let mut upper_shift = false;
        loop {
            let codeword = next_codeword(source)?;
            if upper_shift && !(1..=128).contains(&codeword) {
                return Err(DecodeError::FormatFailure(format!(
                    "upper shift followed by codeword {codeword}"
                )));
            }
            match codeword {
                0 => {
                    return Err(DecodeError::FormatFailure(
                        "codeword 0 is not valid in ASCII".to_string(),
                    ))
                }
                1..=128 => {
                    state.push(codeword as u32 - 1, &mut upper_shift);
                    return Ok(Mode::Ascii);
                }
                PAD => return Ok(Mode::Pad),
                130..=229 => {
                    let pair = codeword - 130;
                    state.bytes.push(b'0' + pair / 10);
                    state.bytes.push(b'0' + pair % 10);
                }
                LATCH_C40 => return Ok(Mode::C40),
                LATCH_BASE256 => return Ok(Mode::Base256),
                FNC1 => {
                    // FNC1 in first position marks GS1 data
                    if source.byte_offset() == 1 {
                        state.gs1 = true;
                    }
                    state.bytes.push(GROUP_SEPARATOR);
                }
                STRUCTURED_APPEND | READER_PROGRAMMING => {}
                UPPER_SHIFT => upper_shift = true,
                MACRO_05 | MACRO_06 => {
                    let version = if codeword == MACRO_05 { b"05" } else { b"06" };
                    state.bytes.extend_from_slice(b"[)>\x1E");
                    state.bytes.extend_from_slice(version);
                    state.bytes.push(GROUP_SEPARATOR);
                    state.trailer = [MACRO_TRAILER, state.trailer.as_slice()].concat();
                }
                LATCH_X12 => return Ok(Mode::AnsiX12),
                LATCH_TEXT => return Ok(Mode::Text),
                LATCH_EDIFACT => return Ok(Mode::Edifact),
                ECI => return Ok(Mode::Eci),
                // A trailing unlatch is tolerated
                UNLATCH if source.available() == 0 => {}
                _ => {
                    return Err(DecodeError::FormatFailure(format!(
                        "codeword {codeword} is not valid in ASCII"
                    )))
                }
            }
            if source.available() == 0 {
                if upper_shift {
                    return Err(DecodeError::FormatFailure(
                        "data ends after upper shift".to_string(),
                    ));
                }
                return Ok(Mode::Ascii);
            }
        }
    }

    /// ECI designator following an ECI codeword (one to three codewords)
    pub fn decode_eci(source: &mut BitSource) -> Result<u32, DecodeError> {
        let first = next_codeword(source)? as u32;
        if first <= 127 {
            return Ok(first.saturating_sub(1));
        }
        let second = next_codeword(source)? as u32;
        if first <= 191 {
            return Ok((first - 128) * 254 + 27 + second);
        }
        let third = next_codeword(source)? as u32;
        Ok((first - 192) * 64516 + 16383 + 254 * second.saturating_sub(1) + third)
    }
}
