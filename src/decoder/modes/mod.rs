//! ECC200 data encodation decoders
//!
//! The data codewords start in ASCII mode. ASCII latch codewords switch to
//! one of the other encodations, which run until they unlatch (or the data
//! ends) and hand control back to ASCII:
//! - ASCII: single characters, digit pairs, shifts and control codewords
//! - C40 / Text: three values per codeword pair, upper- or lower-case biased
//! - ANSI X12: three values per codeword pair, restricted set
//! - EDIFACT: four 6-bit values per three codewords
//! - Base 256: length-prefixed, randomized raw bytes

/// ASCII encodation
pub mod ascii;
/// Base 256 encodation
pub mod base256;
/// C40 and Text encodations
pub mod c40_text;
/// EDIFACT encodation
pub mod edifact;
/// ANSI X12 encodation
pub mod x12;

use crate::decoder::bitstream::BitSource;
use crate::error::DecodeError;

use ascii::AsciiDecoder;
use base256::Base256Decoder;
use c40_text::{C40TextDecoder, TextSet};
use edifact::EdifactDecoder;
use x12::X12Decoder;

/// Encodation selected by the last latch codeword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Pad codeword reached, decoding ends
    Pad,
    /// ASCII (initial mode)
    Ascii,
    /// C40 (latch 230)
    C40,
    /// Text (latch 239)
    Text,
    /// ANSI X12 (latch 238)
    AnsiX12,
    /// EDIFACT (latch 240)
    Edifact,
    /// Base 256 (latch 231)
    Base256,
    /// ECI designator follows (241)
    Eci,
}

/// Decoded content of the data codewords
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataContent {
    /// Decoded bytes, trailer included
    pub bytes: Vec<u8>,
    /// First data codeword was FNC1
    pub gs1: bool,
    /// Last ECI designator seen, if any
    pub eci: Option<u32>,
}

/// Output accumulated while walking the segments
#[derive(Debug, Default)]
pub struct DecodeState {
    /// Bytes emitted so far
    pub bytes: Vec<u8>,
    /// Appended after the last segment (macro 05/06 trailer)
    pub trailer: Vec<u8>,
    /// FNC1 seen in first position
    pub gs1: bool,
    /// Last ECI designator
    pub eci: Option<u32>,
}

impl DecodeState {
    /// Append a character, adding 128 when an upper shift is pending
    pub fn push(&mut self, value: u32, upper_shift: &mut bool) {
        let value = if std::mem::take(upper_shift) {
            value + 128
        } else {
            value
        };
        self.bytes.push(value as u8);
    }
}

/// Decode corrected data codewords into bytes
pub fn decode_codewords(data: &[u8]) -> Result<DataContent, DecodeError> {
    let mut source = BitSource::new(data);
    let mut state = DecodeState::default();
    let mut mode = Mode::Ascii;

    loop {
        mode = match mode {
            Mode::Ascii => AsciiDecoder::decode(&mut source, &mut state)?,
            Mode::C40 => {
                C40TextDecoder::decode(&mut source, &mut state, TextSet::C40)?;
                Mode::Ascii
            }
            Mode::Text => {
                C40TextDecoder::decode(&mut source, &mut state, TextSet::Text)?;
                Mode::Ascii
            }
            Mode::AnsiX12 => {
                X12Decoder::decode(&mut source, &mut state)?;
                Mode::Ascii
            }
            Mode::Edifact => {
                EdifactDecoder::decode(&mut source, &mut state)?;
                Mode::Ascii
            }
            Mode::Base256 => {
                Base256Decoder::decode(&mut source, &mut state)?;
                Mode::Ascii
            }
            Mode::Eci => {
                state.eci = Some(AsciiDecoder::decode_eci(&mut source)?);
                Mode::Ascii
            }
            Mode::Pad => Mode::Pad,
        };
        if mode == Mode::Pad || source.available() == 0 {
            break;
        }
    }

    let DecodeState {
        mut bytes,
        trailer,
        gs1,
        eci,
    } = state;
    bytes.extend_from_slice(&trailer);
    Ok(DataContent { bytes, gs1, eci })
}

/// Next whole codeword, failing if the data ends mid-segment
pub(crate) fn next_codeword(source: &mut BitSource) -> Result<u8, DecodeError> {
    source
        .read_u8()
        .ok_or_else(|| DecodeError::FormatFailure("data ends inside a segment".to_string()))
}

/// Unpack the three base-40 values carried by a codeword pair
pub(crate) fn unpack_triplet(first: u8, second: u8) -> [u32; 3] {
    let full = (((first as u32) << 8) + second as u32).saturating_sub(1);
    [full / 1600, (full / 40) % 40, full % 40]
}
