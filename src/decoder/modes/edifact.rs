//! EDIFACT encodation: four 6-bit values per three codewords

use super::DecodeState;
use crate::decoder::bitstream::BitSource;
use crate::error::DecodeError;

const UNLATCH: u32 = 0x1F;

/// Decoder for EDIFACT segments
pub struct EdifactDecoder;

impl EdifactDecoder {
    /// Decode 6-bit values until the unlatch value or end of data
    pub fn decode(source: &mut BitSource, state: &mut DecodeState) -> Result<(), DecodeError> {
        loop {
            // Two codewords or fewer left are read back in ASCII
            if source.available() <= 16 {
                return Ok(());
            }

            for _ in 0..4 {
                let value = source.read_bits(6).ok_or_else(|| {
                    DecodeError::FormatFailure("EDIFACT segment is truncated".to_string())
                })?;
                if value == UNLATCH {
                    source.align();
                    return Ok(());
                }
                // Values 0..=31 stand for 0x40..=0x5F
                let c = if value & 0x20 == 0 { value | 0x40 } else { value };
                state.bytes.push(c as u8);
            }

            if source.available() == 0 {
                return Ok(());
            }
        }
    }
}
