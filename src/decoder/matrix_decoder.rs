//! ECC200 matrix decoder: codeword extraction, error correction and data decoding

use tracing::{debug, trace};

use crate::decoder::blocks::deinterleave;
use crate::decoder::blocks::merge_data;
use crate::decoder::modes::decode_codewords;
use crate::decoder::placement::Placement;
use crate::decoder::reed_solomon::ReedSolomonDecoder;
use crate::error::DecodeError;
use crate::models::{DecodedPayload, ModuleMatrix};

/// Turns a sampled module matrix into payload bytes
pub struct MatrixDecoder;

impl MatrixDecoder {
    /// Decode a module matrix.
    ///
    /// Every Reed-Solomon block is corrected independently; any block beyond
    /// its capacity fails the whole symbol with
    /// [`DecodeError::ChecksumFailure`]. The returned payload carries no
    /// polarity, the pipeline fills it in.
    pub fn decode(matrix: &ModuleMatrix) -> Result<DecodedPayload, DecodeError> {
        let size = matrix.size();
        trace!(
            symbol = %size,
            finder = matrix.finder_pattern_agreement(),
            "reading codewords"
        );
        let codewords = Placement::for_size(size).read(matrix);
        let mut blocks = deinterleave(size, &codewords);

        let rs = ReedSolomonDecoder::new(size.ecc_per_block());
        let mut corrected_codewords = 0;
        for (index, block) in blocks.iter_mut().enumerate() {
            match rs.decode(&mut block.codewords) {
                Ok(corrected) => corrected_codewords += corrected,
                Err(reason) => {
                    debug!(symbol = %size, block = index, reason, "block uncorrectable");
                    return Err(DecodeError::ChecksumFailure { block: index });
                }
            }
        }

        let data = merge_data(size, &blocks);
        let content = decode_codewords(&data)?;
        debug!(
            symbol = %size,
            corrected_codewords,
            bytes = content.bytes.len(),
            gs1 = content.gs1,
            "decoded module matrix"
        );

        Ok(DecodedPayload {
            bytes: content.bytes,
            symbol: size,
            polarity: None,
            gs1: content.gs1,
            eci: content.eci,
            corrected_codewords,
        })
    }
}
