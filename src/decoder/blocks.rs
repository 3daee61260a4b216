//! Reed-Solomon block interleaving.
//!
//! Codeword `n` of the symbol stream belongs to block `n % B` at index `n / B`,
//! where each block holds its data codewords followed by its ECC codewords.
//! Blocks of one symbol only differ in data length (144x144 has eight blocks
//! of 156 and two of 155).

use crate::models::SymbolSize;

/// One Reed-Solomon block: data followed by ECC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Data codewords followed by ECC codewords
    pub codewords: Vec<u8>,
    /// Number of leading data codewords
    pub num_data: usize,
}

impl Block {
    /// Data part of the block
    pub fn data(&self) -> &[u8] {
        &self.codewords[..self.num_data]
    }
}

/// Data codewords carried by block `index`
pub fn block_data_len(size: SymbolSize, index: usize) -> usize {
    let blocks = size.blocks();
    (size.data_codewords() + blocks - 1 - index) / blocks
}

/// Split a symbol's codeword stream into its blocks
pub fn deinterleave(size: SymbolSize, stream: &[u8]) -> Vec<Block> {
    let count = size.blocks();
    let mut blocks: Vec<Block> = (0..count)
        .map(|b| {
            let num_data = block_data_len(size, b);
            Block {
                codewords: Vec::with_capacity(num_data + size.ecc_per_block()),
                num_data,
            }
        })
        .collect();
    for (n, &codeword) in stream.iter().enumerate() {
        blocks[n % count].codewords.push(codeword);
    }
    blocks
}

/// Merge the corrected data of every block back into stream order
pub fn merge_data(size: SymbolSize, blocks: &[Block]) -> Vec<u8> {
    let count = blocks.len();
    (0..size.data_codewords())
        .map(|n| blocks[n % count].codewords[n / count])
        .collect()
}

/// Interleave whole blocks into a symbol codeword stream
pub fn interleave(size: SymbolSize, blocks: &[Block]) -> Vec<u8> {
    let count = blocks.len();
    (0..size.total_codewords())
        .map(|n| blocks[n % count].codewords[n / count])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_symbol_block_lengths() {
        let size = SymbolSize::from_dimensions(144, 144).unwrap();
        let lengths: Vec<usize> = (0..10).map(|b| block_data_len(size, b)).collect();
        assert_eq!(lengths, vec![156, 156, 156, 156, 156, 156, 156, 156, 155, 155]);
        assert_eq!(lengths.iter().sum::<usize>(), size.data_codewords());

        let stream: Vec<u8> = (0..size.total_codewords()).map(|n| (n % 251) as u8).collect();
        let blocks = deinterleave(size, &stream);
        // First ECC codeword of the stream is the first ECC of the first short block
        assert_eq!(blocks[8].codewords[155], stream[1558]);
        assert!(blocks.iter().all(|b| b.codewords.len() == b.num_data + 62));
        assert_eq!(interleave(size, &blocks), stream);
        assert_eq!(merge_data(size, &blocks), &stream[..1558]);
    }

    #[test]
    fn test_single_block_is_identity() {
        let size = SymbolSize::from_dimensions(10, 10).unwrap();
        let stream = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let blocks = deinterleave(size, &stream);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].data(), &[1, 2, 3]);
        assert_eq!(merge_data(size, &blocks), vec![1, 2, 3]);
    }
}
