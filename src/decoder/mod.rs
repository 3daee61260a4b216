//! ECC200 decoding modules
//!
//! This module contains all the logic for decoding a sampled module matrix:
//! - Codeword placement (utah walk and corner shapes)
//! - Reed-Solomon block interleaving and error correction
//! - Data encodation decoding (ASCII, C40, Text, X12, EDIFACT, Base 256)

/// Bit reader over data codewords
pub mod bitstream;
/// Reed-Solomon block interleaving
pub mod blocks;
/// Matrix decoder that orchestrates the decoding pipeline
pub mod matrix_decoder;
/// Data encodation decoders
pub mod modes;
/// Codeword placement in the mapping matrix
pub mod placement;
/// Reed-Solomon error correction
pub mod reed_solomon;

pub use matrix_decoder::MatrixDecoder;
