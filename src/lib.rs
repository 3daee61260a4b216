//! RustDM - polarity-invariant DataMatrix (ECC200) scanning
//!
//! Finds and decodes ECC200 DataMatrix symbols in still frames, whether the
//! modules are dark on a light label or light on a dark one (laser-etched
//! metal, inverted print). Each frame runs through six stages:
//!
//! 1. [`detector::normalizer`]: pixels to intensities, background tone
//! 2. [`detector::polarity`]: which orientations to try, in which order
//! 3. [`detector::locator`]: the solid "L" finder and its clock tracks
//! 4. [`detector::sampler`]: symbol size and module grid
//! 5. [`decoder`]: placement, Reed-Solomon, data encodations
//! 6. [`formatter`]: display string with control characters escaped
//!
//! ```no_run
//! use rust_dm::{Frame, ScanConfig, ScanSession};
//! use std::time::Duration;
//!
//! let mut session = ScanSession::new(ScanConfig::default());
//! let frame = Frame::gray(640, 480, vec![0u8; 640 * 480], Duration::ZERO);
//! if let Some(payload) = session.scan(&frame).outcome.payload() {
//!     println!("{}", payload.display());
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scanner configuration and environment overrides
pub mod config;
/// ECC200 decoding modules (placement, error correction, data modes)
pub mod decoder;
/// DataMatrix detection modules (normalization, polarity, finder, sampling)
pub mod detector;
/// ECC200 symbol generator and renderer
pub mod encoder;
/// Error types
pub mod error;
/// Payload display formatting
pub mod formatter;
/// Core data structures (Frame, ModuleMatrix, DecodedPayload, etc.)
pub mod models;
/// Stage wiring and scan sessions
pub mod pipeline;
/// Image-file helpers for the CLI and benches
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::{PolarityMode, ScanConfig};
pub use decoder::MatrixDecoder;
pub use error::{ConfigError, DecodeError, EncodeError, ScanError};
pub use formatter::format_payload;
pub use models::{
    BitMatrix, Candidate, DecodedPayload, FailureKind, Frame, FrameReport, ModuleMatrix,
    PixelFormat, Point, Polarity, PolarityHint, ScanOutcome, SymbolShape, SymbolSize,
};
pub use pipeline::{Pipeline, ScanSession};

/// Scan a single frame with the default configuration and no prior hint
///
/// # Arguments
/// * `frame` - Frame in any supported pixel format
///
/// # Returns
/// Report with the decoded payload, `NoSymbolFound`, or the failing stage
pub fn scan(frame: &Frame) -> FrameReport {
    Pipeline::default().run(frame, &PolarityHint::new())
}

/// Decode an already sampled module matrix
pub fn decode_matrix(matrix: &ModuleMatrix) -> Result<DecodedPayload, DecodeError> {
    MatrixDecoder::decode(matrix)
}
