//! Data types shared by the detector and decoder stages

/// Located finder candidates
pub mod candidate;
/// Input frames and pixel formats
pub mod frame;
/// Intensity and ink grids
pub mod grid;
/// Packed bit matrix
pub mod matrix;
/// Sampled symbol grids
pub mod module_matrix;
/// Decode results and per-frame reports
pub mod payload;
/// Sub-pixel points
pub mod point;
/// Polarity and the session hint
pub mod polarity;
/// ECC200 symbol sizes
pub mod symbol;

pub use candidate::Candidate;
pub use frame::{Frame, PixelFormat};
pub use grid::{InkGrid, IntensityGrid};
pub use matrix::BitMatrix;
pub use module_matrix::ModuleMatrix;
pub use payload::{DecodedPayload, FailureKind, FrameReport, ScanOutcome};
pub use point::Point;
pub use polarity::{Polarity, PolarityHint};
pub use symbol::{SymbolShape, SymbolSize};
