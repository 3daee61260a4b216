use std::time::Duration;

use super::{Polarity, SymbolSize};
use crate::error::{DecodeError, ScanError};

/// Successfully decoded symbol content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPayload {
    /// Decoded bytes; FNC1 separators appear as literal 0x1D
    pub bytes: Vec<u8>,
    /// Size class of the symbol the bytes came from
    pub symbol: SymbolSize,
    /// Polarity the symbol was read under (`None` when decoded straight
    /// from a module matrix)
    pub polarity: Option<Polarity>,
    /// Symbol opened with FNC1, i.e. carries GS1 element strings
    pub gs1: bool,
    /// ECI designator announced in the data, if any
    pub eci: Option<u32>,
    /// Codewords repaired by error correction
    pub corrected_codewords: usize,
}

impl DecodedPayload {
    /// Display string with non-printable bytes escaped (see [`crate::formatter`])
    pub fn display(&self) -> String {
        crate::formatter::format_payload(&self.bytes)
    }
}

/// Kind of a per-frame failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Frame pixels could not be turned into intensities
    UnsupportedFormat,
    /// Finder pattern found, but no clean module grid
    SamplingFailure,
    /// Error correction capacity exceeded
    ChecksumFailure,
    /// Codewords are not a valid encodation sequence
    FormatFailure,
}

impl From<&ScanError> for FailureKind {
    fn from(err: &ScanError) -> Self {
        match err {
            ScanError::UnsupportedFormat(_) => FailureKind::UnsupportedFormat,
            ScanError::SamplingFailure(_) => FailureKind::SamplingFailure,
            ScanError::Decode(DecodeError::ChecksumFailure { .. }) => FailureKind::ChecksumFailure,
            ScanError::Decode(DecodeError::FormatFailure(_)) => FailureKind::FormatFailure,
        }
    }
}

/// Result of running the pipeline on one frame
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    /// A symbol was located and decoded
    Decoded(DecodedPayload),
    /// No finder pattern anywhere: the normal state between symbols
    NoSymbolFound,
    /// A stage failed; terminal for this frame only
    Failed(FailureKind),
}

impl ScanOutcome {
    /// Payload, if decoded
    pub fn payload(&self) -> Option<&DecodedPayload> {
        match self {
            ScanOutcome::Decoded(payload) => Some(payload),
            _ => None,
        }
    }

    /// Whether the frame decoded
    pub fn is_decoded(&self) -> bool {
        matches!(self, ScanOutcome::Decoded(_))
    }
}

/// Per-frame report handed to the caller
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// Timestamp of the frame this report describes
    pub timestamp: Duration,
    /// Orientations that were tried, in order
    pub attempted: Vec<Polarity>,
    /// What happened
    pub outcome: ScanOutcome,
}
