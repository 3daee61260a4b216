use thiserror::Error;

/// Failure of the matrix decoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A block could not be corrected
    #[error("Reed-Solomon block {block} has more errors than it can correct")]
    ChecksumFailure {
        /// Index of the failing block
        block: usize,
    },

    /// Corrected codewords do not form a valid encodation
    #[error("Invalid data encodation: {0}")]
    FormatFailure(String),
}

/// Failure of one pipeline run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// Pixel format or buffer the normalizer cannot read
    #[error("Unsupported frame format: {0}")]
    UnsupportedFormat(String),

    /// Candidate found but its module grid could not be read
    #[error("Could not sample module grid: {0}")]
    SamplingFailure(String),

    /// Module grid sampled but not decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failure of the fixture encoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Payload does not fit the largest symbol
    #[error("Payload needs {codewords} data codewords, more than any symbol holds")]
    TooLong {
        /// Data codewords the payload needs
        codewords: usize,
    },

    /// Module size or tones out of range
    #[error("Invalid render options: {0}")]
    InvalidRender(String),
}

/// Rejected configuration value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Numeric knob outside its valid range
    #[error("{field} = {value} is out of range")]
    OutOfRange {
        /// Name of the config field
        field: &'static str,
        /// Rejected value
        value: f32,
    },

    /// Polarity mode name not recognised
    #[error("Unknown polarity mode: {0}")]
    InvalidPolarityMode(String),
}

/// Result of a pipeline run
pub type Result<T> = std::result::Result<T, ScanError>;
