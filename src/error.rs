use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum XdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed source '{name}': {detail}")]
    MalformedSource { name: String, detail: String },

    #[error(
        "Short read on channel '{channel}' at offset {offset}: wanted {wanted} bytes, got {got}"
    )]
    ShortRead {
        channel: String,
        offset: u64,
        wanted: usize,
        got: usize,
    },

    #[error("Segment of {len} bytes is not a multiple of sample width {width}")]
    InvalidSampleWidth { len: usize, width: usize },

    #[error("Unsupported sample width: {0} bytes (expected 1, 2, 4 or 8)")]
    UnsupportedSampleWidth(usize),

    #[error("Montage '{montage}': lead matrices have different shapes ({lhs:?} vs {rhs:?})")]
    ShapeMismatch {
        montage: String,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },

    #[error("Montage '{montage}': leads sampled at different frequencies ({lhs} Hz vs {rhs} Hz)")]
    LeadFrequencyMismatch { montage: String, lhs: u32, rhs: u32 },

    #[error("Band-pass cutoffs invalid after Nyquist normalization: low {low} >= high {high}")]
    InvalidFilterRange { low: f64, high: f64 },

    #[error("Read window is empty after frame alignment: start {start}s >= end {end}s")]
    InvalidRange { start: u64, end: u64 },

    #[error("Unknown channel: {0}")]
    UnknownChannel(String),
}

pub type Result<T> = std::result::Result<T, XdfError>;
