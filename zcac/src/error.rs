//! The single error type surfaced at the `encode`/`decode` call boundary.
//!
//! Lower layers (`bitstream`, `huffman`, `bitrepeater`, `value_array`) keep
//! their local `bool`/`Option` failure shapes; this enum exists only to give
//! the outermost call a named, displayable reason when one of those local
//! failures turns out to be fatal to the whole operation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZcacError {
    /// Bad magic, wrong version, or a structural size mismatch while reading
    /// the container.
    InvalidContainer,
    /// A frequency map was malformed while deserializing (duplicate value,
    /// zero count, or truncated bytes).
    InvalidFrequencyMap,
    /// A bit reader consumed past the end of its buffer.
    OverflowRead,
    /// The outer (de)compression pass failed.
    CompressionFailure,
    /// `samplesPerChannel` was zero, or exceeded `blockCount * N`.
    InvalidSamples,
}

impl fmt::Display for ZcacError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZcacError::InvalidContainer => write!(f, "invalid or unsupported container"),
            ZcacError::InvalidFrequencyMap => write!(f, "malformed Huffman frequency map"),
            ZcacError::OverflowRead => write!(f, "bit reader ran past the end of the buffer"),
            ZcacError::CompressionFailure => write!(f, "outer compression or decompression failed"),
            ZcacError::InvalidSamples => write!(f, "declared sample count is zero or exceeds the framed audio"),
        }
    }
}

impl std::error::Error for ZcacError {}
