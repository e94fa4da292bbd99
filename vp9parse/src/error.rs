//! Error types for VP9 frame-header parsing.
//!
//! The parser distinguishes two failure classes: truncated input (the
//! buffer ended before the grammar completed) and broken data (the input
//! was structurally complete but semantically invalid). The enum below
//! keeps the precise cause; [`Vp9ParseError::is_no_packet`] and
//! [`Vp9ParseError::is_broken_data`] collapse it into the two classes a
//! caller acts on.

use thiserror::Error;
use vp9parse_core::BitstreamError;

/// Errors surfaced while parsing a VP9 uncompressed frame header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Vp9ParseError {
    /// Invalid frame marker (should be 2).
    #[error("invalid frame marker: expected 2, got {0}")]
    InvalidFrameMarker(u8),

    /// Invalid frame sync code (should be 0x498342).
    #[error("invalid sync code: expected 0x498342, got {0:#08x}")]
    InvalidSyncCode(u32),

    /// The reserved bit following profile 3 was set.
    #[error("reserved bit set after profile 3")]
    InvalidProfile,

    /// sRGB is only legal for the 4:4:4-capable profiles 1 and 3.
    #[error("sRGB color space is not allowed in profile {0}")]
    IllegalColorConfig(u8),

    /// The compressed header cannot be empty.
    #[error("first partition size is zero")]
    EmptyFirstPartition,

    /// Out-of-range profile value.
    #[error("unsupported profile: {0}")]
    UnsupportedProfile(u8),

    /// Out-of-range color space value.
    #[error("unsupported color space: {0}")]
    UnsupportedColorSpace(u8),

    /// Out-of-range interpolation filter value.
    #[error("invalid interpolation filter: {0}")]
    InvalidInterpFilter(u8),

    /// Out-of-range reference frame type.
    #[error("invalid reference frame type: {0}")]
    InvalidRefFrameType(u8),

    /// The buffer ended before the grammar completed.
    #[error("bitstream error: {0}")]
    Bitstream(#[from] BitstreamError),
}

/// VP9 parser result type.
pub type Result<T> = std::result::Result<T, Vp9ParseError>;

impl Vp9ParseError {
    /// The input was truncated relative to what the grammar requires.
    ///
    /// The caller should treat this as "need more data" or drop the
    /// fragment, never as a permanent stream error.
    pub fn is_no_packet(&self) -> bool {
        matches!(self, Self::Bitstream(_))
    }

    /// The input was structurally complete but violates a semantic
    /// invariant of the bitstream.
    ///
    /// The caller should drop the frame.
    pub fn is_broken_data(&self) -> bool {
        !self.is_no_packet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Vp9ParseError::InvalidSyncCode(0x123456);
        assert_eq!(
            err.to_string(),
            "invalid sync code: expected 0x498342, got 0x123456"
        );

        let err = Vp9ParseError::InvalidFrameMarker(1);
        assert_eq!(err.to_string(), "invalid frame marker: expected 2, got 1");
    }

    #[test]
    fn test_failure_classes() {
        assert!(Vp9ParseError::InvalidSyncCode(0).is_broken_data());
        assert!(Vp9ParseError::InvalidFrameMarker(0).is_broken_data());
        assert!(Vp9ParseError::EmptyFirstPartition.is_broken_data());
        assert!(!Vp9ParseError::InvalidSyncCode(0).is_no_packet());

        let truncated = Vp9ParseError::from(BitstreamError::UnexpectedEnd);
        assert!(truncated.is_no_packet());
        assert!(!truncated.is_broken_data());
    }
}
