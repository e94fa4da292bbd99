//! Error types for bit-level stream access.

use thiserror::Error;

/// Errors produced by bit-level readers and writers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitstreamError {
    /// The buffer ended before the requested bits could be read.
    #[error("unexpected end of bitstream")]
    UnexpectedEnd,

    /// More bits were requested than a single access supports.
    #[error("cannot access {0} bits at once")]
    TooManyBits(u8),
}

/// Result type alias using [`BitstreamError`].
pub type Result<T> = std::result::Result<T, BitstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            BitstreamError::UnexpectedEnd.to_string(),
            "unexpected end of bitstream"
        );
        assert_eq!(
            BitstreamError::TooManyBits(33).to_string(),
            "cannot access 33 bits at once"
        );
    }
}
