//! # vp9parse
//!
//! Parser for the uncompressed header of VP9 video frames.
//!
//! Every VP9 frame starts with a densely packed, bit-level header that a
//! decoder must interpret to configure reference management, loop
//! filtering, quantization, segmentation, and tiling before it can touch
//! the entropy-coded payload. Many header fields are conditionally
//! present: when a frame omits them, the values decoded from earlier
//! frames apply. [`Vp9Parser`] owns that cross-frame state and decodes
//! one header per call.
//!
//! ## Usage
//!
//! ```
//! use vp9parse::Vp9Parser;
//!
//! let mut parser = Vp9Parser::new();
//!
//! // One call per frame, in stream order. The caller extracts each
//! // frame's bytes from the container.
//! # let frame_data: &[u8] = &[];
//! match parser.parse_frame_header(frame_data) {
//!     Ok(header) => println!("{}x{}", header.width, header.height),
//!     Err(err) if err.is_no_packet() => { /* truncated, wait for more data */ }
//!     Err(_) => { /* broken frame, drop it */ }
//! }
//! ```
//!
//! ## Scope
//!
//! Only the uncompressed header is parsed. The compressed header
//! (probability adaptation), tile payloads, motion compensation, and
//! pixel reconstruction belong to a full decoder. Superframe splitting is
//! the caller's job: each call expects exactly one frame's bytes.
//!
//! ## State model
//!
//! One parser instance per elementary stream. Loop-filter deltas, the
//! per-segment feature table, and the segmentation probability arrays
//! survive across calls until the bitstream overwrites them or
//! [`Vp9Parser::reset`] discards them. Instances share nothing, so
//! independent streams decode concurrently with one parser each.

#![warn(missing_docs)]

pub mod error;
pub mod frame_header;
pub mod parser;
pub mod segmentation;

pub use error::{Result, Vp9ParseError};
pub use frame_header::{
    ColorRange, ColorSpace, FrameHeader, FrameType, InterpFilter, LoopFilterParams, Profile,
    QuantIndices, RefFrameType, SegmentFeatureData, SegmentationInfo, TileInfo,
};
pub use parser::Vp9Parser;
pub use segmentation::Segmentation;

/// 2-bit marker value opening every VP9 frame header.
pub const FRAME_MARKER: u8 = 0x2;

/// 24-bit sync code carried by key and intra-only frames.
pub const SYNC_CODE: u32 = 0x49_83_42;

/// Maximum loop-filter level.
pub const MAX_LOOP_FILTER: u8 = 63;

/// Maximum loop-filter sharpness.
pub const MAX_SHARPNESS: u8 = 7;

/// Maximum probability value.
pub const MAX_PROB: u8 = 255;

/// Number of reference frame slots in the reference pool.
pub const REF_FRAMES: usize = 8;

/// Bits needed to index the reference pool.
pub const REF_FRAMES_LOG2: u8 = 3;

/// Active reference frames per inter frame.
pub const REFS_PER_FRAME: usize = 3;

/// Number of reference frame types (intra, last, golden, altref).
pub const REF_FRAME_TYPES: usize = 4;

/// Maximum number of segments.
pub const MAX_SEGMENTS: usize = 8;

/// Number of segment tree probabilities.
pub const SEG_TREE_PROBS: usize = MAX_SEGMENTS - 1;

/// Number of segment prediction probabilities.
pub const PREDICTION_PROBS: usize = 3;

/// Number of per-reference loop-filter deltas.
pub const MAX_REF_LF_DELTAS: usize = 4;

/// Number of per-mode loop-filter deltas.
pub const MAX_MODE_LF_DELTAS: usize = 2;

/// Bits used for the frame context index.
pub const FRAME_CONTEXTS_LOG2: u8 = 2;

/// Superblock size in luma samples.
pub const SUPERBLOCK_SIZE: u32 = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(FRAME_MARKER, 2);
        assert_eq!(SYNC_CODE, 0x498342);
        assert_eq!(MAX_LOOP_FILTER, 63);
        assert_eq!(MAX_SHARPNESS, 7);
        assert_eq!(REF_FRAMES, 1 << REF_FRAMES_LOG2);
        assert_eq!(SEG_TREE_PROBS, 7);
        assert_eq!(SUPERBLOCK_SIZE, 64);
    }

    #[test]
    fn test_parser_creation() {
        let parser = Vp9Parser::new();
        assert!(!parser.is_lossless());
        assert_eq!(parser.segment_tree_probs(), &[MAX_PROB; SEG_TREE_PROBS]);
        assert_eq!(parser.segment_pred_probs(), &[MAX_PROB; PREDICTION_PROBS]);
    }
}
