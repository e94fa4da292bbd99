//! VP9 frame-header data model.
//!
//! The types in this module mirror the fields of the uncompressed header:
//! frame identity and sizing, color configuration, reference setup, loop
//! filter, quantization, segmentation, and tiling. A populated
//! [`FrameHeader`] is the output of one parse call and is read-only
//! afterwards; persistent values (loop-filter deltas, segment features)
//! are copies of the parser's cross-frame state at the time of the call.

use crate::error::Vp9ParseError;
use crate::{
    MAX_MODE_LF_DELTAS, MAX_PROB, MAX_REF_LF_DELTAS, MAX_SEGMENTS, PREDICTION_PROBS,
    REFS_PER_FRAME, SEG_TREE_PROBS,
};

/// VP9 profile (0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum Profile {
    /// Profile 0: 8-bit, 4:2:0 only.
    #[default]
    Profile0 = 0,
    /// Profile 1: 8-bit, 4:4:4, 4:2:2, and 4:4:0.
    Profile1 = 1,
    /// Profile 2: 10/12-bit, 4:2:0 only.
    Profile2 = 2,
    /// Profile 3: 10/12-bit, 4:4:4, 4:2:2, and 4:4:0.
    Profile3 = 3,
}

impl TryFrom<u8> for Profile {
    type Error = Vp9ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Profile::Profile0),
            1 => Ok(Profile::Profile1),
            2 => Ok(Profile::Profile2),
            3 => Ok(Profile::Profile3),
            _ => Err(Vp9ParseError::UnsupportedProfile(value)),
        }
    }
}

/// VP9 frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    /// Keyframe: intra-only, resets the reference pool.
    #[default]
    Keyframe,
    /// Inter frame: predicted from up to three references.
    Inter,
}

/// VP9 color space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ColorSpace {
    /// Unknown color space.
    Unknown = 0,
    /// BT.601.
    #[default]
    Bt601 = 1,
    /// BT.709.
    Bt709 = 2,
    /// SMPTE-170M.
    Smpte170 = 3,
    /// SMPTE-240M.
    Smpte240 = 4,
    /// BT.2020.
    Bt2020 = 5,
    /// Reserved.
    Reserved = 6,
    /// sRGB (profiles 1 and 3 only).
    Srgb = 7,
}

impl TryFrom<u8> for ColorSpace {
    type Error = Vp9ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ColorSpace::Unknown),
            1 => Ok(ColorSpace::Bt601),
            2 => Ok(ColorSpace::Bt709),
            3 => Ok(ColorSpace::Smpte170),
            4 => Ok(ColorSpace::Smpte240),
            5 => Ok(ColorSpace::Bt2020),
            6 => Ok(ColorSpace::Reserved),
            7 => Ok(ColorSpace::Srgb),
            _ => Err(Vp9ParseError::UnsupportedColorSpace(value)),
        }
    }
}

/// VP9 color value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorRange {
    /// Studio swing: Y in [16, 235], UV in [16, 240].
    #[default]
    Limited,
    /// Full swing: [0, 255] for Y, U, and V.
    Full,
}

/// VP9 interpolation filter applied during motion compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum InterpFilter {
    /// Regular 8-tap filter.
    #[default]
    EightTap = 0,
    /// 8-tap smooth filter.
    EightTapSmooth = 1,
    /// 8-tap sharp filter.
    EightTapSharp = 2,
    /// Bilinear filter.
    Bilinear = 3,
    /// Filter selected per block.
    Switchable = 4,
}

/// Wire order of the 2-bit filter literal, which differs from the enum
/// numbering.
const LITERAL_TO_FILTER: [InterpFilter; 4] = [
    InterpFilter::EightTapSmooth,
    InterpFilter::EightTap,
    InterpFilter::EightTapSharp,
    InterpFilter::Bilinear,
];

impl InterpFilter {
    /// Map the header's raw 2-bit literal to the filter it selects.
    pub fn from_literal(raw: u8) -> Result<Self, Vp9ParseError> {
        LITERAL_TO_FILTER
            .get(raw as usize)
            .copied()
            .ok_or(Vp9ParseError::InvalidInterpFilter(raw))
    }
}

impl TryFrom<u8> for InterpFilter {
    type Error = Vp9ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(InterpFilter::EightTap),
            1 => Ok(InterpFilter::EightTapSmooth),
            2 => Ok(InterpFilter::EightTapSharp),
            3 => Ok(InterpFilter::Bilinear),
            4 => Ok(InterpFilter::Switchable),
            _ => Err(Vp9ParseError::InvalidInterpFilter(value)),
        }
    }
}

/// VP9 reference frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum RefFrameType {
    /// No reference (intra).
    #[default]
    Intra = 0,
    /// Last reference frame.
    Last = 1,
    /// Golden reference frame.
    Golden = 2,
    /// Altref reference frame.
    AltRef = 3,
}

impl TryFrom<u8> for RefFrameType {
    type Error = Vp9ParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RefFrameType::Intra),
            1 => Ok(RefFrameType::Last),
            2 => Ok(RefFrameType::Golden),
            3 => Ok(RefFrameType::AltRef),
            _ => Err(Vp9ParseError::InvalidRefFrameType(value)),
        }
    }
}

/// Loop filter parameters for one frame.
///
/// The deltas persist across frames: entries whose update flag is clear
/// carry the value decoded by an earlier frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoopFilterParams {
    /// Base filter level (0-63).
    pub filter_level: u8,
    /// Sharpness (0-7).
    pub sharpness_level: u8,
    /// Per-reference and per-mode deltas are in use.
    pub mode_ref_delta_enabled: bool,
    /// This frame carried delta updates.
    pub mode_ref_delta_update: bool,
    /// Which reference deltas this frame updated.
    pub update_ref_deltas: [bool; MAX_REF_LF_DELTAS],
    /// Filter level deltas per reference type (intra, last, golden, altref).
    pub ref_deltas: [i8; MAX_REF_LF_DELTAS],
    /// Which mode deltas this frame updated.
    pub update_mode_deltas: [bool; MAX_MODE_LF_DELTAS],
    /// Filter level deltas per prediction mode.
    pub mode_deltas: [i8; MAX_MODE_LF_DELTAS],
}

/// Dequantization indices for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantIndices {
    /// Base luma AC quantizer index.
    pub y_ac_qi: u8,
    /// Luma DC delta relative to the base index.
    pub y_dc_delta: i8,
    /// Chroma DC delta relative to the base index.
    pub uv_dc_delta: i8,
    /// Chroma AC delta relative to the base index.
    pub uv_ac_delta: i8,
    /// The frame reconstructs exactly: base index and all deltas are zero.
    pub lossless: bool,
}

/// Feature overrides for one segment.
///
/// Values are interpreted as absolute or as deltas against the frame-level
/// parameters according to [`SegmentationInfo::abs_delta`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentFeatureData {
    /// Alternate quantizer override is active.
    pub alternate_quantizer_enabled: bool,
    /// Alternate quantizer value.
    pub alternate_quantizer: i16,
    /// Alternate loop-filter override is active.
    pub alternate_loop_filter_enabled: bool,
    /// Alternate loop-filter level.
    pub alternate_loop_filter: i8,
    /// Reference-frame override is active.
    pub reference_frame_enabled: bool,
    /// Overriding reference frame.
    pub reference_frame: RefFrameType,
    /// Blocks in this segment are coded as skipped.
    pub reference_skip: bool,
}

/// Segmentation parameters for one frame.
///
/// The feature table is fully persistent: a frame with `update_data`
/// clear reuses the table exactly as the last updating frame left it, and
/// the parser embeds a copy of that table here on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentationInfo {
    /// Segmentation is enabled for this frame.
    pub enabled: bool,
    /// The segment map was coded in this frame.
    pub update_map: bool,
    /// Which tree probabilities were coded in this frame.
    pub update_tree_probs: [bool; SEG_TREE_PROBS],
    /// Segment tree probabilities (255 when not coded).
    pub tree_probs: [u8; SEG_TREE_PROBS],
    /// The segment map is predicted from the previous frame's map.
    pub temporal_update: bool,
    /// Which prediction probabilities were coded in this frame.
    pub update_pred_probs: [bool; PREDICTION_PROBS],
    /// Segment prediction probabilities (255 when not coded).
    pub pred_probs: [u8; PREDICTION_PROBS],
    /// Feature values are absolute rather than deltas.
    pub abs_delta: bool,
    /// The feature table was coded in this frame.
    pub update_data: bool,
    /// Feature table for all segments.
    pub data: [SegmentFeatureData; MAX_SEGMENTS],
}

impl Default for SegmentationInfo {
    fn default() -> Self {
        Self {
            enabled: false,
            update_map: false,
            update_tree_probs: [false; SEG_TREE_PROBS],
            tree_probs: [MAX_PROB; SEG_TREE_PROBS],
            temporal_update: false,
            update_pred_probs: [false; PREDICTION_PROBS],
            pred_probs: [MAX_PROB; PREDICTION_PROBS],
            abs_delta: false,
            update_data: false,
            data: [SegmentFeatureData::default(); MAX_SEGMENTS],
        }
    }
}

/// Tile configuration for one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileInfo {
    /// Log2 of tile columns.
    pub tile_cols_log2: u8,
    /// Log2 of tile rows (0-2).
    pub tile_rows_log2: u8,
    /// Number of tile columns.
    pub tile_cols: u32,
    /// Number of tile rows.
    pub tile_rows: u32,
}

/// A fully parsed VP9 uncompressed frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    /// VP9 profile (0-3).
    pub profile: Profile,
    /// This header only re-displays an already decoded frame.
    pub show_existing_frame: bool,
    /// Reference slot to display when `show_existing_frame` is set.
    pub frame_to_show: u8,
    /// Frame type (keyframe or inter).
    pub frame_type: FrameType,
    /// The frame is output for display.
    pub show_frame: bool,
    /// Error resilient mode.
    pub error_resilient_mode: bool,
    /// Bit depth (8, 10, or 12).
    pub bit_depth: u8,
    /// Color space.
    pub color_space: ColorSpace,
    /// Color range.
    pub color_range: ColorRange,
    /// Horizontal chroma subsampling.
    pub subsampling_x: bool,
    /// Vertical chroma subsampling.
    pub subsampling_y: bool,
    /// Coded frame width.
    pub width: u32,
    /// Coded frame height.
    pub height: u32,
    /// An explicit display size was coded.
    pub display_size_enabled: bool,
    /// Display width (coded width when no explicit display size).
    pub display_width: u32,
    /// Display height (coded height when no explicit display size).
    pub display_height: u32,
    /// Inter frame without inter prediction.
    pub intra_only: bool,
    /// Frame context reset mode (0-3).
    pub reset_frame_context: u8,
    /// Bitmask of reference slots this frame is written into.
    pub refresh_frame_flags: u8,
    /// Reference slot indices for LAST, GOLDEN, and ALTREF.
    pub ref_frame_indices: [u8; REFS_PER_FRAME],
    /// Sign bias per reference (LAST, GOLDEN, ALTREF).
    pub ref_frame_sign_bias: [bool; REFS_PER_FRAME],
    /// Eighth-pel motion vectors are allowed.
    pub allow_high_precision_mv: bool,
    /// Interpolation filter for motion compensation.
    pub interp_filter: InterpFilter,
    /// Probabilities adapted by this frame are stored back.
    pub refresh_frame_context: bool,
    /// Frame may be decoded without waiting on previous frames.
    pub frame_parallel_decoding_mode: bool,
    /// Frame context index (0-3).
    pub frame_context_idx: u8,
    /// Loop filter parameters.
    pub loop_filter: LoopFilterParams,
    /// Dequantization indices.
    pub quant_indices: QuantIndices,
    /// Segmentation parameters.
    pub segmentation: SegmentationInfo,
    /// Tile configuration.
    pub tile_info: TileInfo,
    /// Size of the compressed header that follows, in bytes.
    pub first_partition_size: u16,
    /// Total uncompressed header length, rounded up to whole bytes.
    pub frame_header_length_in_bytes: u32,
}

impl Default for FrameHeader {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            show_existing_frame: false,
            frame_to_show: 0,
            frame_type: FrameType::default(),
            show_frame: true,
            error_resilient_mode: false,
            bit_depth: 8,
            color_space: ColorSpace::default(),
            color_range: ColorRange::default(),
            subsampling_x: false,
            subsampling_y: false,
            width: 0,
            height: 0,
            display_size_enabled: false,
            display_width: 0,
            display_height: 0,
            intra_only: false,
            reset_frame_context: 0,
            refresh_frame_flags: 0,
            ref_frame_indices: [0; REFS_PER_FRAME],
            ref_frame_sign_bias: [false; REFS_PER_FRAME],
            allow_high_precision_mv: false,
            interp_filter: InterpFilter::default(),
            refresh_frame_context: false,
            frame_parallel_decoding_mode: false,
            frame_context_idx: 0,
            loop_filter: LoopFilterParams::default(),
            quant_indices: QuantIndices::default(),
            segmentation: SegmentationInfo::default(),
            tile_info: TileInfo::default(),
            first_partition_size: 0,
            frame_header_length_in_bytes: 0,
        }
    }
}

impl FrameHeader {
    /// Check if this is a keyframe.
    pub fn is_keyframe(&self) -> bool {
        self.frame_type == FrameType::Keyframe
    }

    /// Check if this frame uses intra prediction only.
    pub fn is_intra_only(&self) -> bool {
        self.frame_type == FrameType::Keyframe || self.intra_only
    }

    /// Number of 64x64 superblocks covering the frame width.
    pub fn sb_cols(&self) -> u32 {
        (self.width + 63) >> 6
    }

    /// Number of 64x64 superblocks covering the frame height.
    pub fn sb_rows(&self) -> u32 {
        (self.height + 63) >> 6
    }

    /// Number of 8x8 mode-info blocks covering the frame width.
    pub fn mi_cols(&self) -> u32 {
        (self.width + 7) >> 3
    }

    /// Number of 8x8 mode-info blocks covering the frame height.
    pub fn mi_rows(&self) -> u32 {
        (self.height + 7) >> 3
    }
}
