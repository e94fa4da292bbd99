//! Stateful VP9 frame-header parser.
//!
//! The uncompressed header is decoded in one strict forward pass. Fields
//! that a frame omits fall back to values decoded by earlier frames:
//! loop-filter deltas, the per-segment feature table, the abs/delta
//! interpretation flag, and the segmentation probability arrays all live
//! in the parser and survive across calls. The parser also records the
//! frame size last written into each of the eight reference slots so the
//! size-from-refs path of inter frames resolves real dimensions.

use vp9parse_core::BitReader;

use crate::error::{Result, Vp9ParseError};
use crate::frame_header::{
    ColorRange, ColorSpace, FrameHeader, FrameType, InterpFilter, LoopFilterParams, Profile,
    QuantIndices, RefFrameType, SegmentFeatureData, SegmentationInfo,
};
use crate::segmentation::Segmentation;
use crate::{
    FRAME_CONTEXTS_LOG2, FRAME_MARKER, MAX_MODE_LF_DELTAS, MAX_PROB, MAX_REF_LF_DELTAS,
    MAX_SEGMENTS, PREDICTION_PROBS, REFS_PER_FRAME, REF_FRAMES, REF_FRAMES_LOG2, SEG_TREE_PROBS,
    SYNC_CODE,
};

/// Narrowest tile allowed, in superblocks.
const MIN_TILE_WIDTH_SB64: u32 = 4;
/// Widest tile allowed, in superblocks.
const MAX_TILE_WIDTH_SB64: u32 = 64;

/// Frame size last written into a reference slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct RefSlotSize {
    width: u32,
    height: u32,
}

/// Decode state that survives across frames.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PersistentState {
    /// Loop-filter deltas per reference type.
    ref_deltas: [i8; MAX_REF_LF_DELTAS],
    /// Loop-filter deltas per prediction mode.
    mode_deltas: [i8; MAX_MODE_LF_DELTAS],
    /// Segment feature values are absolute rather than deltas.
    abs_delta: bool,
    /// Segment feature table, as the last updating frame left it.
    features: [SegmentFeatureData; MAX_SEGMENTS],
    /// Segment tree probabilities from the last map update.
    tree_probs: [u8; SEG_TREE_PROBS],
    /// Segment prediction probabilities from the last temporal update.
    pred_probs: [u8; PREDICTION_PROBS],
    /// The last frame was lossless.
    lossless: bool,
    /// Dimensions last written into each reference slot.
    ref_slots: [RefSlotSize; REF_FRAMES],
}

impl Default for PersistentState {
    fn default() -> Self {
        Self {
            ref_deltas: [0; MAX_REF_LF_DELTAS],
            mode_deltas: [0; MAX_MODE_LF_DELTAS],
            abs_delta: false,
            features: [SegmentFeatureData::default(); MAX_SEGMENTS],
            tree_probs: [MAX_PROB; SEG_TREE_PROBS],
            pred_probs: [MAX_PROB; PREDICTION_PROBS],
            lossless: false,
            ref_slots: [RefSlotSize::default(); REF_FRAMES],
        }
    }
}

/// Stateful parser for VP9 uncompressed frame headers.
///
/// One instance per elementary stream; call
/// [`parse_frame_header`](Self::parse_frame_header) once per frame in
/// stream order. Instances share no state, so independent streams can be
/// parsed concurrently with one instance each, but a single instance must
/// never serve two frames at once.
#[derive(Debug, Clone, Default)]
pub struct Vp9Parser {
    state: PersistentState,
    segmentation: [Segmentation; MAX_SEGMENTS],
}

impl Vp9Parser {
    /// Create a parser with a fresh cross-frame context: deltas at zero,
    /// probabilities at 255, no segment features, empty reference slots.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard all cross-frame state, as if freshly created.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the most recently parsed frame was lossless.
    pub fn is_lossless(&self) -> bool {
        self.state.lossless
    }

    /// Segment tree probabilities in effect after the last parsed frame.
    pub fn segment_tree_probs(&self) -> &[u8; SEG_TREE_PROBS] {
        &self.state.tree_probs
    }

    /// Segment prediction probabilities in effect after the last parsed
    /// frame.
    pub fn segment_pred_probs(&self) -> &[u8; PREDICTION_PROBS] {
        &self.state.pred_probs
    }

    /// Resolved per-segment decode parameters for the last parsed frame.
    pub fn segmentation(&self) -> &[Segmentation; MAX_SEGMENTS] {
        &self.segmentation
    }

    /// Parse one frame's uncompressed header from `data`.
    ///
    /// On success the returned header is fully populated and the parser's
    /// cross-frame state reflects this frame. On failure the output is
    /// discarded; state written before the failing field keeps its new
    /// value, which is harmless because downstream consumers only ever see
    /// state through a successful parse.
    pub fn parse_frame_header(&mut self, data: &[u8]) -> Result<FrameHeader> {
        let mut reader = BitReader::new(data);
        let mut header = FrameHeader::default();

        let marker = reader.read_bits(2)? as u8;
        if marker != FRAME_MARKER {
            tracing::debug!(marker, "rejecting frame with bad marker");
            return Err(Vp9ParseError::InvalidFrameMarker(marker));
        }

        let profile_low = reader.read_bit()? as u8;
        let profile_high = reader.read_bit()? as u8;
        let profile = (profile_high << 1) | profile_low;
        if profile == 3 && reader.read_bit()? {
            return Err(Vp9ParseError::InvalidProfile);
        }
        header.profile = Profile::try_from(profile)?;

        header.show_existing_frame = reader.read_bit()?;
        if header.show_existing_frame {
            header.frame_to_show = reader.read_bits(REF_FRAMES_LOG2)? as u8;
            header.frame_header_length_in_bytes = reader.position().div_ceil(8) as u32;
            return Ok(header);
        }

        header.frame_type = if reader.read_bit()? {
            FrameType::Inter
        } else {
            FrameType::Keyframe
        };
        header.show_frame = reader.read_bit()?;
        header.error_resilient_mode = reader.read_bit()?;

        if header.frame_type == FrameType::Keyframe {
            Self::verify_sync_code(&mut reader)?;
            Self::parse_color_config(&mut reader, &mut header)?;
            Self::parse_frame_size(&mut reader, &mut header)?;
            Self::parse_render_size(&mut reader, &mut header)?;
            // A keyframe is written into every reference slot.
            header.refresh_frame_flags = 0xFF;
        } else {
            header.intra_only = if header.show_frame {
                false
            } else {
                reader.read_bit()?
            };
            header.reset_frame_context = if header.error_resilient_mode {
                0
            } else {
                reader.read_bits(2)? as u8
            };

            if header.intra_only {
                Self::verify_sync_code(&mut reader)?;
                if header.profile > Profile::Profile0 {
                    Self::parse_color_config(&mut reader, &mut header)?;
                } else {
                    header.bit_depth = 8;
                    header.color_space = ColorSpace::Bt601;
                    header.subsampling_x = true;
                    header.subsampling_y = true;
                }
                header.refresh_frame_flags = reader.read_bits(8)? as u8;
                Self::parse_frame_size(&mut reader, &mut header)?;
                Self::parse_render_size(&mut reader, &mut header)?;
            } else {
                header.refresh_frame_flags = reader.read_bits(8)? as u8;
                for i in 0..REFS_PER_FRAME {
                    header.ref_frame_indices[i] = reader.read_bits(REF_FRAMES_LOG2)? as u8;
                    header.ref_frame_sign_bias[i] = reader.read_bit()?;
                }
                self.parse_frame_size_with_refs(&mut reader, &mut header)?;
                Self::parse_render_size(&mut reader, &mut header)?;

                header.allow_high_precision_mv = reader.read_bit()?;
                header.interp_filter = if reader.read_bit()? {
                    InterpFilter::Switchable
                } else {
                    InterpFilter::from_literal(reader.read_bits(2)? as u8)?
                };
            }
        }

        if header.error_resilient_mode {
            header.refresh_frame_context = false;
            header.frame_parallel_decoding_mode = true;
        } else {
            header.refresh_frame_context = reader.read_bit()?;
            header.frame_parallel_decoding_mode = reader.read_bit()?;
        }
        header.frame_context_idx = reader.read_bits(FRAME_CONTEXTS_LOG2)? as u8;

        self.parse_loop_filter(&mut reader, &mut header.loop_filter)?;
        self.parse_quant_indices(&mut reader, &mut header.quant_indices)?;
        self.parse_segmentation(&mut reader, &mut header.segmentation)?;
        Self::parse_tile_info(&mut reader, &mut header)?;

        header.first_partition_size = reader.read_bits(16)? as u16;
        if header.first_partition_size == 0 {
            tracing::debug!("rejecting frame with empty first partition");
            return Err(Vp9ParseError::EmptyFirstPartition);
        }
        header.frame_header_length_in_bytes = reader.position().div_ceil(8) as u32;

        self.update(&header);
        Ok(header)
    }

    fn verify_sync_code(reader: &mut BitReader) -> Result<()> {
        let sync_code = reader.read_bits(24)?;
        if sync_code != SYNC_CODE {
            tracing::debug!(sync_code, "rejecting frame with bad sync code");
            return Err(Vp9ParseError::InvalidSyncCode(sync_code));
        }
        Ok(())
    }

    fn parse_color_config(reader: &mut BitReader, header: &mut FrameHeader) -> Result<()> {
        header.bit_depth = if header.profile >= Profile::Profile2 {
            if reader.read_bit()? {
                12
            } else {
                10
            }
        } else {
            8
        };

        let color_space = reader.read_bits(3)? as u8;
        header.color_space = ColorSpace::try_from(color_space)?;

        let explicit_subsampling =
            matches!(header.profile, Profile::Profile1 | Profile::Profile3);

        if header.color_space != ColorSpace::Srgb {
            header.color_range = if reader.read_bit()? {
                ColorRange::Full
            } else {
                ColorRange::Limited
            };
            if explicit_subsampling {
                header.subsampling_x = reader.read_bit()?;
                header.subsampling_y = reader.read_bit()?;
                let _reserved = reader.read_bit()?;
            } else {
                header.subsampling_x = true;
                header.subsampling_y = true;
            }
        } else {
            header.color_range = ColorRange::Full;
            if explicit_subsampling {
                header.subsampling_x = false;
                header.subsampling_y = false;
                let _reserved = reader.read_bit()?;
            } else {
                // The 4:2:0-only profiles cannot carry RGB.
                return Err(Vp9ParseError::IllegalColorConfig(header.profile as u8));
            }
        }
        Ok(())
    }

    fn parse_frame_size(reader: &mut BitReader, header: &mut FrameHeader) -> Result<()> {
        header.width = reader.read_bits(16)? + 1;
        header.height = reader.read_bits(16)? + 1;
        header.display_width = header.width;
        header.display_height = header.height;
        Ok(())
    }

    fn parse_render_size(reader: &mut BitReader, header: &mut FrameHeader) -> Result<()> {
        header.display_size_enabled = reader.read_bit()?;
        if header.display_size_enabled {
            header.display_width = reader.read_bits(16)? + 1;
            header.display_height = reader.read_bits(16)? + 1;
        }
        Ok(())
    }

    fn parse_frame_size_with_refs(
        &self,
        reader: &mut BitReader,
        header: &mut FrameHeader,
    ) -> Result<()> {
        for i in 0..REFS_PER_FRAME {
            if reader.read_bit()? {
                let slot = self.state.ref_slots[header.ref_frame_indices[i] as usize];
                header.width = slot.width;
                header.height = slot.height;
                header.display_width = slot.width;
                header.display_height = slot.height;
                return Ok(());
            }
        }
        Self::parse_frame_size(reader, header)
    }

    fn parse_loop_filter(
        &mut self,
        reader: &mut BitReader,
        lf: &mut LoopFilterParams,
    ) -> Result<()> {
        lf.filter_level = reader.read_bits(6)? as u8;
        lf.sharpness_level = reader.read_bits(3)? as u8;

        lf.mode_ref_delta_enabled = reader.read_bit()?;
        if lf.mode_ref_delta_enabled {
            lf.mode_ref_delta_update = reader.read_bit()?;
            if lf.mode_ref_delta_update {
                for i in 0..MAX_REF_LF_DELTAS {
                    lf.update_ref_deltas[i] = reader.read_bit()?;
                    if lf.update_ref_deltas[i] {
                        self.state.ref_deltas[i] = reader.read_signed(6)? as i8;
                    }
                }
                for i in 0..MAX_MODE_LF_DELTAS {
                    lf.update_mode_deltas[i] = reader.read_bit()?;
                    if lf.update_mode_deltas[i] {
                        self.state.mode_deltas[i] = reader.read_signed(6)? as i8;
                    }
                }
            }
        }

        // The output always carries the persistent deltas, updated or not.
        lf.ref_deltas = self.state.ref_deltas;
        lf.mode_deltas = self.state.mode_deltas;
        Ok(())
    }

    fn parse_quant_indices(
        &mut self,
        reader: &mut BitReader,
        quant: &mut QuantIndices,
    ) -> Result<()> {
        quant.y_ac_qi = reader.read_bits(8)? as u8;
        quant.y_dc_delta = Self::read_delta_q(reader)?;
        quant.uv_dc_delta = Self::read_delta_q(reader)?;
        quant.uv_ac_delta = Self::read_delta_q(reader)?;

        quant.lossless = quant.y_ac_qi == 0
            && quant.y_dc_delta == 0
            && quant.uv_dc_delta == 0
            && quant.uv_ac_delta == 0;
        self.state.lossless = quant.lossless;
        Ok(())
    }

    fn read_delta_q(reader: &mut BitReader) -> Result<i8> {
        if reader.read_bit()? {
            Ok(reader.read_signed(4)? as i8)
        } else {
            Ok(0)
        }
    }

    fn parse_segmentation(
        &mut self,
        reader: &mut BitReader,
        seg: &mut SegmentationInfo,
    ) -> Result<()> {
        seg.enabled = reader.read_bit()?;
        if seg.enabled {
            seg.update_map = reader.read_bit()?;
            if seg.update_map {
                for i in 0..SEG_TREE_PROBS {
                    seg.update_tree_probs[i] = reader.read_bit()?;
                    seg.tree_probs[i] = if seg.update_tree_probs[i] {
                        reader.read_bits(8)? as u8
                    } else {
                        MAX_PROB
                    };
                }

                seg.temporal_update = reader.read_bit()?;
                if seg.temporal_update {
                    for i in 0..PREDICTION_PROBS {
                        seg.update_pred_probs[i] = reader.read_bit()?;
                        seg.pred_probs[i] = if seg.update_pred_probs[i] {
                            reader.read_bits(8)? as u8
                        } else {
                            MAX_PROB
                        };
                    }
                } else {
                    seg.pred_probs = [MAX_PROB; PREDICTION_PROBS];
                }
            } else {
                seg.tree_probs = self.state.tree_probs;
                seg.pred_probs = self.state.pred_probs;
            }

            seg.update_data = reader.read_bit()?;
            if seg.update_data {
                self.state.abs_delta = reader.read_bit()?;
                for feature in &mut self.state.features {
                    feature.alternate_quantizer_enabled = reader.read_bit()?;
                    feature.alternate_quantizer = if feature.alternate_quantizer_enabled {
                        reader.read_signed(8)? as i16
                    } else {
                        0
                    };

                    feature.alternate_loop_filter_enabled = reader.read_bit()?;
                    feature.alternate_loop_filter = if feature.alternate_loop_filter_enabled {
                        reader.read_signed(6)? as i8
                    } else {
                        0
                    };

                    feature.reference_frame_enabled = reader.read_bit()?;
                    feature.reference_frame = if feature.reference_frame_enabled {
                        RefFrameType::try_from(reader.read_bits(2)? as u8)?
                    } else {
                        RefFrameType::Intra
                    };

                    feature.reference_skip = reader.read_bit()?;
                }
            }
        }

        // The output embeds the authoritative table whether or not this
        // frame updated it.
        seg.abs_delta = self.state.abs_delta;
        seg.data = self.state.features;
        Ok(())
    }

    fn parse_tile_info(reader: &mut BitReader, header: &mut FrameHeader) -> Result<()> {
        let sb64_cols = header.sb_cols();
        let min_log2 = min_log2_tile_cols(sb64_cols);
        let max_log2 = max_log2_tile_cols(sb64_cols);

        let mut cols_log2 = min_log2;
        while cols_log2 < max_log2 && reader.read_bit()? {
            cols_log2 += 1;
        }
        header.tile_info.tile_cols_log2 = cols_log2;

        header.tile_info.tile_rows_log2 = if reader.read_bit()? {
            1 + reader.read_bit()? as u8
        } else {
            0
        };

        header.tile_info.tile_cols = 1 << header.tile_info.tile_cols_log2;
        header.tile_info.tile_rows = 1 << header.tile_info.tile_rows_log2;
        Ok(())
    }

    /// Fold a successfully parsed header into the cross-frame state.
    fn update(&mut self, header: &FrameHeader) {
        if header.segmentation.enabled && header.segmentation.update_map {
            self.state.tree_probs = header.segmentation.tree_probs;
            self.state.pred_probs = header.segmentation.pred_probs;
        }

        for (i, slot) in self.state.ref_slots.iter_mut().enumerate() {
            if header.refresh_frame_flags & (1 << i) != 0 {
                *slot = RefSlotSize {
                    width: header.width,
                    height: header.height,
                };
            }
        }

        self.segmentation = Segmentation::derive_all(header);
    }
}

/// Smallest legal log2 tile-column count for a frame `sb64_cols`
/// superblocks wide.
fn min_log2_tile_cols(sb64_cols: u32) -> u8 {
    let mut min_log2 = 0;
    while (MAX_TILE_WIDTH_SB64 << min_log2) < sb64_cols {
        min_log2 += 1;
    }
    min_log2
}

/// Largest legal log2 tile-column count for a frame `sb64_cols`
/// superblocks wide.
fn max_log2_tile_cols(sb64_cols: u32) -> u8 {
    let mut max_log2 = 1;
    while (sb64_cols >> max_log2) >= MIN_TILE_WIDTH_SB64 {
        max_log2 += 1;
    }
    max_log2 - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_cols_bounds() {
        // Narrow frames allow a single column only.
        assert_eq!(min_log2_tile_cols(1), 0);
        assert_eq!(max_log2_tile_cols(1), 0);
        assert_eq!(max_log2_tile_cols(7), 0);

        // Eight superblocks split into at most two columns.
        assert_eq!(min_log2_tile_cols(8), 0);
        assert_eq!(max_log2_tile_cols(8), 1);

        // Exactly 64 superblocks still fit one maximum-width tile.
        assert_eq!(min_log2_tile_cols(64), 0);
        assert_eq!(max_log2_tile_cols(64), 4);

        // Wider than one maximum tile forces a split.
        assert_eq!(min_log2_tile_cols(65), 1);
        assert_eq!(min_log2_tile_cols(256), 2);
    }

    #[test]
    fn test_tile_bounds_ordered() {
        for sb64_cols in 1..=512 {
            let min = min_log2_tile_cols(sb64_cols);
            let max = max_log2_tile_cols(sb64_cols);
            assert!(min <= max, "min {min} > max {max} at {sb64_cols}");
        }
    }

    #[test]
    fn test_state_defaults() {
        let state = PersistentState::default();
        assert_eq!(state.ref_deltas, [0; MAX_REF_LF_DELTAS]);
        assert_eq!(state.mode_deltas, [0; MAX_MODE_LF_DELTAS]);
        assert_eq!(state.tree_probs, [MAX_PROB; SEG_TREE_PROBS]);
        assert_eq!(state.pred_probs, [MAX_PROB; PREDICTION_PROBS]);
        assert!(!state.lossless);
        assert_eq!(state.ref_slots[0], RefSlotSize::default());
    }

    #[test]
    fn test_update_refreshes_flagged_slots() {
        let mut parser = Vp9Parser::new();
        let header = FrameHeader {
            width: 640,
            height: 480,
            refresh_frame_flags: 0b0000_0101,
            ..Default::default()
        };

        parser.update(&header);
        let expect = RefSlotSize {
            width: 640,
            height: 480,
        };
        assert_eq!(parser.state.ref_slots[0], expect);
        assert_eq!(parser.state.ref_slots[2], expect);
        assert_eq!(parser.state.ref_slots[1], RefSlotSize::default());
    }

    #[test]
    fn test_reset_clears_state() {
        let mut parser = Vp9Parser::new();
        parser.state.ref_deltas = [5, -5, 1, -1];
        parser.state.lossless = true;

        parser.reset();
        assert_eq!(parser.state, PersistentState::default());
    }

    #[test]
    fn test_parse_empty_buffer_is_truncation() {
        let mut parser = Vp9Parser::new();
        let err = parser.parse_frame_header(&[]).unwrap_err();
        assert!(err.is_no_packet());
    }

    #[test]
    fn test_parse_bad_marker_is_broken_data() {
        let mut parser = Vp9Parser::new();
        // First two bits 01 : marker 1.
        let err = parser.parse_frame_header(&[0x40, 0x00]).unwrap_err();
        assert_eq!(err, Vp9ParseError::InvalidFrameMarker(1));
        assert!(err.is_broken_data());
    }
}
