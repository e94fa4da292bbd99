#![no_main]

//! Fuzz target for VP9 frame-header parsing.
//!
//! Exercises both single parses and repeated parses against one parser
//! instance, so the cross-frame persistence paths see arbitrary data too.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vp9parse::Vp9Parser;

#[derive(Arbitrary, Debug)]
struct HeaderInput {
    frames: Vec<Vec<u8>>,
    test_mode: HeaderTestMode,
}

#[derive(Arbitrary, Debug)]
enum HeaderTestMode {
    /// One fresh parser per buffer.
    Independent,
    /// One parser across all buffers, accumulating persistent state.
    Stream,
    /// One parser across all buffers with a reset in the middle.
    StreamWithReset,
}

fuzz_target!(|input: HeaderInput| {
    // Limit input size to prevent OOM
    let total: usize = input.frames.iter().map(|f| f.len()).sum();
    if total > 1024 * 1024 || input.frames.len() > 64 {
        return;
    }

    match input.test_mode {
        HeaderTestMode::Independent => {
            for frame in &input.frames {
                let mut parser = Vp9Parser::new();
                let _ = parser.parse_frame_header(frame);
            }
        }
        HeaderTestMode::Stream => {
            let mut parser = Vp9Parser::new();
            for frame in &input.frames {
                let _ = parser.parse_frame_header(frame);
            }
        }
        HeaderTestMode::StreamWithReset => {
            let mut parser = Vp9Parser::new();
            let half = input.frames.len() / 2;
            for (i, frame) in input.frames.iter().enumerate() {
                if i == half {
                    parser.reset();
                }
                let _ = parser.parse_frame_header(frame);
            }
        }
    }
});
