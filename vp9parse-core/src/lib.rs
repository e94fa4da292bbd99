//! # vp9parse-core
//!
//! Shared bitstream infrastructure for the vp9parse crates.
//!
//! This crate provides the building blocks the frame-header parser is built
//! on:
//! - A forward-only, MSB-first bit reader over borrowed byte buffers
//! - The matching bit writer used by tests and fuzz harnesses
//! - The bitstream error type

#![warn(missing_docs)]

pub mod bitstream;
pub mod error;

pub use bitstream::{BitReader, BitWriter};
pub use error::{BitstreamError, Result};
