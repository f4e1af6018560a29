//! N-gram song lyrics generation library.
//!
//! This crate turns a corpus of song lyrics into a word-level n-gram model
//! and walks that model to write new songs:
//! - Lyrics tokenization and first-word case normalization
//! - Per-line n-gram counting with line-boundary sentinels
//! - Corpus aggregation (parallel per-document counting, serialized merging)
//! - Count to probability conversion and weighted sampling
//! - Line, section and whole-song generation with repeated-section reuse
//!
//! All randomness is injected by the caller through a `rand::Rng`, so a
//! seeded generator reproduces the same song.

/// Error type shared by every fallible operation of the crate.
pub mod error;

/// Core lyrics model: tokens, n-gram tables, corpus statistics and generation.
pub mod model;

/// File collection and lyrics file reading.
///
/// Thin wrappers used by front-ends to feed raw text into the model.
pub mod io;

pub use error::{LyricsError, Result};
