//! Top-level module for the lyrics n-gram system.
//!
//! This module provides a word-level lyrics generator, including:
//! - Tokens and line-boundary sentinels (`Token`)
//! - Lyrics tokenization and case normalization (`tokenizer`)
//! - Nested n-gram tables of any size (`NgramTable`)
//! - Per-document and aggregated corpus statistics (`ModelData`)
//! - Weighted sampling over probability tables (`sampler`)
//! - Song generation configuration (`SongConfig`)
//! - A high-level song writing interface (`Generator`)

/// Token type with the `START_LINE` / `END_LINE` sentinels.
pub mod token;

/// Raw lyrics line to token sequence conversion.
///
/// Removes parenthesized phrases, normalizes quotes and extracts words,
/// contractions, digital times and punctuation runs.
pub mod tokenizer;

/// Nested n-gram table (context tokens -> next token distribution).
///
/// Supports window counting, deep merging, conversion to probabilities
/// and context lookup.
pub mod ngram_table;

/// Corpus statistics: n-gram tables plus verse and line length distributions.
///
/// Handles counting one document, aggregating many (in parallel),
/// and converting counts to probabilities.
pub mod lyrics_data;

/// Weighted random choice over a probability table.
pub mod sampler;

/// Line, section and song generation over a probability model.
pub mod generator;

/// Song generation parameters (n-gram size, song form, titles, seed).
pub mod song_config;
