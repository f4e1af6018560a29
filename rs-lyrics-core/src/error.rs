use std::path::PathBuf;

use thiserror::Error;

/// Errors reported by the lyrics model and its configuration.
///
/// Configuration problems are reported before any text is produced.
/// Internal precondition violations (sampling an empty distribution,
/// walking a context the model never saw) are not represented here: they
/// are programming errors and panic with a descriptive message.
#[derive(Debug, Error)]
pub enum LyricsError {
	/// The requested n-gram size is zero.
	#[error("N-gram size must be a positive integer")]
	InvalidNgramSize,

	/// The requested n-gram size is larger than what the model was built with.
	#[error("N-gram size {requested} exceeds the largest size available in the model ({available})")]
	NgramSizeTooLarge { requested: usize, available: usize },

	/// Two n-gram tables (or models) of incompatible sizes were merged.
	#[error("Cannot merge n-gram data of size {found} into size {expected}")]
	SizeMismatch { expected: usize, found: usize },

	/// No document of the corpus contained a single non-blank line.
	#[error("Corpus contains no lyrics lines")]
	EmptyCorpus,

	/// The song form lists no section.
	#[error("Song form must contain at least one section")]
	EmptySongForm,

	/// A lyrics path could not be read or listed.
	#[error("{}: {source}", .path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, LyricsError>;
