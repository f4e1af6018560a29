use rand::SeedableRng;
use rand::rngs::StdRng;

use super::lyrics_data::FrequencyData;
use crate::error::{LyricsError, Result};

/// Section layout of a typical pop song.
pub const COMMON_POP_SONG_STRUCTURE: [&str; 6] = ["Verse 1", "Chorus", "Verse 2", "Chorus", "Bridge", "Chorus"];

/// Parameters of a song generation run.
///
/// # Responsibilities
/// - Track the n-gram size used to count the corpus and to generate
/// - Track the song form (identical labels are identical sections)
/// - Track rendering options and the optional random seed
/// - Validate all of the above against a model before any text is written
#[derive(Clone, Debug, PartialEq)]
pub struct SongConfig {
	/// N-gram size to count and generate with (default 2, must be >= 1).
	pub ngram_size: usize,

	/// Ordered section labels; a repeated label repeats its section.
	pub song_form: Vec<String>,

	/// Whether each section is preceded by its `[label]` line.
	pub section_titles: bool,

	/// Seed for reproducible songs; `None` seeds from the OS.
	pub seed: Option<u64>,
}

impl Default for SongConfig {
	fn default() -> Self {
		Self {
			ngram_size: 2,
			song_form: COMMON_POP_SONG_STRUCTURE.iter().map(|label| (*label).to_owned()).collect(),
			section_titles: false,
			seed: None,
		}
	}
}

impl SongConfig {
	/// Checks the parameters that do not depend on a model.
	///
	/// Run before counting a corpus, so a bad configuration fails fast.
	///
	/// # Errors
	/// - `InvalidNgramSize` if the n-gram size is zero.
	/// - `EmptySongForm` if the song form has no section.
	pub fn check(&self) -> Result<()> {
		if self.ngram_size == 0 {
			return Err(LyricsError::InvalidNgramSize);
		}
		if self.song_form.is_empty() {
			return Err(LyricsError::EmptySongForm);
		}
		Ok(())
	}

	/// Checks that a song can be generated from `model` with this configuration.
	///
	/// # Errors
	/// - Any error reported by [`SongConfig::check`].
	/// - `NgramSizeTooLarge` if the model holds no table of that size.
	pub fn validate(&self, model: &FrequencyData) -> Result<()> {
		self.check()?;
		if self.ngram_size > model.max_n() {
			return Err(LyricsError::NgramSizeTooLarge { requested: self.ngram_size, available: model.max_n() });
		}
		Ok(())
	}

	/// Creates the random generator for this run.
	pub fn rng(&self) -> StdRng {
		match self.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		}
	}
}
