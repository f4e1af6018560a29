use std::collections::BTreeMap;
use std::panic;
use std::sync::mpsc;
use std::thread;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::ngram_table::{NgramTable, counts_to_frequencies};
use super::tokenizer::tokenize_line;
use crate::error::{LyricsError, Result};

/// Statistics collected from lyrics, as counts or as probabilities.
///
/// This struct holds:
/// - `ngrams`: one table per n-gram size, `ngrams[i]` holding size `i + 1`.
/// - `verse_lengths`: number of lines per verse.
/// - `line_lengths`: number of tokens per line.
///
/// A model is built with counts (`CountData`) for each document, merged
/// across documents, then converted once to probabilities
/// (`FrequencyData`). The probability model is read-only.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ModelData<V> {
	ngrams: Vec<NgramTable<V>>,
	verse_lengths: BTreeMap<usize, V>,
	line_lengths: BTreeMap<usize, V>,
}

/// Occurrence counts, as collected from lyrics.
pub type CountData = ModelData<u64>;

/// Relative frequencies, ready for generation.
pub type FrequencyData = ModelData<f64>;

impl<V> ModelData<V> {
	/// Largest n-gram size held by the model.
	pub fn max_n(&self) -> usize {
		self.ngrams.len()
	}

	/// Returns the table of n-grams of `size` tokens, if the model has one.
	pub fn ngram_table(&self, size: usize) -> Option<&NgramTable<V>> {
		size.checked_sub(1).and_then(|index| self.ngrams.get(index))
	}

	/// Distribution of verse lengths (in lines).
	pub fn verse_lengths(&self) -> &BTreeMap<usize, V> {
		&self.verse_lengths
	}

	/// Distribution of line lengths (in tokens).
	pub fn line_lengths(&self) -> &BTreeMap<usize, V> {
		&self.line_lengths
	}

	/// Returns `true` if no non-blank line was ever counted.
	pub fn is_empty(&self) -> bool {
		self.line_lengths.is_empty()
	}
}

impl CountData {
	/// Returns an empty model counting n-grams of sizes `1..=n`.
	///
	/// # Errors
	/// Returns an error if `n == 0`.
	pub fn new(n: usize) -> Result<Self> {
		if n == 0 {
			return Err(LyricsError::InvalidNgramSize);
		}
		Ok(Self {
			ngrams: (1..=n).map(NgramTable::new).collect::<Result<_>>()?,
			verse_lengths: BTreeMap::new(),
			line_lengths: BTreeMap::new(),
		})
	}

	/// Collects the statistics of one song.
	///
	/// # Parameters
	/// - `lyrics`: the song text, one line per lyrics line, verses separated
	///   by blank lines.
	/// - `n`: the largest n-gram size to count (minimum 1).
	///
	/// # Behavior
	/// - Each line has its first word lower-cased, then is tokenized.
	/// - Each non-blank line counts all its windows for sizes `1..=n` and
	///   records its length in tokens.
	/// - Every blank line ends a verse and records its number of lines, 0
	///   for a blank line following another one.
	/// - Lines left after the last blank line form a final verse.
	///
	/// # Errors
	/// Returns an error if `n == 0`.
	pub fn collect(lyrics: &str, n: usize) -> Result<Self> {
		let mut data = Self::new(n)?;
		let mut current_lines = 0;

		for line in lyrics.lines() {
			let tokens = tokenize_line(line);
			if tokens.is_empty() {
				*data.verse_lengths.entry(current_lines).or_insert(0) += 1;
				current_lines = 0;
				continue;
			}

			for table in &mut data.ngrams {
				table.count_line(&tokens);
			}
			*data.line_lengths.entry(tokens.len()).or_insert(0) += 1;
			current_lines += 1;
		}
		if current_lines > 0 {
			*data.verse_lengths.entry(current_lines).or_insert(0) += 1;
		}

		Ok(data)
	}

	/// Merges the statistics of another model into this one.
	///
	/// `other` may count larger n-grams than `self`: they are ignored.
	///
	/// # Errors
	/// Returns an error if `other` counts fewer n-gram sizes than `self`.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if other.max_n() < self.max_n() {
			return Err(LyricsError::SizeMismatch { expected: self.max_n(), found: other.max_n() });
		}

		for (accum, add) in self.ngrams.iter_mut().zip(&other.ngrams) {
			accum.merge(add)?;
		}
		merge_counter(&mut self.verse_lengths, &other.verse_lengths);
		merge_counter(&mut self.line_lengths, &other.line_lengths);

		Ok(())
	}

	/// Aggregates the statistics of several songs into one model.
	///
	/// The aggregate counts n-grams up to the smallest `max_n` among the
	/// inputs; larger tables are dropped. Inputs are left untouched.
	///
	/// # Errors
	/// Returns an error if `data_list` is empty.
	pub fn aggregate(data_list: &[Self]) -> Result<Self> {
		let n = data_list.iter().map(Self::max_n).min().ok_or(LyricsError::EmptyCorpus)?;
		if data_list.iter().any(|data| data.max_n() != n) {
			warn!("Documents count different n-gram sizes, truncating to {n}");
		}

		let mut total = Self::new(n)?;
		for data in data_list {
			total.merge(data)?;
		}
		Ok(total)
	}

	/// Builds the aggregated statistics of a whole corpus.
	///
	/// # Parameters
	/// - `lyrics_texts`: one text per song.
	/// - `n`: the largest n-gram size to count.
	///
	/// # Behavior
	/// - Splits the songs into chunks (based on CPU cores * factor).
	/// - Spawns one thread per chunk; each collects and merges its own songs.
	/// - Merges the partial models sequentially on the calling thread.
	/// - Songs without any non-blank line are skipped.
	///
	/// # Errors
	/// - `InvalidNgramSize` if `n == 0`.
	/// - `EmptyCorpus` if no song contains a non-blank line.
	pub fn from_corpus(lyrics_texts: &[String], n: usize) -> Result<Self> {
		let mut final_data = Self::new(n)?;
		if lyrics_texts.is_empty() {
			return Err(LyricsError::EmptyCorpus);
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = lyrics_texts.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		let mut workers = Vec::new();
		for (chunk_index, chunk) in lyrics_texts.chunks(chunk_size).enumerate() {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();

			workers.push(thread::spawn(move || {
				let partial_data = Self::collect_chunk(&chunk, n, chunk_index * chunk_size);
				tx.send(partial_data).expect("receiver outlives every worker");
			}));
		}
		drop(tx);

		for partial_data in rx.iter() {
			final_data.merge(&partial_data?)?;
		}
		for worker in workers {
			if let Err(cause) = worker.join() {
				panic::resume_unwind(cause);
			}
		}

		if final_data.is_empty() {
			return Err(LyricsError::EmptyCorpus);
		}
		info!(
			"Counted {} songs: {} verses, {} lines, {} distinct tokens",
			lyrics_texts.len(),
			final_data.verse_lengths.values().sum::<u64>(),
			final_data.line_lengths.values().sum::<u64>(),
			final_data.ngrams[0].leaves().first().map_or(0, |unigrams| unigrams.len()),
		);
		Ok(final_data)
	}

	/// Collects and merges the songs of one worker chunk.
	fn collect_chunk(chunk: &[String], n: usize, first_index: usize) -> Result<Self> {
		let mut partial_data = Self::new(n)?;
		for (offset, lyrics) in chunk.iter().enumerate() {
			let song_data = Self::collect(lyrics, n)?;
			if song_data.is_empty() {
				debug!("Song #{} has no lyrics lines, skipped", first_index + offset);
				continue;
			}
			debug!(
				"Song #{}: {} lines in {} verses",
				first_index + offset,
				song_data.line_lengths.values().sum::<u64>(),
				song_data.verse_lengths.values().sum::<u64>()
			);
			partial_data.merge(&song_data)?;
		}
		Ok(partial_data)
	}

	/// Converts every count of the model into a relative frequency.
	///
	/// Each leaf distribution and both length distributions sum to 1.0 in
	/// the result (up to floating point rounding).
	///
	/// # Panics
	/// If the model is empty: an empty counter has no distribution. Corpus
	/// builders reject empty corpora before getting here.
	pub fn to_frequencies(&self) -> FrequencyData {
		ModelData {
			ngrams: self.ngrams.iter().map(NgramTable::to_frequencies).collect(),
			verse_lengths: counts_to_frequencies(&self.verse_lengths),
			line_lengths: counts_to_frequencies(&self.line_lengths),
		}
	}
}

/// Adds the counts of `add` into `accum`.
fn merge_counter(accum: &mut BTreeMap<usize, u64>, add: &BTreeMap<usize, u64>) {
	for (length, occurrence) in add {
		*accum.entry(*length).or_insert(0) += occurrence;
	}
}
