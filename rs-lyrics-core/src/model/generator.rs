use std::collections::{BTreeMap, HashMap, VecDeque};
use std::iter;

use log::{debug, info};
use rand::Rng;

use super::lyrics_data::{CountData, FrequencyData};
use super::ngram_table::NgramTable;
use super::sampler::sample;
use super::song_config::SongConfig;
use super::token::{START_LINE, Token};
use super::tokenizer::capitalize_first;
use crate::error::{LyricsError, Result};

/// The `n - 1` most recent tokens of the line being generated.
///
/// Starts filled with `START_LINE`; pushing a token evicts the oldest one,
/// so the length never changes.
struct StateChain {
	tokens: VecDeque<Token>,
}

impl StateChain {
	fn new(length: usize) -> Self {
		Self { tokens: iter::repeat_n(START_LINE, length).collect() }
	}

	fn push(&mut self, token: Token) {
		if self.tokens.pop_front().is_some() {
			self.tokens.push_back(token);
		}
	}

	fn context(&mut self) -> &[Token] {
		self.tokens.make_contiguous()
	}
}

/// Writes lines, sections and songs from a probability model.
///
/// # Responsibilities
/// - Walk the n-gram table of the chosen size, one token at a time
/// - Size sections by sampling the verse length distribution
/// - Assemble songs, generating each distinct section label only once
///
/// The model is only read; every call takes the random generator to use.
#[derive(Debug)]
pub struct Generator<'a> {
	n: usize,
	table: &'a NgramTable<f64>,
	verse_lengths: &'a BTreeMap<usize, f64>,
}

impl<'a> Generator<'a> {
	/// Creates a generator walking the n-grams of size `n` in `model`.
	///
	/// # Errors
	/// - `InvalidNgramSize` if `n == 0`.
	/// - `NgramSizeTooLarge` if the model was not counted up to `n`.
	pub fn new(model: &'a FrequencyData, n: usize) -> Result<Self> {
		if n == 0 {
			return Err(LyricsError::InvalidNgramSize);
		}
		let table = model
			.ngram_table(n)
			.ok_or(LyricsError::NgramSizeTooLarge { requested: n, available: model.max_n() })?;

		Ok(Self { n, table, verse_lengths: model.verse_lengths() })
	}

	/// Samples the next token after the current chain and shifts it in.
	///
	/// # Panics
	/// If the chain is a context the table never saw, which cannot happen
	/// for chains built from the table's own outcomes.
	fn choose_next_token<R: Rng + ?Sized>(&self, state_chain: &mut StateChain, rng: &mut R) -> Token {
		let context = state_chain.context();
		let distribution = self
			.table
			.distribution(context)
			.unwrap_or_else(|| panic!("context {context:?} missing from the {}-gram table", self.n));

		let next_token = sample(distribution, rng).clone();
		state_chain.push(next_token.clone());
		next_token
	}

	/// Generates one line, letting the model decide where it ends.
	///
	/// Tokens are joined by single spaces and the first word is capitalized.
	pub fn create_line<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
		let mut state_chain = StateChain::new(self.n - 1);
		let mut words = Vec::new();

		loop {
			match self.choose_next_token(&mut state_chain, rng) {
				Token::EndLine => break,
				Token::Text(word) => words.push(word),
				Token::StartLine => unreachable!("START_LINE is never counted as an outcome"),
			}
		}

		capitalize_first(&words.join(" "))
	}

	/// Generates a section of `num_lines` independent lines.
	pub fn create_section<R: Rng + ?Sized>(&self, num_lines: usize, rng: &mut R) -> String {
		(0..num_lines).map(|_| self.create_line(rng)).collect::<Vec<_>>().join("\n")
	}

	/// Generates a song following `structure`.
	///
	/// # Parameters
	/// - `structure`: section labels in order; identical labels are
	///   identical sections (e.g. choruses).
	/// - `section_titles`: precede each section with a `[label]` line.
	///
	/// # Behavior
	/// - The first occurrence of a label samples a verse length and
	///   generates that many lines.
	/// - Later occurrences reuse that exact text.
	/// - Sections are separated by a blank line.
	pub fn create_song<R: Rng + ?Sized>(&self, structure: &[String], section_titles: bool, rng: &mut R) -> String {
		let mut song_parts: HashMap<&str, String> = HashMap::new();

		for section in structure {
			if song_parts.contains_key(section.as_str()) {
				continue;
			}
			let num_lines = *sample(self.verse_lengths, rng);
			debug!("Writing section '{section}' ({num_lines} lines)");
			song_parts.insert(section, self.create_section(num_lines, rng));
		}

		structure
			.iter()
			.map(|section| {
				let text = &song_parts[section.as_str()];
				if section_titles { format!("[{section}]\n{text}") } else { text.clone() }
			})
			.collect::<Vec<_>>()
			.join("\n\n")
	}
}

/// Writes a whole song from raw lyrics texts.
///
/// Checks the configuration, counts the corpus up to the configured n-gram
/// size, converts the counts to probabilities and generates the song.
///
/// # Errors
/// - Any configuration error reported by [`SongConfig::validate`], reported
///   before the corpus is read when it does not depend on the model.
/// - `EmptyCorpus` if no text holds a non-blank line.
pub fn write_song<R: Rng + ?Sized>(lyrics_texts: &[String], config: &SongConfig, rng: &mut R) -> Result<String> {
	config.check()?;
	let counts = CountData::from_corpus(lyrics_texts, config.ngram_size)?;
	let frequencies = counts.to_frequencies();
	config.validate(&frequencies)?;

	info!("Writing a {}-section song with {}-grams", config.song_form.len(), config.ngram_size);
	let generator = Generator::new(&frequencies, config.ngram_size)?;
	Ok(generator.create_song(&config.song_form, config.section_titles, rng))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;
	use std::sync::mpsc;
	use std::thread;
	use std::time::Duration;

	fn model(lyrics: &str, n: usize) -> FrequencyData {
		CountData::collect(lyrics, n).unwrap().to_frequencies()
	}

	fn form(labels: &[&str]) -> Vec<String> {
		labels.iter().map(|label| (*label).to_owned()).collect()
	}

	#[test]
	fn state_chain_keeps_its_length() {
		let mut state_chain = StateChain::new(2);
		assert_eq!(state_chain.context(), [START_LINE, START_LINE]);

		state_chain.push(Token::text("a"));
		state_chain.push(Token::text("b"));
		state_chain.push(Token::text("c"));
		assert_eq!(state_chain.context(), [Token::text("b"), Token::text("c")]);

		let mut empty_chain = StateChain::new(0);
		empty_chain.push(Token::text("a"));
		assert!(empty_chain.context().is_empty());
	}

	#[test]
	fn rejects_invalid_sizes() {
		let frequencies = model("la la la", 2);
		assert!(matches!(Generator::new(&frequencies, 0), Err(LyricsError::InvalidNgramSize)));
		assert!(matches!(
			Generator::new(&frequencies, 3),
			Err(LyricsError::NgramSizeTooLarge { requested: 3, available: 2 })
		));
	}

	#[test]
	fn single_line_corpus_only_repeats_its_tokens() {
		let frequencies = model("la la la", 2);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(11);

		for _ in 0..200 {
			let line = generator.create_line(&mut rng);
			let mut words = line.split(' ');
			assert_eq!(words.next(), Some("La"));
			assert!(words.all(|word| word == "la"), "{line}");
		}
	}

	#[test]
	fn trigrams_of_a_single_line_reproduce_it() {
		let frequencies = model("Hold the line, love isn't always on time", 3);
		let generator = Generator::new(&frequencies, 3).unwrap();
		let mut rng = StdRng::seed_from_u64(5);

		for _ in 0..20 {
			assert_eq!(generator.create_line(&mut rng), "Hold the line , love isn't always on time");
		}
	}

	#[test]
	fn lower_sizes_of_a_larger_model_are_usable() {
		let frequencies = model("one two\ntwo one", 4);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(3);

		for _ in 0..50 {
			let line = generator.create_line(&mut rng).to_lowercase();
			assert!(line.split(' ').all(|word| word == "one" || word == "two"), "{line}");
		}
	}

	#[test]
	fn unigrams_may_end_a_line_immediately() {
		let (tx, rx) = mpsc::channel();
		thread::spawn(move || {
			let frequencies = model("la", 1);
			let generator = Generator::new(&frequencies, 1).unwrap();
			let mut rng = StdRng::seed_from_u64(8);
			let lines: Vec<String> = (0..200).map(|_| generator.create_line(&mut rng)).collect();
			let _ = tx.send(lines);
		});

		let lines = rx.recv_timeout(Duration::from_secs(10)).expect("unigram lines must end");
		assert!(lines.iter().any(String::is_empty));
		assert!(lines.iter().all(|line| line.is_empty() || line.starts_with("La")));
	}

	#[test]
	fn section_has_requested_line_count() {
		let frequencies = model("la la la", 2);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(2);

		assert_eq!(generator.create_section(4, &mut rng).lines().count(), 4);
		assert_eq!(generator.create_section(0, &mut rng), "");
	}

	#[test]
	fn repeated_sections_reuse_the_same_text() {
		let frequencies = model("we will we will\nrock you\nrock you now\n\nbuddy you're a boy\nmake a big noise", 2);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(21);

		let song = generator.create_song(&form(&["Chorus", "Verse 1", "Chorus"]), true, &mut rng);
		let blocks: Vec<&str> = song.split("\n\n").collect();

		assert_eq!(blocks.len(), 3);
		assert!(blocks[0].starts_with("[Chorus]\n"));
		assert!(blocks[1].starts_with("[Verse 1]\n"));
		assert_eq!(blocks[0], blocks[2]);
	}

	#[test]
	fn section_lengths_follow_verse_lengths() {
		let frequencies = model("a b\nc d\nb c\n\nd a\nc a\na d", 2);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(4);

		let song = generator.create_song(&form(&["Verse 1", "Verse 2", "Bridge"]), false, &mut rng);
		for block in song.split("\n\n") {
			assert_eq!(block.lines().count(), 3);
		}
	}

	#[test]
	fn titles_are_optional() {
		let frequencies = model("la la la", 2);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let mut rng = StdRng::seed_from_u64(6);

		let song = generator.create_song(&form(&["Verse 1", "Chorus"]), false, &mut rng);
		assert!(!song.contains('['));
		assert_eq!(song.split("\n\n").count(), 2);
	}

	#[test]
	fn same_seed_writes_same_song() {
		let frequencies = model("She loves you, yeah, yeah, yeah\nShe loves you\n\nYou think you've lost your love", 2);
		let generator = Generator::new(&frequencies, 2).unwrap();
		let structure = form(&["Verse 1", "Chorus", "Verse 2", "Chorus"]);

		let first = generator.create_song(&structure, true, &mut StdRng::seed_from_u64(99));
		let second = generator.create_song(&structure, true, &mut StdRng::seed_from_u64(99));
		assert_eq!(first, second);
	}
}
