use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};
use log::info;

use rs_lyrics_core::LyricsError;
use rs_lyrics_core::io::{collect_files, read_file};
use rs_lyrics_core::model::generator::write_song;
use rs_lyrics_core::model::song_config::{COMMON_POP_SONG_STRUCTURE, SongConfig};

/// Command line options.
#[derive(Parser, Debug)]
#[command(name = "rs-lyrics", version, about = "Generate song lyrics from an N-gram language model")]
struct Args {
	/// One or more text files containing lyrics of a song, with each line
	/// separated by \n and each verse separated by a blank line; or
	/// directories containing such files
	#[arg(required = true, value_name = "LYRICS_FILES")]
	lyrics_files: Vec<PathBuf>,

	/// Maximum N-gram size to use when processing lyrics and generating the song
	#[arg(short = 'n', long, default_value_t = 2, value_parser = parse_ngram_size)]
	ngram_size: usize,

	/// Use preprocessed data files instead of raw lyrics (not supported yet)
	#[arg(short, long)]
	preprocessed_data: bool,

	/// Recursively search input directories for files
	#[arg(short, long)]
	recursive: bool,

	/// Print the section title in brackets before each section of the song
	#[arg(short, long)]
	section_titles: bool,

	/// Structure of the song as a list of section titles; identical titles
	/// are identical sections [default: Verse 1, Chorus, Verse 2, Chorus, Bridge, Chorus]
	#[arg(short = 'f', long, num_args = 1.., value_name = "SONG_SECTION")]
	song_form: Option<Vec<String>>,

	/// Seed the random generator to get the same song again
	#[arg(long)]
	seed: Option<u64>,

	/// Increase log verbosity (-v for info, -vv for debug)
	#[arg(short, long, action = ArgAction::Count)]
	verbose: u8,
}

impl Args {
	/// Builds the generation configuration from the parsed options.
	fn song_config(&self) -> Result<SongConfig, LyricsError> {
		let config = SongConfig {
			ngram_size: self.ngram_size,
			song_form: self
				.song_form
				.clone()
				.unwrap_or_else(|| COMMON_POP_SONG_STRUCTURE.iter().map(|label| (*label).to_owned()).collect()),
			section_titles: self.section_titles,
			seed: self.seed,
		};
		config.check()?;
		Ok(config)
	}
}

/// Accepts strictly positive integers only.
fn parse_ngram_size(value: &str) -> Result<usize, String> {
	value
		.parse::<usize>()
		.ok()
		.filter(|size| *size > 0)
		.ok_or_else(|| LyricsError::InvalidNgramSize.to_string())
}

fn init_logger(verbose: u8) {
	let level = match verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() -> anyhow::Result<()> {
	let args = Args::parse();
	init_logger(args.verbose);

	if args.preprocessed_data {
		bail!("-p option not supported yet");
	}
	let config = args.song_config()?;

	let files = collect_files(&args.lyrics_files, args.recursive).context("Failed to collect lyrics files")?;
	let lyrics_texts = files.iter().map(read_file).collect::<Result<Vec<_>, _>>().context("Failed to read lyrics")?;
	info!("Read {} lyrics files", lyrics_texts.len());

	let mut rng = config.rng();
	let song = write_song(&lyrics_texts, &config, &mut rng).context("Failed to write song")?;
	println!("{song}");

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn command_definition_is_valid() {
		Args::command().debug_assert();
	}

	#[test]
	fn defaults_follow_pop_structure() {
		let args = Args::try_parse_from(["rs-lyrics", "songs/"]).unwrap();
		let config = args.song_config().unwrap();

		assert_eq!(config.ngram_size, 2);
		assert_eq!(config.song_form, COMMON_POP_SONG_STRUCTURE);
		assert!(!config.section_titles);
		assert_eq!(config.seed, None);
	}

	#[test]
	fn parses_custom_form_and_options() {
		let args = Args::try_parse_from([
			"rs-lyrics", "a.txt", "b/", "-n", "3", "-s", "-r", "--seed", "5", "-f", "Chorus", "Verse 1", "Chorus",
		])
		.unwrap();
		let config = args.song_config().unwrap();

		assert_eq!(args.lyrics_files, [PathBuf::from("a.txt"), PathBuf::from("b/")]);
		assert!(args.recursive);
		assert_eq!(config.ngram_size, 3);
		assert_eq!(config.song_form, ["Chorus", "Verse 1", "Chorus"]);
		assert!(config.section_titles);
		assert_eq!(config.seed, Some(5));
	}

	#[test]
	fn rejects_non_positive_ngram_size() {
		assert!(Args::try_parse_from(["rs-lyrics", "a.txt", "-n", "0"]).is_err());
		assert!(Args::try_parse_from(["rs-lyrics", "a.txt", "-n", "-2"]).is_err());
		assert!(Args::try_parse_from(["rs-lyrics", "a.txt", "-n", "two"]).is_err());
	}

	#[test]
	fn requires_lyrics_files() {
		assert!(Args::try_parse_from(["rs-lyrics"]).is_err());
	}
}
