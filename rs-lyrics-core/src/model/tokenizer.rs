use std::sync::LazyLock;

use regex::Regex;

use super::token::Token;

/// Word characters joined by a single apostrophe or hyphen (`I'll`, `well-known`).
const CONTRACTION_OR_HYPHENATED_WORD: &str = r"(?:\w+['-]\w+)";
/// `H:MM` or `HH:MM`.
const DIGITAL_TIME: &str = r"(?:\d{1,2}:\d{2})";
const SIMPLE_WORD: &str = r"(?:\w+)";
/// A run of punctuation counts as one token (`...`, `??`).
const PUNCTUATION: &str = r#"(?:[,;:.?!"-]+)"#;

/// Alternatives are tried left to right at each position, so the order above
/// is the matching priority.
static LYRICS_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
	let pattern = [CONTRACTION_OR_HYPHENATED_WORD, DIGITAL_TIME, SIMPLE_WORD, PUNCTUATION].join("|");
	Regex::new(&pattern).expect("lyrics token pattern must compile")
});

static PAREN_PHRASE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\([^)]*\)").expect("parenthesized phrase pattern must compile"));

/// Splits one line of lyrics into tokens.
///
/// - Parenthesized phrases (backing vocals, ad-libs) are removed entirely,
///   including any punctuation inside them.
/// - Two consecutive single quotes are read as one double quote.
/// - Whitespace and characters matching no token pattern are skipped.
///
/// The line is expected to contain no newline. An empty line yields no token.
pub fn tokenize(line: &str) -> Vec<Token> {
	let without_parens = PAREN_PHRASE.replace_all(line, "");
	let quotes_normalized = without_parens.replace("''", "\"");

	LYRICS_TOKEN
		.find_iter(&quotes_normalized)
		.map(|token| Token::text(token.as_str()))
		.collect()
}

/// Tokenizes a raw lyrics line after lower-casing its first word.
///
/// This keeps "Love" at the start of a line and "love" mid-line as the same
/// token.
pub fn tokenize_line(raw_line: &str) -> Vec<Token> {
	tokenize(&uncapitalize_first(raw_line))
}

/// Lower-cases the first letter of a line, even behind leading punctuation.
///
/// The first person pronoun is kept as is (`I ...`, `I'm ...`), and nothing
/// past the first space is touched.
pub fn uncapitalize_first(line: &str) -> String {
	if line.starts_with("I ") || line.starts_with("I'") {
		return line.to_owned();
	}
	map_first_letter(line, char::to_lowercase)
}

/// Upper-cases the first letter of a line, even behind leading punctuation.
///
/// Inverse of [`uncapitalize_first`], used on generated lines.
pub fn capitalize_first(line: &str) -> String {
	map_first_letter(line, char::to_uppercase)
}

/// Rewrites the first alphabetic character of the first word with `convert`.
///
/// Returns the line unchanged when a space is reached before any letter.
fn map_first_letter<F, I>(line: &str, convert: F) -> String
where
	F: Fn(char) -> I,
	I: Iterator<Item = char>,
{
	for (index, c) in line.char_indices() {
		if c.is_alphabetic() {
			let mut converted = String::with_capacity(line.len());
			converted.push_str(&line[..index]);
			converted.extend(convert(c));
			converted.push_str(&line[index + c.len_utf8()..]);
			return converted;
		}
		if c == ' ' {
			break;
		}
	}
	line.to_owned()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn texts(tokens: &[Token]) -> Vec<&str> {
		tokens.iter().filter_map(Token::as_text).collect()
	}

	#[test]
	fn separates_simple_words_on_whitespace() {
		assert_eq!(
			texts(&tokenize("Separate these   words\tinto tokens")),
			["Separate", "these", "words", "into", "tokens"]
		);
	}

	#[test]
	fn keeps_contractions_whole() {
		assert_eq!(texts(&tokenize("I'll see you")), ["I'll", "see", "you"]);
	}

	#[test]
	fn keeps_hyphenated_words_whole() {
		assert_eq!(
			texts(&tokenize("Correctly-tokenized hyphenated words")),
			["Correctly-tokenized", "hyphenated", "words"]
		);
	}

	#[test]
	fn keeps_digital_times_whole() {
		assert_eq!(texts(&tokenize("The time is 19:15")), ["The", "time", "is", "19:15"]);
		assert_eq!(texts(&tokenize("at 7:05 sharp")), ["at", "7:05", "sharp"]);
	}

	#[test]
	fn punctuation_runs_are_single_tokens() {
		assert_eq!(
			texts(&tokenize(
				"Punctuation: which?? Commas, semicolons; periods. Dashes - as hyphens - and exclamation! Ellipsis..."
			)),
			[
				"Punctuation", ":", "which", "??", "Commas", ",", "semicolons", ";", "periods", ".", "Dashes",
				"-", "as", "hyphens", "-", "and", "exclamation", "!", "Ellipsis", "..."
			]
		);
	}

	#[test]
	fn drops_parenthesized_phrases() {
		assert_eq!(texts(&tokenize("Hey (hey) look at that (look at that)")), ["Hey", "look", "at", "that"]);
		assert_eq!(texts(&tokenize("oh (yeah, yeah!) oh")), ["oh", "oh"]);
	}

	#[test]
	fn double_single_quotes_become_double_quote() {
		assert_eq!(texts(&tokenize("''This is a quote''")), ["\"", "This", "is", "a", "quote", "\""]);
	}

	#[test]
	fn empty_line_has_no_tokens() {
		assert!(tokenize("").is_empty());
		assert!(tokenize("   \t").is_empty());
		assert!(tokenize("(only backing vocals)").is_empty());
	}

	#[test]
	fn uncapitalizes_first_word_only() {
		assert_eq!(uncapitalize_first("Uncapitalize this sentence."), "uncapitalize this sentence.");
		assert_eq!(uncapitalize_first("Uncapitalize this Sentence."), "uncapitalize this Sentence.");
	}

	#[test]
	fn keeps_first_person_pronoun() {
		assert_eq!(uncapitalize_first("I will not eat cereal."), "I will not eat cereal.");
		assert_eq!(uncapitalize_first("I'll not eat cereal for lunch."), "I'll not eat cereal for lunch.");
	}

	#[test]
	fn stops_at_first_space() {
		assert_eq!(uncapitalize_first("15:00 is the time in London."), "15:00 is the time in London.");
		assert_eq!(capitalize_first("... and then"), "... and then");
	}

	#[test]
	fn skips_leading_punctuation() {
		assert_eq!(uncapitalize_first("\"Hello,\" she said"), "\"hello,\" she said");
		assert_eq!(capitalize_first("\"hello,\" she said"), "\"Hello,\" she said");
		assert_eq!(capitalize_first("éclair"), "Éclair");
	}

	#[test]
	fn tokenize_line_normalizes_case() {
		assert_eq!(texts(&tokenize_line("Love me do")), ["love", "me", "do"]);
		assert_eq!(texts(&tokenize_line("I'm a Loser")), ["I'm", "a", "Loser"]);
	}
}
