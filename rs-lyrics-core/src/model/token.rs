use std::fmt;

use serde::{Deserialize, Serialize};

/// A single unit of lyrics.
///
/// Real tokens carry the text extracted by the tokenizer (a word, a
/// contraction, a digital time or a punctuation run). The two sentinels mark
/// line boundaries: `StartLine` pads the context before the first token of a
/// line and `EndLine` follows its last token.
///
/// Sentinels are distinct variants, so no lyrics text can ever collide
/// with them.
///
/// ## Invariants
/// - `StartLine` only appears as a context key, never as a sampled outcome
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token {
	StartLine,
	EndLine,
	Text(String),
}

/// Beginning-of-line sentinel.
pub const START_LINE: Token = Token::StartLine;

/// End-of-line sentinel.
pub const END_LINE: Token = Token::EndLine;

impl Token {
	/// Creates a real (non-sentinel) token.
	pub fn text(value: &str) -> Self {
		Token::Text(value.to_owned())
	}

	/// Returns the lyrics text of a real token, `None` for sentinels.
	pub fn as_text(&self) -> Option<&str> {
		match self {
			Token::Text(value) => Some(value),
			Token::StartLine | Token::EndLine => None,
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Token::StartLine => f.write_str("<START>"),
			Token::EndLine => f.write_str("<END>"),
			Token::Text(value) => f.write_str(value),
		}
	}
}
