use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::token::{END_LINE, START_LINE, Token};
use crate::error::{LyricsError, Result};

/// Next-token table at the end of a context path.
///
/// Holds occurrence counts (`u64`) while the corpus is being counted and
/// probabilities (`f64`) once converted. Keys iterate in a stable order,
/// which keeps seeded sampling reproducible.
pub type Distribution<V> = BTreeMap<Token, V>;

/// One level of an n-gram table.
///
/// A table of size `n` is `n - 1` levels of `Branch` (one per context
/// token) ending in a `Leaf` holding the next-token distribution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum NgramNode<V> {
	Leaf(Distribution<V>),
	Branch(BTreeMap<Token, NgramNode<V>>),
}

impl<V> NgramNode<V> {
	/// Creates an empty node spanning `depth` levels (1 = leaf).
	fn empty(depth: usize) -> Self {
		if depth == 1 { NgramNode::Leaf(BTreeMap::new()) } else { NgramNode::Branch(BTreeMap::new()) }
	}
}

/// Represents the n-gram statistics of a single size `n`.
///
/// Maps a context of `n - 1` tokens to a distribution over the next token.
/// A unigram table (`n == 1`) has an empty context and is a single leaf.
///
/// # Responsibilities
/// - Count sliding windows of a tokenized line, padding with sentinels
/// - Merge another table of the same size (deep copy of unseen branches)
/// - Convert counts into probabilities at every leaf
/// - Look up the distribution that follows a context
///
/// # Invariants
/// - `size` is always >= 1
/// - Every path from the root crosses exactly `size - 1` branches
/// - Every count stored in a leaf is >= 1
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NgramTable<V> {
	size: usize,
	root: NgramNode<V>,
}

impl<V> NgramTable<V> {
	/// Number of tokens in each n-gram of this table.
	pub fn size(&self) -> usize {
		self.size
	}

	/// Returns the next-token distribution following `context`.
	///
	/// Returns `None` if the context was never observed.
	///
	/// # Panics
	/// If `context` does not hold exactly `size - 1` tokens.
	pub fn distribution(&self, context: &[Token]) -> Option<&Distribution<V>> {
		assert_eq!(
			context.len(),
			self.size - 1,
			"a size {} n-gram table needs a context of {} tokens",
			self.size,
			self.size - 1
		);

		let mut node = &self.root;
		for token in context {
			node = match node {
				NgramNode::Branch(children) => children.get(token)?,
				NgramNode::Leaf(_) => unreachable!("context longer than table depth"),
			};
		}

		match node {
			NgramNode::Leaf(distribution) => Some(distribution),
			NgramNode::Branch(_) => unreachable!("context shorter than table depth"),
		}
	}

	/// Collects every leaf distribution of the table.
	pub fn leaves(&self) -> Vec<&Distribution<V>> {
		fn collect<'a, V>(node: &'a NgramNode<V>, leaves: &mut Vec<&'a Distribution<V>>) {
			match node {
				NgramNode::Leaf(distribution) => leaves.push(distribution),
				NgramNode::Branch(children) => children.values().for_each(|child| collect(child, leaves)),
			}
		}

		let mut leaves = Vec::new();
		collect(&self.root, &mut leaves);
		leaves
	}

	/// Returns `true` if nothing was ever counted in this table.
	pub fn is_empty(&self) -> bool {
		match &self.root {
			NgramNode::Leaf(distribution) => distribution.is_empty(),
			NgramNode::Branch(children) => children.is_empty(),
		}
	}
}

impl NgramTable<u64> {
	/// Creates an empty count table for n-grams of `size` tokens.
	///
	/// # Errors
	/// Returns an error if `size == 0`.
	pub fn new(size: usize) -> Result<Self> {
		if size == 0 {
			return Err(LyricsError::InvalidNgramSize);
		}
		Ok(Self { size, root: NgramNode::empty(size) })
	}

	/// Counts one occurrence of `gram`.
	///
	/// The first `size - 1` tokens select the context path (created on first
	/// encounter), the last token is the counted outcome.
	///
	/// # Panics
	/// If `gram` does not hold exactly `size` tokens.
	pub fn count(&mut self, gram: &[Token]) {
		assert_eq!(gram.len(), self.size, "a size {} n-gram table counts {} tokens", self.size, self.size);

		let size = self.size;
		let Some((next, context)) = gram.split_last() else {
			unreachable!("n-gram size is always >= 1");
		};

		let mut node = &mut self.root;
		for (depth, token) in context.iter().enumerate() {
			node = match node {
				NgramNode::Branch(children) => {
					children.entry(token.clone()).or_insert_with(|| NgramNode::empty(size - depth - 1))
				}
				NgramNode::Leaf(_) => unreachable!("context longer than table depth"),
			};
		}

		match node {
			NgramNode::Leaf(counts) => *counts.entry(next.clone()).or_insert(0) += 1,
			NgramNode::Branch(_) => unreachable!("context shorter than table depth"),
		}
	}

	/// Counts the window of `size` tokens starting at `start` in a line.
	///
	/// Positions before the line read as `START_LINE`, positions after it as
	/// `END_LINE`.
	pub fn count_window(&mut self, tokens: &[Token], start: isize) {
		let gram: Vec<Token> = (start..start + self.size as isize)
			.map(|index| {
				if index < 0 {
					START_LINE
				} else {
					tokens.get(index as usize).cloned().unwrap_or(END_LINE)
				}
			})
			.collect();
		self.count(&gram);
	}

	/// Counts every window of a tokenized line.
	///
	/// Each window ends on one of the tokens or on a single trailing
	/// `END_LINE`, so a line contributes `tokens.len() + 1` windows and
	/// `END_LINE` never appears in a context. Lines without tokens
	/// contribute nothing.
	pub fn count_line(&mut self, tokens: &[Token]) {
		if tokens.is_empty() {
			return;
		}
		let size = self.size as isize;
		let last = tokens.len() as isize - size + 1;
		for start in (1 - size)..=last {
			self.count_window(tokens, start);
		}
	}

	/// Merges another count table into this one.
	///
	/// # Notes
	/// - Both tables must have the same size.
	/// - Counts of shared outcomes are summed.
	/// - A context branch only present in `other` is deep-copied, so the two
	///   tables never share a subtree and `other` is left untouched.
	///
	/// # Errors
	/// Returns an error if the table sizes do not match.
	pub fn merge(&mut self, other: &Self) -> Result<()> {
		if self.size != other.size {
			return Err(LyricsError::SizeMismatch { expected: self.size, found: other.size });
		}
		merge_nodes(&mut self.root, &other.root);
		Ok(())
	}

	/// Converts every leaf of the table into a probability distribution.
	///
	/// # Panics
	/// If a leaf is empty, which counting never produces.
	pub fn to_frequencies(&self) -> NgramTable<f64> {
		fn convert(node: &NgramNode<u64>) -> NgramNode<f64> {
			match node {
				NgramNode::Leaf(counts) => NgramNode::Leaf(counts_to_frequencies(counts)),
				NgramNode::Branch(children) => NgramNode::Branch(
					children.iter().map(|(token, child)| (token.clone(), convert(child))).collect(),
				),
			}
		}

		NgramTable { size: self.size, root: convert(&self.root) }
	}
}

/// Adds the counts of `add` into `accum`, walking both trees in step.
fn merge_nodes(accum: &mut NgramNode<u64>, add: &NgramNode<u64>) {
	match (accum, add) {
		(NgramNode::Leaf(accum), NgramNode::Leaf(add)) => {
			for (token, occurrence) in add {
				*accum.entry(token.clone()).or_insert(0) += occurrence;
			}
		}
		(NgramNode::Branch(accum), NgramNode::Branch(add)) => {
			for (token, next_add) in add {
				if let Some(next_accum) = accum.get_mut(token) {
					merge_nodes(next_accum, next_add);
				} else {
					accum.insert(token.clone(), next_add.clone());
				}
			}
		}
		_ => unreachable!("tables of the same size have the same depth"),
	}
}

/// Maps counts to their share of the total.
///
/// The result has the same keys, with values summing to 1.0 up to
/// floating point rounding.
///
/// # Panics
/// If `counts` is empty or sums to zero: there is no distribution to derive.
pub fn counts_to_frequencies<K: Ord + Clone>(counts: &BTreeMap<K, u64>) -> BTreeMap<K, f64> {
	let total: u64 = counts.values().sum();
	assert!(total > 0, "cannot convert an empty counter to frequencies");

	counts
		.iter()
		.map(|(key, occurrence)| (key.clone(), *occurrence as f64 / total as f64))
		.collect()
}
