use std::collections::BTreeMap;

use rand::Rng;

/// Draws one outcome from a probability table.
///
/// A uniform threshold is drawn in `[0, 1)` and outcomes are walked in key
/// order, accumulating their probabilities, until the running total exceeds
/// the threshold.
///
/// # Panics
/// If `frequencies` is empty.
pub fn sample<'a, K, R>(frequencies: &'a BTreeMap<K, f64>, rng: &mut R) -> &'a K
where
	R: Rng + ?Sized,
{
	let threshold: f64 = rng.random();
	sample_at(frequencies, threshold)
}

/// Picks the outcome where the cumulative probability first exceeds `threshold`.
///
/// The last outcome is returned when the total never exceeds the threshold,
/// which happens when rounding leaves the probabilities summing just below 1.
///
/// # Panics
/// If `frequencies` is empty.
pub fn sample_at<K>(frequencies: &BTreeMap<K, f64>, threshold: f64) -> &K {
	let mut total = 0.0;
	let mut choice = None;

	for (outcome, probability) in frequencies {
		total += probability;
		choice = Some(outcome);
		if total > threshold {
			break;
		}
	}

	choice.expect("cannot sample from an empty distribution")
}
