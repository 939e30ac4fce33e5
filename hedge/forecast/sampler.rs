//! Categorical sampling over non-negative weights and over exponentiated scores.

use crate::random::RandomSource;

/// Draws an index with probability proportional to `weights[i]`.
///
/// Takes exactly one draw `d` from `random`, sets `u = d * sum(weights)`, and returns the
/// smallest index whose inclusive prefix sum reaches `u`. When the total is zero or not
/// finite, or rounding leaves every prefix short of `u`, the last index is returned. An
/// empty slice yields `0`.
pub fn sample<R: RandomSource + ?Sized>(weights: &[f64], random: &mut R) -> usize {
    let last = weights.len().saturating_sub(1);
    let total: f64 = weights.iter().sum();
    let u = random.draw() * total;
    if !total.is_finite() || total <= 0.0 {
        return last;
    }
    let mut accum = 0.0;
    for (idx, weight) in weights.iter().enumerate() {
        accum += weight;
        if accum >= u {
            return idx;
        }
    }
    last
}

/// Unnormalised weights `exp((score - max) * eta)`.
///
/// Anchoring on the maximum keeps the largest weight at exactly `1.0`, so large scores never
/// overflow; the ratios between weights equal those of `exp(score * eta)`.
#[must_use]
pub fn stabilized_weights(scores: &[f64], eta: f64) -> Vec<f64> {
    let anchor = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    scores
        .iter()
        .map(|score| ((score - anchor) * eta).exp())
        .collect()
}

/// Draws an index with probability proportional to `exp(eta * scores[i])`.
pub fn softmax_sample<R: RandomSource + ?Sized>(scores: &[f64], eta: f64, random: &mut R) -> usize {
    sample(&stabilized_weights(scores, eta), random)
}
