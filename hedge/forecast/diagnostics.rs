//! Display-only views derived from scores. Nothing here feeds back into the engine.

use std::hash::Hash;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::sampler::stabilized_weights;

/// Selection probability of every expert in percent, summing to 100.
///
/// Uses the same max-anchored exponentiation as [`crate::sampler::softmax_sample`].
#[must_use]
pub fn percentage_weights(scores: &[f64], eta: f64) -> Vec<f64> {
    let weights = stabilized_weights(scores, eta);
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| 100.0 * w / total).collect()
}

/// Expert indices ordered by descending weight; ties keep their original order.
#[must_use]
pub fn ranking(weights: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..weights.len()).collect();
    indices.sort_by(|&a, &b| weights[b].total_cmp(&weights[a]));
    indices
}

/// Total weight behind each distinct piece of advice, keyed in order of first appearance.
#[must_use]
pub fn action_percentage_weights<A: Clone + Eq + Hash>(
    advice: &[A],
    weights: &[f64],
) -> IndexMap<A, f64> {
    let mut totals = IndexMap::new();
    for (action, weight) in advice.iter().zip(weights) {
        *totals.entry(action.clone()).or_insert(0.0) += weight;
    }
    totals
}

/// One row of the standings table.
#[derive(Debug, Clone, Serialize)]
pub struct ExpertStanding<A> {
    /// Position in the roster.
    pub index: usize,
    /// Display label.
    pub label: String,
    /// Negated cumulative loss.
    pub score: f64,
    /// Selection probability in percent.
    pub weight_pct: f64,
    /// Advice for the current round.
    pub advice: A,
}

/// Aggregated weight behind one action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionWeight<A> {
    /// Advised action.
    pub action: A,
    /// Summed selection probability in percent.
    pub weight_pct: f64,
}

/// Point-in-time view of an engine for tables and JSON reports.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSnapshot<A> {
    /// When the snapshot was taken.
    pub captured_at: DateTime<Utc>,
    /// Completed rounds.
    pub round: usize,
    /// Configured episode length.
    pub round_budget: usize,
    /// Loss of the engine's own forecasts.
    pub cumulative_loss: f64,
    /// Learning rate.
    pub eta: f64,
    /// Whether the budget is exhausted.
    pub gameover: bool,
    /// Experts ordered by descending weight.
    pub standings: Vec<ExpertStanding<A>>,
    /// Weight aggregated per distinct advised action.
    pub actions: Vec<ActionWeight<A>>,
}

impl<A> EngineSnapshot<A> {
    /// Leading expert, if any.
    #[must_use]
    pub fn leader(&self) -> Option<&ExpertStanding<A>> {
        self.standings.first()
    }

    /// Best expert's cumulative loss subtracted from the engine's.
    #[must_use]
    pub fn regret(&self) -> f64 {
        let best = self
            .standings
            .iter()
            .map(|standing| -standing.score)
            .fold(f64::INFINITY, f64::min);
        if best.is_finite() {
            self.cumulative_loss - best
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_sum_to_one_hundred() {
        for eta in [0.01, 0.5, 3.0] {
            let weights = percentage_weights(&[0.0, -2.0, -40.0, -1.0e4], eta);
            assert!(weights.iter().all(|w| *w >= 0.0));
            let total: f64 = weights.iter().sum();
            assert!((total - 100.0).abs() < 1e-6);
        }
        assert!(percentage_weights(&[], 1.0).is_empty());
    }

    #[test]
    fn zero_scores_split_evenly() {
        let weights = percentage_weights(&[0.0; 4], 0.7);
        assert!(weights.iter().all(|w| (w - 25.0).abs() < 1e-12));
    }

    #[test]
    fn ranking_is_descending_and_stable() {
        assert_eq!(ranking(&[10.0, 40.0, 10.0, 40.0]), vec![1, 3, 0, 2]);
        assert!(ranking(&[]).is_empty());
    }

    #[test]
    fn action_weights_aggregate_by_value() {
        let totals = action_percentage_weights(&['b', 'a', 'b'], &[20.0, 50.0, 30.0]);
        assert_eq!(totals.keys().copied().collect::<Vec<_>>(), vec!['b', 'a']);
        assert!((totals[&'b'] - 50.0).abs() < 1e-12);
        assert!((totals[&'a'] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn regret_compares_against_best_expert() {
        let snapshot = EngineSnapshot {
            captured_at: Utc::now(),
            round: 4,
            round_budget: 4,
            cumulative_loss: 2.0,
            eta: 0.5,
            gameover: true,
            standings: vec![
                ExpertStanding {
                    index: 1,
                    label: "a".into(),
                    score: -1.0,
                    weight_pct: 70.0,
                    advice: 'x',
                },
                ExpertStanding {
                    index: 0,
                    label: "b".into(),
                    score: -3.0,
                    weight_pct: 30.0,
                    advice: 'y',
                },
            ],
            actions: Vec::new(),
        };
        assert_eq!(snapshot.leader().unwrap().label, "a");
        assert!((snapshot.regret() - 1.0).abs() < 1e-12);
    }
}
