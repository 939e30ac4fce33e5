use std::f64::consts::{FRAC_PI_2, PI};

use super::{Side, Strategy};

/// Built-in roster for the left/right game as `(label, strategy)` pairs.
///
/// Covers constant bias, last-outcome conditioning, hit/miss streaks, decayed and periodic
/// aggregates, and pair-conditioned play.
#[must_use]
pub fn default_roster() -> Vec<(String, Strategy)> {
    let strategies = [
        Strategy::Constant { side: Side::Left },
        Strategy::Constant { side: Side::Right },
        Strategy::Proportion { p: 0.25 },
        Strategy::Proportion { p: 0.5 },
        Strategy::Proportion { p: 0.75 },
        Strategy::Correlated { p: 0.9 },
        Strategy::Correlated { p: 0.1 },
        Strategy::Streak { p: 0.9 },
        Strategy::Streak { p: 0.1 },
        Strategy::Exponential { beta: 0.5 },
        Strategy::Exponential { beta: 0.8 },
        Strategy::Exponential { beta: 0.95 },
        Strategy::Cosine { omega: PI, phi: 0.0 },
        Strategy::Cosine {
            omega: FRAC_PI_2,
            phi: 0.0,
        },
        Strategy::Cosine {
            omega: FRAC_PI_2,
            phi: FRAC_PI_2,
        },
        Strategy::LengthTwo {
            ll: 0.9,
            lr: 0.1,
            rl: 0.9,
            rr: 0.1,
        },
        Strategy::LengthTwo {
            ll: 0.1,
            lr: 0.9,
            rl: 0.1,
            rr: 0.9,
        },
        Strategy::LengthTwo {
            ll: 0.1,
            lr: 0.1,
            rl: 0.9,
            rr: 0.9,
        },
    ];
    strategies
        .into_iter()
        .map(|strategy| (strategy.label(), strategy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_roster_is_valid_and_uniquely_labelled() {
        let roster = default_roster();
        assert!(roster.len() > 1);
        let labels: HashSet<&str> = roster.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels.len(), roster.len());
        for (_, strategy) in &roster {
            strategy.validate().unwrap();
        }
    }
}
