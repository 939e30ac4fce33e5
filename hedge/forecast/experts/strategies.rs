use serde::{Deserialize, Serialize};

use super::{Expert, History, Side};
use crate::error::{ForecastError, ForecastResult};

/// Probability of `Left` used whenever a strategy lacks the history it conditions on.
const PRIOR_LEFT: f64 = 0.5;

/// Below this magnitude the cosine normaliser is treated as zero.
const COSINE_DEGENERATE: f64 = 1e-9;

/// Strategies for the left/right game. Every variant compares the round's draw against a
/// threshold read off the history; a draw below the threshold picks the favoured side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// Always the same side.
    Constant {
        /// Side played every round.
        side: Side,
    },
    /// Left with fixed probability `p`, ignoring history.
    Proportion {
        /// Probability of `Left`.
        p: f64,
    },
    /// Repeats the last outcome with probability `p`, otherwise plays its opposite.
    Correlated {
        /// Probability of repeating.
        p: f64,
    },
    /// Multiplies the signs of the last forecast and last outcome (right after a hit, left
    /// after a miss) and plays that side with probability `p`.
    Streak {
        /// Probability of following the hit/miss signal.
        p: f64,
    },
    /// Exponentially decayed mean `m` of outcome signs; plays `Left` with probability
    /// `(m + 1) / 2`, leaning against a run.
    Exponential {
        /// Per-round decay in `(0, 1)`.
        beta: f64,
    },
    /// Cosine-weighted mean of outcome signs with weights `cos(omega * i + phi)`; plays `Left`
    /// with probability `(m + 1) / 2`, clamped into `[0, 1]`.
    Cosine {
        /// Angular frequency.
        omega: f64,
        /// Phase offset.
        phi: f64,
    },
    /// Probability of `Left` chosen by the exact pair of the two most recent outcomes.
    LengthTwo {
        /// After left, left.
        ll: f64,
        /// After left, right.
        lr: f64,
        /// After right, left.
        rl: f64,
        /// After right, right.
        rr: f64,
    },
}

impl Strategy {
    /// Serde tag of the variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Proportion { .. } => "proportion",
            Self::Correlated { .. } => "correlated",
            Self::Streak { .. } => "streak",
            Self::Exponential { .. } => "exponential",
            Self::Cosine { .. } => "cosine",
            Self::LengthTwo { .. } => "length_two",
        }
    }

    /// Display label derived from the parameters.
    #[must_use]
    pub fn label(&self) -> String {
        match *self {
            Self::Constant { side } => format!("constant({side})"),
            Self::Proportion { p } => format!("proportion(p={p:.2})"),
            Self::Correlated { p } => format!("correlated(p={p:.2})"),
            Self::Streak { p } => format!("streak(p={p:.2})"),
            Self::Exponential { beta } => format!("exponential(beta={beta:.2})"),
            Self::Cosine { omega, phi } => format!("cosine(omega={omega:.2}, phi={phi:.2})"),
            Self::LengthTwo { ll, lr, rl, rr } => {
                format!("length_two({ll:.2}, {lr:.2}, {rl:.2}, {rr:.2})")
            }
        }
    }

    /// Checks every parameter against its admissible range.
    pub fn validate(&self) -> ForecastResult<()> {
        let kind = self.kind();
        match *self {
            Self::Constant { .. } => Ok(()),
            Self::Proportion { p } | Self::Correlated { p } | Self::Streak { p } => {
                probability(kind, "p", p)
            }
            Self::Exponential { beta } => {
                if beta > 0.0 && beta < 1.0 {
                    Ok(())
                } else {
                    Err(invalid(kind, "beta", beta))
                }
            }
            Self::Cosine { omega, phi } => {
                if !omega.is_finite() {
                    return Err(invalid(kind, "omega", omega));
                }
                if !phi.is_finite() {
                    return Err(invalid(kind, "phi", phi));
                }
                Ok(())
            }
            Self::LengthTwo { ll, lr, rl, rr } => {
                probability(kind, "ll", ll)?;
                probability(kind, "lr", lr)?;
                probability(kind, "rl", rl)?;
                probability(kind, "rr", rr)
            }
        }
    }
}

impl Expert<Side, Side> for Strategy {
    fn advise(&self, history: History<'_, Side, Side>, draw: f64) -> Side {
        let outcomes = history.outcomes;
        match *self {
            Self::Constant { side } => side,
            Self::Proportion { p } => Side::left_with_probability(p, draw),
            Self::Correlated { p } => outcomes
                .last()
                .map_or_else(|| prior(draw), |last| follow(*last, p, draw)),
            Self::Streak { p } => match (history.predictions.last(), outcomes.last()) {
                (Some(prediction), Some(outcome)) => follow(
                    Side::from_sign(prediction.sign() * outcome.sign()),
                    p,
                    draw,
                ),
                _ => prior(draw),
            },
            Self::Exponential { beta } => {
                if outcomes.is_empty() {
                    return prior(draw);
                }
                let (accum, weight) = outcomes.iter().fold((0.0, 0.0), |(accum, weight), side| {
                    (accum * beta + f64::from(side.sign()), weight * beta + 1.0)
                });
                Side::left_with_probability((accum / weight + 1.0) / 2.0, draw)
            }
            Self::Cosine { omega, phi } => {
                if outcomes.is_empty() {
                    return prior(draw);
                }
                let (accum, total) = outcomes.iter().enumerate().fold(
                    (0.0, 0.0),
                    |(accum, total), (idx, side)| {
                        let weight = omega.mul_add(idx as f64, phi).cos();
                        (accum + f64::from(side.sign()) * weight, total + weight)
                    },
                );
                if total.abs() < COSINE_DEGENERATE {
                    return prior(draw);
                }
                Side::left_with_probability(((accum / total + 1.0) / 2.0).clamp(0.0, 1.0), draw)
            }
            Self::LengthTwo { ll, lr, rl, rr } => match outcomes {
                [.., previous, last] => {
                    let p_left = match (previous, last) {
                        (Side::Left, Side::Left) => ll,
                        (Side::Left, Side::Right) => lr,
                        (Side::Right, Side::Left) => rl,
                        (Side::Right, Side::Right) => rr,
                    };
                    Side::left_with_probability(p_left, draw)
                }
                _ => prior(draw),
            },
        }
    }
}

fn prior(draw: f64) -> Side {
    Side::left_with_probability(PRIOR_LEFT, draw)
}

/// `side` when the draw falls below `p`, its opposite otherwise.
fn follow(side: Side, p: f64, draw: f64) -> Side {
    if draw < p {
        side
    } else {
        side.flip()
    }
}

fn probability(strategy: &'static str, parameter: &'static str, value: f64) -> ForecastResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(strategy, parameter, value))
    }
}

fn invalid(strategy: &'static str, parameter: &'static str, value: f64) -> ForecastError {
    ForecastError::InvalidParameter {
        strategy,
        parameter,
        value,
    }
}
