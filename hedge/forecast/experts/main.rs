//! Expert contract and the strategy set for the binary left/right game.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Built-in roster.
pub mod roster;
/// Tagged strategy implementations.
pub mod strategies;

pub use roster::default_roster;
pub use strategies::Strategy;

/// Read-only view of everything observed before the current round.
#[derive(Debug)]
pub struct History<'a, A, Y> {
    /// Forecasts committed in earlier rounds.
    pub predictions: &'a [A],
    /// Outcomes realised in earlier rounds.
    pub outcomes: &'a [Y],
    /// Index of the round being advised; equals the history length.
    pub round: usize,
}

impl<A, Y> Clone for History<'_, A, Y> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A, Y> Copy for History<'_, A, Y> {}

impl<'a, A, Y> History<'a, A, Y> {
    /// Creates a view over parallel histories.
    #[must_use]
    pub const fn new(predictions: &'a [A], outcomes: &'a [Y]) -> Self {
        Self {
            predictions,
            outcomes,
            round: outcomes.len(),
        }
    }

    /// Whether no round has completed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// A prediction strategy.
///
/// `advise` must be a pure function of the history and the single uniform `draw` in `[0, 1)`
/// that the engine takes on the strategy's behalf every round. It must also cope with an
/// empty history.
pub trait Expert<A, Y> {
    /// Advice for the round `history.round`.
    fn advise(&self, history: History<'_, A, Y>, draw: f64) -> A;
}

impl<A, Y, F> Expert<A, Y> for F
where
    F: Fn(History<'_, A, Y>, f64) -> A,
{
    fn advise(&self, history: History<'_, A, Y>, draw: f64) -> A {
        self(history, draw)
    }
}

/// One move of the matching game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Sign `-1`.
    Left,
    /// Sign `+1`.
    Right,
}

impl Side {
    /// `-1` for left, `+1` for right.
    #[must_use]
    pub const fn sign(self) -> i8 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    /// Maps a sign back to a side; non-negative values are right.
    #[must_use]
    pub const fn from_sign(sign: i8) -> Self {
        if sign < 0 {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// The other side.
    #[must_use]
    pub const fn flip(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Left when `draw < p_left`, right otherwise.
    #[must_use]
    pub fn left_with_probability(p_left: f64, draw: f64) -> Self {
        if draw < p_left {
            Self::Left
        } else {
            Self::Right
        }
    }

    /// Single-letter tag used by the CLI.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

impl FromStr for Side {
    type Err = ForecastError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l" | "left" | "-1" => Ok(Self::Left),
            "r" | "right" | "1" | "+1" => Ok(Self::Right),
            other => Err(ForecastError::Config(format!("unknown side `{other}`"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_round_trips_through_sign_and_text() {
        for side in [Side::Left, Side::Right] {
            assert_eq!(Side::from_sign(side.sign()), side);
            assert_eq!(side.to_string().parse::<Side>().unwrap(), side);
            assert_eq!(side.flip().flip(), side);
        }
        assert_eq!(" R ".parse::<Side>().unwrap(), Side::Right);
        assert!("up".parse::<Side>().is_err());
    }

    #[test]
    fn left_probability_threshold_is_strict() {
        assert_eq!(Side::left_with_probability(0.0, 0.0), Side::Right);
        assert_eq!(Side::left_with_probability(1.0, 0.999), Side::Left);
        assert_eq!(Side::left_with_probability(0.5, 0.5), Side::Right);
    }

    #[test]
    fn closures_are_experts() {
        let echo = |history: History<'_, Side, Side>, _draw: f64| {
            history.outcomes.last().copied().unwrap_or(Side::Left)
        };
        let outcomes = [Side::Right];
        let predictions = [Side::Left];
        let history = History::new(&predictions, &outcomes);
        assert_eq!(history.round, 1);
        assert_eq!(echo.advise(history, 0.0), Side::Right);
        assert_eq!(echo.advise(History::new(&[], &[]), 0.0), Side::Left);
    }
}
