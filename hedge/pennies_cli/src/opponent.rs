use anyhow::{bail, Result};
use clap::ValueEnum;
use hedge_forecast::{RandomSource, SeededRandom, Side};

/// Scripted opponent families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OpponentKind {
    /// Left with a fixed probability.
    Biased,
    /// Left, right, left, ...
    Alternating,
    /// Cycles through `--moves`.
    Repeat,
}

/// Move generator standing in for a human player.
#[derive(Debug)]
pub enum Opponent {
    Biased { bias: f64, random: SeededRandom },
    Alternating { next: Side },
    Repeat { moves: Vec<Side>, cursor: usize },
}

impl Opponent {
    pub fn build(kind: OpponentKind, bias: f64, moves: &str, random: SeededRandom) -> Result<Self> {
        match kind {
            OpponentKind::Biased => {
                if !(0.0..=1.0).contains(&bias) {
                    bail!("--bias must lie in [0, 1], got {bias}");
                }
                Ok(Self::Biased { bias, random })
            }
            OpponentKind::Alternating => Ok(Self::Alternating { next: Side::Left }),
            OpponentKind::Repeat => Ok(Self::Repeat {
                moves: parse_moves(moves)?,
                cursor: 0,
            }),
        }
    }

    pub fn next_move(&mut self) -> Side {
        match self {
            Self::Biased { bias, random } => Side::left_with_probability(*bias, random.draw()),
            Self::Alternating { next } => {
                let side = *next;
                *next = side.flip();
                side
            }
            Self::Repeat { moves, cursor } => {
                let side = moves[*cursor % moves.len()];
                *cursor += 1;
                side
            }
        }
    }
}

/// Parses a move string such as `LLRL`; whitespace and commas are ignored.
pub fn parse_moves(raw: &str) -> Result<Vec<Side>> {
    let moves = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .map(|c| match c.to_ascii_uppercase() {
            'L' => Ok(Side::Left),
            'R' => Ok(Side::Right),
            other => bail!("unexpected move `{other}` in `{raw}`"),
        })
        .collect::<Result<Vec<_>>>()?;
    if moves.is_empty() {
        bail!("--moves must contain at least one of L or R");
    }
    Ok(moves)
}
