#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Online prediction with expert advice: an exponential-weights forecaster over a roster of
//! history-driven strategies, with diagnostics, configuration, and telemetry.

/// Error types shared across the crate.
#[path = "../error.rs"]
pub mod error;

/// Uniform random sources.
#[path = "../random.rs"]
pub mod random;

/// Weighted and softmax index sampling.
#[path = "../sampler.rs"]
pub mod sampler;

/// Loss functions.
#[path = "../loss.rs"]
pub mod loss;

/// Expert contract and the binary strategy set.
#[path = "../experts/main.rs"]
pub mod experts;

/// Derived weight views and engine snapshots.
#[path = "../diagnostics.rs"]
pub mod diagnostics;

/// Structured logging for engine lifecycle events.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// The exponential-weights forecaster.
#[path = "../engine.rs"]
pub mod engine;

/// TOML game configuration and engine construction.
#[path = "../config.rs"]
pub mod config;

pub use config::{ExpertConfig, GameConfig};
pub use diagnostics::{EngineSnapshot, ExpertStanding};
pub use engine::ForecastEngine;
pub use error::{ForecastError, ForecastResult};
pub use experts::{default_roster, Expert, History, Side, Strategy};
pub use loss::{zero_one_loss, Loss, ZeroOneLoss};
pub use random::{RandomSource, SeededRandom, SequenceRandom, SharedRandom};
pub use sampler::{sample, softmax_sample, stabilized_weights};
pub use telemetry::{ForecastTelemetry, ForecastTelemetryBuilder};
