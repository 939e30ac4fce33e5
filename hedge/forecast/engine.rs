//! Exponential-weights forecaster over a fixed roster of experts.
//!
//! Each round every expert's advice is cached, [`ForecastEngine::predict`] follows one expert
//! drawn with probability proportional to `exp(eta * score)`, and
//! [`ForecastEngine::update`] charges every expert the loss of the advice it actually gave
//! before refreshing advice for the next round.

use std::{fmt, hash::Hash};

use chrono::Utc;
use indexmap::IndexMap;
use serde_json::json;
use shared_logging::LogLevel;

use crate::{
    diagnostics::{self, ActionWeight, EngineSnapshot, ExpertStanding},
    error::{ForecastError, ForecastResult},
    experts::{Expert, History},
    loss::Loss,
    random::RandomSource,
    sampler::softmax_sample,
    telemetry::ForecastTelemetry,
};

/// Online forecaster combining expert advice with the Hedge update.
///
/// Not synchronised; callers serialise access. Nothing stops `update` after the round budget
/// is spent, so callers check [`ForecastEngine::gameover`].
pub struct ForecastEngine<A, Y> {
    experts: Vec<Box<dyn Expert<A, Y>>>,
    labels: Vec<String>,
    loss: Box<dyn Loss<A, Y>>,
    random: Box<dyn RandomSource>,
    round_budget: usize,
    eta: f64,
    predictions: Vec<A>,
    outcomes: Vec<Y>,
    advice: Vec<A>,
    scores: Vec<f64>,
    round: usize,
    cumulative_loss: f64,
    telemetry: Option<ForecastTelemetry>,
}

impl<A, Y> fmt::Debug for ForecastEngine<A, Y> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastEngine")
            .field("experts", &self.labels)
            .field("round", &self.round)
            .field("round_budget", &self.round_budget)
            .field("eta", &self.eta)
            .field("cumulative_loss", &self.cumulative_loss)
            .finish_non_exhaustive()
    }
}

impl<A, Y> ForecastEngine<A, Y> {
    /// Builds an engine and computes round-0 advice.
    ///
    /// The learning rate is fixed at `sqrt(2 ln n / round_budget)` for `n` experts. Fails on
    /// an empty roster, a zero budget, or a label count that differs from the roster size.
    pub fn new(
        loss: impl Loss<A, Y> + 'static,
        round_budget: usize,
        experts: Vec<Box<dyn Expert<A, Y>>>,
        labels: Vec<String>,
        random: impl RandomSource + 'static,
    ) -> ForecastResult<Self> {
        if experts.is_empty() {
            return Err(ForecastError::EmptyRoster);
        }
        if round_budget == 0 {
            return Err(ForecastError::ZeroRoundBudget);
        }
        if labels.len() != experts.len() {
            return Err(ForecastError::LabelMismatch {
                experts: experts.len(),
                labels: labels.len(),
            });
        }
        let n = experts.len();
        let eta = (2.0 * (n as f64).ln() / round_budget as f64).sqrt();
        let mut engine = Self {
            experts,
            labels,
            loss: Box::new(loss),
            random: Box::new(random),
            round_budget,
            eta,
            predictions: Vec::with_capacity(round_budget),
            outcomes: Vec::with_capacity(round_budget),
            advice: Vec::with_capacity(n),
            scores: vec![0.0; n],
            round: 0,
            cumulative_loss: 0.0,
            telemetry: None,
        };
        engine.reset();
        Ok(engine)
    }

    /// Attaches telemetry and logs the header of the episode in progress.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: ForecastTelemetry) -> Self {
        self.set_telemetry(telemetry);
        self
    }

    /// Sets telemetry after construction. Writes the `engine.reset` header for the current
    /// episode without drawing from the random source.
    pub fn set_telemetry(&mut self, telemetry: ForecastTelemetry) {
        self.telemetry = Some(telemetry);
        self.log_reset();
    }

    /// Starts a fresh episode: zero scores and loss, empty histories, new round-0 advice.
    /// The roster is kept.
    pub fn reset(&mut self) {
        self.round = 0;
        self.cumulative_loss = 0.0;
        self.predictions.clear();
        self.outcomes.clear();
        self.scores.iter_mut().for_each(|score| *score = 0.0);
        self.refresh_advice();
        self.log_reset();
    }

    /// Whether the round budget is spent.
    #[must_use]
    pub const fn gameover(&self) -> bool {
        self.round >= self.round_budget
    }

    /// Samples the expert to follow this round. Only the random source advances.
    pub fn choose_expert(&mut self) -> usize {
        softmax_sample(&self.scores, self.eta, &mut self.random)
    }

    /// Records a completed round.
    ///
    /// Adds the loss of `prediction` to the running total, charges every expert the loss of
    /// its cached advice, appends to both histories, then refreshes advice for the next
    /// round. `prediction` need not come from [`ForecastEngine::predict`].
    pub fn update(&mut self, prediction: A, outcome: Y) {
        let incurred = self.loss.loss(&prediction, &outcome);
        self.cumulative_loss += incurred;
        for (score, advice) in self.scores.iter_mut().zip(&self.advice) {
            *score -= self.loss.loss(advice, &outcome);
        }
        self.predictions.push(prediction);
        self.outcomes.push(outcome);
        self.round += 1;
        self.refresh_advice();

        if self.telemetry.is_some() {
            let weights = self.percentage_weights();
            let leader = diagnostics::ranking(&weights)[0];
            self.emit(
                LogLevel::Debug,
                "engine.round",
                json!({
                    "round": self.round,
                    "loss": incurred,
                    "cumulative_loss": self.cumulative_loss,
                    "leader": self.labels[leader],
                    "leader_weight_pct": weights[leader],
                }),
            );
            if self.round == self.round_budget {
                let best = self.scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                self.emit(
                    LogLevel::Info,
                    "engine.finished",
                    json!({
                        "rounds": self.round,
                        "cumulative_loss": self.cumulative_loss,
                        "best_expert_loss": -best,
                    }),
                );
            }
        }
    }

    /// Completed rounds.
    #[must_use]
    pub const fn round(&self) -> usize {
        self.round
    }

    /// Configured episode length.
    #[must_use]
    pub const fn round_budget(&self) -> usize {
        self.round_budget
    }

    /// Learning rate.
    #[must_use]
    pub const fn eta(&self) -> f64 {
        self.eta
    }

    /// Loss of the forecasts committed so far.
    #[must_use]
    pub const fn cumulative_loss(&self) -> f64 {
        self.cumulative_loss
    }

    /// Roster size.
    #[must_use]
    pub fn expert_count(&self) -> usize {
        self.experts.len()
    }

    /// Display labels in roster order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Negated cumulative loss of every expert.
    #[must_use]
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    /// Cached advice for the current round.
    #[must_use]
    pub fn advice(&self) -> &[A] {
        &self.advice
    }

    /// Forecast history.
    #[must_use]
    pub fn predictions(&self) -> &[A] {
        &self.predictions
    }

    /// Outcome history.
    #[must_use]
    pub fn outcomes(&self) -> &[Y] {
        &self.outcomes
    }

    /// Selection probability of every expert in percent.
    #[must_use]
    pub fn percentage_weights(&self) -> Vec<f64> {
        diagnostics::percentage_weights(&self.scores, self.eta)
    }

    /// Expert indices by descending weight, ties in roster order.
    #[must_use]
    pub fn ranking(&self) -> Vec<usize> {
        diagnostics::ranking(&self.percentage_weights())
    }

    fn refresh_advice(&mut self) {
        let history = History::new(&self.predictions, &self.outcomes);
        let random = &mut self.random;
        self.advice = self
            .experts
            .iter()
            .map(|expert| expert.advise(history, random.draw()))
            .collect();
    }

    fn log_reset(&self) {
        self.emit(
            LogLevel::Info,
            "engine.reset",
            json!({
                "experts": self.experts.len(),
                "round_budget": self.round_budget,
                "eta": self.eta,
                "round": self.round,
            }),
        );
    }

    fn emit(&self, level: LogLevel, message: &str, metadata: serde_json::Value) {
        if let Some(telemetry) = &self.telemetry {
            if let Err(err) = telemetry.log(level, message, metadata) {
                eprintln!("forecast telemetry failed: {err:?}");
            }
        }
    }
}

impl<A: Clone, Y> ForecastEngine<A, Y> {
    /// Forecast for the current round: the cached advice of a sampled expert. Repeated calls
    /// before `update` may follow different experts.
    pub fn predict(&mut self) -> A {
        let idx = self.choose_expert();
        self.advice[idx].clone()
    }
}

impl<A: Clone + Eq + Hash, Y> ForecastEngine<A, Y> {
    /// Percentage weight behind each distinct piece of current advice.
    #[must_use]
    pub fn action_percentage_weights(&self) -> IndexMap<A, f64> {
        diagnostics::action_percentage_weights(&self.advice, &self.percentage_weights())
    }

    /// Point-in-time view for tables and reports.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot<A> {
        let weights = self.percentage_weights();
        let standings = diagnostics::ranking(&weights)
            .into_iter()
            .map(|index| ExpertStanding {
                index,
                label: self.labels[index].clone(),
                score: self.scores[index],
                weight_pct: weights[index],
                advice: self.advice[index].clone(),
            })
            .collect();
        let actions = diagnostics::action_percentage_weights(&self.advice, &weights)
            .into_iter()
            .map(|(action, weight_pct)| ActionWeight { action, weight_pct })
            .collect();
        EngineSnapshot {
            captured_at: Utc::now(),
            round: self.round,
            round_budget: self.round_budget,
            cumulative_loss: self.cumulative_loss,
            eta: self.eta,
            gameover: self.gameover(),
            standings,
            actions,
        }
    }
}
