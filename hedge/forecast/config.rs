use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    engine::ForecastEngine,
    error::{ForecastError, ForecastResult},
    experts::{default_roster, Expert, Side, Strategy},
    loss::ZeroOneLoss,
    random::{RandomSource, SeededRandom},
};

/// Game settings: episode length, optional seed, and the expert roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameConfig {
    /// Round budget of one episode.
    pub rounds: usize,
    /// Seed for the engine's random source; entropy when absent.
    pub seed: Option<u64>,
    /// Roster in display order.
    pub experts: Vec<ExpertConfig>,
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpertConfig {
    /// Display label; derived from the strategy when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Strategy and its parameters.
    #[serde(flatten)]
    pub strategy: Strategy,
}

impl ExpertConfig {
    /// Entry with an explicit label.
    #[must_use]
    pub fn labelled(label: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            label: Some(label.into()),
            strategy,
        }
    }

    /// Label shown in diagnostics.
    #[must_use]
    pub fn display_label(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| self.strategy.label())
    }
}

#[derive(Debug, Deserialize)]
struct GameConfigSerde {
    #[serde(default = "default_rounds")]
    rounds: usize,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    experts: Option<Vec<ExpertConfig>>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            seed: None,
            experts: default_experts(),
        }
    }
}

impl GameConfig {
    /// Loads and validates a TOML document.
    pub fn load(path: impl AsRef<Path>) -> ForecastResult<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Parses and validates a TOML document. A missing `experts` key selects the built-in
    /// roster; an explicitly empty one is rejected.
    pub fn from_toml_str(raw: &str) -> ForecastResult<Self> {
        let document: GameConfigSerde = toml::from_str(raw)?;
        let config = Self {
            rounds: document.rounds,
            seed: document.seed,
            experts: document.experts.unwrap_or_else(default_experts),
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks the round budget, roster size, labels, and every strategy parameter.
    pub fn validate(&self) -> ForecastResult<()> {
        if self.rounds == 0 {
            return Err(ForecastError::ZeroRoundBudget);
        }
        if self.experts.is_empty() {
            return Err(ForecastError::EmptyRoster);
        }
        for entry in &self.experts {
            if entry.label.as_deref().is_some_and(|label| label.trim().is_empty()) {
                return Err(ForecastError::Config(format!(
                    "blank label on {} expert",
                    entry.strategy.kind()
                )));
            }
            entry.strategy.validate()?;
        }
        Ok(())
    }

    /// Display labels in roster order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.experts.iter().map(ExpertConfig::display_label).collect()
    }

    /// Random source implied by `seed`.
    #[must_use]
    pub fn random_source(&self) -> SeededRandom {
        self.seed
            .map_or_else(SeededRandom::from_entropy, SeededRandom::from_seed)
    }

    /// Zero-one-loss engine over the configured roster.
    pub fn build_engine(
        &self,
        random: impl RandomSource + 'static,
    ) -> ForecastResult<ForecastEngine<Side, Side>> {
        self.validate()?;
        let experts = self
            .experts
            .iter()
            .map(|entry| Box::new(entry.strategy) as Box<dyn Expert<Side, Side>>)
            .collect();
        ForecastEngine::new(ZeroOneLoss, self.rounds, experts, self.labels(), random)
    }
}

const fn default_rounds() -> usize {
    100
}

fn default_experts() -> Vec<ExpertConfig> {
    default_roster()
        .into_iter()
        .map(|(label, strategy)| ExpertConfig::labelled(label, strategy))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SequenceRandom;
    use tempfile::tempdir;

    const DOCUMENT: &str = r#"
rounds = 12
seed = 7

[[experts]]
label = "always left"
kind = "constant"
side = "left"

[[experts]]
kind = "exponential"
beta = 0.8

[[experts]]
kind = "cosine"
omega = 1.5
phi = 0.25
"#;

    #[test]
    fn parses_roster_with_derived_labels() {
        let config = GameConfig::from_toml_str(DOCUMENT).unwrap();
        assert_eq!(config.rounds, 12);
        assert_eq!(config.seed, Some(7));
        assert_eq!(
            config.labels(),
            vec![
                "always left".to_string(),
                "exponential(beta=0.80)".to_string(),
                "cosine(omega=1.50, phi=0.25)".to_string(),
            ]
        );
        assert_eq!(
            config.experts[2].strategy,
            Strategy::Cosine {
                omega: 1.5,
                phi: 0.25
            }
        );
    }

    #[test]
    fn missing_roster_selects_defaults() {
        let config = GameConfig::from_toml_str("rounds = 30").unwrap();
        assert_eq!(config.rounds, 30);
        assert_eq!(config.experts.len(), default_roster().len());
        assert_eq!(GameConfig::from_toml_str("").unwrap(), GameConfig::default());
    }

    #[test]
    fn rejects_invalid_documents() {
        assert!(matches!(
            GameConfig::from_toml_str("experts = []"),
            Err(ForecastError::EmptyRoster)
        ));
        assert!(matches!(
            GameConfig::from_toml_str("rounds = 0"),
            Err(ForecastError::ZeroRoundBudget)
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[[experts]]\nkind = \"proportion\"\np = 2.0"),
            Err(ForecastError::InvalidParameter { parameter: "p", .. })
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[[experts]]\nkind = \"oracle\""),
            Err(ForecastError::Toml(_))
        ));
        assert!(matches!(
            GameConfig::from_toml_str("[[experts]]\nlabel = \" \"\nkind = \"constant\"\nside = \"left\""),
            Err(ForecastError::Config(_))
        ));
    }

    #[test]
    fn loads_from_disk_and_builds_engine() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("game.toml");
        fs::write(&path, DOCUMENT).unwrap();
        let config = GameConfig::load(&path).unwrap();
        let mut engine = config.build_engine(SequenceRandom::new(vec![0.1])).unwrap();
        assert_eq!(engine.expert_count(), 3);
        assert_eq!(engine.round_budget(), 12);
        assert_eq!(engine.labels()[0], "always left");
        let prediction = engine.predict();
        engine.update(prediction, Side::Left);
        assert_eq!(engine.scores()[0], 0.0);

        assert!(matches!(
            GameConfig::load(tmp.path().join("missing.toml")),
            Err(ForecastError::Io(_))
        ));
    }

    #[test]
    fn seeded_configs_replay_identically() {
        let config = GameConfig {
            rounds: 20,
            seed: Some(99),
            ..GameConfig::default()
        };
        let mut a = config.build_engine(config.random_source()).unwrap();
        let mut b = config.build_engine(config.random_source()).unwrap();
        for round in 0..20 {
            let outcome = if round % 3 == 0 { Side::Right } else { Side::Left };
            let (pa, pb) = (a.predict(), b.predict());
            assert_eq!(pa, pb);
            a.update(pa, outcome);
            b.update(pb, outcome);
        }
        assert_eq!(a.scores(), b.scores());
    }
}
