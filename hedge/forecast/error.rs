use thiserror::Error;

/// Result alias used by fallible forecasting entry points.
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Errors surfaced while configuring or constructing a forecaster.
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The roster has no experts, so the learning rate is undefined.
    #[error("expert roster is empty")]
    EmptyRoster,
    /// A round budget of zero leaves the learning rate undefined.
    #[error("round budget must be positive")]
    ZeroRoundBudget,
    /// Labels and experts must pair up one to one.
    #[error("roster has {experts} experts but {labels} labels")]
    LabelMismatch {
        /// Number of experts supplied.
        experts: usize,
        /// Number of labels supplied.
        labels: usize,
    },
    /// A strategy parameter is outside its admissible range.
    #[error("{strategy}: parameter `{parameter}` = {value} is out of range")]
    InvalidParameter {
        /// Strategy kind.
        strategy: &'static str,
        /// Offending parameter name.
        parameter: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// Configuration document is semantically invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// I/O error (filesystem).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing failure.
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
