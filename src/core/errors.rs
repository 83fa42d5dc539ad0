use thiserror::Error;

/// Invalid simulation configuration. Raised before any simulated time passes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("mean inter-arrival time must be positive, got {0}")]
    NonPositiveArrivalMean(f64),

    #[error("at least one resource group is required")]
    NoGroups,

    #[error("resource group names must not be empty")]
    EmptyGroupName,

    #[error("duplicate resource group name '{0}'")]
    DuplicateGroupName(String),

    #[error("group '{group}' needs at least one server")]
    NoServers { group: String },

    #[error("group '{group}' mean service time must be positive, got {value}")]
    NonPositiveServiceTime { group: String, value: f64 },

    #[error("group '{group}' routing probability must be positive, got {value}")]
    NonPositiveProbability { group: String, value: f64 },

    #[error("routing table is empty")]
    EmptyRoutingTable,

    #[error("routing probabilities must sum to 1, got {0}")]
    ProbabilitySum(f64),

    #[error("horizon must be finite and not before the current clock {now}, got {horizon}")]
    InvalidHorizon { horizon: f64, now: f64 },

    #[error("arrival cutoff must be finite and non-negative, got {0}")]
    InvalidArrivalCutoff(f64),
}

/// Errors surfaced by whole-run operations such as parameter sweeps.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build sweep thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type SimResult<T> = Result<T, SimError>;
