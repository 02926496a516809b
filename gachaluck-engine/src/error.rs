//! Error taxonomy for engine construction and evaluation.
use thiserror::Error;

/// Errors raised when rate, guarantee, percentile or classifier configuration is malformed.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be between 0 and 1 (got {value})")]
    RateOutOfRange { field: &'static str, value: f64 },
    #[error("hard cap must be at least 1 (got {cap})")]
    InvalidHardCap { cap: u32 },
    #[error("soft pity thresholds must ascend strictly ({previous} then {next})")]
    StepsNotAscending { previous: u32, next: u32 },
    #[error("soft pity threshold {threshold} must lie between 1 and the hard cap {cap}")]
    StepOutsideCap { threshold: u32, cap: u32 },
    #[error(
        "soft pity step at {threshold} starts at {actual} but the preceding segment ends at {expected}"
    )]
    DiscontinuousStep {
        threshold: u32,
        expected: f64,
        actual: f64,
    },
    #[error("soft pity slope at {threshold} must not be negative (got {slope})")]
    DecreasingSlope { threshold: u32, slope: f64 },
    #[error("featured rate must be between 0 and 1 (got {value})")]
    FeaturedRateOutOfRange { value: f64 },
    #[error("featured rate must be positive when no guarantee applies")]
    UnreachableFeatured,
    #[error("maximum CDF must lie in (0, 1] (got {value})")]
    MaxCdfOutOfRange { value: f64 },
    #[error("percentile policy invalid: {reason}")]
    PercentilePolicy { reason: String },
    #[error("tier ordinals invalid: common {common}, uncommon {uncommon}, rare {rare}")]
    TierOrder { common: u8, uncommon: u8, rare: u8 },
    #[error("{name} is listed as both featured and standard")]
    RosterOverlap { name: String },
    #[error("variant profile could not be parsed: {0}")]
    Parse(String),
}

/// Errors surfaced synchronously by engine operations.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("draw index must be positive")]
    ZeroDrawIndex,
    #[error("event {index} has rarity {rarity}, which the configuration does not recognize")]
    UnknownRarity { index: usize, rarity: u8 },
    #[error("event {index} has position {position}, breaking {direction} ordering")]
    OutOfOrder {
        index: usize,
        position: u32,
        direction: &'static str,
    },
    #[error("event {index} has position 0; positions are 1-based")]
    ZeroPosition { index: usize },
    #[error("event {index} breaks the log's position pattern; give every event a position or none")]
    PartialPositions { index: usize },
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
