//! Built-in game variants and loadable variant profiles.
use serde::{Deserialize, Serialize};

use crate::classify::{FeaturedClassifier, FeaturedRule};
use crate::constants::{
    DEFAULT_CEILING_PERCENTILE, GI_BASE_RATE, GI_FLOOR_PERCENTILE, GI_HARD_CAP, GI_SOFT_PITY,
    GI_UNCOMMON_RATE, UNCOMMON_HARD_CAP, WW_BASE_RATE, WW_FEATURED_POOLS, WW_FEATURED_ROSTER,
    WW_FLOOR_PERCENTILE, WW_HARD_CAP, WW_SOFT_PITY, WW_STANDARD_POOLS, WW_STANDARD_ROSTER,
    WW_UNCOMMON_RATE,
};
use crate::error::ConfigError;
use crate::event::RarityTiers;
use crate::guarantee::GuaranteeConfig;
use crate::percentile::PercentilePolicy;
use crate::rate::{RateConfig, SoftPityStep};
use crate::simulate::UncommonRate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    WutheringWaves,
    GenshinImpact,
    /// Shares the Wuthering Waves rate table.
    StarRail,
}

impl GameVariant {
    pub const ALL: [Self; 3] = [Self::WutheringWaves, Self::GenshinImpact, Self::StarRail];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::WutheringWaves => "wuthering_waves",
            Self::GenshinImpact => "genshin_impact",
            Self::StarRail => "star_rail",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::WutheringWaves => "Wuthering Waves",
            Self::GenshinImpact => "Genshin Impact",
            Self::StarRail => "Honkai: Star Rail",
        }
    }

    #[must_use]
    pub fn profile(self) -> VariantProfile {
        match self {
            Self::WutheringWaves | Self::StarRail => VariantProfile {
                name: self.display_name().to_string(),
                rate: rate_config(WW_BASE_RATE, &WW_SOFT_PITY, WW_HARD_CAP),
                guarantee: GuaranteeConfig::default(),
                percentile: PercentilePolicy {
                    floor_percentile: WW_FLOOR_PERCENTILE,
                    ceiling_percentile: DEFAULT_CEILING_PERCENTILE,
                    draws_ceiling: WW_HARD_CAP * 2,
                },
                tiers: RarityTiers::default(),
                uncommon: UncommonRate {
                    base_rate: WW_UNCOMMON_RATE,
                    hard_cap: UNCOMMON_HARD_CAP,
                },
                classifier: FeaturedClassifier::new(vec![
                    FeaturedRule::ExplicitFlag,
                    FeaturedRule::name_marker(),
                    FeaturedRule::roster(WW_FEATURED_ROSTER, WW_STANDARD_ROSTER),
                    FeaturedRule::PoolType {
                        featured: WW_FEATURED_POOLS.to_vec(),
                        standard: WW_STANDARD_POOLS.to_vec(),
                    },
                ]),
            },
            Self::GenshinImpact => VariantProfile {
                name: self.display_name().to_string(),
                rate: rate_config(GI_BASE_RATE, &GI_SOFT_PITY, GI_HARD_CAP),
                guarantee: GuaranteeConfig::default(),
                percentile: PercentilePolicy {
                    floor_percentile: GI_FLOOR_PERCENTILE,
                    ceiling_percentile: DEFAULT_CEILING_PERCENTILE,
                    draws_ceiling: GI_HARD_CAP * 2,
                },
                tiers: RarityTiers::default(),
                uncommon: UncommonRate {
                    base_rate: GI_UNCOMMON_RATE,
                    hard_cap: UNCOMMON_HARD_CAP,
                },
                classifier: FeaturedClassifier::default(),
            },
        }
    }
}

impl std::fmt::Display for GameVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

fn rate_config(base_rate: f64, steps: &[(u32, f64, f64)], hard_cap: u32) -> RateConfig {
    RateConfig {
        base_rate,
        soft_pity: steps
            .iter()
            .map(|&(threshold, rate, slope)| SoftPityStep::new(threshold, rate, slope))
            .collect(),
        hard_cap,
    }
}

/// Every constant the engine needs for one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantProfile {
    pub name: String,
    pub rate: RateConfig,
    #[serde(default)]
    pub guarantee: GuaranteeConfig,
    pub percentile: PercentilePolicy,
    #[serde(default)]
    pub tiers: RarityTiers,
    #[serde(default)]
    pub uncommon: UncommonRate,
    #[serde(default)]
    pub classifier: FeaturedClassifier,
}

impl VariantProfile {
    /// Parse and validate a profile from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and any validation error otherwise.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let profile: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// # Errors
    ///
    /// Returns the first configuration invariant the profile violates.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rate.validate()?;
        self.guarantee.validate()?;
        self.percentile.validate(self.rate.hard_cap)?;
        self.tiers.validate()?;
        self.uncommon.validate()?;
        self.classifier.validate()
    }
}
