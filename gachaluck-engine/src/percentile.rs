//! Luck percentile and tier ranking
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_CEILING_PERCENTILE, MEDIAN_PERCENTILE};
use crate::error::ConfigError;
use crate::guarantee::CompoundGuaranteeModel;
use crate::numbers::floor_f64_to_u32;

/// Boundary constants used where the CDF is not consulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentilePolicy {
    /// Percentile reported for averages of one draw or fewer.
    pub floor_percentile: f64,
    /// Percentile reported at and beyond the draws ceiling; also caps the CDF.
    #[serde(default = "PercentilePolicy::default_ceiling_percentile")]
    pub ceiling_percentile: f64,
    /// Average draws per featured outcome treated as the worst practical case.
    pub draws_ceiling: u32,
}

impl PercentilePolicy {
    const fn default_ceiling_percentile() -> f64 {
        DEFAULT_CEILING_PERCENTILE
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::PercentilePolicy`] unless
    /// `0 <= floor < 50 < ceiling < 100` and the draws ceiling covers one hard cap.
    pub fn validate(&self, hard_cap: u32) -> Result<(), ConfigError> {
        let floor_ok = self.floor_percentile.is_finite()
            && (0.0..MEDIAN_PERCENTILE).contains(&self.floor_percentile);
        if !floor_ok {
            return Err(ConfigError::PercentilePolicy {
                reason: format!(
                    "floor {} must lie in [0, {MEDIAN_PERCENTILE})",
                    self.floor_percentile
                ),
            });
        }
        let ceiling_ok = self.ceiling_percentile.is_finite()
            && self.ceiling_percentile > MEDIAN_PERCENTILE
            && self.ceiling_percentile < 100.0;
        if !ceiling_ok {
            return Err(ConfigError::PercentilePolicy {
                reason: format!(
                    "ceiling {} must lie in ({MEDIAN_PERCENTILE}, 100)",
                    self.ceiling_percentile
                ),
            });
        }
        if self.draws_ceiling < hard_cap {
            return Err(ConfigError::PercentilePolicy {
                reason: format!(
                    "draws ceiling {} is below the hard cap {hard_cap}",
                    self.draws_ceiling
                ),
            });
        }
        Ok(())
    }

    /// Largest CDF value the compound model may report.
    #[must_use]
    pub fn max_cdf(&self) -> f64 {
        self.ceiling_percentile / 100.0
    }
}

/// Eight ordered luck tiers, luckiest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LuckTier {
    /// Percentile up to 5
    Blessed,
    /// Percentile up to 20
    Radiant,
    /// Percentile up to 35
    Fortunate,
    /// Percentile up to 50
    Steady,
    /// Percentile up to 65
    Rocky,
    /// Percentile up to 80
    Jinxed,
    /// Percentile up to 95
    PityWarrior,
    /// Everything above 95
    Forsaken,
}

impl LuckTier {
    pub const ALL: [Self; 8] = [
        Self::Blessed,
        Self::Radiant,
        Self::Fortunate,
        Self::Steady,
        Self::Rocky,
        Self::Jinxed,
        Self::PityWarrior,
        Self::Forsaken,
    ];

    /// Map a percentile to its tier. Total: values below 0 land in the first
    /// tier, values above 100 and NaN land in the last.
    #[must_use]
    pub fn for_percentile(percentile: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|tier| tier.upper_bound().is_some_and(|bound| percentile <= bound))
            .unwrap_or(Self::Forsaken)
    }

    /// Inclusive upper percentile bound; `None` for the open-ended last tier.
    #[must_use]
    pub const fn upper_bound(self) -> Option<f64> {
        match self {
            Self::Blessed => Some(5.0),
            Self::Radiant => Some(20.0),
            Self::Fortunate => Some(35.0),
            Self::Steady => Some(50.0),
            Self::Rocky => Some(65.0),
            Self::Jinxed => Some(80.0),
            Self::PityWarrior => Some(95.0),
            Self::Forsaken => None,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Blessed => "Heaven's Chosen",
            Self::Radiant => "Fortune Unleashed",
            Self::Fortunate => "Touched by Luck",
            Self::Steady => "Par for the Course",
            Self::Rocky => "Rocky Road",
            Self::Jinxed => "Jinxed",
            Self::PityWarrior => "Pity Warrior",
            Self::Forsaken => "Child of the Earth",
        }
    }

    #[must_use]
    pub const fn descriptor(self) -> &'static str {
        match self {
            Self::Blessed => "one in a crowd of twenty",
            Self::Radiant => "exceptionally lucky",
            Self::Fortunate => "luckier than most",
            Self::Steady => "right around average",
            Self::Rocky => "a little rough",
            Self::Jinxed => "in need of a change of luck",
            Self::PityWarrior => "lives on the hard cap",
            Self::Forsaken => "the unluckiest of the unlucky",
        }
    }
}

impl std::fmt::Display for LuckTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ranks realized averages against the compound model.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileRanker {
    policy: PercentilePolicy,
    model: CompoundGuaranteeModel,
}

impl PercentileRanker {
    /// # Errors
    ///
    /// Returns [`ConfigError::PercentilePolicy`] when `policy` fails validation
    /// against the model's hard cap.
    pub fn new(
        policy: PercentilePolicy,
        model: CompoundGuaranteeModel,
    ) -> Result<Self, ConfigError> {
        policy.validate(model.distribution().cap())?;
        Ok(Self { policy, model })
    }

    #[must_use]
    pub const fn model(&self) -> &CompoundGuaranteeModel {
        &self.model
    }

    #[must_use]
    pub const fn policy(&self) -> &PercentilePolicy {
        &self.policy
    }

    /// Share of possible outcomes at least as lucky as `avg_draws_per_featured`.
    /// Lower is luckier.
    #[must_use]
    pub fn percentile_for(&self, avg_draws_per_featured: f64) -> f64 {
        if avg_draws_per_featured.is_nan() || avg_draws_per_featured <= 0.0 {
            return MEDIAN_PERCENTILE;
        }
        if avg_draws_per_featured <= 1.0 {
            return self.policy.floor_percentile;
        }
        if avg_draws_per_featured >= f64::from(self.policy.draws_ceiling) {
            return self.policy.ceiling_percentile;
        }
        let target = floor_f64_to_u32(avg_draws_per_featured);
        (self.model.cdf_within_pulls(target) * 100.0)
            .clamp(self.policy.floor_percentile, self.policy.ceiling_percentile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::Distribution;
    use crate::guarantee::GuaranteeConfig;
    use crate::rate::RateModel;
    use crate::variant::GameVariant;

    fn ranker(variant: GameVariant) -> PercentileRanker {
        let profile = variant.profile();
        let rate = RateModel::new(profile.rate).unwrap();
        let model = CompoundGuaranteeModel::new(
            Distribution::tabulate(&rate),
            GuaranteeConfig::default(),
            profile.percentile.max_cdf(),
        )
        .unwrap();
        PercentileRanker::new(profile.percentile, model).unwrap()
    }

    #[test]
    fn boundary_policy_applies() {
        let ranker = ranker(GameVariant::WutheringWaves);
        assert!((ranker.percentile_for(0.0) - 50.0).abs() < f64::EPSILON);
        assert!((ranker.percentile_for(-4.0) - 50.0).abs() < f64::EPSILON);
        assert!((ranker.percentile_for(1.0) - 0.27).abs() < f64::EPSILON);
        assert!((ranker.percentile_for(0.5) - 0.27).abs() < f64::EPSILON);
        assert!((ranker.percentile_for(158.0) - 99.9).abs() < f64::EPSILON);
        assert!((ranker.percentile_for(1_000.0) - 99.9).abs() < f64::EPSILON);
    }

    #[test]
    fn middle_values_follow_the_cdf() {
        let ranker = ranker(GameVariant::WutheringWaves);
        let expected = ranker.model().cdf_within_pulls(41) * 100.0;
        assert!((ranker.percentile_for(41.0) - expected).abs() < 1e-12);
        assert!((ranker.percentile_for(41.9) - expected).abs() < 1e-12);
    }

    #[test]
    fn luckier_averages_never_rank_worse() {
        for variant in GameVariant::ALL {
            let ranker = ranker(variant);
            let samples: Vec<f64> = (0..=800).map(|i| f64::from(i) * 0.25).collect();
            for pair in samples.windows(2) {
                let (lucky, unlucky) = (pair[0], pair[1]);
                if lucky <= 0.0 {
                    continue;
                }
                assert!(
                    ranker.percentile_for(lucky) <= ranker.percentile_for(unlucky),
                    "{variant:?}: {lucky} ranked worse than {unlucky}"
                );
            }
        }
    }

    #[test]
    fn never_reports_certainty() {
        let ranker = ranker(GameVariant::GenshinImpact);
        for avg in [2.0, 90.0, 179.0, 180.0, 10_000.0] {
            assert!(ranker.percentile_for(avg) < 100.0);
        }
    }

    #[test]
    fn tiers_partition_the_range() {
        let boundaries = [
            (0.0, LuckTier::Blessed),
            (5.0, LuckTier::Blessed),
            (5.000_1, LuckTier::Radiant),
            (20.0, LuckTier::Radiant),
            (35.0, LuckTier::Fortunate),
            (50.0, LuckTier::Steady),
            (50.01, LuckTier::Rocky),
            (65.0, LuckTier::Rocky),
            (80.0, LuckTier::Jinxed),
            (95.0, LuckTier::PityWarrior),
            (95.01, LuckTier::Forsaken),
            (100.0, LuckTier::Forsaken),
        ];
        for (percentile, tier) in boundaries {
            assert_eq!(LuckTier::for_percentile(percentile), tier, "{percentile}");
        }
    }

    #[test]
    fn tiers_are_ordered_without_gaps() {
        let mut previous = LuckTier::Blessed;
        for step in 0..=10_000 {
            let percentile = f64::from(step) / 100.0;
            let tier = LuckTier::for_percentile(percentile);
            assert!(tier >= previous);
            let matches = LuckTier::ALL
                .iter()
                .filter(|candidate| {
                    let lower = candidate_lower_bound(**candidate);
                    let upper = candidate.upper_bound().unwrap_or(f64::INFINITY);
                    percentile > lower && percentile <= upper
                })
                .count();
            assert_eq!(matches, 1, "percentile {percentile} matched {matches} tiers");
            previous = tier;
        }
    }

    fn candidate_lower_bound(tier: LuckTier) -> f64 {
        let index = LuckTier::ALL.iter().position(|t| *t == tier).unwrap();
        if index == 0 {
            f64::NEG_INFINITY
        } else {
            LuckTier::ALL[index - 1].upper_bound().unwrap()
        }
    }

    #[test]
    fn out_of_range_percentiles_still_resolve() {
        assert_eq!(LuckTier::for_percentile(-1.0), LuckTier::Blessed);
        assert_eq!(LuckTier::for_percentile(250.0), LuckTier::Forsaken);
        assert_eq!(LuckTier::for_percentile(f64::NAN), LuckTier::Forsaken);
    }

    #[test]
    fn policy_validation() {
        let good = GameVariant::WutheringWaves.profile().percentile;
        assert!(good.validate(79).is_ok());

        let low_ceiling = PercentilePolicy {
            draws_ceiling: 40,
            ..good.clone()
        };
        assert!(low_ceiling.validate(79).is_err());

        let certain = PercentilePolicy {
            ceiling_percentile: 100.0,
            ..good.clone()
        };
        assert!(certain.validate(79).is_err());

        let inverted = PercentilePolicy {
            floor_percentile: 60.0,
            ..good
        };
        assert!(inverted.validate(79).is_err());
    }

    #[test]
    fn ranker_rejects_invalid_policy() {
        let model = ranker(GameVariant::WutheringWaves).model().clone();
        let inverted = PercentilePolicy {
            floor_percentile: 60.0,
            ceiling_percentile: 55.0,
            draws_ceiling: 158,
        };
        assert!(matches!(
            PercentileRanker::new(inverted, model.clone()),
            Err(ConfigError::PercentilePolicy { .. })
        ));
        let unbounded = PercentilePolicy {
            floor_percentile: 0.27,
            ceiling_percentile: f64::NAN,
            draws_ceiling: 158,
        };
        assert!(PercentileRanker::new(unbounded, model).is_err());
    }
}
