//! Gachaluck Engine
//!
//! Probability and statistics core for pity-based randomized draws: per-draw
//! rates with soft pity and a hard cap, the derived first-success
//! distribution, the 50/50 featured guarantee, and the ranking of a player's
//! draw log against every theoretically possible outcome.
//!
//! The engine is pure and synchronous. All tables are computed when an
//! [`Engine`] is built and read-only afterwards.

pub mod aggregate;
pub mod classify;
pub mod constants;
pub mod distribution;
pub mod error;
pub mod event;
pub mod guarantee;
pub mod import;
pub mod numbers;
pub mod percentile;
pub mod rate;
pub mod simulate;
pub mod variant;

pub use aggregate::{RareDraw, StatsAggregator, SummaryStats};
pub use classify::{FeaturedClassifier, FeaturedRule};
pub use distribution::{Distribution, DistributionRow};
pub use error::{ConfigError, EngineError, Result};
pub use event::{AnnotatedDraw, Direction, DrawEvent, ItemCategory, RarityTiers};
pub use guarantee::{CompoundGuaranteeModel, GuaranteeConfig};
pub use import::{
    RawPool, RawRecord, convert_raw_records, events_for_pool, group_by_pool, merge_pools,
};
pub use percentile::{LuckTier, PercentilePolicy, PercentileRanker};
pub use rate::{RateConfig, RateModel, SoftPityStep};
pub use simulate::{UncommonRate, simulate};
pub use variant::{GameVariant, VariantProfile};

use crate::constants::{DEFAULT_CEILING_PERCENTILE, MEDIAN_PERCENTILE};

/// A validated configuration together with its precomputed tables.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    profile: VariantProfile,
    rate: RateModel,
    ranker: PercentileRanker,
}

impl Engine {
    /// Build an engine from a full variant profile.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] the profile violates.
    pub fn from_profile(profile: VariantProfile) -> std::result::Result<Self, ConfigError> {
        profile.validate()?;
        let rate = RateModel::new(profile.rate.clone())?;
        let model = CompoundGuaranteeModel::new(
            Distribution::tabulate(&rate),
            profile.guarantee.clone(),
            profile.percentile.max_cdf(),
        )?;
        let ranker = PercentileRanker::new(profile.percentile.clone(), model)?;
        log::debug!(
            "engine ready for {}: expected rare {:.4}, expected featured {:.4}",
            profile.name,
            ranker.model().distribution().expected_first_success(),
            ranker.model().expected_draws_for_featured()
        );
        Ok(Self {
            profile,
            rate,
            ranker,
        })
    }

    /// # Errors
    ///
    /// Only fails if a built-in profile is malformed.
    pub fn for_variant(variant: GameVariant) -> std::result::Result<Self, ConfigError> {
        Self::from_profile(variant.profile())
    }

    #[must_use]
    pub const fn profile(&self) -> &VariantProfile {
        &self.profile
    }

    #[must_use]
    pub const fn rate_model(&self) -> &RateModel {
        &self.rate
    }

    #[must_use]
    pub const fn ranker(&self) -> &PercentileRanker {
        &self.ranker
    }

    #[must_use]
    pub const fn distribution(&self) -> &Distribution {
        self.ranker.model().distribution()
    }

    /// # Errors
    ///
    /// Returns [`EngineError::ZeroDrawIndex`] for `n == 0`.
    pub fn success_rate(&self, n: u32) -> Result<f64> {
        self.rate.success_rate(n)
    }

    #[must_use]
    pub fn first_success_at(&self, n: u32) -> f64 {
        self.distribution().first_success_at(n)
    }

    #[must_use]
    pub fn cumulative_at(&self, n: u32) -> f64 {
        self.distribution().cumulative_at(n)
    }

    #[must_use]
    pub const fn theoretical_expected_rare(&self) -> f64 {
        self.distribution().expected_first_success()
    }

    #[must_use]
    pub fn theoretical_expected_featured(&self) -> f64 {
        self.ranker.model().expected_draws_for_featured()
    }

    #[must_use]
    pub fn cdf_within_pulls(&self, target: u32) -> f64 {
        self.ranker.model().cdf_within_pulls(target)
    }

    #[must_use]
    pub fn percentile_for(&self, avg_draws_per_featured: f64) -> f64 {
        self.ranker.percentile_for(avg_draws_per_featured)
    }

    #[must_use]
    pub fn tier_for(&self, percentile: f64) -> LuckTier {
        LuckTier::for_percentile(percentile)
    }

    /// # Errors
    ///
    /// See [`StatsAggregator::annotate`].
    pub fn annotate(
        &self,
        events: &[DrawEvent],
        direction: Direction,
    ) -> Result<Vec<AnnotatedDraw>> {
        self.aggregator().annotate(events, direction)
    }

    /// # Errors
    ///
    /// See [`StatsAggregator::aggregate`].
    pub fn aggregate(&self, events: &[DrawEvent], direction: Direction) -> Result<SummaryStats> {
        self.aggregator().aggregate(events, direction)
    }

    fn aggregator(&self) -> StatsAggregator<'_> {
        StatsAggregator::new(&self.profile.tiers, &self.profile.classifier, &self.ranker)
    }
}

/// Build an engine from bare rate and guarantee settings.
///
/// The percentile floor is the chance of a featured outcome on the very
/// first draw, the ceiling is 99.9, and the draws ceiling spans two hard-cap
/// cycles. Records are classified by the default rule list.
///
/// # Errors
///
/// Returns the first [`ConfigError`] either configuration violates.
pub fn create_engine(
    rate: RateConfig,
    guarantee: GuaranteeConfig,
) -> std::result::Result<Engine, ConfigError> {
    let model = RateModel::new(rate)?;
    guarantee.validate()?;
    let first_draw = model.rate(1) * guarantee.featured_rate * 100.0;
    let percentile = PercentilePolicy {
        floor_percentile: first_draw.min(MEDIAN_PERCENTILE - 1.0),
        ceiling_percentile: DEFAULT_CEILING_PERCENTILE,
        draws_ceiling: model.hard_cap().saturating_mul(2),
    };
    Engine::from_profile(VariantProfile {
        name: "Custom".to_string(),
        rate: model.config().clone(),
        guarantee,
        percentile,
        tiers: RarityTiers::default(),
        uncommon: UncommonRate::default(),
        classifier: FeaturedClassifier::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Engine>();
    }

    #[test]
    fn create_engine_derives_policy_from_rates() {
        let profile = GameVariant::WutheringWaves.profile();
        let engine = create_engine(profile.rate, GuaranteeConfig::default()).unwrap();
        let policy = engine.ranker().policy();
        assert!((policy.floor_percentile - 0.4).abs() < 1e-12);
        assert_eq!(policy.draws_ceiling, 158);
        assert!((engine.theoretical_expected_rare() - 54.1027).abs() < 1e-2);
    }

    #[test]
    fn create_engine_rejects_bad_rates() {
        let rate = RateConfig {
            base_rate: 1.5,
            soft_pity: Vec::new(),
            hard_cap: 10,
        };
        assert!(matches!(
            create_engine(rate, GuaranteeConfig::default()),
            Err(ConfigError::RateOutOfRange { .. })
        ));
    }

    #[test]
    fn certain_first_draw_keeps_floor_below_median() {
        let rate = RateConfig {
            base_rate: 1.0,
            soft_pity: Vec::new(),
            hard_cap: 1,
        };
        let guarantee = GuaranteeConfig {
            featured_rate: 1.0,
            guarantee_next: true,
        };
        let engine = create_engine(rate, guarantee).unwrap();
        assert!(engine.ranker().policy().floor_percentile < 50.0);
        assert!((engine.theoretical_expected_featured() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn engine_surfaces_the_rate_table() {
        let engine = Engine::for_variant(GameVariant::GenshinImpact).unwrap();
        assert_eq!(engine.success_rate(0), Err(EngineError::ZeroDrawIndex));
        assert!((engine.success_rate(1).unwrap() - 0.006).abs() < 1e-12);
        assert!((engine.success_rate(90).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((engine.cumulative_at(90) - 1.0).abs() < 1e-9);
        assert!((engine.first_success_at(1) - 0.006).abs() < 1e-12);
        assert_eq!(engine.tier_for(42.0), LuckTier::Steady);
    }
}
