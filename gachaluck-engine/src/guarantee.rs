//! Draws-to-featured distribution under the 50/50 rule with a loss guarantee.
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::DEFAULT_FEATURED_RATE;
use crate::distribution::Distribution;
use crate::error::ConfigError;

/// Featured-outcome rule applied to each rare draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuaranteeConfig {
    /// Chance that a rare draw without an active guarantee is featured.
    #[serde(default = "GuaranteeConfig::default_featured_rate")]
    pub featured_rate: f64,
    /// Whether losing the 50/50 makes the next rare draw featured.
    #[serde(default = "GuaranteeConfig::default_guarantee_next")]
    pub guarantee_next: bool,
}

impl GuaranteeConfig {
    const fn default_featured_rate() -> f64 {
        DEFAULT_FEATURED_RATE
    }

    const fn default_guarantee_next() -> bool {
        true
    }

    /// # Errors
    ///
    /// Returns an error when the featured rate is not a probability, or when
    /// it is zero without a guarantee (a featured outcome could never occur).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.featured_rate.is_finite() || !(0.0..=1.0).contains(&self.featured_rate) {
            return Err(ConfigError::FeaturedRateOutOfRange {
                value: self.featured_rate,
            });
        }
        if !self.guarantee_next && self.featured_rate <= 0.0 {
            return Err(ConfigError::UnreachableFeatured);
        }
        Ok(())
    }
}

impl Default for GuaranteeConfig {
    fn default() -> Self {
        Self {
            featured_rate: Self::default_featured_rate(),
            guarantee_next: Self::default_guarantee_next(),
        }
    }
}

/// Compound model: rare-outcome timing from a [`Distribution`], featured
/// resolution from a [`GuaranteeConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundGuaranteeModel {
    distribution: Distribution,
    config: GuaranteeConfig,
    max_cdf: f64,
}

impl CompoundGuaranteeModel {
    /// `max_cdf` bounds every CDF value below certainty.
    ///
    /// # Errors
    ///
    /// Returns an error when the guarantee configuration is invalid or
    /// `max_cdf` is not in `(0, 1]`.
    pub fn new(
        distribution: Distribution,
        config: GuaranteeConfig,
        max_cdf: f64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if !max_cdf.is_finite() || max_cdf <= 0.0 || max_cdf > 1.0 {
            return Err(ConfigError::MaxCdfOutOfRange { value: max_cdf });
        }
        Ok(Self {
            distribution,
            config,
            max_cdf,
        })
    }

    #[must_use]
    pub const fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    #[must_use]
    pub const fn config(&self) -> &GuaranteeConfig {
        &self.config
    }

    /// Probability of obtaining a featured outcome within `target` draws,
    /// starting with no guarantee active.
    #[must_use]
    pub fn cdf_within_pulls(&self, target: u32) -> f64 {
        if target == 0 {
            return 0.0;
        }
        let total = if self.config.guarantee_next {
            self.guaranteed_cdf(target)
        } else {
            self.repeated_cdf(target)
        };
        total.clamp(0.0, self.max_cdf)
    }

    /// Expected draws per featured outcome: expected rare outcomes needed
    /// times expected draws per rare outcome.
    #[must_use]
    pub fn expected_draws_for_featured(&self) -> f64 {
        let p = self.config.featured_rate;
        let per_rare = self.distribution.expected_first_success();
        if self.config.guarantee_next {
            per_rare * (2.0 - p)
        } else {
            per_rare / p
        }
    }

    fn guaranteed_cdf(&self, target: u32) -> f64 {
        let p = self.config.featured_rate;
        let dist = &self.distribution;
        (1..=target.min(dist.cap()))
            .map(|i| {
                let first = dist.first_success_at(i);
                let won = first * p;
                let lost_then_hit = if target > i {
                    first * (1.0 - p) * dist.cumulative_at(target - i)
                } else {
                    0.0
                };
                won + lost_then_hit
            })
            .sum()
    }

    /// Without a guarantee every rare draw is a fresh 50/50, so the CDF
    /// satisfies `G(t) = sum_i f(i) * (p + (1 - p) * G(t - i))`.
    ///
    /// Only the last `cap` values are kept. A full window without change
    /// means every later value is equal.
    fn repeated_cdf(&self, target: u32) -> f64 {
        let p = self.config.featured_rate;
        let dist = &self.distribution;
        let cap = dist.cap();
        let window = usize::try_from(cap).unwrap_or(usize::MAX);
        // recent[k] holds G(t - 1 - k); missing entries are G(0) = 0.
        let mut recent: VecDeque<f64> = VecDeque::new();
        let mut value = 0.0;
        let mut unchanged: u32 = 0;
        for t in 1..=target {
            let next: f64 = (1..=t.min(cap))
                .map(|i| {
                    let rest = usize::try_from(i - 1)
                        .ok()
                        .and_then(|idx| recent.get(idx))
                        .copied()
                        .unwrap_or(0.0);
                    dist.first_success_at(i) * (p + (1.0 - p) * rest)
                })
                .sum();
            if next >= self.max_cdf {
                return next;
            }
            if next <= value {
                unchanged += 1;
                if unchanged >= cap {
                    return next;
                }
            } else {
                unchanged = 0;
            }
            value = next;
            recent.push_front(next);
            recent.truncate(window);
        }
        value
    }
}
