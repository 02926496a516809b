//! Per-draw rare-outcome probability with soft pity and a hard cap.
use serde::{Deserialize, Serialize};

use crate::constants::CONTINUITY_TOLERANCE;
use crate::error::{ConfigError, EngineError};

/// One linear segment of the soft-pity ramp.
///
/// Applies to draws `threshold < n` up to the next step's threshold (or the
/// draw before the hard cap), where the rate is `rate + slope * (n - threshold)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SoftPityStep {
    pub threshold: u32,
    pub rate: f64,
    pub slope: f64,
}

impl SoftPityStep {
    #[must_use]
    pub const fn new(threshold: u32, rate: f64, slope: f64) -> Self {
        Self {
            threshold,
            rate,
            slope,
        }
    }

    fn value_at(&self, n: u32) -> f64 {
        self.rate + self.slope * f64::from(n.saturating_sub(self.threshold))
    }
}

/// Rate constants for one game variant's rare tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    pub base_rate: f64,
    #[serde(default)]
    pub soft_pity: Vec<SoftPityStep>,
    pub hard_cap: u32,
}

impl RateConfig {
    /// Check the ordering, range and continuity invariants of the ramp.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_probability("rate.base_rate", self.base_rate)?;
        if self.hard_cap == 0 {
            return Err(ConfigError::InvalidHardCap { cap: self.hard_cap });
        }

        let mut segment_end = self.base_rate;
        let mut previous: Option<&SoftPityStep> = None;
        for step in &self.soft_pity {
            if step.threshold == 0 || step.threshold >= self.hard_cap {
                return Err(ConfigError::StepOutsideCap {
                    threshold: step.threshold,
                    cap: self.hard_cap,
                });
            }
            check_probability("rate.soft_pity.rate", step.rate)?;
            if !step.slope.is_finite() || step.slope < 0.0 {
                return Err(ConfigError::DecreasingSlope {
                    threshold: step.threshold,
                    slope: step.slope,
                });
            }
            if let Some(prev) = previous {
                if step.threshold <= prev.threshold {
                    return Err(ConfigError::StepsNotAscending {
                        previous: prev.threshold,
                        next: step.threshold,
                    });
                }
                segment_end = prev.value_at(step.threshold);
            }
            if (step.rate - segment_end).abs() > CONTINUITY_TOLERANCE {
                return Err(ConfigError::DiscontinuousStep {
                    threshold: step.threshold,
                    expected: segment_end,
                    actual: step.rate,
                });
            }
            previous = Some(step);
        }
        Ok(())
    }

    fn rate_at(&self, n: u32) -> f64 {
        if n >= self.hard_cap {
            return 1.0;
        }
        self.soft_pity
            .iter()
            .rev()
            .find(|step| step.threshold < n)
            .map_or(self.base_rate, |step| step.value_at(n))
            .min(1.0)
    }
}

fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::RateOutOfRange { field, value })
    }
}

/// Validated rate model with the per-draw rates tabulated up to the hard cap.
#[derive(Debug, Clone, PartialEq)]
pub struct RateModel {
    config: RateConfig,
    rates: Vec<f64>,
}

impl RateModel {
    /// Build a model from configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the configuration violates its invariants.
    pub fn new(config: RateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rates = (0..=config.hard_cap)
            .map(|n| if n == 0 { 0.0 } else { config.rate_at(n) })
            .collect();
        Ok(Self { config, rates })
    }

    /// Probability that draw `n` (counted since the last rare outcome) is rare.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::ZeroDrawIndex`] for `n == 0`.
    pub fn success_rate(&self, n: u32) -> Result<f64, EngineError> {
        if n == 0 {
            return Err(EngineError::ZeroDrawIndex);
        }
        Ok(self.rate(n))
    }

    /// Rate lookup for an index already known to be positive.
    pub(crate) fn rate(&self, n: u32) -> f64 {
        usize::try_from(n)
            .ok()
            .and_then(|idx| self.rates.get(idx))
            .copied()
            .unwrap_or(1.0)
    }

    #[must_use]
    pub const fn hard_cap(&self) -> u32 {
        self.config.hard_cap
    }

    #[must_use]
    pub const fn config(&self) -> &RateConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::GameVariant;

    fn wuwa() -> RateModel {
        RateModel::new(GameVariant::WutheringWaves.profile().rate).unwrap()
    }

    #[test]
    fn wuthering_waves_ramp_matches_published_rates() {
        let model = wuwa();
        let expected = [
            (1, 0.008),
            (65, 0.008),
            (66, 0.048),
            (70, 0.208),
            (71, 0.288),
            (75, 0.608),
            (76, 0.708),
            (78, 0.908),
            (79, 1.0),
            (120, 1.0),
        ];
        for (n, rate) in expected {
            let got = model.success_rate(n).unwrap();
            assert!((got - rate).abs() < 1e-12, "draw {n}: {got} != {rate}");
        }
    }

    #[test]
    fn genshin_ramp_reaches_cap() {
        let model = RateModel::new(GameVariant::GenshinImpact.profile().rate).unwrap();
        assert!((model.success_rate(73).unwrap() - 0.006).abs() < 1e-12);
        assert!((model.success_rate(74).unwrap() - 0.066).abs() < 1e-12);
        assert!((model.success_rate(89).unwrap() - 0.966).abs() < 1e-12);
        assert!((model.success_rate(90).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rates_are_monotone_up_to_cap() {
        for variant in GameVariant::ALL {
            let model = RateModel::new(variant.profile().rate).unwrap();
            let cap = model.hard_cap();
            for n in 1..cap {
                assert!(model.success_rate(n).unwrap() <= model.success_rate(n + 1).unwrap());
            }
            assert!((model.success_rate(cap).unwrap() - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn zero_index_is_rejected() {
        assert_eq!(wuwa().success_rate(0), Err(EngineError::ZeroDrawIndex));
    }

    #[test]
    fn discontinuous_ramp_is_rejected() {
        let config = RateConfig {
            base_rate: 0.008,
            soft_pity: vec![SoftPityStep::new(65, 0.008, 0.04), SoftPityStep::new(70, 0.3, 0.1)],
            hard_cap: 79,
        };
        assert!(matches!(
            RateModel::new(config),
            Err(ConfigError::DiscontinuousStep { threshold: 70, .. })
        ));
    }

    #[test]
    fn ramp_must_start_at_base_rate() {
        let config = RateConfig {
            base_rate: 0.008,
            soft_pity: vec![SoftPityStep::new(65, 0.05, 0.04)],
            hard_cap: 79,
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DiscontinuousStep { threshold: 65, .. })
        ));
    }

    #[test]
    fn steps_must_ascend_and_stay_below_cap() {
        let unordered = RateConfig {
            base_rate: 0.01,
            soft_pity: vec![SoftPityStep::new(60, 0.01, 0.0), SoftPityStep::new(50, 0.01, 0.0)],
            hard_cap: 80,
        };
        assert_eq!(
            unordered.validate(),
            Err(ConfigError::StepsNotAscending {
                previous: 60,
                next: 50
            })
        );

        let beyond = RateConfig {
            base_rate: 0.01,
            soft_pity: vec![SoftPityStep::new(80, 0.01, 0.1)],
            hard_cap: 80,
        };
        assert_eq!(
            beyond.validate(),
            Err(ConfigError::StepOutsideCap {
                threshold: 80,
                cap: 80
            })
        );
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let negative_slope = RateConfig {
            base_rate: 0.01,
            soft_pity: vec![SoftPityStep::new(10, 0.01, -0.001)],
            hard_cap: 20,
        };
        assert!(matches!(
            negative_slope.validate(),
            Err(ConfigError::DecreasingSlope { threshold: 10, .. })
        ));

        let bad_base = RateConfig {
            base_rate: 1.5,
            soft_pity: Vec::new(),
            hard_cap: 20,
        };
        assert!(matches!(
            bad_base.validate(),
            Err(ConfigError::RateOutOfRange { .. })
        ));

        let no_cap = RateConfig {
            base_rate: 0.5,
            soft_pity: Vec::new(),
            hard_cap: 0,
        };
        assert_eq!(no_cap.validate(), Err(ConfigError::InvalidHardCap { cap: 0 }));
    }

    #[test]
    fn steep_ramp_is_clamped_to_certainty() {
        let model = RateModel::new(RateConfig {
            base_rate: 0.1,
            soft_pity: vec![SoftPityStep::new(2, 0.1, 0.6)],
            hard_cap: 10,
        })
        .unwrap();
        assert!((model.success_rate(4).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((model.success_rate(3).unwrap() - 0.7).abs() < 1e-12);
    }
}
