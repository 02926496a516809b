//! Event log aggregation into summary statistics.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::FeaturedClassifier;
use crate::constants::MEDIAN_PERCENTILE;
use crate::error::{EngineError, Result};
use crate::event::{AnnotatedDraw, Direction, DrawEvent, RarityTiers};
use crate::numbers::{ratio, u32_to_f64, usize_to_f64};
use crate::percentile::{LuckTier, PercentileRanker};

/// A rare-tier draw as listed in the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RareDraw {
    pub position: u32,
    pub name: String,
    pub pity: u32,
    pub featured: bool,
    pub time: String,
}

/// Summary of one event log. Produced fresh by every aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_pulls: usize,
    pub count_by_rarity: BTreeMap<u8, usize>,
    pub rare_count: usize,
    pub uncommon_count: usize,
    pub featured_count: usize,
    /// Mean pity over rare draws.
    pub avg_pulls_per_rare: f64,
    /// Mean draws spent per featured outcome, misses included.
    pub avg_pulls_per_featured: f64,
    /// Featured share of rare draws, in percent.
    pub win_rate: f64,
    pub percentile: f64,
    pub tier: LuckTier,
    pub theoretical_expected_rare: f64,
    pub theoretical_expected_featured: f64,
    /// Draws since the most recent rare draw.
    pub current_pity: u32,
    /// The most recent rare draw lost the 50/50, so the next one is featured.
    pub guarantee_active: bool,
    /// Rare draws in the caller's order.
    pub rare_draws: Vec<RareDraw>,
}

/// Walks an event log chronologically, deriving pity and summary figures.
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator<'a> {
    tiers: &'a RarityTiers,
    classifier: &'a FeaturedClassifier,
    ranker: &'a PercentileRanker,
}

struct Chronicle {
    draws: Vec<AnnotatedDraw>,
    open_pity: u32,
}

impl<'a> StatsAggregator<'a> {
    #[must_use]
    pub const fn new(
        tiers: &'a RarityTiers,
        classifier: &'a FeaturedClassifier,
        ranker: &'a PercentileRanker,
    ) -> Self {
        Self {
            tiers,
            classifier,
            ranker,
        }
    }

    /// Derive pity and featured flags, returning records in `direction` order.
    ///
    /// # Errors
    ///
    /// Fails on unrecognized rarities, on zero or partially supplied positions,
    /// and on positions that contradict `direction`.
    pub fn annotate(
        &self,
        events: &[DrawEvent],
        direction: Direction,
    ) -> Result<Vec<AnnotatedDraw>> {
        let mut draws = self.chronicle(events, direction)?.draws;
        if direction == Direction::NewestFirst {
            draws.reverse();
        }
        Ok(draws)
    }

    /// Aggregate the log into a [`SummaryStats`].
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::annotate`]; no summary is produced on failure.
    pub fn aggregate(&self, events: &[DrawEvent], direction: Direction) -> Result<SummaryStats> {
        let chronicle = self.chronicle(events, direction)?;
        let rare = self.tiers.rare;
        let uncommon = self.tiers.uncommon;
        let draws = &chronicle.draws;

        let mut count_by_rarity: BTreeMap<u8, usize> = BTreeMap::new();
        for draw in draws {
            *count_by_rarity.entry(draw.rarity).or_default() += 1;
        }
        let rare_draws: Vec<&AnnotatedDraw> = draws.iter().filter(|d| d.rarity == rare).collect();
        let rare_count = rare_draws.len();
        let featured_count = rare_draws.iter().filter(|d| d.featured).count();
        let uncommon_count = count_by_rarity.get(&uncommon).copied().unwrap_or(0);

        let avg_pulls_per_rare = if rare_count == 0 {
            0.0
        } else {
            let pity_sum: f64 = rare_draws.iter().map(|d| u32_to_f64(d.pity)).sum();
            pity_sum / usize_to_f64(rare_count)
        };

        let runs = featured_runs(&rare_draws);
        let avg_pulls_per_featured = if runs.is_empty() {
            0.0
        } else {
            let total: f64 = runs.iter().map(|&run| u32_to_f64(run)).sum();
            total / usize_to_f64(runs.len())
        };

        let percentile = if draws.is_empty() {
            MEDIAN_PERCENTILE
        } else {
            self.ranker.percentile_for(avg_pulls_per_featured)
        };

        let guarantee_active = self.ranker.model().config().guarantee_next
            && rare_draws.last().is_some_and(|d| !d.featured);

        let mut listed: Vec<RareDraw> = rare_draws
            .iter()
            .map(|d| RareDraw {
                position: d.position,
                name: d.name.clone(),
                pity: d.pity,
                featured: d.featured,
                time: d.time.clone(),
            })
            .collect();
        if direction == Direction::NewestFirst {
            listed.reverse();
        }

        let model = self.ranker.model();
        let stats = SummaryStats {
            total_pulls: draws.len(),
            count_by_rarity,
            rare_count,
            uncommon_count,
            featured_count,
            avg_pulls_per_rare,
            avg_pulls_per_featured,
            win_rate: ratio(featured_count, rare_count) * 100.0,
            percentile,
            tier: LuckTier::for_percentile(percentile),
            theoretical_expected_rare: model.distribution().expected_first_success(),
            theoretical_expected_featured: model.expected_draws_for_featured(),
            current_pity: chronicle.open_pity,
            guarantee_active,
            rare_draws: listed,
        };
        log::debug!(
            "aggregated {} draws: {} rare, {} featured, percentile {:.2}",
            stats.total_pulls,
            stats.rare_count,
            stats.featured_count,
            stats.percentile
        );
        Ok(stats)
    }

    fn chronicle(&self, events: &[DrawEvent], direction: Direction) -> Result<Chronicle> {
        self.check_events(events, direction)?;

        let chronological: Box<dyn Iterator<Item = &DrawEvent>> = match direction {
            Direction::OldestFirst => Box::new(events.iter()),
            Direction::NewestFirst => Box::new(events.iter().rev()),
        };

        let mut rare_counter: u32 = 0;
        let mut uncommon_counter: u32 = 0;
        let mut draws = Vec::with_capacity(events.len());
        for (offset, event) in chronological.enumerate() {
            rare_counter = rare_counter.saturating_add(1);
            uncommon_counter = uncommon_counter.saturating_add(1);

            let mut featured = false;
            let pity = if event.rarity == self.tiers.rare {
                let pity = rare_counter;
                featured = self.classifier.classify(event);
                rare_counter = 0;
                uncommon_counter = 0;
                pity
            } else if event.rarity == self.tiers.uncommon {
                let pity = uncommon_counter;
                uncommon_counter = 0;
                pity
            } else {
                0
            };

            let derived = u32::try_from(offset + 1).unwrap_or(u32::MAX);
            draws.push(AnnotatedDraw {
                position: event.position.unwrap_or(derived),
                name: event.name.clone(),
                rarity: event.rarity,
                category: event.category,
                time: event.time.clone(),
                pool: event.pool,
                featured,
                pity,
            });
        }

        Ok(Chronicle {
            draws,
            open_pity: rare_counter,
        })
    }

    fn check_events(&self, events: &[DrawEvent], direction: Direction) -> Result<()> {
        let positioned = events.first().is_some_and(|e| e.position.is_some());
        let mut last_position: Option<u32> = None;
        for (index, event) in events.iter().enumerate() {
            if !self.tiers.recognizes(event.rarity) {
                return Err(EngineError::UnknownRarity {
                    index,
                    rarity: event.rarity,
                });
            }
            // Derived positions would collide with explicit ones.
            if event.position.is_some() != positioned {
                return Err(EngineError::PartialPositions { index });
            }
            let Some(position) = event.position else {
                continue;
            };
            if position == 0 {
                return Err(EngineError::ZeroPosition { index });
            }
            if let Some(previous) = last_position {
                let ordered = match direction {
                    Direction::OldestFirst => position > previous,
                    Direction::NewestFirst => position < previous,
                };
                if !ordered {
                    return Err(EngineError::OutOfOrder {
                        index,
                        position,
                        direction: direction.label(),
                    });
                }
            }
            last_position = Some(position);
        }
        Ok(())
    }
}

/// Total draws spent per featured outcome. A run closes on each featured
/// rare draw; a trailing miss with no featured draw after it is left open.
fn featured_runs(rare_draws: &[&AnnotatedDraw]) -> Vec<u32> {
    let mut runs = Vec::new();
    let mut accumulated: u32 = 0;
    for draw in rare_draws {
        accumulated = accumulated.saturating_add(draw.pity);
        if draw.featured {
            runs.push(accumulated);
            accumulated = 0;
        }
    }
    runs
}
