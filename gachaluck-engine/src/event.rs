//! Draw records consumed and produced by the aggregator.
use serde::{Deserialize, Serialize};

use crate::constants::{COMMON_TIER, RARE_TIER, UNCOMMON_TIER};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    #[default]
    Character,
    Weapon,
}

impl std::fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character => write!(f, "character"),
            Self::Weapon => write!(f, "weapon"),
        }
    }
}

/// Order in which a caller supplies (and receives) draw records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    /// Chronological, oldest draw first.
    #[default]
    OldestFirst,
    /// Reverse chronological, as most record services return history.
    NewestFirst,
}

impl Direction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OldestFirst => "oldest-first",
            Self::NewestFirst => "newest-first",
        }
    }
}

/// One resolved draw as supplied by a record source. Pity is never part of
/// the input; the aggregator derives it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawEvent {
    #[serde(default)]
    pub name: String,
    pub rarity: u8,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub pool: Option<u32>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub position: Option<u32>,
}

impl DrawEvent {
    #[must_use]
    pub fn new(name: impl Into<String>, rarity: u8) -> Self {
        Self {
            name: name.into(),
            rarity,
            category: ItemCategory::default(),
            time: String::new(),
            pool: None,
            featured: None,
            position: None,
        }
    }

    #[must_use]
    pub const fn with_featured(mut self, featured: bool) -> Self {
        self.featured = Some(featured);
        self
    }

    #[must_use]
    pub const fn with_pool(mut self, pool: u32) -> Self {
        self.pool = Some(pool);
        self
    }

    #[must_use]
    pub const fn with_category(mut self, category: ItemCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = time.into();
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

/// A draw with its derived pity and resolved featured flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDraw {
    /// 1-based chronological position.
    pub position: u32,
    pub name: String,
    pub rarity: u8,
    pub category: ItemCategory,
    pub time: String,
    pub pool: Option<u32>,
    /// Always false below the rare tier.
    pub featured: bool,
    /// Draws since the previous draw of this tier (rare pity for rare draws,
    /// uncommon pity for uncommon draws, 0 otherwise).
    pub pity: u32,
}

/// Rarity ordinals the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityTiers {
    pub common: u8,
    pub uncommon: u8,
    pub rare: u8,
}

impl RarityTiers {
    /// # Errors
    ///
    /// Returns [`ConfigError::TierOrder`] unless `common < uncommon < rare`.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.common < self.uncommon && self.uncommon < self.rare {
            Ok(())
        } else {
            Err(ConfigError::TierOrder {
                common: self.common,
                uncommon: self.uncommon,
                rare: self.rare,
            })
        }
    }

    #[must_use]
    pub const fn recognizes(&self, rarity: u8) -> bool {
        rarity == self.common || rarity == self.uncommon || rarity == self.rare
    }
}

impl Default for RarityTiers {
    fn default() -> Self {
        Self {
            common: COMMON_TIER,
            uncommon: UNCOMMON_TIER,
            rare: RARE_TIER,
        }
    }
}
