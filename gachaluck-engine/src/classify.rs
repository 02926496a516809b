//! Featured-outcome classification for rare draws.
//!
//! Record sources disagree on how a featured draw is marked: some carry an
//! explicit flag, some embed a marker in the item name, and others only say
//! which pool the draw came from. Classification is therefore a list of
//! rules evaluated in order; the first rule with an opinion decides.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::FEATURED_NAME_MARKER;
use crate::error::ConfigError;
use crate::event::DrawEvent;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FeaturedRule {
    /// Use the record's own `featured` flag when present.
    ExplicitFlag,
    /// Names containing the marker are featured.
    NameMarker { marker: String },
    /// Known featured and standard item names.
    Roster {
        #[serde(default)]
        featured: BTreeSet<String>,
        #[serde(default)]
        standard: BTreeSet<String>,
    },
    /// Decide by the pool the draw came from.
    PoolType {
        #[serde(default)]
        featured: Vec<u32>,
        #[serde(default)]
        standard: Vec<u32>,
    },
    /// Answer for records no earlier rule recognized.
    Fallback { featured: bool },
}

impl FeaturedRule {
    #[must_use]
    pub fn name_marker() -> Self {
        Self::NameMarker {
            marker: FEATURED_NAME_MARKER.to_string(),
        }
    }

    #[must_use]
    pub fn roster<'a>(
        featured: impl IntoIterator<Item = &'a str>,
        standard: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::Roster {
            featured: featured.into_iter().map(str::to_string).collect(),
            standard: standard.into_iter().map(str::to_string).collect(),
        }
    }

    /// `Some(verdict)` when this rule recognizes the record.
    #[must_use]
    pub fn evaluate(&self, event: &DrawEvent) -> Option<bool> {
        match self {
            Self::ExplicitFlag => event.featured,
            Self::NameMarker { marker } => {
                (!marker.is_empty() && event.name.contains(marker.as_str())).then_some(true)
            }
            Self::Roster { featured, standard } => {
                if featured.contains(&event.name) {
                    Some(true)
                } else if standard.contains(&event.name) {
                    Some(false)
                } else {
                    None
                }
            }
            Self::PoolType { featured, standard } => {
                let pool = event.pool?;
                if featured.contains(&pool) {
                    Some(true)
                } else if standard.contains(&pool) {
                    Some(false)
                } else {
                    None
                }
            }
            Self::Fallback { featured } => Some(*featured),
        }
    }
}

/// Ordered rule list. Records matched by no rule are not featured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeaturedClassifier {
    pub rules: Vec<FeaturedRule>,
}

impl FeaturedClassifier {
    #[must_use]
    pub const fn new(rules: Vec<FeaturedRule>) -> Self {
        Self { rules }
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::RosterOverlap`] when a roster lists a name as
    /// both featured and standard.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for rule in &self.rules {
            if let FeaturedRule::Roster { featured, standard } = rule
                && let Some(name) = featured.intersection(standard).next()
            {
                return Err(ConfigError::RosterOverlap { name: name.clone() });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn classify(&self, event: &DrawEvent) -> bool {
        self.rules
            .iter()
            .find_map(|rule| rule.evaluate(event))
            .unwrap_or(false)
    }
}

impl Default for FeaturedClassifier {
    /// Explicit flag, then the name marker.
    fn default() -> Self {
        Self::new(vec![FeaturedRule::ExplicitFlag, FeaturedRule::name_marker()])
    }
}
