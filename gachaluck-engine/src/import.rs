//! Conversion of raw record-service entries into draw events.
//!
//! Record services return history newest first, one pool per request, with
//! the pool id sometimes quoted. Times use the `YYYY-MM-DD HH:MM:SS` layout,
//! so they order correctly as plain strings.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Engine;
use crate::error::Result;
use crate::event::{AnnotatedDraw, Direction, DrawEvent, ItemCategory};

/// Pool id as sent by the service: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPool {
    Number(u32),
    Text(String),
}

impl RawPool {
    /// Numeric pool id. Text ids are read up to the first non-digit.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        match self {
            Self::Number(id) => Some(*id),
            Self::Text(text) => {
                let trimmed = text.trim();
                let digits = trimmed
                    .find(|c: char| !c.is_ascii_digit())
                    .map_or(trimmed, |end| &trimmed[..end]);
                digits.parse().ok()
            }
        }
    }
}

/// One entry exactly as the record service returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecord {
    #[serde(default)]
    pub card_pool_type: Option<RawPool>,
    #[serde(default)]
    pub resource_id: Option<u64>,
    pub quality_level: u8,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub time: String,
}

impl RawRecord {
    /// Pool the record belongs to; a missing or zero id falls back to `default_pool`.
    #[must_use]
    pub fn pool_or(&self, default_pool: u32) -> u32 {
        self.card_pool_type
            .as_ref()
            .and_then(RawPool::id)
            .filter(|&id| id != 0)
            .unwrap_or(default_pool)
    }

    #[must_use]
    pub fn category(&self) -> ItemCategory {
        match self.resource_type.trim() {
            "角色" => ItemCategory::Character,
            other
                if other.eq_ignore_ascii_case("resonator")
                    || other.eq_ignore_ascii_case("character") =>
            {
                ItemCategory::Character
            }
            _ => ItemCategory::Weapon,
        }
    }
}

/// Draw events for one pool, newest first as supplied.
#[must_use]
pub fn events_for_pool(raw: &[RawRecord], pool: u32, engine: &Engine) -> Vec<DrawEvent> {
    let tiers = engine.profile().tiers;
    raw.iter()
        .filter(|record| record.pool_or(pool) == pool)
        .filter(|record| {
            let known = tiers.recognizes(record.quality_level);
            if !known {
                log::warn!(
                    "skipping {} at {}: quality {} is not a known tier",
                    record.name,
                    record.time,
                    record.quality_level
                );
            }
            known
        })
        .map(|record| {
            DrawEvent::new(record.name.clone(), record.quality_level)
                .with_category(record.category())
                .with_time(record.time.clone())
                .with_pool(pool)
        })
        .collect()
}

/// Annotate one pool's raw history, returning draws newest first.
///
/// # Errors
///
/// Propagates aggregation errors from the engine.
pub fn convert_raw_records(
    raw: &[RawRecord],
    pool: u32,
    engine: &Engine,
) -> Result<Vec<AnnotatedDraw>> {
    let events = events_for_pool(raw, pool, engine);
    let mut draws = engine.annotate(&events, Direction::NewestFirst)?;
    sort_newest_first(&mut draws);
    Ok(draws)
}

/// Split a flat raw history by pool, keeping each pool's order.
#[must_use]
pub fn group_by_pool(raw: &[RawRecord], default_pool: u32) -> BTreeMap<u32, Vec<RawRecord>> {
    let mut grouped: BTreeMap<u32, Vec<RawRecord>> = BTreeMap::new();
    for record in raw {
        grouped
            .entry(record.pool_or(default_pool))
            .or_default()
            .push(record.clone());
    }
    grouped
}

/// Annotate every pool independently and merge the results newest first.
/// Pity never carries across pools.
///
/// # Errors
///
/// Propagates the first per-pool aggregation error.
pub fn merge_pools(
    pools: &BTreeMap<u32, Vec<RawRecord>>,
    engine: &Engine,
) -> Result<Vec<AnnotatedDraw>> {
    let mut merged = Vec::new();
    for (&pool, records) in pools {
        merged.extend(convert_raw_records(records, pool, engine)?);
    }
    sort_newest_first(&mut merged);
    Ok(merged)
}

fn sort_newest_first(draws: &mut [AnnotatedDraw]) {
    draws.sort_by(|a, b| b.time.cmp(&a.time).then(b.position.cmp(&a.position)));
}
