//! Centralized tuning constants for the built-in game variants.
//!
//! These values mirror the published drop-rate rules of each game. Keeping
//! them together means a rate change is a reviewed code change rather than
//! a silent data edit.

// Shared ------------------------------------------------------------------
pub(crate) const CONTINUITY_TOLERANCE: f64 = 1e-9;
pub(crate) const MEDIAN_PERCENTILE: f64 = 50.0;
pub(crate) const DEFAULT_CEILING_PERCENTILE: f64 = 99.9;
pub(crate) const DEFAULT_FEATURED_RATE: f64 = 0.5;

pub(crate) const RARE_TIER: u8 = 5;
pub(crate) const UNCOMMON_TIER: u8 = 4;
pub(crate) const COMMON_TIER: u8 = 3;

/// Marker some record sources embed in featured item names ("limited").
pub(crate) const FEATURED_NAME_MARKER: &str = "限定";

// Wuthering Waves -----------------------------------------------------------
pub(crate) const WW_BASE_RATE: f64 = 0.008;
pub(crate) const WW_HARD_CAP: u32 = 79;
/// (threshold, rate at threshold, slope) for the soft-pity ramp.
pub(crate) const WW_SOFT_PITY: [(u32, f64, f64); 3] =
    [(65, 0.008, 0.04), (70, 0.208, 0.08), (75, 0.608, 0.10)];
pub(crate) const WW_FLOOR_PERCENTILE: f64 = 0.27;
pub(crate) const WW_UNCOMMON_RATE: f64 = 0.06;
pub(crate) const WW_STANDARD_ROSTER: [&str; 5] = ["凌陽", "維里奈", "安可", "卡卡羅", "鑒心"];
pub(crate) const WW_FEATURED_ROSTER: [&str; 14] = [
    "吟霖", "忌炎", "今汐", "長離", "守岸人", "布蘭特", "相里要", "折枝", "椿", "洛可可",
    "露緹亞", "莫寧", "渡嵐", "琳奈",
];
/// Featured resonator and featured weapon convenes.
pub(crate) const WW_FEATURED_POOLS: [u32; 2] = [1, 2];
/// Standard, beginner and beginner's choice convenes.
pub(crate) const WW_STANDARD_POOLS: [u32; 5] = [3, 4, 5, 6, 7];

// Genshin Impact -----------------------------------------------------------
pub(crate) const GI_BASE_RATE: f64 = 0.006;
pub(crate) const GI_HARD_CAP: u32 = 90;
pub(crate) const GI_SOFT_PITY: [(u32, f64, f64); 1] = [(73, 0.006, 0.06)];
pub(crate) const GI_FLOOR_PERCENTILE: f64 = 0.3;
pub(crate) const GI_UNCOMMON_RATE: f64 = 0.051;

pub(crate) const UNCOMMON_HARD_CAP: u32 = 10;
