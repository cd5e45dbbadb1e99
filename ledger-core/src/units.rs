//! Package-level conversion table
//!
//! Goods move through the chain in named bundling granularities (a dozen,
//! a 24-pack case, the 16- and 10-piece retail tiers). Every granularity
//! converts into base units through a fixed integer multiplier; all balance
//! bookkeeping and reporting happens in base units.
//!
//! Multipliers are compile-time constants. Entries freeze their converted
//! `base_units` at creation, so a future table change can never rewrite
//! history.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognized package granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageLevel {
    /// Single base unit
    Unit,
    /// Bundle of 6
    HalfDozen,
    /// Bundle of 12
    Dozen,
    /// Shipping case of 24
    Case,
    /// Production series, counted as-is
    Series,
    /// 16-piece retail tier
    Level16,
    /// 10-piece retail tier
    Level10,
}

impl PackageLevel {
    /// All recognized levels, in wire order
    pub const ALL: [PackageLevel; 7] = [
        PackageLevel::Unit,
        PackageLevel::HalfDozen,
        PackageLevel::Dozen,
        PackageLevel::Case,
        PackageLevel::Series,
        PackageLevel::Level16,
        PackageLevel::Level10,
    ];

    /// Base units per count at this level
    pub fn multiplier(&self) -> u64 {
        match self {
            PackageLevel::Unit => 1,
            PackageLevel::HalfDozen => 6,
            PackageLevel::Dozen => 12,
            PackageLevel::Case => 24,
            PackageLevel::Series => 1,
            PackageLevel::Level16 => 16,
            PackageLevel::Level10 => 10,
        }
    }

    /// Wire key for this level
    pub fn key(&self) -> &'static str {
        match self {
            PackageLevel::Unit => "unit",
            PackageLevel::HalfDozen => "half_dozen",
            PackageLevel::Dozen => "dozen",
            PackageLevel::Case => "case",
            PackageLevel::Series => "series",
            PackageLevel::Level16 => "level_16",
            PackageLevel::Level10 => "level_10",
        }
    }

    /// Parse from a wire key; unrecognized keys are rejected, not ignored
    pub fn from_key(key: &str) -> Result<Self> {
        match key {
            "unit" => Ok(PackageLevel::Unit),
            "half_dozen" => Ok(PackageLevel::HalfDozen),
            "dozen" => Ok(PackageLevel::Dozen),
            "case" => Ok(PackageLevel::Case),
            "series" => Ok(PackageLevel::Series),
            "level_16" => Ok(PackageLevel::Level16),
            "level_10" => Ok(PackageLevel::Level10),
            _ => Err(Error::InvalidLevel(key.to_string())),
        }
    }
}

impl fmt::Display for PackageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Per-level counts for one entry
///
/// A closed record rather than an open map: an unknown level cannot be
/// represented, only rejected at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageQuantity {
    /// Count of single units
    #[serde(default)]
    pub unit: u64,
    /// Count of half-dozen bundles
    #[serde(default)]
    pub half_dozen: u64,
    /// Count of dozen bundles
    #[serde(default)]
    pub dozen: u64,
    /// Count of 24-unit cases
    #[serde(default)]
    pub case: u64,
    /// Count of production series
    #[serde(default)]
    pub series: u64,
    /// Count of 16-piece tiers
    #[serde(default)]
    pub level_16: u64,
    /// Count of 10-piece tiers
    #[serde(default)]
    pub level_10: u64,
}

impl PackageQuantity {
    /// Build from raw `(key, count)` pairs as they arrive on the wire.
    ///
    /// Fails with `InvalidLevel` for an unrecognized key and
    /// `InvalidQuantity` for a negative count or one whose converted total
    /// would overflow, so a quantity built here always has an exact
    /// `base_units`.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, i64)>,
    {
        let mut quantity = PackageQuantity::default();
        let mut total: u64 = 0;
        for (key, count) in pairs {
            let level = PackageLevel::from_key(key)?;
            if count < 0 {
                return Err(Error::InvalidQuantity {
                    level: key.to_string(),
                    count,
                });
            }
            let overflow = || Error::InvalidQuantity {
                level: key.to_string(),
                count,
            };
            let slot = quantity.count_mut(level);
            *slot = slot.checked_add(count as u64).ok_or_else(overflow)?;
            total = (count as u64)
                .checked_mul(level.multiplier())
                .and_then(|units| total.checked_add(units))
                .ok_or_else(overflow)?;
        }
        Ok(quantity)
    }

    /// Count at one level
    pub fn count(&self, level: PackageLevel) -> u64 {
        match level {
            PackageLevel::Unit => self.unit,
            PackageLevel::HalfDozen => self.half_dozen,
            PackageLevel::Dozen => self.dozen,
            PackageLevel::Case => self.case,
            PackageLevel::Series => self.series,
            PackageLevel::Level16 => self.level_16,
            PackageLevel::Level10 => self.level_10,
        }
    }

    fn count_mut(&mut self, level: PackageLevel) -> &mut u64 {
        match level {
            PackageLevel::Unit => &mut self.unit,
            PackageLevel::HalfDozen => &mut self.half_dozen,
            PackageLevel::Dozen => &mut self.dozen,
            PackageLevel::Case => &mut self.case,
            PackageLevel::Series => &mut self.series,
            PackageLevel::Level16 => &mut self.level_16,
            PackageLevel::Level10 => &mut self.level_10,
        }
    }

    /// Convert to base units: `Σ count × multiplier`
    ///
    /// Saturates at `u64::MAX` rather than wrapping; quantities built
    /// through `from_pairs` are pre-checked and never saturate.
    pub fn base_units(&self) -> u64 {
        PackageLevel::ALL.iter().fold(0u64, |total, level| {
            total.saturating_add(self.count(*level).saturating_mul(level.multiplier()))
        })
    }

    /// True when every count is zero
    pub fn is_empty(&self) -> bool {
        PackageLevel::ALL.iter().all(|level| self.count(*level) == 0)
    }
}
