use serde::Serialize;

use crate::error::ConfigError;
use crate::types::Payout;

/// Ordered multipliers, index 0 = leftmost slot. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PayoutTable(Vec<f64>);

impl PayoutTable {
    pub fn new(multipliers: Vec<f64>) -> Result<Self, ConfigError> {
        if multipliers.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        if let Some((index, &value)) = multipliers
            .iter()
            .enumerate()
            .find(|(_, m)| !m.is_finite() || **m < 0.0)
        {
            return Err(ConfigError::InvalidMultiplier { index, value });
        }
        Ok(Self(multipliers))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last_slot(&self) -> usize {
        self.0.len() - 1
    }

    pub fn get(&self, slot: usize) -> Option<f64> {
        self.0.get(slot).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// How many columns feed one slot, as an exact fraction.
///
/// `slot = floor(column * denominator / numerator)`, so 3/2 buckets columns
/// 1.5 at a time without float rounding at the bucket edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bucketing {
    numerator: u32,
    denominator: u32,
}

impl Bucketing {
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, ConfigError> {
        if numerator == 0 || denominator == 0 {
            return Err(ConfigError::ZeroBucketWidth);
        }
        if numerator < denominator {
            return Err(ConfigError::BucketTooNarrow { numerator, denominator });
        }
        Ok(Self { numerator, denominator })
    }

    pub fn bucket(&self, column: u32) -> usize {
        (u64::from(column) * u64::from(self.denominator) / u64::from(self.numerator)) as usize
    }
}

/// Maps a resting column to a payout slot.
#[derive(Debug, Clone, PartialEq)]
pub struct PayoutResolver {
    table: PayoutTable,
    bucketing: Bucketing,
}

impl PayoutResolver {
    /// The table and bucket width are checked together: every slot must be
    /// reachable from some column in `0..=max_column`.
    pub fn new(
        table: PayoutTable,
        bucketing: Bucketing,
        max_column: u32,
    ) -> Result<Self, ConfigError> {
        let highest_reachable = bucketing.bucket(max_column);
        if highest_reachable < table.last_slot() {
            return Err(ConfigError::UnreachableSlots {
                highest_reachable,
                slots: table.len(),
            });
        }
        Ok(Self { table, bucketing })
    }

    pub fn resolve(&self, final_column: u32) -> Payout {
        let slot = self.bucketing.bucket(final_column).min(self.table.last_slot());
        Payout {
            slot,
            multiplier: self.table.as_slice()[slot],
        }
    }

    pub fn table(&self) -> &PayoutTable {
        &self.table
    }

    pub fn bucketing(&self) -> Bucketing {
        self.bucketing
    }
}
