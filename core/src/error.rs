use std::fmt;

/// Board misconfiguration, caught when a board is built rather than on first drop
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The board needs at least one peg row
    NoRows,
    /// The payout table has no slots
    EmptyTable,
    /// A multiplier is NaN, infinite or negative
    InvalidMultiplier { index: usize, value: f64 },
    /// Bucket width numerator or denominator is zero
    ZeroBucketWidth,
    /// Buckets narrower than one column skip slots
    BucketTooNarrow { numerator: u32, denominator: u32 },
    /// The widest column cannot reach the last slot
    UnreachableSlots { highest_reachable: usize, slots: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoRows => write!(f, "board must have at least one row"),
            ConfigError::EmptyTable => write!(f, "payout table must have at least one slot"),
            ConfigError::InvalidMultiplier { index, value } => {
                write!(f, "invalid multiplier {} at slot {}", value, index)
            }
            ConfigError::ZeroBucketWidth => write!(f, "bucket width must be non-zero"),
            ConfigError::BucketTooNarrow { numerator, denominator } => write!(
                f,
                "bucket width {}/{} is below one column; some slots would be skipped",
                numerator, denominator
            ),
            ConfigError::UnreachableSlots { highest_reachable, slots } => write!(
                f,
                "payout table has {} slots but chips can only reach slot {}",
                slots, highest_reachable
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
