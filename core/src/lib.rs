//! Plinko board simulation.
//!
//! A chip dropped at a slot random-walks down [`ROW_COUNT`] rows of pegs
//! ([`PathSimulator`]); the column it rests in is bucketed into a payout slot
//! ([`PayoutResolver`]). [`Board`] pairs the two and is the only thing request
//! handlers need to hold.

mod board;
mod bounce;
mod constants;
mod error;
mod payout;
mod types;

use serde::{Deserialize, Serialize};

pub use board::PathSimulator;
pub use bounce::{BounceSource, RandomBounces, ScriptedBounces};
pub use constants::*;
pub use error::ConfigError;
pub use payout::{Bucketing, PayoutResolver, PayoutTable};
pub use types::{DropResult, Path, Payout, Position, Step};

/// Payout preset selectable by the player
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Original 9-slot board, gentle 0.2x-2x spread
    #[default]
    Classic,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Classic,
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
    ];

    pub fn multipliers(self) -> &'static [f64] {
        match self {
            RiskLevel::Classic => &CLASSIC_MULTIPLIERS,
            RiskLevel::Low => &LOW_RISK_MULTIPLIERS,
            RiskLevel::Medium => &MEDIUM_RISK_MULTIPLIERS,
            RiskLevel::High => &HIGH_RISK_MULTIPLIERS,
        }
    }

    /// Bucket width paired with this preset's table length
    pub fn bucket_width(self) -> (u32, u32) {
        match self {
            RiskLevel::Classic => CLASSIC_BUCKET,
            RiskLevel::Low | RiskLevel::Medium | RiskLevel::High => WIDE_BUCKET,
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "classic" => Ok(RiskLevel::Classic),
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(format!(
                "Invalid risk level: '{}'. Must be 'classic', 'low', 'medium', or 'high'",
                s
            )),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Classic => write!(f, "classic"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// A validated peg board: simulator plus the payout table it feeds.
///
/// Holds no mutable state, so one value can serve any number of concurrent
/// drops. Randomness comes in through the [`BounceSource`] on each call.
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    simulator: PathSimulator,
    resolver: PayoutResolver,
}

impl Board {
    pub fn new(rows: u32, multipliers: Vec<f64>, bucketing: Bucketing) -> Result<Self, ConfigError> {
        let simulator = PathSimulator::new(rows)?;
        let table = PayoutTable::new(multipliers)?;
        let resolver = PayoutResolver::new(table, bucketing, simulator.max_final_column())?;
        Ok(Self { simulator, resolver })
    }

    pub fn preset(risk: RiskLevel) -> Result<Self, ConfigError> {
        let (numerator, denominator) = risk.bucket_width();
        Self::new(
            ROW_COUNT,
            risk.multipliers().to_vec(),
            Bucketing::new(numerator, denominator)?,
        )
    }

    pub fn rows(&self) -> u32 {
        self.simulator.rows()
    }

    pub fn slot_count(&self) -> usize {
        self.resolver.table().len()
    }

    pub fn multipliers(&self) -> &[f64] {
        self.resolver.table().as_slice()
    }

    /// Clamp a requested drop slot onto the board
    pub fn clamp_start(&self, requested: i64) -> u32 {
        requested.clamp(0, self.resolver.table().last_slot() as i64) as u32
    }

    /// Drop one chip. `start_column` should already be clamped with [`Board::clamp_start`].
    pub fn drop_chip<S: BounceSource>(&self, start_column: u32, source: &mut S) -> DropResult {
        let path = self.simulator.simulate(start_column, source);
        let Payout { slot, multiplier } = self.resolver.resolve(path.final_column());
        DropResult { path, slot, multiplier }
    }

    /// Exact landing probability of each slot for chips dropped at `start_column`
    pub fn slot_probabilities(&self, start_column: u32) -> Vec<f64> {
        let mut slots = vec![0.0; self.slot_count()];
        for (column, p) in self.simulator.column_distribution(start_column).into_iter().enumerate() {
            slots[self.resolver.resolve(column as u32).slot] += p;
        }
        slots
    }

    /// Mean multiplier a chip dropped at `start_column` returns
    pub fn expected_multiplier(&self, start_column: u32) -> f64 {
        self.slot_probabilities(start_column)
            .iter()
            .zip(self.multipliers())
            .map(|(p, m)| p * m)
            .sum()
    }
}

/// One validated board per risk level, built once at startup
#[derive(Debug, Clone)]
pub struct Boards {
    classic: Board,
    low: Board,
    medium: Board,
    high: Board,
}

impl Boards {
    pub fn standard() -> Result<Self, ConfigError> {
        Ok(Self {
            classic: Board::preset(RiskLevel::Classic)?,
            low: Board::preset(RiskLevel::Low)?,
            medium: Board::preset(RiskLevel::Medium)?,
            high: Board::preset(RiskLevel::High)?,
        })
    }

    pub fn get(&self, risk: RiskLevel) -> &Board {
        match risk {
            RiskLevel::Classic => &self.classic,
            RiskLevel::Low => &self.low,
            RiskLevel::Medium => &self.medium,
            RiskLevel::High => &self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::str::FromStr;

    #[test]
    fn test_all_right_from_left_edge() {
        let board = Board::preset(RiskLevel::Classic).unwrap();
        let mut source = ScriptedBounces::constant(Step::Right);

        let result = board.drop_chip(0, &mut source);
        assert_eq!(result.path.final_column(), 12);
        assert_eq!(result.slot, 8);
        assert_eq!(result.multiplier, CLASSIC_MULTIPLIERS[8]);
    }

    #[test]
    fn test_all_left_from_right_edge() {
        let board = Board::preset(RiskLevel::Classic).unwrap();
        let mut source = ScriptedBounces::constant(Step::Left);

        let result = board.drop_chip(8, &mut source);
        assert_eq!(result.path.final_column(), 0);
        assert_eq!(result.slot, 0);
        assert_eq!(result.multiplier, CLASSIC_MULTIPLIERS[0]);
    }

    #[test]
    fn test_same_sequence_same_result() {
        let board = Board::preset(RiskLevel::Medium).unwrap();
        let script = vec![Step::Right, Step::Left, Step::Right, Step::Right, Step::Left];

        let first = board.drop_chip(4, &mut ScriptedBounces::new(script.clone()));
        let second = board.drop_chip(4, &mut ScriptedBounces::new(script));
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeded_drops_reproduce() {
        let board = Board::preset(RiskLevel::High).unwrap();
        let mut a = RandomBounces::new(ChaCha8Rng::seed_from_u64(2024));
        let mut b = RandomBounces::new(ChaCha8Rng::seed_from_u64(2024));

        for start in 0..board.slot_count() as u32 {
            assert_eq!(board.drop_chip(start, &mut a), board.drop_chip(start, &mut b));
        }
    }

    #[test]
    fn test_slot_always_in_table() {
        let boards = Boards::standard().unwrap();
        let mut source = RandomBounces::new(ChaCha8Rng::seed_from_u64(5));

        for risk in RiskLevel::ALL {
            let board = boards.get(risk);
            for start in 0..board.slot_count() as u32 {
                for _ in 0..200 {
                    let result = board.drop_chip(start, &mut source);
                    assert!(result.slot < board.slot_count());
                    assert_eq!(result.multiplier, board.multipliers()[result.slot]);
                    assert_eq!(result.path.len(), ROW_COUNT as usize + 1);
                }
            }
        }
    }

    #[test]
    fn test_slot_probabilities_sum_to_one() {
        let boards = Boards::standard().unwrap();
        for risk in RiskLevel::ALL {
            let board = boards.get(risk);
            for start in 0..board.slot_count() as u32 {
                let total: f64 = board.slot_probabilities(start).iter().sum();
                assert!((total - 1.0).abs() < 1e-12, "{} from {}: {}", risk, start, total);
            }
        }
    }

    #[test]
    fn test_expected_multiplier_within_table_range() {
        let board = Board::preset(RiskLevel::Classic).unwrap();
        for start in 0..board.slot_count() as u32 {
            let ev = board.expected_multiplier(start);
            assert!((0.2..=2.0).contains(&ev), "ev {} from {}", ev, start);
        }
    }

    #[test]
    fn test_clamp_start() {
        let classic = Board::preset(RiskLevel::Classic).unwrap();
        assert_eq!(classic.clamp_start(-5), 0);
        assert_eq!(classic.clamp_start(4), 4);
        assert_eq!(classic.clamp_start(99), 8);

        let high = Board::preset(RiskLevel::High).unwrap();
        assert_eq!(high.clamp_start(99), 10);
    }

    #[test]
    fn test_presets_validate() {
        for risk in RiskLevel::ALL {
            let board = Board::preset(risk).unwrap();
            assert_eq!(board.rows(), ROW_COUNT);
            assert_eq!(board.multipliers(), risk.multipliers());
        }
    }

    #[test]
    fn test_empty_board_fails_fast() {
        let bucketing = Bucketing::new(3, 2).unwrap();
        assert_eq!(
            Board::new(ROW_COUNT, vec![], bucketing),
            Err(ConfigError::EmptyTable)
        );
    }

    #[test]
    fn test_risk_level_parse() {
        assert_eq!(RiskLevel::from_str("HIGH").unwrap(), RiskLevel::High);
        assert_eq!(RiskLevel::from_str("classic").unwrap(), RiskLevel::Classic);
        assert!(RiskLevel::from_str("extreme").is_err());
        assert_eq!(RiskLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_drop_result_json_shape() {
        let board = Board::preset(RiskLevel::Classic).unwrap();
        let result = board.drop_chip(0, &mut ScriptedBounces::constant(Step::Right));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["slot"], 8);
        assert_eq!(json["path"][0]["column"], 0);
        assert_eq!(json["path"][0]["row"], 0);
        assert_eq!(json["path"][12]["column"], 12);
    }
}
