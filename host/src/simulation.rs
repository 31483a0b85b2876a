use plinko_core::{Board, BounceSource, DropResult, RiskLevel};
use serde::{Deserialize, Serialize};

/// Most balls a single API request may drop
pub const MAX_BALLS: u32 = 30;

/// Aggregate over a batch of drops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropSummary {
    pub balls: u32,
    /// Hits per slot, index = slot
    pub slot_counts: Vec<u64>,
    pub total_multiplier: f64,
    pub average_multiplier: f64,
    pub best_multiplier: f64,
}

impl DropSummary {
    pub fn new(slots: usize) -> Self {
        Self {
            balls: 0,
            slot_counts: vec![0; slots],
            total_multiplier: 0.0,
            average_multiplier: 0.0,
            best_multiplier: 0.0,
        }
    }

    pub fn record(&mut self, result: &DropResult) {
        self.balls += 1;
        self.slot_counts[result.slot] += 1;
        self.total_multiplier += result.multiplier;
        self.average_multiplier = self.total_multiplier / self.balls as f64;
        if self.balls == 1 || result.multiplier > self.best_multiplier {
            self.best_multiplier = result.multiplier;
        }
    }
}

/// Multi-ball drop: every path plus the summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropReport {
    pub risk: RiskLevel,
    pub start_column: u32,
    pub drops: Vec<DropResult>,
    pub summary: DropSummary,
}

/// Validate a requested ball count for one API call
pub fn check_ball_count(balls: u32) -> Result<u32, String> {
    if balls < 1 {
        return Err("Must drop at least 1 ball".to_string());
    }
    if balls > MAX_BALLS {
        return Err(format!("Maximum {} balls allowed", MAX_BALLS));
    }
    Ok(balls)
}

/// Drop `balls` chips from the same slot, keeping every path
pub fn run_drops<S: BounceSource>(
    board: &Board,
    risk: RiskLevel,
    start_column: u32,
    balls: u32,
    source: &mut S,
) -> DropReport {
    let mut summary = DropSummary::new(board.slot_count());
    let mut drops = Vec::with_capacity(balls as usize);

    for _ in 0..balls {
        let result = board.drop_chip(start_column, source);
        summary.record(&result);
        drops.push(result);
    }

    tracing::debug!(
        "Dropped {} balls from column {} ({}): average {:.3}x",
        balls,
        start_column,
        risk,
        summary.average_multiplier
    );

    DropReport {
        risk,
        start_column,
        drops,
        summary,
    }
}

/// Like [`run_drops`] but only keeps the summary, for large simulation runs
pub fn summarize_drops<S: BounceSource>(
    board: &Board,
    start_column: u32,
    balls: u32,
    source: &mut S,
) -> DropSummary {
    let mut summary = DropSummary::new(board.slot_count());
    for _ in 0..balls {
        summary.record(&board.drop_chip(start_column, source));
    }
    summary
}
