//! Host-side plumbing around the Plinko board: persisted player balance,
//! server settings and multi-ball drop reports.

pub mod balance;
pub mod settings;
pub mod simulation;

pub use balance::{validate_balance, BalanceError, BalanceStore};
pub use settings::ServerSettings;
pub use simulation::{check_ball_count, run_drops, summarize_drops, DropReport, DropSummary, MAX_BALLS};

use plinko_core::{Boards, ConfigError};

/// Build and validate every payout preset.
///
/// Call once at startup: a misconfigured preset should stop the process
/// before it serves a single drop.
pub fn load_boards() -> Result<Boards, ConfigError> {
    let boards = Boards::standard()?;
    tracing::info!("Validated payout presets for all risk levels");
    Ok(boards)
}
