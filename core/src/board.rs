use crate::bounce::BounceSource;
use crate::constants::ROW_COUNT;
use crate::error::ConfigError;
use crate::types::{Path, Position};

/// Random walk of a chip down a triangular peg board.
///
/// Row `r` is `r + 1` columns wide, so after each bounce the column is clamped
/// into `[0, r]`. A chip pressed against an edge stays there instead of falling
/// off the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSimulator {
    rows: u32,
}

impl Default for PathSimulator {
    fn default() -> Self {
        Self { rows: ROW_COUNT }
    }
}

impl PathSimulator {
    pub fn new(rows: u32) -> Result<Self, ConfigError> {
        if rows == 0 {
            return Err(ConfigError::NoRows);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Rightmost column a chip can end in
    pub fn max_final_column(&self) -> u32 {
        self.rows
    }

    /// Drop a chip from `start_column` and record every bounce.
    ///
    /// Total over any start column: the first row's clamp absorbs anything
    /// outside the board. Consumes exactly `rows` steps from `source`.
    pub fn simulate<S: BounceSource>(&self, start_column: u32, source: &mut S) -> Path {
        let mut positions = Vec::with_capacity(self.rows as usize + 1);
        positions.push(Position::new(start_column, 0));

        let mut column = i64::from(start_column);
        for row in 1..=self.rows {
            column = (column + source.next_step().delta()).clamp(0, i64::from(row));
            positions.push(Position::new(column as u32, row));
        }

        Path::from_positions(positions)
    }

    /// Exact probability of resting in each column `0..=rows` under fair bounces.
    pub fn column_distribution(&self, start_column: u32) -> Vec<f64> {
        let width = self.rows as usize + 1;
        let mut current = vec![0.0; width + 1];
        let start = (start_column as usize).min(width);
        current[start] = 1.0;

        for row in 1..=self.rows as usize {
            let mut next = vec![0.0; width + 1];
            for (column, &p) in current.iter().enumerate() {
                if p == 0.0 {
                    continue;
                }
                let left = column.saturating_sub(1).min(row);
                let right = (column + 1).min(row);
                next[left] += p * 0.5;
                next[right] += p * 0.5;
            }
            current = next;
        }

        current.truncate(width);
        current
    }
}
