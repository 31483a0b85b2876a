use serde::{Deserialize, Serialize};

/// One point of a chip's trajectory. Row 0 is the drop point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub column: u32,
    pub row: u32,
}

impl Position {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }
}

/// Ordered positions from the drop point down to the bottom row.
///
/// Serialized as a plain JSON array of `{ "column", "row" }` objects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<Position>);

impl Path {
    pub(crate) fn from_positions(positions: Vec<Position>) -> Self {
        Self(positions)
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Column the chip came to rest in
    pub fn final_column(&self) -> u32 {
        self.0.last().map(|p| p.column).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.0.iter()
    }
}

/// A single peg deflection
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Left,
    Right,
}

impl Step {
    pub fn delta(self) -> i64 {
        match self {
            Step::Left => -1,
            Step::Right => 1,
        }
    }
}

/// Slot and multiplier a terminal column resolves to
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payout {
    pub slot: usize,
    pub multiplier: f64,
}

/// Outcome of one chip drop, returned to the caller as-is
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropResult {
    pub path: Path,
    pub slot: usize,
    pub multiplier: f64,
}
