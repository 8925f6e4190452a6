use thiserror::Error;

use crate::grid::ZoneType;
use crate::tools::Tool;

/// Reasons a tool could not be applied to a tile. The grid is left untouched
/// in every case and no cost should be charged.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    #[error("insufficient funds: {tool} costs {cost}, only {available} available")]
    InsufficientFunds {
        tool: Tool,
        cost: i64,
        available: i64,
    },

    #[error("tile ({x}, {y}) is already {zone:?}")]
    AlreadyZoned { x: usize, y: usize, zone: ZoneType },

    #[error("tile ({x}, {y}) is occupied by {zone:?}; bulldoze it first")]
    Occupied { x: usize, y: usize, zone: ZoneType },

    #[error("tile ({x}, {y}) is outside the {size}x{size} grid")]
    OutOfBounds { x: usize, y: usize, size: usize },
}

impl PlacementError {
    /// True when the failure came from the budget rather than the tile.
    pub fn is_funds(&self) -> bool {
        matches!(self, PlacementError::InsufficientFunds { .. })
    }
}

/// Precondition violations detected by the simulation engine. These point at
/// a driver bug and are not recoverable inside the core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("invalid grid shape: expected {expected}x{expected}, found {found}")]
    InvalidGridShape { expected: usize, found: String },
}
