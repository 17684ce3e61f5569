//! Error types for board rules and computer players.

use super::{Mark, Position};
use derive_more::Display;

/// Error that can occur when applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MoveError {
    /// The index does not name a cell (must be 0-8).
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    OutOfBounds(usize),

    /// The square at the position is already occupied.
    #[display("Square {} is already occupied", _0)]
    SquareOccupied(Position),

    /// The game is already over.
    #[display("Game is already over")]
    GameOver,
}

impl std::error::Error for MoveError {}

/// Error raised by a computer strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DecisionError {
    /// Asked to move on a board with no empty squares.
    #[display("No moves available for {}", _0)]
    NoMovesAvailable(Mark),
}

impl std::error::Error for DecisionError {}
