//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating game state
//! according to tic-tac-toe rules. Rules never mutate the board they
//! are given; `apply_move` hands back a new one.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, check_winner};

use super::{Board, Mark, MoveError, Position, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Verdict on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Evaluation {
    /// Moves remain and nobody has won.
    Open,
    /// A line is filled with this mark.
    Win(Mark),
    /// Board is full with no winning line.
    Draw,
}

impl Evaluation {
    /// True for `Win` and `Draw`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Evaluation::Open)
    }
}

/// Places `mark` at cell `index`, returning the resulting board.
///
/// Only occupancy and bounds are checked here; whose turn it is belongs
/// to the caller.
#[instrument(skip(board), fields(board = %board))]
pub fn apply_move(board: &Board, index: usize, mark: Mark) -> Result<Board, MoveError> {
    let pos = Position::from_index(index).ok_or(MoveError::OutOfBounds(index))?;
    if !board.is_empty(pos) {
        return Err(MoveError::SquareOccupied(pos));
    }

    let mut next = *board;
    next.set(pos, Square::Occupied(mark));
    Ok(next)
}

/// Evaluates the board: a winning line beats a full board.
pub fn evaluate(board: &Board) -> Evaluation {
    if let Some(mark) = check_winner(board) {
        Evaluation::Win(mark)
    } else if is_draw(board) {
        Evaluation::Draw
    } else {
        Evaluation::Open
    }
}

/// Empty cells in ascending index order.
///
/// This order is the tie-break order for every strategy.
pub fn empty_cells(board: &Board) -> Vec<Position> {
    Position::valid_moves(board)
}
