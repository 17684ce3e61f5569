//! Medium: take a win, else block a loss, else play randomly.

use super::{RandomStrategy, Strategy};
use crate::rules::{self, Evaluation};
use crate::{Board, DecisionError, Mark, Position};
use tracing::{debug, instrument};

/// One-ply lookahead with a random fallback.
#[derive(Debug, Clone)]
pub struct HeuristicStrategy {
    mark: Mark,
    fallback: RandomStrategy,
}

impl HeuristicStrategy {
    /// Creates a heuristic strategy with an OS-seeded fallback.
    pub fn new(mark: Mark) -> Self {
        Self {
            mark,
            fallback: RandomStrategy::new(mark),
        }
    }

    /// Creates a heuristic strategy with a reproducible fallback.
    pub fn with_seed(mark: Mark, seed: u64) -> Self {
        Self {
            mark,
            fallback: RandomStrategy::with_seed(mark, seed),
        }
    }
}

/// Lowest empty cell that completes a line for `mark`.
fn winning_cell(board: &Board, mark: Mark) -> Option<Position> {
    rules::empty_cells(board).into_iter().find(|pos| {
        rules::apply_move(board, pos.to_index(), mark)
            .map(|next| rules::evaluate(&next) == Evaluation::Win(mark))
            .unwrap_or(false)
    })
}

impl Strategy for HeuristicStrategy {
    fn mark(&self) -> Mark {
        self.mark
    }

    fn name(&self) -> &str {
        "heuristic"
    }

    #[instrument(skip(self, board), fields(mark = %self.mark, board = %board))]
    fn choose_move(&mut self, board: &Board) -> Result<Position, DecisionError> {
        if let Some(pos) = winning_cell(board, self.mark) {
            debug!(position = %pos, "Taking the win");
            return Ok(pos);
        }
        if let Some(pos) = winning_cell(board, self.mark.opponent()) {
            debug!(position = %pos, "Blocking the opponent");
            return Ok(pos);
        }
        self.fallback.choose_move(board)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_opponent_row() {
        // X threatens the top row; O has nothing to win with.
        let board: Board = "XX_O_____".parse().unwrap();
        let mut strategy = HeuristicStrategy::with_seed(Mark::O, 3);
        assert_eq!(strategy.choose_move(&board), Ok(Position::TopRight));
    }

    #[test]
    fn test_prefers_own_win_over_block() {
        // Both sides threaten. Winning is checked before blocking, so O
        // completes its middle row at 5 rather than blocking at 2.
        let board: Board = "XX_OO____".parse().unwrap();
        let mut strategy = HeuristicStrategy::with_seed(Mark::O, 3);
        assert_eq!(strategy.choose_move(&board), Ok(Position::MiddleRight));
    }

    #[test]
    fn test_lowest_winning_cell_first() {
        // X can win at 2 (top row) or 6 (left column).
        let board: Board = "XX_X___OO".parse().unwrap();
        let mut strategy = HeuristicStrategy::with_seed(Mark::X, 3);
        assert_eq!(strategy.choose_move(&board), Ok(Position::TopRight));
    }

    #[test]
    fn test_falls_back_to_an_empty_cell() {
        let board: Board = "X________".parse().unwrap();
        let mut strategy = HeuristicStrategy::with_seed(Mark::O, 3);
        let pos = strategy.choose_move(&board).unwrap();
        assert!(board.is_empty(pos));
    }
}
