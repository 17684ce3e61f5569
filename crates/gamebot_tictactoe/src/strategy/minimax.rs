//! Hard: exhaustive minimax over the remaining game tree.
//!
//! Scores are +1 for a win by the searching mark, -1 for a loss and 0
//! for a draw, with no depth discount. Among equally scored moves the
//! lowest cell index wins, so the choice is fully deterministic.

use super::Strategy;
use crate::rules::{self, Evaluation};
use crate::{Board, DecisionError, Mark, Position, Square};
use tracing::{debug, instrument};

/// Exhaustive game-tree search.
#[derive(Debug, Clone, Copy)]
pub struct MinimaxStrategy {
    mark: Mark,
}

impl MinimaxStrategy {
    /// Creates a minimax strategy playing `mark`.
    pub fn new(mark: Mark) -> Self {
        Self { mark }
    }
}

/// Private scratch board for backtracking search.
///
/// The search places and reverts marks on its own copy, so a caller's
/// board is never observed in an intermediate state.
struct Search {
    board: Board,
    own: Mark,
    nodes: u64,
}

impl Search {
    fn score(&mut self, to_move: Mark) -> i8 {
        self.nodes += 1;
        match rules::evaluate(&self.board) {
            Evaluation::Win(mark) if mark == self.own => 1,
            Evaluation::Win(_) => -1,
            Evaluation::Draw => 0,
            Evaluation::Open => {
                let maximizing = to_move == self.own;
                let mut best = if maximizing { i8::MIN } else { i8::MAX };
                for pos in Position::ALL {
                    if !self.board.is_empty(pos) {
                        continue;
                    }
                    self.board.set(pos, Square::Occupied(to_move));
                    let score = self.score(to_move.opponent());
                    self.board.set(pos, Square::Empty);
                    best = if maximizing {
                        best.max(score)
                    } else {
                        best.min(score)
                    };
                }
                best
            }
        }
    }
}

impl Strategy for MinimaxStrategy {
    fn mark(&self) -> Mark {
        self.mark
    }

    fn name(&self) -> &str {
        "minimax"
    }

    #[instrument(skip(self, board), fields(mark = %self.mark, board = %board))]
    fn choose_move(&mut self, board: &Board) -> Result<Position, DecisionError> {
        let mut search = Search {
            board: *board,
            own: self.mark,
            nodes: 0,
        };

        let mut best: Option<(Position, i8)> = None;
        for pos in rules::empty_cells(board) {
            search.board.set(pos, Square::Occupied(self.mark));
            let score = search.score(self.mark.opponent());
            search.board.set(pos, Square::Empty);

            // Strict comparison keeps the lowest index among equal scores.
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((pos, score));
            }
        }

        let (pos, score) = best.ok_or(DecisionError::NoMovesAvailable(self.mark))?;
        debug!(position = %pos, score, nodes = search.nodes, "Minimax chose");
        Ok(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choose(board: &str, mark: Mark) -> Position {
        let board: Board = board.parse().unwrap();
        MinimaxStrategy::new(mark).choose_move(&board).unwrap()
    }

    #[test]
    fn test_opening_is_deterministic() {
        // Every opening draws under perfect play, so the lowest cell wins.
        assert_eq!(choose("_________", Mark::X), Position::TopLeft);
        assert_eq!(choose("_________", Mark::X), Position::TopLeft);
    }

    #[test]
    fn test_takes_immediate_win() {
        // Only the win at 2 scores +1; every other move lets X win.
        assert_eq!(choose("OO_XX____", Mark::O), Position::TopRight);
    }

    #[test]
    fn test_blocks_forced_loss() {
        // X threatens the middle row; 0 and 1 both lose on the spot.
        assert_eq!(choose("__O_XX___", Mark::O), Position::MiddleLeft);
    }

    #[test]
    fn test_answers_corner_opening_with_center() {
        // Any O reply other than the center loses to a corner opening.
        assert_eq!(choose("X________", Mark::O), Position::Center);
    }

    #[test]
    fn test_does_not_touch_caller_board() {
        let board: Board = "X___O____".parse().unwrap();
        let before = board;
        MinimaxStrategy::new(Mark::X).choose_move(&board).unwrap();
        assert_eq!(board, before);
    }

    #[test]
    fn test_full_board_is_an_error() {
        let board: Board = "XOXOXOOXO".parse().unwrap();
        assert_eq!(
            MinimaxStrategy::new(Mark::X).choose_move(&board),
            Err(DecisionError::NoMovesAvailable(Mark::X))
        );
    }
}
