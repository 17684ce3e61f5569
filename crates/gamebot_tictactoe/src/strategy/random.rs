//! Easy: any empty cell, uniformly.

use super::Strategy;
use crate::{Board, DecisionError, Mark, Position, rules};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, instrument};

/// Picks uniformly among the empty cells.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    mark: Mark,
    rng: StdRng,
}

impl RandomStrategy {
    /// Creates a random strategy seeded from the OS.
    pub fn new(mark: Mark) -> Self {
        Self {
            mark,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a reproducible random strategy.
    pub fn with_seed(mark: Mark, seed: u64) -> Self {
        Self {
            mark,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Strategy for RandomStrategy {
    fn mark(&self) -> Mark {
        self.mark
    }

    fn name(&self) -> &str {
        "random"
    }

    #[instrument(skip(self, board), fields(mark = %self.mark, board = %board))]
    fn choose_move(&mut self, board: &Board) -> Result<Position, DecisionError> {
        let choice = rules::empty_cells(board)
            .choose(&mut self.rng)
            .copied()
            .ok_or(DecisionError::NoMovesAvailable(self.mark))?;
        debug!(position = %choice, "Random strategy chose");
        Ok(choice)
    }
}
