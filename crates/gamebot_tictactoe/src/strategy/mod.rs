//! Computer players.
//!
//! Each strategy is bound to the mark it plays and picks a cell from a
//! board it may only read. Difficulty picks the strategy once, when the
//! computer joins a game.

mod heuristic;
mod minimax;
mod random;

pub use heuristic::HeuristicStrategy;
pub use minimax::MinimaxStrategy;
pub use random::RandomStrategy;

use super::{Board, DecisionError, Mark, Position};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A decision rule for a computer-controlled player.
pub trait Strategy: Send {
    /// The mark this strategy plays.
    fn mark(&self) -> Mark;

    /// Display name for logs.
    fn name(&self) -> &str;

    /// Chooses an empty cell on a non-terminal board.
    fn choose_move(&mut self, board: &Board) -> Result<Position, DecisionError>;
}

/// Computer opponent strength.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Uniformly random moves.
    #[default]
    Easy,
    /// Wins when it can, blocks when it must, otherwise random.
    Medium,
    /// Full game-tree search; never loses.
    Hard,
}

impl Difficulty {
    /// Builds the strategy for this difficulty playing `mark`.
    #[instrument]
    pub fn strategy(self, mark: Mark) -> Box<dyn Strategy> {
        match self {
            Difficulty::Easy => Box::new(RandomStrategy::new(mark)),
            Difficulty::Medium => Box::new(HeuristicStrategy::new(mark)),
            Difficulty::Hard => Box::new(MinimaxStrategy::new(mark)),
        }
    }

    /// Like [`Difficulty::strategy`] but with a fixed random seed.
    #[instrument]
    pub fn seeded_strategy(self, mark: Mark, seed: u64) -> Box<dyn Strategy> {
        match self {
            Difficulty::Easy => Box::new(RandomStrategy::with_seed(mark, seed)),
            Difficulty::Medium => Box::new(HeuristicStrategy::with_seed(mark, seed)),
            Difficulty::Hard => Box::new(MinimaxStrategy::new(mark)),
        }
    }
}
