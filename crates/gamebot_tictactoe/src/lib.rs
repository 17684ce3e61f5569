//! Tic-tac-toe rules and computer opponents.
//!
//! # Architecture
//!
//! - **Board**: `Board`, `Square`, `Mark` and named `Position`s
//! - **Rules**: pure functions (`apply_move`, `evaluate`, `empty_cells`)
//! - **Strategies**: `Random`, `Heuristic` and `Minimax` computer players,
//!   selected by `Difficulty`
//!
//! # Example
//!
//! ```
//! use gamebot_tictactoe::{Board, Difficulty, Evaluation, Mark, apply_move, evaluate};
//!
//! let board = apply_move(&Board::new(), 4, Mark::X)?;
//! assert_eq!(evaluate(&board), Evaluation::Open);
//!
//! let mut computer = Difficulty::Hard.strategy(Mark::O);
//! let reply = computer.choose_move(&board)?;
//! assert!(board.is_empty(reply));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod position;
pub mod rules;
mod strategy;
mod types;

pub use error::{DecisionError, MoveError};
pub use position::Position;
pub use rules::{Evaluation, apply_move, empty_cells, evaluate};
pub use strategy::{
    Difficulty, HeuristicStrategy, MinimaxStrategy, RandomStrategy, Strategy,
};
pub use types::{Board, BoardParseError, Mark, Square};
