//! Gamebot library - tic-tac-toe sessions for a chat bot
//!
//! # Architecture
//!
//! - **Sessions**: one game per session, two humans or a human against
//!   the computer
//! - **Coordinator**: validates who may move, applies moves, plays the
//!   computer's reply and times out idle games
//! - **Presenter**: the chat-side renderer every view is handed to
//! - **Dice**: `XdY+Z` rolls
//!
//! # Example
//!
//! ```
//! use gamebot::{GameRequest, SessionCoordinator, Status};
//! use gamebot_tictactoe::Difficulty;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), gamebot::SessionError> {
//! let coordinator = SessionCoordinator::new(Duration::from_secs(180));
//! let id = coordinator.open(GameRequest::new(
//!     "alice".to_string(),
//!     None,
//!     Some(Difficulty::Hard),
//! ))?;
//!
//! let views = coordinator.submit_move(&id, "alice", 4)?;
//! assert_eq!(*views[views.len() - 1].status(), Status::InProgress);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod coordinator;
mod dice;
mod error;
mod presenter;
mod session;

pub use config::{BotConfig, ConfigError, SESSION_TIMEOUT_ENV};
pub use coordinator::{DEFAULT_IDLE_TIMEOUT, SessionCoordinator};
pub use dice::{DiceError, DiceRoll, DiceSpec};
pub use error::{PresentError, SessionError};
pub use presenter::{Presenter, TracingPresenter};
pub use session::{
    ActorId, GameMode, GameRequest, GameSession, MoveRecord, RequiredActor, SessionId,
    SessionView, Status,
};
