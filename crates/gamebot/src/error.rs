//! Error types for game sessions and the presentation layer.

use crate::session::{ActorId, RequiredActor, SessionId};
use derive_more::{Display, Error};
use gamebot_tictactoe::{DecisionError, MoveError};
use tracing::instrument;

/// Why a session operation was rejected.
///
/// Every kind is local to one request; the coordinator keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum SessionError {
    /// Occupied cell or out-of-range index.
    #[display("Invalid move: {}", _0)]
    InvalidMove(MoveError),

    /// Not a participant, or not this actor's turn.
    #[display("{} cannot move now; waiting for {}", actor, required)]
    WrongActor {
        /// Who tried to move.
        actor: ActorId,
        /// Who may move.
        required: RequiredActor,
    },

    /// Unknown, expired or finished session.
    #[display("Session {} not found or already finished", _0)]
    SessionNotFound(SessionId),

    /// Game request with both or neither of opponent and difficulty.
    #[display("Malformed game mode: {}", _0)]
    MalformedMode(String),

    /// The computer player could not produce a move.
    #[display("Computer player failed: {}", _0)]
    Decision(DecisionError),
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidMove(e) => Some(e),
            SessionError::Decision(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        SessionError::InvalidMove(err)
    }
}

impl From<DecisionError> for SessionError {
    fn from(err: DecisionError) -> Self {
        SessionError::Decision(err)
    }
}

/// Presentation failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Presentation error: {} at {}:{}", message, file, line)]
pub struct PresentError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl PresentError {
    /// Creates a new presentation error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for PresentError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for PresentError {
    #[track_caller]
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("Serialization error: {}", err))
    }
}
