//! Game session state: who plays, whose turn it is, and how it ended.

use crate::error::SessionError;
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::Display;
use gamebot_tictactoe::{Board, Difficulty, Evaluation, Mark, MoveError, Position, rules};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Opaque platform identity of a user.
pub type ActorId = String;

/// How the two marks are assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GameMode {
    /// Two humans; each mark has its own player.
    PvP {
        /// Player holding X.
        x: ActorId,
        /// Player holding O.
        o: ActorId,
    },
    /// One human against the computer. The human always holds X.
    PvE {
        /// The human player.
        human: ActorId,
        /// Strength of the computer player.
        difficulty: Difficulty,
    },
}

impl GameMode {
    /// Mark held by the human in a game against the computer.
    pub const HUMAN_MARK: Mark = Mark::X;

    /// Player assigned to `mark`, or `None` when the computer holds it.
    pub fn player_for(&self, mark: Mark) -> Option<&ActorId> {
        match (self, mark) {
            (GameMode::PvP { x, .. }, Mark::X) => Some(x),
            (GameMode::PvP { o, .. }, Mark::O) => Some(o),
            (GameMode::PvE { human, .. }, mark) if mark == Self::HUMAN_MARK => Some(human),
            (GameMode::PvE { .. }, _) => None,
        }
    }

    /// Mark played by the computer, if any.
    pub fn computer_mark(&self) -> Option<Mark> {
        match self {
            GameMode::PvP { .. } => None,
            GameMode::PvE { .. } => Some(Self::HUMAN_MARK.opponent()),
        }
    }

    /// Computer difficulty, if any.
    pub fn difficulty(&self) -> Option<Difficulty> {
        match self {
            GameMode::PvP { .. } => None,
            GameMode::PvE { difficulty, .. } => Some(*difficulty),
        }
    }

    /// Rejects a two-player game where one user holds both marks.
    #[instrument]
    pub fn validate(&self) -> Result<(), SessionError> {
        match self {
            GameMode::PvP { x, o } if x == o => {
                warn!(player = %x, "Same player assigned to both marks");
                Err(SessionError::MalformedMode(
                    "a player cannot challenge themselves".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}

/// Raw request to start a game, as it arrives from a chat command.
///
/// Exactly one of `opponent` and `difficulty` must be set; conversion
/// into [`GameMode`] is where malformed combinations are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct GameRequest {
    /// User who issued the command; always plays X.
    pub challenger: ActorId,
    /// Human opponent for a two-player game.
    pub opponent: Option<ActorId>,
    /// Computer strength for a game against the bot.
    pub difficulty: Option<Difficulty>,
}

impl TryFrom<GameRequest> for GameMode {
    type Error = SessionError;

    #[instrument(fields(challenger = %request.challenger))]
    fn try_from(request: GameRequest) -> Result<Self, Self::Error> {
        let mode = match (request.opponent, request.difficulty) {
            (Some(opponent), None) => GameMode::PvP {
                x: request.challenger,
                o: opponent,
            },
            (None, Some(difficulty)) => GameMode::PvE {
                human: request.challenger,
                difficulty,
            },
            (Some(_), Some(_)) => {
                warn!("Both an opponent and a difficulty were given");
                return Err(SessionError::MalformedMode(
                    "choose either an opponent or a difficulty, not both".to_string(),
                ));
            }
            (None, None) => {
                warn!("Neither an opponent nor a difficulty was given");
                return Err(SessionError::MalformedMode(
                    "an opponent or a difficulty is required".to_string(),
                ));
            }
        };
        mode.validate()?;
        Ok(mode)
    }
}

/// Current status of a session.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Moves are still accepted.
    #[display("in progress")]
    InProgress,
    /// A mark completed a line.
    #[display("{} wins", _0)]
    WonBy(Mark),
    /// Board filled without a winner.
    #[display("draw")]
    Draw,
    /// Nobody moved within the inactivity window.
    #[display("timed out")]
    TimedOut,
}

impl Status {
    /// Terminal statuses accept no further moves.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// Who must act for the current turn.
///
/// `user` is `None` when the computer holds the mark to move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct RequiredActor {
    /// Mark to be placed.
    pub mark: Mark,
    /// Player allowed to place it.
    pub user: Option<ActorId>,
}

impl RequiredActor {
    /// Whether `actor` may move now.
    pub fn admits(&self, actor: &str) -> bool {
        self.user.as_deref() == Some(actor)
    }
}

impl std::fmt::Display for RequiredActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{} ({})", user, self.mark),
            None => write!(f, "the computer ({})", self.mark),
        }
    }
}

/// One placed mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Mark placed.
    pub mark: Mark,
    /// Where it went.
    pub position: Position,
    /// Placed by the computer rather than a human.
    pub by_computer: bool,
}

/// Snapshot of a session handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SessionView {
    /// Session ID.
    id: SessionId,
    /// Board after the move (or at the time of the snapshot).
    board: Board,
    /// Mark to move next; meaningless once terminal.
    turn: Mark,
    /// Session status.
    status: Status,
    /// Move that produced this view, if any.
    last_move: Option<MoveRecord>,
    /// Who must move next; `None` once terminal.
    required: Option<RequiredActor>,
}

impl SessionView {
    /// One-line caption for chat output.
    pub fn caption(&self) -> String {
        match (&self.status, &self.required) {
            (Status::InProgress, Some(required)) => format!("It's {}'s turn.", required),
            (Status::InProgress, None) => "Waiting.".to_string(),
            (Status::WonBy(mark), _) => {
                let by_computer = self.last_move.is_some_and(|m| m.by_computer);
                if by_computer {
                    "The computer wins!".to_string()
                } else {
                    format!("Player {} wins!", mark)
                }
            }
            (Status::Draw, _) => "It's a draw!".to_string(),
            (Status::TimedOut, _) => "Game ended due to timeout.".to_string(),
        }
    }
}

/// One game: board, players, turn and outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct GameSession {
    /// Session ID.
    id: SessionId,
    /// The board.
    board: Board,
    /// Player assignment.
    mode: GameMode,
    /// Mark to move next.
    turn: Mark,
    /// Session status.
    status: Status,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// Number of marks placed.
    moves: usize,
}

impl GameSession {
    /// Creates a new session with X to move.
    #[instrument(skip(mode))]
    pub fn new(id: SessionId, mode: GameMode) -> Self {
        info!(session_id = %id, ?mode, "Creating new game session");
        Self {
            id,
            board: Board::new(),
            mode,
            turn: Mark::X,
            status: Status::InProgress,
            created_at: Utc::now(),
            moves: 0,
        }
    }

    /// Who must act for the current turn; `None` once terminal.
    pub fn required_actor(&self) -> Option<RequiredActor> {
        if self.status.is_terminal() {
            return None;
        }
        Some(RequiredActor::new(
            self.turn,
            self.mode.player_for(self.turn).cloned(),
        ))
    }

    /// True when the computer holds the mark to move.
    pub fn awaits_computer(&self) -> bool {
        !self.status.is_terminal() && self.mode.computer_mark() == Some(self.turn)
    }

    /// Places the current mark at `index`, evaluates the board and either
    /// ends the game or passes the turn.
    #[instrument(skip(self), fields(session_id = %self.id, turn = %self.turn))]
    pub fn place(&mut self, index: usize, by_computer: bool) -> Result<SessionView, MoveError> {
        if self.status.is_terminal() {
            warn!(status = %self.status, "Move attempted on finished session");
            return Err(MoveError::GameOver);
        }

        let mark = self.turn;
        let position = Position::from_index(index).ok_or(MoveError::OutOfBounds(index))?;
        self.board = rules::apply_move(&self.board, index, mark)?;
        self.moves += 1;

        match rules::evaluate(&self.board) {
            Evaluation::Win(winner) => {
                info!(winner = %winner, "Game won");
                self.status = Status::WonBy(winner);
            }
            Evaluation::Draw => {
                info!("Game drawn");
                self.status = Status::Draw;
            }
            Evaluation::Open => {
                self.turn = mark.opponent();
                debug!(next = %self.turn, "Turn passed");
            }
        }

        Ok(self.view(Some(MoveRecord {
            mark,
            position,
            by_computer,
        })))
    }

    /// Ends the session by inactivity. No-op when already terminal.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn time_out(&mut self) -> bool {
        if self.status.is_terminal() {
            debug!(status = %self.status, "Timeout ignored for finished session");
            return false;
        }
        info!("Session timed out");
        self.status = Status::TimedOut;
        true
    }

    /// Snapshot for the presentation layer.
    pub fn view(&self, last_move: Option<MoveRecord>) -> SessionView {
        SessionView {
            id: self.id.clone(),
            board: self.board,
            turn: self.turn,
            status: self.status,
            last_move,
            required: self.required_actor(),
        }
    }
}
