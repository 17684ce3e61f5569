//! Owns every live game and serializes the moves made in each.
//!
//! Lookup goes through a map lock that is held only long enough to clone
//! a session handle. Each session then has its own mutex, held for the
//! whole of a move (including the computer's reply) or a timeout, so the
//! two are linearizable per session. Presenter calls happen after that
//! lock is released.

use crate::config::BotConfig;
use crate::error::SessionError;
use crate::presenter::{Presenter, TracingPresenter};
use crate::session::{GameMode, GameRequest, GameSession, SessionId, SessionView};
use gamebot_tictactoe::Strategy;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

/// Inactivity window used when none is configured.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(180);

/// A session plus the things only the coordinator needs.
struct SessionSlot {
    session: GameSession,
    computer: Option<Box<dyn Strategy>>,
    last_activity: Instant,
}

impl SessionSlot {
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) >= timeout
    }
}

type SharedSlot = Arc<Mutex<SessionSlot>>;

/// Poisoning only means another request panicked mid-move; the session
/// data is still a valid board, so keep serving it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Manages all game sessions.
#[derive(Clone)]
pub struct SessionCoordinator {
    sessions: Arc<Mutex<HashMap<SessionId, SharedSlot>>>,
    presenter: Arc<dyn Presenter>,
    idle_timeout: Duration,
    next_id: Arc<AtomicU64>,
    seed: Option<u64>,
}

impl std::fmt::Debug for SessionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCoordinator")
            .field("sessions", &lock(&self.sessions).len())
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}

impl SessionCoordinator {
    /// Creates a coordinator that logs views and times out idle games
    /// after `idle_timeout`.
    #[instrument]
    pub fn new(idle_timeout: Duration) -> Self {
        info!("Creating session coordinator");
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            presenter: Arc::new(TracingPresenter),
            idle_timeout,
            next_id: Arc::new(AtomicU64::new(0)),
            seed: None,
        }
    }

    /// Creates a coordinator from loaded configuration.
    #[instrument(skip(config))]
    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.session_timeout())
    }

    /// Replaces the presenter that receives every view.
    pub fn with_presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = presenter;
        self
    }

    /// Seeds the random part of every computer player created from now on.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Configured inactivity window.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Starts a game and returns its ID. X's holder moves first.
    ///
    /// Fails with [`SessionError::MalformedMode`] when one user would hold
    /// both marks.
    #[instrument(skip(self))]
    pub fn create_session(&self, mode: GameMode) -> Result<SessionId, SessionError> {
        mode.validate()?;
        let id = format!("ttt-{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        let computer = mode
            .computer_mark()
            .zip(mode.difficulty())
            .map(|(mark, difficulty)| match self.seed {
                Some(seed) => difficulty.seeded_strategy(mark, seed),
                None => difficulty.strategy(mark),
            });
        if let Some(computer) = &computer {
            debug!(strategy = computer.name(), mark = %computer.mark(), "Computer player assigned");
        }

        let session = GameSession::new(id.clone(), mode);
        let view = session.view(None);
        let slot = SessionSlot {
            session,
            computer,
            last_activity: Instant::now(),
        };
        lock(&self.sessions).insert(id.clone(), Arc::new(Mutex::new(slot)));

        info!(session_id = %id, "Created new session");
        self.publish(std::slice::from_ref(&view));
        Ok(id)
    }

    /// Validates a raw chat request and starts the game it describes.
    #[instrument(skip(self))]
    pub fn open(&self, request: GameRequest) -> Result<SessionId, SessionError> {
        let mode = GameMode::try_from(request)?;
        self.create_session(mode)
    }

    /// Plays `actor`'s mark at `index`, then the computer's reply if the
    /// computer is next.
    ///
    /// Returns one view per placed mark; the last one is the current
    /// state. On error the session is unchanged.
    #[instrument(skip(self))]
    pub fn submit_move(
        &self,
        session_id: &str,
        actor: &str,
        index: usize,
    ) -> Result<Vec<SessionView>, SessionError> {
        let slot = self.slot(session_id)?;
        let now = Instant::now();
        let mut views = Vec::new();

        let result = {
            let mut guard = lock(&slot);
            self.play_turn(&mut guard, actor, index, now, &mut views)
        };

        self.publish(&views);
        result.map(|()| views)
    }

    /// Runs under the session lock.
    fn play_turn(
        &self,
        slot: &mut SessionSlot,
        actor: &str,
        index: usize,
        now: Instant,
        views: &mut Vec<SessionView>,
    ) -> Result<(), SessionError> {
        let id = slot.session.id().clone();

        if slot.session.status().is_terminal() {
            warn!(session_id = %id, status = %slot.session.status(), "Move on finished session");
            return Err(SessionError::SessionNotFound(id));
        }

        if slot.is_idle(now, self.idle_timeout) {
            slot.session.time_out();
            views.push(slot.session.view(None));
            warn!(session_id = %id, "Move arrived after the inactivity window");
            return Err(SessionError::SessionNotFound(id));
        }

        let Some(required) = slot.session.required_actor() else {
            return Err(SessionError::SessionNotFound(id));
        };
        if !required.admits(actor) {
            warn!(session_id = %id, actor, required = %required, "Out-of-turn move rejected");
            return Err(SessionError::WrongActor {
                actor: actor.to_string(),
                required,
            });
        }

        views.push(slot.session.place(index, false)?);
        slot.last_activity = now;

        loop {
            let SessionSlot {
                session, computer, ..
            } = &mut *slot;
            let Some(computer) = computer
                .as_mut()
                .filter(|c| session.awaits_computer() && c.mark() == *session.turn())
            else {
                break;
            };

            let pos = computer.choose_move(session.board())?;
            info!(session_id = %id, strategy = computer.name(), position = %pos, "Computer moved");
            views.push(session.place(pos.to_index(), true)?);
        }

        Ok(())
    }

    /// Current snapshot of a session, including finished ones.
    #[instrument(skip(self))]
    pub fn view(&self, session_id: &str) -> Result<SessionView, SessionError> {
        let slot = self.slot(session_id)?;
        let guard = lock(&slot);
        Ok(guard.session.view(None))
    }

    /// Full copy of a session's state.
    #[instrument(skip(self))]
    pub fn session(&self, session_id: &str) -> Result<GameSession, SessionError> {
        let slot = self.slot(session_id)?;
        let guard = lock(&slot);
        Ok(guard.session.clone())
    }

    /// Forces a session into `TimedOut`. Finished sessions are left as
    /// they are, so calling this twice is harmless.
    #[instrument(skip(self))]
    pub fn time_out(&self, session_id: &str) -> Result<SessionView, SessionError> {
        let slot = self.slot(session_id)?;
        let (changed, view) = {
            let mut guard = lock(&slot);
            let changed = guard.session.time_out();
            (changed, guard.session.view(None))
        };

        if changed {
            self.publish(std::slice::from_ref(&view));
        }
        Ok(view)
    }

    /// Times out every session idle for longer than the window.
    pub fn reap_expired(&self) -> Vec<SessionView> {
        self.reap_expired_at(Instant::now())
    }

    /// Times out every session idle as of `now`.
    #[instrument(skip(self, now))]
    pub fn reap_expired_at(&self, now: Instant) -> Vec<SessionView> {
        let slots: Vec<SharedSlot> = lock(&self.sessions).values().cloned().collect();

        let mut expired = Vec::new();
        for slot in slots {
            let mut guard = lock(&slot);
            if guard.is_idle(now, self.idle_timeout) && guard.session.time_out() {
                expired.push(guard.session.view(None));
            }
        }

        for view in &expired {
            self.publish(std::slice::from_ref(view));
        }
        if !expired.is_empty() {
            info!(count = expired.len(), "Reaped idle sessions");
        }
        expired
    }

    /// Runs [`SessionCoordinator::reap_expired`] every `interval` on the
    /// tokio runtime until the handle is aborted.
    #[instrument(skip(self))]
    pub fn spawn_reaper(&self, interval: Duration) -> JoinHandle<()> {
        let coordinator = self.clone();
        info!("Starting idle session reaper");
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                coordinator.reap_expired();
            }
        })
    }

    /// Drops finished sessions, returning how many were removed.
    #[instrument(skip(self))]
    pub fn purge_finished(&self) -> usize {
        let mut sessions = lock(&self.sessions);
        let before = sessions.len();
        sessions.retain(|_, slot| !lock(slot).session.status().is_terminal());
        let removed = before - sessions.len();
        info!(removed, "Purged finished sessions");
        removed
    }

    /// Lists all session IDs, finished ones included.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<SessionId> {
        let sessions = lock(&self.sessions);
        let mut ids: Vec<_> = sessions.keys().cloned().collect();
        ids.sort();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }

    fn slot(&self, session_id: &str) -> Result<SharedSlot, SessionError> {
        lock(&self.sessions).get(session_id).cloned().ok_or_else(|| {
            debug!(session_id, "Session not found");
            SessionError::SessionNotFound(session_id.to_string())
        })
    }

    /// Hands views to the presenter. Failures are logged, never undone.
    fn publish(&self, views: &[SessionView]) {
        for view in views {
            if let Err(e) = self.presenter.render(view) {
                warn!(session_id = %view.id(), error = %e, "Render failed; board change stands");
            }
        }

        if let Some(last) = views.last()
            && last.status().is_terminal()
            && let Err(e) = self.presenter.disable_interaction(last)
        {
            warn!(session_id = %last.id(), error = %e, "Failed to disable interaction");
        }
    }
}
