//! Tests for session lifecycle through the coordinator.

use gamebot::{
    GameMode, GameRequest, PresentError, Presenter, SessionCoordinator, SessionError,
    SessionView, Status,
};
use gamebot_tictactoe::{Board, Difficulty, Evaluation, Mark, MoveError, Position, evaluate};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Presenter that remembers everything it was shown.
#[derive(Debug, Default)]
struct RecordingPresenter {
    rendered: Mutex<Vec<SessionView>>,
    disabled: Mutex<Vec<SessionView>>,
    fail: bool,
}

impl RecordingPresenter {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn rendered(&self) -> Vec<SessionView> {
        self.rendered.lock().unwrap().clone()
    }

    fn disabled(&self) -> Vec<SessionView> {
        self.disabled.lock().unwrap().clone()
    }
}

impl Presenter for RecordingPresenter {
    fn render(&self, view: &SessionView) -> Result<(), PresentError> {
        self.rendered.lock().unwrap().push(view.clone());
        if self.fail {
            return Err(PresentError::new("channel unavailable"));
        }
        Ok(())
    }

    fn disable_interaction(&self, view: &SessionView) -> Result<(), PresentError> {
        self.disabled.lock().unwrap().push(view.clone());
        if self.fail {
            return Err(PresentError::new("channel unavailable"));
        }
        Ok(())
    }
}

fn coordinator() -> (SessionCoordinator, Arc<RecordingPresenter>) {
    let presenter = Arc::new(RecordingPresenter::default());
    let coordinator = SessionCoordinator::new(Duration::from_secs(180))
        .with_presenter(presenter.clone())
        .with_seed(17);
    (coordinator, presenter)
}

fn pvp(coordinator: &SessionCoordinator) -> String {
    coordinator.create_session(GameMode::PvP {
        x: "alice".to_string(),
        o: "bob".to_string(),
    })
    .unwrap()
}

fn pve(coordinator: &SessionCoordinator, difficulty: Difficulty) -> String {
    coordinator.create_session(GameMode::PvE {
        human: "u1".to_string(),
        difficulty,
    })
    .unwrap()
}

#[test]
fn test_stranger_cannot_move_in_computer_game() {
    let (coordinator, _) = coordinator();
    let id = coordinator
        .open(GameRequest::new(
            "u1".to_string(),
            None,
            Some(Difficulty::Easy),
        ))
        .unwrap();

    let result = coordinator.submit_move(&id, "u2", 0);
    assert!(matches!(result, Err(SessionError::WrongActor { .. })));
    assert_eq!(*coordinator.session(&id).unwrap().board(), Board::new());
}

#[test]
fn test_malformed_request_creates_nothing() {
    let (coordinator, _) = coordinator();
    let result = coordinator.open(GameRequest::new(
        "u1".to_string(),
        Some("u2".to_string()),
        Some(Difficulty::Hard),
    ));
    assert!(matches!(result, Err(SessionError::MalformedMode(_))));
    assert!(coordinator.list_sessions().is_empty());
}

#[test]
fn test_one_player_cannot_hold_both_marks() {
    let (coordinator, presenter) = coordinator();
    let result = coordinator.create_session(GameMode::PvP {
        x: "a".to_string(),
        o: "a".to_string(),
    });
    assert!(matches!(result, Err(SessionError::MalformedMode(_))));
    assert!(coordinator.list_sessions().is_empty());
    assert!(presenter.rendered().is_empty());
}

#[test]
fn test_pvp_turns_enforced() {
    let (coordinator, _) = coordinator();
    let id = pvp(&coordinator);

    // O cannot open, and X cannot move twice.
    assert!(matches!(
        coordinator.submit_move(&id, "bob", 4),
        Err(SessionError::WrongActor { .. })
    ));
    coordinator.submit_move(&id, "alice", 4).unwrap();
    assert!(matches!(
        coordinator.submit_move(&id, "alice", 0),
        Err(SessionError::WrongActor { .. })
    ));

    let views = coordinator.submit_move(&id, "bob", 0).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(*views[0].turn(), Mark::X);
}

#[test]
fn test_invalid_moves_leave_session_unchanged() {
    let (coordinator, _) = coordinator();
    let id = pvp(&coordinator);
    coordinator.submit_move(&id, "alice", 4).unwrap();
    let before = coordinator.session(&id).unwrap();

    assert_eq!(
        coordinator.submit_move(&id, "bob", 4),
        Err(SessionError::InvalidMove(MoveError::SquareOccupied(
            Position::Center
        )))
    );
    assert_eq!(
        coordinator.submit_move(&id, "bob", 9),
        Err(SessionError::InvalidMove(MoveError::OutOfBounds(9)))
    );
    assert_eq!(coordinator.session(&id).unwrap(), before);
}

#[test]
fn test_win_locks_session_and_notifies_once() {
    let (coordinator, presenter) = coordinator();
    let id = pvp(&coordinator);

    for (actor, index) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4)] {
        coordinator.submit_move(&id, actor, index).unwrap();
    }
    let views = coordinator.submit_move(&id, "alice", 2).unwrap();
    assert_eq!(*views[0].status(), Status::WonBy(Mark::X));
    assert_eq!(views[0].caption(), "Player X wins!");

    let final_board = *coordinator.session(&id).unwrap().board();
    for _ in 0..3 {
        assert!(matches!(
            coordinator.submit_move(&id, "bob", 5),
            Err(SessionError::SessionNotFound(_))
        ));
    }
    assert_eq!(*coordinator.session(&id).unwrap().board(), final_board);

    // Creation view plus one per move.
    assert_eq!(presenter.rendered().len(), 6);
    assert_eq!(presenter.disabled().len(), 1);
}

#[test]
fn test_hard_computer_never_loses_to_scripted_human() {
    // The human always takes the lowest free cell.
    let (coordinator, presenter) = coordinator();
    let id = pve(&coordinator, Difficulty::Hard);

    loop {
        let session = coordinator.session(&id).unwrap();
        if session.status().is_terminal() {
            break;
        }
        let cell = gamebot_tictactoe::empty_cells(session.board())[0];
        let views = coordinator.submit_move(&id, "u1", cell.to_index()).unwrap();
        assert!(!views.is_empty() && views.len() <= 2);
    }

    let session = coordinator.session(&id).unwrap();
    assert_ne!(*session.status(), Status::WonBy(Mark::X));
    assert_ne!(evaluate(session.board()), Evaluation::Open);
    assert_eq!(presenter.disabled().len(), 1);
}

#[test]
fn test_computer_win_caption() {
    let (coordinator, _) = coordinator();
    let id = pve(&coordinator, Difficulty::Hard);

    // Corners and edges that hand O the center column.
    let mut last = None;
    for index in [0, 2, 6, 8, 1, 3, 5, 7] {
        match coordinator.submit_move(&id, "u1", index) {
            Ok(views) => last = views.last().cloned(),
            Err(SessionError::InvalidMove(_)) => continue,
            Err(SessionError::SessionNotFound(_)) => break,
            Err(e) => panic!("unexpected error: {e}"),
        }
        if last.as_ref().is_some_and(|v| v.status().is_terminal()) {
            break;
        }
    }

    let last = last.unwrap();
    match last.status() {
        Status::WonBy(Mark::O) => assert_eq!(last.caption(), "The computer wins!"),
        Status::Draw => assert_eq!(last.caption(), "It's a draw!"),
        other => panic!("computer should not lose, got {other}"),
    }
}

#[test]
fn test_failed_rendering_does_not_roll_back() {
    let presenter = Arc::new(RecordingPresenter::failing());
    let coordinator =
        SessionCoordinator::new(Duration::from_secs(180)).with_presenter(presenter.clone());
    let id = pvp(&coordinator);

    let views = coordinator.submit_move(&id, "alice", 4).unwrap();
    assert_eq!(views.len(), 1);
    assert!(!coordinator.session(&id).unwrap().board().is_empty(Position::Center));
    assert_eq!(presenter.rendered().len(), 2);
}

#[test]
fn test_timeout_is_idempotent_and_final() {
    let (coordinator, presenter) = coordinator();
    let id = pvp(&coordinator);
    coordinator.submit_move(&id, "alice", 4).unwrap();

    let first = coordinator.time_out(&id).unwrap();
    let second = coordinator.time_out(&id).unwrap();
    assert_eq!(*first.status(), Status::TimedOut);
    assert_eq!(first, second);
    assert_eq!(presenter.disabled().len(), 1);

    assert!(matches!(
        coordinator.submit_move(&id, "bob", 0),
        Err(SessionError::SessionNotFound(_))
    ));
    // Retained for display until purged.
    assert_eq!(*coordinator.view(&id).unwrap().status(), Status::TimedOut);
}

#[test]
fn test_timeout_does_not_override_finished_game() {
    let (coordinator, _) = coordinator();
    let id = pvp(&coordinator);
    for (actor, index) in [("alice", 0), ("bob", 3), ("alice", 1), ("bob", 4), ("alice", 2)] {
        coordinator.submit_move(&id, actor, index).unwrap();
    }

    let view = coordinator.time_out(&id).unwrap();
    assert_eq!(*view.status(), Status::WonBy(Mark::X));
    assert!(coordinator.reap_expired_at(Instant::now() + Duration::from_secs(600)).is_empty());
}

#[test]
fn test_late_move_times_out_session() {
    let presenter = Arc::new(RecordingPresenter::default());
    let coordinator =
        SessionCoordinator::new(Duration::from_millis(20)).with_presenter(presenter.clone());
    let id = pvp(&coordinator);

    std::thread::sleep(Duration::from_millis(60));
    assert!(matches!(
        coordinator.submit_move(&id, "alice", 4),
        Err(SessionError::SessionNotFound(_))
    ));
    let session = coordinator.session(&id).unwrap();
    assert_eq!(*session.status(), Status::TimedOut);
    assert_eq!(*session.board(), Board::new());
    assert_eq!(presenter.disabled().len(), 1);
}

#[test]
fn test_unknown_session() {
    let (coordinator, _) = coordinator();
    assert!(matches!(
        coordinator.submit_move("nope", "alice", 0),
        Err(SessionError::SessionNotFound(_))
    ));
    assert!(matches!(
        coordinator.time_out("nope"),
        Err(SessionError::SessionNotFound(_))
    ));
}

#[test]
fn test_concurrent_moves_are_serialized() {
    for _ in 0..50 {
        let (coordinator, _) = coordinator();
        let id = pvp(&coordinator);

        // Both try to claim X's first move on different cells.
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = [0usize, 8]
                .into_iter()
                .map(|index| {
                    let coordinator = coordinator.clone();
                    let id = id.clone();
                    scope.spawn(move || coordinator.submit_move(&id, "alice", index))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1);
        assert!(
            results
                .iter()
                .any(|r| matches!(r, Err(SessionError::WrongActor { .. })))
        );

        let session = coordinator.session(&id).unwrap();
        assert_eq!(*session.moves(), 1);
        assert_eq!(session.board().marks_placed(), 1);
        assert_eq!(*session.turn(), Mark::O);
    }
}

#[test]
fn test_timeout_races_cleanly_with_move() {
    for _ in 0..50 {
        let (coordinator, _) = coordinator();
        let id = pvp(&coordinator);

        let (moved, timed_out) = std::thread::scope(|scope| {
            let mover = {
                let coordinator = coordinator.clone();
                let id = id.clone();
                scope.spawn(move || coordinator.submit_move(&id, "alice", 4))
            };
            let reaper = {
                let coordinator = coordinator.clone();
                let id = id.clone();
                scope.spawn(move || coordinator.time_out(&id))
            };
            (mover.join().unwrap(), reaper.join().unwrap().unwrap())
        });

        assert_eq!(*timed_out.status(), Status::TimedOut);
        let session = coordinator.session(&id).unwrap();
        assert_eq!(*session.status(), Status::TimedOut);
        match moved {
            // Move won the race: it is on the board, and the timeout saw it.
            Ok(_) => {
                assert_eq!(session.board().marks_placed(), 1);
                assert_eq!(timed_out.board().marks_placed(), 1);
            }
            // Timeout won: the board was never touched.
            Err(SessionError::SessionNotFound(_)) => {
                assert_eq!(*session.board(), Board::new());
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}

#[tokio::test]
async fn test_reaper_times_out_idle_sessions() {
    let presenter = Arc::new(RecordingPresenter::default());
    let coordinator =
        SessionCoordinator::new(Duration::from_millis(30)).with_presenter(presenter.clone());
    let id = pvp(&coordinator);

    let reaper = coordinator.spawn_reaper(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(200)).await;
    reaper.abort();

    assert_eq!(*coordinator.view(&id).unwrap().status(), Status::TimedOut);
    assert_eq!(presenter.disabled().len(), 1);
    assert_eq!(coordinator.purge_finished(), 1);
}
