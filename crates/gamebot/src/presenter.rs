//! Contract with the chat-side presentation layer.
//!
//! The coordinator hands every view it produces to a [`Presenter`].
//! Delivery is best effort: a failed render is logged and the move that
//! produced it stays applied.

use crate::error::PresentError;
use crate::session::SessionView;
use tracing::{info, instrument};

/// Renders session views and locks finished games.
pub trait Presenter: Send + Sync {
    /// Displays the board and caption for one view.
    fn render(&self, view: &SessionView) -> Result<(), PresentError>;

    /// Called once a session is terminal; further move intents for it
    /// should be refused by the presentation layer.
    fn disable_interaction(&self, view: &SessionView) -> Result<(), PresentError>;
}

/// Presenter that only writes views to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    #[instrument(skip(self, view), fields(session_id = %view.id()))]
    fn render(&self, view: &SessionView) -> Result<(), PresentError> {
        info!(
            board = %view.board(),
            status = %view.status(),
            caption = %view.caption(),
            "Session view"
        );
        Ok(())
    }

    #[instrument(skip(self, view), fields(session_id = %view.id()))]
    fn disable_interaction(&self, view: &SessionView) -> Result<(), PresentError> {
        info!(status = %view.status(), "Interaction disabled");
        Ok(())
    }
}
