//! Terminal presenter used by the `play` command.

use gamebot::{PresentError, Presenter, SessionView};
use std::io::Write;

/// Prints views to stdout, as a board or as JSON lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPresenter {
    json: bool,
}

impl TerminalPresenter {
    /// Creates a presenter; `json` selects JSON-lines output.
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl Presenter for TerminalPresenter {
    fn render(&self, view: &SessionView) -> Result<(), PresentError> {
        let mut stdout = std::io::stdout().lock();

        if self.json {
            writeln!(stdout, "{}", serde_json::to_string(view)?)?;
        } else {
            if let Some(last) = view.last_move() {
                let who = if last.by_computer { "Computer" } else { "Player" };
                writeln!(stdout, "{} {} -> {}", who, last.mark, last.position)?;
            }
            writeln!(stdout, "\n{}\n\n{}", view.board().display(), view.caption())?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn disable_interaction(&self, view: &SessionView) -> Result<(), PresentError> {
        if !self.json {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "Game over ({}).", view.status())?;
        }
        Ok(())
    }
}
