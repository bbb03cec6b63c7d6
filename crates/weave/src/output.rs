//! Colored terminal output on stderr.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    red: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            red: Style::new().red(),
            dim: Style::new().dim(),
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print supporting detail for an error (dimmed, indented).
    pub(crate) fn detail(&self, msg: &str) {
        for line in msg.lines() {
            let _ = self
                .term
                .write_line(&self.dim.apply_to(format!("  {line}")).to_string());
        }
    }
}
