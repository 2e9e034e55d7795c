//! Console presentation for the session.
//!
//! The session only talks to [`Output`] and [`LineInput`]; whether the
//! terminal gets coloured panels or plain text blocks is decided once at
//! startup by [`select_output`].

mod input;
mod plain;
mod styled;

use std::io::{self, IsTerminal};

pub use input::{LineInput, StdinInput};
pub use plain::PlainOutput;
pub use styled::StyledOutput;

/// How a panel should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    /// Model commentary (reason, explanation).
    Muted,
    /// A clarifying question from the model.
    Question,
    /// Output of a successful command.
    Success,
    /// Informational output that may look alarming, such as stderr on exit 0.
    Notice,
    /// Output of a failed command.
    Failure,
    /// Unparsed model text.
    Raw,
}

pub trait Output: Send + Sync {
    fn info(&self, text: &str);

    fn success(&self, text: &str);

    fn warning(&self, text: &str);

    fn error(&self, text: &str);

    /// Titled block of text. An empty body is shown as `[No Output]`.
    fn panel(&self, title: &str, body: &str, tone: Tone);

    /// A proposed command with its 1-based position in the batch.
    fn command(&self, command: &str, step: usize, total: usize);

    /// Print a prompt without a trailing newline; the answer is read from [`LineInput`].
    fn prompt(&self, text: &str);

    fn farewell(&self, text: &str) {
        println!("{text}");
    }
}

pub(crate) const NO_OUTPUT: &str = "[No Output]";

pub(crate) fn panel_body(body: &str) -> &str {
    let trimmed = body.trim();
    if trimmed.is_empty() { NO_OUTPUT } else { trimmed }
}

/// Styled output on a terminal unless `plain` is requested.
pub fn select_output(plain: bool) -> Box<dyn Output> {
    if plain || !io::stdout().is_terminal() {
        Box::new(PlainOutput)
    } else {
        Box::new(StyledOutput)
    }
}
