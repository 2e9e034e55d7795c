use std::fmt;

/// Where the session driver is in a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    AwaitingUserInput,
    AwaitingModelReply,
    ConfirmingCommands(Vec<String>),
    /// A command failed within the retry cap; the model is re-queried without new input.
    ErrorRecovery,
    Finished,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::AwaitingUserInput => write!(f, "awaiting_user_input"),
            SessionState::AwaitingModelReply => write!(f, "awaiting_model_reply"),
            SessionState::ConfirmingCommands(batch) => {
                write!(f, "confirming_commands({})", batch.len())
            }
            SessionState::ErrorRecovery => write!(f, "error_recovery"),
            SessionState::Finished => write!(f, "finished"),
        }
    }
}

/// Consecutive command failures within one turn, bounded by a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryCounter {
    failures: u32,
    cap: u32,
}

impl RetryCounter {
    pub fn new(cap: u32) -> Self {
        Self { failures: 0, cap }
    }

    /// Count a failure; returns `true` while another automatic re-query is allowed.
    pub fn record_failure(&mut self) -> bool {
        self.failures = self.failures.saturating_add(1);
        self.failures <= self.cap
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn attempt(&self) -> u32 {
        self.failures
    }

    pub fn cap(&self) -> u32 {
        self.cap
    }
}
