//! The conversation loop: read a request, query the model, confirm and run
//! the proposed commands, and feed the results back.
//!
//! A failed command re-queries the model without new user input so it can
//! propose a fix, up to `max_error_retry` times per turn. A failed model call
//! drops the unanswered request from the transcript; execution feedback that
//! is already recorded stays, since those commands did run.

mod conversation;
mod feedback;
mod state;

use anyhow::Result;
use tracing::{debug, warn};

use crate::client::ChatBackend;
use crate::config::SessionSettings;
use crate::exec::{CommandRunner, ExecutionRecord};
use crate::interpreter::{InterpretError, ModelReply, interpret};
use crate::ui::{LineInput, Output, Tone};

pub use conversation::Conversation;
pub use state::{RetryCounter, SessionState};

const USER_PROMPT: &str = "\nYou: ";

pub struct Session<'a> {
    backend: &'a dyn ChatBackend,
    runner: &'a dyn CommandRunner,
    out: &'a dyn Output,
    input: &'a mut dyn LineInput,
    conversation: Conversation,
    retry: RetryCounter,
    /// Transcript length before the user message still waiting for an answer.
    pending_turn: Option<usize>,
}

impl<'a> Session<'a> {
    pub fn new(
        settings: &SessionSettings,
        system_prompt: String,
        backend: &'a dyn ChatBackend,
        runner: &'a dyn CommandRunner,
        out: &'a dyn Output,
        input: &'a mut dyn LineInput,
    ) -> Self {
        Self {
            backend,
            runner,
            out,
            input,
            conversation: Conversation::new(system_prompt),
            retry: RetryCounter::new(settings.max_error_retry),
            pending_turn: None,
        }
    }

    #[cfg(test)]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Run until the user quits or input ends. `initial` is answered before
    /// the first prompt.
    pub async fn run(&mut self, initial: Option<String>) -> Result<()> {
        let mut state = match initial {
            Some(request) if !request.trim().is_empty() => {
                self.begin_turn(request.trim());
                SessionState::AwaitingModelReply
            }
            _ => SessionState::AwaitingUserInput,
        };

        while state != SessionState::Finished {
            debug!(%state, "session step");
            state = self.step(state).await?;
        }

        Ok(())
    }

    async fn step(&mut self, state: SessionState) -> Result<SessionState> {
        match state {
            SessionState::AwaitingUserInput => self.await_user_input().await,
            SessionState::AwaitingModelReply => Ok(self.await_model_reply().await),
            SessionState::ConfirmingCommands(batch) => self.confirm_commands(batch).await,
            SessionState::ErrorRecovery => {
                self.out.info(&format!(
                    "Asking the model for advice on the previous error (Attempt {}/{})...",
                    self.retry.attempt(),
                    self.retry.cap()
                ));
                Ok(SessionState::AwaitingModelReply)
            }
            SessionState::Finished => Ok(SessionState::Finished),
        }
    }

    async fn await_user_input(&mut self) -> Result<SessionState> {
        self.out.prompt(USER_PROMPT);
        let Some(line) = self.input.read_line().await? else {
            self.out.farewell("\nGoodbye!");
            return Ok(SessionState::Finished);
        };

        let request = line.trim();
        if request.is_empty() {
            return Ok(SessionState::AwaitingUserInput);
        }

        if request.eq_ignore_ascii_case("exit") || request.eq_ignore_ascii_case("quit") {
            self.out.farewell("Goodbye!");
            return Ok(SessionState::Finished);
        }

        self.begin_turn(request);
        Ok(SessionState::AwaitingModelReply)
    }

    fn begin_turn(&mut self, request: &str) {
        self.pending_turn = Some(self.conversation.len());
        self.conversation.push_user(request);
    }

    async fn await_model_reply(&mut self) -> SessionState {
        let raw = match self.backend.chat(self.conversation.messages()).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "model call failed");
                self.out.error(&err.to_string());
                if let Some(hint) = err.hint() {
                    self.out.info(hint);
                }
                if let Some(len) = self.pending_turn.take() {
                    self.conversation.rollback_to(len);
                }
                self.retry.reset();
                return SessionState::AwaitingUserInput;
            }
        };
        self.pending_turn = None;

        match interpret(&raw) {
            Ok(reply) => {
                self.conversation.push_assistant(raw);
                self.present_reply(reply)
            }
            Err(err) => {
                warn!(error = %err, "model reply did not match the expected JSON");
                self.out
                    .warning("Ollama response was not in the expected JSON format.");
                self.out.error(&format!("Details: {err}"));
                // Syntax errors already quote the raw text.
                if !raw.trim().is_empty() && !matches!(err, InterpretError::Syntax { .. }) {
                    self.out.panel("Raw Ollama Response", &raw, Tone::Raw);
                }
                self.conversation.push_assistant(raw);
                self.retry.reset();
                SessionState::AwaitingUserInput
            }
        }
    }

    fn present_reply(&mut self, reply: ModelReply) -> SessionState {
        if !reply.reason.is_empty() {
            self.out.panel("Reason", &reply.reason, Tone::Muted);
        }
        if !reply.explanation.is_empty() {
            self.out.panel("Explanation", &reply.explanation, Tone::Muted);
        }

        if !reply.question.is_empty() {
            self.out
                .panel("Question from Assistant", &reply.question, Tone::Question);
            self.retry.reset();
            return SessionState::AwaitingUserInput;
        }

        if reply.commands.is_empty() {
            self.out.info("Ollama suggests no commands for this request.");
            self.conversation.push_user(feedback::NO_COMMANDS);
            self.retry.reset();
            return SessionState::AwaitingUserInput;
        }

        SessionState::ConfirmingCommands(reply.commands)
    }

    async fn confirm_commands(&mut self, batch: Vec<String>) -> Result<SessionState> {
        let total = batch.len();

        for (idx, command) in batch.iter().enumerate() {
            let step = idx + 1;
            self.out.command(command, step, total);
            self.out
                .prompt(&format!("Execute command {step}/{total}? [Enter=Yes, N=No]: "));

            let Some(answer) = self.input.read_line().await? else {
                self.out.farewell("\nOperation cancelled. Goodbye!");
                return Ok(SessionState::Finished);
            };

            if !answer.trim().is_empty() {
                self.out
                    .warning(&format!("Command {step}/{total} skipped by user."));
                self.conversation
                    .push_user(feedback::skipped(step, total, command));
                self.retry.reset();
                continue;
            }

            self.out.info(&format!("Executing: '{command}'"));
            let record = self.runner.run(command).await;
            self.render_execution(&record, step, total);
            self.conversation
                .push_user(feedback::executed(&record, step, total));

            if record.succeeded() {
                self.retry.reset();
                continue;
            }

            // Remaining commands in the batch are abandoned.
            return Ok(self.after_failure());
        }

        Ok(SessionState::AwaitingUserInput)
    }

    fn after_failure(&mut self) -> SessionState {
        if self.retry.record_failure() {
            return SessionState::ErrorRecovery;
        }

        self.out.error(&format!(
            "Max error retry limit ({}) reached. Please try a different approach.",
            self.retry.cap()
        ));
        self.retry.reset();
        SessionState::AwaitingUserInput
    }

    fn render_execution(&self, record: &ExecutionRecord, step: usize, total: usize) {
        let has_stdout = !record.stdout.trim().is_empty();
        let has_stderr = !record.stderr.trim().is_empty();

        if record.succeeded() {
            self.out.success(&format!(
                "Command {step}/{total} finished successfully (Exit Code 0)."
            ));
            if has_stdout {
                self.out
                    .panel(&format!("Stdout (Cmd {step})"), &record.stdout, Tone::Success);
            }
            // Plenty of tools write progress to stderr, so it is not an error here.
            if has_stderr {
                self.out
                    .panel(&format!("Stderr (Cmd {step})"), &record.stderr, Tone::Notice);
            }
            if !record.has_output() {
                self.out
                    .info(&format!("Command {step}/{total} produced no output."));
            }
            return;
        }

        self.out.error(&format!(
            "Command {step}/{total} failed (Exit Code {}).",
            record.exit_code
        ));
        if has_stdout {
            self.out
                .panel(&format!("Stdout (Cmd {step})"), &record.stdout, Tone::Notice);
        }
        if has_stderr {
            self.out
                .panel(&format!("Stderr (Cmd {step})"), &record.stderr, Tone::Failure);
        } else {
            self.out
                .warning("Command failed but produced no stderr output.");
        }
    }
}
