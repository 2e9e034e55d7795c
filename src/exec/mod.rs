use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use tokio::process::Command as TokioCommand;
use tracing::{debug, warn};

/// Exit code reported when the shell itself could not be started.
pub const SPAWN_FAILURE_EXIT_CODE: i32 = 1;

/// Outcome of running one confirmed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionRecord {
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }

    pub fn has_output(&self) -> bool {
        !self.stdout.trim().is_empty() || !self.stderr.trim().is_empty()
    }

    fn spawn_failure(command: &str, error: &std::io::Error) -> Self {
        let stderr = if error.kind() == std::io::ErrorKind::NotFound {
            format!("Failed to execute command: shell not found ({error})")
        } else {
            format!("Failed to execute command: {error}")
        };

        Self {
            command: command.to_string(),
            exit_code: SPAWN_FAILURE_EXIT_CODE,
            stdout: String::new(),
            stderr,
        }
    }
}

/// Runs a command line to completion and captures what it printed.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str) -> ExecutionRecord;
}

/// Runs commands through the host shell (`sh -c` on Unix, `cmd /C` on Windows).
#[derive(Debug, Clone)]
pub struct ShellRunner {
    program: String,
    flag: String,
}

impl ShellRunner {
    pub fn new() -> Self {
        if cfg!(windows) {
            Self::with_shell("cmd", "/C")
        } else {
            Self::with_shell("sh", "-c")
        }
    }

    pub fn with_shell(program: impl Into<String>, flag: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            flag: flag.into(),
        }
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str) -> ExecutionRecord {
        debug!(shell = %self.program, command, "executing command");

        let result = TokioCommand::new(&self.program)
            .arg(&self.flag)
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await;

        match result {
            Ok(output) => {
                let exit_code = exit_code_of(output.status);
                debug!(command, exit_code, "command finished");
                ExecutionRecord {
                    command: command.to_string(),
                    exit_code,
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
            Err(err) => {
                warn!(command, error = %err, "failed to spawn shell");
                ExecutionRecord::spawn_failure(command, &err)
            }
        }
    }
}

/// Map an exit status to a single code; signal deaths become negative.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
