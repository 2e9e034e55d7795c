use std::io::{self, BufRead};
use std::sync::mpsc as std_mpsc;
use std::thread;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source of typed lines. `Ok(None)` means end of input.
#[async_trait]
pub trait LineInput: Send {
    async fn read_line(&mut self) -> Result<Option<String>>;
}

/// Reads stdin on a detached thread, one line per request.
///
/// The thread is never joined, so a read still blocked when the session is
/// interrupted does not keep the process alive. It only reads when asked,
/// which leaves stdin to a confirmed command while it runs.
pub struct StdinInput {
    requests: std_mpsc::Sender<()>,
    lines: mpsc::Receiver<io::Result<Option<String>>>,
}

impl StdinInput {
    pub fn new() -> Self {
        Self::spawn(|| io::stdin().lock())
    }

    fn spawn<F, R>(open: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
        R: BufRead,
    {
        let (requests, pending) = std_mpsc::channel::<()>();
        let (sender, lines) = mpsc::channel(1);

        thread::spawn(move || {
            let mut reader = open();
            for () in pending {
                let line = read_one(&mut reader);
                let done = !matches!(line, Ok(Some(_)));
                if sender.blocking_send(line).is_err() || done {
                    break;
                }
            }
        });

        Self { requests, lines }
    }
}

impl Default for StdinInput {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineInput for StdinInput {
    async fn read_line(&mut self) -> Result<Option<String>> {
        // Closed channels mean the reader already reported EOF or an error.
        if self.requests.send(()).is_err() {
            return Ok(None);
        }

        match self.lines.recv().await {
            Some(line) => line.context("Failed to read from standard input"),
            None => Ok(None),
        }
    }
}

fn read_one<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}
