use std::io::{self, Write};

use super::{Output, Tone, panel_body};

/// Uncoloured fallback used for `--plain` and non-terminal stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainOutput;

impl PlainOutput {
    fn block(title: &str, body: &str) {
        println!("\n--- {title} ---");
        println!("{body}");
        println!("---{}---", "-".repeat(title.len()));
    }
}

impl Output for PlainOutput {
    fn info(&self, text: &str) {
        println!("INFO: {text}");
    }

    fn success(&self, text: &str) {
        println!("SUCCESS: {text}");
    }

    fn warning(&self, text: &str) {
        println!("WARNING: {text}");
    }

    fn error(&self, text: &str) {
        println!("ERROR: {text}");
    }

    fn panel(&self, title: &str, body: &str, _tone: Tone) {
        Self::block(title, panel_body(body));
    }

    fn command(&self, command: &str, step: usize, total: usize) {
        Self::block(&format!("Proposed Command {step}/{total}"), command);
    }

    fn prompt(&self, text: &str) {
        print!("{text}");
        let _ = io::stdout().flush();
    }
}
