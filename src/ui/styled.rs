use std::io::{self, Write};

use colored::*;

use super::{Output, Tone, panel_body};

/// Coloured console output with boxed panels.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyledOutput;

impl StyledOutput {
    // Style is applied per line so the coloured border does not reset it.
    fn boxed<F>(title: ColoredString, body: &str, border: Color, style: F)
    where
        F: Fn(&str) -> ColoredString,
    {
        println!("\n{} {}", "┌─".color(border), title);
        for line in body.lines() {
            println!("{} {}", "│".color(border), style(line));
        }
        println!("{}", "└─".color(border));
    }
}

impl Output for StyledOutput {
    fn info(&self, text: &str) {
        println!("{} {}", "INFO:".blue(), text);
    }

    fn success(&self, text: &str) {
        println!("{} {}", "SUCCESS:".green(), text);
    }

    fn warning(&self, text: &str) {
        println!("{} {}", "WARN:".yellow(), text);
    }

    fn error(&self, text: &str) {
        println!("{} {}", "ERROR:".red().bold(), text);
    }

    fn panel(&self, title: &str, body: &str, tone: Tone) {
        let body = panel_body(body);
        match tone {
            Tone::Muted => Self::boxed(title.dimmed(), body, Color::BrightBlack, |line| {
                line.italic().dimmed()
            }),
            Tone::Question => Self::boxed(title.yellow().bold(), body, Color::Yellow, |line| {
                line.yellow().bold()
            }),
            Tone::Success => Self::boxed(title.green(), body, Color::Green, |line| line.normal()),
            Tone::Notice => Self::boxed(title.yellow(), body, Color::Yellow, |line| line.normal()),
            Tone::Failure => Self::boxed(title.red(), body, Color::Red, |line| line.normal()),
            Tone::Raw => Self::boxed(title.red(), body, Color::Red, |line| line.dimmed()),
        }
    }

    fn command(&self, command: &str, step: usize, total: usize) {
        let title = format!("Proposed Command {step}/{total}");
        Self::boxed(title.cyan().bold(), command, Color::Cyan, |line| line.bold());
    }

    fn prompt(&self, text: &str) {
        print!("{}", text.magenta().bold());
        let _ = io::stdout().flush();
    }
}
