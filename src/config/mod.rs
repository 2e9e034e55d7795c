//! Configuration for the shai terminal assistant.
//!
//! Settings are layered once at startup and never change afterwards:
//! - Built-in defaults
//! - Optional JSON file at `~/.shai/config`
//! - Environment variable overrides (`OLLAMA_BASE_URL`, `OLLAMA_MODEL`, ...)
//! - Command-line overrides applied by the CLI through [`ConfigBuilder`]

mod builder;
mod constants;
mod defaults;
mod environment;
mod loader;
mod types;
mod validation;

pub use builder::ConfigBuilder;
pub use types::{Config, LlmSettings, SessionSettings};

#[cfg(test)]
mod tests;
