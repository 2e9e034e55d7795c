use anyhow::Result;

use super::types::{Config, LlmSettings, SessionSettings};
use super::validation::validate;

#[derive(Debug)]
pub struct ConfigBuilder {
    pub(super) llm: LlmSettings,
    pub(super) session: SessionSettings,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            llm: LlmSettings::default(),
            session: SessionSettings::default(),
        }
    }

    pub fn with_llm<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut LlmSettings),
    {
        update(&mut self.llm);
        self
    }

    pub fn with_session<F>(mut self, update: F) -> Self
    where
        F: FnOnce(&mut SessionSettings),
    {
        update(&mut self.session);
        self
    }

    /// Finish the builder, rejecting settings the session cannot run with.
    pub fn build(self) -> Result<Config> {
        let config = Config {
            llm: self.llm,
            session: self.session,
        };
        validate(&config)?;
        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
