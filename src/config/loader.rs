use anyhow::{Context, Result};
use dirs::home_dir;
use std::{fs, path::Path};

use super::builder::ConfigBuilder;
use super::environment::apply_env_overrides;
use super::types::{DisplayConfig, FileConfig};
use super::Config;

impl Config {
    pub fn config_path() -> Result<std::path::PathBuf> {
        let mut path = home_dir().context("Could not determine home directory")?;
        path.push(".shai/config");
        Ok(path)
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Layer defaults, the config file and the environment, then let the caller
    /// apply its own overrides before validation.
    pub fn load_with<F>(overrides: F) -> Result<Self>
    where
        F: FnOnce(ConfigBuilder) -> ConfigBuilder,
    {
        let path = Self::config_path()?;
        let mut builder = Self::builder();

        if path.exists() {
            builder = Self::apply_file(builder, &path)?;
        }

        builder = apply_env_overrides(builder)?;
        overrides(builder).build()
    }

    /// Pretty JSON view of the effective settings.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&DisplayConfig::from(self))
            .context("Failed to serialize configuration to JSON")
    }

    fn apply_file(builder: ConfigBuilder, path: &Path) -> Result<ConfigBuilder> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed reading config at {}", path.display()))?;

        if contents.trim().is_empty() {
            return Ok(builder);
        }

        let raw: FileConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed parsing JSON config at {}", path.display()))?;

        Ok(raw.apply(builder))
    }
}

impl FileConfig {
    pub fn apply(self, builder: ConfigBuilder) -> ConfigBuilder {
        let llm = self.llm.unwrap_or_default();
        let session = self.session.unwrap_or_default();

        builder
            .with_llm(|settings| {
                if let Some(base_url) = llm.base_url {
                    settings.base_url = base_url;
                }
                if let Some(model) = llm.model {
                    settings.model = model;
                }
                if let Some(timeout) = llm.timeout_secs {
                    settings.timeout_secs = timeout;
                }
                if let Some(temperature) = llm.temperature {
                    settings.temperature = temperature;
                }
                if let Some(user_agent) = llm.user_agent {
                    settings.user_agent = user_agent;
                }
            })
            .with_session(|settings| {
                if let Some(retries) = session.max_error_retry {
                    settings.max_error_retry = retries;
                }
            })
    }
}
