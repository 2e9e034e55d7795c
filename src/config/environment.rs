use anyhow::{Context, Result, anyhow};
use std::env;

use super::builder::ConfigBuilder;

pub fn apply_env_overrides(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Some(base_url) = env_string("OLLAMA_BASE_URL")? {
        builder = builder.with_llm(|llm| llm.base_url = base_url);
    }

    if let Some(model) = env_string("OLLAMA_MODEL")? {
        builder = builder.with_llm(|llm| llm.model = model);
    }

    if let Some(timeout) = env_u64("SHAI_TIMEOUT_SECS")? {
        builder = builder.with_llm(|llm| llm.timeout_secs = timeout);
    }

    if let Some(temperature) = env_f32("SHAI_TEMPERATURE")? {
        builder = builder.with_llm(|llm| llm.temperature = temperature);
    }

    if let Some(retries) = env_u32("SHAI_MAX_ERROR_RETRY")? {
        builder = builder.with_session(|session| session.max_error_retry = retries);
    }

    Ok(builder)
}

/// Read a variable, treating an unset or blank value as absent.
pub fn env_string(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val.trim().to_string())),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(anyhow!("{key} contains invalid UTF-8")),
    }
}

pub fn env_u64(key: &str) -> Result<Option<u64>> {
    env_string(key)?
        .map(|value| {
            value
                .parse::<u64>()
                .with_context(|| format!("Failed to parse {key} as u64"))
        })
        .transpose()
}

pub fn env_u32(key: &str) -> Result<Option<u32>> {
    env_string(key)?
        .map(|value| {
            value
                .parse::<u32>()
                .with_context(|| format!("Failed to parse {key} as u32"))
        })
        .transpose()
}

pub fn env_f32(key: &str) -> Result<Option<f32>> {
    env_string(key)?
        .map(|value| {
            value
                .parse::<f32>()
                .with_context(|| format!("Failed to parse {key} as a number"))
        })
        .transpose()
}
