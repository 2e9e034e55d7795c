use anyhow::{Result, bail};

use super::types::Config;

pub fn validate(config: &Config) -> Result<()> {
    let llm = &config.llm;

    if llm.model.trim().is_empty() {
        bail!("Model name is empty. Set OLLAMA_MODEL or pass --model");
    }

    let base_url = llm.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        bail!(
            "Ollama base URL '{}' must start with http:// or https://",
            llm.base_url
        );
    }

    if llm.timeout_secs == 0 {
        bail!("Request timeout must be at least one second");
    }

    if !(0.0..=2.0).contains(&llm.temperature) {
        bail!(
            "Sampling temperature {} is outside the range 0.0-2.0",
            llm.temperature
        );
    }

    Ok(())
}
