use super::constants::*;
use super::types::{LlmSettings, SessionSettings};

pub fn default_user_agent() -> String {
    format!("shai/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            temperature: DEFAULT_TEMPERATURE,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_error_retry: DEFAULT_MAX_ERROR_RETRY,
        }
    }
}
