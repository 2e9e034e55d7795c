use serde::{Deserialize, Serialize};

use super::constants::CHAT_API_PATH;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub llm: LlmSettings,
    pub session: SessionSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub user_agent: String,
}

impl LlmSettings {
    /// Full URL of the chat endpoint derived from the base URL.
    pub fn chat_endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), CHAT_API_PATH)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    /// Automatic model re-queries allowed after consecutive command failures in one turn.
    pub max_error_retry: u32,
}

// File configuration types
#[derive(Debug, Default, Deserialize)]
pub(super) struct FileConfig {
    #[serde(default)]
    pub llm: Option<FileLlmSettings>,
    #[serde(default)]
    pub session: Option<FileSessionSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FileLlmSettings {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct FileSessionSettings {
    pub max_error_retry: Option<u32>,
}

// Serialization helpers for `shai config`
#[derive(Serialize)]
pub(super) struct DisplayConfig<'a> {
    pub llm: DisplayLlm<'a>,
    pub session: DisplaySession,
}

#[derive(Serialize)]
pub(super) struct DisplayLlm<'a> {
    pub base_url: &'a str,
    pub chat_endpoint: String,
    pub model: &'a str,
    pub timeout_secs: u64,
    pub temperature: f32,
    pub user_agent: &'a str,
}

#[derive(Serialize)]
pub(super) struct DisplaySession {
    pub max_error_retry: u32,
}

impl<'a> From<&'a Config> for DisplayConfig<'a> {
    fn from(config: &'a Config) -> Self {
        DisplayConfig {
            llm: DisplayLlm {
                base_url: &config.llm.base_url,
                chat_endpoint: config.llm.chat_endpoint(),
                model: &config.llm.model,
                timeout_secs: config.llm.timeout_secs,
                temperature: config.llm.temperature,
                user_agent: &config.llm.user_agent,
            },
            session: DisplaySession {
                max_error_retry: config.session.max_error_retry,
            },
        }
    }
}
