pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3:8b";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MAX_ERROR_RETRY: u32 = 2;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;
pub const CHAT_API_PATH: &str = "/api/chat";
