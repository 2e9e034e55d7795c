#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};
    use tempfile::TempDir;

    use crate::config::environment::{env_f32, env_string, env_u32, env_u64};
    use crate::config::Config;
    use crate::config::constants::{DEFAULT_BASE_URL, DEFAULT_MAX_ERROR_RETRY, DEFAULT_MODEL};

    const CONFIG_VARS: &[&str] = &[
        "OLLAMA_BASE_URL",
        "OLLAMA_MODEL",
        "SHAI_TIMEOUT_SECS",
        "SHAI_TEMPERATURE",
        "SHAI_MAX_ERROR_RETRY",
    ];

    fn env_lock<'a>() -> std::sync::MutexGuard<'a, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    struct EnvGuard {
        saved: Vec<(String, Option<String>)>,
    }

    impl EnvGuard {
        fn new(vars: &[(&str, Option<&str>)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
                .collect::<Vec<_>>();
            for (key, value) in vars {
                match value {
                    Some(val) => unsafe { std::env::set_var(key, val) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
            Self { saved }
        }

        /// Point HOME at `home` and clear every config variable, then apply `vars`.
        fn isolated(home: &str, vars: &[(&str, Option<&str>)]) -> Self {
            let mut all: Vec<(&str, Option<&str>)> = vec![("HOME", Some(home))];
            all.extend(CONFIG_VARS.iter().map(|key| (*key, None)));
            all.extend_from_slice(vars);
            Self::new(&all)
        }
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            for (key, value) in self.saved.iter().rev() {
                match value {
                    Some(val) => unsafe { std::env::set_var(key, val) },
                    None => unsafe { std::env::remove_var(key) },
                }
            }
        }
    }

    fn write_config_file(home: &TempDir, contents: &str) {
        let config_dir = home.path().join(".shai");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::write(config_dir.join("config"), contents).unwrap();
    }

    #[test]
    fn load_uses_defaults_without_file_or_env() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        let _env = EnvGuard::isolated(&home, &[]);

        let config = Config::load_with(|builder| builder).unwrap();
        assert_eq!(config.llm.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.timeout_secs, 120);
        assert_eq!(config.session.max_error_retry, DEFAULT_MAX_ERROR_RETRY);
        assert_eq!(
            config.llm.chat_endpoint(),
            "http://localhost:11434/api/chat"
        );
    }

    #[test]
    fn load_from_env_only() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        let _env = EnvGuard::isolated(
            &home,
            &[
                ("OLLAMA_BASE_URL", Some("http://gpu-box:11434/")),
                ("OLLAMA_MODEL", Some("llama3.1:8b")),
                ("SHAI_TIMEOUT_SECS", Some("45")),
                ("SHAI_MAX_ERROR_RETRY", Some("5")),
                ("SHAI_TEMPERATURE", Some("0.5")),
            ],
        );

        let config = Config::load_with(|builder| builder).unwrap();
        assert_eq!(config.llm.model, "llama3.1:8b");
        assert_eq!(config.llm.timeout_secs, 45);
        assert_eq!(config.session.max_error_retry, 5);
        assert!((config.llm.temperature - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.llm.chat_endpoint(), "http://gpu-box:11434/api/chat");
    }

    #[test]
    fn load_prefers_env_over_file() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        write_config_file(
            &temp_home,
            r#"{
                "llm": {
                    "base_url": "http://file-host:11434",
                    "model": "file-model",
                    "timeout_secs": 20
                },
                "session": { "max_error_retry": 4 }
            }"#,
        );

        let _env = EnvGuard::isolated(
            &home,
            &[
                ("OLLAMA_MODEL", Some("env-model")),
                ("SHAI_TIMEOUT_SECS", Some("40")),
            ],
        );

        let config = Config::load_with(|builder| builder).unwrap();
        assert_eq!(config.llm.base_url, "http://file-host:11434");
        assert_eq!(config.llm.model, "env-model");
        assert_eq!(config.llm.timeout_secs, 40);
        assert_eq!(config.session.max_error_retry, 4);
    }

    #[test]
    fn load_with_applies_cli_overrides_last() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        let _env = EnvGuard::isolated(&home, &[("OLLAMA_MODEL", Some("env-model"))]);

        let config = Config::load_with(|builder| {
            builder
                .with_llm(|llm| llm.model = "flag-model".to_string())
                .with_session(|session| session.max_error_retry = 0)
        })
        .unwrap();

        assert_eq!(config.llm.model, "flag-model");
        assert_eq!(config.session.max_error_retry, 0);
    }

    #[test]
    fn load_ignores_empty_config_file() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        write_config_file(&temp_home, "   \n");
        let _env = EnvGuard::isolated(&home, &[]);

        let config = Config::load_with(|builder| builder).unwrap();
        assert_eq!(config.llm.model, DEFAULT_MODEL);
    }

    #[test]
    fn load_errors_on_malformed_config_file() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        write_config_file(&temp_home, "{ not json");
        let _env = EnvGuard::isolated(&home, &[]);

        let err = Config::load_with(|builder| builder).unwrap_err();
        assert!(err.to_string().contains("Failed parsing JSON config"));
    }

    #[test]
    fn load_rejects_invalid_base_url() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        let _env = EnvGuard::isolated(&home, &[("OLLAMA_BASE_URL", Some("localhost:11434"))]);

        let err = Config::load_with(|builder| builder).unwrap_err();
        assert!(err.to_string().contains("must start with http://"));
    }

    #[test]
    fn load_rejects_unparseable_timeout() {
        let _lock = env_lock();
        let temp_home = TempDir::new().unwrap();
        let home = temp_home.path().to_str().unwrap().to_string();
        let _env = EnvGuard::isolated(&home, &[("SHAI_TIMEOUT_SECS", Some("soon"))]);

        let err = Config::load_with(|builder| builder).unwrap_err();
        assert!(err.to_string().contains("SHAI_TIMEOUT_SECS"));
    }

    #[test]
    fn build_rejects_zero_timeout_and_wild_temperature() {
        let err = Config::builder()
            .with_llm(|llm| llm.timeout_secs = 0)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));

        let err = Config::builder()
            .with_llm(|llm| llm.temperature = 3.5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("temperature"));

        let err = Config::builder()
            .with_llm(|llm| llm.model = "  ".to_string())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("Model name is empty"));
    }

    #[test]
    fn pretty_json_lists_effective_settings() {
        let config = Config::builder().build().unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&config.to_pretty_json().unwrap()).unwrap();
        assert_eq!(json["llm"]["model"], DEFAULT_MODEL);
        assert_eq!(json["llm"]["chat_endpoint"], "http://localhost:11434/api/chat");
        assert_eq!(json["session"]["max_error_retry"], 2);
    }

    #[test]
    fn test_env_string() {
        let _lock = env_lock();
        let _env = EnvGuard::new(&[
            ("SHAI_TEST_VAR", Some("test_value")),
            ("SHAI_TEST_BLANK", Some("   ")),
        ]);

        assert_eq!(
            env_string("SHAI_TEST_VAR").unwrap(),
            Some("test_value".to_string())
        );
        assert_eq!(env_string("SHAI_TEST_BLANK").unwrap(), None);
        assert_eq!(env_string("SHAI_NONEXISTENT_VAR").unwrap(), None);
    }

    #[test]
    fn test_env_numbers() {
        let _lock = env_lock();
        let _env = EnvGuard::new(&[
            ("SHAI_TEST_U64", Some("123")),
            ("SHAI_TEST_U32", Some("456")),
            ("SHAI_TEST_F32", Some("0.75")),
        ]);

        assert_eq!(env_u64("SHAI_TEST_U64").unwrap(), Some(123));
        assert_eq!(env_u32("SHAI_TEST_U32").unwrap(), Some(456));
        assert_eq!(env_f32("SHAI_TEST_F32").unwrap(), Some(0.75));
        assert_eq!(env_u64("SHAI_NONEXISTENT_VAR").unwrap(), None);
    }
}
