use std::path::PathBuf;
use std::time::Duration;

use crashlens_adapters::gemini::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crashlens_adapters::GeminiConfig;

const USAGE_DB_FILE: &str = "usage.sqlite3";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub camera_index: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(120),
            data_dir: default_data_dir(),
            export_dir: PathBuf::from("."),
            camera_index: 0,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from a variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        config.api_key = get("GEMINI_API_KEY").or_else(|| get("API_KEY"));
        if let Some(model) = get("CRASHLENS_MODEL") {
            config.model = model;
        }
        if let Some(endpoint) = get("CRASHLENS_API_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(raw) = get("CRASHLENS_TIMEOUT_SECS") {
            let secs = raw
                .parse::<u64>()
                .map_err(|_| format!("invalid CRASHLENS_TIMEOUT_SECS: {raw}"))?;
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = get("CRASHLENS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("CRASHLENS_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }
        if let Some(raw) = get("CRASHLENS_CAMERA_INDEX") {
            config.camera_index = raw
                .parse::<u32>()
                .map_err(|_| format!("invalid CRASHLENS_CAMERA_INDEX: {raw}"))?;
        }
        Ok(config)
    }

    pub fn usage_db_path(&self) -> PathBuf {
        self.data_dir.join(USAGE_DB_FILE)
    }

    pub fn gemini(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            timeout: self.timeout,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crashlens")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).expect("config");
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.camera_index, 0);
        assert!(config.usage_db_path().ends_with("crashlens/usage.sqlite3"));
    }

    #[test]
    fn api_key_falls_back_and_ignores_blanks() {
        let config = config_from(&[("GEMINI_API_KEY", "  "), ("API_KEY", "k-2")]).expect("config");
        assert_eq!(config.api_key.as_deref(), Some("k-2"));

        let config = config_from(&[("GEMINI_API_KEY", "k-1"), ("API_KEY", "k-2")]).expect("config");
        assert_eq!(config.api_key.as_deref(), Some("k-1"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = config_from(&[
            ("CRASHLENS_MODEL", "gemini-pro"),
            ("CRASHLENS_TIMEOUT_SECS", "30"),
            ("CRASHLENS_DATA_DIR", "/tmp/cl"),
            ("CRASHLENS_EXPORT_DIR", "/tmp/out"),
            ("CRASHLENS_CAMERA_INDEX", "2"),
        ])
        .expect("config");
        assert_eq!(config.model, "gemini-pro");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.usage_db_path(), PathBuf::from("/tmp/cl/usage.sqlite3"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.camera_index, 2);
        assert_eq!(config.gemini().model, "gemini-pro");
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(config_from(&[("CRASHLENS_TIMEOUT_SECS", "soon")]).is_err());
        assert!(config_from(&[("CRASHLENS_CAMERA_INDEX", "-1")]).is_err());
    }
}
