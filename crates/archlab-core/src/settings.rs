use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_PROVIDER: &str = "google";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiSettings {
    pub provider: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    /// Transport timeout handed to the provider client
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AiSettings {
    /// Overlay `ARCHLAB_*` environment variables onto these settings.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok());
        self
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        if let Some(provider) = non_empty("ARCHLAB_PROVIDER") {
            self.provider = provider;
        }
        if let Some(key) = non_empty("ARCHLAB_API_KEY") {
            self.api_key = key;
        }
        if let Some(model) = non_empty("ARCHLAB_MODEL") {
            self.model = model;
        }
        if let Some(secs) = non_empty("ARCHLAB_MODEL_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.timeout_secs = secs;
        }
    }
}

fn settings_path() -> PathBuf {
    crate::data_dir().join("settings.json")
}

/// Read settings from disk, falling back to defaults, then apply env overrides.
pub fn read_settings() -> AiSettings {
    let path = settings_path();
    let stored = fs::read_to_string(&path)
        .ok()
        .and_then(|s| match serde_json::from_str(&s) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring invalid settings file");
                None
            }
        })
        .unwrap_or_default();
    AiSettings::with_env_overrides(stored)
}

pub fn ai_configured(settings: &AiSettings) -> bool {
    !settings.provider.is_empty()
        && !settings.model.is_empty()
        && (settings.provider == "ollama" || !settings.api_key.is_empty())
}
