//! Project configuration file support for stratcritic.
//!
//! Loads configuration from `stratcritic.toml` in the working directory, or
//! from an explicit `--config` path.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use stratcritic_critic::{ModelId, ModelProfile, ModelTable};

/// Project-level configuration loaded from `stratcritic.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Gateway base URL
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    /// Per-call timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Run critics concurrently
    pub concurrent: Option<bool>,
    /// Default critic selection when `--models` is not given
    pub models: Option<Vec<ModelId>>,
    /// Per-model overrides of the built-in profiles
    #[serde(default)]
    pub profiles: ProfileOverrides,
}

/// `[profiles.<model>]` tables
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverrides {
    pub gemini: Option<ProfileOverride>,
    pub openai: Option<ProfileOverride>,
    pub deepseek: Option<ProfileOverride>,
}

impl ProfileOverrides {
    fn get(&self, model: ModelId) -> Option<&ProfileOverride> {
        match model {
            ModelId::Gemini => self.gemini.as_ref(),
            ModelId::Openai => self.openai.as_ref(),
            ModelId::Deepseek => self.deepseek.as_ref(),
        }
    }
}

/// Fields of a model profile that may be replaced
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverride {
    pub upstream_id: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ProfileOverride {
    fn apply(&self, base: &ModelProfile) -> ModelProfile {
        ModelProfile {
            upstream_id: self
                .upstream_id
                .clone()
                .unwrap_or_else(|| base.upstream_id.clone()),
            temperature: self.temperature.unwrap_or(base.temperature),
            max_tokens: self.max_tokens.unwrap_or(base.max_tokens),
        }
    }
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "stratcritic.toml";

/// Environment variable consulted for the API key by default
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_CRITIC_API_KEY";

impl ProjectConfig {
    /// Load configuration from the working directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<Self>> {
        let config_path = working_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        Self::load_from(&config_path).map(Some)
    }

    /// Load an explicitly named file; a missing file is an error here
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        anyhow::ensure!(
            config.timeout_secs != Some(0),
            "{}: timeout_secs must be at least 1",
            config_path.display()
        );
        Ok(config)
    }

    /// Built-in profiles with this file's overrides applied
    pub fn model_table(&self) -> ModelTable {
        let mut table = ModelTable::default();
        for model in ModelId::ALL {
            if let Some(overrides) = self.profiles.get(model) {
                let profile = overrides.apply(table.get(model));
                table.set(model, profile);
            }
        }
        table
    }

    /// Name of the environment variable holding the API key
    pub fn api_key_env(&self) -> &str {
        self.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV)
    }
}
