use anyhow::{anyhow, Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::constants;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub search: Option<SearchConfig>,
    #[serde(default)]
    pub advisor: Option<AdvisorConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SearchConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: constants::DEFAULT_TOP_K,
            min_score: constants::DEFAULT_MIN_SCORE,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AdvisorConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// OpenAI-compatible base URL, without the `/chat/completions` suffix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Prefer the GROQ_API_KEY environment variable over storing this in a file
    pub api_key: Option<String>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

impl AdvisorConfig {
    /// Check that a usable API key is present.
    pub fn validate(&self) -> Result<()> {
        match self.api_key.as_deref().map(str::trim) {
            None | Some("") => Err(anyhow!(
                "{} not found in environment variables or config",
                constants::API_KEY_ENV
            )),
            Some(constants::PLACEHOLDER_API_KEY) => Err(anyhow!(
                "Please replace '{}' with your actual API key",
                constants::PLACEHOLDER_API_KEY
            )),
            Some(_) => Ok(()),
        }
    }
}

fn default_top_k() -> usize {
    constants::DEFAULT_TOP_K
}

fn default_min_score() -> f64 {
    constants::DEFAULT_MIN_SCORE
}

fn default_model() -> String {
    constants::DEFAULT_ADVISOR_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    constants::DEFAULT_MAX_TOKENS
}

fn default_temperature() -> f32 {
    constants::DEFAULT_TEMPERATURE
}

fn default_base_url() -> String {
    constants::DEFAULT_ADVISOR_BASE_URL.to_string()
}

pub struct ConfigManager {
    merged_config: Config,
    api_key_from_env: Option<String>,
    pub global_config_path: Option<PathBuf>,
    pub local_config_path: Option<PathBuf>,
}

const DEFAULT_CONFIG: &str = r#"# kcc configuration file
# The GROQ_API_KEY environment variable takes precedence over advisor.api_key

# Optional: Local knowledge base search defaults
# [search]
# top_k = 3
# min_score = 0.2

# Optional: AI advisor (any OpenAI-compatible chat completions API)
# [advisor]
# model = "llama-3.3-70b-versatile"
# max_tokens = 1024
# temperature = 0.7
# base_url = "https://api.groq.com/openai/v1"
# api_key = "your-groq-api-key-here"
"#;

impl ConfigManager {
    /// Load the global config (creating it on first run) and the local
    /// `.kcc/config.toml` under `workspace_path`, if any.
    pub fn new(workspace_path: Option<&Path>) -> Result<Self> {
        let global_config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join(constants::GLOBAL_CONFIG_DIR_NAME);

        fs::create_dir_all(&global_config_dir)?;
        let global_config_path = global_config_dir.join(constants::CONFIG_FILENAME);

        if !global_config_path.exists() {
            fs::write(&global_config_path, DEFAULT_CONFIG).with_context(|| {
                format!(
                    "Failed to write default config to {}",
                    global_config_path.display()
                )
            })?;
        }

        let local_config_path = workspace_path.map(|workspace_path| {
            workspace_path
                .join(constants::KCC_DIR_NAME)
                .join(constants::CONFIG_FILENAME)
        });

        Self::from_paths(Some(global_config_path), local_config_path)
    }

    /// Load a single explicit config file. A missing file means defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::from_paths(None, Some(path.to_path_buf()))
    }

    fn from_paths(
        global_config_path: Option<PathBuf>,
        local_config_path: Option<PathBuf>,
    ) -> Result<Self> {
        let global_config = match &global_config_path {
            Some(path) => load_config(path)?.unwrap_or_default(),
            None => Config::default(),
        };
        let local_config = match &local_config_path {
            Some(path) => load_config(path)?,
            None => None,
        };

        // Merge configs: local overrides global, section by section
        let mut merged_config = global_config;
        if let Some(local_config) = local_config {
            if local_config.search.is_some() {
                merged_config.search = local_config.search;
            }
            if local_config.advisor.is_some() {
                merged_config.advisor = local_config.advisor;
            }
        }

        Ok(Self {
            merged_config,
            api_key_from_env: std::env::var(constants::API_KEY_ENV)
                .ok()
                .filter(|key| !key.trim().is_empty()),
            global_config_path,
            local_config_path,
        })
    }

    pub fn get_search_config(&self) -> SearchConfig {
        self.merged_config.search.clone().unwrap_or_default()
    }

    /// Advisor settings with the environment API key applied on top.
    pub fn get_advisor_config(&self) -> AdvisorConfig {
        let mut advisor = self.merged_config.advisor.clone().unwrap_or_default();
        if let Some(api_key) = &self.api_key_from_env {
            advisor.api_key = Some(api_key.clone());
        }
        advisor
    }
}

fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_default_template_parses_to_defaults() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_means_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::from_file(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(manager.get_search_config(), SearchConfig::default());
        let advisor = manager.get_advisor_config();
        assert_eq!(advisor.model, "llama-3.3-70b-versatile");
        assert_eq!(advisor.max_tokens, 1024);
        assert_eq!(advisor.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_partial_sections_fill_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "[search]\ntop_k = 5\n\n[advisor]\ntemperature = 0.2\n");
        let manager = ConfigManager::from_file(&path).unwrap();

        let search = manager.get_search_config();
        assert_eq!(search.top_k, 5);
        assert_eq!(search.min_score, 0.2);
        let advisor = manager.get_advisor_config();
        assert_eq!(advisor.temperature, 0.2);
        assert_eq!(advisor.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_local_overrides_global_by_section() {
        let dir = TempDir::new().unwrap();
        let global = write(
            &dir,
            "global.toml",
            "[search]\ntop_k = 7\n\n[advisor]\nmodel = \"global-model\"\n",
        );
        let local = write(&dir, "local.toml", "[advisor]\nmodel = \"local-model\"\n");
        let manager = ConfigManager::from_paths(Some(global), Some(local)).unwrap();

        assert_eq!(manager.get_search_config().top_k, 7);
        assert_eq!(manager.get_advisor_config().model, "local-model");
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "config.toml", "[search\ntop_k = ");
        let err = ConfigManager::from_file(&path).err().unwrap();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_validate_api_key() {
        let mut advisor = AdvisorConfig::default();
        let err = advisor.validate().unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY not found"));

        advisor.api_key = Some("your-groq-api-key-here".to_string());
        let err = advisor.validate().unwrap_err();
        assert!(err.to_string().contains("Please replace"));

        advisor.api_key = Some("gsk_test".to_string());
        assert!(advisor.validate().is_ok());
    }
}
