//! Configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{PlanningPreferences, Tier};
use crate::llm::CompletionError;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Completion backend configuration
    pub llm: LlmConfig,

    /// Planner model parameters
    pub planner: PlannerSettings,

    /// Default per-user planning preferences
    pub preferences: PlanningPreferences,

    /// Rate gate ceilings
    #[serde(rename = "rate-limit")]
    pub rate_limit: RateLimitConfig,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early to fail fast with a clear message instead of failing
    /// on the first planning request.
    pub fn validate(&self) -> Result<()> {
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "completion API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    ///
    /// Explicit path, then `.dayplan.yml` in the working directory, then
    /// `~/.config/dayplan/dayplan.yml`, then built-in defaults.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(".dayplan.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("dayplan").join("dayplan.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Completion backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (currently only "openai" supported)
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Hard cap on output tokens per response
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl LlmConfig {
    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String, CompletionError> {
        std::env::var(&self.api_key_env).map_err(|_| {
            CompletionError::Configuration(format!(
                "API key not found. Set the {} environment variable.",
                self.api_key_env
            ))
        })
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            base_url: "https://api.openai.com".to_string(),
            max_tokens: 4096,
            timeout_ms: 300_000,
        }
    }
}

/// Model parameters for the two planner operations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerSettings {
    /// Sampling temperature for day planning
    #[serde(rename = "plan-temperature")]
    pub plan_temperature: f64,

    /// Output token budget for day planning
    #[serde(rename = "plan-max-tokens")]
    pub plan_max_tokens: u32,

    /// Sampling temperature for task breakdown
    #[serde(rename = "breakdown-temperature")]
    pub breakdown_temperature: f64,

    /// Output token budget for task breakdown
    #[serde(rename = "breakdown-max-tokens")]
    pub breakdown_max_tokens: u32,
}

impl Default for PlannerSettings {
    fn default() -> Self {
        Self {
            plan_temperature: 0.3,
            plan_max_tokens: 2000,
            breakdown_temperature: 0.4,
            breakdown_max_tokens: 1000,
        }
    }
}

/// Per-tier hourly ceilings for planning calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub free: u64,
    pub starter: u64,
    pub pro: u64,
    pub team: u64,
}

impl RateLimitConfig {
    /// Hourly ceiling for a tier
    pub fn hourly_limit(&self, tier: Tier) -> u64 {
        match tier {
            Tier::Free => self.free,
            Tier::Starter => self.starter,
            Tier::Pro => self.pro,
            Tier::Team => self.team,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            free: 3,
            starter: 10,
            pro: 100,
            team: 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.planner.plan_max_tokens, 2000);
        assert_eq!(config.rate_limit.free, 3);
        assert_eq!(config.preferences.max_focus_minutes, 360);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "llm:\n  model: gpt-4o-mini\nrate-limit:\n  free: 5\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.base_url, "https://api.openai.com");
        assert_eq!(config.rate_limit.free, 5);
        assert_eq!(config.rate_limit.pro, 100);
    }

    #[test]
    fn test_hourly_limits_per_tier() {
        let limits = RateLimitConfig::default();
        assert_eq!(limits.hourly_limit(Tier::Free), 3);
        assert_eq!(limits.hourly_limit(Tier::Starter), 10);
        assert_eq!(limits.hourly_limit(Tier::Pro), 100);
        assert_eq!(limits.hourly_limit(Tier::Team), 500);
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let path = PathBuf::from("/nonexistent/dayplan.yml");
        assert!(Config::load(Some(&path)).is_err());
    }
}
