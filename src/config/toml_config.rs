use crate::domain::ports::ConfigProvider;
use crate::utils::error::{PortalError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub champions: ChampionsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub min_chars: usize,
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            min_chars: 2,
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChampionsConfig {
    pub limit: usize,
}

impl Default for ChampionsConfig {
    fn default() -> Self {
        Self { limit: 10 }
    }
}

impl PortalConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PortalError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PortalError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Builds the configuration from `PORTAL_API_URL`, `PORTAL_ANON_KEY` and
    /// the optional `PORTAL_TIMEOUT_SECONDS`; search and leaderboard settings
    /// keep their defaults.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("PORTAL_API_URL").ok();
        let anon_key = std::env::var("PORTAL_ANON_KEY").ok();
        let timeout_seconds = match std::env::var("PORTAL_TIMEOUT_SECONDS") {
            Ok(raw) => Some(raw.trim().parse::<u64>().map_err(|e| {
                PortalError::InvalidConfigValueError {
                    field: "PORTAL_TIMEOUT_SECONDS".to_string(),
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?),
            Err(_) => None,
        };

        Ok(Self {
            api: ApiConfig {
                url: validation::validate_required_field("PORTAL_API_URL", &url)?.clone(),
                anon_key: validation::validate_required_field("PORTAL_ANON_KEY", &anon_key)?
                    .clone(),
                timeout_seconds,
            },
            search: SearchConfig::default(),
            champions: ChampionsConfig::default(),
        })
    }

    /// Replaces `${VAR}` references (e.g. `${PORTAL_ANON_KEY}`); undefined variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PortalError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("api.url", &self.api.url)?;
        validation::validate_non_empty_string("api.anon_key", &self.api.anon_key)?;
        validation::validate_resolved("api.anon_key", &self.api.anon_key)?;

        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_positive_number("api.timeout_seconds", timeout, 1)?;
        }

        validation::validate_range("search.limit", self.search.limit, 1, 1000)?;
        validation::validate_range("search.debounce_ms", self.search.debounce_ms, 0, 10_000)?;
        validation::validate_positive_number("champions.limit", self.champions.limit as u64, 1)?;

        Ok(())
    }
}

impl ConfigProvider for PortalConfig {
    fn api_url(&self) -> &str {
        &self.api.url
    }

    fn anon_key(&self) -> &str {
        &self.api.anon_key
    }

    fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }
}

impl Validate for PortalConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_basic_toml_config() {
        let toml_content = r#"
[api]
url = "https://portal.supabase.co"
anon_key = "anon"
timeout_seconds = 3

[search]
debounce_ms = 150
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_url(), "https://portal.supabase.co");
        assert_eq!(config.timeout_seconds(), 3);
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.min_chars, 2);
        assert_eq!(config.champions.limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TEST_PORTAL_ANON_KEY", "secret-anon");

        let toml_content = r#"
[api]
url = "https://portal.supabase.co"
anon_key = "${TEST_PORTAL_ANON_KEY}"
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.anon_key, "secret-anon");
        assert_eq!(config.timeout_seconds(), DEFAULT_TIMEOUT_SECONDS);

        std::env::remove_var("TEST_PORTAL_ANON_KEY");
    }

    #[test]
    fn test_unresolved_placeholder_fails_validation() {
        let toml_content = r#"
[api]
url = "https://portal.supabase.co"
anon_key = "${PORTAL_TEST_UNSET_VARIABLE}"
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(PortalError::InvalidConfigValueError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[api]
url = "invalid-url"
anon_key = "anon"
"#;

        let config = PortalConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_api_section_is_a_parse_error() {
        let err = PortalConfig::from_toml_str("[search]\nlimit = 5\n").unwrap_err();
        assert!(matches!(err, PortalError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[api]
url = "http://localhost:54321"
anon_key = "anon"

[champions]
limit = 3
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = PortalConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.champions.limit, 3);
    }
}
