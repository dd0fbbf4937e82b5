use crate::domain::model::TrackedSeries;
use crate::utils::error::{Result, TrackerError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub fetch: FetchConfig,
    pub report: ReportConfig,
    pub store: Option<StoreConfig>,
    pub series: Vec<TrackedSeries>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_nav_timeout_secs")]
    pub nav_timeout_secs: u64,
    #[serde(default = "default_element_timeout_secs")]
    pub element_timeout_secs: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_headless")]
    pub headless: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            nav_timeout_secs: default_nav_timeout_secs(),
            element_timeout_secs: default_element_timeout_secs(),
            settle_ms: default_settle_ms(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            headless: default_headless(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub output_path: String,
    #[serde(default = "default_json_filename")]
    pub json_filename: String,
    #[serde(default = "default_markdown_filename")]
    pub markdown_filename: String,
}

/// External record store settings. The property names are configuration so
/// the engine stays decoupled from any one database schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_url_property")]
    pub url_property: String,
    #[serde(default = "default_missing_count_property")]
    pub missing_count_property: String,
    #[serde(default = "default_missing_volumes_property")]
    pub missing_volumes_property: String,
    #[serde(default = "default_owned_property")]
    pub owned_property: String,
    #[serde(default = "default_existing_property")]
    pub existing_property: String,
    #[serde(default = "default_checked_at_property")]
    pub checked_at_property: String,
    #[serde(default = "default_status_property")]
    pub status_property: String,
}

impl StoreConfig {
    /// Token and database id, when both are present and resolved. A secret
    /// left as an unsubstituted `${VAR}` token counts as absent.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((
            resolved_secret(self.token.as_deref())?,
            resolved_secret(self.database_id.as_deref())?,
        ))
    }
}

fn resolved_secret(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty() && !v.contains("${"))
}

fn default_nav_timeout_secs() -> u64 {
    180
}
fn default_element_timeout_secs() -> u64 {
    180
}
fn default_settle_ms() -> u64 {
    2500
}
fn default_retry_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    2000
}
fn default_headless() -> bool {
    true
}
fn default_json_filename() -> String {
    "results.json".to_string()
}
fn default_markdown_filename() -> String {
    "results.md".to_string()
}
fn default_api_base_url() -> String {
    "https://api.notion.com".to_string()
}
fn default_url_property() -> String {
    "URL".to_string()
}
fn default_missing_count_property() -> String {
    "Missing count".to_string()
}
fn default_missing_volumes_property() -> String {
    "Missing volumes".to_string()
}
fn default_owned_property() -> String {
    "Owned".to_string()
}
fn default_existing_property() -> String {
    "Existing".to_string()
}
fn default_checked_at_property() -> String {
    "Last checked".to_string()
}
fn default_status_property() -> String {
    "Status".to_string()
}

impl TrackerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TrackerError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: TrackerConfig =
            toml::from_str(&processed_content).map_err(|e| TrackerError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        // owned lists come from hand-edited files; normalize once at load time
        for series in &mut config.series {
            series.owned.sort_unstable();
            series.owned.dedup();
        }

        Ok(config)
    }

    /// Replaces `${VAR_NAME}` tokens with environment variable values.
    /// Unset variables keep the original token.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if self.series.is_empty() {
            return Err(TrackerError::ConfigError {
                message: "No tracked series configured (at least one [[series]] required)"
                    .to_string(),
            });
        }

        let mut seen_names = HashSet::new();
        for series in &self.series {
            validation::validate_non_empty_string("series.name", &series.name)?;
            validation::validate_url("series.url", &series.url)?;

            if !seen_names.insert(series.name.as_str()) {
                return Err(TrackerError::InvalidConfigValueError {
                    field: "series.name".to_string(),
                    value: series.name.clone(),
                    reason: "Duplicate series name".to_string(),
                });
            }
        }

        validation::validate_path("report.output_path", &self.report.output_path)?;
        validation::validate_positive_number(
            "fetch.retry_attempts",
            self.fetch.retry_attempts as usize,
            1,
        )?;

        Ok(())
    }

    pub fn store_enabled(&self) -> bool {
        self.store
            .as_ref()
            .is_some_and(|s| s.credentials().is_some())
    }
}

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
