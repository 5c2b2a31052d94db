use crate::policy::{BlockedTerm, DEFAULT_BLOCKED_TERM, Severity};
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Brand Guardian service.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Azure AI Search service holding the policy documents.
    pub search_endpoint: String,
    /// Name of the search index queried by the retrieval step.
    pub search_index_name: String,
    /// Admin or query key sent as the `api-key` header.
    pub search_api_key: String,
    /// REST API version appended to every search request.
    pub search_api_version: String,
    /// Upper bound on the number of documents retrieved per audit.
    pub search_top: usize,
    /// Per-request timeout applied to index calls, in seconds.
    pub search_timeout_secs: u64,
    /// Terms that fail the compliance check when found in retrieved content.
    pub blocked_terms: Vec<BlockedTerm>,
    /// Optional override for the notice that replaces non-compliant content.
    pub redaction_notice: Option<String>,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_API_VERSION: &str = "2023-11-01";
const DEFAULT_SEARCH_TOP: usize = 50;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let search_top = parse_optional("AZURE_SEARCH_TOP")?.unwrap_or(DEFAULT_SEARCH_TOP);
        if search_top == 0 {
            return Err(ConfigError::InvalidValue("AZURE_SEARCH_TOP".into()));
        }

        let blocked_terms = parse_blocked_terms(
            &load_env_optional("COMPLIANCE_BLOCKED_TERMS")
                .unwrap_or_else(|| DEFAULT_BLOCKED_TERM.to_string()),
        )
        .ok_or_else(|| ConfigError::InvalidValue("COMPLIANCE_BLOCKED_TERMS".into()))?;

        Ok(Self {
            search_endpoint: load_env("AZURE_SEARCH_ENDPOINT")?,
            search_index_name: load_env("AZURE_SEARCH_INDEX_NAME")?,
            search_api_key: load_env("AZURE_SEARCH_API_KEY")?,
            search_api_version: load_env_optional("AZURE_SEARCH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            search_top,
            search_timeout_secs: parse_optional("AZURE_SEARCH_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            blocked_terms,
            redaction_notice: load_env_optional("REDACTION_NOTICE"),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Parse a comma separated `term[:severity]` list.
///
/// Returns `None` when an entry names an unknown severity or when no terms remain after
/// trimming.
pub(crate) fn parse_blocked_terms(raw: &str) -> Option<Vec<BlockedTerm>> {
    let mut terms = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let term = match entry.split_once(':') {
            Some((term, severity)) => {
                let severity = severity.trim().parse::<Severity>().ok()?;
                BlockedTerm::new(term.trim()).with_severity(severity)
            }
            None => BlockedTerm::new(entry),
        };
        if term.term().is_empty() {
            return None;
        }
        terms.push(term);
    }
    if terms.is_empty() { None } else { Some(terms) }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// Values from a `.env` file in the working directory are applied first. A second call keeps
/// the configuration installed by the first.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }
    let config = Config::from_env()?;
    tracing::debug!(
        endpoint = %config.search_endpoint,
        index = %config.search_index_name,
        top = config.search_top,
        blocked_terms = config.blocked_terms.len(),
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    Ok(CONFIG.get_or_init(|| config))
}
