//! Configuration infrastructure
//!
//! Settings are layered in this order, later layers winning:
//! 1. Built-in defaults (`defaults` module below)
//! 2. A TOML file (explicit path, or the per-user config directory)
//! 3. `MARKETPLACE_SEARCH__*` environment variables, `__` separating sections
//!
//! Every section is `#[serde(default)]`, so a partial file only overrides
//! the keys it names.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

use super::http_client::HttpClientConfig;
use super::parsing::config::SelectorConfig;
use super::retry_policy::RetryPolicy;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "MARKETPLACE_SEARCH";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the search endpoint lives
    pub marketplace: MarketplaceConfig,

    /// Outbound HTTP client identity and timeouts
    pub http: HttpClientConfig,

    /// Fetch retry/backoff settings
    pub retry: RetryPolicy,

    /// Structural matchers for result blocks and fields
    pub selectors: SelectorConfig,

    /// Access-denial detection
    pub blocking: BlockDetectionConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Outbound link tagging, applied after extraction
    pub affiliate: AffiliateConfig,
}

/// Marketplace search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketplaceConfig {
    /// Scheme and host, e.g. `https://www.amazon.com`
    pub base_url: String,

    /// Path of the search-results page
    pub search_path: String,

    /// Query parameter carrying the keyword
    pub query_param: String,
}

impl Default for MarketplaceConfig {
    fn default() -> Self {
        Self {
            base_url: marketplace::BASE_URL.to_string(),
            search_path: marketplace::SEARCH_PATH.to_string(),
            query_param: marketplace::QUERY_PARAM.to_string(),
        }
    }
}

impl MarketplaceConfig {
    /// Absolute URL of the search page, without the keyword
    pub fn search_endpoint(&self) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid marketplace.base_url: {}", self.base_url))?;
        base.join(&self.search_path)
            .with_context(|| format!("Invalid marketplace.search_path: {}", self.search_path))
    }
}

/// Signals that the remote refused to serve the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockDetectionConfig {
    /// Response statuses treated as access denial
    pub denial_statuses: Vec<u16>,

    /// Case-insensitive regex patterns matched against the final URL and body
    pub body_signatures: Vec<String>,
}

impl Default for BlockDetectionConfig {
    fn default() -> Self {
        Self {
            denial_statuses: defaults::DENIAL_STATUSES.to_vec(),
            body_signatures: defaults::BLOCK_PAGE_SIGNATURES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

/// Logging configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    /// Enable console (stderr) output
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to the per-user data directory
    pub log_dir: Option<PathBuf>,

    /// Log file name prefix; a date suffix is appended on daily rotation
    pub file_name_prefix: String,

    /// Module-specific level filters (e.g., "reqwest": "info")
    pub module_filters: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let module_filters = [
            ("reqwest", "info"),
            ("hyper", "warn"),
            ("hyper_util", "warn"),
            ("html5ever", "warn"),
            ("selectors", "warn"),
        ]
        .into_iter()
        .map(|(module, level)| (module.to_string(), level.to_string()))
        .collect();

        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name_prefix: defaults::LOG_FILE_PREFIX.to_string(),
            module_filters,
        }
    }
}

/// Affiliate tagging for outbound links
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffiliateConfig {
    /// When set, product links get `tag=<value>` before display
    pub tag: Option<String>,
}

impl AppConfig {
    /// Check cross-field constraints that serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.marketplace.search_endpoint()?;
        self.retry.validate()?;
        anyhow::ensure!(
            self.http.timeout_seconds > 0,
            "http.timeout_seconds must be greater than 0"
        );
        anyhow::ensure!(
            !self.marketplace.query_param.trim().is_empty(),
            "marketplace.query_param must not be empty"
        );
        anyhow::ensure!(
            !self.selectors.result_container.is_empty(),
            "selectors.result_container needs at least one selector"
        );
        Ok(())
    }
}

/// Configuration manager for loading settings
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("marketplace-search");

        Ok(config_dir)
    }

    /// Manager reading the per-user config file, if one exists
    pub fn new() -> Result<Self> {
        let config_path = Self::get_config_dir()?.join("config.toml");
        Ok(Self {
            config_path,
            explicit: false,
        })
    }

    /// Manager reading a caller-supplied file, which must exist
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            explicit: true,
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the layered configuration
    pub fn load_config(&self) -> Result<AppConfig> {
        self.load(Self::environment())
    }

    /// Load with environment-style overrides taken from `vars` instead of
    /// the process environment
    ///
    /// Keys use the same form as real variables, e.g.
    /// `MARKETPLACE_SEARCH__RETRY__MAX_ATTEMPTS`.
    pub fn load_config_with_overrides(&self, vars: config::Map<String, String>) -> Result<AppConfig> {
        self.load(Self::environment().source(Some(vars)))
    }

    fn environment() -> config::Environment {
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
    }

    fn load(&self, environment: config::Environment) -> Result<AppConfig> {
        if self.config_path.exists() {
            info!("Loading configuration from: {:?}", self.config_path);
        } else if self.explicit {
            anyhow::bail!("Configuration file not found: {}", self.config_path.display());
        } else {
            debug!(
                "No configuration file at {:?}, using defaults",
                self.config_path
            );
        }

        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.config_path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(self.explicit),
            )
            .add_source(environment)
            .build()
            .context("Failed to assemble configuration sources")?;

        let app_config: AppConfig = settings
            .try_deserialize()
            .context("Configuration file contains invalid values")?;

        app_config.validate()?;
        Ok(app_config)
    }
}

/// Search endpoint constants for the default marketplace
pub mod marketplace {
    /// Marketplace origin
    pub const BASE_URL: &str = "https://www.amazon.com";

    /// Search results path
    pub const SEARCH_PATH: &str = "/s";

    /// Keyword query parameter
    pub const QUERY_PARAM: &str = "k";
}

/// Default values
pub mod defaults {
    /// Desktop browser identity sent with every request
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

    pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

    /// Per-attempt request timeout
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 15;

    pub const CONNECT_TIMEOUT_SECONDS: u64 = 5;

    pub const MAX_REDIRECTS: usize = 10;

    /// Total fetch attempts, the first one included
    pub const MAX_ATTEMPTS: u32 = 3;

    pub const BASE_DELAY_MS: u64 = 500;

    pub const MAX_DELAY_MS: u64 = 8_000;

    pub const BACKOFF_MULTIPLIER: f64 = 2.0;

    pub const JITTER_MS: u64 = 250;

    /// Statuses that mean "go away" rather than "try again"
    pub const DENIAL_STATUSES: &[u16] = &[401, 403, 429];

    /// Bot-check page fingerprints
    pub const BLOCK_PAGE_SIGNATURES: &[&str] = &[
        r"/errors/validateCaptcha",
        r"Type the characters you see in this image",
        r"api-services-support@amazon\.com",
        r"To discuss automated access to Amazon data",
        r"<title>\s*Robot Check\s*</title>",
        r"make sure you're not a robot",
    ];

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_PREFIX: &str = "marketplace-search.log";
}
