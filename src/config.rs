//! Configuration management for Roami
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use anyhow::{Context, Result, anyhow};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on stops per tour
pub const MAX_TOUR_STOPS: usize = 5;

/// Root configuration structure for Roami
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RoamiConfig {
    /// Tour assembly settings
    #[serde(default)]
    pub tour: TourConfig,
    /// External service endpoints and HTTP behavior
    #[serde(default)]
    pub sources: SourcesConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tour assembly settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourConfig {
    /// Discovery radius used when the caller gives none, in meters
    #[serde(default = "default_radius_meters")]
    pub default_radius_meters: f64,
    /// Attraction category passed to the discovery source
    #[serde(default = "default_category")]
    pub category: String,
    /// Candidates kept after discovery (1..=5)
    #[serde(default = "default_max_stops")]
    pub max_stops: usize,
    /// Bound on the single position read, in milliseconds
    #[serde(default = "default_position_timeout_ms")]
    pub position_timeout_ms: u64,
    /// Bound on the discovery call, in seconds
    #[serde(default = "default_discovery_timeout")]
    pub discovery_timeout_seconds: u64,
    /// Archive lookup radius around each stop, in meters
    #[serde(default = "default_archive_radius_meters")]
    pub archive_radius_meters: f64,
    /// Bound on each enrichment sub-call, in seconds
    #[serde(default = "default_enrichment_timeout")]
    pub enrichment_timeout_seconds: u64,
    /// Stops enriched at the same time
    #[serde(default = "default_max_concurrent_enrichments")]
    pub max_concurrent_enrichments: usize,
}

/// External service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Overpass interpreter endpoint
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    /// Wikimedia Commons API endpoint
    #[serde(default = "default_wikimedia_url")]
    pub wikimedia_url: String,
    /// Chat-completions endpoint used for narratives
    #[serde(default = "default_narrative_url")]
    pub narrative_url: String,
    /// Model requested from the narrative endpoint
    #[serde(default = "default_narrative_model")]
    pub narrative_model: String,
    /// API key for the narrative endpoint
    pub narrative_api_key: Option<String>,
    /// User agent sent to every service
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// HTTP request timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in hours
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_radius_meters() -> f64 {
    2000.0
}

fn default_category() -> String {
    "attraction".to_string()
}

fn default_max_stops() -> usize {
    MAX_TOUR_STOPS
}

fn default_position_timeout_ms() -> u64 {
    5000
}

fn default_discovery_timeout() -> u64 {
    30
}

fn default_archive_radius_meters() -> f64 {
    200.0
}

fn default_enrichment_timeout() -> u64 {
    30
}

fn default_max_concurrent_enrichments() -> usize {
    MAX_TOUR_STOPS
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}

fn default_wikimedia_url() -> String {
    "https://commons.wikimedia.org/w/api.php".to_string()
}

fn default_narrative_url() -> String {
    "https://api.cerebras.ai/v1/chat/completions".to_string()
}

fn default_narrative_model() -> String {
    "llama3.3-70b".to_string()
}

fn default_user_agent() -> String {
    format!("Roami/{}", env!("CARGO_PKG_VERSION"))
}

fn default_http_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_cache_ttl() -> u32 {
    24
}

fn default_cache_location() -> String {
    "~/.cache/roami".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            default_radius_meters: default_radius_meters(),
            category: default_category(),
            max_stops: default_max_stops(),
            position_timeout_ms: default_position_timeout_ms(),
            discovery_timeout_seconds: default_discovery_timeout(),
            archive_radius_meters: default_archive_radius_meters(),
            enrichment_timeout_seconds: default_enrichment_timeout(),
            max_concurrent_enrichments: default_max_concurrent_enrichments(),
        }
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            overpass_url: default_overpass_url(),
            wikimedia_url: default_wikimedia_url(),
            narrative_url: default_narrative_url(),
            narrative_model: default_narrative_model(),
            narrative_api_key: None,
            user_agent: default_user_agent(),
            timeout_seconds: default_http_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl TourConfig {
    #[must_use]
    pub fn position_timeout(&self) -> Duration {
        Duration::from_millis(self.position_timeout_ms)
    }

    #[must_use]
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_secs(self.discovery_timeout_seconds)
    }

    #[must_use]
    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout_seconds)
    }
}

impl CacheConfig {
    /// Cache directory with a leading `~` expanded to the home directory
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        match self.location.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map_or_else(|| PathBuf::from(rest), |home| home.join(rest)),
            None => PathBuf::from(&self.location),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 3600)
    }
}

impl RoamiConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides such as ROAMI_TOUR__MAX_STOPS=3
        builder = builder.add_source(
            Environment::with_prefix("ROAMI")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RoamiConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("roami").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.tour.default_radius_meters <= 0.0 {
            self.tour.default_radius_meters = default_radius_meters();
        }
        if self.tour.category.is_empty() {
            self.tour.category = default_category();
        }
        if self.tour.max_stops == 0 {
            self.tour.max_stops = default_max_stops();
        }
        if self.tour.position_timeout_ms == 0 {
            self.tour.position_timeout_ms = default_position_timeout_ms();
        }
        if self.tour.discovery_timeout_seconds == 0 {
            self.tour.discovery_timeout_seconds = default_discovery_timeout();
        }
        if self.tour.archive_radius_meters <= 0.0 {
            self.tour.archive_radius_meters = default_archive_radius_meters();
        }
        if self.tour.enrichment_timeout_seconds == 0 {
            self.tour.enrichment_timeout_seconds = default_enrichment_timeout();
        }
        if self.tour.max_concurrent_enrichments == 0 {
            self.tour.max_concurrent_enrichments = default_max_concurrent_enrichments();
        }
        if self.sources.user_agent.is_empty() {
            self.sources.user_agent = default_user_agent();
        }
        if self.sources.timeout_seconds == 0 {
            self.sources.timeout_seconds = default_http_timeout();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_tour()?;
        self.validate_sources()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_tour(&self) -> Result<()> {
        if !(1..=MAX_TOUR_STOPS).contains(&self.tour.max_stops) {
            return Err(anyhow!(
                "Tour max stops must be between 1 and {MAX_TOUR_STOPS}"
            ));
        }

        if self.tour.default_radius_meters > 50_000.0 {
            return Err(anyhow!("Tour radius cannot exceed 50000 meters"));
        }

        if self.tour.archive_radius_meters > 10_000.0 {
            return Err(anyhow!("Archive radius cannot exceed 10000 meters"));
        }

        if self.tour.position_timeout_ms > 60_000 {
            return Err(anyhow!("Position timeout cannot exceed 60000 ms"));
        }

        if self.tour.discovery_timeout_seconds > 300 || self.tour.enrichment_timeout_seconds > 300
        {
            return Err(anyhow!("Source timeouts cannot exceed 300 seconds"));
        }

        Ok(())
    }

    fn validate_sources(&self) -> Result<()> {
        if let Some(api_key) = &self.sources.narrative_api_key {
            if api_key.is_empty() {
                return Err(anyhow!(
                    "Narrative API key cannot be empty if provided. Either remove it or provide a valid key."
                ));
            }
        }

        for (name, url) in [
            ("Overpass", &self.sources.overpass_url),
            ("Wikimedia", &self.sources.wikimedia_url),
            ("Narrative", &self.sources.narrative_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow!("{name} URL must be a valid HTTP or HTTPS URL"));
            }
        }

        if self.sources.timeout_seconds > 300 {
            return Err(anyhow!("HTTP timeout cannot exceed 300 seconds"));
        }

        if self.sources.max_retries > 10 {
            return Err(anyhow!("HTTP max retries cannot exceed 10"));
        }

        if self.cache.ttl_hours > 24 * 30 {
            return Err(anyhow!("Cache TTL cannot exceed 720 hours (30 days)"));
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(anyhow!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ));
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(anyhow!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ));
        }

        Ok(())
    }
}
