//! Configuration management for the Seatify service
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::SeatifyError;
use anyhow::{Context, Result};
use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure for the Seatify service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatifyConfig {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Geocoding service settings
    pub geocoding: GeocodingConfig,
    /// Routing service settings
    pub routing: RoutingConfig,
    /// Lookup cache settings
    pub cache: CacheConfig,
    /// Journey defaults
    pub journey: JourneyConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Whole-request timeout in seconds
    pub request_timeout_seconds: u32,
    /// PEM certificate; TLS is used when both cert and key are set
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

/// Geocoding (Nominatim) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodingConfig {
    pub base_url: String,
    /// Nominatim rejects requests without an identifying agent
    pub user_agent: String,
    pub timeout_seconds: u32,
}

/// Routing (OSRM) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_seconds: u32,
}

/// Lookup cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum entries per cache
    pub max_entries: usize,
    /// TTL in hours for successful lookups
    pub ttl_hours: u32,
    /// TTL in minutes for failed route lookups
    pub negative_ttl_minutes: u32,
}

/// Journey defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JourneyConfig {
    /// IANA timezone the departure time is interpreted in
    pub timezone: String,
    /// Rows in the seat map
    pub total_rows: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_seconds: 30,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "SeatifyApp/2.0".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://router.project-osrm.org".to_string(),
            profile: "driving".to_string(),
            timeout_seconds: 20,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_hours: 168,
            negative_ttl_minutes: 10,
        }
    }
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            timezone: "Asia/Kolkata".to_string(),
            total_rows: crate::seats::TOTAL_ROWS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl CacheConfig {
    #[must_use]
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.ttl_hours) * 60 * 60)
    }

    #[must_use]
    pub fn negative_ttl(&self) -> Duration {
        Duration::from_secs(u64::from(self.negative_ttl_minutes) * 60)
    }
}

impl JourneyConfig {
    /// Parse the configured timezone name
    pub fn tz(&self) -> crate::Result<Tz> {
        self.timezone.parse::<Tz>().map_err(|_| {
            SeatifyError::config(format!("Unknown timezone '{}'", self.timezone))
        })
    }
}

impl SeatifyConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

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

        // SEATIFY__SERVER__PORT=9000 style overrides
        builder = builder.add_source(
            Environment::with_prefix("SEATIFY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let config: SeatifyConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("seatify").join("config.toml"))
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds == 0 || self.geocoding.timeout_seconds > 120 {
            return Err(
                SeatifyError::config("Geocoding timeout must be between 1 and 120 seconds").into(),
            );
        }

        if self.routing.timeout_seconds == 0 || self.routing.timeout_seconds > 120 {
            return Err(
                SeatifyError::config("Routing timeout must be between 1 and 120 seconds").into(),
            );
        }

        if self.server.request_timeout_seconds == 0 || self.server.request_timeout_seconds > 300 {
            return Err(
                SeatifyError::config("Request timeout must be between 1 and 300 seconds").into(),
            );
        }

        if self.cache.max_entries == 0 {
            return Err(SeatifyError::config("Cache max entries must be at least 1").into());
        }

        if self.cache.ttl_hours > 24 * 365 {
            return Err(SeatifyError::config("Cache TTL cannot exceed one year").into());
        }

        if self.journey.total_rows == 0 || self.journey.total_rows > 100 {
            return Err(SeatifyError::config("Total rows must be between 1 and 100").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(SeatifyError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(SeatifyError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Geocoding", &self.geocoding.base_url),
            ("Routing", &self.routing.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(SeatifyError::config(format!(
                    "{name} base URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        if self.geocoding.user_agent.trim().is_empty() {
            return Err(SeatifyError::config("Geocoding user agent cannot be empty").into());
        }

        self.journey.tz()?;

        Ok(())
    }
}
