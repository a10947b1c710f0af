use crate::error::{config_error, env_error, SchedulerResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;

/// Existing appointments at a (date, time) that make a slot full
pub const DEFAULT_CAPACITY_THRESHOLD: u32 = 5;

/// Redis instance used when REDIS_URL is not set
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Where existing appointment counts come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictSourceKind {
    Http,
    Redis,
    #[default]
    None,
}

impl FromStr for ConflictSourceKind {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "redis" => Ok(Self::Redis),
            "none" | "" => Ok(Self::None),
            other => Err(config_error(&format!(
                "Unknown CONFLICT_SOURCE '{}', expected http, redis or none",
                other
            ))),
        }
    }
}

impl fmt::Display for ConflictSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Http => "http",
            Self::Redis => "redis",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Main configuration structure for the scheduler
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend queried for existing appointment counts
    pub conflict_source: ConflictSourceKind,
    /// Base URL of the conflict endpoint (http source)
    pub conflict_api_url: Option<String>,
    /// Bearer token sent to the conflict endpoint
    pub conflict_api_token: Option<String>,
    /// Redis connection string (redis source)
    pub redis_url: String,
    /// Slots at or above this many existing appointments are full
    pub capacity_threshold: u32,
    /// Timezone used to decide what "tomorrow" is
    pub timezone: String,
    /// Overrides the generator's day-scan bound
    pub max_days_scanned: Option<u32>,
    /// Map of component names to their enabled status
    pub components: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        let mut components = HashMap::new();
        components.insert("bulk_schedule".to_string(), true);

        Self {
            conflict_source: ConflictSourceKind::None,
            conflict_api_url: None,
            conflict_api_token: None,
            redis_url: DEFAULT_REDIS_URL.to_string(),
            capacity_threshold: DEFAULT_CAPACITY_THRESHOLD,
            timezone: "UTC".to_string(),
            max_days_scanned: None,
            components,
        }
    }
}

impl Config {
    /// Load configuration from environment and config file
    pub fn load() -> SchedulerResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_vars(|key| env::var(key).ok())?;

        // Load components configuration from file if it exists
        if let Ok(content) = fs::read_to_string("config/components.toml") {
            config.merge_components(&content)?;
        }

        Ok(config)
    }

    /// Build a configuration from a variable lookup
    pub fn from_vars<F>(lookup: F) -> SchedulerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(kind) = lookup("CONFLICT_SOURCE") {
            config.conflict_source = kind.parse()?;
        }

        config.conflict_api_url = lookup("CONFLICT_API_URL").filter(|v| !v.trim().is_empty());
        config.conflict_api_token = lookup("CONFLICT_API_TOKEN").filter(|v| !v.trim().is_empty());

        if config.conflict_source == ConflictSourceKind::Http && config.conflict_api_url.is_none() {
            return Err(env_error("CONFLICT_API_URL"));
        }

        if let Some(url) = lookup("REDIS_URL") {
            config.redis_url = url;
        }

        if let Some(threshold) = lookup("CAPACITY_THRESHOLD") {
            config.capacity_threshold = threshold
                .trim()
                .parse::<u32>()
                .map_err(|_| config_error("Invalid CAPACITY_THRESHOLD format"))?;
        }

        if let Some(days) = lookup("MAX_DAYS_SCANNED") {
            config.max_days_scanned = Some(
                days.trim()
                    .parse::<u32>()
                    .map_err(|_| config_error("Invalid MAX_DAYS_SCANNED format"))?,
            );
        }

        if let Some(timezone) = lookup("TIMEZONE") {
            config.timezone = timezone;
        }
        // Reject unknown zones up front
        config.tz()?;

        Ok(config)
    }

    /// Merge component toggles from a TOML document
    pub fn merge_components(&mut self, content: &str) -> SchedulerResult<()> {
        let file_components = toml::from_str::<HashMap<String, bool>>(content)?;
        for (key, value) in file_components {
            self.components.insert(key, value);
        }
        Ok(())
    }

    /// Parsed timezone
    pub fn tz(&self) -> SchedulerResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown TIMEZONE '{}'", self.timezone)))
    }

    /// Check if a component is enabled
    pub fn is_component_enabled(&self, name: &str) -> bool {
        *self.components.get(name).unwrap_or(&false)
    }
}
