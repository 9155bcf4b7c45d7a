use crate::error::{BasketError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

/// Layered configuration for the extraction basket
#[derive(Debug, Clone)]
pub struct BasketConfig {
    /// CRS applied to layers that carry no per-layer override
    pub global_crs: ConfigValue<String>,
    /// Default extraction extent, in `global_crs` axis order
    pub global_extent: ConfigValue<[f64; 4]>,
    /// Whether newly discovered layers start checked
    pub layers_checked: ConfigValue<bool>,
    /// Maximum number of characters of a layer display name before shortening
    pub max_layer_name_length: ConfigValue<usize>,
    /// Batch submission endpoint for extraction requests
    pub extractor_batch_url: ConfigValue<String>,
    /// Per-request timeout applied to every capabilities/probe call, seconds
    pub request_timeout_secs: ConfigValue<u64>,
    /// How long the extract trigger stays disabled after a successful submit
    pub extract_cooldown_secs: ConfigValue<u64>,
}

impl BasketConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            global_crs: ConfigValue::new("EPSG:4326".to_string(), ConfigSource::Default),
            global_extent: ConfigValue::new([-180.0, -90.0, 180.0, 90.0], ConfigSource::Default),
            layers_checked: ConfigValue::new(true, ConfigSource::Default),
            max_layer_name_length: ConfigValue::new(30, ConfigSource::Default),
            extractor_batch_url: ConfigValue::new(
                "http://localhost:8080/extractor/initiate".to_string(),
                ConfigSource::Default,
            ),
            request_timeout_secs: ConfigValue::new(30, ConfigSource::Default),
            extract_cooldown_secs: ConfigValue::new(30, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| BasketError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| BasketError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        // Update values from file
        if let Some(global_crs) = file_config.global_crs {
            self.global_crs.update(global_crs, ConfigSource::File);
        }

        if let Some(global_extent) = file_config.global_extent {
            self.global_extent.update(global_extent, ConfigSource::File);
        }

        if let Some(layers_checked) = file_config.layers_checked {
            self.layers_checked.update(layers_checked, ConfigSource::File);
        }

        if let Some(max_layer_name_length) = file_config.max_layer_name_length {
            self.max_layer_name_length.update(max_layer_name_length, ConfigSource::File);
        }

        if let Some(extractor_batch_url) = file_config.extractor_batch_url {
            self.extractor_batch_url.update(extractor_batch_url, ConfigSource::File);
        }

        if let Some(request_timeout_secs) = file_config.request_timeout_secs {
            self.request_timeout_secs.update(request_timeout_secs, ConfigSource::File);
        }

        if let Some(extract_cooldown_secs) = file_config.extract_cooldown_secs {
            self.extract_cooldown_secs.update(extract_cooldown_secs, ConfigSource::File);
        }

        Ok(self)
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        // GEOBASKET_GLOBAL_CRS
        if let Ok(crs) = env::var("GEOBASKET_GLOBAL_CRS") {
            self.global_crs.update(crs, ConfigSource::Environment);
        }

        // GEOBASKET_LAYERS_CHECKED
        if let Ok(checked_str) = env::var("GEOBASKET_LAYERS_CHECKED") {
            match checked_str.parse::<bool>() {
                Ok(checked) => self.layers_checked.update(checked, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBASKET_LAYERS_CHECKED value '{}': expected true or false",
                    checked_str
                ),
            }
        }

        // GEOBASKET_BATCH_URL
        if let Ok(url) = env::var("GEOBASKET_BATCH_URL") {
            self.extractor_batch_url.update(url, ConfigSource::Environment);
        }

        // GEOBASKET_REQUEST_TIMEOUT
        if let Ok(timeout_str) = env::var("GEOBASKET_REQUEST_TIMEOUT") {
            match timeout_str.parse::<u64>() {
                Ok(secs) => self.request_timeout_secs.update(secs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBASKET_REQUEST_TIMEOUT value '{}': expected integer seconds",
                    timeout_str
                ),
            }
        }

        // GEOBASKET_EXTRACT_COOLDOWN
        if let Ok(cooldown_str) = env::var("GEOBASKET_EXTRACT_COOLDOWN") {
            match cooldown_str.parse::<u64>() {
                Ok(secs) => self.extract_cooldown_secs.update(secs, ConfigSource::Environment),
                Err(_) => tracing::warn!(
                    "Invalid GEOBASKET_EXTRACT_COOLDOWN value '{}': expected integer seconds",
                    cooldown_str
                ),
            }
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        if let Some(extractor_batch_url) = overrides.extractor_batch_url {
            self.extractor_batch_url.update(extractor_batch_url, ConfigSource::Cli);
        }

        if let Some(request_timeout_secs) = overrides.request_timeout_secs {
            self.request_timeout_secs.update(request_timeout_secs, ConfigSource::Cli);
        }

        if let Some(layers_checked) = overrides.layers_checked {
            self.layers_checked.update(layers_checked, ConfigSource::Cli);
        }

        if let Some(extract_cooldown_secs) = overrides.extract_cooldown_secs {
            self.extract_cooldown_secs.update(extract_cooldown_secs, ConfigSource::Cli);
        }
    }
}

/// Configuration loaded from TOML file.
///
/// Unknown keys are ignored so the basket settings can share a file with the
/// service list consumed by the CLI.
#[derive(Debug, Deserialize, Serialize)]
struct FileConfig {
    global_crs: Option<String>,
    global_extent: Option<[f64; 4]>,
    layers_checked: Option<bool>,
    max_layer_name_length: Option<usize>,
    extractor_batch_url: Option<String>,
    request_timeout_secs: Option<u64>,
    extract_cooldown_secs: Option<u64>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub extractor_batch_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub layers_checked: Option<bool>,
    pub extract_cooldown_secs: Option<u64>,
}
