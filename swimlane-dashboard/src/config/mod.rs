//! Configuration module for swimlane-dashboard.
//!
//! Handles loading configuration from a TOML file and CLI overrides, and
//! converts it into the runtime types of `swimlane-core`.

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use swimlane_core::config::{ChartConfig, Margin, MapperConfig, SchedulerConfig};
use swimlane_core::entities::StatusClassTable;
use thiserror::Error;
use url::Url;

use crate::config::file::FileConfig;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid stream url: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Values given on the command line; they win over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub notifications_dir: Option<PathBuf>,
}

/// Validated configuration, ready to build a session from.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub url: Url,
    pub chart: ChartConfig,
    pub scheduler: SchedulerConfig,
    pub mapper: MapperConfig,
    pub notifications_dir: PathBuf,
    pub diagnostics_capacity: usize,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    overrides: Overrides,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, overrides: Overrides) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            overrides,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file (a missing file means all defaults)
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = match std::fs::read_to_string(&self.config_path) {
            Ok(content) => toml::from_str::<FileConfig>(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %self.config_path.display(),
                    "Config file not found, using defaults"
                );
                FileConfig::default()
            }
            Err(e) => return Err(e.into()),
        };

        self.apply_overrides(&mut file_config);
        build_loaded_config(file_config)
    }

    fn apply_overrides(&self, config: &mut FileConfig) {
        if let Some(url) = &self.overrides.url {
            config.connection.url = url.clone();
        }
        if let Some(dir) = &self.overrides.notifications_dir {
            config.notifications.dir = dir.clone();
        }
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.scheduler.period_ms == 0 {
        return Err(ConfigError::ValidationError(
            "scheduler.period_ms must be greater than 0".to_string(),
        ));
    }
    if config.chart.width == 0 {
        return Err(ConfigError::ValidationError(
            "chart.width must be greater than 0".to_string(),
        ));
    }
    if config.chart.max_time_ms == 0 {
        return Err(ConfigError::ValidationError(
            "chart.max_time_ms must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

fn build_loaded_config(config: FileConfig) -> Result<LoadedConfig, ConfigError> {
    validate(&config)?;

    let url = Url::parse(&config.connection.url)?;
    if !matches!(url.scheme(), "ws" | "wss") {
        return Err(ConfigError::ValidationError(format!(
            "connection.url must use ws:// or wss://, got {}://",
            url.scheme()
        )));
    }

    let margin = config.chart.margin;
    let chart = ChartConfig::builder()
        .margin(Margin {
            top: margin.top,
            right: margin.right,
            bottom: margin.bottom,
            left: margin.left,
        })
        .width(config.chart.width)
        .max_time(config.chart.max_time_ms)
        .build();

    let mut status_classes = StatusClassTable::default();
    for (code, category) in config.timeline.status_classes {
        status_classes.insert(code, category);
    }

    Ok(LoadedConfig {
        url,
        chart,
        scheduler: SchedulerConfig {
            period: Duration::from_millis(config.scheduler.period_ms),
        },
        mapper: MapperConfig {
            span_policy: config.timeline.span_policy,
            status_classes,
        },
        notifications_dir: config.notifications.dir,
        diagnostics_capacity: config.diagnostics.capacity,
    })
}
