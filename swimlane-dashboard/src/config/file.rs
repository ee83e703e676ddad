//! TOML file configuration structures.
//!
//! These structs directly map to the `swimlane.toml` file format. Every
//! section is optional; a missing file behaves like an empty one.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use swimlane_core::config::SpanPolicy;
use swimlane_core::entities::StatusCategory;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub connection: ConnectionConfig,
    pub chart: ChartConfig,
    pub scheduler: SchedulerConfig,
    pub timeline: TimelineConfig,
    pub notifications: NotificationsConfig,
    pub diagnostics: DiagnosticsConfig,
}

/// Event stream endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// WebSocket URL of the producer (e.g. "ws://127.0.0.1:5494/ws").
    pub url: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:5494/ws".to_string(),
        }
    }
}

/// Chart geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Total width in pixels, margins included.
    pub width: u32,
    /// Visible time window in milliseconds.
    pub max_time_ms: u64,
    pub margin: MarginConfig,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 960,
            max_time_ms: 60_000,
            margin: MarginConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for MarginConfig {
    fn default() -> Self {
        Self {
            top: 20,
            right: 20,
            bottom: 30,
            left: 80,
        }
    }
}

/// Redraw cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub period_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { period_ms: 100 }
    }
}

/// Item construction rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineConfig {
    pub span_policy: SpanPolicy,
    /// Extra status code categories, e.g. `"301" = "redirect"`.
    pub status_classes: BTreeMap<String, StatusCategory>,
}

/// Where exception detail documents are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsConfig {
    pub dir: PathBuf,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./exceptions"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Number of diagnostic lines kept in memory.
    pub capacity: usize,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { capacity: 256 }
    }
}
