use std::time::Duration;

/// Default redraw period.
pub const DEFAULT_RENDER_PERIOD: Duration = Duration::from_millis(100);

/// Configuration for the render scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Interval between two incremental redraws while streaming.
    pub period: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_RENDER_PERIOD,
        }
    }
}
