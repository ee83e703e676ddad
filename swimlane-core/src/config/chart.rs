use std::time::Duration;

/// Space reserved around the plot area, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Margin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 20,
            right: 20,
            bottom: 30,
            left: 80,
        }
    }
}

/// Chart configuration handed to the renderer on every mount and update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartConfig {
    pub margin: Margin,
    /// Total chart width in pixels, margins included.
    pub width: u32,
    /// Width of the visible time window.
    pub max_time: Duration,
}

impl ChartConfig {
    pub fn builder() -> ChartConfigBuilder {
        ChartConfigBuilder {
            config: Self::default(),
        }
    }

    /// Width left for bars once the horizontal margins are taken.
    pub fn plot_width(&self) -> u32 {
        self.width
            .saturating_sub(self.margin.left)
            .saturating_sub(self.margin.right)
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            margin: Margin::default(),
            width: 960,
            max_time: Duration::from_secs(60),
        }
    }
}

/// Builder for [`ChartConfig`]; unset fields keep their defaults.
#[derive(Debug, Clone)]
pub struct ChartConfigBuilder {
    config: ChartConfig,
}

impl ChartConfigBuilder {
    pub fn margin(mut self, margin: Margin) -> Self {
        self.config.margin = margin;
        self
    }

    pub fn width(mut self, px: u32) -> Self {
        self.config.width = px;
        self
    }

    /// Visible window in milliseconds.
    pub fn max_time(mut self, ms: u64) -> Self {
        self.config.max_time = Duration::from_millis(ms);
        self
    }

    pub fn build(self) -> ChartConfig {
        self.config
    }
}
