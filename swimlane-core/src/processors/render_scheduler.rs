//! RenderScheduler processor.
//!
//! The RenderScheduler decouples event arrival from redraw cost:
//! - The first processed request mounts the chart and starts a fixed-period
//!   redraw timer (Idle -> Streaming)
//! - While streaming, the model is updated per event but the renderer only
//!   runs on timer ticks, so the redraw rate is bounded by the period
//! - Closing the connection cancels the timer (Streaming -> Idle)
//!
//! The timer is a `tokio::time::Interval`, so tests drive the state machine
//! on tokio's paused clock instead of real time.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::debug;

use crate::config::{ChartConfig, SchedulerConfig};
use crate::entities::Snapshot;
use crate::framework::ChartRenderer;

enum SchedulerState {
    Idle,
    Streaming { interval: Interval },
}

/// Drives a [`ChartRenderer`] at a bounded rate.
pub struct RenderScheduler<R> {
    renderer: R,
    chart: ChartConfig,
    period: Duration,
    state: SchedulerState,
}

impl<R: ChartRenderer> RenderScheduler<R> {
    /// Create an idle scheduler.
    ///
    /// A zero period is raised to one millisecond.
    pub fn new(renderer: R, chart: ChartConfig, config: SchedulerConfig) -> Self {
        Self {
            renderer,
            chart,
            period: config.period.max(Duration::from_millis(1)),
            state: SchedulerState::Idle,
        }
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, SchedulerState::Streaming { .. })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Hook for every successfully processed request.
    ///
    /// When idle, mounts the chart with `snapshot` and starts the redraw
    /// timer. When already streaming, does nothing: the next tick picks up
    /// the change.
    pub fn on_data(&mut self, snapshot: Snapshot<'_>) {
        if self.is_streaming() {
            return;
        }

        self.renderer.mount(&self.chart, snapshot);

        let mut interval = tokio::time::interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        self.state = SchedulerState::Streaming { interval };

        debug!(
            period_ms = self.period.as_millis() as u64,
            items = snapshot.items.len(),
            "Chart mounted, redraw timer started"
        );
    }

    /// Wait for the next redraw deadline.
    ///
    /// Never resolves while idle. Cancel-safe, so it can sit in a
    /// `tokio::select!` next to the message stream.
    pub async fn tick(&mut self) {
        match &mut self.state {
            SchedulerState::Streaming { interval } => {
                interval.tick().await;
            }
            SchedulerState::Idle => std::future::pending::<()>().await,
        }
    }

    /// Redraw with `snapshot`. No-op while idle.
    pub fn render(&mut self, snapshot: Snapshot<'_>) {
        if self.is_streaming() {
            self.renderer.update(&self.chart, snapshot);
        }
    }

    /// Cancel the redraw timer.
    pub fn stop(&mut self) {
        if self.is_streaming() {
            self.state = SchedulerState::Idle;
            debug!("Redraw timer stopped");
        }
    }
}
