//! Configuration types for the dashboard pipeline.
//!
//! These are the validated runtime knobs of the library. Loading them from
//! a file is handled by the dashboard binary.

mod chart;
mod mapper;
mod scheduler;

pub use chart::{ChartConfig, ChartConfigBuilder, Margin};
pub use mapper::{MapperConfig, SpanPolicy};
pub use scheduler::SchedulerConfig;
