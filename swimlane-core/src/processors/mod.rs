//! Processors of the dashboard pipeline.
//!
//! - `EventMapper`: maps decoded `StreamEvent`s to item drafts and
//!   notifications
//! - `RenderScheduler`: mounts the chart on first data and redraws it on a
//!   fixed period
//! - `Session`: owns one connection's model and drives the two above from
//!   a stream of frames

pub mod event_mapper;
pub mod render_scheduler;
pub mod session;

pub use event_mapper::{ClassificationError, EventMapper};
pub use render_scheduler::RenderScheduler;
pub use session::{ConnectionState, MessageOutcome, Session, SessionStats};
