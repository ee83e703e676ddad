//! Wire types and streaming client for the swimlane request dashboard.
//!
//! The dashboard consumes a WebSocket stream of JSON messages emitted by a
//! fleet of scraping tasks. This crate owns the message shapes and the
//! decoder; the aggregation pipeline lives in `swimlane-core`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;

pub use objects::{DecodeError, StreamEvent, StreamFrame};
