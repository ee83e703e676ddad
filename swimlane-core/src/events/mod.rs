//! Values produced by the event mapper.
//!
//! A decoded stream event maps to exactly one [`MappedEvent`]: an item to
//! append to the timeline, a notification for the sink, or nothing.

pub mod notifications;
pub mod types;

pub use notifications::{Notification, NotificationList};
pub use types::{ItemDraft, MappedEvent};
