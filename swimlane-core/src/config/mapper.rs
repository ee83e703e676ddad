use serde::{Deserialize, Serialize};

use crate::entities::StatusClassTable;

/// What to do with a request whose reported duration is negative.
///
/// Missing durations always yield a zero-length item, and a missing or
/// unparsable timestamp always drops the event, whatever the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanPolicy {
    /// Keep the item with `end = start`.
    #[default]
    Clamp,
    /// Keep the item as reported, with `end < start`.
    PassThrough,
    /// Drop the event with a classification error.
    Reject,
}

/// Configuration for the event mapper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapperConfig {
    pub span_policy: SpanPolicy,
    pub status_classes: StatusClassTable,
}
