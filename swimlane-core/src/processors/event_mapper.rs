//! EventMapper processor.
//!
//! The EventMapper turns decoded stream events into timeline drafts and
//! notifications. It is pure: it never touches the timeline model, so the
//! same event always maps to the same result.
//!
//! - `request` events become an [`ItemDraft`] spanning
//!   `[timestamp, timestamp + duration]`, classified by status code.
//! - `exception` events with a detail payload become a [`Notification`];
//!   without one they are ignored.
//! - Every other event type is ignored.

use kanau::processor::Processor;
use swimlane_sdk::objects::{ExceptionEvent, RequestEvent, StreamEvent};
use thiserror::Error;
use time::{Duration, OffsetDateTime};

use crate::config::{MapperConfig, SpanPolicy};
use crate::entities::RequestMeta;
use crate::events::{ItemDraft, MappedEvent, Notification};
use crate::utils::timestamp::{duration_from_millis, parse_timestamp};

/// Reasons a request event cannot be placed on the timeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClassificationError {
    #[error("request event has no task id")]
    MissingTask,

    #[error("request event has no timestamp")]
    MissingTimestamp,

    #[error("unparsable timestamp {iso:?}: {reason}")]
    InvalidTimestamp { iso: String, reason: String },

    #[error("negative request duration: {0}ms")]
    NegativeDuration(f64),

    #[error("request span does not fit the supported time range")]
    SpanOverflow,
}

/// Maps decoded events to timeline drafts and notifications.
#[derive(Debug, Clone, Default)]
pub struct EventMapper {
    config: MapperConfig,
}

impl EventMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Map one event.
    pub fn map(&self, event: StreamEvent) -> Result<MappedEvent, ClassificationError> {
        match event {
            StreamEvent::Request(request) => self.map_request(request).map(MappedEvent::Item),
            StreamEvent::Exception(exception) => Ok(map_exception(exception)),
            StreamEvent::Unknown { .. } => Ok(MappedEvent::Ignored),
        }
    }

    fn map_request(&self, request: RequestEvent) -> Result<ItemDraft, ClassificationError> {
        let task = request
            .task
            .filter(|task| !task.as_str().is_empty())
            .ok_or(ClassificationError::MissingTask)?;
        let data = request.data;

        let iso = data
            .timestamp
            .map(|timestamp| timestamp.iso)
            .ok_or(ClassificationError::MissingTimestamp)?;
        let start = parse_timestamp(&iso).map_err(|e| ClassificationError::InvalidTimestamp {
            reason: e.to_string(),
            iso,
        })?;
        let end = self.span_end(start, data.duration)?;

        let status_class = self.config.status_classes.classify(data.status.as_ref());
        let label = data
            .status
            .map(|status| status.as_str().trim().to_string())
            .unwrap_or_default();

        Ok(ItemDraft {
            task,
            start,
            end,
            status_class,
            label,
            description: data.url,
            meta: RequestMeta {
                method: data.method,
                retry: data.retry,
                message: data.message,
                req_uuid: data.req_uuid,
            },
        })
    }

    fn span_end(
        &self,
        start: OffsetDateTime,
        millis: Option<f64>,
    ) -> Result<OffsetDateTime, ClassificationError> {
        let Some((millis, duration)) =
            millis.and_then(|ms| duration_from_millis(ms).map(|d| (ms, d)))
        else {
            return Ok(start);
        };

        let duration = if duration.is_negative() {
            match self.config.span_policy {
                SpanPolicy::Clamp => Duration::ZERO,
                SpanPolicy::PassThrough => duration,
                SpanPolicy::Reject => return Err(ClassificationError::NegativeDuration(millis)),
            }
        } else {
            duration
        };

        start
            .checked_add(duration)
            .ok_or(ClassificationError::SpanOverflow)
    }
}

fn map_exception(exception: ExceptionEvent) -> MappedEvent {
    match exception.data {
        Some(detail) => MappedEvent::Notification(Notification {
            name: exception.name,
            detail,
            task: exception.task,
        }),
        None => MappedEvent::Ignored,
    }
}

// ---------------------------------------------------------------------------
// Processor trait implementation
// ---------------------------------------------------------------------------

impl Processor<StreamEvent> for EventMapper {
    type Output = MappedEvent;
    type Error = ClassificationError;

    async fn process(&self, event: StreamEvent) -> Result<MappedEvent, ClassificationError> {
        self.map(event)
    }
}
