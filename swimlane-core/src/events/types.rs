use swimlane_sdk::objects::TaskId;
use time::OffsetDateTime;

use super::notifications::Notification;
use crate::entities::{ItemInsert, LaneId, RequestMeta, StatusClass};

/// Outcome of mapping one decoded event.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedEvent {
    /// A request to place on the timeline.
    Item(ItemDraft),
    /// An exception to forward to the notification sink.
    Notification(Notification),
    /// Nothing to do: an exception without detail, or an event type the
    /// dashboard does not draw.
    Ignored,
}

/// A timeline item that has not been assigned a lane yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub task: TaskId,
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub status_class: StatusClass,
    pub label: String,
    pub description: String,
    pub meta: RequestMeta,
}

impl ItemDraft {
    /// Attach the resolved lane.
    pub fn into_insert(self, lane_id: LaneId) -> ItemInsert {
        ItemInsert {
            lane_id,
            start: self.start,
            end: self.end,
            status_class: self.status_class,
            label: self.label,
            description: self.description,
            meta: self.meta,
        }
    }
}
