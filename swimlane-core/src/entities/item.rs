use time::OffsetDateTime;
use uuid::Uuid;

use super::lane::LaneId;
use super::status::StatusClass;

/// Insertion index of an item. Equal to arrival order, without gaps.
pub type ItemId = usize;

/// One observed HTTP request, drawn as a bar on its lane.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub lane_id: LaneId,
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub status_class: StatusClass,
    /// Status code text, empty when the request never got a response.
    pub label: String,
    /// Request URL.
    pub description: String,
    pub meta: RequestMeta,
}

impl Item {
    pub fn duration(&self) -> time::Duration {
        self.end - self.start
    }
}

/// Data for appending a new item. The id is assigned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInsert {
    pub lane_id: LaneId,
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub status_class: StatusClass,
    pub label: String,
    pub description: String,
    pub meta: RequestMeta,
}

impl ItemInsert {
    pub(crate) fn into_item(self, id: ItemId) -> Item {
        Item {
            id,
            lane_id: self.lane_id,
            start: self.start,
            end: self.end,
            status_class: self.status_class,
            label: self.label,
            description: self.description,
            meta: self.meta,
        }
    }
}

/// Producer-side details that do not affect the chart geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub method: Option<String>,
    pub retry: Option<u32>,
    /// Transport error text for requests that never got a response.
    pub message: Option<String>,
    pub req_uuid: Option<Uuid>,
}
