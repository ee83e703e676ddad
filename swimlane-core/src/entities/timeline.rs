//! The timeline model: lanes and items for one streaming session.
//!
//! The model is append-only. Lanes are created on first sight of a task and
//! never reordered; items are appended in arrival order and never touched
//! again. The only way to shrink it is an explicit [`TimelineModel::clear`].

use std::collections::HashMap;

use swimlane_sdk::objects::TaskId;
use time::OffsetDateTime;

use super::item::{Item, ItemId, ItemInsert};
use super::lane::{Lane, LaneId};

#[derive(Debug, Default)]
pub struct TimelineModel {
    lanes: Vec<Lane>,
    lane_index: HashMap<TaskId, LaneId>,
    items: Vec<Item>,
    /// Item ids per lane, in arrival order.
    lane_items: Vec<Vec<ItemId>>,
}

impl TimelineModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the lane for `task`, creating it if this is the first event
    /// from that task.
    pub fn get_or_create_lane(&mut self, task: &TaskId) -> LaneId {
        if let Some(&id) = self.lane_index.get(task) {
            return id;
        }

        let id = self.lanes.len();
        self.lanes.push(Lane {
            id,
            label: task.clone(),
        });
        self.lane_index.insert(task.clone(), id);
        self.lane_items.push(Vec::new());
        id
    }

    /// Append an item and return its id.
    ///
    /// The caller must have resolved `insert.lane_id` through
    /// [`get_or_create_lane`](Self::get_or_create_lane).
    pub fn append_item(&mut self, insert: ItemInsert) -> ItemId {
        debug_assert!(insert.lane_id < self.lanes.len(), "item references unknown lane");
        let id = self.items.len();
        if let Some(ids) = self.lane_items.get_mut(insert.lane_id) {
            ids.push(id);
        }
        self.items.push(insert.into_item(id));
        id
    }

    pub fn lane_for(&self, task: &TaskId) -> Option<LaneId> {
        self.lane_index.get(task).copied()
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Read-only view handed to renderers.
    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            lanes: &self.lanes,
            items: &self.items,
            lane_items: &self.lane_items,
        }
    }

    /// Discard every lane and item. Ids restart at 0.
    pub fn clear(&mut self) {
        self.lanes.clear();
        self.lane_index.clear();
        self.items.clear();
        self.lane_items.clear();
    }
}

/// Borrowed `{lanes, items}` view of a [`TimelineModel`].
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub lanes: &'a [Lane],
    pub items: &'a [Item],
    lane_items: &'a [Vec<ItemId>],
}

impl<'a> Snapshot<'a> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Latest `end` over all items, the right edge of a scrolling window.
    pub fn latest_end(&self) -> Option<OffsetDateTime> {
        self.items.iter().map(|item| item.end.max(item.start)).max()
    }

    /// Items on one lane, in arrival order.
    ///
    /// Walks the lane's own index, so a full redraw touches every item
    /// once regardless of the number of lanes.
    pub fn lane_items(&self, lane_id: LaneId) -> impl Iterator<Item = &'a Item> + 'a {
        let items = self.items;
        let ids = self.lane_items.get(lane_id).map(Vec::as_slice).unwrap_or_default();
        ids.iter().filter_map(move |&id| items.get(id))
    }
}
