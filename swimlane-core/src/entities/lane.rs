use swimlane_sdk::objects::TaskId;

/// Index of a lane, assigned in first-seen order starting at 0.
pub type LaneId = usize;

/// A horizontal track holding every request of one scraping task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub id: LaneId,
    /// The task that produced the requests on this lane.
    pub label: TaskId,
}
