use swimlane_sdk::objects::TaskId;

use crate::framework::NotificationSink;

/// An exception raised by a scraping task.
///
/// Transient: it is never stored in the timeline model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Exception class name, shown as the link text.
    pub name: String,
    /// HTML document shown when the entry is opened.
    pub detail: String,
    pub task: Option<TaskId>,
}

/// In-memory notification list.
#[derive(Debug, Clone, Default)]
pub struct NotificationList {
    entries: Vec<Notification>,
}

impl NotificationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl NotificationSink for NotificationList {
    fn notify(&mut self, notification: Notification) -> Option<String> {
        self.entries.push(notification);
        None
    }
}
