//! Bounded log of user-visible diagnostics.
//!
//! This is the on-screen log of the dashboard: connection lifecycle,
//! dropped messages and transport errors. It keeps at most `capacity`
//! entries and evicts the oldest first.

use std::collections::VecDeque;

use time::OffsetDateTime;

/// Default number of retained entries.
pub const DEFAULT_DIAGNOSTIC_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticLevel::Info => write!(f, "info"),
            DiagnosticLevel::Warn => write!(f, "warn"),
            DiagnosticLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub at: OffsetDateTime,
    pub level: DiagnosticLevel,
    pub message: String,
    /// Where more detail can be found, e.g. a stored exception document.
    pub link: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    entries: VecDeque<Diagnostic>,
    capacity: usize,
    evicted: u64,
}

impl DiagnosticLog {
    /// Create a log keeping at most `capacity` entries (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn push(&mut self, level: DiagnosticLevel, message: impl Into<String>) {
        self.push_entry(level, message.into(), None);
    }

    /// Push an entry that points at more detail.
    pub fn push_link(
        &mut self,
        level: DiagnosticLevel,
        message: impl Into<String>,
        link: impl Into<String>,
    ) {
        self.push_entry(level, message.into(), Some(link.into()));
    }

    fn push_entry(&mut self, level: DiagnosticLevel, message: String, link: Option<String>) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }
        self.entries.push_back(Diagnostic {
            at: OffsetDateTime::now_utc(),
            level,
            message,
            link,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(DiagnosticLevel::Error, message);
    }

    /// Entries from oldest to newest.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &Diagnostic> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&Diagnostic> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries dropped to stay within capacity.
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    /// Number of entries ever pushed, evicted ones included.
    ///
    /// Readers that poll the log remember this value to find the entries
    /// added since their last look.
    pub fn total(&self) -> u64 {
        self.evicted + self.entries.len() as u64
    }

    /// Entries pushed after the reader saw `seen` of them, oldest first.
    ///
    /// Entries already evicted are skipped.
    pub fn since(&self, seen: u64) -> impl Iterator<Item = &Diagnostic> {
        let fresh = self.total().saturating_sub(seen).min(self.entries.len() as u64) as usize;
        self.entries.iter().skip(self.entries.len() - fresh)
    }
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_DIAGNOSTIC_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_first() {
        let mut log = DiagnosticLog::with_capacity(2);
        log.info("one");
        log.warn("two");
        log.error("three");

        let messages: Vec<_> = log.entries().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["two", "three"]);
        assert_eq!(log.evicted(), 1);
        assert_eq!(log.last().unwrap().level, DiagnosticLevel::Error);
    }

    #[test]
    fn test_since_returns_new_entries() {
        let mut log = DiagnosticLog::with_capacity(3);
        log.info("a");
        let seen = log.total();
        log.warn("b");
        log.push_link(DiagnosticLevel::Warn, "c", "file:///tmp/c.html");

        let fresh: Vec<_> = log.since(seen).map(|d| d.message.as_str()).collect();
        assert_eq!(fresh, vec!["b", "c"]);
        assert_eq!(log.last().unwrap().link.as_deref(), Some("file:///tmp/c.html"));
        assert_eq!(log.total(), 3);

        // More new entries than capacity: only the retained ones come back.
        let seen = log.total();
        for message in ["d", "e", "f", "g"] {
            log.info(message);
        }
        let fresh: Vec<_> = log.since(seen).map(|d| d.message.as_str()).collect();
        assert_eq!(fresh, vec!["e", "f", "g"]);
        assert_eq!(log.since(log.total()).count(), 0);
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let mut log = DiagnosticLog::with_capacity(0);
        log.info("a");
        log.info("b");
        assert_eq!(log.len(), 1);
        assert_eq!(log.last().unwrap().message, "b");
    }
}
