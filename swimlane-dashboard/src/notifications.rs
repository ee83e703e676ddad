//! Exception notifications written as standalone HTML documents.
//!
//! Each notification becomes `<dir>/<seq>-<name>.html`. Sequence numbers
//! continue after the highest one already in the directory, so earlier
//! runs are never overwritten. Files are written on tokio's blocking pool;
//! the returned `file://` link is shown in the dashboard's log pane.

use std::path::{Path, PathBuf};

use swimlane_core::events::Notification;
use swimlane_core::framework::NotificationSink;
use tokio::task::JoinHandle;

/// A notification handed to the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenNotification {
    pub name: String,
    pub path: PathBuf,
    pub link: String,
}

pub struct HtmlDirectorySink {
    dir: PathBuf,
    next_seq: u32,
    written: Vec<WrittenNotification>,
    pending: Vec<JoinHandle<()>>,
}

impl HtmlDirectorySink {
    /// Create `dir` if needed and continue its numbering.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        let dir = std::fs::canonicalize(dir.as_ref())?;
        let next_seq = highest_seq(&dir)?.map_or(1, |seq| seq.saturating_add(1));
        tracing::debug!(dir = %dir.display(), next_seq, "Exception directory ready");

        Ok(Self {
            dir,
            next_seq,
            written: Vec::new(),
            pending: Vec::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn written(&self) -> &[WrittenNotification] {
        &self.written
    }

    /// Wait for every queued write to finish.
    pub async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Exception writer task failed");
            }
        }
    }
}

impl NotificationSink for HtmlDirectorySink {
    fn notify(&mut self, notification: Notification) -> Option<String> {
        let file_name = format!("{:04}-{}.html", self.next_seq, sanitize(&notification.name));
        self.next_seq = self.next_seq.saturating_add(1);
        let path = self.dir.join(file_name);
        let link = format!("file://{}", path.display());

        self.pending.retain(|handle| !handle.is_finished());
        let target = path.clone();
        let detail = notification.detail;
        let write = move || {
            if let Err(e) = std::fs::write(&target, detail) {
                tracing::error!(
                    path = %target.display(),
                    error = %e,
                    "Failed to write exception details"
                );
            }
        };
        match tokio::runtime::Handle::try_current() {
            Ok(runtime) => self.pending.push(runtime.spawn_blocking(write)),
            Err(_) => write(),
        }

        tracing::info!(
            name = %notification.name,
            task = notification.task.as_ref().map(|t| t.as_str()),
            link = %link,
            "Exception raised"
        );
        self.written.push(WrittenNotification {
            name: notification.name,
            path,
            link: link.clone(),
        });
        Some(link)
    }
}

/// Highest `<seq>-*.html` prefix in `dir`.
fn highest_seq(dir: &Path) -> std::io::Result<Option<u32>> {
    let mut highest = None;
    for entry in std::fs::read_dir(dir)? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.ends_with(".html") {
            continue;
        }
        let seq = name
            .split_once('-')
            .and_then(|(prefix, _)| prefix.parse::<u32>().ok());
        highest = highest.max(seq);
    }
    Ok(highest)
}

/// Keep a file-name friendly version of an exception name.
fn sanitize(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "exception".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swimlane_sdk::objects::TaskId;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("swimlane-test-{}", uuid::Uuid::new_v4()))
    }

    fn exception(name: &str, detail: &str) -> Notification {
        Notification {
            name: name.to_string(),
            detail: detail.to_string(),
            task: Some(TaskId::new("1")),
        }
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("ValueError"), "ValueError");
        assert_eq!(sanitize("aiohttp.ClientError"), "aiohttp.ClientError");
        assert_eq!(sanitize("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize(""), "exception");
        assert_eq!(sanitize("..."), "exception");
    }

    #[tokio::test]
    async fn test_notifications_are_written_in_order() {
        let dir = temp_dir();
        let mut sink = HtmlDirectorySink::open(&dir).unwrap();
        let dir = sink.dir().to_path_buf();

        let link = sink.notify(exception("ValueError", "<pre>bad value</pre>"));
        sink.notify(exception("Timeout Error", "<pre>timeout</pre>"));
        sink.flush().await;

        let written = sink.written();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].path, dir.join("0001-ValueError.html"));
        assert_eq!(written[1].path, dir.join("0002-Timeout_Error.html"));
        assert_eq!(
            link,
            Some(format!("file://{}", dir.join("0001-ValueError.html").display()))
        );
        assert_eq!(
            std::fs::read_to_string(&written[0].path).unwrap(),
            "<pre>bad value</pre>"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[tokio::test]
    async fn test_numbering_continues_across_runs() {
        let dir = temp_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("0007-KeyError.html"), "old").unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let mut sink = HtmlDirectorySink::open(&dir).unwrap();
        sink.notify(exception("KeyError", "new"));
        sink.flush().await;

        let dir = sink.dir().to_path_buf();
        assert_eq!(sink.written()[0].path, dir.join("0008-KeyError.html"));
        assert_eq!(
            std::fs::read_to_string(dir.join("0007-KeyError.html")).unwrap(),
            "old"
        );

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_writes_inline_without_runtime() {
        let dir = temp_dir();
        let mut sink = HtmlDirectorySink::open(&dir).unwrap();
        sink.notify(exception("ValueError", "inline"));

        let path = &sink.written()[0].path;
        assert_eq!(std::fs::read_to_string(path).unwrap(), "inline");

        std::fs::remove_dir_all(sink.dir()).unwrap();
    }

    #[test]
    fn test_open_fails_on_a_file() {
        let dir = temp_dir();
        std::fs::write(&dir, "not a directory").unwrap();

        assert!(HtmlDirectorySink::open(&dir).is_err());

        std::fs::remove_file(&dir).unwrap();
    }
}
