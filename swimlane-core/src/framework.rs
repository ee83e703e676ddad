//! Seams to the external collaborators of the pipeline.

use crate::config::ChartConfig;
use crate::diagnostics::DiagnosticLog;
use crate::entities::Snapshot;
use crate::events::Notification;

/// The swimlane chart component.
///
/// The pipeline never draws anything itself: it hands the full current
/// snapshot to a renderer, once on mount and then on every scheduled
/// redraw. Renderers only read the snapshot.
pub trait ChartRenderer {
    /// First draw after the stream started delivering data.
    fn mount(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>);

    /// Incremental redraw with the latest snapshot.
    fn update(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>);

    /// Latest state of the diagnostic log, delivered right before every
    /// mount and update. Renderers without a log pane ignore it.
    fn diagnostics(&mut self, _log: &DiagnosticLog) {}
}

/// Receives exception notifications, one list entry per notification.
pub trait NotificationSink {
    /// Store one notification. Returns a link to the stored detail when
    /// the sink has one.
    fn notify(&mut self, notification: Notification) -> Option<String>;
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for Box<R> {
    fn mount(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>) {
        (**self).mount(chart, snapshot);
    }

    fn update(&mut self, chart: &ChartConfig, snapshot: Snapshot<'_>) {
        (**self).update(chart, snapshot);
    }

    fn diagnostics(&mut self, log: &DiagnosticLog) {
        (**self).diagnostics(log);
    }
}

impl<N: NotificationSink + ?Sized> NotificationSink for Box<N> {
    fn notify(&mut self, notification: Notification) -> Option<String> {
        (**self).notify(notification)
    }
}
