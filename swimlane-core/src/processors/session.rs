//! Session: the connection supervisor.
//!
//! A Session owns everything one dashboard needs for a streaming
//! connection: the timeline model, the mapper, the render scheduler, the
//! notification sink and the diagnostic log. Nothing is global; a second
//! dashboard is a second Session.
//!
//! Each inbound message runs to completion before the next one is looked
//! at, in this order:
//!
//! 1. decode (`swimlane_sdk::StreamEvent::decode`, or `decode_bytes` for
//!    binary frames)
//! 2. map ([`EventMapper`])
//! 3. apply to the model or forward to the sink
//! 4. notify the scheduler
//!
//! Per-message failures are logged and recorded in the diagnostic log; they
//! never leave the session and never leave the model half-updated.

use futures_util::{Stream, StreamExt};
use kanau::processor::Processor;
use swimlane_sdk::objects::{DecodeError, StreamEvent, StreamFrame};
use tracing::{debug, error, info, warn};

use super::event_mapper::EventMapper;
use super::render_scheduler::RenderScheduler;
use crate::diagnostics::{DiagnosticLevel, DiagnosticLog};
use crate::entities::{ItemId, LaneId, TimelineModel};
use crate::events::MappedEvent;
use crate::framework::{ChartRenderer, NotificationSink};

/// Lifecycle of the underlying connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Created, no open frame seen yet.
    Connecting,
    Open,
    /// Closed. The model is kept for inspection but no longer updated.
    Disconnected,
}

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    Appended { lane_id: LaneId, item_id: ItemId },
    Notified,
    Ignored,
    /// Malformed, unclassifiable, or received after close.
    Dropped,
}

/// Per-session message counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub messages: u64,
    pub appended: u64,
    pub notified: u64,
    pub ignored: u64,
    pub decode_errors: u64,
    pub classification_errors: u64,
    pub transport_errors: u64,
}

pub struct Session<R, N> {
    model: TimelineModel,
    mapper: EventMapper,
    scheduler: RenderScheduler<R>,
    sink: N,
    diagnostics: DiagnosticLog,
    state: ConnectionState,
    stats: SessionStats,
}

impl<R, N> Session<R, N>
where
    R: ChartRenderer,
    N: NotificationSink,
{
    pub fn new(mapper: EventMapper, scheduler: RenderScheduler<R>, sink: N) -> Self {
        Self {
            model: TimelineModel::new(),
            mapper,
            scheduler,
            sink,
            diagnostics: DiagnosticLog::default(),
            state: ConnectionState::Connecting,
            stats: SessionStats::default(),
        }
    }

    /// Replace the diagnostic log, e.g. to change its capacity.
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticLog) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Drive the session from a stream of frames until the connection
    /// closes.
    ///
    /// Messages and redraw ticks are interleaved on the calling task. The
    /// loop ends on the first [`StreamFrame::Closed`] or when the stream
    /// runs dry, in both cases after [`on_close`](Self::on_close).
    pub async fn run<S>(&mut self, mut frames: S)
    where
        S: Stream<Item = StreamFrame> + Unpin,
    {
        loop {
            tokio::select! {
                frame = frames.next() => match frame {
                    Some(StreamFrame::Open) => self.on_open(),
                    Some(StreamFrame::Text(text)) => {
                        self.on_message(&text).await;
                    }
                    Some(StreamFrame::Binary(bytes)) => {
                        self.on_binary(&bytes).await;
                    }
                    Some(StreamFrame::Error(e)) => self.on_error(&e),
                    Some(StreamFrame::Closed { code, reason }) => {
                        self.on_close(code, &reason);
                        break;
                    }
                    None => {
                        self.on_close(None, "stream ended");
                        break;
                    }
                },

                _ = self.scheduler.tick() => self.render_tick(),
            }
        }
    }

    pub fn on_open(&mut self) {
        self.state = ConnectionState::Open;
        info!("Stream connection open");
        self.diagnostics.info("connection open");
    }

    /// Process one text message.
    pub async fn on_message(&mut self, text: &str) -> MessageOutcome {
        if !self.accept_message() {
            return MessageOutcome::Dropped;
        }
        self.apply(StreamEvent::decode(text)).await
    }

    /// Process one binary message.
    pub async fn on_binary(&mut self, bytes: &[u8]) -> MessageOutcome {
        if !self.accept_message() {
            return MessageOutcome::Dropped;
        }
        self.apply(StreamEvent::decode_bytes(bytes)).await
    }

    fn accept_message(&mut self) -> bool {
        self.stats.messages += 1;

        if self.state == ConnectionState::Disconnected {
            warn!("Message received after close, dropping");
            self.diagnostics.warn("message received after close dropped");
            return false;
        }
        true
    }

    async fn apply(&mut self, decoded: Result<StreamEvent, DecodeError>) -> MessageOutcome {
        let event = match decoded {
            Ok(event) => event,
            Err(e) => {
                self.stats.decode_errors += 1;
                warn!(error = %e, "Failed to decode stream message");
                self.diagnostics.warn(format!("malformed message dropped: {e}"));
                return MessageOutcome::Dropped;
            }
        };

        let kind = event.kind().to_string();
        let mapped = match self.mapper.process(event).await {
            Ok(mapped) => mapped,
            Err(e) => {
                self.stats.classification_errors += 1;
                warn!(kind = %kind, error = %e, "Failed to classify stream event");
                self.diagnostics.warn(format!("{kind} event dropped: {e}"));
                return MessageOutcome::Dropped;
            }
        };

        match mapped {
            MappedEvent::Item(draft) => {
                let lane_id = self.model.get_or_create_lane(&draft.task);
                debug!(task = %draft.task, lane_id, status = %draft.status_class, "Appending request");
                let item_id = self.model.append_item(draft.into_insert(lane_id));
                self.stats.appended += 1;
                if !self.scheduler.is_streaming() {
                    self.scheduler.renderer_mut().diagnostics(&self.diagnostics);
                }
                self.scheduler.on_data(self.model.snapshot());
                MessageOutcome::Appended { lane_id, item_id }
            }
            MappedEvent::Notification(notification) => {
                debug!(name = %notification.name, "Forwarding exception notification");
                let message = format!("exception {}", notification.name);
                match self.sink.notify(notification) {
                    Some(link) => self.diagnostics.push_link(DiagnosticLevel::Warn, message, link),
                    None => self.diagnostics.warn(message),
                }
                self.stats.notified += 1;
                MessageOutcome::Notified
            }
            MappedEvent::Ignored => {
                debug!(kind = %kind, "Ignoring stream event");
                self.stats.ignored += 1;
                MessageOutcome::Ignored
            }
        }
    }

    /// Stop redraws and mark the session disconnected.
    pub fn on_close(&mut self, code: Option<u16>, reason: &str) {
        self.scheduler.stop();
        if self.state == ConnectionState::Disconnected {
            return;
        }
        self.state = ConnectionState::Disconnected;

        info!(?code, reason, items = self.model.items().len(), "Stream connection closed");
        self.diagnostics.info(match code {
            Some(code) => format!("connection closed ({code}) {reason}"),
            None => format!("connection closed {reason}"),
        });
    }

    /// Surface a transport error. Does not close or reopen anything.
    pub fn on_error(&mut self, message: &str) {
        self.stats.transport_errors += 1;
        error!(error = message, "Stream transport error");
        self.diagnostics.error(format!("transport error: {message}"));
    }

    /// Redraw with the current snapshot. Called on every scheduler tick.
    pub fn render_tick(&mut self) {
        if self.scheduler.is_streaming() {
            self.scheduler.renderer_mut().diagnostics(&self.diagnostics);
        }
        self.scheduler.render(self.model.snapshot());
    }

    /// Discard all lanes and items.
    pub fn reset(&mut self) {
        self.model.clear();
        info!("Timeline cleared");
        self.diagnostics.info("timeline cleared");
    }

    pub fn model(&self) -> &TimelineModel {
        &self.model
    }

    pub fn scheduler(&self) -> &RenderScheduler<R> {
        &self.scheduler
    }

    pub fn renderer(&self) -> &R {
        self.scheduler.renderer()
    }

    pub fn sink(&self) -> &N {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.diagnostics
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}
