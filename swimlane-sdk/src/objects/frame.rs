//! Transport-agnostic view of a streaming connection.
//!
//! The client maps raw WebSocket messages into [`StreamFrame`]s so that the
//! session logic in `swimlane-core` can be driven by any
//! `Stream<Item = StreamFrame>`, including in-memory streams in tests.

/// One observable step of a streaming connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// The connection has been established.
    Open,
    /// A text message carrying one JSON event.
    Text(String),
    /// A binary message. Decoded like text; invalid UTF-8 is a decode
    /// error, not a transport error.
    Binary(Vec<u8>),
    /// The peer closed the connection (or the stream ended).
    Closed {
        /// WebSocket close code, if the peer sent one.
        code: Option<u16>,
        /// Close reason, empty if none was given.
        reason: String,
    },
    /// A transport-level failure. The connection may still be usable.
    Error(String),
}

impl StreamFrame {
    /// Shorthand for a close frame without code or reason.
    pub fn closed() -> Self {
        Self::Closed {
            code: None,
            reason: String::new(),
        }
    }
}
