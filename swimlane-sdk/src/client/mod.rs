//! WebSocket client for the request event stream.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the wire types do not pull in `tokio-tungstenite`.

mod stream;

pub use stream::{StreamClient, StreamCloser, StreamConnection};

/// Errors produced by the stream client.
///
/// These are connection-level failures; they never touch the dashboard's
/// timeline state.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Handshake or socket failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// The endpoint could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// The endpoint is not a `ws://` or `wss://` URL.
    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),
}
