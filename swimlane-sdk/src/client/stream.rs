use futures_util::stream::{self, BoxStream, SplitSink};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use url::Url;

use super::ClientError;
use crate::objects::StreamFrame;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Text frame the producer interprets as "unsubscribe me".
const CLOSE_REQUEST: &str = "close";

/// Typed client for the dashboard event stream.
#[derive(Debug, Clone)]
pub struct StreamClient {
    url: Url,
}

impl StreamClient {
    /// Create a new `StreamClient` for a `ws://` or `wss://` endpoint.
    pub fn new(url: Url) -> Result<Self, ClientError> {
        match url.scheme() {
            "ws" | "wss" => Ok(Self { url }),
            other => Err(ClientError::UnsupportedScheme(other.to_string())),
        }
    }

    /// Parse `url` and create a client for it.
    pub fn parse(url: &str) -> Result<Self, ClientError> {
        Self::new(Url::parse(url)?)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Open the WebSocket connection.
    pub async fn connect(&self) -> Result<StreamConnection, ClientError> {
        let (socket, response) = tokio_tungstenite::connect_async(self.url.as_str()).await?;
        tracing::debug!(url = %self.url, status = %response.status(), "Stream handshake complete");
        Ok(StreamConnection { socket })
    }
}

/// An open stream connection.
pub struct StreamConnection {
    socket: Socket,
}

impl StreamConnection {
    /// Split into a closer handle and a stream of [`StreamFrame`]s.
    ///
    /// The frame stream starts with [`StreamFrame::Open`] and always ends
    /// with a [`StreamFrame::Closed`], even when the socket drops without a
    /// close frame.
    pub fn split(self) -> (StreamCloser, BoxStream<'static, StreamFrame>) {
        let (sink, source) = self.socket.split();

        let frames = stream::once(async { StreamFrame::Open })
            .chain(source.filter_map(|message| async move { to_frame(message) }))
            .chain(stream::once(async { StreamFrame::closed() }))
            .boxed();

        (StreamCloser { sink }, frames)
    }
}

/// Write half of a connection, used only to close it politely.
pub struct StreamCloser {
    sink: SplitSink<Socket, Message>,
}

impl StreamCloser {
    /// Ask the producer to drop this subscriber, then send a close frame.
    pub async fn close(mut self) -> Result<(), ClientError> {
        self.sink.send(Message::Text(CLOSE_REQUEST.into())).await?;
        self.sink.close().await?;
        Ok(())
    }
}

fn to_frame(message: Result<Message, tungstenite::Error>) -> Option<StreamFrame> {
    match message {
        Ok(Message::Text(text)) => Some(StreamFrame::Text(text.to_string())),
        Ok(Message::Binary(bytes)) => Some(StreamFrame::Binary(bytes.into())),
        Ok(Message::Close(frame)) => Some(match frame {
            Some(frame) => StreamFrame::Closed {
                code: Some(frame.code.into()),
                reason: frame.reason.to_string(),
            },
            None => StreamFrame::closed(),
        }),
        Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_)) => None,
        Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
            Some(StreamFrame::closed())
        }
        Err(e) => Some(StreamFrame::Error(e.to_string())),
    }
}
