//! Connection driver.
//!
//! Connects a [`StreamClient`], feeds its frames into a [`Session`] and,
//! when `shutdown` resolves, politely unsubscribes from the producer.

use std::future::Future;
use std::time::Duration;

use swimlane_core::framework::{ChartRenderer, NotificationSink};
use swimlane_core::processors::Session;
use swimlane_sdk::client::{ClientError, StreamClient};

/// How long to wait for the producer to acknowledge a close request.
pub const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Run one streaming session to completion.
///
/// Returns once the producer closes the connection or `shutdown`
/// resolves. Only connection setup errors are returned; everything that
/// happens on an open connection is handled by the session.
pub async fn run_dashboard<R, N, F>(
    client: &StreamClient,
    session: &mut Session<R, N>,
    shutdown: F,
) -> Result<(), ClientError>
where
    R: ChartRenderer,
    N: NotificationSink,
    F: Future<Output = ()>,
{
    tracing::info!(url = %client.url(), "Connecting to event stream");
    let connection = client.connect().await?;
    let (closer, frames) = connection.split();

    let closing = async move {
        shutdown.await;
        tracing::info!("Unsubscribing from event stream");
        if let Err(e) = closer.close().await {
            tracing::warn!(error = %e, "Failed to send close request");
        }
        tokio::time::sleep(CLOSE_GRACE).await;
    };

    let closed_by_peer = tokio::select! {
        _ = session.run(frames) => true,
        _ = closing => false,
    };

    if !closed_by_peer {
        tracing::warn!(
            grace_secs = CLOSE_GRACE.as_secs(),
            "Producer did not acknowledge close request"
        );
        session.on_close(None, "close request not acknowledged");
    }

    Ok(())
}
