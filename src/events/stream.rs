//! One viewer's long-lived event stream.
//!
//! LIFECYCLE
//! =========
//! 1. Write `: connected` so the client sees the stream open before any event.
//! 2. Loop over shutdown, client disconnect, heartbeat tick, and the
//!    subscription. Events are written as `data: <json>` frames; the tick
//!    writes a `: ping` comment to keep idle proxies from closing the
//!    connection.
//! 3. On any exit path the subscription is cancelled.
//!
//! The session writes into a bounded channel whose receiver is the HTTP
//! response body. Dropping the body closes the channel, which is how the
//! session learns the client went away.

use std::time::Duration;

use axum::body::Bytes;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::Subscription;

pub const CONNECTED_FRAME: &[u8] = b": connected\n\n";
pub const PING_FRAME: &[u8] = b": ping\n\n";
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(25);

/// Frame one serialized event.
#[must_use]
pub fn data_frame(json: &str) -> Bytes {
    Bytes::from(format!("data: {json}\n\n"))
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The transport receiver was dropped.
    ClientGone,
    /// The subscription was cancelled and drained.
    Unsubscribed,
    /// Process shutdown.
    Shutdown,
}

#[derive(Debug)]
pub struct StreamSession {
    subscription: Subscription,
    heartbeat: Duration,
    shutdown: CancellationToken,
}

impl StreamSession {
    #[must_use]
    pub fn new(subscription: Subscription, heartbeat: Duration, shutdown: CancellationToken) -> Self {
        Self { subscription, heartbeat, shutdown }
    }

    /// Relay events into `transport` until the client leaves, the
    /// subscription closes, or shutdown is signalled.
    pub async fn serve(self, transport: mpsc::Sender<Bytes>) -> SessionEnd {
        let Self { mut subscription, heartbeat, shutdown } = self;
        let board_id = subscription.board_id();
        tracing::info!(%board_id, "stream session opened");

        let end = match write(&transport, &shutdown, Bytes::from_static(CONNECTED_FRAME)).await {
            Ok(()) => relay(&mut subscription, &transport, &shutdown, heartbeat).await,
            Err(end) => end,
        };

        subscription.cancel();
        tracing::info!(%board_id, reason = ?end, "stream session closed");
        end
    }
}

async fn relay(
    subscription: &mut Subscription,
    transport: &mpsc::Sender<Bytes>,
    shutdown: &CancellationToken,
    heartbeat: Duration,
) -> SessionEnd {
    let mut ticker = tokio::time::interval_at(Instant::now() + heartbeat, heartbeat);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let frame = tokio::select! {
            biased;
            () = shutdown.cancelled() => return SessionEnd::Shutdown,
            () = transport.closed() => return SessionEnd::ClientGone,
            message = subscription.recv() => match message {
                Some(json) => data_frame(&json),
                None => return SessionEnd::Unsubscribed,
            },
            _ = ticker.tick() => Bytes::from_static(PING_FRAME),
        };

        if let Err(end) = write(transport, shutdown, frame).await {
            return end;
        }
    }
}

/// Waits for room in the transport, giving up on shutdown or disconnect.
async fn write(transport: &mpsc::Sender<Bytes>, shutdown: &CancellationToken, frame: Bytes) -> Result<(), SessionEnd> {
    tokio::select! {
        biased;
        () = shutdown.cancelled() => Err(SessionEnd::Shutdown),
        sent = transport.send(frame) => sent.map_err(|_| SessionEnd::ClientGone),
    }
}

#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;
