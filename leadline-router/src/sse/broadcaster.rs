//! SSE broadcaster for real-time dashboard updates
//!
//! One broadcast channel fans lead events out to every connected client.
//! Delivery is at-most-once: a slow client that overruns its buffer drops
//! events rather than backpressuring the assignment path. Events for the
//! same lead keep their order because all sends go through one channel.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use leadline_common::events::LeadEvent;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, info, warn};

/// Manages dashboard connections and event distribution
#[derive(Clone)]
pub struct EventBroadcaster {
    tx: broadcast::Sender<LeadEvent>,
}

impl EventBroadcaster {
    /// Create a new broadcaster
    ///
    /// `capacity` is the per-subscriber event buffer (100 is plenty for
    /// dashboard traffic).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        info!("Event broadcaster initialized with capacity {}", capacity);
        Self { tx }
    }

    /// Broadcast an event, ignoring whether any client is connected
    pub fn broadcast(&self, event: LeadEvent) {
        match self.tx.send(event) {
            Ok(count) => debug!("Broadcast event to {} client(s)", count),
            Err(_) => debug!("No dashboard clients connected, event dropped"),
        }
    }

    /// Current number of connected clients
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Create an SSE stream for a new client connection
    pub fn subscribe_stream(&self) -> impl Stream<Item = Result<Event, Infallible>> {
        let rx = self.tx.subscribe();
        let stream = BroadcastStream::new(rx);

        stream.filter_map(|result| async move {
            match result {
                Ok(lead_event) => {
                    let event = Event::default()
                        .event(lead_event.name())
                        .json_data(lead_event.payload())
                        .ok();
                    event.map(Ok)
                }
                Err(e) => {
                    // Lagged receiver: the client missed events, keep going
                    warn!("SSE client lagged: {:?}", e);
                    None
                }
            }
        })
    }

    /// Axum SSE response for GET /events
    pub fn handle_sse_connection(&self) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
        info!(
            "New SSE client connected, total clients: {}",
            self.client_count() + 1
        );

        Sse::new(self.subscribe_stream()).keep_alive(
            KeepAlive::new()
                .interval(Duration::from_secs(30))
                .text("keep-alive"),
        )
    }
}
