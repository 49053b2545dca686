//! SSE endpoint for dashboard live updates

use axum::extract::State;
use axum::response::sse::{Event, Sse};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /events
///
/// Streams `lead-assigned`, `lead-status-changed`, `lead-completed` and
/// `lead-deleted` events to connected dashboards.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    state.events.handle_sse_connection()
}
