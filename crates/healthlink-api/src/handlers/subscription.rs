//! Live subscription handlers.

use std::convert::Infallible;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use futures::{Stream, StreamExt};

use healthlink_auth::SubscriptionRequest;
use healthlink_realtime::LiveEvent;

use crate::dto::response::SubscribeResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    Json(requests): Json<Vec<SubscriptionRequest>>,
) -> ApiResult<Json<SubscribeResponse>> {
    let subscribe = state.subscriptions.subscribe(&requests).await?;
    Ok(Json(SubscribeResponse { subscribe }))
}

/// GET /api/subscribe/{ticket}
///
/// Streams `status`, `connection`, and `keepalive` events until the client
/// goes away. Dropping the stream releases the session's registrations.
pub async fn stream(
    State(state): State<AppState>,
    Path(ticket): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let session = state.subscriptions.open(&ticket).await?;
    let events = session.filter_map(|event| async move { to_sse(&event).map(Ok) });
    Ok(Sse::new(events))
}

fn to_sse(event: &LiveEvent) -> Option<Event> {
    match event.data() {
        Ok(data) => Some(Event::default().event(event.name()).data(data)),
        Err(e) => {
            tracing::warn!(event = event.name(), error = %e, "Dropping unserializable live event");
            None
        }
    }
}
