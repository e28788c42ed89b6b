//! Realtime progress stream (Server-Sent Events)

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tracing::{info, warn};

use super::user::CurrentUser;
use crate::state::AppState;

/// Create the realtime router
pub fn router() -> Router<AppState> {
    Router::new().route("/:event", get(subscribe))
}

/// Stream progress messages published under `event` for the calling user
async fn subscribe(
    State(state): State<AppState>,
    Path(event): Path<String>,
    CurrentUser(user): CurrentUser,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!(event = %event, user = %user, "Realtime subscriber connected");

    let stream = BroadcastStream::new(state.realtime().subscribe()).filter_map(move |msg| {
        let event = event.clone();
        let user = user.clone();
        async move {
            match msg {
                Ok(published) if published.matches(&event, &user) => Event::default()
                    .event(&event)
                    .json_data(published.message)
                    .ok()
                    .map(Ok),
                Ok(_) => None,
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Realtime subscriber lagged, events dropped");
                    None
                }
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
