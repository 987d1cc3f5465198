//! Server-Sent Events stream.
//!
//! Emits a per-commodity `update` frame every second and folds a `news`
//! frame in every fifth emission. The stream ends cleanly when the client
//! disconnects.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;

use crate::state::ServerState;

const UPDATE_PERIOD: Duration = Duration::from_millis(1000);
const NEWS_EVERY_NTH_FRAME: u64 = 5;

pub async fn sse_stream(
    State(state): State<ServerState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let sim = state.sim.clone();

    let stream = futures::stream::unfold(0u64, move |frame| {
        let sim = sim.clone();
        async move {
            tokio::time::sleep(UPDATE_PERIOD).await;

            let payload = if frame % NEWS_EVERY_NTH_FRAME == NEWS_EVERY_NTH_FRAME - 1 {
                json!({
                    "type": "news",
                    "events": sim.recent_news(5),
                })
            } else {
                sim.stream_update_json()
            };

            let event = Event::default().data(payload.to_string());
            Some((Ok(event), frame + 1))
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
