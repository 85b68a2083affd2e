// src/server/events.rs

//! Server-sent events for run progress.
//!
//! Instead of making clients poll `/api/runs/status`, a client can hold
//! `GET /api/runs/:run_id/events` open. The server re-reads the run's files
//! every `push_interval` and emits a `status` event whenever the snapshot
//! changes, closing the stream after the first terminal snapshot.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use futures::stream;
use tracing::debug;

use crate::engine::{Poller, RunSnapshot};

use super::AppState;
use super::error::ApiError;
use super::routes::{STATUS_FAILED, run_blocking};

enum Step {
    Emit(RunSnapshot),
    Watch(RunSnapshot),
    Done,
}

pub async fn stream_events(
    State(state): State<AppState>,
    Path(run_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let poller = Arc::clone(&state.poller);
    let first = {
        let poller = Arc::clone(&poller);
        run_blocking(move || poller.snapshot(Some(&run_id)))
            .await
            .map_err(|e| ApiError::new(STATUS_FAILED, e))?
    };

    let interval = state.push_interval;

    let events = stream::unfold(Step::Emit(first), move |step| {
        let poller = Arc::clone(&poller);
        async move { next_event(step, poller, interval).await }
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

async fn next_event(
    step: Step,
    poller: Arc<Poller>,
    interval: Duration,
) -> Option<(Result<Event, Infallible>, Step)> {
    match step {
        Step::Emit(snapshot) => Some(emit(snapshot)),
        Step::Watch(last) => loop {
            tokio::time::sleep(interval).await;
            let run_id = last.run_id;
            let poller = Arc::clone(&poller);
            match run_blocking(move || poller.snapshot_of(&run_id)).await {
                Ok(snapshot) if snapshot == last => continue,
                Ok(snapshot) => return Some(emit(snapshot)),
                Err(e) => {
                    debug!(run_id = %last.run_id, error = %e, "ending event stream");
                    let event = Event::default().event("error").data(e.to_string());
                    return Some((Ok(event), Step::Done));
                }
            }
        },
        Step::Done => None,
    }
}

fn emit(snapshot: RunSnapshot) -> (Result<Event, Infallible>, Step) {
    let event = Event::default()
        .event("status")
        .json_data(&snapshot)
        .unwrap_or_else(|e| Event::default().event("error").data(e.to_string()));

    let next = if snapshot.is_terminal() {
        Step::Done
    } else {
        Step::Watch(snapshot)
    };
    (Ok(event), next)
}
