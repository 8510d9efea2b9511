//! Server-sent presentation events

use crate::api::schemas::EventPayload;
use crate::core::events::EventBus;
use async_stream::stream;
use axum::response::Sse;
use axum::response::sse::{Event, KeepAlive};
use di_axum::Inject;
use futures_util::Stream;
use log::{error, warn};
use std::convert::Infallible;
use tokio::sync::broadcast::error::RecvError;

pub(crate) async fn subscribe(
    Inject(events): Inject<EventBus>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let mut receiver = events.subscribe();

    let stream = stream! {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let name = event.name();
                    match Event::default().event(name).json_data(EventPayload::from(event)) {
                        Ok(sse_event) => yield Ok::<_, Infallible>(sse_event),
                        Err(e) => error!("failed to encode {name}: {e}"),
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!("event subscriber skipped {skipped} events"),
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
