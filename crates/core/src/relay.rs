//! Delivery of slide and message events from the tutor to the web relay.
//!
//! Events are queued on a [`SlideDispatcher`] and delivered by a single
//! background task, so the relay receives them in the order they were
//! dispatched. Delivery is best-effort: failures and timeouts are logged and
//! the event is dropped.

use crate::slide::SlideEvent;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Message type used for lines the tutor speaks.
pub const AGENT_SPEECH: &str = "agent-speech";

/// An event addressed to every client in a room.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    Slide {
        room: String,
        slide: SlideEvent,
    },
    Message {
        room: String,
        message: String,
        kind: String,
    },
}

impl RelayEvent {
    pub fn room(&self) -> &str {
        match self {
            RelayEvent::Slide { room, .. } | RelayEvent::Message { room, .. } => room,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SlideUpdateBody<'a> {
    room_name: &'a str,
    slide_data: &'a SlideEvent,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageBody<'a> {
    room_name: &'a str,
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Sends a single event to the relay.
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn send(&self, event: &RelayEvent) -> Result<()>;
}

/// A `RelayClient` that POSTs events to the relay's agent endpoints.
pub struct HttpRelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRelayClient {
    /// Creates a client whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build relay HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn send(&self, event: &RelayEvent) -> Result<()> {
        let request = match event {
            RelayEvent::Slide { room, slide } => self
                .client
                .post(format!("{}/api/agent/slide-update", self.base_url))
                .json(&SlideUpdateBody {
                    room_name: room,
                    slide_data: slide,
                }),
            RelayEvent::Message {
                room,
                message,
                kind,
            } => self
                .client
                .post(format!("{}/api/agent/message", self.base_url))
                .json(&MessageBody {
                    room_name: room,
                    message,
                    kind,
                }),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            bail!("Relay responded with status {}", response.status());
        }
        Ok(())
    }
}

/// An ordered, fire-and-forget queue in front of a [`RelayClient`].
#[derive(Clone)]
pub struct SlideDispatcher {
    tx: mpsc::UnboundedSender<RelayEvent>,
}

impl SlideDispatcher {
    /// Spawns the delivery task. It runs until every dispatcher clone is dropped.
    pub fn spawn(client: Arc<dyn RelayClient>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<RelayEvent>();
        let handle = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match client.send(&event).await {
                    Ok(()) => debug!(room = %event.room(), "Delivered event to relay"),
                    Err(e) => warn!(room = %event.room(), error = ?e, "Dropped relay event"),
                }
            }
        });
        (Self { tx }, handle)
    }

    pub fn dispatch(&self, event: RelayEvent) {
        if self.tx.send(event).is_err() {
            warn!("Relay delivery task has stopped; event dropped.");
        }
    }

    pub fn slide(&self, room: &str, slide: SlideEvent) {
        self.dispatch(RelayEvent::Slide {
            room: room.to_string(),
            slide,
        });
    }

    pub fn message(&self, room: &str, message: impl Into<String>) {
        self.dispatch(RelayEvent::Message {
            room: room.to_string(),
            message: message.into(),
            kind: AGENT_SPEECH.to_string(),
        });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Records every event it is asked to send; optionally fails some of them.
    #[derive(Default)]
    pub struct RecordingRelay {
        pub events: Mutex<Vec<RelayEvent>>,
        pub fail_rooms: Vec<String>,
    }

    #[async_trait]
    impl RelayClient for RecordingRelay {
        async fn send(&self, event: &RelayEvent) -> Result<()> {
            if self.fail_rooms.iter().any(|r| r == event.room()) {
                bail!("simulated relay failure");
            }
            self.events.lock().await.push(event.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingRelay;
    use super::*;
    use crate::slide::SlideKind;

    fn slide(title: &str) -> SlideEvent {
        SlideEvent {
            kind: SlideKind::Content,
            title: title.to_string(),
            content: vec![],
            chart_series: None,
            process_steps: None,
            emitted_at: 0,
        }
    }

    #[tokio::test]
    async fn delivers_in_dispatch_order() {
        let relay = Arc::new(RecordingRelay::default());
        let (dispatcher, handle) = SlideDispatcher::spawn(relay.clone());

        for i in 0..20 {
            dispatcher.slide("room-a", slide(&format!("slide {i}")));
        }
        drop(dispatcher);
        handle.await.unwrap();

        let events = relay.events.lock().await;
        let titles: Vec<_> = events
            .iter()
            .map(|e| match e {
                RelayEvent::Slide { slide, .. } => slide.title.clone(),
                other => panic!("unexpected event {other:?}"),
            })
            .collect();
        let expected: Vec<_> = (0..20).map(|i| format!("slide {i}")).collect();
        assert_eq!(titles, expected);
    }

    #[tokio::test]
    async fn failures_are_dropped_and_delivery_continues() {
        let relay = Arc::new(RecordingRelay {
            fail_rooms: vec!["broken".to_string()],
            ..Default::default()
        });
        let (dispatcher, handle) = SlideDispatcher::spawn(relay.clone());

        dispatcher.message("broken", "lost");
        dispatcher.message("ok", "kept");
        drop(dispatcher);
        handle.await.unwrap();

        let events = relay.events.lock().await;
        assert_eq!(
            *events,
            vec![RelayEvent::Message {
                room: "ok".to_string(),
                message: "kept".to_string(),
                kind: AGENT_SPEECH.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn http_client_times_out_against_unresponsive_relay() {
        // A listener that accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let client =
            HttpRelayClient::new(format!("http://{addr}/"), Duration::from_millis(200)).unwrap();
        let started = std::time::Instant::now();
        let event = RelayEvent::Slide {
            room: "room".into(),
            slide: slide("late"),
        };
        assert!(client.send(&event).await.is_err());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn request_bodies_use_relay_field_names() {
        let body = serde_json::to_value(MessageBody {
            room_name: "r",
            message: "hi",
            kind: AGENT_SPEECH,
        })
        .unwrap();
        assert_eq!(body["roomName"], "r");
        assert_eq!(body["type"], "agent-speech");

        let s = slide("x");
        let body = serde_json::to_value(SlideUpdateBody {
            room_name: "r",
            slide_data: &s,
        })
        .unwrap();
        assert_eq!(body["slideData"]["title"], "x");
    }
}
