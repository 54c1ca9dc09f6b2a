// src/util/io/transport.rs
//! Transport plumbing shared by the MQTT and serial listeners.
//!
//! Listeners run as their own tasks and push [`TransportEvent`]s into one
//! channel. A single ingest loop drains that channel and hands each event to a
//! [`MessageHandler`], so handlers see one event at a time and never need to
//! lock their own state.

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::util::io::payload::Payload;

#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Message { topic: String, payload: Payload },
}

pub type TransportReceiver = mpsc::UnboundedReceiver<TransportEvent>;
pub type TransportSender = mpsc::UnboundedSender<TransportEvent>;

pub fn channel() -> (TransportSender, TransportReceiver) {
    mpsc::unbounded_channel()
}

/// Forward an event to the ingest loop.
pub fn forward(events: &TransportSender, event: TransportEvent) -> Result<(), TransportError> {
    events.send(event).map_err(|_| TransportError::ChannelClosed)
}

/// Callbacks a transport drives, one per connection event.
pub trait MessageHandler {
    fn on_connect(&mut self);
    fn on_disconnect(&mut self);
    fn on_message(&mut self, topic: &str, payload: Payload);
}

pub fn dispatch<H: MessageHandler + ?Sized>(handler: &mut H, event: TransportEvent) {
    match event {
        TransportEvent::Connected => handler.on_connect(),
        TransportEvent::Disconnected => handler.on_disconnect(),
        TransportEvent::Message { topic, payload } => handler.on_message(&topic, payload),
    }
}

/// Process events until every sender is dropped. Returns the number of events
/// handled.
pub async fn run_ingest<H: MessageHandler + ?Sized>(
    events: &mut TransportReceiver,
    handler: &mut H,
) -> usize {
    info!("Ingest loop started");
    let mut processed = 0;

    while let Some(event) = events.recv().await {
        debug!(?event, "ingesting transport event");
        dispatch(handler, event);
        processed += 1;
    }

    info!("Ingest loop finished after {} events", processed);
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct RecordingHandler {
        calls: Vec<String>,
    }

    impl MessageHandler for RecordingHandler {
        fn on_connect(&mut self) {
            self.calls.push("connect".to_string());
        }

        fn on_disconnect(&mut self) {
            self.calls.push("disconnect".to_string());
        }

        fn on_message(&mut self, topic: &str, _payload: Payload) {
            self.calls.push(format!("message:{}", topic));
        }
    }

    #[tokio::test]
    async fn test_ingest_preserves_event_order() {
        let (tx, mut rx) = channel();
        let mut handler = RecordingHandler::default();

        forward(&tx, TransportEvent::Connected).unwrap();
        forward(
            &tx,
            TransportEvent::Message {
                topic: "stm32/sensor/data".to_string(),
                payload: Payload::Structured(json!({"T": 25.3})),
            },
        )
        .unwrap();
        forward(&tx, TransportEvent::Disconnected).unwrap();
        drop(tx);

        let processed = run_ingest(&mut rx, &mut handler).await;

        assert_eq!(processed, 3);
        assert_eq!(
            handler.calls,
            vec!["connect", "message:stm32/sensor/data", "disconnect"]
        );
    }

    #[test]
    fn test_forward_fails_once_receiver_is_gone() {
        let (tx, rx) = channel();
        drop(rx);

        let result = forward(&tx, TransportEvent::Connected);
        assert!(matches!(result, Err(TransportError::ChannelClosed)));
    }
}
