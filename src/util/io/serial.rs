// src/util/io/serial.rs
//! Serial line transport.
//!
//! The microcontroller writes one frame per line:
//! `TOPIC:stm32/sensor/data|{"mq135_ppm":150.5,"mq2_ppm":450.2,"T":25.3,"RH":65.1}`.
//! Anything without the `TOPIC:` prefix is firmware debug output.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, error, info, warn};

use crate::config::SerialConfig;
use crate::error::{DecodeError, TransportError};
use crate::util::io::payload::Payload;
use crate::util::io::transport::{forward, TransportEvent, TransportSender};

pub const FRAME_PREFIX: &str = "TOPIC:";

#[derive(Debug, Clone, PartialEq)]
pub struct SerialFrame {
    pub topic: String,
    pub payload: Payload,
}

impl SerialFrame {
    pub fn parse(line: &str) -> Result<Self, DecodeError> {
        let trimmed = line.trim();

        let body = trimmed
            .strip_prefix(FRAME_PREFIX)
            .ok_or_else(|| DecodeError::NotAFrame(trimmed.to_string()))?;

        // Split on the first separator only; the payload may contain '|'.
        let (topic, payload) = body
            .split_once('|')
            .ok_or_else(|| DecodeError::MissingSeparator(trimmed.to_string()))?;

        let topic = topic.trim();
        if topic.is_empty() {
            return Err(DecodeError::EmptyTopic(trimmed.to_string()));
        }

        Ok(Self {
            topic: topic.to_string(),
            payload: Payload::from_text(payload),
        })
    }

    pub fn into_event(self) -> TransportEvent {
        TransportEvent::Message {
            topic: self.topic,
            payload: self.payload,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SerialTransport {
    port: String,
    baud_rate: u32,
    reconnect_delay: Duration,
}

impl SerialTransport {
    pub fn new(port: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            port: port.into(),
            baud_rate,
            reconnect_delay: Duration::from_secs(5),
        }
    }

    pub fn from_config(config: &SerialConfig) -> Self {
        Self::new(config.port.clone(), config.baud_rate)
            .with_reconnect_delay(Duration::from_secs(config.reconnect_delay_secs))
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Names of the serial ports visible to the OS.
    pub fn list_ports() -> Vec<String> {
        match tokio_serial::available_ports() {
            Ok(ports) => ports.into_iter().map(|p| p.port_name).collect(),
            Err(e) => {
                error!("❌ Failed to list serial ports: {}", e);
                Vec::new()
            }
        }
    }

    /// Keep the port open, reopening it after the reconnect delay whenever it
    /// fails or closes. Returns once the ingest loop has gone away.
    pub async fn run(self, events: TransportSender) -> Result<(), TransportError> {
        loop {
            match self.listen(&events).await {
                Ok(()) => warn!("⚠️ Serial port {} closed", self.port),
                Err(TransportError::ChannelClosed) => return Ok(()),
                Err(e) => error!("❌ Serial listener error on {}: {}", self.port, e),
            }

            if events.is_closed() {
                return Ok(());
            }

            tokio::time::sleep(self.reconnect_delay).await;
        }
    }

    async fn listen(&self, events: &TransportSender) -> Result<(), TransportError> {
        info!("🔌 Opening serial port {} @ {} baud", self.port, self.baud_rate);

        let port = tokio_serial::new(&self.port, self.baud_rate).open_native_async()?;

        info!("✅ Serial port opened: {}", self.port);
        forward(events, TransportEvent::Connected)?;

        let outcome = self.read_frames(BufReader::new(port), events).await;

        forward(events, TransportEvent::Disconnected)?;
        outcome
    }

    /// Forward every `\n`-terminated line until EOF. Bytes that are not
    /// UTF-8 are decoded lossily, so boot noise never ends the stream.
    async fn read_frames<R>(&self, mut reader: R, events: &TransportSender) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                return Ok(());
            }

            let line = String::from_utf8_lossy(&buf);
            self.forward_line(&line, events)?;
        }
    }

    fn forward_line(&self, line: &str, events: &TransportSender) -> Result<(), TransportError> {
        if line.trim().is_empty() {
            return Ok(());
        }

        match SerialFrame::parse(line) {
            Ok(frame) => {
                debug!("📩 Serial frame | topic: {} | payload: {:?}", frame.topic, frame.payload);
                forward(events, frame.into_event())
            }
            Err(DecodeError::NotAFrame(text)) => {
                debug!("[Serial Debug] {}", text);
                Ok(())
            }
            Err(e) => {
                warn!("⚠️ Dropping malformed serial frame: {}", e);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::io::transport::channel;
    use serde_json::json;

    #[test]
    fn test_parse_sensor_frame() {
        let frame = SerialFrame::parse(
            "TOPIC:stm32/sensor/data|{\"mq135_ppm\":150.5,\"mq2_ppm\":450.2,\"T\":25.3,\"RH\":65.1}\r",
        )
        .unwrap();

        assert_eq!(frame.topic, "stm32/sensor/data");
        assert_eq!(
            frame.payload,
            Payload::Structured(json!({"mq135_ppm": 150.5, "mq2_ppm": 450.2, "T": 25.3, "RH": 65.1}))
        );
    }

    #[test]
    fn test_parse_keeps_separator_inside_payload() {
        let frame = SerialFrame::parse("TOPIC:capstone/e03/fish|{\"note\":\"a|b\",\"fresh\":\"S\"}").unwrap();
        assert_eq!(frame.payload, Payload::Structured(json!({"note": "a|b", "fresh": "S"})));
    }

    #[test]
    fn test_non_json_payload_is_text() {
        let frame = SerialFrame::parse("TOPIC:capstone/e03/fish|KS").unwrap();
        assert_eq!(frame.payload, Payload::Text("KS".to_string()));
    }

    #[test]
    fn test_parse_rejects_debug_and_malformed_lines() {
        assert!(matches!(
            SerialFrame::parse("ADC ready, warming sensors"),
            Err(DecodeError::NotAFrame(_))
        ));
        assert!(matches!(
            SerialFrame::parse("TOPIC:stm32/sensor/data"),
            Err(DecodeError::MissingSeparator(_))
        ));
        assert!(matches!(
            SerialFrame::parse("TOPIC: |{}"),
            Err(DecodeError::EmptyTopic(_))
        ));
    }

    #[test]
    fn test_forward_line_skips_debug_output() {
        let transport = SerialTransport::new("/dev/null", 115200);
        let (tx, mut rx) = channel();

        transport.forward_line("boot ok", &tx).unwrap();
        transport.forward_line("TOPIC:capstone/e03/fish|{\"fresh\":\"S\"}", &tx).unwrap();

        let event = rx.try_recv().unwrap();
        assert_eq!(
            event,
            TransportEvent::Message {
                topic: "capstone/e03/fish".to_string(),
                payload: Payload::Structured(json!({"fresh": "S"})),
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_noise_bytes_do_not_end_the_stream() {
        let transport = SerialTransport::new("/dev/null", 115200);
        let (tx, mut rx) = channel();
        let input: &[u8] =
            b"TOPIC:stm32/sensor/data|{\"T\":25}\r\n\xff\xfe noise\r\nTOPIC:stm32/sensor/data|{\"T\":26}\r\n";

        transport.read_frames(input, &tx).await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                TransportEvent::Message {
                    topic: "stm32/sensor/data".to_string(),
                    payload: Payload::Structured(json!({"T": 25})),
                },
                TransportEvent::Message {
                    topic: "stm32/sensor/data".to_string(),
                    payload: Payload::Structured(json!({"T": 26})),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_last_line_without_newline_is_forwarded() {
        let transport = SerialTransport::new("/dev/null", 115200);
        let (tx, mut rx) = channel();

        transport
            .read_frames(&b"TOPIC:capstone/e03/fish|{\"fresh\":\"S\"}"[..], &tx)
            .await
            .unwrap();

        assert!(matches!(rx.try_recv(), Ok(TransportEvent::Message { .. })));
        assert!(rx.try_recv().is_err());
    }
}
