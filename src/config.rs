// src/config.rs
//! Relay configuration.
//!
//! Loaded from an optional YAML file, then overridden by environment
//! variables (`MQTT_URL`, `MQTT_USERNAME`, `MQTT_PASSWORD`, `MQTT_SUB_TOPICS`,
//! `SERIAL_PORT`, `SERIAL_BAUD_RATE`, `FRESHWATCH_TRANSPORT`, `FRESHWATCH_DB`,
//! `FRESHWATCH_EXPORT_DIR`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{RelayError, Result};
use crate::relay::history::DEFAULT_HISTORY_LIMIT;
use crate::relay::topic::{TopicMap, DEFAULT_APP_PREFIX, DEFAULT_DEVICE_PREFIX};
use crate::util::io::mqtt::BrokerAddress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    #[default]
    Mqtt,
    Serial,
}

impl TransportKind {
    fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mqtt" => Some(TransportKind::Mqtt),
            "serial" => Some(TransportKind::Serial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub device_prefix: String,
    pub app_prefix: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            device_prefix: DEFAULT_DEVICE_PREFIX.to_string(),
            app_prefix: DEFAULT_APP_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: Option<String>,
    /// Empty means "the three relay topics".
    pub subscribe_topics: Vec<String>,
    pub keep_alive_secs: u64,
    pub reconnect_delay_secs: u64,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            url: "mqtt://localhost:1883".to_string(),
            username: None,
            password: None,
            client_id: None,
            subscribe_topics: Vec::new(),
            keep_alive_secs: 30,
            reconnect_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    pub port: String,
    pub baud_rate: u32,
    pub reconnect_delay_secs: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 115_200,
            reconnect_delay_secs: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub transport: TransportKind,
    pub topics: TopicConfig,
    pub mqtt: MqttConfig,
    pub serial: SerialConfig,
    pub database_path: PathBuf,
    /// Where finished sessions are written. `None` disables export.
    pub export_dir: Option<PathBuf>,
    pub history_limit: usize,
    pub reset_change_gate_on_session_end: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            transport: TransportKind::default(),
            topics: TopicConfig::default(),
            mqtt: MqttConfig::default(),
            serial: SerialConfig::default(),
            database_path: PathBuf::from("./db/freshwatch.db"),
            export_dir: Some(PathBuf::from("./exports")),
            history_limit: DEFAULT_HISTORY_LIMIT,
            reset_change_gate_on_session_end: false,
        }
    }
}

fn invalid(field: &str, error: &str) -> RelayError {
    RelayError::ConfigError(format!("{}: {}", field, error))
}

impl RelayConfig {
    /// File (if it exists), then process environment, then validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) if path.exists() => {
                info!("Loading config from {}", path.display());
                Self::from_yaml_str(&std::fs::read_to_string(path)?)?
            }
            Some(path) => {
                debug!("No config file at {}, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(kind) = lookup("FRESHWATCH_TRANSPORT") {
            self.transport = TransportKind::parse(&kind)
                .ok_or_else(|| invalid("FRESHWATCH_TRANSPORT", "expected 'mqtt' or 'serial'"))?;
        }
        if let Some(url) = lookup("MQTT_URL") {
            self.mqtt.url = url;
        }
        if let Some(username) = lookup("MQTT_USERNAME") {
            self.mqtt.username = Some(username);
        }
        if let Some(password) = lookup("MQTT_PASSWORD") {
            self.mqtt.password = Some(password);
        }
        if let Some(topics) = lookup("MQTT_SUB_TOPICS") {
            self.mqtt.subscribe_topics = topics
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(port) = lookup("SERIAL_PORT") {
            self.serial.port = port;
        }
        if let Some(baud) = lookup("SERIAL_BAUD_RATE") {
            self.serial.baud_rate = baud
                .trim()
                .parse()
                .map_err(|_| invalid("SERIAL_BAUD_RATE", "not a number"))?;
        }
        if let Some(path) = lookup("FRESHWATCH_DB") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(dir) = lookup("FRESHWATCH_EXPORT_DIR") {
            self.export_dir = Some(PathBuf::from(dir));
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.topics.device_prefix.trim().is_empty() {
            return Err(invalid("topics.device_prefix", "must not be empty"));
        }
        if self.topics.app_prefix.trim().is_empty() {
            return Err(invalid("topics.app_prefix", "must not be empty"));
        }
        if self.history_limit == 0 {
            return Err(invalid("history_limit", "must be at least 1"));
        }

        match self.transport {
            TransportKind::Mqtt => {
                BrokerAddress::parse(&self.mqtt.url)?;
            }
            TransportKind::Serial => {
                if self.serial.port.trim().is_empty() {
                    return Err(invalid("serial.port", "must not be empty"));
                }
                if self.serial.baud_rate == 0 {
                    return Err(invalid("serial.baud_rate", "must be greater than zero"));
                }
            }
        }

        Ok(())
    }

    pub fn topic_map(&self) -> TopicMap {
        TopicMap::new(&self.topics.device_prefix, &self.topics.app_prefix)
    }

    pub fn subscribe_topics(&self) -> Vec<String> {
        if self.mqtt.subscribe_topics.is_empty() {
            self.topic_map().all()
        } else {
            self.mqtt.subscribe_topics.clone()
        }
    }
}
