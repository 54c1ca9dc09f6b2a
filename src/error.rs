use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Transport error: {0}")]
    TransportError(#[from] TransportError),

    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),

    #[error("Decode error: {0}")]
    DecodeError(#[from] DecodeError),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Connection-level failures. Never fatal: they end the session and the
/// transport retries.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("serial read failed: {0}")]
    Read(#[from] std::io::Error),

    #[error("mqtt connection error: {0}")]
    Mqtt(#[from] rumqttc::ConnectionError),

    #[error("invalid broker url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("ingest channel closed")]
    ChannelClosed,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database path error: {0}")]
    Io(#[from] std::io::Error),

    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("persistence queue closed")]
    QueueClosed,
}

/// A transport frame that could not be split into topic and payload.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not a topic frame: {0}")]
    NotAFrame(String),

    #[error("frame is missing the '|' separator: {0}")]
    MissingSeparator(String),

    #[error("frame has an empty topic: {0}")]
    EmptyTopic(String),
}

impl From<&str> for RelayError {
    fn from(error: &str) -> Self {
        RelayError::ConfigError(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
