pub mod config;
pub mod error;
pub mod relay;
pub mod util;

pub use config::{RelayConfig, TransportKind};
pub use error::{RelayError, Result};
pub use relay::Relay;
