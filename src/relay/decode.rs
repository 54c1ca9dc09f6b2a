// src/relay/decode.rs
//! Field extraction from inbound payloads.
//!
//! Upstream devices send the same fields either flat (`{"fresh": "S"}`) or
//! wrapped one level down (`{"message": {"fresh": "S"}}`). Every lookup goes
//! through [`FieldSource::locate`], which tries the flat shape first.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::relay::record::Category;
use crate::util::io::payload::Payload;

pub const NESTED_KEY: &str = "message";
pub const DEVICE_ID_FIELD: &str = "deviceId";
pub const DEFAULT_DEVICE_KEY: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldSource<'a> {
    Flat(&'a Value),
    Nested(&'a Value),
}

impl<'a> FieldSource<'a> {
    /// `null` counts as absent in both shapes.
    pub fn locate(payload: &'a Value, field: &str) -> Option<Self> {
        if let Some(value) = present(payload.get(field)) {
            return Some(FieldSource::Flat(value));
        }

        payload
            .get(NESTED_KEY)
            .and_then(|nested| present(nested.get(field)))
            .map(FieldSource::Nested)
    }

    pub fn value(&self) -> &'a Value {
        match self {
            FieldSource::Flat(value) | FieldSource::Nested(value) => value,
        }
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

pub fn field<'a>(payload: &'a Payload, name: &str) -> Option<FieldSource<'a>> {
    payload
        .as_structured()
        .and_then(|value| FieldSource::locate(value, name))
}

/// Codes are usually strings, but some firmware sends bare numbers.
fn as_code(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number(payload: &Payload, aliases: &[&str]) -> Option<f64> {
    aliases
        .iter()
        .find_map(|name| field(payload, name).and_then(|source| as_number(source.value())))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceKey(String);

impl DeviceKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// `deviceId` from the payload, or `"default"` when missing or empty.
    pub fn from_payload(payload: &Payload) -> Self {
        field(payload, DEVICE_ID_FIELD)
            .and_then(|source| as_code(source.value()))
            .filter(|key| !key.is_empty())
            .map(DeviceKey)
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DeviceKey {
    fn default() -> Self {
        Self(DEFAULT_DEVICE_KEY.to_string())
    }
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A classification message reduced to what the change gate needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub code: Option<String>,
    pub value: Option<f64>,
    pub device: DeviceKey,
}

impl Classification {
    pub fn decode(category: Category, payload: &Payload) -> Self {
        Self {
            code: field(payload, category.code_field()).and_then(|source| as_code(source.value())),
            value: number(payload, &[category.value_field()]),
            device: DeviceKey::from_payload(payload),
        }
    }
}

/// Typed view of a sensor message, kept for the session history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub mq135_ppm: Option<f64>,
    pub mq2_ppm: Option<f64>,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    #[serde(rename = "pH")]
    pub ph: Option<f64>,
}

impl SensorReading {
    pub fn decode(payload: &Payload) -> Self {
        Self {
            mq135_ppm: number(payload, &["mq135_ppm"]),
            mq2_ppm: number(payload, &["mq2_ppm"]),
            temperature: number(payload, &["T", "temperature"]),
            humidity: number(payload, &["RH", "humidity"]),
            ph: number(payload, &["pH"]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mq135_ppm.is_none()
            && self.mq2_ppm.is_none()
            && self.temperature.is_none()
            && self.humidity.is_none()
            && self.ph.is_none()
    }
}
