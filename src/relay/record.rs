use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::relay::decode::DeviceKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Freshness,
    Preservation,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Freshness => "freshness",
            Category::Preservation => "preservation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "freshness" => Some(Category::Freshness),
            "preservation" => Some(Category::Preservation),
            _ => None,
        }
    }

    /// Payload field carrying the classification code.
    pub fn code_field(&self) -> &'static str {
        match self {
            Category::Freshness => "fresh",
            Category::Preservation => "preservation",
        }
    }

    /// Payload field carrying the optional fuzzy score.
    pub fn value_field(&self) -> &'static str {
        match self {
            Category::Freshness => "freshValue",
            Category::Preservation => "preservationValue",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification observation. Records handed to persistence are never
/// modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub category: Category,
    pub code: String,
    pub value: Option<f64>,
    pub device_key: DeviceKey,
    pub observed_at: DateTime<Utc>,
}
