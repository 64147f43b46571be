//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates. Field
//! names travel as camelCase on the wire.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{de, Deserialize, Deserializer, Serialize};

/// Server-assigned task identifier.
pub type TaskId = u64;

/// A single task returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient_timestamp", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl Task {
    /// The update time, if the server reports one that differs from the
    /// creation time.
    pub fn edited_at(&self) -> Option<&Timestamp> {
        self.updated_at
            .as_ref()
            .filter(|updated| self.created_at.as_ref() != Some(*updated))
    }
}

/// A display-only server timestamp.
///
/// Backends disagree on the format: RFC 3339, zone-less ISO or SQL-style
/// local date-times and epoch milliseconds are all understood. Any other
/// string is kept verbatim and shown as-is.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Timestamp {
    Zoned(DateTime<FixedOffset>),
    Local(NaiveDateTime),
    Raw(String),
}

impl Timestamp {
    fn parse(text: &str) -> Self {
        if let Ok(at) = text.parse::<DateTime<FixedOffset>>() {
            return Timestamp::Zoned(at);
        }
        if let Ok(at) = text.parse::<NaiveDateTime>() {
            return Timestamp::Local(at);
        }
        match NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
            Ok(at) => Timestamp::Local(at),
            Err(_) => Timestamp::Raw(text.to_string()),
        }
    }

    fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|at| Timestamp::Zoned(at.fixed_offset()))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Millis(i64),
        }

        match Wire::deserialize(deserializer)? {
            Wire::Text(text) => Ok(Timestamp::parse(&text)),
            Wire::Millis(millis) => Timestamp::from_millis(millis)
                .ok_or_else(|| de::Error::custom(format!("timestamp out of range: {millis}"))),
        }
    }
}

/// Maps a timestamp that cannot be read at all to `None`.
fn lenient_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Timestamp>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| Timestamp::deserialize(value).ok()))
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const FORMAT: &str = "%Y-%m-%d %H:%M";
        match self {
            Timestamp::Zoned(at) => write!(f, "{}", at.with_timezone(&chrono::Local).format(FORMAT)),
            Timestamp::Local(at) => write!(f, "{}", at.format(FORMAT)),
            Timestamp::Raw(text) => f.write_str(text),
        }
    }
}

/// Request payload for creating a new task. The server assigns the id and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            completed: false,
        }
    }
}

/// Request payload for updating an existing task. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}
