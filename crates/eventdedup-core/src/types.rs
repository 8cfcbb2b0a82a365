//! Payload types consumed from the deduplication service API

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroU32;

/// Response of `GET /api/events/stats`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Reporting service name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Deduplication key store statistics; absent when the backend runs without Redis
    #[serde(default)]
    pub redis: RedisStats,

    /// Event store statistics
    pub postgres: PostgresStats,

    /// Time the statistics were collected, as emitted by the backend
    pub timestamp: String,
}

/// Deduplication key store statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisStats {
    /// Number of live deduplication keys
    #[serde(default)]
    pub dedup_keys_count: u64,

    /// Number of Redis shards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_count: Option<u32>,
}

/// Event store statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgresStats {
    /// Total stored events across all shards
    pub total_events: u64,

    /// Number of configured shards
    pub shard_count: u32,

    /// Per-shard event counts keyed by shard label, in backend order
    #[serde(default)]
    pub shards: IndexMap<String, u64>,
}

/// Response of `GET /api/events/events`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventListPayload {
    /// Events on the requested page
    pub data: Vec<EventRecord>,

    /// Total number of stored events
    pub total: u64,

    /// Limit echoed by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    /// Offset echoed by the backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// A stored event. Field values are opaque and rendered as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Storage identifier
    #[serde(default)]
    pub id: Value,

    /// Client identifier
    #[serde(default)]
    pub client_id: Value,

    /// Event type
    #[serde(default)]
    pub event_name: Value,

    /// Product identifier
    #[serde(default)]
    pub product_id: Value,

    /// Event time as stored
    #[serde(default)]
    pub event_datetime: Value,

    /// Deduplication hash; keys the detail view
    #[serde(default)]
    pub event_hash: String,

    /// Every other field, in backend order
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /api/events/events/{event_hash}`
pub type EventDetail = EventRecord;

impl EventRecord {
    /// The original event body stored alongside the record.
    ///
    /// The backend may hand it back as a JSON string; such strings are parsed,
    /// and left as-is when they are not JSON. A missing body is an empty object.
    #[must_use]
    pub fn full_event(&self) -> Value {
        match self.extra.get("full_event") {
            Some(Value::String(raw)) => {
                serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.clone()))
            }
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(other) => other.clone(),
        }
    }
}

/// Text shown for an opaque field: strings unquoted, null as empty, anything else as JSON
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Page of the event list to request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageQuery {
    /// Events per page
    pub limit: NonZeroU32,
    /// Events to skip
    pub offset: u64,
}

impl PageQuery {
    /// Create a page query
    #[must_use]
    pub const fn new(limit: NonZeroU32, offset: u64) -> Self {
        Self { limit, offset }
    }

    /// `limit=<n>&offset=<n>`
    #[must_use]
    pub fn to_query_string(&self) -> String {
        format!("limit={}&offset={}", self.limit, self.offset)
    }
}
