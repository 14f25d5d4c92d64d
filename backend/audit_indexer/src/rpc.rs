//! Soroban RPC client: polls `getEvents` and decodes PrivateAudit registry events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.
//! * Malformed-request and unknown-method errors are returned to the caller.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{AuditEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// JSON-RPC codes that will never succeed on retry.
const HARD_ERROR_CODES: [i64; 2] = [-32600, -32601];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    /// Unique event id assigned by the RPC (`<toid>-<index>`).
    pub id: Option<String>,
    /// Decoded topic list, one JSON-encoded ScVal per entry
    pub topic: Vec<String>,
    /// Decoded event data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
}

/// One page of events plus where to continue from.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

/// Doubling delay capped at [`MAX_BACKOFF_SECS`].
struct Backoff {
    secs: u64,
}

impl Backoff {
    fn new() -> Self {
        Self {
            secs: INITIAL_BACKOFF_SECS,
        }
    }

    async fn wait(&mut self) {
        tokio::time::sleep(Duration::from_secs(self.secs)).await;
        self.secs = (self.secs * 2).min(MAX_BACKOFF_SECS);
    }
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of registry events from the RPC.
///
/// * `start_ledger`: the ledger sequence to scan from (inclusive), used only
///   when no `cursor` is given.
/// * `cursor`: optional opaque pagination cursor from a previous page.
/// * `limit`: maximum number of events to return.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let mut backoff = Backoff::new();
    let request = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });

    loop {
        let resp = match client.post(rpc_url).json(&request).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(backoff_secs = backoff.secs, "RPC request failed: {e}");
                backoff.wait().await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!(backoff_secs = backoff.secs, "Rate-limited by RPC");
            backoff.wait().await;
            continue;
        }

        let body: RpcResponse = resp.json().await?;

        if let Some(err) = body.error {
            if HARD_ERROR_CODES.contains(&err.code) {
                return Err(IndexerError::EventParse(format!(
                    "RPC hard error {}: {}",
                    err.code, err.message
                )));
            }
            warn!(
                backoff_secs = backoff.secs,
                code = err.code,
                "RPC soft error: {}",
                err.message
            );
            backoff.wait().await;
            continue;
        }

        let result = body
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            count = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "Fetched registry events"
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`AuditEvent`] structs.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<AuditEvent> {
    raw.iter()
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<AuditEvent> {
    let kind = EventKind::from_topic(&topic_scalar(raw.topic.first()?));

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    // Audit events carry the audit id as second topic; `aud_reg` carries the
    // auditor address there instead.
    let second_topic = raw.topic.get(1).map(|t| topic_scalar(t));
    let (audit_id, topic_actor) = match kind {
        EventKind::AuditorRegistered => (None, second_topic),
        _ => (second_topic, None),
    };

    let (actor, value) = decode_data(&raw.value, kind);

    Some(AuditEvent {
        event_id: event_key(raw),
        event_type: kind.as_str().to_string(),
        audit_id,
        actor: actor.or(topic_actor),
        value,
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// The RPC event id, or when a node omits it, a key derived from every field
/// that identifies the event so re-polls still collide.
fn event_key(raw: &RawEvent) -> String {
    match &raw.id {
        Some(id) => id.clone(),
        None => format!(
            "{}:{}:{}:{}",
            raw.ledger.unwrap_or(0),
            raw.tx_hash.as_deref().unwrap_or(""),
            raw.topic.join(","),
            raw.value
        ),
    }
}

/// Pull `(actor, value)` out of the JSON data blob of one event kind.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>) {
    match kind {
        EventKind::AuditRequested => (
            extract_field(value, &["project"]),
            extract_field(value, &["code_hash"]),
        ),
        EventKind::AuditorAssigned => (extract_field(value, &["auditor"]), None),
        EventKind::FindingAdded => (None, extract_field(value, &["severity"])),
        EventKind::AuditCompleted => (None, extract_field(value, &["public_score"])),
        EventKind::FindingResolved | EventKind::FindingDisclosed => {
            (None, extract_field(value, &["index"]))
        }
        EventKind::ReportDisclosed | EventKind::AuditDisputed => {
            (extract_field(value, &["project"]), None)
        }
        EventKind::AuditorRegistered => (value.as_str().map(String::from), None),
        EventKind::Unknown => (None, None),
    }
}

/// Read the first of `keys` present in `value` as a string. Scalars may be
/// bare or wrapped as `{"type": …, "value": …}`.
fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(key))
        .find_map(scalar_to_string)
}

fn scalar_to_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => v.get("value").and_then(scalar_to_string),
        _ => None,
    }
}

/// Extract the scalar from a topic entry. The RPC may return
/// `{"type":"symbol","value":"requested"}` or just the raw string.
fn topic_scalar(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| v.get("value").and_then(scalar_to_string))
        .unwrap_or_else(|| raw.to_string())
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
