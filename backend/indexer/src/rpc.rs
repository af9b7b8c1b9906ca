//! Soroban RPC client: polls `getEvents` and decodes escrow events.
//!
//! ## Resilience
//!
//! * Transport errors, HTTP 429 and soft JSON-RPC errors are retried with
//!   exponential back-off, from [`INITIAL_BACKOFF_SECS`] up to
//!   [`MAX_BACKOFF_SECS`].
//! * Malformed requests (`-32600`) and unknown methods (`-32601`) will never
//!   succeed on retry and are returned as errors.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EscrowEvent, EventKind};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

const HARD_RPC_ERRORS: [i64; 2] = [-32600, -32601];

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
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    /// Topics in the default encoding (base64 XDR strings).
    #[serde(default)]
    pub topic: Vec<Value>,
    /// Topics as JSON `ScVal`s, present when the request sets `xdrFormat: json`.
    pub topic_json: Option<Vec<Value>>,
    #[serde(default)]
    pub value: Value,
    /// Payload as a JSON `ScVal`, present alongside `topic_json`.
    pub value_json: Option<Value>,
    pub contract_id: Option<String>,
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    pub ledger_closed_at: Option<String>,
    pub in_successful_contract_call: Option<bool>,
}

impl RawEvent {
    /// Prefer the JSON topics; fall back to whatever the RPC put in `topic`.
    pub fn topics(&self) -> &[Value] {
        self.topic_json.as_deref().unwrap_or(&self.topic)
    }

    pub fn payload(&self) -> &Value {
        self.value_json.as_ref().unwrap_or(&self.value)
    }
}

/// One page of results from `getEvents`.
#[derive(Debug)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events for `contract_id`.
///
/// With a `cursor` the RPC continues from where the previous page stopped;
/// without one it scans from `start_ledger` (inclusive).
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<EventPage> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "getEvents",
        "params": build_params(contract_id, start_ledger, cursor, limit),
    });
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let resp = match client.post(rpc_url).json(&body).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
                sleep_and_grow(&mut backoff).await;
                continue;
            }
        };

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            warn!("Rate-limited by RPC (will retry in {backoff}s)");
            sleep_and_grow(&mut backoff).await;
            continue;
        }

        let parsed: RpcResponse = resp.json().await?;

        if let Some(err) = parsed.error {
            if HARD_RPC_ERRORS.contains(&err.code) {
                return Err(IndexerError::Rpc {
                    code: err.code,
                    message: err.message,
                });
            }
            warn!(
                code = err.code,
                "RPC soft error (will retry in {backoff}s): {}", err.message
            );
            sleep_and_grow(&mut backoff).await;
            continue;
        }

        let result = parsed
            .result
            .ok_or_else(|| IndexerError::EventParse("Empty result from getEvents".to_string()))?;

        debug!(
            count = result.events.len(),
            latest_ledger = ?result.latest_ledger,
            "Fetched events page"
        );

        return Ok(EventPage {
            events: result.events,
            cursor: result.cursor,
            latest_ledger: result.latest_ledger,
        });
    }
}

async fn sleep_and_grow(backoff: &mut u64) {
    tokio::time::sleep(Duration::from_secs(*backoff)).await;
    *backoff = next_backoff(*backoff);
}

fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    // Without `xdrFormat: json` topics and payloads arrive as base64 XDR.
    let mut params = json!({
        "xdrFormat": "json",
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

    // The RPC rejects requests carrying both a cursor and a start ledger.
    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`EscrowEvent`]s.
///
/// Events from failed contract calls are dropped: their effects were rolled
/// back on-chain.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<EscrowEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<EscrowEvent> {
    let topics = raw.topics();
    let kind = EventKind::from_topic(&scval_string(topics.first()?)?);
    let payload = raw.payload();

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let account = topics
        .get(1)
        .and_then(scval_string)
        .or_else(|| account_from_data(payload, kind));

    Some(EscrowEvent {
        event_type: kind.as_str().to_string(),
        account,
        amount: amount_from_data(payload, kind),
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash: raw.tx_hash.clone(),
    })
}

/// Fallback for the account when the topic list is short: read it from the
/// payload field that carries it for this kind of event.
fn account_from_data(value: &Value, kind: EventKind) -> Option<String> {
    match kind {
        EventKind::CampaignCreated | EventKind::FundsWithdrawn => payload_field(value, "owner"),
        EventKind::ContributionReceived | EventKind::ContributionRefunded => {
            payload_field(value, "contributor")
        }
        EventKind::RefundSettled | EventKind::Unknown => None,
    }
}

/// The amount an event moved. For `created` that is the target; for
/// `settled` it is the batch total.
fn amount_from_data(value: &Value, kind: EventKind) -> Option<String> {
    match kind {
        EventKind::CampaignCreated => payload_field(value, "target_amount"),
        EventKind::ContributionReceived
        | EventKind::FundsWithdrawn
        | EventKind::ContributionRefunded => payload_field(value, "amount"),
        EventKind::RefundSettled => payload_field(value, "refunded_total"),
        EventKind::Unknown => None,
    }
}

/// Read one field of a `#[contracttype]` struct payload. In JSON form such a
/// struct is an `ScMap`: `{"map":[{"key":{"symbol":"amount"},"val":{..}}]}`.
/// A plain JSON object keyed by field name is accepted too.
fn payload_field(value: &Value, key: &str) -> Option<String> {
    if let Some(entries) = value.get("map").and_then(Value::as_array) {
        return entries
            .iter()
            .find(|entry| {
                entry.get("key").and_then(scval_string).as_deref() == Some(key)
            })
            .and_then(|entry| entry.get("val"))
            .and_then(scval_string);
    }
    value.get(key).and_then(scval_string)
}

/// `ScVal` arms whose JSON form wraps a single printable value.
const SCALAR_TAGS: [&str; 11] = [
    "symbol", "string", "address", "bool", "u32", "i32", "u64", "i64", "u128", "i128",
    "timepoint",
];

/// Flatten one `ScVal` to a string. Handles the RPC JSON form
/// (`{"symbol":"funded"}`, `{"address":"G…"}`, `{"i128":"500"}`), the
/// `{"hi":..,"lo":..}` split used for 128-bit integers, the older
/// `{"type":..,"value":..}` wrapper and bare strings or numbers.
fn scval_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(inner @ Value::Object(_)) => scval_string(&inner),
            _ => Some(s.clone()),
        },
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(obj) => {
            if let Some(inner) = obj.get("value") {
                return scval_string(inner);
            }
            if let (Some(hi), Some(lo)) = (obj.get("hi"), obj.get("lo")) {
                return i128_from_parts(hi, lo);
            }
            match obj.iter().next() {
                Some((tag, inner)) if obj.len() == 1 && SCALAR_TAGS.contains(&tag.as_str()) => {
                    scval_string(inner)
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn i128_from_parts(hi: &Value, lo: &Value) -> Option<String> {
    let hi: i64 = json_int(hi)?;
    let lo: u64 = json_int(lo)?;
    Some(((i128::from(hi) << 64) | i128::from(lo)).to_string())
}

fn json_int<T: std::str::FromStr>(v: &Value) -> Option<T> {
    match v {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
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
