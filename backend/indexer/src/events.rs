//! Canonical event types emitted by the fund escrow contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/fund_escrow/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the escrow contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The campaign was initialised (`created` topic).
    CampaignCreated,
    /// A contributor funded the campaign (`funded` topic).
    ContributionReceived,
    /// The owner took the funds (`withdrawn` topic).
    FundsWithdrawn,
    /// One contributor was paid back (`refunded` topic).
    ContributionRefunded,
    /// A batch refund completed (`settled` topic).
    RefundSettled,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::CampaignCreated,
            "funded" => Self::ContributionReceived,
            "withdrawn" => Self::FundsWithdrawn,
            "refunded" => Self::ContributionRefunded,
            "settled" => Self::RefundSettled,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignCreated => "campaign_created",
            Self::ContributionReceived => "contribution_received",
            Self::FundsWithdrawn => "funds_withdrawn",
            Self::ContributionRefunded => "contribution_refunded",
            Self::RefundSettled => "refund_settled",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`]; unrecognised strings map to `Unknown`.
    pub fn from_stored(s: &str) -> Self {
        match s {
            "campaign_created" => Self::CampaignCreated,
            "contribution_received" => Self::ContributionReceived,
            "funds_withdrawn" => Self::FundsWithdrawn,
            "contribution_refunded" => Self::ContributionRefunded,
            "refund_settled" => Self::RefundSettled,
            _ => Self::Unknown,
        }
    }
}

/// A fully decoded escrow event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowEvent {
    pub event_type: String,
    /// Address in the second topic slot: owner, contributor or the escrow itself.
    pub account: Option<String>,
    /// Token amount as a decimal string (`i128` does not fit SQLite integers).
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub account: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
