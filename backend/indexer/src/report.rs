//! Campaign summary folded from the indexed event log.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord};

/// Settlement outcome as observed through events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Active,
    Withdrawn,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub owner: Option<String>,
    /// Amounts are decimal strings: `i128` does not survive JSON numbers.
    pub target_amount: Option<String>,
    pub total_funded: String,
    pub total_withdrawn: String,
    pub total_refunded: String,
    pub contributor_count: usize,
    pub outcome: Outcome,
}

/// Fold events (in ledger order) into a [`CampaignSummary`].
pub fn summarize(events: &[EventRecord]) -> Result<CampaignSummary> {
    let mut owner = None;
    let mut target_amount = None;
    let mut funded: i128 = 0;
    let mut withdrawn: i128 = 0;
    let mut refunded: i128 = 0;
    let mut contributors = BTreeSet::new();
    let mut outcome = Outcome::Active;

    for ev in events {
        match EventKind::from_stored(&ev.event_type) {
            EventKind::CampaignCreated => {
                owner = ev.account.clone();
                target_amount = ev.amount.clone();
            }
            EventKind::ContributionReceived => {
                funded += parse_amount(ev)?;
                if let Some(account) = &ev.account {
                    contributors.insert(account.clone());
                }
            }
            EventKind::FundsWithdrawn => {
                withdrawn += parse_amount(ev)?;
                outcome = Outcome::Withdrawn;
            }
            EventKind::ContributionRefunded => {
                refunded += parse_amount(ev)?;
                outcome = Outcome::Refunded;
            }
            EventKind::RefundSettled => outcome = Outcome::Refunded,
            EventKind::Unknown => {}
        }
    }

    Ok(CampaignSummary {
        owner,
        target_amount,
        total_funded: funded.to_string(),
        total_withdrawn: withdrawn.to_string(),
        total_refunded: refunded.to_string(),
        contributor_count: contributors.len(),
        outcome,
    })
}

fn parse_amount(ev: &EventRecord) -> Result<i128> {
    let raw = ev.amount.as_deref().unwrap_or("0");
    raw.parse().map_err(|_| {
        IndexerError::EventParse(format!("event {} has non-numeric amount {raw:?}", ev.id))
    })
}
