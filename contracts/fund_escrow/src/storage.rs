//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the escrow.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key            | Type             | Description                          |
//! |----------------|------------------|--------------------------------------|
//! | `Config`       | `CampaignConfig` | Immutable campaign parameters        |
//! | `State`        | `CampaignState`  | Running total and settlement status  |
//! | `Contributors` | `Vec<Address>`   | Contributors in first-funding order  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                  | Type   | Description                    |
//! |----------------------|--------|--------------------------------|
//! | `Contribution(addr)` | `i128` | Amount recorded for `addr`     |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{Campaign, CampaignConfig, CampaignState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Campaign parameters (Instance).
    Config,
    /// Running total and settlement status (Instance).
    State,
    /// Ordered, de-duplicated contributor list (Instance).
    Contributors,
    /// Per-contributor amount (Persistent).
    Contribution(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Write the config, a zeroed state and an empty contributor list.
pub fn save_new_campaign(env: &Env, config: &CampaignConfig, state: &CampaignState) {
    let storage = env.storage().instance();
    storage.set(&DataKey::Config, config);
    storage.set(&DataKey::State, state);
    storage.set(&DataKey::Contributors, &Vec::<Address>::new(env));
    bump_instance(env);
}

pub fn load_config(env: &Env) -> Result<CampaignConfig, Error> {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)?;
    bump_instance(env);
    Ok(config)
}

pub fn load_state(env: &Env) -> Result<CampaignState, Error> {
    let state = env
        .storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)?;
    bump_instance(env);
    Ok(state)
}

pub fn save_state(env: &Env, state: &CampaignState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn load_contributors(env: &Env) -> Vec<Address> {
    env.storage()
        .instance()
        .get(&DataKey::Contributors)
        .unwrap_or_else(|| Vec::new(env))
}

/// Append `contributor` to the ordered list. Callers only do this on the
/// first contribution from an address, so the list stays duplicate-free.
pub fn push_contributor(env: &Env, contributor: &Address) {
    let mut contributors = load_contributors(env);
    contributors.push_back(contributor.clone());
    env.storage()
        .instance()
        .set(&DataKey::Contributors, &contributors);
    bump_instance(env);
}

/// Load the full `Campaign` view by combining config, state and the
/// contributor list.
pub fn load_campaign(env: &Env) -> Result<Campaign, Error> {
    let config = load_config(env)?;
    let state = load_state(env)?;
    Ok(Campaign {
        owner: config.owner,
        token: config.token,
        target_amount: config.target_amount,
        deadline: config.deadline,
        total_amount: state.total_amount,
        contributor_count: load_contributors(env).len(),
        settlement_state: state.settlement,
    })
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Recorded contribution for `contributor`, or `None` if the address never
/// funded the campaign.
pub fn load_contribution(env: &Env, contributor: &Address) -> Option<i128> {
    let key = DataKey::Contribution(contributor.clone());
    let amount = env.storage().persistent().get(&key);
    if amount.is_some() {
        bump_persistent(env, &key);
    }
    amount
}

pub fn save_contribution(env: &Env, contributor: &Address, amount: i128) {
    let key = DataKey::Contribution(contributor.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}
