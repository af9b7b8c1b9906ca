//! # Events
//!
//! Each state change publishes one event, except `refund`, which publishes
//! a `refunded` event per paid contributor followed by one `settled`. Topics are
//! `(symbol, address)` so that off-chain consumers can filter by the account
//! involved; the payload is a `#[contracttype]` struct.
//!
//! | Topic       | Address      | Payload                  |
//! |-------------|--------------|--------------------------|
//! | `created`   | owner        | [`CampaignCreated`]      |
//! | `funded`    | contributor  | [`ContributionReceived`] |
//! | `withdrawn` | owner        | [`FundsWithdrawn`]       |
//! | `refunded`  | contributor  | [`ContributionRefunded`] |
//! | `settled`   | escrow       | [`RefundSettled`]        |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignCreated {
    pub owner: Address,
    pub token: Address,
    pub target_amount: i128,
    pub deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionReceived {
    pub contributor: Address,
    pub amount: i128,
    /// Campaign total after this contribution.
    pub total_amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsWithdrawn {
    pub owner: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionRefunded {
    pub contributor: Address,
    pub amount: i128,
}

/// Closes a batch refund.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundSettled {
    pub refunded_count: u32,
    pub refunded_total: i128,
}

pub fn emit_campaign_created(env: &Env, event: CampaignCreated) {
    env.events()
        .publish((symbol_short!("created"), event.owner.clone()), event);
}

pub fn emit_contribution_received(env: &Env, event: ContributionReceived) {
    env.events()
        .publish((symbol_short!("funded"), event.contributor.clone()), event);
}

pub fn emit_funds_withdrawn(env: &Env, event: FundsWithdrawn) {
    env.events()
        .publish((symbol_short!("withdrawn"), event.owner.clone()), event);
}

pub fn emit_contribution_refunded(env: &Env, event: ContributionRefunded) {
    env.events()
        .publish((symbol_short!("refunded"), event.contributor.clone()), event);
}

pub fn emit_refund_settled(env: &Env, event: RefundSettled) {
    env.events().publish(
        (symbol_short!("settled"), env.current_contract_address()),
        event,
    );
}
