//! # Types
//!
//! Shared data structures used across all modules of the fund escrow.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A campaign is internally stored as two separate ledger entries:
//!
//! - [`CampaignConfig`]: written once by `init`; never mutated.
//! - [`CampaignState`]: written on every contribution and on settlement.
//!
//! The public API exposes the reconstructed [`Campaign`] struct for convenience.
//!
//! ### Settlement as a Finite-State Machine
//!
//! [`SettlementState`] has exactly one non-terminal state:
//!
//! ```text
//! Active ──► SettledWithdrawn
//!    └─────► SettledRefunded
//! ```
//!
//! Both exits are terminal. Every entry point that mutates the ledger checks
//! for `Active` before doing anything else.

use soroban_sdk::{contracttype, Address};

/// Settlement status of the campaign.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SettlementState {
    /// Accepting contributions; not yet settled.
    Active,
    /// Target met; the owner took the funds.
    SettledWithdrawn,
    /// Target missed; every contributor was paid back.
    SettledRefunded,
}

impl SettlementState {
    pub fn is_settled(&self) -> bool {
        !matches!(self, SettlementState::Active)
    }
}

/// Immutable campaign parameters, written once at initialisation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignConfig {
    pub owner: Address,
    pub token: Address,
    pub target_amount: i128,
    pub deadline: u64,
}

/// Mutable campaign state, updated on contributions and settlement.
///
/// `total_amount` always equals the sum of every stored contribution.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignState {
    pub total_amount: i128,
    pub settlement: SettlementState,
}

/// Full view of the campaign.
///
/// Used as the public API return type; reconstructed from the split
/// `CampaignConfig` + `CampaignState` storage entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Campaign {
    /// Address entitled to withdraw when the target is met.
    pub owner: Address,
    /// Token contract holding the raised asset.
    pub token: Address,
    /// Minimum total required for a successful campaign.
    pub target_amount: i128,
    /// Ledger timestamp at which funding closes and settlement opens.
    pub deadline: u64,
    /// Sum of all recorded contributions.
    pub total_amount: i128,
    /// Number of distinct contributors so far.
    pub contributor_count: u32,
    /// Current settlement status.
    pub settlement_state: SettlementState,
}
