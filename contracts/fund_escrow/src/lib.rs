// contracts/fund_escrow/src/lib.rs

//! # Fund Escrow Contract
//!
//! A time-bounded crowdfunding escrow. Contributors deposit a single token
//! toward a target before a deadline; after the deadline the campaign settles
//! exactly once, either by the owner withdrawing everything (target met) or by
//! every contributor being paid back in full (target missed).
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Bootstrap    | [`FundEscrow::init`]                                  |
//! | Funding      | [`FundEscrow::fund`]                                  |
//! | Settlement   | [`FundEscrow::withdraw`], [`FundEscrow::refund`]      |
//! | Queries      | `get_campaign`, `contribution_of`, `contributors`, …  |
//!
//! ## Architecture
//!
//! Storage access is fully delegated to [`storage`], event payloads to
//! [`events`]. This file holds the entry points and the settlement rules.
//!
//! ## Ordering
//!
//! `fund` pulls tokens before touching the ledger. `withdraw` and `refund`
//! write the terminal settlement state before sending any tokens out. Any
//! entry point that returns an error has all of its storage writes, events
//! and nested transfers rolled back by the host.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, token, Address, Env, Vec};

pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_refund_policy;

use events::{
    CampaignCreated, ContributionReceived, ContributionRefunded, FundsWithdrawn, RefundSettled,
};
pub use types::{Campaign, CampaignConfig, CampaignState, SettlementState};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized  = 1,
    NotInitialized      = 2,
    InvalidTarget       = 3,
    InvalidDeadline     = 4,
    CampaignClosed      = 5,
    CampaignExpired     = 6,
    ZeroAmount          = 7,
    AssetTransferFailed = 8,
    NotOwner            = 9,
    AlreadySettled      = 10,
    DeadlineNotReached  = 11,
    TargetNotMet        = 12,
    TargetAlreadyMet    = 13,
}

#[contract]
pub struct FundEscrow;

#[contractimpl]
impl FundEscrow {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Configure the campaign. Must be called exactly once after deployment.
    ///
    /// - `owner` must authorize and is the only address allowed to withdraw.
    /// - `token` is the asset every contribution and payout is made in.
    /// - `target_amount` must be positive.
    /// - `deadline` is a ledger timestamp and must lie in the future.
    pub fn init(
        env: Env,
        owner: Address,
        token: Address,
        target_amount: i128,
        deadline: u64,
    ) -> Result<(), Error> {
        owner.require_auth();

        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }
        if target_amount <= 0 {
            return Err(Error::InvalidTarget);
        }
        if deadline <= env.ledger().timestamp() {
            return Err(Error::InvalidDeadline);
        }

        let config = CampaignConfig {
            owner: owner.clone(),
            token: token.clone(),
            target_amount,
            deadline,
        };
        let state = CampaignState {
            total_amount: 0,
            settlement: SettlementState::Active,
        };
        storage::save_new_campaign(&env, &config, &state);

        events::emit_campaign_created(
            &env,
            CampaignCreated {
                owner,
                token,
                target_amount,
                deadline,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Contribution intake
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` tokens to the campaign.
    ///
    /// The contributor must have approved this contract for at least `amount`
    /// on the token beforehand; the tokens are pulled with `transfer_from`.
    pub fn fund(env: Env, contributor: Address, amount: i128) -> Result<(), Error> {
        contributor.require_auth();

        let config = storage::load_config(&env)?;
        let mut state = storage::load_state(&env)?;

        if state.settlement.is_settled() {
            return Err(Error::CampaignClosed);
        }
        if env.ledger().timestamp() >= config.deadline {
            return Err(Error::CampaignExpired);
        }
        if amount <= 0 {
            return Err(Error::ZeroAmount);
        }

        // Pull first: nothing below runs unless the tokens arrived.
        let escrow = env.current_contract_address();
        let token_client = token::Client::new(&env, &config.token);
        let pulled = token_client.try_transfer_from(&escrow, &contributor, &escrow, &amount);
        if !matches!(pulled, Ok(Ok(()))) {
            return Err(Error::AssetTransferFailed);
        }

        let previous = match storage::load_contribution(&env, &contributor) {
            Some(previous) => previous,
            None => {
                storage::push_contributor(&env, &contributor);
                0
            }
        };
        storage::save_contribution(&env, &contributor, previous + amount);

        state.total_amount += amount;
        storage::save_state(&env, &state);

        events::emit_contribution_received(
            &env,
            ContributionReceived {
                contributor,
                amount,
                total_amount: state.total_amount,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Send the escrow's whole token balance to the owner.
    ///
    /// Only succeeds once the deadline has been reached and the target met.
    pub fn withdraw(env: Env, caller: Address) -> Result<(), Error> {
        caller.require_auth();

        let config = storage::load_config(&env)?;
        let mut state = storage::load_state(&env)?;

        if state.settlement.is_settled() {
            return Err(Error::AlreadySettled);
        }
        if caller != config.owner {
            return Err(Error::NotOwner);
        }
        if env.ledger().timestamp() < config.deadline {
            return Err(Error::DeadlineNotReached);
        }
        if state.total_amount < config.target_amount {
            return Err(Error::TargetNotMet);
        }

        state.settlement = SettlementState::SettledWithdrawn;
        storage::save_state(&env, &state);

        let escrow = env.current_contract_address();
        let token_client = token::Client::new(&env, &config.token);
        let held = token_client.balance(&escrow);
        if held > 0 {
            let sent = token_client.try_transfer(&escrow, &config.owner, &held);
            if !matches!(sent, Ok(Ok(()))) {
                return Err(Error::AssetTransferFailed);
            }
        }

        events::emit_funds_withdrawn(
            &env,
            FundsWithdrawn {
                owner: config.owner,
                amount: held,
            },
        );
        Ok(())
    }

    /// Pay every contributor back their recorded amount.
    ///
    /// Callable by anyone once the deadline has been reached with the target
    /// missed. The batch is all-or-nothing: if a single transfer fails the
    /// whole call fails, nobody is paid and the campaign stays `Active`, so the
    /// refund can be retried.
    pub fn refund(env: Env) -> Result<(), Error> {
        let config = storage::load_config(&env)?;
        let mut state = storage::load_state(&env)?;

        if state.settlement.is_settled() {
            return Err(Error::AlreadySettled);
        }
        if env.ledger().timestamp() < config.deadline {
            return Err(Error::DeadlineNotReached);
        }
        if state.total_amount >= config.target_amount {
            return Err(Error::TargetAlreadyMet);
        }

        state.settlement = SettlementState::SettledRefunded;
        storage::save_state(&env, &state);

        let escrow = env.current_contract_address();
        let token_client = token::Client::new(&env, &config.token);
        let mut refunded_count: u32 = 0;
        let mut refunded_total: i128 = 0;

        for contributor in storage::load_contributors(&env).iter() {
            let amount = storage::load_contribution(&env, &contributor).unwrap_or(0);
            if amount == 0 {
                continue;
            }

            storage::save_contribution(&env, &contributor, 0);
            let sent = token_client.try_transfer(&escrow, &contributor, &amount);
            if !matches!(sent, Ok(Ok(()))) {
                return Err(Error::AssetTransferFailed);
            }

            refunded_count += 1;
            refunded_total += amount;
            events::emit_contribution_refunded(
                &env,
                ContributionRefunded {
                    contributor,
                    amount,
                },
            );
        }

        state.total_amount -= refunded_total;
        storage::save_state(&env, &state);

        events::emit_refund_settled(
            &env,
            RefundSettled {
                refunded_count,
                refunded_total,
            },
        );
        Ok(())
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Full campaign view: parameters, running total and settlement status.
    pub fn get_campaign(env: Env) -> Result<Campaign, Error> {
        storage::load_campaign(&env)
    }

    /// Amount currently recorded for `contributor` (0 if they never funded,
    /// or after they were refunded).
    pub fn contribution_of(env: Env, contributor: Address) -> Result<i128, Error> {
        storage::load_config(&env)?;
        Ok(storage::load_contribution(&env, &contributor).unwrap_or(0))
    }

    /// Every address that ever funded the campaign, in first-funding order.
    pub fn contributors(env: Env) -> Result<Vec<Address>, Error> {
        storage::load_config(&env)?;
        Ok(storage::load_contributors(&env))
    }

    pub fn total_amount(env: Env) -> Result<i128, Error> {
        Ok(storage::load_state(&env)?.total_amount)
    }

    pub fn target_amount(env: Env) -> Result<i128, Error> {
        Ok(storage::load_config(&env)?.target_amount)
    }

    pub fn deadline(env: Env) -> Result<u64, Error> {
        Ok(storage::load_config(&env)?.deadline)
    }

    pub fn owner(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.owner)
    }

    pub fn token_address(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.token)
    }

    pub fn settlement_state(env: Env) -> Result<SettlementState, Error> {
        Ok(storage::load_state(&env)?.settlement)
    }

    /// `true` once the running total has reached the target.
    pub fn is_target_met(env: Env) -> Result<bool, Error> {
        let config = storage::load_config(&env)?;
        let state = storage::load_state(&env)?;
        Ok(state.total_amount >= config.target_amount)
    }
}
