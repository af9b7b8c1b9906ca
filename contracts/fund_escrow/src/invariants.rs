#![allow(dead_code)]

extern crate std;

use soroban_sdk::token;

use crate::{Campaign, FundEscrowClient, SettlementState};

/// `total_amount` equals the sum of every recorded contribution.
pub fn assert_conservation(client: &FundEscrowClient) {
    let sum: i128 = client
        .contributors()
        .iter()
        .map(|contributor| client.contribution_of(&contributor))
        .sum();
    let total = client.total_amount();
    assert_eq!(
        total, sum,
        "total_amount {} != sum of contributions {}",
        total, sum
    );
}

/// While the campaign is active the escrow holds exactly what it has
/// recorded, no more and no less.
pub fn assert_escrow_holds_total(client: &FundEscrowClient, token: &token::Client) {
    if client.settlement_state() != SettlementState::Active {
        return;
    }
    let held = token.balance(&client.address);
    let total = client.total_amount();
    assert_eq!(
        held, total,
        "escrow holds {} but recorded {}",
        held, total
    );
}

/// No recorded contribution is negative.
pub fn assert_contributions_non_negative(client: &FundEscrowClient) {
    for contributor in client.contributors().iter() {
        let amount = client.contribution_of(&contributor);
        assert!(
            amount >= 0,
            "negative contribution {} recorded",
            amount
        );
    }
}

/// The contributor list never contains the same address twice.
pub fn assert_contributors_unique(client: &FundEscrowClient) {
    let contributors = client.contributors();
    for (i, a) in contributors.iter().enumerate() {
        for b in contributors.iter().skip(i + 1) {
            assert_ne!(a, b, "duplicate contributor entry");
        }
    }
}

/// After a refund every entry and the running total are zero.
pub fn assert_fully_refunded(client: &FundEscrowClient) {
    assert_eq!(client.settlement_state(), SettlementState::SettledRefunded);
    for contributor in client.contributors().iter() {
        assert_eq!(
            client.contribution_of(&contributor),
            0,
            "contribution left after refund"
        );
    }
    assert_eq!(client.total_amount(), 0, "total left after refund");
}

/// Only `Active -> Settled*` transitions exist.
pub fn assert_valid_settlement_transition(from: &SettlementState, to: &SettlementState) {
    let valid = matches!(
        (from, to),
        (SettlementState::Active, SettlementState::Active)
            | (SettlementState::Active, SettlementState::SettledWithdrawn)
            | (SettlementState::Active, SettlementState::SettledRefunded)
            | (SettlementState::SettledWithdrawn, SettlementState::SettledWithdrawn)
            | (SettlementState::SettledRefunded, SettlementState::SettledRefunded)
    );
    assert!(
        valid,
        "invalid settlement transition from {:?} to {:?}",
        from, to
    );
}

/// Campaign parameters never change after `init`.
pub fn assert_parameters_unchanged(original: &Campaign, current: &Campaign) {
    assert_eq!(original.owner, current.owner, "owner changed");
    assert_eq!(original.token, current.token, "token changed");
    assert_eq!(
        original.target_amount, current.target_amount,
        "target_amount changed"
    );
    assert_eq!(
        original.deadline, current.deadline,
        "deadline changed"
    );
}

/// Run all ledger invariants that hold at any observable point.
pub fn assert_all_ledger_invariants(client: &FundEscrowClient, token: &token::Client) {
    assert_conservation(client);
    assert_escrow_holds_total(client, token);
    assert_contributions_non_negative(client);
    assert_contributors_unique(client);
}
