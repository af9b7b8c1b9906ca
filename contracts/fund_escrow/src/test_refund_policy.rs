//! Refunds are all-or-nothing: one recipient that cannot receive fails the
//! whole batch and leaves the campaign `Active` so the refund can be retried.

extern crate std;

use soroban_sdk::{
    contract, contractimpl, contracttype,
    testutils::{Address as _, Ledger},
    Address, Env,
};

use crate::{Error, FundEscrow, FundEscrowClient, SettlementState};

#[contracttype]
#[derive(Clone)]
enum GateKey {
    Balance(Address),
    Blocked(Address),
}

/// Minimal token that can be told to refuse transfers to an address.
#[contract]
pub struct GatedToken;

#[contractimpl]
impl GatedToken {
    pub fn mint(env: Env, to: Address, amount: i128) {
        let balance = Self::balance(env.clone(), to.clone());
        env.storage()
            .persistent()
            .set(&GateKey::Balance(to), &(balance + amount));
    }

    pub fn set_blocked(env: Env, id: Address, blocked: bool) {
        env.storage()
            .persistent()
            .set(&GateKey::Blocked(id), &blocked);
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        env.storage()
            .persistent()
            .get(&GateKey::Balance(id))
            .unwrap_or(0)
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        move_balance(&env, from, to, amount);
    }

    pub fn transfer_from(env: Env, _spender: Address, from: Address, to: Address, amount: i128) {
        move_balance(&env, from, to, amount);
    }
}

fn move_balance(env: &Env, from: Address, to: Address, amount: i128) {
    let blocked: bool = env
        .storage()
        .persistent()
        .get(&GateKey::Blocked(to.clone()))
        .unwrap_or(false);
    if blocked {
        panic!("recipient cannot receive");
    }

    let from_balance = GatedToken::balance(env.clone(), from.clone());
    if from_balance < amount {
        panic!("insufficient balance");
    }
    let to_balance = GatedToken::balance(env.clone(), to.clone());
    env.storage()
        .persistent()
        .set(&GateKey::Balance(from), &(from_balance - amount));
    env.storage()
        .persistent()
        .set(&GateKey::Balance(to), &(to_balance + amount));
}

const INITIAL_BALANCE: i128 = 1_000;

fn setup() -> (
    Env,
    FundEscrowClient<'static>,
    GatedTokenClient<'static>,
    std::vec::Vec<Address>,
    u64,
) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_700_000_000);

    let token_id = env.register(GatedToken, ());
    let token = GatedTokenClient::new(&env, &token_id);
    let escrow_id = env.register(FundEscrow, ());
    let client = FundEscrowClient::new(&env, &escrow_id);

    let owner = Address::generate(&env);
    let deadline = env.ledger().timestamp() + 86_400;
    client.init(&owner, &token_id, &5_000, &deadline);

    let users: std::vec::Vec<Address> = (0..3)
        .map(|_| {
            let user = Address::generate(&env);
            token.mint(&user, &INITIAL_BALANCE);
            client.fund(&user, &100);
            user
        })
        .collect();

    (env, client, token, users, deadline)
}

#[test]
fn test_refund_fails_atomically_when_one_recipient_rejects() {
    let (env, client, token, users, deadline) = setup();
    token.set_blocked(&users[1], &true);

    env.ledger().set_timestamp(deadline + 1);
    assert_eq!(client.try_refund(), Err(Ok(Error::AssetTransferFailed)));

    // Nothing moved, nothing was zeroed, the campaign is still open for settlement.
    assert_eq!(client.settlement_state(), SettlementState::Active);
    assert_eq!(client.total_amount(), 300);
    for user in users.iter() {
        assert_eq!(client.contribution_of(user), 100);
        assert_eq!(token.balance(user), INITIAL_BALANCE - 100);
    }
    assert_eq!(token.balance(&client.address), 300);
}

#[test]
fn test_refund_retry_succeeds_once_recipient_accepts() {
    let (env, client, token, users, deadline) = setup();
    token.set_blocked(&users[2], &true);

    env.ledger().set_timestamp(deadline + 1);
    assert_eq!(client.try_refund(), Err(Ok(Error::AssetTransferFailed)));

    token.set_blocked(&users[2], &false);
    client.refund();

    assert_eq!(client.settlement_state(), SettlementState::SettledRefunded);
    assert_eq!(client.total_amount(), 0);
    for user in users.iter() {
        assert_eq!(client.contribution_of(user), 0);
        assert_eq!(token.balance(user), INITIAL_BALANCE);
    }
    assert_eq!(token.balance(&client.address), 0);
}

#[test]
fn test_withdraw_failure_keeps_campaign_active() {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_700_000_000);

    let token_id = env.register(GatedToken, ());
    let token = GatedTokenClient::new(&env, &token_id);
    let client = FundEscrowClient::new(&env, &env.register(FundEscrow, ()));

    let owner = Address::generate(&env);
    let deadline = env.ledger().timestamp() + 86_400;
    client.init(&owner, &token_id, &100, &deadline);

    let user = Address::generate(&env);
    token.mint(&user, &INITIAL_BALANCE);
    client.fund(&user, &150);

    token.set_blocked(&owner, &true);
    env.ledger().set_timestamp(deadline);
    assert_eq!(
        client.try_withdraw(&owner),
        Err(Ok(Error::AssetTransferFailed))
    );
    assert_eq!(client.settlement_state(), SettlementState::Active);
    assert_eq!(token.balance(&client.address), 150);

    token.set_blocked(&owner, &false);
    client.withdraw(&owner);
    assert_eq!(token.balance(&owner), 150);
    assert_eq!(client.settlement_state(), SettlementState::SettledWithdrawn);
}
