extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, IntoVal, Symbol, TryIntoVal, Val, Vec,
};

use crate::events::{
    CampaignCreated, ContributionReceived, ContributionRefunded, FundsWithdrawn, RefundSettled,
};
use crate::{FundEscrow, FundEscrowClient};

fn setup() -> (Env, FundEscrowClient<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(1_700_000_000);
    let contract_id = env.register(FundEscrow, ());
    let client = FundEscrowClient::new(&env, &contract_id);
    (env, client)
}

fn create_token<'a>(
    env: &Env,
    admin: &Address,
) -> (token::Client<'a>, token::StellarAssetClient<'a>) {
    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    (
        token::Client::new(env, &sac.address()),
        token::StellarAssetClient::new(env, &sac.address()),
    )
}

/// Events published by the escrow itself, token contract events filtered out.
fn escrow_events(env: &Env, client: &FundEscrowClient) -> std::vec::Vec<(Vec<Val>, Val)> {
    env.events()
        .all()
        .iter()
        .filter(|(contract, _, _)| *contract == client.address)
        .map(|(_, topics, data)| (topics, data))
        .collect()
}

fn topics_of(env: &Env, symbol: Symbol, address: &Address) -> Vec<Val> {
    vec![env, symbol.into_val(env), address.into_val(env)]
}

fn fund(env: &Env, client: &FundEscrowClient, token: &token::Client, user: &Address, amount: i128) {
    let expiration = env.ledger().sequence() + 1_000;
    token.approve(user, &client.address, &amount, &expiration);
    client.fund(user, &amount);
}

#[test]
fn test_campaign_created_event() {
    let (env, client) = setup();
    let owner = Address::generate(&env);
    let token = Address::generate(&env);
    let deadline = env.ledger().timestamp() + 86_400;

    client.init(&owner, &token, &5_000, &deadline);

    let events = escrow_events(&env, &client);
    let (topics, data) = events.last().expect("No events found").clone();
    assert_eq!(topics, topics_of(&env, symbol_short!("created"), &owner));

    let event_data: CampaignCreated = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        CampaignCreated {
            owner,
            token,
            target_amount: 5_000,
            deadline,
        }
    );
}

#[test]
fn test_contribution_received_event() {
    let (env, client) = setup();
    let owner = Address::generate(&env);
    let donor = Address::generate(&env);
    let (token, asset_admin) = create_token(&env, &Address::generate(&env));
    client.init(&owner, &token.address, &5_000, &(env.ledger().timestamp() + 86_400));
    asset_admin.mint(&donor, &1_000);

    fund(&env, &client, &token, &donor, 400);

    let events = escrow_events(&env, &client);
    let (topics, data) = events.last().expect("No events found").clone();
    assert_eq!(topics, topics_of(&env, symbol_short!("funded"), &donor));

    let event_data: ContributionReceived = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ContributionReceived {
            contributor: donor.clone(),
            amount: 400,
            total_amount: 400,
        }
    );

    fund(&env, &client, &token, &donor, 100);
    let events = escrow_events(&env, &client);
    let (_, data) = events.last().expect("No events found").clone();
    let event_data: ContributionReceived = data.try_into_val(&env).unwrap();
    assert_eq!(event_data.amount, 100);
    assert_eq!(event_data.total_amount, 500);
}

#[test]
fn test_funds_withdrawn_event() {
    let (env, client) = setup();
    let owner = Address::generate(&env);
    let donor = Address::generate(&env);
    let (token, asset_admin) = create_token(&env, &Address::generate(&env));
    let deadline = env.ledger().timestamp() + 86_400;
    client.init(&owner, &token.address, &1_000, &deadline);
    asset_admin.mint(&donor, &1_500);
    fund(&env, &client, &token, &donor, 1_500);

    env.ledger().set_timestamp(deadline);
    client.withdraw(&owner);

    let events = escrow_events(&env, &client);
    let (topics, data) = events.last().expect("No events found").clone();
    assert_eq!(topics, topics_of(&env, symbol_short!("withdrawn"), &owner));

    let event_data: FundsWithdrawn = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsWithdrawn {
            owner,
            amount: 1_500,
        }
    );
}

#[test]
fn test_refund_events() {
    let (env, client) = setup();
    let owner = Address::generate(&env);
    let (token, asset_admin) = create_token(&env, &Address::generate(&env));
    let deadline = env.ledger().timestamp() + 86_400;
    client.init(&owner, &token.address, &10_000, &deadline);

    let donors: std::vec::Vec<Address> = (0..3).map(|_| Address::generate(&env)).collect();
    for (i, donor) in donors.iter().enumerate() {
        asset_admin.mint(donor, &1_000);
        fund(&env, &client, &token, donor, 100 * (i as i128 + 1));
    }

    env.ledger().set_timestamp(deadline + 1);
    client.refund();

    let all = escrow_events(&env, &client);
    assert!(all.len() >= 4);
    let events = &all[all.len() - 4..];

    for (i, donor) in donors.iter().enumerate() {
        let (topics, data) = events[i].clone();
        assert_eq!(topics, topics_of(&env, symbol_short!("refunded"), donor));
        let event_data: ContributionRefunded = data.try_into_val(&env).unwrap();
        assert_eq!(
            event_data,
            ContributionRefunded {
                contributor: donor.clone(),
                amount: 100 * (i as i128 + 1),
            }
        );
    }

    let (topics, data) = events[3].clone();
    assert_eq!(
        topics,
        topics_of(&env, symbol_short!("settled"), &client.address)
    );
    let event_data: RefundSettled = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        RefundSettled {
            refunded_count: 3,
            refunded_total: 600,
        }
    );
}
