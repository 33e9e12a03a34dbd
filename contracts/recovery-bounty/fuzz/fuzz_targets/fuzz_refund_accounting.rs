#![no_main]

use bounty_test_utils::{create_token_contract, set_time, terms_hash, START};
use libfuzzer_sys::fuzz_target;
use recovery_bounty::{BountyConfig, RecoveryBountyContract, RecoveryBountyContractClient};
use soroban_sdk::{testutils::Address as _, Address, Env};

const INITIAL: u64 = 1_000;
const DECAY: u64 = 1_000;
const MIN_FUNDING: i128 = 100_000;

fuzz_target!(|input: (Vec<u32>, u16, u8)| {
    let (contributions, recover_at, batch) = input;
    if contributions.is_empty() || contributions.len() > 32 {
        return;
    }

    let env = Env::default();
    env.mock_all_auths();
    set_time(&env, START);

    let admin = Address::generate(&env);
    let reward = create_token_contract(&env, &admin);
    let recovery = create_token_contract(&env, &admin);
    let exploiter = Address::generate(&env);
    recovery.admin.mint(&exploiter, &1_000);

    let contract = env.register(RecoveryBountyContract, ());
    let client = RecoveryBountyContractClient::new(&env, &contract);
    client.init(&BountyConfig {
        exploiter: exploiter.clone(),
        recovery_token: recovery.address.clone(),
        recovery_amount: 1_000,
        recovery_destination: Address::generate(&env),
        reward_token: reward.address.clone(),
        initial_period: INITIAL,
        decay_period: DECAY,
        terms_hash: terms_hash(&env, "fuzz"),
        min_funding: MIN_FUNDING,
    });

    let mut funders = Vec::new();
    for amount in &contributions {
        let amount = MIN_FUNDING + i128::from(*amount);
        let funder = Address::generate(&env);
        reward.admin.mint(&funder, &amount);
        client.fund(&funder, &amount);
        funders.push(funder);
    }

    let recover_at = u64::from(recover_at) % (INITIAL + DECAY);
    set_time(&env, START + recover_at);
    let expiration = env.ledger().sequence() + 1_000;
    recovery
        .client
        .approve(&exploiter, &contract, &1_000, &expiration);
    let payout = client.recover();

    let snapshot = client.refund_snapshot();
    assert_eq!(payout + snapshot, client.total_funded());

    let batch = u32::from(batch.max(1));
    while client.refund_batch(&batch) > 0 {}

    let refunded: i128 = funders.iter().map(|f| reward.client.balance(f)).sum();
    assert!(refunded <= snapshot);
    assert!(snapshot - refunded < funders.len() as i128);
});
