//! Fixtures shared by the recovery bounty benchmarks.

use bounty_test_utils::{
    approve, create_token_contract, generate_funders, set_time, terms_hash, TestToken, START, XLM,
};
use recovery_bounty::{BountyConfig, RecoveryBountyContract, RecoveryBountyContractClient};
use soroban_sdk::{testutils::Address as _, Address, Env};

pub const INITIAL: u64 = 1_000;
pub const DECAY: u64 = 1_000;
pub const RECOVERY_AMOUNT: i128 = 1_000_000_000;

pub struct Bench<'a> {
    pub env: Env,
    pub client: RecoveryBountyContractClient<'a>,
    pub contract: Address,
    pub exploiter: Address,
    pub reward: TestToken<'a>,
    pub recovery: TestToken<'a>,
    pub funders: Vec<Address>,
}

/// A bounty with `funders` contributors of one XLM each.
///
/// Budget limits are lifted so large funder sets can be measured.
pub fn funded_bounty<'a>(funders: usize) -> Bench<'a> {
    let env = Env::default();
    env.mock_all_auths();
    env.cost_estimate().budget().reset_unlimited();
    set_time(&env, START);

    let admin = Address::generate(&env);
    let reward = create_token_contract(&env, &admin);
    let recovery = create_token_contract(&env, &admin);
    let exploiter = Address::generate(&env);
    recovery.admin.mint(&exploiter, &RECOVERY_AMOUNT);

    let contract = env.register(RecoveryBountyContract, ());
    let client = RecoveryBountyContractClient::new(&env, &contract);
    client.init(&BountyConfig {
        exploiter: exploiter.clone(),
        recovery_token: recovery.address.clone(),
        recovery_amount: RECOVERY_AMOUNT,
        recovery_destination: Address::generate(&env),
        reward_token: reward.address.clone(),
        initial_period: INITIAL,
        decay_period: DECAY,
        terms_hash: terms_hash(&env, "bench"),
        min_funding: 100_000,
    });

    let funders = generate_funders(&env, funders);
    for funder in &funders {
        reward.admin.mint(funder, &XLM);
        client.fund(funder, &XLM);
    }

    Bench {
        env,
        client,
        contract,
        exploiter,
        reward,
        recovery,
        funders,
    }
}

impl Bench<'_> {
    pub fn expire(&self) {
        set_time(&self.env, START + INITIAL + DECAY);
    }

    pub fn approve_recovery(&self) {
        approve(
            &self.env,
            &self.recovery.client,
            &self.exploiter,
            &self.contract,
            RECOVERY_AMOUNT,
        );
    }
}
