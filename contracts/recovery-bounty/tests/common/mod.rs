//! A minimal token contract whose behaviour can be bent per test: it can skim a fee
//! on every transfer, report success without moving anything, or refuse to credit
//! specific receivers.

#![allow(dead_code)]

use bounty_test_utils::{set_time, terms_hash, START};
use recovery_bounty::{BountyConfig, RecoveryBountyContract, RecoveryBountyContractClient};
use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, panic_with_error,
    testutils::{Address as _, Events},
    Address, Env, IntoVal, Symbol, Val,
};

pub const RECOVERY_AMOUNT: i128 = 1_000_000_000;
pub const MIN_FUNDING: i128 = 100_000;
pub const INITIAL: u64 = 1_000;
pub const DECAY: u64 = 1_000;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    Standard,
    /// Burns 1% of every transfer.
    FeeOnTransfer,
    /// `transfer_from` returns without moving any balance.
    SilentNoop,
}

#[contracttype]
#[derive(Clone)]
enum MockKey {
    Mode,
    Balance(Address),
    Allowance(Address, Address),
    Blocked(Address),
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum MockError {
    InsufficientBalance = 1,
    InsufficientAllowance = 2,
    ReceiverBlocked = 3,
}

#[contract]
pub struct MockToken;

#[contractimpl]
impl MockToken {
    pub fn set_mode(env: Env, mode: Mode) {
        env.storage().instance().set(&MockKey::Mode, &mode);
    }

    pub fn set_blocked(env: Env, receiver: Address, blocked: bool) {
        env.storage()
            .instance()
            .set(&MockKey::Blocked(receiver), &blocked);
    }

    pub fn mint(env: Env, to: Address, amount: i128) {
        let balance = read_balance(&env, &to);
        write_balance(&env, &to, balance + amount);
    }

    pub fn balance(env: Env, id: Address) -> i128 {
        read_balance(&env, &id)
    }

    pub fn allowance(env: Env, from: Address, spender: Address) -> i128 {
        env.storage()
            .instance()
            .get(&MockKey::Allowance(from, spender))
            .unwrap_or(0)
    }

    pub fn approve(
        env: Env,
        from: Address,
        spender: Address,
        amount: i128,
        _expiration_ledger: u32,
    ) {
        from.require_auth();
        env.storage()
            .instance()
            .set(&MockKey::Allowance(from, spender), &amount);
    }

    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) {
        from.require_auth();
        move_balance(&env, &from, &to, amount);
    }

    pub fn transfer_from(env: Env, spender: Address, from: Address, to: Address, amount: i128) {
        spender.require_auth();
        if mode(&env) == Mode::SilentNoop {
            return;
        }
        let key = MockKey::Allowance(from.clone(), spender);
        let allowance: i128 = env.storage().instance().get(&key).unwrap_or(0);
        if allowance < amount {
            panic_with_error!(&env, MockError::InsufficientAllowance);
        }
        env.storage().instance().set(&key, &(allowance - amount));
        move_balance(&env, &from, &to, amount);
    }
}

/// Balances live in instance storage; keep it live for the longest test timeline.
fn keep_alive(env: &Env) {
    let max = env.storage().max_ttl();
    env.storage().instance().extend_ttl(max / 2, max);
}

fn mode(env: &Env) -> Mode {
    env.storage()
        .instance()
        .get(&MockKey::Mode)
        .unwrap_or(Mode::Standard)
}

fn read_balance(env: &Env, id: &Address) -> i128 {
    env.storage()
        .instance()
        .get(&MockKey::Balance(id.clone()))
        .unwrap_or(0)
}

fn write_balance(env: &Env, id: &Address, amount: i128) {
    env.storage()
        .instance()
        .set(&MockKey::Balance(id.clone()), &amount);
    keep_alive(env);
}

fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) {
    let blocked: bool = env
        .storage()
        .instance()
        .get(&MockKey::Blocked(to.clone()))
        .unwrap_or(false);
    if blocked {
        panic_with_error!(env, MockError::ReceiverBlocked);
    }

    let from_balance = read_balance(env, from);
    if from_balance < amount {
        panic_with_error!(env, MockError::InsufficientBalance);
    }
    let received = match mode(env) {
        Mode::FeeOnTransfer => amount - amount / 100,
        _ => amount,
    };
    write_balance(env, from, from_balance - amount);
    write_balance(env, to, read_balance(env, to) + received);
}

/// A bounty whose recovery and reward tokens are both mock tokens.
pub struct MockSetup<'a> {
    pub env: Env,
    pub client: RecoveryBountyContractClient<'a>,
    pub contract: Address,
    pub exploiter: Address,
    pub bridge: Address,
    pub reward: MockTokenClient<'a>,
    pub recovery: MockTokenClient<'a>,
}

impl<'a> MockSetup<'a> {
    pub fn new() -> Self {
        Self::with_periods(INITIAL, DECAY)
    }

    pub fn with_periods(initial_period: u64, decay_period: u64) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        set_time(&env, START);

        let reward = MockTokenClient::new(&env, &env.register(MockToken, ()));
        let recovery = MockTokenClient::new(&env, &env.register(MockToken, ()));

        let exploiter = Address::generate(&env);
        let bridge = Address::generate(&env);
        recovery.mint(&exploiter, &RECOVERY_AMOUNT);

        let contract = env.register(RecoveryBountyContract, ());
        let client = RecoveryBountyContractClient::new(&env, &contract);
        client.init(&BountyConfig {
            exploiter: exploiter.clone(),
            recovery_token: recovery.address.clone(),
            recovery_amount: RECOVERY_AMOUNT,
            recovery_destination: bridge.clone(),
            reward_token: reward.address.clone(),
            initial_period,
            decay_period,
            terms_hash: terms_hash(&env, "terms"),
            min_funding: MIN_FUNDING,
        });

        Self {
            env,
            client,
            contract,
            exploiter,
            bridge,
            reward,
            recovery,
        }
    }

    pub fn new_funder(&self, amount: i128) -> Address {
        let funder = Address::generate(&self.env);
        self.reward.mint(&funder, &amount);
        self.client.fund(&funder, &amount);
        funder
    }

    pub fn approve_recovery(&self) {
        self.recovery
            .approve(&self.exploiter, &self.contract, &RECOVERY_AMOUNT, &1_000);
    }

    pub fn at(&self, offset: u64) {
        set_time(&self.env, START + offset);
    }

    /// Events the bounty published during the last invocation, as `(topic, payload)`.
    pub fn bounty_events(&self) -> Vec<(Symbol, Val)> {
        self.env
            .events()
            .all()
            .iter()
            .filter(|(contract, _, _)| *contract == self.contract)
            .map(|(_, topics, data)| {
                let topic: Symbol = topics.get_unchecked(0).into_val(&self.env);
                (topic, data)
            })
            .collect()
    }
}
