//! Storage layout and TTL management.
//!
//! Configuration and the scalar bounty state live in instance storage. The
//! per-funder ledgers are persistent entries so the funder set can grow
//! without inflating the instance entry.
//!
//! Every entry is kept live until the bounty's expiry plus a refund grace
//! period. Entry points extend the instance on each call and refund paths
//! extend the funder entries they read.

use soroban_sdk::{contracttype, Address, Env};

use crate::decay::Schedule;
use crate::{BountyConfig, BountyState, Error};

pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;
pub(crate) const LEDGER_CLOSE_SECONDS: u64 = 5;
pub(crate) const INSTANCE_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
/// Entries stay live this long after expiry so funders can still refund.
pub(crate) const REFUND_GRACE_LEDGERS: u32 = 90 * DAY_IN_LEDGERS;

/// Storage keys used for contract data persistence.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable bounty configuration.
    Config,
    /// Timeline derived from the configuration and the init timestamp.
    Schedule,
    /// Mutable scalar state (acceptance, finalization, refund progress).
    State,
    /// Funder address by insertion order.
    Funder(u32),
    /// Cumulative contribution of a funder.
    Funded(Address),
    /// Refund already debited from the pool for a funder.
    Refunded(Address),
    /// Debited refund whose push transfer failed and awaits a claim.
    Credited(Address),
}

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Ledgers the bounty's entries must stay live from now: until expiry plus the
/// refund grace period, capped by the network's maximum TTL.
pub(crate) fn lifetime(env: &Env) -> u32 {
    let remaining = env
        .storage()
        .instance()
        .get::<_, Schedule>(&DataKey::Schedule)
        .map(|schedule| schedule.time_remaining(env.ledger().timestamp()))
        .unwrap_or(0);
    let until_expiry = u32::try_from(remaining / LEDGER_CLOSE_SECONDS).unwrap_or(u32::MAX);
    until_expiry
        .saturating_add(REFUND_GRACE_LEDGERS)
        .max(INSTANCE_BUMP_AMOUNT)
        .min(env.storage().max_ttl())
}

pub(crate) fn bump_instance(env: &Env) {
    let extend_to = lifetime(env);
    env.storage()
        .instance()
        .extend_ttl(extend_to.saturating_sub(DAY_IN_LEDGERS), extend_to);
}

fn bump_persistent(env: &Env, key: &DataKey) {
    let extend_to = lifetime(env);
    env.storage()
        .persistent()
        .extend_ttl(key, extend_to.saturating_sub(DAY_IN_LEDGERS), extend_to);
}

pub(crate) fn config(env: &Env) -> Result<BountyConfig, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub(crate) fn schedule(env: &Env) -> Result<Schedule, Error> {
    env.storage()
        .instance()
        .get(&DataKey::Schedule)
        .ok_or(Error::NotInitialized)
}

pub(crate) fn state(env: &Env) -> Result<BountyState, Error> {
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)
}

pub(crate) fn init(env: &Env, config: &BountyConfig, schedule: &Schedule, state: &BountyState) {
    let instance = env.storage().instance();
    instance.set(&DataKey::Config, config);
    instance.set(&DataKey::Schedule, schedule);
    instance.set(&DataKey::State, state);
    bump_instance(env);
}

pub(crate) fn set_state(env: &Env, state: &BountyState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

fn read_amount(env: &Env, key: &DataKey) -> i128 {
    env.storage().persistent().get(key).unwrap_or(0)
}

fn write_amount(env: &Env, key: &DataKey, amount: i128) {
    env.storage().persistent().set(key, &amount);
    bump_persistent(env, key);
}

pub(crate) fn funder_at(env: &Env, index: u32) -> Option<Address> {
    env.storage().persistent().get(&DataKey::Funder(index))
}

pub(crate) fn push_funder(env: &Env, index: u32, funder: &Address) {
    let key = DataKey::Funder(index);
    env.storage().persistent().set(&key, funder);
    bump_persistent(env, &key);
}

/// Keep a funder's ledger entries live while refunds are being processed.
pub(crate) fn bump_funder(env: &Env, index: Option<u32>, funder: &Address) {
    let keys = [
        DataKey::Funded(funder.clone()),
        DataKey::Refunded(funder.clone()),
        DataKey::Credited(funder.clone()),
    ];
    for key in keys.iter() {
        bump_if_present(env, key);
    }
    if let Some(index) = index {
        bump_if_present(env, &DataKey::Funder(index));
    }
}

fn bump_if_present(env: &Env, key: &DataKey) {
    if env.storage().persistent().has(key) {
        bump_persistent(env, key);
    }
}

pub(crate) fn funded(env: &Env, funder: &Address) -> i128 {
    read_amount(env, &DataKey::Funded(funder.clone()))
}

pub(crate) fn set_funded(env: &Env, funder: &Address, amount: i128) {
    write_amount(env, &DataKey::Funded(funder.clone()), amount);
}

pub(crate) fn refunded(env: &Env, funder: &Address) -> i128 {
    read_amount(env, &DataKey::Refunded(funder.clone()))
}

pub(crate) fn set_refunded(env: &Env, funder: &Address, amount: i128) {
    write_amount(env, &DataKey::Refunded(funder.clone()), amount);
}

pub(crate) fn credited(env: &Env, funder: &Address) -> i128 {
    read_amount(env, &DataKey::Credited(funder.clone()))
}

pub(crate) fn set_credited(env: &Env, funder: &Address, amount: i128) {
    write_amount(env, &DataKey::Credited(funder.clone()), amount);
}
