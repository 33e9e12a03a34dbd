//! Shared helpers for the recovery bounty tests and benchmarks.
//!
//! Everything here runs against the Soroban test environment only.

use rand::{rngs::StdRng, Rng, SeedableRng};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    token, Address, Bytes, BytesN, Env,
};

/// One stroop-denominated XLM.
pub const XLM: i128 = 10_000_000;

/// Ledger timestamp tests initialize bounties at.
pub const START: u64 = 1_700_000_000;

pub const DAY: u64 = 86_400;

/// Target close time of a Stellar ledger.
pub const LEDGER_CLOSE_SECONDS: u64 = 5;

/// Stellar asset contract registered for a test, with its user and admin clients.
pub struct TestToken<'a> {
    pub address: Address,
    pub client: token::Client<'a>,
    pub admin: token::StellarAssetClient<'a>,
}

pub fn create_token_contract<'a>(e: &Env, admin: &Address) -> TestToken<'a> {
    let token_id = e.register_stellar_asset_contract_v2(admin.clone());
    let address = token_id.address();
    TestToken {
        client: token::Client::new(e, &address),
        admin: token::StellarAssetClient::new(e, &address),
        address,
    }
}

/// Approve `spender` for `amount`, valid for the next thousand ledgers.
pub fn approve(
    env: &Env,
    token: &token::Client,
    from: &Address,
    spender: &Address,
    amount: i128,
) {
    let expiration = env.ledger().sequence() + 1_000;
    token.approve(from, spender, &amount, &expiration);
}

pub fn set_time(env: &Env, timestamp: u64) {
    env.ledger().with_mut(|li| li.timestamp = timestamp);
}

pub fn advance_time(env: &Env, seconds: u64) {
    let now = env.ledger().timestamp();
    set_time(env, now + seconds);
}

/// Advance the clock and the ledger sequence together, one ledger per close interval,
/// so storage TTLs expire the way they would on the network.
pub fn advance_ledgers(env: &Env, seconds: u64) {
    env.ledger().with_mut(|li| {
        li.timestamp += seconds;
        li.sequence_number += (seconds / LEDGER_CLOSE_SECONDS) as u32;
    });
}

/// keccak-256 of a terms document.
pub fn terms_hash(env: &Env, text: &str) -> BytesN<32> {
    let bytes = Bytes::from_slice(env, text.as_bytes());
    env.crypto().keccak256(&bytes).to_bytes()
}

/// Parse a 32-byte digest published as hex, with or without a `0x` prefix.
pub fn digest_from_hex(env: &Env, digest: &str) -> BytesN<32> {
    let digest = digest.strip_prefix("0x").unwrap_or(digest);
    let raw = hex::decode(digest).expect("digest is not valid hex");
    let raw: [u8; 32] = raw.try_into().expect("digest is not 32 bytes");
    BytesN::from_array(env, &raw)
}

pub fn generate_funders(env: &Env, count: usize) -> std::vec::Vec<Address> {
    (0..count).map(|_| Address::generate(env)).collect()
}

/// Deterministic contribution sizes in `[min, max]`.
pub fn random_contributions(seed: u64, count: usize, min: i128, max: i128) -> std::vec::Vec<i128> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| rng.gen_range(min..=max)).collect()
}
