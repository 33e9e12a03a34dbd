//! # Recovery Bounty Events Module
//!
//! Every state transition of the bounty publishes one of the events below so an
//! off-chain indexer can rebuild the full history (funding ledger, acceptance,
//! recovery and each refund) without reading contract storage.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Event Flow Diagram                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  init ──→ BountyInitialized                                  │
//! │    ↓                                                         │
//! │  fund ──→ Funded (repeatable, also after accept)             │
//! │    ↓                                                         │
//! │  accept ──→ Accepted (optional, freezes the percentage)      │
//! │    ↓                                                         │
//! │  ┌──────────┐                                                │
//! │  │ Outcome  │                                                │
//! │  └────┬─────┘                                                │
//! │       ├──→ recover ──→ Recovered + RefundsEnabled            │
//! │       └──→ expiry  ──→ RefundsEnabled                        │
//! │                 ↓                                            │
//! │       refund_batch ──→ Refunded | RefundCredited             │
//! │       claim_refund ──→ RefundClaimed                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env};

// ============================================================================
// Initialization
// ============================================================================

/// Event emitted once when the bounty is initialized.
///
/// # Event Topic
/// Symbol: `init`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyInitialized {
    pub exploiter: Address,
    pub recovery_token: Address,
    pub recovery_amount: i128,
    pub reward_token: Address,
    pub start: u64,
    pub expiry: u64,
    pub terms_hash: BytesN<32>,
}

// ============================================================================
// Funding
// ============================================================================

/// Event emitted for every accepted contribution, including top-ups.
///
/// # Fields
/// * `funder` - Contributing address
/// * `amount` - Amount added by this call
/// * `funder_total` - Cumulative contribution of `funder` after this call
/// * `total_funded` - Cumulative contribution of all funders after this call
///
/// # Event Topic
/// Symbol: `fund`
/// Indexed: `funder`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Funded {
    pub funder: Address,
    pub amount: i128,
    pub funder_total: i128,
    pub total_funded: i128,
}

// ============================================================================
// Acceptance & Recovery
// ============================================================================

/// Event emitted when the exploiter accepts the terms.
///
/// `percent_bps` is the payout percentage frozen by this acceptance.
///
/// # Event Topic
/// Symbol: `accept`
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Accepted {
    pub exploiter: Address,
    pub accepted_at: u64,
    pub percent_bps: u32,
    pub terms_hash: BytesN<32>,
}

/// Event emitted when the recovered tokens reached the destination and the
/// reward was paid.
///
/// # State Transition
/// ```text
/// OPEN | ACCEPTED → FINALIZED (terminal)
/// ```
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Recovered {
    pub exploiter: Address,
    pub destination: Address,
    pub recovered: i128,
    pub payout: i128,
    pub percent_bps: u32,
    pub timestamp: u64,
}

// ============================================================================
// Refunds
// ============================================================================

/// Event emitted when the refund pool is snapshotted.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundsEnabled {
    pub snapshot: i128,
    pub total_funded: i128,
    pub finalized: bool,
    pub timestamp: u64,
}

/// Event emitted when a batch pushed a refund to a funder.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Refunded {
    pub funder: Address,
    pub amount: i128,
}

/// Event emitted when a batch could not push a refund and credited it for a
/// later claim instead.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundCredited {
    pub funder: Address,
    pub amount: i128,
    pub credited_total: i128,
}

/// Event emitted when a funder pulled their refund.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundClaimed {
    pub funder: Address,
    pub amount: i128,
}

// ============================================================================
// Event Emission Functions
// ============================================================================

pub fn emit_bounty_initialized(env: &Env, event: BountyInitialized) {
    let topics = (symbol_short!("init"),);
    env.events().publish(topics, event);
}

pub fn emit_funded(env: &Env, event: Funded) {
    let topics = (symbol_short!("fund"), event.funder.clone());
    env.events().publish(topics, event);
}

pub fn emit_accepted(env: &Env, event: Accepted) {
    let topics = (symbol_short!("accept"),);
    env.events().publish(topics, event);
}

pub fn emit_recovered(env: &Env, event: Recovered) {
    let topics = (symbol_short!("recover"),);
    env.events().publish(topics, event);
}

pub fn emit_refunds_enabled(env: &Env, event: RefundsEnabled) {
    let topics = (symbol_short!("ref_on"),);
    env.events().publish(topics, event);
}

pub fn emit_refunded(env: &Env, event: Refunded) {
    let topics = (symbol_short!("refund"), event.funder.clone());
    env.events().publish(topics, event);
}

pub fn emit_refund_credited(env: &Env, event: RefundCredited) {
    let topics = (symbol_short!("ref_cred"), event.funder.clone());
    env.events().publish(topics, event);
}

pub fn emit_refund_claimed(env: &Env, event: RefundClaimed) {
    let topics = (symbol_short!("claim"), event.funder.clone());
    env.events().publish(topics, event);
}
