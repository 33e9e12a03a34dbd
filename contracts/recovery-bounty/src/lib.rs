//! # Recovery Bounty Contract
//!
//! This contract escrows a reward pool that is paid to the holder of stolen tokens (the
//! exploiter) in exchange for returning a fixed amount of those tokens. The reward decays
//! over time, and if the tokens never come back, every funder is refunded pro-rata.
//!
//! ## Overview
//!
//! Anyone can contribute to the reward pool while the bounty is open. During the initial
//! window the exploiter earns the whole pool; afterwards the share falls linearly to zero
//! over the decay window. The exploiter may `accept` at any point before expiry, which
//! freezes the payout *percentage* at the acceptance timestamp. Top-ups made after the
//! acceptance still scale by that frozen percentage.
//!
//! `recover` is the atomic swap: it pulls the tokens from the exploiter into the recovery
//! destination, checks the destination balance moved by exactly the expected amount, pays
//! the reward and finalizes the bounty. Whatever stays in the pool is refunded to funders.
//!
//! ## Key Features
//!
//! - **Multi-funder ledger**: per-funder contributions, no duplicate funder entries on top-ups
//! - **Acceptance freeze**: the payout percentage is locked at `accept` time
//! - **Balance-delta verification**: fee-on-transfer and false-success tokens are rejected
//! - **Bounded batch refunds**: `refund_batch` touches at most `max` funders per call
//! - **Pull fallback**: refunds that cannot be pushed are credited and claimable
//! - **Event Emission**: every state change emits an event for off-chain indexing
//!
//! ## Security Model
//!
//! - **Authorization**: `fund`, `accept` and `claim_refund` require the caller's signature;
//!   `recover` and `refund_batch` are permissionless since their effects are fixed
//! - **Reentrancy**: Soroban does not allow a contract to be re-entered
//! - **Untrusted tokens**: the recovery token's own success signal is never trusted
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! // 1. Initialize (one-time); START is the current ledger timestamp
//! contract.init(env, config);
//!
//! // 2. Funders contribute to the reward pool
//! contract.fund(env, funder, amount);
//!
//! // 3. Exploiter approves the contract on the recovery token and optionally accepts
//! contract.accept(env, exploiter);
//!
//! // 4. Anyone submits the swap
//! contract.recover(env);
//!
//! // 5. Or, after expiry without a live acceptance, refund funders
//! contract.refund_batch(env, 25);
//! ```

#![no_std]

pub mod decay;
mod events;
mod storage;

use soroban_sdk::{
    contract, contracterror, contractimpl, contracttype, log, token, Address, Bytes, BytesN, Env,
};

use decay::Schedule;
pub use events::*;
pub use storage::DataKey;

/// Contract errors that can occur during bounty operations.
///
/// Each variant carries a stable error code.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Contract has already been initialized and cannot be initialized again.
    AlreadyInitialized = 1,
    /// Contract has not been initialized yet. Call `init` first.
    NotInitialized = 2,
    /// The configuration passed to `init` is not usable.
    InvalidConfig = 3,
    /// The bounty has been finalized by a successful recovery.
    Finalized = 4,
    /// Refunds have started; the bounty no longer accepts funds or recoveries.
    RefundsStarted = 5,
    /// The bounty has expired and no longer accepts funds.
    FundingClosed = 6,
    /// Contribution is smaller than the configured minimum.
    BelowMinimum = 7,
    /// Only the designated exploiter may accept.
    OnlyExploiter = 8,
    /// The exploiter has already accepted.
    AlreadyAccepted = 9,
    /// Acceptance attempted at or after expiry.
    TooLate = 10,
    /// The exploiter has not approved the contract for the full recovery amount.
    InsufficientAllowance = 11,
    /// The exploiter does not hold the full recovery amount.
    InsufficientBalance = 12,
    /// Recovery attempted after expiry without a prior acceptance.
    Expired = 13,
    /// Pulling the recovery tokens from the exploiter failed.
    TransferFailed = 14,
    /// The recovery destination did not receive exactly the recovery amount.
    RecoveryMismatch = 15,
    /// Paying the reward to the exploiter failed.
    PayoutFailed = 16,
    /// Refunds cannot start before expiry.
    NotExpired = 17,
    /// A live acceptance still backs a pending recovery.
    LockedByAcceptance = 18,
    /// Batch size must be greater than zero.
    BadBatchSize = 19,
    /// There are no funders to refund.
    NoFunders = 20,
    /// Nothing is owed to this funder.
    NothingDue = 21,
    /// The refund could not be transferred to the claimant.
    RefundFailed = 22,
    /// No funder exists at the requested index.
    FunderNotFound = 23,
    /// Arithmetic overflow.
    Overflow = 24,
}

/// Immutable parameters of a bounty, supplied once to `init`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyConfig {
    /// The only address allowed to accept the terms.
    pub exploiter: Address,
    /// Token contract of the stolen asset.
    pub recovery_token: Address,
    /// Exact amount of `recovery_token` the exploiter must return.
    pub recovery_amount: i128,
    /// Address receiving the recovered tokens (bridge or treasury).
    pub recovery_destination: Address,
    /// Token the reward pool is denominated in (typically native XLM).
    pub reward_token: Address,
    /// Seconds of full payout after `init`.
    pub initial_period: u64,
    /// Seconds of linear decay following the initial period.
    pub decay_period: u64,
    /// keccak-256 digest of the off-chain terms text.
    pub terms_hash: BytesN<32>,
    /// Smallest contribution `fund` accepts.
    pub min_funding: i128,
}

/// Mutable state of a bounty.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountyState {
    /// Ledger timestamp of the acceptance, `None` until the exploiter accepts.
    pub accepted_at: Option<u64>,
    /// Set by a successful recovery; terminal.
    pub finalized: bool,
    /// Sum of every contribution ever made.
    pub total_funded: i128,
    /// Number of distinct funders.
    pub funder_count: u32,
    pub refunds_enabled: bool,
    /// Reward balance captured when refunds were enabled.
    pub refund_snapshot: i128,
    /// Index of the next funder `refund_batch` will process.
    pub refund_cursor: u32,
}

/// Read-only view combining the stored state with values derived from the ledger.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BountySnapshot {
    pub state: BountyState,
    pub reward_balance: i128,
    pub current_payout: i128,
    pub percent_bps: u32,
    pub time_remaining: u64,
    pub expiry: u64,
}

/// The main recovery bounty contract.
///
/// This contract must be initialized before use with the `init` function.
#[contract]
pub struct RecoveryBountyContract;

#[contractimpl]
impl RecoveryBountyContract {
    /// Initialize the bounty.
    ///
    /// The current ledger timestamp becomes `START`; the timeline, the exploiter, the tokens and
    /// the terms digest are fixed from here on.
    ///
    /// # Arguments
    ///
    /// * `env` - The contract execution environment
    /// * `config` - Immutable bounty parameters
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If initialization succeeds
    /// * `Err(Error::AlreadyInitialized)` - If the contract has already been initialized
    /// * `Err(Error::InvalidConfig)` - If the decay period is zero, an amount is not positive,
    ///   the timeline overflows, or the destination is the exploiter
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = BountyConfig {
    ///     exploiter,
    ///     recovery_token,
    ///     recovery_amount: 2_489_894_000_000_000_000,
    ///     recovery_destination: bridge,
    ///     reward_token: xlm,
    ///     initial_period: 1_900_800, // 22 days
    ///     decay_period: 604_800,     // 7 days
    ///     terms_hash,
    ///     min_funding: 100_000,      // 0.01 XLM
    /// };
    /// contract.init(env, config)?;
    /// ```
    pub fn init(env: Env, config: BountyConfig) -> Result<(), Error> {
        if storage::is_initialized(&env) {
            return Err(Error::AlreadyInitialized);
        }

        if config.recovery_amount <= 0
            || config.min_funding <= 0
            || config.recovery_destination == config.exploiter
        {
            return Err(Error::InvalidConfig);
        }

        let start = env.ledger().timestamp();
        let schedule = Schedule::new(start, config.initial_period, config.decay_period)
            .ok_or(Error::InvalidConfig)?;

        let state = BountyState {
            accepted_at: None,
            finalized: false,
            total_funded: 0,
            funder_count: 0,
            refunds_enabled: false,
            refund_snapshot: 0,
            refund_cursor: 0,
        };
        storage::init(&env, &config, &schedule, &state);

        emit_bounty_initialized(
            &env,
            BountyInitialized {
                exploiter: config.exploiter,
                recovery_token: config.recovery_token,
                recovery_amount: config.recovery_amount,
                reward_token: config.reward_token,
                start,
                expiry: schedule.expiry(),
                terms_hash: config.terms_hash,
            },
        );

        Ok(())
    }

    /// Contribute to the reward pool.
    ///
    /// Transfers `amount` of the reward token from `funder` to the contract. The first
    /// contribution registers the funder; later ones top up the same ledger entry.
    ///
    /// # Arguments
    ///
    /// * `env` - The contract execution environment
    /// * `funder` - Contributing address (must authorize this transaction)
    /// * `amount` - Amount of reward token, at least `min_funding`
    ///
    /// # Returns
    ///
    /// * `Ok(i128)` - The funder's cumulative contribution
    /// * `Err(Error::Finalized)` - If the bounty was already recovered
    /// * `Err(Error::RefundsStarted)` - If refunds have begun
    /// * `Err(Error::FundingClosed)` - If the bounty has expired
    /// * `Err(Error::BelowMinimum)` - If `amount < min_funding`
    ///
    /// # Panics
    ///
    /// Panics if the token transfer fails (e.g., insufficient balance).
    pub fn fund(env: Env, funder: Address, amount: i128) -> Result<i128, Error> {
        storage::bump_instance(&env);
        funder.require_auth();

        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let mut state = storage::state(&env)?;

        if state.finalized {
            return Err(Error::Finalized);
        }
        if state.refunds_enabled {
            return Err(Error::RefundsStarted);
        }
        if schedule.is_expired(env.ledger().timestamp()) {
            return Err(Error::FundingClosed);
        }
        if amount < config.min_funding {
            return Err(Error::BelowMinimum);
        }

        let client = token::Client::new(&env, &config.reward_token);
        client.transfer(&funder, &env.current_contract_address(), &amount);

        let previous = storage::funded(&env, &funder);
        if previous == 0 {
            storage::push_funder(&env, state.funder_count, &funder);
            state.funder_count = state
                .funder_count
                .checked_add(1)
                .ok_or(Error::Overflow)?;
        }
        let funder_total = previous.checked_add(amount).ok_or(Error::Overflow)?;
        storage::set_funded(&env, &funder, funder_total);

        state.total_funded = state
            .total_funded
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        storage::set_state(&env, &state);

        emit_funded(
            &env,
            Funded {
                funder,
                amount,
                funder_total,
                total_funded: state.total_funded,
            },
        );

        Ok(funder_total)
    }

    /// Accept the bounty terms, freezing the payout percentage.
    ///
    /// Only the configured exploiter may accept, only once, only before expiry, and only while
    /// it holds the recovery amount and has approved the contract to pull it.
    ///
    /// # Arguments
    ///
    /// * `env` - The contract execution environment
    /// * `caller` - Must be the exploiter and authorize this transaction
    ///
    /// # Returns
    ///
    /// * `Ok(u64)` - The acceptance timestamp
    /// * `Err(Error::Finalized)` - If the bounty was already recovered
    /// * `Err(Error::OnlyExploiter)` - If `caller` is not the exploiter
    /// * `Err(Error::AlreadyAccepted)` - If the exploiter already accepted
    /// * `Err(Error::TooLate)` - If the bounty has expired
    /// * `Err(Error::InsufficientAllowance)` / `Err(Error::InsufficientBalance)` - If the
    ///   exploiter cannot currently back a recovery
    ///
    /// # Security
    ///
    /// - The frozen percentage applies to the pool balance at recovery time, so later top-ups
    ///   are shared at the same rate
    /// - Acceptance does not move any tokens; revoking the allowance afterwards re-opens the
    ///   refund path once the bounty expires
    pub fn accept(env: Env, caller: Address) -> Result<u64, Error> {
        storage::bump_instance(&env);
        caller.require_auth();

        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let mut state = storage::state(&env)?;

        if state.finalized {
            return Err(Error::Finalized);
        }
        if caller != config.exploiter {
            return Err(Error::OnlyExploiter);
        }
        if state.accepted_at.is_some() {
            return Err(Error::AlreadyAccepted);
        }
        let now = env.ledger().timestamp();
        if schedule.is_expired(now) {
            return Err(Error::TooLate);
        }
        if state.refunds_enabled {
            return Err(Error::RefundsStarted);
        }

        let recovery = token::Client::new(&env, &config.recovery_token);
        if recovery.allowance(&config.exploiter, &env.current_contract_address())
            < config.recovery_amount
        {
            return Err(Error::InsufficientAllowance);
        }
        if recovery.balance(&config.exploiter) < config.recovery_amount {
            return Err(Error::InsufficientBalance);
        }

        state.accepted_at = Some(now);
        storage::set_state(&env, &state);

        emit_accepted(
            &env,
            Accepted {
                exploiter: caller,
                accepted_at: now,
                percent_bps: schedule.percent_bps(now),
                terms_hash: config.terms_hash,
            },
        );

        Ok(now)
    }

    /// Execute the recovery swap and finalize the bounty.
    ///
    /// Pulls `recovery_amount` from the exploiter into the recovery destination, verifies the
    /// destination balance delta, pays the exploiter its share of the pool and turns the rest
    /// into the refund pool. Anyone may submit this call.
    ///
    /// The share is evaluated at the acceptance timestamp when the exploiter accepted, and at
    /// the current timestamp otherwise. It always applies to the current pool balance.
    ///
    /// # Returns
    ///
    /// * `Ok(i128)` - The reward paid to the exploiter
    /// * `Err(Error::Finalized)` - If already recovered
    /// * `Err(Error::RefundsStarted)` - If refunds have begun
    /// * `Err(Error::Expired)` - If expired without acceptance
    /// * `Err(Error::TransferFailed)` - If the token pull failed
    /// * `Err(Error::RecoveryMismatch)` - If the destination did not receive exactly the amount
    /// * `Err(Error::PayoutFailed)` - If the reward could not be paid
    ///
    /// # Security
    ///
    /// - The recovery token's own return value is ignored; only the observed balance delta at
    ///   the destination counts
    /// - Any error rolls back the whole invocation, including the token pull
    pub fn recover(env: Env) -> Result<i128, Error> {
        storage::bump_instance(&env);
        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let mut state = storage::state(&env)?;

        if state.finalized {
            return Err(Error::Finalized);
        }
        if state.refunds_enabled {
            return Err(Error::RefundsStarted);
        }

        let now = env.ledger().timestamp();
        let priced_at = match state.accepted_at {
            Some(accepted_at) => accepted_at,
            None if schedule.is_expired(now) => return Err(Error::Expired),
            None => now,
        };

        let contract = env.current_contract_address();
        let reward = token::Client::new(&env, &config.reward_token);
        let pool = reward.balance(&contract);
        let payout = schedule.payout(pool, priced_at).ok_or(Error::Overflow)?;

        let recovery = token::Client::new(&env, &config.recovery_token);
        let before = recovery.balance(&config.recovery_destination);
        let pulled = recovery.try_transfer_from(
            &contract,
            &config.exploiter,
            &config.recovery_destination,
            &config.recovery_amount,
        );
        if !matches!(pulled, Ok(Ok(()))) {
            log!(&env, "recovery pull failed", config.exploiter);
            return Err(Error::TransferFailed);
        }
        let after = recovery.balance(&config.recovery_destination);
        let received = after.checked_sub(before).ok_or(Error::Overflow)?;
        if received != config.recovery_amount {
            log!(&env, "recovery delta mismatch", received, config.recovery_amount);
            return Err(Error::RecoveryMismatch);
        }

        state.finalized = true;
        state.refunds_enabled = true;
        state.refund_snapshot = pool - payout;
        storage::set_state(&env, &state);

        if payout > 0 {
            let paid = reward.try_transfer(&contract, &config.exploiter, &payout);
            if !matches!(paid, Ok(Ok(()))) {
                return Err(Error::PayoutFailed);
            }
        }

        let percent_bps = schedule.percent_bps(priced_at);
        emit_recovered(
            &env,
            Recovered {
                exploiter: config.exploiter,
                destination: config.recovery_destination,
                recovered: received,
                payout,
                percent_bps,
                timestamp: now,
            },
        );
        emit_refunds_enabled(
            &env,
            RefundsEnabled {
                snapshot: state.refund_snapshot,
                total_funded: state.total_funded,
                finalized: true,
                timestamp: now,
            },
        );

        Ok(payout)
    }

    /// Push refunds to up to `max` funders, starting at the refund cursor.
    ///
    /// Enables refunds on first use when the bounty is eligible. A refund that cannot be
    /// transferred is credited to the funder, who can pull it later with `claim_refund`.
    /// Once every funder has been processed further calls are no-ops.
    ///
    /// # Arguments
    ///
    /// * `env` - The contract execution environment
    /// * `max` - Maximum number of funders processed by this call (must be > 0)
    ///
    /// # Returns
    ///
    /// * `Ok(u32)` - Number of funders processed by this call
    /// * `Err(Error::BadBatchSize)` - If `max` is zero
    /// * `Err(Error::NoFunders)` - If nobody ever funded the bounty
    /// * `Err(Error::NotExpired)` - If refunds are not enabled and the bounty is still running
    /// * `Err(Error::LockedByAcceptance)` - If a live acceptance still backs a recovery
    pub fn refund_batch(env: Env, max: u32) -> Result<u32, Error> {
        storage::bump_instance(&env);
        if max == 0 {
            return Err(Error::BadBatchSize);
        }

        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let mut state = storage::state(&env)?;

        if state.funder_count == 0 {
            return Err(Error::NoFunders);
        }
        enable_refunds_if_needed(&env, &config, &schedule, &mut state)?;

        let contract = env.current_contract_address();
        let reward = token::Client::new(&env, &config.reward_token);
        let start = state.refund_cursor;
        let end = start.saturating_add(max).min(state.funder_count);

        for index in start..end {
            let funder = storage::funder_at(&env, index).ok_or(Error::FunderNotFound)?;
            storage::bump_funder(&env, Some(index), &funder);
            let target = refund_target(&env, &state, &funder)?;
            let refunded = storage::refunded(&env, &funder);
            let pending = target - refunded;
            if pending <= 0 {
                continue;
            }
            storage::set_refunded(&env, &funder, target);

            let pushed = reward.try_transfer(&contract, &funder, &pending);
            if matches!(pushed, Ok(Ok(()))) {
                emit_refunded(
                    &env,
                    Refunded {
                        funder,
                        amount: pending,
                    },
                );
            } else {
                log!(&env, "refund push failed, crediting", funder, pending);
                let credited_total = storage::credited(&env, &funder)
                    .checked_add(pending)
                    .ok_or(Error::Overflow)?;
                storage::set_credited(&env, &funder, credited_total);
                emit_refund_credited(
                    &env,
                    RefundCredited {
                        funder,
                        amount: pending,
                        credited_total,
                    },
                );
            }
        }

        state.refund_cursor = end;
        storage::set_state(&env, &state);

        Ok(end - start)
    }

    /// Push refunds to every remaining funder. Equivalent to `refund_batch(funder_count)`.
    pub fn refund_all(env: Env) -> Result<u32, Error> {
        let state = storage::state(&env)?;
        Self::refund_batch(env, state.funder_count.max(1))
    }

    /// Pull the refund owed to `funder`.
    ///
    /// Pays the pro-rata share not yet debited plus anything credited by a failed batch push.
    /// Enables refunds on first use when the bounty is eligible, so a funder never depends on
    /// someone else running `refund_batch`.
    ///
    /// # Returns
    ///
    /// * `Ok(i128)` - Amount transferred to `funder`
    /// * `Err(Error::NothingDue)` - If nothing is owed
    /// * `Err(Error::RefundFailed)` - If the transfer to `funder` failed
    pub fn claim_refund(env: Env, funder: Address) -> Result<i128, Error> {
        storage::bump_instance(&env);
        funder.require_auth();

        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let mut state = storage::state(&env)?;

        let was_enabled = state.refunds_enabled;
        enable_refunds_if_needed(&env, &config, &schedule, &mut state)?;
        if !was_enabled {
            storage::set_state(&env, &state);
        }

        storage::bump_funder(&env, None, &funder);
        let target = refund_target(&env, &state, &funder)?;
        let refunded = storage::refunded(&env, &funder);
        let credited = storage::credited(&env, &funder);
        let owed = (target - refunded)
            .checked_add(credited)
            .ok_or(Error::Overflow)?;
        if owed <= 0 {
            return Err(Error::NothingDue);
        }

        storage::set_refunded(&env, &funder, target);
        if credited != 0 {
            storage::set_credited(&env, &funder, 0);
        }

        let reward = token::Client::new(&env, &config.reward_token);
        let paid = reward.try_transfer(&env.current_contract_address(), &funder, &owed);
        if !matches!(paid, Ok(Ok(()))) {
            return Err(Error::RefundFailed);
        }

        emit_refund_claimed(
            &env,
            RefundClaimed {
                funder,
                amount: owed,
            },
        );

        Ok(owed)
    }

    // ========================================================================
    // View Functions
    // ========================================================================

    /// Ledger timestamp at which the bounty was initialized.
    pub fn start(env: Env) -> Result<u64, Error> {
        storage::bump_instance(&env);
        Ok(storage::schedule(&env)?.start)
    }

    pub fn initial_period(env: Env) -> Result<u64, Error> {
        storage::bump_instance(&env);
        Ok(storage::schedule(&env)?.initial)
    }

    pub fn decay_period(env: Env) -> Result<u64, Error> {
        storage::bump_instance(&env);
        Ok(storage::schedule(&env)?.decay)
    }

    /// Timestamp at which funding closes and an unaccepted bounty can no longer be recovered.
    pub fn expiry(env: Env) -> Result<u64, Error> {
        storage::bump_instance(&env);
        Ok(storage::schedule(&env)?.expiry())
    }

    pub fn terms_hash(env: Env) -> Result<BytesN<32>, Error> {
        storage::bump_instance(&env);
        Ok(storage::config(&env)?.terms_hash)
    }

    /// Check a terms document against the committed digest.
    ///
    /// `text` is the exact UTF-8 content of the terms (no BOM); the digest is keccak-256.
    pub fn verify_terms(env: Env, text: Bytes) -> Result<bool, Error> {
        storage::bump_instance(&env);
        let config = storage::config(&env)?;
        let digest: BytesN<32> = env.crypto().keccak256(&text).to_bytes();
        Ok(digest == config.terms_hash)
    }

    pub fn get_config(env: Env) -> Result<BountyConfig, Error> {
        storage::bump_instance(&env);
        storage::config(&env)
    }

    /// Acceptance timestamp, or 0 when the exploiter has not accepted.
    pub fn accepted_at(env: Env) -> Result<u64, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.accepted_at.unwrap_or(0))
    }

    pub fn is_accepted(env: Env) -> Result<bool, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.accepted_at.is_some())
    }

    pub fn is_finalized(env: Env) -> Result<bool, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.finalized)
    }

    pub fn total_funded(env: Env) -> Result<i128, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.total_funded)
    }

    /// Cumulative contribution of `funder`.
    pub fn funded_amount(env: Env, funder: Address) -> i128 {
        storage::bump_instance(&env);
        storage::funded(&env, &funder)
    }

    /// Funder registered at `index`, in order of first contribution.
    pub fn funder_at(env: Env, index: u32) -> Result<Address, Error> {
        storage::bump_instance(&env);
        storage::funder_at(&env, index).ok_or(Error::FunderNotFound)
    }

    pub fn funder_count(env: Env) -> Result<u32, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.funder_count)
    }

    pub fn refunds_enabled(env: Env) -> Result<bool, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.refunds_enabled)
    }

    pub fn refund_snapshot(env: Env) -> Result<i128, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.refund_snapshot)
    }

    pub fn refund_cursor(env: Env) -> Result<u32, Error> {
        storage::bump_instance(&env);
        Ok(storage::state(&env)?.refund_cursor)
    }

    /// Refund already debited from the pool for `funder`, whether pushed or credited.
    pub fn refunded_amount(env: Env, funder: Address) -> i128 {
        storage::bump_instance(&env);
        storage::refunded(&env, &funder)
    }

    /// Refund credited to `funder` after a failed push, awaiting `claim_refund`.
    pub fn credited_amount(env: Env, funder: Address) -> i128 {
        storage::bump_instance(&env);
        storage::credited(&env, &funder)
    }

    /// Amount `claim_refund` would currently pay `funder`; 0 before refunds are enabled.
    pub fn refund_owed(env: Env, funder: Address) -> Result<i128, Error> {
        storage::bump_instance(&env);
        let state = storage::state(&env)?;
        if !state.refunds_enabled {
            return Ok(0);
        }
        let target = refund_target(&env, &state, &funder)?;
        let pending = target - storage::refunded(&env, &funder);
        pending
            .checked_add(storage::credited(&env, &funder))
            .ok_or(Error::Overflow)
    }

    /// Reward the exploiter would receive if `recover` succeeded now.
    pub fn current_payout(env: Env) -> Result<i128, Error> {
        storage::bump_instance(&env);
        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let state = storage::state(&env)?;
        current_payout(&env, &config, &schedule, &state)
    }

    /// Current payout percentage in basis points (frozen once accepted).
    pub fn payout_percent_bps(env: Env) -> Result<u32, Error> {
        storage::bump_instance(&env);
        let schedule = storage::schedule(&env)?;
        let state = storage::state(&env)?;
        Ok(percent_bps(&env, &schedule, &state))
    }

    /// Seconds until expiry, 0 once expired.
    pub fn time_remaining(env: Env) -> Result<u64, Error> {
        storage::bump_instance(&env);
        let schedule = storage::schedule(&env)?;
        Ok(schedule.time_remaining(env.ledger().timestamp()))
    }

    /// Reward token balance held by the contract.
    pub fn reward_balance(env: Env) -> Result<i128, Error> {
        storage::bump_instance(&env);
        let config = storage::config(&env)?;
        Ok(reward_balance(&env, &config))
    }

    /// Snapshot of the full bounty state plus the values derived from the current ledger.
    pub fn get_state(env: Env) -> Result<BountySnapshot, Error> {
        storage::bump_instance(&env);
        let config = storage::config(&env)?;
        let schedule = storage::schedule(&env)?;
        let state = storage::state(&env)?;
        let now = env.ledger().timestamp();

        Ok(BountySnapshot {
            reward_balance: reward_balance(&env, &config),
            current_payout: current_payout(&env, &config, &schedule, &state)?,
            percent_bps: percent_bps(&env, &schedule, &state),
            time_remaining: schedule.time_remaining(now),
            expiry: schedule.expiry(),
            state,
        })
    }
}

fn reward_balance(env: &Env, config: &BountyConfig) -> i128 {
    token::Client::new(env, &config.reward_token).balance(&env.current_contract_address())
}

/// Timestamp the payout schedule is evaluated at: frozen on acceptance.
fn pricing_time(env: &Env, state: &BountyState) -> u64 {
    state
        .accepted_at
        .unwrap_or_else(|| env.ledger().timestamp())
}

fn percent_bps(env: &Env, schedule: &Schedule, state: &BountyState) -> u32 {
    if state.finalized || state.refunds_enabled {
        return 0;
    }
    schedule.percent_bps(pricing_time(env, state))
}

fn current_payout(
    env: &Env,
    config: &BountyConfig,
    schedule: &Schedule,
    state: &BountyState,
) -> Result<i128, Error> {
    if state.finalized || state.refunds_enabled {
        return Ok(0);
    }
    schedule
        .payout(reward_balance(env, config), pricing_time(env, state))
        .ok_or(Error::Overflow)
}

/// Whether the exploiter can still honour its acceptance: it holds the recovery amount and
/// the contract may pull it.
fn acceptance_is_backed(env: &Env, config: &BountyConfig) -> bool {
    let recovery = token::Client::new(env, &config.recovery_token);
    recovery.allowance(&config.exploiter, &env.current_contract_address())
        >= config.recovery_amount
        && recovery.balance(&config.exploiter) >= config.recovery_amount
}

/// Snapshot the refund pool if refunds are not enabled yet.
///
/// The caller persists `state`.
fn enable_refunds_if_needed(
    env: &Env,
    config: &BountyConfig,
    schedule: &Schedule,
    state: &mut BountyState,
) -> Result<(), Error> {
    if state.refunds_enabled {
        return Ok(());
    }

    let now = env.ledger().timestamp();
    if !schedule.is_expired(now) {
        return Err(Error::NotExpired);
    }
    if state.accepted_at.is_some() && acceptance_is_backed(env, config) {
        return Err(Error::LockedByAcceptance);
    }

    state.refunds_enabled = true;
    state.refund_snapshot = reward_balance(env, config);

    emit_refunds_enabled(
        env,
        RefundsEnabled {
            snapshot: state.refund_snapshot,
            total_funded: state.total_funded,
            finalized: state.finalized,
            timestamp: now,
        },
    );

    Ok(())
}

/// Pro-rata share of the refund pool owed to `funder` in total.
fn refund_target(env: &Env, state: &BountyState, funder: &Address) -> Result<i128, Error> {
    if state.total_funded == 0 {
        return Ok(0);
    }
    let funded = storage::funded(env, funder);
    funded
        .checked_mul(state.refund_snapshot)
        .map(|scaled| scaled / state.total_funded)
        .ok_or(Error::Overflow)
}

#[cfg(test)]
mod test_refunds;
