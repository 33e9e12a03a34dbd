//! # Payout Schedule
//!
//! Pure arithmetic for the time-decayed reward. Nothing in here touches storage or
//! the ledger; callers pass the timestamp they want the schedule evaluated at.
//!
//! ```text
//!  payout
//!  100% ┤━━━━━━━━━━━━━━━┓
//!       │               ┃╲
//!       │               ┃  ╲
//!       │               ┃    ╲
//!    0% ┤               ┃      ╲━━━━━━━━━━━━
//!       └───────────────┴───────┴───────────→ time
//!     start      start+initial   expiry
//! ```
//!
//! The payout at `elapsed = t - start` is:
//!
//! - the full pool while `elapsed <= initial`
//! - zero once `elapsed >= initial + decay`
//! - `pool * (initial + decay - elapsed) / decay` in between (floored)

use soroban_sdk::contracttype;

/// Denominator used when the schedule is reported as a percentage.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Fixed timeline of a bounty, captured at initialization.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Schedule {
    /// Ledger timestamp at which the bounty was initialized.
    pub start: u64,
    /// Seconds during which the full pool is paid out.
    pub initial: u64,
    /// Seconds over which the payout falls linearly to zero.
    pub decay: u64,
}

impl Schedule {
    /// Builds a schedule, rejecting timelines that cannot be evaluated.
    ///
    /// Returns `None` when `decay` is zero or when `start + initial + decay`
    /// does not fit in a `u64`.
    pub fn new(start: u64, initial: u64, decay: u64) -> Option<Self> {
        if decay == 0 {
            return None;
        }
        start.checked_add(initial)?.checked_add(decay)?;
        Some(Self {
            start,
            initial,
            decay,
        })
    }

    /// Timestamp at which the payout reaches zero and funding closes.
    pub fn expiry(&self) -> u64 {
        self.start
            .saturating_add(self.initial)
            .saturating_add(self.decay)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiry()
    }

    pub fn time_remaining(&self, now: u64) -> u64 {
        self.expiry().saturating_sub(now)
    }

    /// Amount of `pool` owed to the exploiter if the schedule is evaluated at `at`.
    ///
    /// Returns `None` only on multiplication overflow.
    pub fn payout(&self, pool: i128, at: u64) -> Option<i128> {
        if pool <= 0 {
            return Some(0);
        }
        let elapsed = at.saturating_sub(self.start);
        if elapsed <= self.initial {
            return Some(pool);
        }
        let window = self.initial.saturating_add(self.decay);
        if elapsed >= window {
            return Some(0);
        }
        let remaining = i128::from(window - elapsed);
        pool.checked_mul(remaining).map(|scaled| scaled / i128::from(self.decay))
    }

    /// The schedule expressed in basis points, for events and views.
    pub fn percent_bps(&self, at: u64) -> u32 {
        self.payout(BPS_DENOMINATOR, at).unwrap_or(0) as u32
    }
}
