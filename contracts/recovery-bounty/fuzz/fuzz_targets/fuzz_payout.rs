#![no_main]

use libfuzzer_sys::fuzz_target;
use recovery_bounty::decay::{Schedule, BPS_DENOMINATOR};

fuzz_target!(|input: (u64, u64, u64, i64, u64, u32)| {
    let (start, initial, decay, pool, at, step) = input;
    let Some(schedule) = Schedule::new(start, initial, decay) else {
        return;
    };
    let pool = i128::from(pool);

    let Some(payout) = schedule.payout(pool, at) else {
        return;
    };
    assert!(payout >= 0);
    assert!(payout <= pool.max(0));

    // never increases over time
    let later = at.saturating_add(u64::from(step));
    if let Some(later_payout) = schedule.payout(pool, later) {
        assert!(later_payout <= payout);
    }

    if schedule.is_expired(at) {
        assert_eq!(payout, 0);
    }
    assert!(i128::from(schedule.percent_bps(at)) <= BPS_DENOMINATOR);
});
