#![cfg(test)]
extern crate std;

use super::*;
use crate::test::{Setup, DECAY, INITIAL, MIN_FUNDING};
use bounty_test_utils::{generate_funders, random_contributions, XLM};
use soroban_sdk::{testutils::Address as _, Address};
use std::vec::Vec;

fn expired_with_funders(amounts: &[i128]) -> (Setup<'static>, Vec<Address>) {
    let s = Setup::new();
    let funders = generate_funders(&s.env, amounts.len());
    for (funder, amount) in funders.iter().zip(amounts) {
        s.fund(funder, *amount);
    }
    s.at(INITIAL + DECAY);
    (s, funders)
}

// =============================================================================
// Enabling refunds
// =============================================================================

#[test]
fn test_refunds_wait_for_expiry() {
    let s = Setup::new();
    let funder = s.new_funder(XLM);
    s.at(INITIAL + DECAY - 1);

    assert_eq!(
        s.client.try_refund_batch(&10).unwrap_err().unwrap(),
        Error::NotExpired
    );
    assert_eq!(
        s.client.try_claim_refund(&funder).unwrap_err().unwrap(),
        Error::NotExpired
    );
    assert!(!s.client.refunds_enabled());
    assert_eq!(s.client.refund_owed(&funder), 0);
}

#[test]
fn test_refund_batch_rejects_zero_size() {
    let (s, _) = expired_with_funders(&[XLM]);
    assert_eq!(
        s.client.try_refund_batch(&0).unwrap_err().unwrap(),
        Error::BadBatchSize
    );
}

#[test]
fn test_refund_batch_without_funders_fails() {
    let (s, _) = expired_with_funders(&[]);
    assert_eq!(
        s.client.try_refund_batch(&5).unwrap_err().unwrap(),
        Error::NoFunders
    );
}

#[test]
fn test_live_acceptance_locks_refunds() {
    let s = Setup::new();
    let funder = s.new_funder(2 * XLM);
    s.approve_recovery();
    s.at(INITIAL + 100);
    s.client.accept(&s.exploiter);
    s.at(INITIAL + DECAY + 1);

    assert_eq!(
        s.client.try_refund_batch(&10).unwrap_err().unwrap(),
        Error::LockedByAcceptance
    );
    assert_eq!(
        s.client.try_claim_refund(&funder).unwrap_err().unwrap(),
        Error::LockedByAcceptance
    );
    assert!(!s.client.refunds_enabled());
}

#[test]
fn test_revoked_allowance_unlocks_refunds() {
    let s = Setup::new();
    let funder = s.new_funder(2 * XLM);
    s.approve_recovery();
    s.client.accept(&s.exploiter);
    s.at(INITIAL + DECAY);

    s.revoke_recovery();
    assert_eq!(s.client.refund_batch(&10), 1);
    let enabled: RefundsEnabled = s.last_event("ref_on");
    assert!(!enabled.finalized);
    assert_eq!(enabled.snapshot, 2 * XLM);
    assert_eq!(enabled.total_funded, 2 * XLM);
    assert!(s.client.refunds_enabled());
    assert!(!s.client.is_finalized());
    assert_eq!(s.reward.client.balance(&funder), 2 * XLM);

    // a late re-approval cannot resurrect the recovery
    s.approve_recovery();
    assert_eq!(
        s.client.try_recover().unwrap_err().unwrap(),
        Error::RefundsStarted
    );
}

#[test]
fn test_moved_balance_unlocks_refunds() {
    let s = Setup::new();
    let funder = s.new_funder(2 * XLM);
    s.approve_recovery();
    s.client.accept(&s.exploiter);
    s.at(INITIAL + DECAY);

    let elsewhere = Address::generate(&s.env);
    s.recovery.client.transfer(&s.exploiter, &elsewhere, &1);
    assert_eq!(s.client.claim_refund(&funder), 2 * XLM);
}

#[test]
fn test_fund_after_refunds_started_fails() {
    let (s, funders) = expired_with_funders(&[XLM]);
    s.client.refund_batch(&1);

    s.reward.admin.mint(&funders[0], &XLM);
    assert_eq!(
        s.client.try_fund(&funders[0], &XLM).unwrap_err().unwrap(),
        Error::RefundsStarted
    );
}

// =============================================================================
// refund_batch
// =============================================================================

#[test]
fn test_refund_batch_walks_funders_in_order() {
    let amounts = [XLM, 2 * XLM, 3 * XLM, 4 * XLM, 5 * XLM];
    let (s, funders) = expired_with_funders(&amounts);

    assert_eq!(s.client.refund_batch(&2), 2);
    let refunded: Refunded = s.last_event("refund");
    assert_eq!(refunded.funder, funders[1]);
    assert_eq!(refunded.amount, 2 * XLM);
    assert_eq!(s.client.refund_cursor(), 2);
    assert_eq!(s.client.refund_snapshot(), 15 * XLM);
    assert_eq!(s.reward.client.balance(&funders[0]), XLM);
    assert_eq!(s.reward.client.balance(&funders[1]), 2 * XLM);
    assert_eq!(s.reward.client.balance(&funders[2]), 0);

    assert_eq!(s.client.refund_batch(&2), 2);
    assert_eq!(s.client.refund_batch(&2), 1);
    assert_eq!(s.client.refund_cursor(), 5);

    // nothing left to do
    assert_eq!(s.client.refund_batch(&2), 0);
    assert_eq!(s.client.refund_cursor(), 5);

    for (funder, amount) in funders.iter().zip(amounts.iter()) {
        assert_eq!(s.reward.client.balance(funder), *amount);
        assert_eq!(s.client.refunded_amount(funder), *amount);
        assert_eq!(s.client.refund_owed(funder), 0);
    }
    assert_eq!(s.pool(), 0);
}

#[test]
fn test_refund_all_processes_everyone() {
    let amounts = random_contributions(42, 12, MIN_FUNDING, 20 * XLM);
    let (s, funders) = expired_with_funders(&amounts);

    assert_eq!(s.client.refund_all(), 12);
    assert_eq!(s.client.refund_cursor(), 12);
    for (funder, amount) in funders.iter().zip(amounts.iter()) {
        assert_eq!(s.reward.client.balance(funder), *amount);
    }
    assert_eq!(s.client.refund_all(), 0);
}

#[test]
fn test_refunds_are_pro_rata_after_partial_recovery() {
    let s = Setup::new();
    let alice = s.new_funder(10 * XLM);
    let bob = s.new_funder(30 * XLM);
    s.approve_recovery();
    s.at(INITIAL + DECAY / 2);

    assert_eq!(s.client.recover(), 20 * XLM);
    assert_eq!(s.client.refund_owed(&alice), 5 * XLM);
    assert_eq!(s.client.refund_owed(&bob), 15 * XLM);

    assert_eq!(s.client.refund_all(), 2);
    assert_eq!(s.reward.client.balance(&alice), 5 * XLM);
    assert_eq!(s.reward.client.balance(&bob), 15 * XLM);
    assert_eq!(s.pool(), 0);
}

#[test]
fn test_refunds_round_down_and_never_overdraw() {
    let s = Setup::new();
    let funders = [
        s.new_funder(MIN_FUNDING),
        s.new_funder(MIN_FUNDING + 1),
        s.new_funder(MIN_FUNDING + 7),
    ];
    s.approve_recovery();
    s.at(INITIAL + 333);
    s.client.recover();

    let snapshot = s.client.refund_snapshot();
    s.client.refund_all();

    let paid: i128 = funders.iter().map(|f| s.reward.client.balance(f)).sum();
    assert!(paid <= snapshot);
    assert!(snapshot - paid < funders.len() as i128);
    assert_eq!(s.pool(), snapshot - paid);
}

#[test]
fn test_full_payout_leaves_nothing_to_refund() {
    let s = Setup::new();
    let funder = s.new_funder(3 * XLM);
    s.approve_recovery();
    s.client.recover();

    assert_eq!(s.client.refund_owed(&funder), 0);
    assert_eq!(
        s.client.try_claim_refund(&funder).unwrap_err().unwrap(),
        Error::NothingDue
    );
    assert_eq!(s.client.refund_batch(&5), 1);
    assert_eq!(s.reward.client.balance(&funder), 0);
}

// =============================================================================
// claim_refund
// =============================================================================

#[test]
fn test_claim_refund_enables_refunds() {
    let (s, funders) = expired_with_funders(&[2 * XLM, 6 * XLM]);

    assert_eq!(s.client.claim_refund(&funders[1]), 6 * XLM);
    let claimed: RefundClaimed = s.last_event("claim");
    assert_eq!(claimed.funder, funders[1]);
    assert_eq!(claimed.amount, 6 * XLM);
    let enabled: RefundsEnabled = s.last_event("ref_on");
    assert!(!enabled.finalized);
    assert_eq!(enabled.snapshot, 8 * XLM);
    assert!(s.client.refunds_enabled());
    assert_eq!(s.client.refund_snapshot(), 8 * XLM);
    assert_eq!(s.client.refund_cursor(), 0);

    assert_eq!(
        s.client.try_claim_refund(&funders[1]).unwrap_err().unwrap(),
        Error::NothingDue
    );

    // the batch skips the funder that already claimed
    assert_eq!(s.client.refund_batch(&10), 2);
    assert_eq!(s.reward.client.balance(&funders[0]), 2 * XLM);
    assert_eq!(s.reward.client.balance(&funders[1]), 6 * XLM);
    assert_eq!(s.pool(), 0);
}

#[test]
fn test_claim_refund_for_non_funder() {
    let (s, _) = expired_with_funders(&[XLM]);
    let stranger = Address::generate(&s.env);
    assert_eq!(
        s.client.try_claim_refund(&stranger).unwrap_err().unwrap(),
        Error::NothingDue
    );
}
