//! Tests for annual tax settlement

use jiff::civil::date;

use super::{account, opening, opts, run};
use crate::model::{
    AccountGraph, Compounding, EntryOrigin, Interest, InterestId, RateSpec,
};

/// Money pulled from a taxable source is taxed at the source's withdrawal
/// rate the following April 1st.
#[test]
fn test_withdrawal_tax_on_pulled_funds() {
    let mut a = account(0, "Checking");
    a.minimum_balance = 500.0;
    a.performs_pulls = true;
    let mut b = account(1, "Brokerage");
    b.pull_priority = Some(1);
    b.withdrawal_tax_rate = 0.2;
    b.activities.push(opening(date(2025, 1, 1), 10_000.0));
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2026, 4, 1), date(2026, 4, 1))).unwrap();

    // One pull of 500 in 2025; 20% due on Apr 1 2026
    let tax = graph.accounts[0]
        .ledger
        .iter()
        .find(|e| e.origin == EntryOrigin::Tax)
        .expect("tax entry missing");
    assert_eq!(tax.date, date(2026, 4, 1));
    assert_eq!(tax.id, "TAX-2026-04-01-Checking");
    assert!((tax.amount.resolved().unwrap() + 100.0).abs() < 1e-9);
    assert_eq!(graph.accounts[0].today_balance, 400.0);
}

/// Withdrawals before the source's penalty cutoff pay the early penalty on
/// top of the withdrawal rate.
#[test]
fn test_early_withdrawal_penalty() {
    let mut a = account(0, "Checking");
    a.minimum_balance = 500.0;
    a.performs_pulls = true;
    let mut b = account(1, "IRA");
    b.pull_priority = Some(1);
    b.withdrawal_tax_rate = 0.2;
    b.early_withdrawal_penalty = 0.1;
    b.penalty_until = Some(date(2026, 1, 1));
    b.activities.push(opening(date(2025, 1, 1), 10_000.0));
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2026, 4, 1), date(2026, 4, 1))).unwrap();

    let tax = graph.accounts[0]
        .ledger
        .iter()
        .find(|e| e.origin == EntryOrigin::Tax)
        .unwrap();
    // 500 * (0.2 + 0.1)
    assert!((tax.amount.resolved().unwrap() + 150.0).abs() < 1e-9);
}

/// Interest earned in a year is taxed at the account's interest rate the
/// following April 1st.
#[test]
fn test_interest_tax() {
    let mut a = account(0, "Savings");
    a.interest_tax_rate = 0.25;
    a.activities.push(opening(date(2025, 1, 1), 10_000.0));
    a.interests.push(Interest {
        interest_id: InterestId(0),
        apr: RateSpec::Literal(0.06),
        compounding: Compounding::Monthly,
        applicable_from: date(2025, 1, 1),
        rate_source: None,
    });
    let mut graph = AccountGraph {
        accounts: vec![a],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2026, 4, 1), date(2026, 4, 1))).unwrap();

    let earned_2025: f64 = graph.accounts[0]
        .ledger
        .iter()
        .filter(|e| {
            matches!(e.origin, EntryOrigin::Interest(_)) && e.date.year() == 2025
        })
        .map(|e| e.amount.resolved().unwrap())
        .sum();
    assert!(earned_2025 > 0.0);

    let tax = graph.accounts[0]
        .ledger
        .iter()
        .find(|e| e.origin == EntryOrigin::Tax)
        .unwrap();
    assert!(
        (tax.amount.resolved().unwrap() + earned_2025 * 0.25).abs() < 1e-9,
        "tax {} does not match 25% of {earned_2025}",
        tax.amount.resolved().unwrap()
    );
}

/// Withdrawal and interest taxes post as separate entries on the same
/// April 1st, each aggregating its own component.
#[test]
fn test_separate_withdrawal_and_interest_entries() {
    let mut a = account(0, "Checking");
    a.minimum_balance = 500.0;
    a.performs_pulls = true;
    a.interest_tax_rate = 0.25;
    a.interests.push(Interest {
        interest_id: InterestId(0),
        apr: RateSpec::Literal(0.06),
        compounding: Compounding::Monthly,
        applicable_from: date(2025, 1, 1),
        rate_source: None,
    });
    let mut b = account(1, "Brokerage");
    b.pull_priority = Some(1);
    b.withdrawal_tax_rate = 0.2;
    b.activities.push(opening(date(2025, 1, 1), 10_000.0));
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2026, 4, 1), date(2026, 4, 1))).unwrap();

    let taxes: Vec<_> = graph.accounts[0]
        .ledger
        .iter()
        .filter(|e| e.origin == EntryOrigin::Tax)
        .collect();
    assert_eq!(taxes.len(), 2, "expected two tax entries, got {taxes:?}");

    // One pull of 500 in 2025 at 20%
    let withdrawal = taxes
        .iter()
        .find(|e| e.id == "TAX-2026-04-01-Checking")
        .unwrap();
    assert!((withdrawal.amount.resolved().unwrap() + 100.0).abs() < 1e-9);

    let earned_2025: f64 = graph.accounts[0]
        .ledger
        .iter()
        .filter(|e| {
            matches!(e.origin, EntryOrigin::Interest(_)) && e.date.year() == 2025
        })
        .map(|e| e.amount.resolved().unwrap())
        .sum();
    let interest = taxes
        .iter()
        .find(|e| e.id == "TAX-INT-2026-04-01-Checking")
        .unwrap();
    assert!(
        (interest.amount.resolved().unwrap() + earned_2025 * 0.25).abs() < 1e-9,
        "interest tax {} does not match 25% of {earned_2025}",
        interest.amount.resolved().unwrap()
    );
}

/// An April 1st beyond "today" is a pure projection and posts no taxes.
#[test]
fn test_no_tax_beyond_today() {
    let mut a = account(0, "Savings");
    a.interest_tax_rate = 0.25;
    a.activities.push(opening(date(2025, 1, 1), 10_000.0));
    a.interests.push(Interest {
        interest_id: InterestId(0),
        apr: RateSpec::Literal(0.06),
        compounding: Compounding::Monthly,
        applicable_from: date(2025, 1, 1),
        rate_source: None,
    });
    let mut graph = AccountGraph {
        accounts: vec![a],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2025, 6, 1), date(2026, 6, 1))).unwrap();

    assert!(
        graph.accounts[0]
            .ledger
            .iter()
            .all(|e| e.origin != EntryOrigin::Tax)
    );
}
