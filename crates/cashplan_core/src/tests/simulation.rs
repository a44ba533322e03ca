//! Tests for full day-loop runs and their invariants

use jiff::civil::date;

use super::{account, activity, assert_continuity, monthly_bill, opening, opts, run,
    transfer_activity};
use crate::error::{CalcError, ConfigError, DataError};
use crate::model::{AccountGraph, AmountSpec, EntryAmount};

fn checking_with_rent() -> AccountGraph {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    a.bills
        .push(monthly_bill(0, "Rent", date(2025, 1, 1), -100.0));
    AccountGraph {
        accounts: vec![a],
        ..Default::default()
    }
}

/// Opening balance plus three months of rent settles to 700.
#[test]
fn test_basic_run() {
    let mut graph = checking_with_rent();
    run(&mut graph, &opts(date(2025, 3, 31), date(2025, 3, 31))).unwrap();

    let account = &graph.accounts[0];
    assert_eq!(account.ledger.len(), 4);
    assert_eq!(account.today_balance, 700.0);
    assert_eq!(account.ledger.last().unwrap().balance, 700.0);
    assert_continuity(account);
}

/// Two runs of the same input produce identical ledgers.
#[test]
fn test_idempotence() {
    let mut first = checking_with_rent();
    let mut second = checking_with_rent();
    let opts = opts(date(2025, 12, 31), date(2025, 12, 31));
    run(&mut first, &opts).unwrap();
    run(&mut second, &opts).unwrap();
    assert_eq!(first.accounts[0].ledger, second.accounts[0].ledger);
    assert_eq!(
        first.accounts[0].today_balance,
        second.accounts[0].today_balance
    );
}

/// `today_balance` anchors to "today" while the ledger projects to the
/// window end.
#[test]
fn test_today_balance_mid_window() {
    let mut graph = checking_with_rent();
    run(&mut graph, &opts(date(2025, 3, 15), date(2025, 6, 30))).unwrap();

    let account = &graph.accounts[0];
    // Three rents settled by Mar 15; six by the window end
    assert_eq!(account.today_balance, 700.0);
    assert_eq!(account.ledger.last().unwrap().balance, 400.0);
}

/// A transfer endpoint naming a missing account fails the whole run before
/// any settlement.
#[test]
fn test_missing_transfer_endpoint_is_fatal() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    a.activities.push(transfer_activity(
        "Move",
        date(2025, 2, 1),
        AmountSpec::Literal(100.0),
        "Checking",
        "Nope",
    ));
    let mut graph = AccountGraph {
        accounts: vec![a],
        ..Default::default()
    };
    let err = run(&mut graph, &opts(date(2025, 3, 1), date(2025, 3, 1))).unwrap_err();
    assert_eq!(
        err,
        CalcError::Config(ConfigError::AccountNotFound("Nope".to_string()))
    );
}

/// A transfer-flagged activity with no endpoints is rejected up front, not
/// silently expanded as a one-sided row.
#[test]
fn test_transfer_without_endpoints_is_fatal() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    let mut move_half = transfer_activity(
        "Move",
        date(2025, 2, 1),
        AmountSpec::Literal(100.0),
        "Checking",
        "Savings",
    );
    move_half.to = None;
    a.activities.push(move_half);
    let b = account(1, "Savings");
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    let err = run(&mut graph, &opts(date(2025, 3, 1), date(2025, 3, 1))).unwrap_err();
    assert_eq!(
        err,
        CalcError::Config(ConfigError::IncompleteTransfer("Move".to_string()))
    );
}

/// A `{HALF}` transfer moves half the source's settled balance; the pair
/// resolves to exact negations.
#[test]
fn test_half_fraction_transfer() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    a.activities.push(transfer_activity(
        "Split",
        date(2025, 2, 1),
        AmountSpec::parse("{HALF}").unwrap(),
        "Checking",
        "Savings",
    ));
    let b = account(1, "Savings");
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2025, 2, 28), date(2025, 2, 28))).unwrap();

    assert_eq!(graph.accounts[0].today_balance, 500.0);
    assert_eq!(graph.accounts[1].today_balance, 500.0);
    let out = graph.accounts[0].ledger.last().unwrap();
    let inc = graph.accounts[1].ledger.last().unwrap();
    assert_eq!(out.id, inc.id);
    assert_eq!(out.amount, EntryAmount::Resolved(-500.0));
    assert_eq!(inc.amount, EntryAmount::Resolved(500.0));
    assert_continuity(&graph.accounts[0]);
    assert_continuity(&graph.accounts[1]);
}

/// A `{FULL}` transfer sweeps the source to zero.
#[test]
fn test_full_fraction_transfer() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 750.0));
    a.activities.push(transfer_activity(
        "Sweep",
        date(2025, 2, 1),
        AmountSpec::parse("{FULL}").unwrap(),
        "Checking",
        "Savings",
    ));
    let b = account(1, "Savings");
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2025, 2, 28), date(2025, 2, 28))).unwrap();

    assert_eq!(graph.accounts[0].today_balance, 0.0);
    assert_eq!(graph.accounts[1].today_balance, 750.0);
}

/// A negated fraction token reverses the transfer: the nominal destination
/// pays the fraction of its own balance back to the source.
#[test]
fn test_negated_fraction_reverses_transfer() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    a.activities.push(transfer_activity(
        "Give Back",
        date(2025, 2, 1),
        AmountSpec::parse("-{HALF}").unwrap(),
        "Savings",
        "Checking",
    ));
    let b = account(1, "Savings");
    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2025, 2, 28), date(2025, 2, 28))).unwrap();

    // Checking pays half its own 1000; Savings receives it.
    assert_eq!(graph.accounts[0].today_balance, 500.0);
    assert_eq!(graph.accounts[1].today_balance, 500.0);
    let out = graph.accounts[0].ledger.last().unwrap();
    let inc = graph.accounts[1].ledger.last().unwrap();
    assert_eq!(out.id, inc.id);
    assert_eq!(out.amount, EntryAmount::Resolved(-500.0));
    assert_eq!(inc.amount, EntryAmount::Resolved(500.0));
}

/// A fraction amount outside a two-sided transfer has no source balance to
/// resolve against and fails the run at settlement.
#[test]
fn test_unpaired_fraction_is_fatal() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    let mut half = activity("Oops", date(2025, 2, 1), 0.0);
    half.amount = AmountSpec::parse("{HALF}").unwrap();
    a.activities.push(half);
    let mut graph = AccountGraph {
        accounts: vec![a],
        ..Default::default()
    };
    let err = run(&mut graph, &opts(date(2025, 2, 28), date(2025, 2, 28))).unwrap_err();
    assert!(
        matches!(err, CalcError::Data(DataError::UnpairedFraction { .. })),
        "expected unpaired fraction, got {err:?}"
    );
}

/// A fraction transfer from an account to itself cannot settle to a
/// consistent amount and fails the run.
#[test]
fn test_self_transfer_fraction_is_fatal() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    a.activities.push(transfer_activity(
        "Loop",
        date(2025, 2, 1),
        AmountSpec::parse("{FULL}").unwrap(),
        "Checking",
        "Checking",
    ));
    let mut graph = AccountGraph {
        accounts: vec![a],
        ..Default::default()
    };
    let err = run(&mut graph, &opts(date(2025, 2, 28), date(2025, 2, 28))).unwrap_err();
    assert!(
        matches!(err, CalcError::Data(DataError::UnresolvedFraction { .. })),
        "expected unresolved fraction, got {err:?}"
    );
}

/// Entries past the window end are trimmed from the returned ledgers.
#[test]
fn test_window_trim() {
    let mut a = account(0, "Checking");
    a.activities.push(opening(date(2025, 1, 1), 1_000.0));
    a.activities
        .push(activity("Far Future", date(2030, 1, 1), -10.0));
    let mut graph = AccountGraph {
        accounts: vec![a],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2025, 6, 30), date(2025, 6, 30))).unwrap();

    assert_eq!(graph.accounts[0].ledger.len(), 1);
    assert!(graph.accounts[0].ledger.iter().all(|e| e.date <= date(2025, 6, 30)));
}

/// A window start trims the returned ledger's early history while the
/// remaining rows keep the balances that history produced.
#[test]
fn test_window_start_trim() {
    let mut graph = checking_with_rent();
    let opts = opts(date(2025, 6, 30), date(2025, 6, 30))
        .with_window_start(date(2025, 3, 1));
    run(&mut graph, &opts).unwrap();

    let account = &graph.accounts[0];
    // Opening balance and the Jan/Feb rents are gone; Mar through Jun stay
    assert_eq!(account.ledger.len(), 4);
    assert!(account.ledger.iter().all(|e| e.date >= date(2025, 3, 1)));
    assert_eq!(account.ledger.first().unwrap().balance, 700.0);
    assert_eq!(account.today_balance, 400.0);
}

/// The settled graph survives a JSON round trip unchanged, ledgers and
/// balances included.
#[test]
fn test_graph_serde_round_trip() {
    let mut graph = checking_with_rent();
    run(&mut graph, &opts(date(2025, 6, 30), date(2025, 6, 30))).unwrap();

    let json = serde_json::to_string(&graph).unwrap();
    let back: AccountGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(graph, back);
}

/// A combined scenario (interest, bills, pulls) keeps every account's
/// running balance continuous.
#[test]
fn test_combined_scenario_continuity() {
    let mut a = account(0, "Checking");
    a.minimum_balance = 500.0;
    a.performs_pulls = true;
    a.activities.push(opening(date(2025, 1, 1), 800.0));
    a.bills
        .push(monthly_bill(0, "Rent", date(2025, 1, 5), -1_200.0));
    a.bills
        .push(monthly_bill(1, "Paycheck", date(2025, 1, 15), 1_000.0));

    let mut b = account(1, "Savings");
    b.pull_priority = Some(1);
    b.activities.push(opening(date(2025, 1, 1), 20_000.0));
    b.interests.push(crate::model::Interest {
        interest_id: crate::model::InterestId(0),
        apr: crate::model::RateSpec::Literal(0.04),
        compounding: crate::model::Compounding::Monthly,
        applicable_from: date(2025, 1, 1),
        rate_source: None,
    });

    let mut graph = AccountGraph {
        accounts: vec![a, b],
        ..Default::default()
    };
    run(&mut graph, &opts(date(2025, 12, 31), date(2025, 12, 31))).unwrap();

    assert_continuity(&graph.accounts[0]);
    assert_continuity(&graph.accounts[1]);
    // The pull engine kept checking at or above its floor on every month
    // boundary snapshot
    assert!(graph.accounts[0].today_balance >= 0.0);
    assert!(
        graph.accounts[0]
            .ledger
            .iter()
            .any(|e| e.origin == crate::model::EntryOrigin::AutoPull)
    );
}
