//! Integration tests for the cashplan calculation engine
//!
//! Tests are organized by topic:
//! - `scenario` - Variable resolution and raw value parsing
//! - `expand` - Activity/bill expansion into ledger rows
//! - `interest` - Interest schedules and compounding
//! - `pull_push` - Monthly cash management
//! - `taxes` - Annual withdrawal/interest tax settlement
//! - `rmd` - Required minimum distributions
//! - `retirement` - Pension and Social Security benefits
//! - `simulation` - Full day-loop runs and invariants
//! - `monte_carlo` - Randomized trials and percentile bands

mod scenario;
mod simulation;
mod taxes;

use jiff::civil::Date;

use crate::model::{
    Account, AccountGraph, AccountId, AccountKind, Activity, AmountSpec, Bill, BillId, DateSpec,
    EntryAmount, PeriodUnit, RateContext, RetirementPlans,
};
use crate::scenario::ScenarioSet;
use crate::simulation::{CalcOptions, simulate};

pub fn account(id: u16, name: &str) -> Account {
    Account::new(AccountId(id), name, AccountKind::Checking)
}

pub fn activity(name: &str, date: Date, amount: f64) -> Activity {
    Activity {
        name: name.to_string(),
        category: "General".to_string(),
        date: DateSpec::Literal(date),
        amount: AmountSpec::Literal(amount),
        is_transfer: false,
        from: None,
        to: None,
        flag: None,
        healthcare: None,
    }
}

pub fn transfer_activity(
    name: &str,
    date: Date,
    amount: AmountSpec,
    from: &str,
    to: &str,
) -> Activity {
    Activity {
        name: name.to_string(),
        category: "Transfers".to_string(),
        date: DateSpec::Literal(date),
        amount,
        is_transfer: true,
        from: Some(from.to_string()),
        to: Some(to.to_string()),
        flag: None,
        healthcare: None,
    }
}

pub fn monthly_bill(id: u16, name: &str, start: Date, amount: f64) -> Bill {
    Bill {
        bill_id: BillId(id),
        name: name.to_string(),
        category: "Bills".to_string(),
        start: DateSpec::Literal(start),
        end: None,
        unit: PeriodUnit::Month,
        every_n: 1,
        amount: AmountSpec::Literal(amount),
        increase: None,
        automatic: false,
        is_transfer: false,
        from: None,
        to: None,
    }
}

pub fn opening(date: Date, amount: f64) -> Activity {
    activity("Opening Balance", date, amount)
}

pub fn opts(today: Date, window_end: Date) -> CalcOptions {
    CalcOptions::new("base", today, window_end)
}

/// Run a deterministic calculation with empty scenarios, no retirement
/// plans, and the builtin rate tables.
pub fn run(graph: &mut AccountGraph, opts: &CalcOptions) -> crate::error::Result<()> {
    simulate(
        graph,
        &ScenarioSet::new(),
        &RetirementPlans::default(),
        &RateContext::default(),
        opts,
    )
}

/// Assert the balance continuity invariant: every entry's balance equals
/// the previous balance plus its amount.
pub fn assert_continuity(account: &Account) {
    let mut prev = 0.0;
    for (i, entry) in account.ledger.iter().enumerate() {
        let EntryAmount::Resolved(amount) = entry.amount else {
            panic!(
                "unresolved amount in {} ledger at index {i}: {:?}",
                account.name, entry.amount
            );
        };
        assert!(
            (prev + amount - entry.balance).abs() < 1e-9,
            "continuity broken in {} at index {i}: {prev} + {amount} != {}",
            account.name,
            entry.balance
        );
        prev = entry.balance;
    }
}
