//! Annual tax settlement
//!
//! Posted once a year on April 1st, covering the previous calendar year,
//! and only for April 1sts that have actually arrived (projections past
//! "today" carry no withholding, matching how the user would see them).
//!
//! Two passes, each posting its own aggregated TAX entry per account:
//! - withdrawal tax on money that arrived via automatic pulls or required
//!   distributions, at the *source* account's withdrawal rate, plus the
//!   source's early-withdrawal penalty when the withdrawal predates its
//!   penalty cutoff
//! - interest tax on the account's own interest postings, at the account's
//!   interest rate

use tracing::debug;

use crate::error::Result;
use crate::model::{
    EntryAmount, EntryOrigin, LedgerEntry, interest_tax_entry_id, tax_entry_id,
};
use crate::simulation_state::SimulationState;

fn withdrawal_tax_owed(state: &SimulationState, idx: usize, tax_year: i16) -> f64 {
    let account = &state.graph.accounts[idx];
    let mut owed = 0.0;
    for entry in &account.ledger {
        if entry.date.year() != tax_year {
            continue;
        }
        if !matches!(entry.origin, EntryOrigin::AutoPull | EntryOrigin::Rmd) {
            continue;
        }
        // Only the incoming side of the pair is taxed.
        let amount = entry.amount_or_zero();
        if amount <= 0.0 {
            continue;
        }
        let Some(source) = entry
            .from
            .as_deref()
            .and_then(|name| state.graph.account_by_name(name))
        else {
            continue;
        };
        let mut rate = source.withdrawal_tax_rate;
        if let Some(cutoff) = source.penalty_until
            && entry.date < cutoff
        {
            rate += source.early_withdrawal_penalty;
        }
        owed += amount * rate;
    }
    owed
}

fn interest_tax_owed(state: &SimulationState, idx: usize, tax_year: i16) -> f64 {
    let account = &state.graph.accounts[idx];
    account
        .ledger
        .iter()
        .filter(|entry| {
            entry.date.year() == tax_year
                && matches!(entry.origin, EntryOrigin::Interest(_))
        })
        .map(|entry| entry.amount_or_zero() * account.interest_tax_rate)
        .sum()
}

fn post_tax_entry(state: &mut SimulationState, idx: usize, id: String, name: String, owed: f64) {
    let date = state.date;
    let entry = LedgerEntry::new(
        id,
        name,
        "Taxes",
        date,
        EntryAmount::Resolved(-owed),
        EntryOrigin::Tax,
    );
    state.post_settled(idx, entry);
}

/// Settle last year's taxes for every account: the withdrawal pass first,
/// then the interest pass, each posting a negative TAX entry per account
/// that owes anything.
pub fn settle_annual_taxes(state: &mut SimulationState) -> Result<()> {
    let date = state.date;
    let tax_year = date.year() - 1;
    for idx in 0..state.graph.accounts.len() {
        let owed = withdrawal_tax_owed(state, idx, tax_year);
        if owed <= 0.0 {
            continue;
        }
        let name = state.graph.accounts[idx].name.clone();
        debug!(date = %date, account = %name, owed, "withdrawal tax withholding");
        let id = tax_entry_id(date, &name);
        post_tax_entry(state, idx, id, format!("{tax_year} Withdrawal Taxes"), owed);
    }
    for idx in 0..state.graph.accounts.len() {
        let owed = interest_tax_owed(state, idx, tax_year);
        if owed <= 0.0 {
            continue;
        }
        let name = state.graph.accounts[idx].name.clone();
        debug!(date = %date, account = %name, owed, "interest tax withholding");
        let id = interest_tax_entry_id(date, &name);
        post_tax_entry(state, idx, id, format!("{tax_year} Interest Taxes"), owed);
    }
    Ok(())
}
