//! Monthly cash management
//!
//! Runs on the first of each month. Pulls cover a projected shortfall for
//! the coming month by drawing from other accounts in `pull_priority`
//! order; pushes sweep excess balance into a designated target. Both post
//! paired transfer entries that settle immediately, with reserved id
//! prefixes and a flag color (pulls violet, pushes indigo).
//!
//! The shortfall projection is a single forward pass over the month's
//! already-scheduled entries starting from the settled balance. It does
//! not iterate to a fixed point and it ignores interest that would accrue
//! within the month, so a pull can slightly overshoot; the
//! `minimum_pull_amount` margin absorbs that.

use tracing::debug;

use crate::date_math::add_months_clamped;
use crate::error::Result;
use crate::model::{
    EntryAmount, EntryOrigin, FlagColor, LedgerEntry, auto_pull_id, auto_push_id,
};
use crate::simulation_state::SimulationState;

/// Minimum balance the account is projected to reach before the next month
/// boundary, assuming no intervention.
fn projected_month_minimum(state: &SimulationState, idx: usize) -> f64 {
    let month_end = add_months_clamped(state.date, 1);
    let account = &state.graph.accounts[idx];
    let mut balance = state.runtime[idx].balance;
    let mut min = balance;
    for entry in &account.ledger[state.runtime[idx].cursor..] {
        if entry.date >= month_end {
            break;
        }
        // Unresolvable fractions contribute nothing to the preview; they
        // fail loudly at settlement instead.
        balance += entry.amount.resolved().unwrap_or(0.0);
        min = min.min(balance);
    }
    min
}

fn post_transfer_pair(
    state: &mut SimulationState,
    from_idx: usize,
    to_idx: usize,
    id: String,
    name: &str,
    category: &str,
    amount: f64,
    origin: EntryOrigin,
    flag: FlagColor,
) {
    let date = state.date;
    let from_name = state.graph.accounts[from_idx].name.clone();
    let to_name = state.graph.accounts[to_idx].name.clone();

    let incoming = LedgerEntry::new(
        id.clone(),
        name,
        category,
        date,
        EntryAmount::Resolved(amount),
        origin,
    )
    .with_transfer(from_name.clone(), to_name.clone())
    .with_flag(flag);
    let outgoing = LedgerEntry::new(
        id,
        name,
        category,
        date,
        EntryAmount::Resolved(-amount),
        origin,
    )
    .with_transfer(from_name, to_name)
    .with_flag(flag);

    state.post_settled(to_idx, incoming);
    state.post_settled(from_idx, outgoing);
}

/// Pull phase for one account: cover the projected shortfall plus the
/// configured margin from other accounts in priority order. Stops silently
/// when no source has surplus left.
fn pull_for_account(state: &mut SimulationState, idx: usize) {
    let account = &state.graph.accounts[idx];
    let minimum = account.minimum_balance;
    let margin = account.minimum_pull_amount;
    let projected_min = projected_month_minimum(state, idx);
    if projected_min >= minimum {
        return;
    }
    let needed = (minimum - projected_min) + margin;
    cover_shortfall(state, idx, needed);
}

/// Drain priority-ordered sources until `needed` is covered or no source
/// has surplus left.
fn cover_shortfall(state: &mut SimulationState, idx: usize, mut needed: f64) {
    let mut sources: Vec<usize> = (0..state.graph.accounts.len())
        .filter(|&j| j != idx && state.graph.accounts[j].pull_priority.is_some())
        .collect();
    sources.sort_by_key(|&j| state.graph.accounts[j].pull_priority);

    for j in sources {
        if needed <= 0.0 {
            break;
        }
        let surplus = state.runtime[j].balance - state.graph.accounts[j].minimum_balance;
        if surplus <= 0.0 {
            continue;
        }
        let amount = needed.min(surplus);
        let id = auto_pull_id(state.date, state.next_auto_seq());
        debug!(
            date = %state.date,
            to = %state.graph.accounts[idx].name,
            from = %state.graph.accounts[j].name,
            amount,
            "auto pull"
        );
        post_transfer_pair(
            state,
            j,
            idx,
            id,
            "Automatic Pull",
            "Cash Management",
            amount,
            EntryOrigin::AutoPull,
            FlagColor::Violet,
        );
        needed -= amount;
    }
    // Any remaining shortfall is simply unmet; the balance goes negative
    // and the result shows it.
}

/// Push phase for one account: sweep everything above the retained floor
/// (minimum balance plus four pull margins) into the push target.
fn push_for_account(state: &mut SimulationState, idx: usize) -> Result<()> {
    let account = &state.graph.accounts[idx];
    let Some(target) = account.push_account.clone() else {
        return Ok(());
    };
    let floor = account.minimum_balance + 4.0 * account.minimum_pull_amount;
    let excess = state.runtime[idx].balance - floor;
    if excess <= 0.0 {
        return Ok(());
    }
    let target_idx = state.account_idx(&target)?;
    let id = auto_push_id(state.date, state.next_auto_seq());
    debug!(
        date = %state.date,
        from = %state.graph.accounts[idx].name,
        to = %target,
        amount = excess,
        "auto push"
    );
    post_transfer_pair(
        state,
        idx,
        target_idx,
        id,
        "Automatic Push",
        "Cash Management",
        excess,
        EntryOrigin::AutoPush,
        FlagColor::Indigo,
    );
    Ok(())
}

/// Run the month-boundary pull then push phases over every account. Pulls
/// all complete before any push so a push never drains money a later pull
/// would have needed the same day.
pub fn monthly_pull_push(state: &mut SimulationState) -> Result<()> {
    let date = state.date;
    for idx in 0..state.graph.accounts.len() {
        let account = &state.graph.accounts[idx];
        if account.performs_pulls && account.in_push_window(date) {
            pull_for_account(state, idx);
        }
    }
    for idx in 0..state.graph.accounts.len() {
        let account = &state.graph.accounts[idx];
        if account.performs_pushes && account.in_push_window(date) {
            push_for_account(state, idx)?;
        }
    }
    Ok(())
}

/// Same-day variant: enforce floors against the instantaneous settled
/// balances instead of the month projection. For callers reacting to a
/// shortfall that has already materialized.
pub fn immediate_pull_push(state: &mut SimulationState) -> Result<()> {
    let date = state.date;
    for idx in 0..state.graph.accounts.len() {
        let account = &state.graph.accounts[idx];
        if !(account.performs_pulls && account.in_push_window(date)) {
            continue;
        }
        let minimum = account.minimum_balance;
        let margin = account.minimum_pull_amount;
        let balance = state.runtime[idx].balance;
        if balance < minimum {
            cover_shortfall(state, idx, (minimum - balance) + margin);
        }
    }
    for idx in 0..state.graph.accounts.len() {
        let account = &state.graph.accounts[idx];
        if account.performs_pushes && account.in_push_window(date) {
            push_for_account(state, idx)?;
        }
    }
    Ok(())
}
