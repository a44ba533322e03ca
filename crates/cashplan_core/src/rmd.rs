//! Required minimum distributions
//!
//! Posted on December 31st for every RMD-flagged account whose owner has
//! attained the table's first distribution age that calendar year. The
//! distribution amount is the account's current end-of-year balance divided
//! by the IRS divisor for the attained age, moved to the configured target
//! account as a settled transfer pair.
//!
//! An owner below the table's first age is skipped; an owner at or above it
//! with no divisor row is a configuration error and aborts the run.

use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::model::{EntryAmount, EntryOrigin, LedgerEntry, RmdTable, rmd_entry_id};
use crate::simulation_state::SimulationState;

/// Settle this year's distributions across the graph.
pub fn settle_rmds(state: &mut SimulationState, table: &RmdTable) -> Result<()> {
    let date = state.date;
    for idx in 0..state.graph.accounts.len() {
        let account = &state.graph.accounts[idx];
        if !account.uses_rmd {
            continue;
        }
        let (Some(birth), Some(target)) = (account.owner_birth_date, account.rmd_account.clone())
        else {
            continue;
        };
        // Age attained during this calendar year.
        let age = date.year() - birth.year();
        let Ok(age) = u8::try_from(age) else {
            continue;
        };
        if table.first_age().is_none_or(|first| age < first) {
            continue;
        }
        let divisor = table
            .divisor_for_age(age)
            .ok_or(ConfigError::MissingRmdDivisor { age })?;

        let balance = state.runtime[idx].balance;
        if balance <= 0.0 {
            continue;
        }
        let amount = balance / divisor;
        let name = state.graph.accounts[idx].name.clone();
        let target_idx = state.account_idx(&target)?;
        debug!(date = %date, account = %name, age, amount, "required minimum distribution");

        let id = rmd_entry_id(date, &name);
        let incoming = LedgerEntry::new(
            id.clone(),
            "Required Minimum Distribution",
            "Retirement",
            date,
            EntryAmount::Resolved(amount),
            EntryOrigin::Rmd,
        )
        .with_transfer(name.clone(), target.clone());
        let outgoing = LedgerEntry::new(
            id,
            "Required Minimum Distribution",
            "Retirement",
            date,
            EntryAmount::Resolved(-amount),
            EntryOrigin::Rmd,
        )
        .with_transfer(name, target);

        state.post_settled(target_idx, incoming);
        state.post_settled(idx, outgoing);
    }
    Ok(())
}
