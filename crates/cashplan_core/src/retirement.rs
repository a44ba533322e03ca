//! Retirement income posting
//!
//! Pensions and Social Security pay a memoized monthly amount on the first
//! of each month from their start date onward. The benefit math lives on
//! the model types; this module only turns "it is the 1st" into settled
//! deposit entries.

use crate::error::Result;
use crate::model::{EntryAmount, EntryOrigin, LedgerEntry, RetirementPlans};
use crate::simulation_state::SimulationState;

/// Post this month's pension and Social Security paychecks. Called on the
/// first of each month; a benefit pays from the first month boundary on or
/// after its start date.
pub fn post_retirement_income(state: &mut SimulationState, plans: &RetirementPlans) -> Result<()> {
    let date = state.date;

    for pension in &plans.pensions {
        if date < pension.start_date || pension.monthly_pay <= 0.0 {
            continue;
        }
        let idx = state.account_idx(&pension.pay_account)?;
        let entry = LedgerEntry::new(
            format!("PEN-{date}-{}", pension.name),
            pension.name.clone(),
            "Retirement Income",
            date,
            EntryAmount::Resolved(pension.monthly_pay),
            EntryOrigin::Retirement,
        );
        state.post_settled(idx, entry);
    }

    for benefit in &plans.social_securities {
        if date < benefit.start_date || benefit.monthly_pay <= 0.0 {
            continue;
        }
        let idx = state.account_idx(&benefit.pay_account)?;
        let entry = LedgerEntry::new(
            format!("SS-{date}-{}", benefit.name),
            benefit.name.clone(),
            "Retirement Income",
            date,
            EntryAmount::Resolved(benefit.monthly_pay),
            EntryOrigin::Retirement,
        );
        state.post_settled(idx, entry);
    }
    Ok(())
}
