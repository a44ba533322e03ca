//! Interest accrual
//!
//! Each account's interest schedule is a sequence of rate-change records
//! sorted by `applicable_from`. The tracker walks the schedule once per
//! run: when the next record's effective date arrives it becomes the
//! active regime, and the active regime posts one compounding entry per
//! completed period against the running settled balance. An account with
//! no schedule simply never accrues.

use rand::Rng;

use crate::error::{ConfigError, Result};
use crate::model::{
    Compounding, EntryAmount, EntryOrigin, InterestId, LedgerEntry, RateMode, RateSpec,
};
use crate::simulation_state::{RunContext, SimulationState};

/// Per-account interest cursor: which schedule record is active and when
/// its next compounding period completes.
#[derive(Debug, Clone, Default)]
pub struct InterestTracker {
    next_record: usize,
    active: Option<ActiveRegime>,
}

#[derive(Debug, Clone)]
struct ActiveRegime {
    interest_id: InterestId,
    period_rate: f64,
    compounding: Compounding,
    next_posting: jiff::civil::Date,
}

fn resolve_apr<R: Rng + ?Sized>(
    ctx: &RunContext<'_>,
    spec: &RateSpec,
    rate_source: Option<&str>,
    rng: &mut R,
) -> Result<f64> {
    if ctx.mode == RateMode::MonteCarlo
        && let Some(source) = rate_source
    {
        let series = ctx
            .rates
            .get(source)
            .ok_or_else(|| ConfigError::RateSeriesNotFound(source.to_string()))?;
        if let Some(sampled) = series.sample(rng) {
            return Ok(sampled);
        }
    }
    match spec {
        RateSpec::Literal(rate) => Ok(*rate),
        RateSpec::Variable(name) => Ok(ctx
            .scenarios
            .resolve_amount(ctx.simulation, name)?),
    }
}

/// Advance one account's interest state to the current day: activate any
/// record whose effective date has arrived, and post a compounding entry
/// when the active regime's period completes today. The posted entry is
/// pending; it settles with the rest of the day.
pub fn accrue_interest<R: Rng + ?Sized>(
    state: &mut SimulationState,
    idx: usize,
    ctx: &RunContext<'_>,
    rng: &mut R,
) -> Result<()> {
    let date = state.date;

    loop {
        let account = &state.graph.accounts[idx];
        let tracker = &state.runtime[idx].interest;
        let Some(record) = account.interests.get(tracker.next_record) else {
            break;
        };
        if record.applicable_from > date {
            break;
        }
        let apr = resolve_apr(ctx, &record.apr, record.rate_source.as_deref(), rng)?;
        let compounding = record.compounding;
        // First posting is one full period after the record takes effect,
        // rolled forward if the run starts mid-regime.
        let mut next_posting = compounding.next_date(record.applicable_from);
        while next_posting < date {
            next_posting = compounding.next_date(next_posting);
        }
        let regime = ActiveRegime {
            interest_id: record.interest_id,
            period_rate: apr / compounding.periods_per_year(),
            compounding,
            next_posting,
        };
        let tracker = &mut state.runtime[idx].interest;
        tracker.active = Some(regime);
        tracker.next_record += 1;
    }

    let due = state.runtime[idx]
        .interest
        .active
        .as_ref()
        .filter(|a| a.next_posting == date)
        .map(|a| (a.interest_id, a.period_rate, a.compounding));
    if let Some((interest_id, period_rate, compounding)) = due {
        let amount = state.runtime[idx].balance * period_rate;
        if amount != 0.0 {
            let entry = LedgerEntry::new(
                format!("INT{}-{date}", interest_id.0),
                "Interest",
                "Interest",
                date,
                EntryAmount::Resolved(amount),
                EntryOrigin::Interest(interest_id),
            );
            state.post_pending(idx, entry);
        }
        if let Some(active) = &mut state.runtime[idx].interest.active {
            active.next_posting = compounding.next_date(active.next_posting);
        }
    }
    Ok(())
}
