//! The day-stepping calculation loop
//!
//! One run expands every definition into dated ledger rows, then walks day
//! by day from the earliest entry to the window end. Each day executes a
//! fixed sequence: interest accrual, settlement of everything due, then on
//! month boundaries cash management and retirement income, on April 1st
//! (when it has arrived) last year's taxes, and on December 31st required
//! distributions. The fixed order is what makes reruns byte-identical.
//!
//! Monte Carlo repeats the run with rates drawn from the historical tables,
//! reducing each trial to its per-(year, account) minimum balances.

use std::collections::BTreeMap;

use jiff::civil::Date;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::debug;

use crate::date_math::add_days;
use crate::error::{ConfigError, Result};
use crate::expand::Expander;
use crate::interest::accrue_interest;
use crate::model::{
    AccountGraph, AccountId, MonteCarloBands, MonteCarloSamples, RateContext, RateMode,
    RetirementPlans,
};
use crate::pull_push::monthly_pull_push;
use crate::retirement::post_retirement_income;
use crate::rmd::settle_rmds;
use crate::scenario::ScenarioSet;
use crate::simulation_state::{RunContext, SimulationState, validate_graph};
use crate::taxes::settle_annual_taxes;

/// Options for one calculation run.
#[derive(Debug, Clone)]
pub struct CalcOptions {
    /// Which named simulation's variable table resolves variables
    pub simulation: String,
    /// The boundary between "has happened" and "projected": taxes only
    /// settle for April 1sts on or before this date, and it anchors
    /// `today_balance`
    pub today: Date,
    /// First day of the returned window; `None` keeps the ledger from its
    /// earliest entry. Settlement always starts at the earliest entry
    /// regardless, so trimmed rows still feed the running balances.
    pub window_start: Option<Date>,
    /// Last day of the calculation window
    pub window_end: Date,
    pub seed: u64,
}

impl CalcOptions {
    pub fn new(simulation: impl Into<String>, today: Date, window_end: Date) -> Self {
        Self {
            simulation: simulation.into(),
            today,
            window_start: None,
            window_end,
            seed: 0,
        }
    }

    #[must_use]
    pub fn with_window_start(mut self, start: Date) -> Self {
        self.window_start = Some(start);
        self
    }
}

/// Run one deterministic calculation with configured literal rates. On
/// success the graph's ledgers hold the settled, balance-stamped activity
/// and each account's `today_balance` is set.
pub fn simulate(
    graph: &mut AccountGraph,
    scenarios: &ScenarioSet,
    plans: &RetirementPlans,
    rates: &RateContext,
    opts: &CalcOptions,
) -> Result<()> {
    let mut rng = SmallRng::seed_from_u64(opts.seed);
    run_once(
        graph,
        scenarios,
        plans,
        rates,
        opts,
        RateMode::Fixed,
        &mut rng,
    )
}

fn run_once<R: Rng + ?Sized>(
    graph: &mut AccountGraph,
    scenarios: &ScenarioSet,
    plans: &RetirementPlans,
    rates: &RateContext,
    opts: &CalcOptions,
    mode: RateMode,
    rng: &mut R,
) -> Result<()> {
    validate_graph(graph)?;
    for pension in &plans.pensions {
        if graph.account_index(&pension.pay_account).is_none() {
            return Err(ConfigError::AccountNotFound(pension.pay_account.clone()).into());
        }
    }
    for benefit in &plans.social_securities {
        if graph.account_index(&benefit.pay_account).is_none() {
            return Err(ConfigError::AccountNotFound(benefit.pay_account.clone()).into());
        }
    }

    let mut expander = Expander::new(
        scenarios,
        &opts.simulation,
        opts.window_end,
        mode,
        &rates.rates,
    );
    expander.expand(graph, rng)?;

    let start = graph
        .accounts
        .iter()
        .flat_map(|a| a.ledger.iter().map(|e| e.date))
        .min()
        .unwrap_or(opts.today);
    let mut state = SimulationState::new(std::mem::take(graph), start);
    let ctx = RunContext {
        scenarios,
        simulation: &opts.simulation,
        mode,
        rates: &rates.rates,
    };

    while state.date <= opts.window_end {
        let date = state.date;
        for idx in 0..state.graph.accounts.len() {
            accrue_interest(&mut state, idx, &ctx, rng)?;
        }
        for idx in 0..state.graph.accounts.len() {
            state.settle_due(idx)?;
        }
        if date.day() == 1 {
            monthly_pull_push(&mut state)?;
            post_retirement_income(&mut state, plans)?;
        }
        if date.month() == 4 && date.day() == 1 && date <= opts.today {
            settle_annual_taxes(&mut state)?;
        }
        if date.month() == 12 && date.day() == 31 {
            settle_rmds(&mut state, &rates.rmd)?;
        }
        state.reset_daily_seq();
        state.date = add_days(date, 1);
    }

    *graph = state.into_graph();
    for account in &mut graph.accounts {
        // Anchor the balance before trimming; a window start past "today"
        // would otherwise drop the entries it reads.
        account.today_balance = account.balance_as_of(opts.today);
        account.ledger.retain(|e| {
            e.date <= opts.window_end
                && opts.window_start.is_none_or(|start| e.date >= start)
        });
    }
    Ok(())
}

/// One trial's per-(year, account) minimum balances. Years with no ledger
/// activity carry the previous year's closing balance.
fn yearly_minimums(graph: &AccountGraph, end_year: i16) -> Vec<((i16, AccountId), f64)> {
    let mut out = Vec::new();
    for account in &graph.accounts {
        let mut mins: BTreeMap<i16, f64> = BTreeMap::new();
        let mut closes: BTreeMap<i16, f64> = BTreeMap::new();
        for entry in &account.ledger {
            let year = entry.date.year();
            mins.entry(year)
                .and_modify(|m| *m = m.min(entry.balance))
                .or_insert(entry.balance);
            closes.insert(year, entry.balance);
        }
        let Some((&first_year, _)) = mins.first_key_value() else {
            continue;
        };
        let mut carry = 0.0;
        for year in first_year..=end_year {
            match mins.get(&year) {
                Some(&min) => {
                    out.push(((year, account.account_id), min));
                    carry = closes[&year];
                }
                None => out.push(((year, account.account_id), carry)),
            }
        }
    }
    out
}

fn run_trial(
    graph: &AccountGraph,
    scenarios: &ScenarioSet,
    plans: &RetirementPlans,
    rates: &RateContext,
    opts: &CalcOptions,
    seed: u64,
) -> Result<Vec<((i16, AccountId), f64)>> {
    let mut graph = graph.clone();
    let mut rng = SmallRng::seed_from_u64(seed);
    run_once(
        &mut graph,
        scenarios,
        plans,
        rates,
        opts,
        RateMode::MonteCarlo,
        &mut rng,
    )?;
    Ok(yearly_minimums(&graph, opts.window_end.year()))
}

/// Run `num_trials` randomized trials and reduce them to percentile bands
/// of each (year, account)'s minimum balance. Trials run in seeded batches
/// so results are reproducible for a given `opts.seed` regardless of
/// thread scheduling.
pub fn monte_carlo_simulate(
    graph: &AccountGraph,
    scenarios: &ScenarioSet,
    plans: &RetirementPlans,
    rates: &RateContext,
    opts: &CalcOptions,
    num_trials: usize,
) -> Result<MonteCarloBands> {
    const MAX_BATCH_SIZE: usize = 100;
    let num_batches = num_trials.div_ceil(MAX_BATCH_SIZE);

    let run_batch = |i: usize| -> Vec<Result<Vec<((i16, AccountId), f64)>>> {
        let mut seeder = SmallRng::seed_from_u64(opts.seed.wrapping_add(i as u64));
        let batch_size = if i == num_batches - 1 {
            num_trials - i * MAX_BATCH_SIZE
        } else {
            MAX_BATCH_SIZE
        };
        (0..batch_size)
            .map(|_| {
                let seed = seeder.next_u64();
                run_trial(graph, scenarios, plans, rates, opts, seed)
            })
            .collect()
    };

    #[cfg(feature = "parallel")]
    let trial_results: Vec<_> = (0..num_batches).into_par_iter().flat_map(run_batch).collect();
    #[cfg(not(feature = "parallel"))]
    let trial_results: Vec<_> = (0..num_batches).flat_map(run_batch).collect();

    let mut samples = MonteCarloSamples::new();
    for result in trial_results {
        samples.record_trial(result?);
    }
    debug!(trials = samples.trials, "monte carlo reduction");
    Ok(samples.reduce())
}
