//! Personal cash-flow projection library
//!
//! This crate turns a graph of accounts, one-off activities, recurring
//! bills, and interest schedules into settled per-account ledgers with
//! running balances, stepping a day at a time. It supports:
//! - Recurring bill expansion with scheduled anniversary increases
//! - Per-account interest schedules with configurable compounding
//! - Automatic monthly cash management (minimum-balance pulls, excess
//!   pushes) between accounts
//! - Annual withdrawal and interest tax withholding
//! - Required minimum distributions from retirement accounts
//! - Pension and Social Security income with early/late adjustments
//! - Named simulations whose variables parameterize dates and amounts
//! - Monte Carlo trials over historical rate tables, reduced to
//!   percentile bands of each account's yearly minimum balance
//!
//! ```ignore
//! use cashplan_core::{
//!     AccountGraph, CalcOptions, RateContext, RetirementPlans, ScenarioSet, simulate,
//! };
//!
//! let mut graph: AccountGraph = serde_json::from_str(&input)?;
//! let opts = CalcOptions::new("default", today, today.checked_add(10.years())?);
//! simulate(&mut graph, &ScenarioSet::new(), &RetirementPlans::default(),
//!          &RateContext::default(), &opts)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod date_math;
pub mod error;
pub mod expand;
pub mod interest;
pub mod pull_push;
pub mod retirement;
pub mod rmd;
pub mod scenario;
pub mod simulation;
pub mod simulation_state;
pub mod taxes;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use error::{CalcError, ConfigError, DataError, Result};
pub use model::{
    Account, AccountGraph, AccountId, AccountKind, Activity, AmountSpec, Bill, Compounding,
    DateSpec, EntryAmount, EntryOrigin, FlagColor, Fraction, FractionPart, HealthcareFlags,
    HistoricalRates, IncreaseSchedule, Interest, InterestId, LedgerEntry, MonteCarloBands,
    MonteCarloSamples, PercentileBand, PeriodUnit, RateContext, RateMode, RateSpec, RateTable,
    RetirementPlans, RmdTable, TransfersBucket,
};
pub use scenario::{Scenario, ScenarioSet, VariableValue};
pub use simulation::{CalcOptions, monte_carlo_simulate, simulate};
