mod account;
mod activity;
mod bill;
mod entry;
mod ids;
mod interest;
mod rates;
mod results;
mod retirement;

pub use account::{Account, AccountGraph, AccountKind, TransfersBucket};
pub use activity::{Activity, AmountSpec, DateSpec, Fraction, FractionPart, HealthcareFlags};
pub use bill::{Bill, IncreaseSchedule, PeriodUnit};
pub use entry::{
    EntryAmount, EntryOrigin, FlagColor, LedgerEntry, auto_pull_id, auto_push_id, bill_entry_id,
    interest_tax_entry_id, rmd_entry_id, tax_entry_id,
};
pub use ids::{AccountId, BillId, InterestId};
pub use interest::{Compounding, Interest, RateSpec};
pub use rates::{HistoricalRates, RateContext, RateMode, RateTable, RmdTable, RmdTableEntry};
pub use results::{
    MonteCarloBands, MonteCarloSamples, PERCENTILE_LADDER, PercentileBand, round_cents,
};
pub use retirement::{
    Pension, ReductionRow, ReductionTable, Requirement, RetirementPlans, ServiceRate,
    SocialSecurity, calendar_years_between, reduction_factor, social_security_claim_factor,
};
