//! Interest rate-change records

use serde::{Deserialize, Serialize};

use super::ids::InterestId;

/// Compounding period for an interest record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Compounding {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl Compounding {
    /// Number of compounding periods per year; the period rate is
    /// `apr / periods_per_year()`.
    #[must_use]
    pub fn periods_per_year(self) -> f64 {
        match self {
            Compounding::Daily => 365.0,
            Compounding::Weekly => 52.0,
            Compounding::Monthly => 12.0,
            Compounding::Quarterly => 4.0,
            Compounding::Yearly => 1.0,
        }
    }

    /// Step a posting date forward by one compounding period.
    #[must_use]
    pub fn next_date(self, date: jiff::civil::Date) -> jiff::civil::Date {
        use crate::date_math::{add_days, add_months_clamped};
        match self {
            Compounding::Daily => add_days(date, 1),
            Compounding::Weekly => add_days(date, 7),
            Compounding::Monthly => add_months_clamped(date, 1),
            Compounding::Quarterly => add_months_clamped(date, 3),
            Compounding::Yearly => add_months_clamped(date, 12),
        }
    }
}

/// An annual rate that is either a literal or a scenario variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RateSpec {
    Literal(f64),
    Variable(String),
}

/// One entry in an account's ordered interest-rate schedule. The collection
/// invariant is that `Account::interests` stays sorted by `applicable_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub interest_id: InterestId,
    pub apr: RateSpec,
    pub compounding: Compounding,
    pub applicable_from: jiff::civil::Date,
    /// Historical-rate series sampled instead of `apr` in Monte Carlo mode
    /// (e.g. `SAVINGS_YIELD`, `MARKET_RETURN`)
    pub rate_source: Option<String>,
}
