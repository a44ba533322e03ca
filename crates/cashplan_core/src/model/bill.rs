//! Recurring bill templates

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::activity::{AmountSpec, DateSpec};
use super::ids::BillId;
use crate::date_math::{add_days, add_months_clamped};
use crate::error::ConfigError;

/// Recurrence unit. `period × every_n` always yields a strictly advancing
/// date sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
    Year,
}

impl PeriodUnit {
    /// Step a date forward by `every_n` of this unit. Month and year steps
    /// clamp to the target month's length.
    #[must_use]
    pub fn step(self, date: jiff::civil::Date, every_n: u32) -> jiff::civil::Date {
        let n = every_n.max(1) as i32;
        match self {
            PeriodUnit::Day => add_days(date, n),
            PeriodUnit::Week => add_days(date, 7 * n),
            PeriodUnit::Month => add_months_clamped(date, n),
            PeriodUnit::Year => add_months_clamped(date, 12 * n),
        }
    }
}

impl FromStr for PeriodUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "days" => Ok(PeriodUnit::Day),
            "week" | "weeks" => Ok(PeriodUnit::Week),
            "month" | "months" => Ok(PeriodUnit::Month),
            "year" | "years" => Ok(PeriodUnit::Year),
            other => Err(ConfigError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Scheduled amount increase applied on an annual anniversary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncreaseSchedule {
    /// Fixed increase rate (e.g. 0.03 for 3%)
    pub rate: f64,
    /// Historical-rate series sampled instead of `rate` in Monte Carlo mode
    /// (e.g. `INFLATION`, `RAISE_RATE`, `401K_LIMIT_INCREASE_RATE`)
    pub rate_source: Option<String>,
    /// Anniversary day of month
    pub day: i8,
    /// Anniversary month
    pub month: i8,
    /// When set, the increased amount is rounded up to the next multiple
    /// (e.g. contribution limits moving in $500 steps)
    pub ceiling: Option<f64>,
}

/// A recurring bill or transfer template, expanded into dated ledger rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bill {
    pub bill_id: BillId,
    pub name: String,
    pub category: String,
    pub start: DateSpec,
    /// Inclusive last recurrence date; `None` runs up to (not including)
    /// the horizon
    pub end: Option<DateSpec>,
    pub unit: PeriodUnit,
    pub every_n: u32,
    pub amount: AmountSpec,
    pub increase: Option<IncreaseSchedule>,
    pub automatic: bool,
    pub is_transfer: bool,
    pub from: Option<String>,
    pub to: Option<String>,
}
