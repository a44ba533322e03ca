//! Pension and Social Security benefit definitions
//!
//! Benefit math is intentionally simplified rate arithmetic, not tax law.
//! All derived values (age at start, years of service, reduction factor,
//! monthly pay) are computed once at construction and memoized; the
//! orchestrator only reads them when posting paychecks.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::date_math::{days_in_month, fast_days_between};

/// Calendar-exact fractional age: whole years at the last anniversary plus
/// the elapsed fraction of the current anniversary year. Starting a benefit
/// exactly on a birthday yields a whole number, so `age >= threshold`
/// comparisons hold at the boundary.
#[must_use]
pub fn calendar_years_between(from: Date, to: Date) -> f64 {
    let clamp_anniversary = |year: i16| {
        let day = from.day().min(days_in_month(year, from.month()));
        jiff::civil::date(year, from.month(), day)
    };

    let mut years = (to.year() - from.year()) as i32;
    let mut last = clamp_anniversary(to.year());
    if to < last {
        years -= 1;
        last = clamp_anniversary(to.year() - 1);
    }
    let next = clamp_anniversary(last.year() + 1);
    let span = fast_days_between(last, next).max(1);
    let elapsed = fast_days_between(last, to);
    years as f64 + elapsed as f64 / span as f64
}

/// One eligibility requirement: the AND of whichever thresholds are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub min_age: Option<f64>,
    pub min_service_years: Option<f64>,
}

impl Requirement {
    #[must_use]
    pub fn met(&self, age: f64, service_years: f64) -> bool {
        self.min_age.is_none_or(|a| age >= a)
            && self.min_service_years.is_none_or(|y| service_years >= y)
    }
}

/// Reduction rate for a floored years-of-service key within an age row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServiceRate {
    pub service_years: u8,
    pub rate: f64,
}

/// One row of the two-level reduction table, keyed by floored age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReductionRow {
    pub age: u8,
    /// Sorted ascending by `service_years`
    pub rates: Vec<ServiceRate>,
}

/// Plan-specific early-retirement reduction table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReductionTable {
    /// Sorted ascending by `age`
    pub rows: Vec<ReductionRow>,
}

impl ReductionTable {
    /// Look up the reduction rate for a floored age and years-of-service,
    /// clamping both keys to the table's bounds. Age above the last row, or
    /// service above a row's last key, means no reduction applies (1.0).
    #[must_use]
    pub fn factor(&self, age: f64, service_years: f64) -> f64 {
        let Some(last_row) = self.rows.last() else {
            return 0.0;
        };
        let age_key = age.floor() as i32;
        if age_key > last_row.age as i32 {
            return 1.0;
        }

        // Floor lookup, clamped below to the first row
        let row = self
            .rows
            .iter()
            .rev()
            .find(|r| (r.age as i32) <= age_key)
            .unwrap_or(&self.rows[0]);

        let Some(last_rate) = row.rates.last() else {
            return 0.0;
        };
        let service_key = service_years.floor() as i32;
        if service_key > last_rate.service_years as i32 {
            return 1.0;
        }
        row.rates
            .iter()
            .rev()
            .find(|r| (r.service_years as i32) <= service_key)
            .unwrap_or(&row.rates[0])
            .rate
    }
}

/// Reduction factor for a pension start: full benefit when any unreduced
/// requirement is met, nothing when no reduced requirement is met either,
/// otherwise the table rate.
#[must_use]
pub fn reduction_factor(
    age: f64,
    service_years: f64,
    unreduced: &[Requirement],
    reduced: &[Requirement],
    table: &ReductionTable,
) -> f64 {
    if unreduced.iter().any(|r| r.met(age, service_years)) {
        return 1.0;
    }
    if !reduced.iter().any(|r| r.met(age, service_years)) {
        return 0.0;
    }
    table.factor(age, service_years)
}

/// Average of the highest `window` consecutive entries (whole history when
/// shorter than the window).
fn highest_consecutive_average(history: &[f64], window: usize) -> f64 {
    if history.is_empty() {
        return 0.0;
    }
    let window = window.clamp(1, history.len());
    history
        .windows(window)
        .map(|w| w.iter().sum::<f64>() / window as f64)
        .fold(f64::MIN, f64::max)
}

/// Defined-benefit pension. Derived fields are memoized at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pension {
    pub name: String,
    /// Account receiving the monthly paychecks
    pub pay_account: String,
    pub birth_date: Date,
    pub work_start_date: Date,
    pub start_date: Date,
    /// Prior annual net income, chronological
    pub income_history: Vec<f64>,
    /// Benefit accrual per year of service (e.g. 0.02)
    pub accrual_rate: f64,
    /// Consecutive-year window for the final average salary
    pub average_years: usize,
    pub unreduced_requirements: Vec<Requirement>,
    pub reduced_requirements: Vec<Requirement>,
    pub reduction_table: ReductionTable,

    // === Derived, memoized ===
    pub age_at_start: f64,
    pub service_years: f64,
    pub reduction_factor: f64,
    pub monthly_pay: f64,
}

impl Pension {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        pay_account: impl Into<String>,
        birth_date: Date,
        work_start_date: Date,
        start_date: Date,
        income_history: Vec<f64>,
        accrual_rate: f64,
        average_years: usize,
        unreduced_requirements: Vec<Requirement>,
        reduced_requirements: Vec<Requirement>,
        reduction_table: ReductionTable,
    ) -> Self {
        let age_at_start = calendar_years_between(birth_date, start_date);
        let service_years = calendar_years_between(work_start_date, start_date);
        let factor = reduction_factor(
            age_at_start,
            service_years,
            &unreduced_requirements,
            &reduced_requirements,
            &reduction_table,
        );
        let final_average = highest_consecutive_average(&income_history, average_years);
        let monthly_pay = final_average * accrual_rate * service_years * factor / 12.0;

        Self {
            name: name.into(),
            pay_account: pay_account.into(),
            birth_date,
            work_start_date,
            start_date,
            income_history,
            accrual_rate,
            average_years,
            unreduced_requirements,
            reduced_requirements,
            reduction_table,
            age_at_start,
            service_years,
            reduction_factor: factor,
            monthly_pay,
        }
    }
}

/// 2024 bend points for the Social Security primary insurance amount.
const SS_BEND_1: f64 = 1_174.0;
const SS_BEND_2: f64 = 7_078.0;
const SS_FULL_RETIREMENT_AGE: f64 = 67.0;
const SS_EARLIEST_AGE: f64 = 62.0;
const SS_LATEST_CREDIT_AGE: f64 = 70.0;

/// Early/delayed claiming adjustment relative to full retirement age:
/// -5/9% per month for the first 36 early months, -5/12% beyond, +2/3%
/// per delayed month up to age 70. Claiming before 62 pays nothing.
#[must_use]
pub fn social_security_claim_factor(age_at_start: f64) -> f64 {
    if age_at_start < SS_EARLIEST_AGE {
        return 0.0;
    }
    if age_at_start >= SS_FULL_RETIREMENT_AGE {
        let months_late =
            ((age_at_start.min(SS_LATEST_CREDIT_AGE) - SS_FULL_RETIREMENT_AGE) * 12.0).floor();
        return 1.0 + months_late * (2.0 / 300.0);
    }
    let months_early = ((SS_FULL_RETIREMENT_AGE - age_at_start) * 12.0).round();
    let first = months_early.min(36.0);
    let rest = (months_early - 36.0).max(0.0);
    1.0 - first * (5.0 / 900.0) - rest * (5.0 / 1200.0)
}

/// Social Security benefit. Derived fields are memoized at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialSecurity {
    pub name: String,
    pub pay_account: String,
    pub birth_date: Date,
    pub start_date: Date,
    /// Prior annual earnings, chronological
    pub income_history: Vec<f64>,

    // === Derived, memoized ===
    pub age_at_start: f64,
    pub claim_factor: f64,
    pub monthly_pay: f64,
}

impl SocialSecurity {
    pub fn new(
        name: impl Into<String>,
        pay_account: impl Into<String>,
        birth_date: Date,
        start_date: Date,
        income_history: Vec<f64>,
    ) -> Self {
        let age_at_start = calendar_years_between(birth_date, start_date);
        let claim_factor = social_security_claim_factor(age_at_start);

        // Average indexed monthly earnings over the top 35 years, padding
        // with zeros when the history is shorter.
        let mut top = income_history.clone();
        top.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        top.truncate(35);
        let aime = top.iter().sum::<f64>() / (35.0 * 12.0);

        let pia = 0.9 * aime.min(SS_BEND_1)
            + 0.32 * (aime.min(SS_BEND_2) - SS_BEND_1).max(0.0)
            + 0.15 * (aime - SS_BEND_2).max(0.0);
        let monthly_pay = pia * claim_factor;

        Self {
            name: name.into(),
            pay_account: pay_account.into(),
            birth_date,
            start_date,
            income_history,
            age_at_start,
            claim_factor,
            monthly_pay,
        }
    }
}

/// All retirement income plans supplied for a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlans {
    pub pensions: Vec<Pension>,
    pub social_securities: Vec<SocialSecurity>,
}
