//! Consolidated ledger rows
//!
//! A `LedgerEntry` is one dated, amount-resolved row of an account's
//! consolidated activity. Engine-generated rows carry reserved id prefixes
//! (`AUTO-PULL`, `AUTO-PUSH`, `TAX`, `RMD`) so they are distinguishable from
//! user entries; transfer mirror rows are independent entries with negated
//! amounts linked only by a shared id.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::activity::Fraction;
use super::ids::{BillId, InterestId};

/// UI flag annotation carried on engine-generated rows (pulls are violet,
/// pushes indigo) and on flagged user activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlagColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

/// What produced a ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryOrigin {
    /// Copied from a user's one-off activity
    User,
    /// Expanded from a recurring bill; `first` tags the first instance
    Bill { bill_id: BillId, first: bool },
    /// Posted by the interest engine
    Interest(InterestId),
    /// Automatic minimum-balance pull
    AutoPull,
    /// Automatic excess-balance push
    AutoPush,
    /// Annual withdrawal/interest tax withholding
    Tax,
    /// Required minimum distribution
    Rmd,
    /// Pension or Social Security paycheck
    Retirement,
}

/// A row amount: resolved to a number, or a fraction token still awaiting
/// the transfer source's settled balance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntryAmount {
    Resolved(f64),
    Fraction(Fraction),
}

impl EntryAmount {
    #[must_use]
    pub fn resolved(self) -> Option<f64> {
        match self {
            EntryAmount::Resolved(v) => Some(v),
            EntryAmount::Fraction(_) => None,
        }
    }
}

/// One consolidated-activity row. Immutable after creation except for
/// `balance` (set once during settlement) and fraction resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: String,
    pub name: String,
    pub category: String,
    pub date: Date,
    pub amount: EntryAmount,
    /// Running balance after this row, set by the orchestrator
    pub balance: f64,
    pub origin: EntryOrigin,
    pub is_transfer: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub flag: Option<FlagColor>,
}

impl LedgerEntry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
        date: Date,
        amount: EntryAmount,
        origin: EntryOrigin,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
            date,
            amount,
            balance: 0.0,
            origin,
            is_transfer: false,
            from: None,
            to: None,
            flag: None,
        }
    }

    pub fn with_transfer(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.is_transfer = true;
        self.from = Some(from.into());
        self.to = Some(to.into());
        self
    }

    pub fn with_flag(mut self, flag: FlagColor) -> Self {
        self.flag = Some(flag);
        self
    }

    /// Resolved amount, or 0.0 for a still-pending fraction.
    #[must_use]
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.resolved().unwrap_or(0.0)
    }
}

/// Deterministic id for a bill-derived row; transfer mirrors share it so
/// both ledger sides correlate by lookup.
#[must_use]
pub fn bill_entry_id(bill_id: BillId, date: Date) -> String {
    format!("B{}-{date}", bill_id.0)
}

/// Id for an automatic pull pair; `seq` disambiguates repeated pulls on the
/// same day.
#[must_use]
pub fn auto_pull_id(date: Date, seq: u32) -> String {
    format!("AUTO-PULL-{date}-{seq}")
}

/// Id for an automatic push pair.
#[must_use]
pub fn auto_push_id(date: Date, seq: u32) -> String {
    format!("AUTO-PUSH-{date}-{seq}")
}

/// Id for an annual withdrawal-tax withholding entry.
#[must_use]
pub fn tax_entry_id(date: Date, account: &str) -> String {
    format!("TAX-{date}-{account}")
}

/// Id for an annual interest-tax withholding entry, kept under the reserved
/// `TAX` prefix but distinct from the withdrawal entry on the same day.
#[must_use]
pub fn interest_tax_entry_id(date: Date, account: &str) -> String {
    format!("TAX-INT-{date}-{account}")
}

/// Id for an RMD transfer pair.
#[must_use]
pub fn rmd_entry_id(date: Date, account: &str) -> String {
    format!("RMD-{date}-{account}")
}
