//! Accounts and the account graph
//!
//! An account exclusively owns its activity/bill/interest definitions and
//! its derived consolidated ledger. The graph additionally carries the
//! transfers bucket: a pseudo-account holding transfer activity/bills not
//! anchored to a real source account, treated as just another ledger source
//! during expansion.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::activity::Activity;
use super::bill::Bill;
use super::entry::LedgerEntry;
use super::ids::AccountId;
use super::interest::Interest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Checking,
    Savings,
    Investment,
    Retirement,
    Loan,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub name: String,
    pub kind: AccountKind,

    // === Pull/push policy ===
    /// Pull ordering; lower numbers are pulled from first. `None` means the
    /// account is never pulled from (the source's `-1`).
    pub pull_priority: Option<u32>,
    pub minimum_balance: f64,
    /// Margin added to every pull to reduce repeated small pulls
    pub minimum_pull_amount: f64,
    pub performs_pulls: bool,
    pub performs_pushes: bool,
    /// Destination account for excess-balance pushes
    pub push_account: Option<String>,
    /// Pull/push are suppressed entirely outside this window when set
    pub push_start: Option<Date>,
    pub push_end: Option<Date>,

    // === Tax policy ===
    pub interest_tax_rate: f64,
    pub withdrawal_tax_rate: f64,
    pub early_withdrawal_penalty: f64,
    /// Withdrawals dated before this incur the early penalty
    pub penalty_until: Option<Date>,

    // === RMD policy ===
    pub uses_rmd: bool,
    /// Account receiving required distributions
    pub rmd_account: Option<String>,
    pub owner_birth_date: Option<Date>,

    // === Owned definitions ===
    pub activities: Vec<Activity>,
    pub bills: Vec<Bill>,
    /// Invariant: sorted ascending by `applicable_from`
    pub interests: Vec<Interest>,

    // === Derived at run time ===
    /// Chronologically sorted consolidated activity with running balances
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
    /// Balance as of "now": latest entry not after today, falling back to
    /// the last entry, 0 if empty
    #[serde(default)]
    pub today_balance: f64,
}

impl Account {
    /// Bare account with empty collections and neutral policy; tests and
    /// callers fill in what they need.
    pub fn new(account_id: AccountId, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            account_id,
            name: name.into(),
            kind,
            pull_priority: None,
            minimum_balance: 0.0,
            minimum_pull_amount: 0.0,
            performs_pulls: false,
            performs_pushes: false,
            push_account: None,
            push_start: None,
            push_end: None,
            interest_tax_rate: 0.0,
            withdrawal_tax_rate: 0.0,
            early_withdrawal_penalty: 0.0,
            penalty_until: None,
            uses_rmd: false,
            rmd_account: None,
            owner_birth_date: None,
            activities: Vec::new(),
            bills: Vec::new(),
            interests: Vec::new(),
            ledger: Vec::new(),
            today_balance: 0.0,
        }
    }

    /// Whether pull/push may run on `date` given the configured window.
    #[must_use]
    pub fn in_push_window(&self, date: Date) -> bool {
        if let Some(start) = self.push_start
            && date < start
        {
            return false;
        }
        if let Some(end) = self.push_end
            && date > end
        {
            return false;
        }
        true
    }

    /// Compute `today_balance` from the settled ledger.
    #[must_use]
    pub fn balance_as_of(&self, today: Date) -> f64 {
        let mut latest: Option<f64> = None;
        for entry in &self.ledger {
            if entry.date <= today {
                latest = Some(entry.balance);
            } else {
                break;
            }
        }
        match latest {
            Some(b) => b,
            None => self.ledger.last().map(|e| e.balance).unwrap_or(0.0),
        }
    }
}

/// Transfer activity/bills not anchored to a real source account. Entries
/// move between a real account's collections and this bucket when their
/// transfer flag flips (an editing concern outside this crate); the
/// expander treats it as one more ledger source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransfersBucket {
    pub activities: Vec<Activity>,
    pub bills: Vec<Bill>,
}

/// The fully deserialized input graph: accounts plus the transfers bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountGraph {
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub transfers: TransfersBucket,
}

impl AccountGraph {
    #[must_use]
    pub fn account_by_name(&self, name: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn account_index(&self, name: &str) -> Option<usize> {
        self.accounts.iter().position(|a| a.name == name)
    }
}
