//! Mutable per-run state
//!
//! `SimulationState` owns the expanded account graph plus each account's
//! runtime: a settlement cursor into its ledger, the running balance, and
//! the interest tracker. Entries before the cursor are settled (balance
//! stamped); entries at or after it are pending. Engine-posted rows are
//! inserted at the cursor, which preserves date order because everything
//! before it is dated on or before the current day.

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::error::{ConfigError, DataError, Result};
use crate::interest::InterestTracker;
use crate::model::{
    AccountGraph, EntryAmount, Fraction, LedgerEntry, RateMode, RateTable,
};
use crate::scenario::ScenarioSet;

/// Read-only context threaded through the engines during one run.
pub struct RunContext<'a> {
    pub scenarios: &'a ScenarioSet,
    pub simulation: &'a str,
    pub mode: RateMode,
    pub rates: &'a RateTable,
}

/// Per-account runtime alongside the graph.
#[derive(Debug, Clone, Default)]
pub struct AccountRuntime {
    /// Index of the first unsettled ledger entry
    pub cursor: usize,
    /// Balance after the last settled entry
    pub balance: f64,
    pub interest: InterestTracker,
}

/// The whole mutable state of one simulation run.
pub struct SimulationState {
    pub graph: AccountGraph,
    pub runtime: Vec<AccountRuntime>,
    index: FxHashMap<String, usize>,
    pub date: Date,
    auto_seq: u32,
}

impl SimulationState {
    /// Build runtime state over an expanded graph. The name index is built
    /// once here; later lookups cannot fail for names that validated.
    pub fn new(graph: AccountGraph, start: Date) -> Self {
        let runtime = graph
            .accounts
            .iter()
            .map(|_| AccountRuntime::default())
            .collect();
        let index = graph
            .accounts
            .iter()
            .enumerate()
            .map(|(idx, account)| (account.name.clone(), idx))
            .collect();
        Self {
            graph,
            runtime,
            index,
            date: start,
            auto_seq: 0,
        }
    }

    pub fn into_graph(self) -> AccountGraph {
        self.graph
    }

    pub fn account_idx(&self, name: &str) -> Result<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::AccountNotFound(name.to_string()).into())
    }

    /// Next disambiguator for engine-posted pairs; resets each day.
    pub fn next_auto_seq(&mut self) -> u32 {
        self.auto_seq += 1;
        self.auto_seq
    }

    pub fn reset_daily_seq(&mut self) {
        self.auto_seq = 0;
    }

    /// Insert an unsettled entry at the cursor. It settles with the rest of
    /// the day's pending entries.
    pub fn post_pending(&mut self, idx: usize, entry: LedgerEntry) {
        let cursor = self.runtime[idx].cursor;
        self.graph.accounts[idx].ledger.insert(cursor, entry);
    }

    /// Insert an entry at the cursor and settle it immediately.
    pub fn post_settled(&mut self, idx: usize, mut entry: LedgerEntry) {
        let amount = entry.amount_or_zero();
        let rt = &mut self.runtime[idx];
        rt.balance += amount;
        entry.balance = rt.balance;
        let cursor = rt.cursor;
        self.graph.accounts[idx].ledger.insert(cursor, entry);
        rt.cursor += 1;
    }

    /// Settle every pending entry dated on or before the current day:
    /// resolve fraction amounts against their transfer mirror, apply the
    /// amount to the running balance, and stamp the entry.
    pub fn settle_due(&mut self, idx: usize) -> Result<()> {
        loop {
            let cursor = self.runtime[idx].cursor;
            let Some(entry) = self.graph.accounts[idx].ledger.get(cursor) else {
                break;
            };
            if entry.date > self.date {
                break;
            }
            let pending = entry.amount;
            let amount = match pending {
                EntryAmount::Resolved(v) => v,
                EntryAmount::Fraction(f) => self.resolve_fraction_pair(idx, cursor, f)?,
            };
            let rt = &mut self.runtime[idx];
            rt.balance += amount;
            rt.cursor += 1;
            let balance = rt.balance;
            let entry = &mut self.graph.accounts[idx].ledger[cursor];
            entry.amount = EntryAmount::Resolved(amount);
            entry.balance = balance;
        }
        Ok(())
    }

    /// Resolve a `{HALF}`/`{FULL}` transfer amount: the fraction of the
    /// source account's settled balance at resolution time. Both sides of
    /// the pair are resolved together from the same base, whichever side
    /// settles first, so the amounts are exact negations. A negated token
    /// reverses the transfer direction.
    fn resolve_fraction_pair(
        &mut self,
        idx: usize,
        cursor: usize,
        fraction: Fraction,
    ) -> Result<f64> {
        let entry = &self.graph.accounts[idx].ledger[cursor];
        let id = entry.id.clone();
        let (Some(from), Some(to)) = (entry.from.clone(), entry.to.clone()) else {
            return Err(DataError::UnpairedFraction { id }.into());
        };
        if from == to {
            return Err(DataError::UnresolvedFraction { id }.into());
        }
        let from_idx = self.account_idx(&from)?;
        let to_idx = self.account_idx(&to)?;

        // The from-side mirror carries the token with its negation flipped,
        // so the user's direction is recovered from which side this is. A
        // negated token reverses the transfer, making `to` the paying side.
        let reversed = if idx == from_idx {
            !fraction.negate
        } else {
            fraction.negate
        };
        let payer_idx = if reversed { to_idx } else { from_idx };

        // A drained or negative payer moves nothing.
        let base = self.runtime[payer_idx].balance.max(0.0);
        let magnitude = fraction.part.factor() * base;

        // This entry's own token sign says whether it receives or pays.
        let this_amount = if fraction.negate { -magnitude } else { magnitude };
        let mirror_idx = if idx == to_idx { from_idx } else { to_idx };
        let mirror_amount = -this_amount;

        let mirror = self.graph.accounts[mirror_idx]
            .ledger
            .iter_mut()
            .find(|e| e.id == id && matches!(e.amount, EntryAmount::Fraction(_)))
            .ok_or(DataError::UnpairedFraction { id })?;
        mirror.amount = EntryAmount::Resolved(mirror_amount);

        Ok(this_amount)
    }
}

/// Fail-fast reference validation over the raw (pre-expansion) graph: every
/// push target, RMD target, and transfer endpoint must name a real account,
/// and a transfer-flagged definition must carry both endpoints.
pub fn validate_graph(graph: &AccountGraph) -> Result<()> {
    let exists = |name: &str| graph.account_index(name).is_some();
    let check = |name: &Option<String>| -> Result<()> {
        if let Some(name) = name
            && !exists(name)
        {
            return Err(ConfigError::AccountNotFound(name.clone()).into());
        }
        Ok(())
    };
    let check_transfer = |name: &str, from: &Option<String>, to: &Option<String>| -> Result<()> {
        if from.is_none() || to.is_none() {
            return Err(ConfigError::IncompleteTransfer(name.to_string()).into());
        }
        check(from)?;
        check(to)
    };

    for account in &graph.accounts {
        check(&account.push_account)?;
        check(&account.rmd_account)?;
        for activity in &account.activities {
            if activity.is_transfer {
                check_transfer(&activity.name, &activity.from, &activity.to)?;
            }
        }
        for bill in &account.bills {
            if bill.is_transfer {
                check_transfer(&bill.name, &bill.from, &bill.to)?;
            }
        }
    }
    for activity in &graph.transfers.activities {
        if activity.is_transfer {
            check_transfer(&activity.name, &activity.from, &activity.to)?;
        } else {
            check(&activity.from)?;
            check(&activity.to)?;
        }
    }
    for bill in &graph.transfers.bills {
        if bill.is_transfer {
            check_transfer(&bill.name, &bill.from, &bill.to)?;
        } else {
            check(&bill.from)?;
            check(&bill.to)?;
        }
    }
    Ok(())
}
