//! Activity expansion
//!
//! Turns each account's one-off activities and every bill's recurrence rule
//! into dated ledger rows up to the horizon, applying scheduled amount
//! increases along the way. Transfer-derived rows are emitted on both
//! endpoint ledgers as independent mirror entries (negated amount on the
//! "from" side) sharing a deterministic id; non-transfer rows get
//! sequential per-run ids so runs reproduce exactly.

use jiff::civil::Date;
use rand::Rng;

use crate::date_math::{add_days, next_anniversary_on_or_after};
use crate::error::Result;
use crate::model::{
    AccountGraph, Activity, AmountSpec, Bill, EntryAmount, EntryOrigin, Fraction, LedgerEntry,
    RateMode, RateTable, bill_entry_id,
};
use crate::scenario::ScenarioSet;

/// Expands definitions into ledger rows across the whole graph.
pub struct Expander<'a> {
    scenarios: &'a ScenarioSet,
    simulation: &'a str,
    horizon: Date,
    mode: RateMode,
    rates: &'a RateTable,
    next_entry: u32,
}

impl<'a> Expander<'a> {
    pub fn new(
        scenarios: &'a ScenarioSet,
        simulation: &'a str,
        horizon: Date,
        mode: RateMode,
        rates: &'a RateTable,
    ) -> Self {
        Self {
            scenarios,
            simulation,
            horizon,
            mode,
            rates,
            next_entry: 0,
        }
    }

    /// Populate every account's consolidated ledger from its activities and
    /// from all bills (own, counterpart-referencing, and transfers-bucket),
    /// then sort each ledger ascending by date with "Opening Balance"
    /// entries first.
    pub fn expand<R: Rng + ?Sized>(
        &mut self,
        graph: &mut AccountGraph,
        rng: &mut R,
    ) -> Result<()> {
        for account in &mut graph.accounts {
            account.ledger.clear();
            // Schedule invariant is re-established defensively before the
            // interest engine walks it.
            account
                .interests
                .sort_by_key(|interest| interest.applicable_from);
        }

        // One-off activities: own collections, then the transfers bucket.
        let activity_batches: Vec<(Option<usize>, Vec<Activity>)> = graph
            .accounts
            .iter()
            .enumerate()
            .map(|(idx, account)| (Some(idx), account.activities.clone()))
            .chain(std::iter::once((None, graph.transfers.activities.clone())))
            .collect();
        for (owner, activities) in activity_batches {
            for activity in &activities {
                self.expand_activity(graph, owner, activity)?;
            }
        }

        // Bills: a single pass over every definition, each emitting to the
        // accounts it touches.
        let bill_batches: Vec<(Option<usize>, Vec<Bill>)> = graph
            .accounts
            .iter()
            .enumerate()
            .map(|(idx, account)| (Some(idx), account.bills.clone()))
            .chain(std::iter::once((None, graph.transfers.bills.clone())))
            .collect();
        for (owner, bills) in bill_batches {
            for bill in &bills {
                self.expand_bill(graph, owner, bill, rng)?;
            }
        }

        for account in &mut graph.accounts {
            sort_ledger(&mut account.ledger);
        }
        Ok(())
    }

    fn fresh_id(&mut self) -> String {
        self.next_entry += 1;
        format!("E{}", self.next_entry)
    }

    fn expand_activity(
        &mut self,
        graph: &mut AccountGraph,
        owner: Option<usize>,
        activity: &Activity,
    ) -> Result<()> {
        let date = self.scenarios.date(self.simulation, &activity.date)?;
        let amount = self.scenarios.amount(self.simulation, &activity.amount)?;
        let id = self.fresh_id();

        let mut entry = LedgerEntry::new(
            id,
            activity.name.clone(),
            activity.category.clone(),
            date,
            to_entry_amount(&amount),
            EntryOrigin::User,
        );
        if let Some(flag) = activity.flag {
            entry = entry.with_flag(flag);
        }

        if activity.is_transfer
            && let (Some(from), Some(to)) = (&activity.from, &activity.to)
            && let (Some(from_idx), Some(to_idx)) =
                (graph.account_index(from), graph.account_index(to))
        {
            let entry = entry.with_transfer(from.clone(), to.clone());
            let mut mirror = entry.clone();
            mirror.amount = negate(mirror.amount);
            graph.accounts[to_idx].ledger.push(entry);
            graph.accounts[from_idx].ledger.push(mirror);
            return Ok(());
        }

        if let Some(idx) = owner {
            graph.accounts[idx].ledger.push(entry);
        }
        Ok(())
    }

    fn expand_bill<R: Rng + ?Sized>(
        &mut self,
        graph: &mut AccountGraph,
        owner: Option<usize>,
        bill: &Bill,
        rng: &mut R,
    ) -> Result<()> {
        let start = self.scenarios.date(self.simulation, &bill.start)?;
        // An explicit end date is inclusive; the horizon is exclusive.
        let explicit_end = match &bill.end {
            Some(spec) => Some(self.scenarios.date(self.simulation, spec)?),
            None => None,
        };
        let base = self.scenarios.amount(self.simulation, &bill.amount)?;

        // Fraction-amount bills cannot be increased; they resolve at
        // settlement time.
        let mut literal = match &base {
            AmountSpec::Literal(v) => Some(*v),
            _ => None,
        };

        let mut next_increase = bill
            .increase
            .as_ref()
            .map(|inc| next_anniversary_on_or_after(start, inc.month, inc.day));

        let mut date = start;
        let mut first = true;
        while date < self.horizon && explicit_end.is_none_or(|end| date <= end) {
            if let Some(inc) = &bill.increase
                && let Some(amount) = literal.as_mut()
            {
                // A multi-year period can cross several anniversaries at once.
                while let Some(due) = next_increase
                    && date >= due
                {
                    let rate = match (self.mode, &inc.rate_source) {
                        (RateMode::MonteCarlo, Some(source)) => self
                            .rates
                            .get(source)
                            .and_then(|series| series.sample(rng))
                            .unwrap_or(inc.rate),
                        _ => inc.rate,
                    };
                    *amount *= 1.0 + rate;
                    if let Some(ceiling) = inc.ceiling
                        && ceiling > 0.0
                    {
                        *amount = (*amount / ceiling).ceil() * ceiling;
                    }
                    next_increase = Some(next_anniversary_on_or_after(
                        add_days(due, 1),
                        inc.month,
                        inc.day,
                    ));
                }
            }

            let amount = match literal {
                Some(v) => AmountSpec::Literal(v),
                None => base.clone(),
            };
            self.emit_bill_row(graph, owner, bill, date, &amount, first);
            first = false;
            date = bill.unit.step(date, bill.every_n);
        }
        Ok(())
    }

    fn emit_bill_row(
        &mut self,
        graph: &mut AccountGraph,
        owner: Option<usize>,
        bill: &Bill,
        date: Date,
        amount: &AmountSpec,
        first: bool,
    ) {
        let origin = EntryOrigin::Bill {
            bill_id: bill.bill_id,
            first,
        };

        if bill.is_transfer
            && let (Some(from), Some(to)) = (&bill.from, &bill.to)
            && let (Some(from_idx), Some(to_idx)) =
                (graph.account_index(from), graph.account_index(to))
        {
            let id = bill_entry_id(bill.bill_id, date);
            let entry = LedgerEntry::new(
                id,
                bill.name.clone(),
                bill.category.clone(),
                date,
                to_entry_amount(amount),
                origin,
            )
            .with_transfer(from.clone(), to.clone());
            let mut mirror = entry.clone();
            mirror.amount = negate(mirror.amount);
            graph.accounts[to_idx].ledger.push(entry);
            graph.accounts[from_idx].ledger.push(mirror);
            return;
        }

        if let Some(idx) = owner {
            let id = self.fresh_id();
            let entry = LedgerEntry::new(
                id,
                bill.name.clone(),
                bill.category.clone(),
                date,
                to_entry_amount(amount),
                origin,
            );
            graph.accounts[idx].ledger.push(entry);
        }
    }
}

fn to_entry_amount(spec: &AmountSpec) -> EntryAmount {
    match spec {
        AmountSpec::Literal(v) => EntryAmount::Resolved(*v),
        AmountSpec::Fraction(f) => EntryAmount::Fraction(*f),
        // Variables were resolved by the scenario layer before this point.
        AmountSpec::Variable(_) => EntryAmount::Resolved(0.0),
    }
}

fn negate(amount: EntryAmount) -> EntryAmount {
    match amount {
        EntryAmount::Resolved(v) => EntryAmount::Resolved(-v),
        EntryAmount::Fraction(Fraction { part, negate }) => {
            EntryAmount::Fraction(Fraction {
                part,
                negate: !negate,
            })
        }
    }
}

/// Ascending by date, except entries literally named "Opening Balance" sort
/// first regardless of date. Stable, so equal keys keep insertion order.
pub fn sort_ledger(ledger: &mut [LedgerEntry]) {
    ledger.sort_by_key(|entry| (entry.name != "Opening Balance", entry.date));
}
