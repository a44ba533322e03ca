//! Named simulations and their variable tables
//!
//! A variable is a simulation-scoped placeholder resolved to a literal date
//! or amount at calculation time. Resolution is a pure lookup, performed
//! afresh on every call; callers may mutate resolution context between
//! calls within one run, so nothing is cached here. The fraction tokens
//! (`{HALF}` etc.) never reach the resolver; `AmountSpec::parse` consumes
//! them first.

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{AmountSpec, DateSpec};

/// A typed variable value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VariableValue {
    Date(Date),
    Amount(f64),
}

/// One named simulation's variable table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub variables: FxHashMap<String, VariableValue>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: FxHashMap::default(),
        }
    }

    pub fn with_date(mut self, name: impl Into<String>, date: Date) -> Self {
        self.variables.insert(name.into(), VariableValue::Date(date));
        self
    }

    pub fn with_amount(mut self, name: impl Into<String>, amount: f64) -> Self {
        self.variables
            .insert(name.into(), VariableValue::Amount(amount));
        self
    }
}

/// All named simulations available to a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: FxHashMap<String, Scenario>,
}

impl ScenarioSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scenario: Scenario) {
        self.scenarios.insert(scenario.name.clone(), scenario);
    }

    fn lookup(&self, simulation: &str, name: &str) -> Result<VariableValue, ConfigError> {
        let scenario = self
            .scenarios
            .get(simulation)
            .ok_or_else(|| ConfigError::UnknownSimulation(simulation.to_string()))?;
        scenario
            .variables
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::UnknownVariable {
                simulation: simulation.to_string(),
                name: name.to_string(),
            })
    }

    /// Resolve a date variable.
    pub fn resolve_date(&self, simulation: &str, name: &str) -> Result<Date, ConfigError> {
        match self.lookup(simulation, name)? {
            VariableValue::Date(d) => Ok(d),
            VariableValue::Amount(_) => Err(ConfigError::VariableType {
                name: name.to_string(),
                expected: "date",
            }),
        }
    }

    /// Resolve an amount variable.
    pub fn resolve_amount(&self, simulation: &str, name: &str) -> Result<f64, ConfigError> {
        match self.lookup(simulation, name)? {
            VariableValue::Amount(v) => Ok(v),
            VariableValue::Date(_) => Err(ConfigError::VariableType {
                name: name.to_string(),
                expected: "amount",
            }),
        }
    }

    /// Resolve a `DateSpec` to a concrete date.
    pub fn date(&self, simulation: &str, spec: &DateSpec) -> Result<Date, ConfigError> {
        match spec {
            DateSpec::Literal(d) => Ok(*d),
            DateSpec::Variable(name) => self.resolve_date(simulation, name),
        }
    }

    /// Resolve an `AmountSpec` to a concrete amount where possible.
    /// Fractions pass through unresolved; they settle against the transfer
    /// source's balance during the day loop.
    pub fn amount(&self, simulation: &str, spec: &AmountSpec) -> Result<AmountSpec, ConfigError> {
        match spec {
            AmountSpec::Literal(v) => Ok(AmountSpec::Literal(*v)),
            AmountSpec::Variable(name) => self
                .resolve_amount(simulation, name)
                .map(AmountSpec::Literal),
            AmountSpec::Fraction(f) => Ok(AmountSpec::Fraction(*f)),
        }
    }
}
