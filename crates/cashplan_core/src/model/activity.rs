//! One-off transactions and the literal/variable/fraction value specs
//!
//! Dates and amounts in user data are either literals or named scenario
//! variables; amounts may additionally be the special fraction tokens
//! (`{HALF}`, `{FULL}`, and negated forms) that resolve at simulation time
//! against the transfer's source-account balance. Each is a tagged variant
//! rather than an overloaded string.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Half or all of the referenced amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FractionPart {
    Half,
    Full,
}

impl FractionPart {
    #[must_use]
    pub fn factor(self) -> f64 {
        match self {
            FractionPart::Half => 0.5,
            FractionPart::Full => 1.0,
        }
    }
}

/// A fractional amount token: this much of the transfer's source-account
/// balance, resolved at settlement time. A negated token reverses the
/// transfer direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub part: FractionPart,
    pub negate: bool,
}

/// A date that is either a literal or resolved from a scenario variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DateSpec {
    Literal(jiff::civil::Date),
    Variable(String),
}

impl DateSpec {
    /// Parse a raw date string: civil date literal first, otherwise a
    /// variable name. A string that looks like a date but fails to parse as
    /// one is malformed data, not a variable.
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        match raw.parse::<jiff::civil::Date>() {
            Ok(d) => Ok(DateSpec::Literal(d)),
            Err(_) => {
                if raw.is_empty() || raw.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    Err(DataError::MalformedDate(raw.to_string()))
                } else {
                    Ok(DateSpec::Variable(raw.to_string()))
                }
            }
        }
    }
}

/// An amount that is a literal, a scenario variable, or a fraction token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AmountSpec {
    Literal(f64),
    Variable(String),
    Fraction(Fraction),
}

impl AmountSpec {
    /// Parse a raw amount string. Fraction tokens are recognized before any
    /// variable lookup so they pass through the resolver untouched.
    pub fn parse(raw: &str) -> Result<Self, DataError> {
        let fraction = |part, negate| AmountSpec::Fraction(Fraction { part, negate });
        match raw {
            "{HALF}" => return Ok(fraction(FractionPart::Half, false)),
            "{FULL}" => return Ok(fraction(FractionPart::Full, false)),
            "-{HALF}" => return Ok(fraction(FractionPart::Half, true)),
            "-{FULL}" => return Ok(fraction(FractionPart::Full, true)),
            _ => {}
        }
        match raw.parse::<f64>() {
            Ok(v) => Ok(AmountSpec::Literal(v)),
            Err(_) => {
                if raw.is_empty() || raw.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                    Err(DataError::MalformedAmount(raw.to_string()))
                } else {
                    Ok(AmountSpec::Variable(raw.to_string()))
                }
            }
        }
    }
}

/// Healthcare cost annotations consumed by an external healthcare module;
/// carried through untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthcareFlags {
    pub is_copay: bool,
    pub is_coinsurance: bool,
    pub counts_toward_deductible: bool,
}

/// A one-off transaction belonging to an account (or to the transfers
/// bucket when its transfer flag is set but it is not anchored to a real
/// source account).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    pub category: String,
    pub date: DateSpec,
    pub amount: AmountSpec,
    pub is_transfer: bool,
    /// Source account name when `is_transfer`
    pub from: Option<String>,
    /// Destination account name when `is_transfer`
    pub to: Option<String>,
    /// UI flag annotation
    pub flag: Option<super::entry::FlagColor>,
    pub healthcare: Option<HealthcareFlags>,
}
