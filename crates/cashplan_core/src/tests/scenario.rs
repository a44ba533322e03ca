//! Tests for variable resolution and raw value parsing

use jiff::civil::date;

use crate::error::{ConfigError, DataError};
use crate::model::{AmountSpec, DateSpec, Fraction, FractionPart, PeriodUnit};
use crate::scenario::{Scenario, ScenarioSet};

fn scenarios() -> ScenarioSet {
    let mut set = ScenarioSet::new();
    set.insert(
        Scenario::new("base")
            .with_date("RETIREMENT_DATE", date(2030, 6, 1))
            .with_amount("SALARY", 5_000.0),
    );
    set
}

#[test]
fn test_resolve_date_variable() {
    let set = scenarios();
    let spec = DateSpec::Variable("RETIREMENT_DATE".to_string());
    assert_eq!(set.date("base", &spec).unwrap(), date(2030, 6, 1));
}

#[test]
fn test_resolve_amount_variable() {
    let set = scenarios();
    let spec = AmountSpec::Variable("SALARY".to_string());
    assert_eq!(
        set.amount("base", &spec).unwrap(),
        AmountSpec::Literal(5_000.0)
    );
}

#[test]
fn test_literals_bypass_the_table() {
    // Literal specs resolve without the simulation even existing.
    let set = ScenarioSet::new();
    assert_eq!(
        set.date("missing", &DateSpec::Literal(date(2025, 1, 1)))
            .unwrap(),
        date(2025, 1, 1)
    );
    assert_eq!(
        set.amount("missing", &AmountSpec::Literal(12.5)).unwrap(),
        AmountSpec::Literal(12.5)
    );
}

#[test]
fn test_unknown_simulation() {
    let set = scenarios();
    let err = set.resolve_amount("other", "SALARY").unwrap_err();
    assert_eq!(err, ConfigError::UnknownSimulation("other".to_string()));
}

#[test]
fn test_unknown_variable() {
    let set = scenarios();
    let err = set.resolve_amount("base", "BONUS").unwrap_err();
    assert_eq!(
        err,
        ConfigError::UnknownVariable {
            simulation: "base".to_string(),
            name: "BONUS".to_string(),
        }
    );
}

#[test]
fn test_variable_type_mismatch() {
    let set = scenarios();
    let err = set.resolve_date("base", "SALARY").unwrap_err();
    assert_eq!(
        err,
        ConfigError::VariableType {
            name: "SALARY".to_string(),
            expected: "date",
        }
    );
    let err = set.resolve_amount("base", "RETIREMENT_DATE").unwrap_err();
    assert_eq!(
        err,
        ConfigError::VariableType {
            name: "RETIREMENT_DATE".to_string(),
            expected: "amount",
        }
    );
}

#[test]
fn test_fraction_passes_through_resolver() {
    let set = scenarios();
    let fraction = AmountSpec::Fraction(Fraction {
        part: FractionPart::Half,
        negate: false,
    });
    assert_eq!(set.amount("base", &fraction).unwrap(), fraction);
}

#[test]
fn test_parse_date() {
    assert_eq!(
        DateSpec::parse("2025-06-15").unwrap(),
        DateSpec::Literal(date(2025, 6, 15))
    );
    assert_eq!(
        DateSpec::parse("START_DATE").unwrap(),
        DateSpec::Variable("START_DATE".to_string())
    );
    // Digit-leading but not a valid date: malformed, not a variable
    assert_eq!(
        DateSpec::parse("2025-13-40").unwrap_err(),
        DataError::MalformedDate("2025-13-40".to_string())
    );
    assert!(DateSpec::parse("").is_err());
}

#[test]
fn test_parse_amount() {
    assert_eq!(
        AmountSpec::parse("-123.45").unwrap(),
        AmountSpec::Literal(-123.45)
    );
    assert_eq!(
        AmountSpec::parse("{HALF}").unwrap(),
        AmountSpec::Fraction(Fraction {
            part: FractionPart::Half,
            negate: false,
        })
    );
    assert_eq!(
        AmountSpec::parse("-{FULL}").unwrap(),
        AmountSpec::Fraction(Fraction {
            part: FractionPart::Full,
            negate: true,
        })
    );
    assert_eq!(
        AmountSpec::parse("SALARY").unwrap(),
        AmountSpec::Variable("SALARY".to_string())
    );
    assert_eq!(
        AmountSpec::parse("12x").unwrap_err(),
        DataError::MalformedAmount("12x".to_string())
    );
}

#[test]
fn test_parse_period_unit() {
    assert_eq!("month".parse::<PeriodUnit>().unwrap(), PeriodUnit::Month);
    assert_eq!("weeks".parse::<PeriodUnit>().unwrap(), PeriodUnit::Week);
    assert_eq!(
        "fortnight".parse::<PeriodUnit>().unwrap_err(),
        ConfigError::UnknownPeriod("fortnight".to_string())
    );
}
