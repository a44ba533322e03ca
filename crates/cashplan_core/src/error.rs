use std::fmt;

/// Fatal configuration problems. Any of these aborts the whole run: every
/// downstream day depends on correct upstream balances, so there is no
/// skip-and-continue path.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A push/pull/pension/RMD target or transfer endpoint names an account
    /// that does not exist in the graph.
    AccountNotFound(String),
    /// A transfer-flagged activity or bill is missing its from or to
    /// endpoint, so it cannot be paired.
    IncompleteTransfer(String),
    /// The named simulation has no variable table.
    UnknownSimulation(String),
    /// The simulation's variable table has no entry under this key.
    UnknownVariable { simulation: String, name: String },
    /// The variable exists but holds the wrong type for the caller.
    VariableType {
        name: String,
        expected: &'static str,
    },
    /// A bill's recurrence period string is not a recognized unit.
    UnknownPeriod(String),
    /// The historical-rate table has no series under this name.
    RateSeriesNotFound(String),
    /// An RMD-flagged account's owner reached distribution age but the
    /// divisor table has no entry for that age.
    MissingRmdDivisor { age: u8 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::AccountNotFound(name) => write!(f, "account {name:?} not found"),
            ConfigError::IncompleteTransfer(name) => {
                write!(f, "transfer {name:?} is missing a from/to endpoint")
            }
            ConfigError::UnknownSimulation(name) => write!(f, "simulation {name:?} not found"),
            ConfigError::UnknownVariable { simulation, name } => {
                write!(f, "variable {name:?} not found in simulation {simulation:?}")
            }
            ConfigError::VariableType { name, expected } => {
                write!(f, "variable {name:?} is not a {expected}")
            }
            ConfigError::UnknownPeriod(period) => {
                write!(f, "unrecognized recurrence period {period:?}")
            }
            ConfigError::RateSeriesNotFound(name) => {
                write!(f, "historical rate series {name:?} not found")
            }
            ConfigError::MissingRmdDivisor { age } => {
                write!(f, "no RMD divisor for age {age}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Malformed user data that is neither a valid literal nor resolvable as a
/// variable. Fatal, like [`ConfigError`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    /// A date string that parses as neither a civil date nor a variable.
    MalformedDate(String),
    /// An amount string that parses as neither a number, a fraction token,
    /// nor a variable.
    MalformedAmount(String),
    /// A `{HALF}`/`{FULL}` entry that is not part of a two-sided transfer,
    /// so there is no source balance to resolve the fraction against.
    UnpairedFraction { id: String },
    /// A fraction transfer whose source and destination are the same
    /// account; the pair cannot resolve to a consistent amount.
    UnresolvedFraction { id: String },
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::MalformedDate(s) => write!(f, "malformed date {s:?}"),
            DataError::MalformedAmount(s) => write!(f, "malformed amount {s:?}"),
            DataError::UnpairedFraction { id } => {
                write!(f, "fraction entry {id:?} is not a two-sided transfer")
            }
            DataError::UnresolvedFraction { id } => {
                write!(f, "fraction transfer {id:?} references itself")
            }
        }
    }
}

impl std::error::Error for DataError {}

/// Umbrella error for a calculation run.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcError {
    Config(ConfigError),
    Data(DataError),
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::Config(e) => write!(f, "{e}"),
            CalcError::Data(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CalcError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CalcError::Config(e) => Some(e),
            CalcError::Data(e) => Some(e),
        }
    }
}

impl From<ConfigError> for CalcError {
    fn from(e: ConfigError) -> Self {
        CalcError::Config(e)
    }
}

impl From<DataError> for CalcError {
    fn from(e: DataError) -> Self {
        CalcError::Data(e)
    }
}

pub type Result<T> = std::result::Result<T, CalcError>;
