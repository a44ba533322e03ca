//! Unique identifiers for graph entities
//!
//! Each entity type has its own ID type to provide type safety and prevent
//! mixing up different kinds of identifiers. User data references accounts
//! by name; names are resolved to `AccountId` once at state construction.

use serde::{Deserialize, Serialize};

/// Unique identifier for an Account within an account graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u16);

/// Unique identifier for a Bill definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BillId(pub u16);

/// Unique identifier for an Interest rate-change record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InterestId(pub u16);
