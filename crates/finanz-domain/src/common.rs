//! Shared traits, identifiers, and the exchange rate primitive.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::DomainError;

const LEGACY_PREFIX: &str = "legacy-";

/// Exposes a stable identifier for entities stored in a month.
pub trait Identifiable {
    fn id(&self) -> &EntryId;
}

/// Provides read-only access to an entity's user-facing label.
pub trait Described {
    fn description(&self) -> &str;
}

/// Common contract for entities carrying a local and a USD figure.
pub trait Amounted {
    fn amount_local(&self) -> f64;
    fn amount_usd(&self) -> f64;
}

/// String identifier for categories and sub-entries.
///
/// Stored data may carry millisecond timestamps as ids, so the inner value is
/// kept as an opaque string. Fresh ids are UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Id given to the sub-entry synthesized from a category's direct value.
    pub fn legacy_for(parent: &EntryId) -> Self {
        Self(format!("{LEGACY_PREFIX}{}", parent.0))
    }

    pub fn is_legacy(&self) -> bool {
        self.0.starts_with(LEGACY_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects the income or expense list of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flow {
    Income,
    Expense,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Flow::Income => "Income",
            Flow::Expense => "Expense",
        };
        f.write_str(label)
    }
}

/// Reads a stored figure, treating `null` as 0.
///
/// Older builds wrote `NaN` amounts, which JSON stores as `null`.
pub(crate) fn figure_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Local-currency units per 1 USD. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct ExchangeRate(f64);

impl ExchangeRate {
    pub fn new(value: f64) -> Result<Self, DomainError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRate(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn to_usd(self, amount_local: f64) -> f64 {
        amount_local / self.0
    }

    pub fn to_local(self, amount_usd: f64) -> f64 {
        amount_usd * self.0
    }
}

impl TryFrom<f64> for ExchangeRate {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ExchangeRate> for f64 {
    fn from(rate: ExchangeRate) -> Self {
        rate.0
    }
}

impl fmt::Display for ExchangeRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
