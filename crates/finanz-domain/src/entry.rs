//! Single recorded money movements inside a category.

use serde::{Deserialize, Serialize};

use crate::common::*;

/// One dated, described movement within a [`crate::TransactionCategory`].
///
/// `amount_usd` equals `amount_local / rate` at the time of the last write;
/// [`SubEntry::reprice`] re-establishes it after a rate change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubEntry {
    pub id: EntryId,
    #[serde(default)]
    pub description: String,
    #[serde(deserialize_with = "figure_or_zero")]
    pub amount_local: f64,
    #[serde(rename = "amountUSD", deserialize_with = "figure_or_zero")]
    pub amount_usd: f64,
    /// ISO `YYYY-MM-DD`. Synthesized legacy entries may carry none, and then
    /// the field is left out of the stored record.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,
}

impl SubEntry {
    /// Creates an entry with a fresh id, deriving the USD figure from `rate`.
    pub fn new(
        description: impl Into<String>,
        amount_local: f64,
        rate: ExchangeRate,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            description: description.into(),
            amount_local,
            amount_usd: rate.to_usd(amount_local),
            date: date.into(),
        }
    }

    /// Rebuilds an entry from caller-supplied figures, keeping its id.
    pub fn from_parts(
        id: EntryId,
        description: impl Into<String>,
        amount_local: f64,
        amount_usd: f64,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            amount_local,
            amount_usd,
            date: date.into(),
        }
    }

    /// Recomputes the USD figure from the untouched local amount.
    pub fn reprice(&mut self, rate: ExchangeRate) {
        self.amount_usd = rate.to_usd(self.amount_local);
    }
}

impl Identifiable for SubEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }
}

impl Described for SubEntry {
    fn description(&self) -> &str {
        &self.description
    }
}

impl Amounted for SubEntry {
    fn amount_local(&self) -> f64 {
        self.amount_local
    }

    fn amount_usd(&self) -> f64 {
        self.amount_usd
    }
}
