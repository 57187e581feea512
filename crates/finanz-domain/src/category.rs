//! Income and expense buckets, optionally itemized into sub-entries.

use serde::{Deserialize, Serialize};

use crate::{common::*, entry::SubEntry, DomainError};

/// Where a category's figures come from.
///
/// `Simple` categories store their value directly. `Itemized` categories derive
/// both totals from their sub-entries, so the totals cannot drift from the sum.
#[derive(Debug, Clone, PartialEq)]
pub enum CategoryAmounts {
    Simple { amount_local: f64, amount_usd: f64 },
    Itemized { entries: Vec<SubEntry> },
}

/// Result of a replace-or-append by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// A named bucket of real money movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CategoryRecord", into = "CategoryRecord")]
pub struct TransactionCategory {
    pub id: EntryId,
    pub description: String,
    pub date: Option<String>,
    amounts: CategoryAmounts,
}

impl TransactionCategory {
    /// Creates a simple category with a fresh id, deriving USD from `rate`.
    pub fn simple(
        description: impl Into<String>,
        amount_local: f64,
        rate: ExchangeRate,
        date: Option<String>,
    ) -> Self {
        Self {
            id: EntryId::generate(),
            description: description.into(),
            date,
            amounts: CategoryAmounts::Simple {
                amount_local,
                amount_usd: rate.to_usd(amount_local),
            },
        }
    }

    /// Rebuilds a simple category from figures the caller already made consistent.
    pub fn from_parts(
        id: EntryId,
        description: impl Into<String>,
        amount_local: f64,
        amount_usd: f64,
        date: Option<String>,
    ) -> Self {
        Self {
            id,
            description: description.into(),
            date,
            amounts: CategoryAmounts::Simple {
                amount_local,
                amount_usd,
            },
        }
    }

    /// Opens an itemized category whose first movement is `first`.
    pub fn itemized(description: impl Into<String>, first: SubEntry) -> Self {
        let date = Some(first.date.clone()).filter(|d| !d.is_empty());
        Self {
            id: EntryId::generate(),
            description: description.into(),
            date,
            amounts: CategoryAmounts::Itemized {
                entries: vec![first],
            },
        }
    }

    pub fn amounts(&self) -> &CategoryAmounts {
        &self.amounts
    }

    pub fn is_itemized(&self) -> bool {
        matches!(self.amounts, CategoryAmounts::Itemized { .. })
    }

    pub fn sub_entries(&self) -> Option<&[SubEntry]> {
        match &self.amounts {
            CategoryAmounts::Itemized { entries } => Some(entries),
            CategoryAmounts::Simple { .. } => None,
        }
    }

    pub fn entry(&self, id: &EntryId) -> Option<&SubEntry> {
        self.sub_entries()?.iter().find(|entry| &entry.id == id)
    }

    pub fn rename(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Sets the direct value of a simple category, deriving USD from `rate`.
    pub fn set_simple_amount(
        &mut self,
        amount_local: f64,
        rate: ExchangeRate,
    ) -> Result<(), DomainError> {
        match &mut self.amounts {
            CategoryAmounts::Simple {
                amount_local: local,
                amount_usd,
            } => {
                *local = amount_local;
                *amount_usd = rate.to_usd(amount_local);
                Ok(())
            }
            CategoryAmounts::Itemized { .. } => Err(DomainError::ItemizedCategory(self.id.clone())),
        }
    }

    /// Inserts `entry`, or replaces the sub-entry with the same id.
    ///
    /// A simple category is first converted to an itemized one holding a
    /// `legacy-<id>` sub-entry with its previous value, so no total is lost.
    pub fn upsert_entry(&mut self, entry: SubEntry) -> Upsert {
        let mut entries = self.take_entries();
        let outcome = match entries.iter_mut().find(|existing| existing.id == entry.id) {
            Some(existing) => {
                *existing = entry;
                Upsert::Replaced
            }
            None => {
                entries.push(entry);
                Upsert::Inserted
            }
        };
        self.amounts = CategoryAmounts::Itemized { entries };
        outcome
    }

    /// Removes a sub-entry and returns how many remain.
    pub fn remove_entry(&mut self, entry_id: &EntryId) -> Result<usize, DomainError> {
        let missing = || DomainError::EntryNotFound {
            category: self.id.clone(),
            entry: entry_id.clone(),
        };
        let CategoryAmounts::Itemized { entries } = &mut self.amounts else {
            return Err(missing());
        };
        let before = entries.len();
        entries.retain(|entry| &entry.id != entry_id);
        if entries.len() == before {
            return Err(missing());
        }
        Ok(entries.len())
    }

    /// Re-derives every USD figure from its local amount under `rate`.
    pub fn reprice(&mut self, rate: ExchangeRate) {
        match &mut self.amounts {
            CategoryAmounts::Simple {
                amount_local,
                amount_usd,
            } => *amount_usd = rate.to_usd(*amount_local),
            CategoryAmounts::Itemized { entries } => {
                entries.iter_mut().for_each(|entry| entry.reprice(rate));
            }
        }
    }

    fn take_entries(&mut self) -> Vec<SubEntry> {
        let empty = CategoryAmounts::Itemized {
            entries: Vec::new(),
        };
        match std::mem::replace(&mut self.amounts, empty) {
            CategoryAmounts::Itemized { entries } => entries,
            CategoryAmounts::Simple {
                amount_local,
                amount_usd,
            } => vec![SubEntry::from_parts(
                EntryId::legacy_for(&self.id),
                self.description.clone(),
                amount_local,
                amount_usd,
                self.date.clone().unwrap_or_default(),
            )],
        }
    }
}

impl Identifiable for TransactionCategory {
    fn id(&self) -> &EntryId {
        &self.id
    }
}

impl Described for TransactionCategory {
    fn description(&self) -> &str {
        &self.description
    }
}

impl Amounted for TransactionCategory {
    fn amount_local(&self) -> f64 {
        match &self.amounts {
            CategoryAmounts::Simple { amount_local, .. } => *amount_local,
            CategoryAmounts::Itemized { entries } => entries.iter().map(|e| e.amount_local).sum(),
        }
    }

    fn amount_usd(&self) -> f64 {
        match &self.amounts {
            CategoryAmounts::Simple { amount_usd, .. } => *amount_usd,
            CategoryAmounts::Itemized { entries } => entries.iter().map(|e| e.amount_usd).sum(),
        }
    }
}

/// Flat on-disk shape: totals are always written, `subEntries` only when itemized.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CategoryRecord {
    id: EntryId,
    #[serde(default)]
    description: String,
    #[serde(default, deserialize_with = "figure_or_zero")]
    amount_local: f64,
    #[serde(rename = "amountUSD", default, deserialize_with = "figure_or_zero")]
    amount_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sub_entries: Option<Vec<SubEntry>>,
}

impl From<CategoryRecord> for TransactionCategory {
    fn from(record: CategoryRecord) -> Self {
        let amounts = match record.sub_entries {
            Some(entries) => CategoryAmounts::Itemized { entries },
            None => CategoryAmounts::Simple {
                amount_local: record.amount_local,
                amount_usd: record.amount_usd,
            },
        };
        Self {
            id: record.id,
            description: record.description,
            date: record.date,
            amounts,
        }
    }
}

impl From<TransactionCategory> for CategoryRecord {
    fn from(category: TransactionCategory) -> Self {
        let amount_local = category.amount_local();
        let amount_usd = category.amount_usd();
        let sub_entries = match category.amounts {
            CategoryAmounts::Itemized { entries } => Some(entries),
            CategoryAmounts::Simple { .. } => None,
        };
        Self {
            id: category.id,
            description: category.description,
            amount_local,
            amount_usd,
            date: category.date,
            sub_entries,
        }
    }
}
