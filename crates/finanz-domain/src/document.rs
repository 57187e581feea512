//! The single persisted document: `{ "<year>": { "<month>": BudgetMonth } }`.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::{month::BudgetMonth, DomainError};

/// Identifies a month record by calendar year and month number (1-12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if (1..=12).contains(&month) {
            Ok(Self { year, month })
        } else {
            Err(DomainError::InvalidMonth(month))
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// All months of all years, as stored under the application's storage key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinanceDocument {
    years: BTreeMap<i32, BTreeMap<u32, BudgetMonth>>,
}

impl FinanceDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    pub fn get(&self, key: MonthKey) -> Option<&BudgetMonth> {
        self.years.get(&key.year)?.get(&key.month)
    }

    pub fn contains(&self, key: MonthKey) -> bool {
        self.get(key).is_some()
    }

    /// Stores `month` at `key`, returning whatever was there before.
    pub fn insert(&mut self, key: MonthKey, month: BudgetMonth) -> Option<BudgetMonth> {
        self.years.entry(key.year).or_default().insert(key.month, month)
    }

    /// Removes the month at `key`; a year left without months is removed too.
    pub fn remove(&mut self, key: MonthKey) -> Option<BudgetMonth> {
        let months = self.years.get_mut(&key.year)?;
        let removed = months.remove(&key.month);
        if months.is_empty() {
            self.years.remove(&key.year);
        }
        removed
    }

    pub fn has_year(&self, year: i32) -> bool {
        self.years.contains_key(&year)
    }

    /// Years holding at least one month, most recent first.
    pub fn years(&self) -> Vec<i32> {
        self.years.keys().rev().copied().collect()
    }

    /// Month numbers recorded for `year`, most recent first.
    pub fn months(&self, year: i32) -> Vec<u32> {
        self.years
            .get(&year)
            .map(|months| months.keys().rev().copied().collect())
            .unwrap_or_default()
    }

    /// Months of `year` in calendar order.
    pub fn year_months(&self, year: i32) -> impl Iterator<Item = (u32, &BudgetMonth)> {
        self.years
            .get(&year)
            .into_iter()
            .flat_map(|months| months.iter().map(|(month, data)| (*month, data)))
    }

    /// Every stored month, oldest first. Month numbers are reported as stored.
    pub fn iter(&self) -> impl Iterator<Item = (i32, u32, &BudgetMonth)> {
        self.years.iter().flat_map(|(year, months)| {
            months.iter().map(move |(month, data)| (*year, *month, data))
        })
    }

    /// Most recent valid month of the most recent year holding one.
    ///
    /// Stored month numbers outside 1-12 are skipped.
    pub fn latest(&self) -> Option<MonthKey> {
        self.years.iter().rev().find_map(|(year, months)| {
            months
                .keys()
                .rev()
                .find_map(|month| MonthKey::new(*year, *month).ok())
        })
    }
}
