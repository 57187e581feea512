//! The per-(year, month) budget aggregate.

use serde::{Deserialize, Serialize};

use crate::{
    category::{TransactionCategory, Upsert},
    common::*,
    currency::Currency,
    entry::SubEntry,
    DomainError,
};

/// One itemized line of the estimated expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateItem {
    pub description: String,
    #[serde(default, deserialize_with = "figure_or_zero")]
    pub amount: f64,
}

impl EstimateItem {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

/// What happened to the parent category when a sub-entry was removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRemoval {
    CategoryKept { remaining: usize },
    CategoryRemoved,
}

/// Root budget record for one month.
///
/// The rate, the expense estimate, and both category lists are only reachable
/// through methods that keep USD figures and totals consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MonthRecord", into = "MonthRecord")]
pub struct BudgetMonth {
    pub currency: Currency,
    pub income_est: f64,
    rate: ExchangeRate,
    expense_est: f64,
    expense_est_items: Vec<EstimateItem>,
    incomes: Vec<TransactionCategory>,
    expenses: Vec<TransactionCategory>,
}

impl BudgetMonth {
    pub fn new(
        currency: Currency,
        rate: ExchangeRate,
        income_est: f64,
        expense_est: f64,
        expense_est_items: Vec<EstimateItem>,
    ) -> Self {
        let mut month = Self {
            currency,
            income_est,
            rate,
            expense_est,
            expense_est_items,
            incomes: Vec::new(),
            expenses: Vec::new(),
        };
        month.refresh_expense_estimate();
        month
    }

    pub fn rate(&self) -> ExchangeRate {
        self.rate
    }

    pub fn expense_est(&self) -> f64 {
        self.expense_est
    }

    pub fn estimate_items(&self) -> &[EstimateItem] {
        &self.expense_est_items
    }

    pub fn incomes(&self) -> &[TransactionCategory] {
        &self.incomes
    }

    pub fn expenses(&self) -> &[TransactionCategory] {
        &self.expenses
    }

    pub fn categories(&self, flow: Flow) -> &[TransactionCategory] {
        match flow {
            Flow::Income => &self.incomes,
            Flow::Expense => &self.expenses,
        }
    }

    pub fn category(&self, flow: Flow, id: &EntryId) -> Option<&TransactionCategory> {
        self.categories(flow).iter().find(|category| &category.id == id)
    }

    /// Switches the month to `rate` and re-derives every USD figure.
    ///
    /// Local amounts are never altered. This is the only way to change the rate.
    pub fn apply_rate(&mut self, rate: ExchangeRate) {
        self.rate = rate;
        self.incomes
            .iter_mut()
            .chain(self.expenses.iter_mut())
            .for_each(|category| category.reprice(rate));
    }

    /// Replaces the category with the same id, or appends it.
    pub fn upsert_category(&mut self, flow: Flow, category: TransactionCategory) -> Upsert {
        let list = self.list_mut(flow);
        match list.iter_mut().find(|existing| existing.id == category.id) {
            Some(existing) => {
                *existing = category;
                Upsert::Replaced
            }
            None => {
                list.push(category);
                Upsert::Inserted
            }
        }
    }

    pub fn rename_category(
        &mut self,
        flow: Flow,
        id: &EntryId,
        description: impl Into<String>,
    ) -> Result<(), DomainError> {
        self.category_mut(flow, id)?.rename(description);
        Ok(())
    }

    /// Removes a whole category together with all of its sub-entries.
    pub fn remove_category(
        &mut self,
        flow: Flow,
        id: &EntryId,
    ) -> Result<TransactionCategory, DomainError> {
        let list = self.list_mut(flow);
        let index = list
            .iter()
            .position(|category| &category.id == id)
            .ok_or_else(|| DomainError::CategoryNotFound {
                flow,
                id: id.clone(),
            })?;
        Ok(list.remove(index))
    }

    /// Adds or replaces a sub-entry inside an existing category.
    pub fn upsert_entry(
        &mut self,
        flow: Flow,
        category_id: &EntryId,
        entry: SubEntry,
    ) -> Result<Upsert, DomainError> {
        Ok(self.category_mut(flow, category_id)?.upsert_entry(entry))
    }

    /// Removes a sub-entry; a category left without entries is removed too.
    pub fn remove_entry(
        &mut self,
        flow: Flow,
        category_id: &EntryId,
        entry_id: &EntryId,
    ) -> Result<EntryRemoval, DomainError> {
        let remaining = self.category_mut(flow, category_id)?.remove_entry(entry_id)?;
        if remaining == 0 {
            self.list_mut(flow)
                .retain(|category| &category.id != category_id);
            Ok(EntryRemoval::CategoryRemoved)
        } else {
            Ok(EntryRemoval::CategoryKept { remaining })
        }
    }

    /// Sets the expense estimate of a month that has no itemized estimate.
    pub fn set_expense_estimate(&mut self, value: f64) -> Result<(), DomainError> {
        if !self.expense_est_items.is_empty() {
            return Err(DomainError::ItemizedEstimate);
        }
        self.expense_est = value;
        Ok(())
    }

    /// Replaces the itemized estimate; `expense_est` becomes their sum.
    ///
    /// Clearing the items leaves the last total in place as a plain estimate.
    pub fn set_estimate_items(&mut self, items: Vec<EstimateItem>) {
        self.expense_est_items = items;
        self.refresh_expense_estimate();
    }

    pub fn add_estimate_item(&mut self, item: EstimateItem) {
        self.expense_est_items.push(item);
        self.refresh_expense_estimate();
    }

    pub fn update_estimate_item(
        &mut self,
        index: usize,
        item: EstimateItem,
    ) -> Result<(), DomainError> {
        let slot = self
            .expense_est_items
            .get_mut(index)
            .ok_or(DomainError::EstimateItemNotFound(index))?;
        *slot = item;
        self.refresh_expense_estimate();
        Ok(())
    }

    pub fn remove_estimate_item(&mut self, index: usize) -> Result<EstimateItem, DomainError> {
        if index >= self.expense_est_items.len() {
            return Err(DomainError::EstimateItemNotFound(index));
        }
        let removed = self.expense_est_items.remove(index);
        self.refresh_expense_estimate();
        Ok(removed)
    }

    pub fn total_income_usd(&self) -> f64 {
        self.incomes.iter().map(Amounted::amount_usd).sum()
    }

    pub fn total_expense_usd(&self) -> f64 {
        self.expenses.iter().map(Amounted::amount_usd).sum()
    }

    pub fn total_income_local(&self) -> f64 {
        self.incomes.iter().map(Amounted::amount_local).sum()
    }

    pub fn total_expense_local(&self) -> f64 {
        self.expenses.iter().map(Amounted::amount_local).sum()
    }

    pub fn balance_usd(&self) -> f64 {
        self.total_income_usd() - self.total_expense_usd()
    }

    fn refresh_expense_estimate(&mut self) {
        if !self.expense_est_items.is_empty() {
            self.expense_est = self.expense_est_items.iter().map(|item| item.amount).sum();
        }
    }

    fn list_mut(&mut self, flow: Flow) -> &mut Vec<TransactionCategory> {
        match flow {
            Flow::Income => &mut self.incomes,
            Flow::Expense => &mut self.expenses,
        }
    }

    fn category_mut(
        &mut self,
        flow: Flow,
        id: &EntryId,
    ) -> Result<&mut TransactionCategory, DomainError> {
        self.list_mut(flow)
            .iter_mut()
            .find(|category| &category.id == id)
            .ok_or_else(|| DomainError::CategoryNotFound {
                flow,
                id: id.clone(),
            })
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthRecord {
    currency: Currency,
    rate: ExchangeRate,
    #[serde(default, deserialize_with = "figure_or_zero")]
    income_est: f64,
    #[serde(default, deserialize_with = "figure_or_zero")]
    expense_est: f64,
    #[serde(default)]
    expense_est_items: Vec<EstimateItem>,
    #[serde(default)]
    incomes: Vec<TransactionCategory>,
    #[serde(default)]
    expenses: Vec<TransactionCategory>,
}

impl From<MonthRecord> for BudgetMonth {
    fn from(record: MonthRecord) -> Self {
        let mut month = Self::new(
            record.currency,
            record.rate,
            record.income_est,
            record.expense_est,
            record.expense_est_items,
        );
        month.incomes = record.incomes;
        month.expenses = record.expenses;
        month
    }
}

impl From<BudgetMonth> for MonthRecord {
    fn from(month: BudgetMonth) -> Self {
        Self {
            currency: month.currency,
            rate: month.rate,
            income_est: month.income_est,
            expense_est: month.expense_est,
            expense_est_items: month.expense_est_items,
            incomes: month.incomes,
            expenses: month.expenses,
        }
    }
}
