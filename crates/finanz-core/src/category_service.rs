use finanz_domain::{Amounted, BudgetMonth, DomainError, EntryId, Flow, TransactionCategory, Upsert};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{conversion::add_delta, time::parse_entry_date, CoreError};

/// Form input for a category that stores its value directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub description: String,
    pub amount_local: f64,
    #[serde(default)]
    pub date: Option<String>,
}

/// Top-level category maintenance within a loaded month.
pub struct CategoryService;

impl CategoryService {
    /// Creates a simple category with its USD figure derived from the month rate.
    pub fn add_simple(
        month: &mut BudgetMonth,
        flow: Flow,
        draft: CategoryDraft,
    ) -> Result<EntryId, CoreError> {
        let description = required_description(&draft.description)?;
        finite_amount(draft.amount_local)?;
        let date = draft.date.as_deref().map(parse_entry_date).transpose()?;
        let category =
            TransactionCategory::simple(description, draft.amount_local, month.rate(), date);
        let id = category.id.clone();
        month.upsert_category(flow, category);
        info!(%flow, category = %id, "category added");
        Ok(id)
    }

    /// Edits a simple category from the form: description, local amount and
    /// date. USD is re-derived from the month rate.
    pub fn update_simple(
        month: &mut BudgetMonth,
        flow: Flow,
        id: &EntryId,
        draft: CategoryDraft,
    ) -> Result<(), CoreError> {
        let description = required_description(&draft.description)?;
        let amount_local = finite_amount(draft.amount_local)?;
        let date = draft.date.as_deref().map(parse_entry_date).transpose()?;
        let mut category = Self::existing(month, flow, id)?;
        category.set_simple_amount(amount_local, month.rate())?;
        category.rename(description);
        if date.is_some() {
            category.date = date;
        }
        month.upsert_category(flow, category);
        info!(%flow, category = %id, "category updated");
        Ok(())
    }

    /// "Sum to add": raises a simple category's local amount by `addition`.
    pub fn add_to_simple(
        month: &mut BudgetMonth,
        flow: Flow,
        id: &EntryId,
        addition: f64,
    ) -> Result<f64, CoreError> {
        let addition = finite_amount(addition)?;
        let mut category = Self::existing(month, flow, id)?;
        let total = finite_amount(add_delta(category.amount_local(), addition))?;
        category.set_simple_amount(total, month.rate())?;
        month.upsert_category(flow, category);
        info!(%flow, category = %id, total, "amount added to category");
        Ok(total)
    }

    /// Replace-or-append by id. The caller supplies consistent figures.
    pub fn upsert(month: &mut BudgetMonth, flow: Flow, category: TransactionCategory) -> Upsert {
        let id = category.id.clone();
        let outcome = month.upsert_category(flow, category);
        info!(%flow, category = %id, ?outcome, "category stored");
        outcome
    }

    pub fn rename(
        month: &mut BudgetMonth,
        flow: Flow,
        id: &EntryId,
        description: &str,
    ) -> Result<(), CoreError> {
        let description = required_description(description)?;
        month.rename_category(flow, id, description)?;
        Ok(())
    }

    /// Removes a category together with every sub-entry it holds.
    pub fn remove(
        month: &mut BudgetMonth,
        flow: Flow,
        id: &EntryId,
    ) -> Result<TransactionCategory, CoreError> {
        let removed = month.remove_category(flow, id)?;
        info!(%flow, category = %id, "category removed");
        Ok(removed)
    }

    fn existing(
        month: &BudgetMonth,
        flow: Flow,
        id: &EntryId,
    ) -> Result<TransactionCategory, CoreError> {
        month.category(flow, id).cloned().ok_or_else(|| {
            DomainError::CategoryNotFound {
                flow,
                id: id.clone(),
            }
            .into()
        })
    }
}

fn finite_amount(amount: f64) -> Result<f64, CoreError> {
    if amount.is_finite() {
        Ok(amount)
    } else {
        Err(CoreError::Validation("amount must be a number".into()))
    }
}

pub(crate) fn required_description(input: &str) -> Result<String, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("description is required".into()));
    }
    Ok(trimmed.to_string())
}
