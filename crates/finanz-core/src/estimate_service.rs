//! Itemized expense estimates.

use finanz_domain::{BudgetMonth, EstimateItem};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    category_service::required_description,
    conversion::{amount_or_zero, parse_amount},
    CoreError,
};

/// One row of the estimate form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateDraft {
    pub description: String,
    pub amount: String,
}

impl EstimateDraft {
    pub fn new(description: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
        }
    }

    fn to_item(&self) -> Option<EstimateItem> {
        let description = self.description.trim();
        if description.is_empty() {
            return None;
        }
        let amount = parse_amount(&self.amount).ok()?;
        Some(EstimateItem::new(description, amount))
    }
}

pub struct EstimateService;

impl EstimateService {
    /// Total shown while the form is being edited; unparseable amounts count as 0.
    pub fn running_total(drafts: &[EstimateDraft]) -> f64 {
        drafts.iter().map(|draft| amount_or_zero(&draft.amount)).sum()
    }

    /// Items kept on submit: rows with a description and a numeric amount.
    pub fn finalize(drafts: &[EstimateDraft]) -> Vec<EstimateItem> {
        let items: Vec<_> = drafts.iter().filter_map(EstimateDraft::to_item).collect();
        if items.len() != drafts.len() {
            debug!(
                dropped = drafts.len() - items.len(),
                "incomplete estimate rows discarded"
            );
        }
        items
    }

    /// Replaces the month's itemized estimate with the submitted rows.
    pub fn apply(month: &mut BudgetMonth, drafts: &[EstimateDraft]) -> f64 {
        month.set_estimate_items(Self::finalize(drafts));
        info!(
            items = month.estimate_items().len(),
            expense_est = month.expense_est(),
            "expense estimate updated"
        );
        month.expense_est()
    }

    pub fn add_item(month: &mut BudgetMonth, draft: &EstimateDraft) -> Result<f64, CoreError> {
        month.add_estimate_item(validated(draft)?);
        Ok(month.expense_est())
    }

    pub fn update_item(
        month: &mut BudgetMonth,
        index: usize,
        draft: &EstimateDraft,
    ) -> Result<f64, CoreError> {
        month.update_estimate_item(index, validated(draft)?)?;
        Ok(month.expense_est())
    }

    pub fn remove_item(month: &mut BudgetMonth, index: usize) -> Result<EstimateItem, CoreError> {
        Ok(month.remove_estimate_item(index)?)
    }

    /// Sets a plain estimate; fails while the estimate is itemized.
    pub fn set_total(month: &mut BudgetMonth, amount: &str) -> Result<(), CoreError> {
        month.set_expense_estimate(parse_amount(amount)?)?;
        Ok(())
    }
}

fn validated(draft: &EstimateDraft) -> Result<EstimateItem, CoreError> {
    let description = required_description(&draft.description)?;
    Ok(EstimateItem::new(description, parse_amount(&draft.amount)?))
}
