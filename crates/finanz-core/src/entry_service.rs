//! Sub-entry maintenance: the add/update/remove paths of the recalculation engine.

use finanz_domain::{
    BudgetMonth, DomainError, EntryId, EntryRemoval, ExchangeRate, Flow, SubEntry,
    TransactionCategory,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    category_service::required_description,
    time::{parse_entry_date, today_iso},
    CoreError,
};

/// Form input for one movement.
///
/// At least one amount is required. The local amount wins when both are
/// given, so the stored USD figure always matches the month rate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDraft {
    pub description: String,
    #[serde(default)]
    pub amount_local: Option<f64>,
    #[serde(default, rename = "amountUSD")]
    pub amount_usd: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

impl EntryDraft {
    pub fn local(description: impl Into<String>, amount_local: f64, date: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount_local: Some(amount_local),
            amount_usd: None,
            date: Some(date.into()),
        }
    }

    pub fn usd(description: impl Into<String>, amount_usd: f64, date: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            amount_local: None,
            amount_usd: Some(amount_usd),
            date: Some(date.into()),
        }
    }

    fn into_entry(self, id: EntryId, rate: ExchangeRate) -> Result<SubEntry, CoreError> {
        let description = required_description(&self.description)?;
        let amount_local = match (self.amount_local, self.amount_usd) {
            (Some(local), _) => finite(local)?,
            (None, Some(usd)) => rate.to_local(finite(usd)?),
            (None, None) => return Err(CoreError::Validation("an amount is required".into())),
        };
        let date = match self.date.as_deref() {
            Some(date) => parse_entry_date(date)?,
            None => today_iso(),
        };
        Ok(SubEntry::from_parts(
            id,
            description,
            amount_local,
            rate.to_usd(amount_local),
            date,
        ))
    }
}

fn finite(value: f64) -> Result<f64, CoreError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CoreError::Validation("amount must be a number".into()))
    }
}

/// Where a newly added sub-entry ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPlacement {
    pub category_id: EntryId,
    pub entry_id: EntryId,
    pub new_category: bool,
}

pub struct EntryService;

impl EntryService {
    /// Records a movement.
    ///
    /// With `category` set the entry joins that category, itemizing it first if
    /// it held a direct value. Without it a new itemized category named after
    /// the entry is opened.
    pub fn add(
        month: &mut BudgetMonth,
        flow: Flow,
        category: Option<&EntryId>,
        draft: EntryDraft,
    ) -> Result<EntryPlacement, CoreError> {
        let entry = draft.into_entry(EntryId::generate(), month.rate())?;
        let entry_id = entry.id.clone();
        let placement = match category {
            Some(category_id) => {
                month.upsert_entry(flow, category_id, entry)?;
                EntryPlacement {
                    category_id: category_id.clone(),
                    entry_id,
                    new_category: false,
                }
            }
            None => {
                let category = TransactionCategory::itemized(entry.description.clone(), entry);
                let category_id = category.id.clone();
                month.upsert_category(flow, category);
                EntryPlacement {
                    category_id,
                    entry_id,
                    new_category: true,
                }
            }
        };
        info!(
            %flow,
            category = %placement.category_id,
            entry = %placement.entry_id,
            "entry added"
        );
        Ok(placement)
    }

    /// Replaces an existing sub-entry in place, keeping its id.
    pub fn update(
        month: &mut BudgetMonth,
        flow: Flow,
        category_id: &EntryId,
        entry_id: &EntryId,
        draft: EntryDraft,
    ) -> Result<(), CoreError> {
        let category = month
            .category(flow, category_id)
            .ok_or_else(|| DomainError::CategoryNotFound {
                flow,
                id: category_id.clone(),
            })?;
        if category.entry(entry_id).is_none() {
            return Err(DomainError::EntryNotFound {
                category: category_id.clone(),
                entry: entry_id.clone(),
            }
            .into());
        }
        let entry = draft.into_entry(entry_id.clone(), month.rate())?;
        month.upsert_entry(flow, category_id, entry)?;
        debug!(%flow, category = %category_id, entry = %entry_id, "entry updated");
        Ok(())
    }

    /// Removes a sub-entry; the category goes with its last entry.
    pub fn remove(
        month: &mut BudgetMonth,
        flow: Flow,
        category_id: &EntryId,
        entry_id: &EntryId,
    ) -> Result<EntryRemoval, CoreError> {
        let outcome = month.remove_entry(flow, category_id, entry_id)?;
        info!(%flow, category = %category_id, entry = %entry_id, ?outcome, "entry removed");
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finanz_domain::{Amounted, Currency};

    fn month() -> BudgetMonth {
        BudgetMonth::new(
            Currency::new("Peso", "ARS"),
            ExchangeRate::new(1000.0).unwrap(),
            0.0,
            0.0,
            Vec::new(),
        )
    }

    #[test]
    fn add_without_category_opens_itemized_category() {
        let mut month = month();
        let placement = EntryService::add(
            &mut month,
            Flow::Expense,
            None,
            EntryDraft::local("Supermarket", 12_000.0, "2024-03-04"),
        )
        .expect("add entry");

        assert!(placement.new_category);
        let category = month
            .category(Flow::Expense, &placement.category_id)
            .expect("category");
        assert_eq!(category.description, "Supermarket");
        assert_eq!(category.date.as_deref(), Some("2024-03-04"));
        assert_eq!(category.amount_usd(), 12.0);
    }

    #[test]
    fn missing_figure_is_derived_from_the_rate() {
        let mut month = month();
        let placement = EntryService::add(
            &mut month,
            Flow::Income,
            None,
            EntryDraft::usd("Freelance", 40.0, "2024-03-10"),
        )
        .expect("add usd entry");
        let category = month.category(Flow::Income, &placement.category_id).unwrap();
        assert_eq!(category.amount_local(), 40_000.0);

        let both = EntryDraft {
            amount_usd: Some(1.0),
            ..EntryDraft::local("Tip", 5000.0, "2024-03-11")
        };
        EntryService::update(
            &mut month,
            Flow::Income,
            &placement.category_id,
            &placement.entry_id,
            both,
        )
        .expect("update");
        let category = month.category(Flow::Income, &placement.category_id).unwrap();
        assert_eq!(category.amount_usd(), 5.0);
    }

    #[test]
    fn invalid_drafts_are_rejected_before_mutation() {
        let mut month = month();
        let before = month.clone();
        for draft in [
            EntryDraft::local("", 1.0, "2024-03-01"),
            EntryDraft::local("x", f64::NAN, "2024-03-01"),
            EntryDraft::local("x", 1.0, "March 1st"),
            EntryDraft {
                description: "x".into(),
                ..EntryDraft::default()
            },
        ] {
            let err = EntryService::add(&mut month, Flow::Expense, None, draft).unwrap_err();
            assert!(err.is_validation());
        }
        assert_eq!(month, before);
    }

    #[test]
    fn update_requires_an_existing_entry() {
        let mut month = month();
        let placement = EntryService::add(
            &mut month,
            Flow::Expense,
            None,
            EntryDraft::local("Bus", 800.0, "2024-03-02"),
        )
        .unwrap();
        let err = EntryService::update(
            &mut month,
            Flow::Expense,
            &placement.category_id,
            &EntryId::from("missing"),
            EntryDraft::local("Bus", 900.0, "2024-03-02"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Domain(DomainError::EntryNotFound { .. })
        ));
    }
}
