//! Month-scoped access to the single persisted finance document.

use finanz_domain::{
    Amounted, BudgetMonth, Currency, EstimateItem, ExchangeRate, FinanceDocument, Flow, MonthKey,
};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::{
    storage::{document_warnings, null_figure_warnings, KeyValueStore},
    CoreError,
};

/// Storage key used by every released build of the app.
pub const DEFAULT_STORAGE_KEY: &str = "MiFinanzApp";

/// What `create_month` does when the target month already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreatePolicy {
    #[default]
    Reject,
    Overwrite,
}

/// Values captured by the create-month form.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMonth {
    pub currency: Currency,
    pub rate: f64,
    #[serde(default)]
    pub income_est: f64,
    #[serde(default)]
    pub expense_est: f64,
    #[serde(default)]
    pub expense_est_items: Vec<EstimateItem>,
}

impl NewMonth {
    fn into_month(self) -> Result<BudgetMonth, CoreError> {
        let rate = ExchangeRate::new(self.rate)?;
        if !self.income_est.is_finite() || !self.expense_est.is_finite() {
            return Err(CoreError::Validation("estimates must be numbers".into()));
        }
        if self.currency.code.trim().is_empty() {
            return Err(CoreError::Validation("a local currency is required".into()));
        }
        let submitted = self.expense_est_items.len();
        let items: Vec<EstimateItem> = self
            .expense_est_items
            .into_iter()
            .filter_map(|item| {
                let description = item.description.trim();
                (!description.is_empty() && item.amount.is_finite())
                    .then(|| EstimateItem::new(description, item.amount))
            })
            .collect();
        if items.len() != submitted {
            debug!(
                dropped = submitted - items.len(),
                "incomplete estimate rows discarded"
            );
        }
        Ok(BudgetMonth::new(
            self.currency,
            rate,
            self.income_est,
            self.expense_est,
            items,
        ))
    }
}

/// Persistence gateway over a [`KeyValueStore`].
///
/// Every write replaces the whole document, so a reader never observes a
/// half-updated month.
#[derive(Debug)]
pub struct BudgetRepository<S> {
    store: S,
    key: String,
    create_policy: CreatePolicy,
}

impl<S: KeyValueStore> BudgetRepository<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            create_policy: CreatePolicy::default(),
        }
    }

    pub fn with_create_policy(mut self, policy: CreatePolicy) -> Self {
        self.create_policy = policy;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get_all(&self) -> Result<FinanceDocument, CoreError> {
        let raw = self.store.get_item(&self.key).map_err(|err| {
            error!(key = %self.key, %err, "failed to read finance document");
            err
        })?;
        match raw {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(FinanceDocument::new()),
        }
    }

    /// Writes the whole document. Non-finite figures are refused before
    /// anything reaches the store, since JSON would turn them into `null`.
    pub fn save_all(&self, document: &FinanceDocument) -> Result<(), CoreError> {
        check_figures(document)?;
        let json = serde_json::to_string(document)?;
        self.store.set_item(&self.key, &json).map_err(|err| {
            error!(key = %self.key, %err, "failed to write finance document");
            err
        })
    }

    /// Anomalies in the stored document: figures stored as `null` plus
    /// everything [`document_warnings`] reports. Never fails on them.
    pub fn load_warnings(&self) -> Result<Vec<String>, CoreError> {
        let Some(json) = self.store.get_item(&self.key)? else {
            return Ok(Vec::new());
        };
        let raw: serde_json::Value = serde_json::from_str(&json)?;
        let mut warnings = null_figure_warnings(&raw);
        let document: FinanceDocument = serde_json::from_value(raw)?;
        warnings.extend(document_warnings(&document));
        Ok(warnings)
    }

    pub fn get_month(&self, key: MonthKey) -> Result<Option<BudgetMonth>, CoreError> {
        Ok(self.get_all()?.get(key).cloned())
    }

    /// Loads a month that must exist.
    pub fn require_month(&self, key: MonthKey) -> Result<BudgetMonth, CoreError> {
        self.get_month(key)?.ok_or(CoreError::MonthNotFound(key))
    }

    pub fn save_month(&self, key: MonthKey, month: &BudgetMonth) -> Result<(), CoreError> {
        let mut document = self.get_all()?;
        document.insert(key, month.clone());
        self.save_all(&document)?;
        debug!(month = %key, "month saved");
        Ok(())
    }

    /// Deletes a month, dropping its year when it was the last one.
    ///
    /// Returns `false` when nothing was stored at `key`; the document is then
    /// left untouched.
    pub fn delete_month(&self, key: MonthKey) -> Result<bool, CoreError> {
        let mut document = self.get_all()?;
        if document.remove(key).is_none() {
            return Ok(false);
        }
        self.save_all(&document)?;
        info!(month = %key, "month deleted");
        Ok(true)
    }

    pub fn create_month(&self, key: MonthKey, input: NewMonth) -> Result<BudgetMonth, CoreError> {
        let month = input.into_month()?;
        let mut document = self.get_all()?;
        if document.contains(key) {
            match self.create_policy {
                CreatePolicy::Reject => {
                    warn!(month = %key, "refusing to overwrite existing month");
                    return Err(CoreError::MonthExists(key));
                }
                CreatePolicy::Overwrite => {
                    warn!(month = %key, "overwriting existing month on create");
                }
            }
        }
        document.insert(key, month.clone());
        self.save_all(&document)?;
        info!(month = %key, currency = %month.currency.code, rate = %month.rate(), "month created");
        Ok(month)
    }

    /// Reads the full month, applies `mutate`, and writes the full month back.
    ///
    /// When `mutate` fails nothing is written.
    pub fn update_month<T>(
        &self,
        key: MonthKey,
        mutate: impl FnOnce(&mut BudgetMonth) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let mut document = self.get_all()?;
        let mut month = document
            .get(key)
            .cloned()
            .ok_or(CoreError::MonthNotFound(key))?;
        let outcome = mutate(&mut month)?;
        document.insert(key, month);
        self.save_all(&document)?;
        Ok(outcome)
    }

    pub fn years(&self) -> Result<Vec<i32>, CoreError> {
        Ok(self.get_all()?.years())
    }

    pub fn months(&self, year: i32) -> Result<Vec<u32>, CoreError> {
        Ok(self.get_all()?.months(year))
    }

    pub fn latest_month(&self) -> Result<Option<MonthKey>, CoreError> {
        Ok(self.get_all()?.latest())
    }
}

fn check_figures(document: &FinanceDocument) -> Result<(), CoreError> {
    for (year, number, month) in document.iter() {
        let mut figures = vec![month.income_est, month.expense_est()];
        figures.extend(month.estimate_items().iter().map(|item| item.amount));
        for flow in [Flow::Income, Flow::Expense] {
            for category in month.categories(flow) {
                figures.push(category.amount_local());
                figures.push(category.amount_usd());
            }
        }
        if figures.iter().any(|figure| !figure.is_finite()) {
            warn!(year, month = number, "refusing to store a non-numeric figure");
            return Err(CoreError::Validation(format!(
                "{year}-{number:02} holds an amount that is not a number"
            )));
        }
    }
    Ok(())
}
