use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use finanz_domain::{Amounted, ExchangeRate, FinanceDocument, Flow};
use serde_json::Value;

use crate::CoreError;

/// Relative slack allowed between a stored USD figure and `local / rate`.
const USD_TOLERANCE: f64 = 0.01;

/// Stored field names that hold money figures.
const FIGURE_KEYS: [&str; 5] = ["incomeEst", "expenseEst", "amount", "amountLocal", "amountUSD"];

/// Abstraction over on-device key-value backends holding serialized documents.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError>;
    fn remove_item(&self, key: &str) -> Result<(), CoreError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        (**self).remove_item(key)
    }
}

/// Process-local store, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, CoreError> {
        self.items
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, CoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), CoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), CoreError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Detects stale USD figures and other anomalies within a loaded document.
pub fn document_warnings(document: &FinanceDocument) -> Vec<String> {
    let mut warnings = Vec::new();

    for (year, month, data) in document.iter() {
        if !(1..=12).contains(&month) {
            warnings.push(format!("{year}: month number {month} is outside 1-12"));
        }
        let rate = data.rate();
        let mut seen = HashSet::new();
        for flow in [Flow::Income, Flow::Expense] {
            for category in data.categories(flow) {
                if !seen.insert(category.id.clone()) {
                    warnings.push(format!(
                        "{year}-{month:02}: duplicate category id {}",
                        category.id
                    ));
                }
                if let Some(entries) = category.sub_entries() {
                    if entries.is_empty() {
                        warnings.push(format!(
                            "{year}-{month:02}: {flow} category {} has no entries",
                            category.id
                        ));
                    }
                    for entry in entries {
                        if is_stale(entry.amount_local, entry.amount_usd, rate) {
                            warnings.push(format!(
                                "{year}-{month:02}: entry {} USD figure does not match rate {rate}",
                                entry.id
                            ));
                        }
                    }
                } else if is_stale(category.amount_local(), category.amount_usd(), rate) {
                    warnings.push(format!(
                        "{year}-{month:02}: {flow} category {} USD figure does not match rate {rate}",
                        category.id
                    ));
                }
            }
        }
    }
    warnings
}

/// Lists figures stored as `null` in a raw document. They load as 0.
pub fn null_figure_warnings(raw: &Value) -> Vec<String> {
    let mut warnings = Vec::new();
    collect_null_figures(raw, "", &mut warnings);
    warnings
}

fn collect_null_figures(value: &Value, path: &str, warnings: &mut Vec<String>) {
    match value {
        Value::Object(fields) => {
            for (name, child) in fields {
                let child_path = if path.is_empty() {
                    name.clone()
                } else {
                    format!("{path}.{name}")
                };
                if child.is_null() && FIGURE_KEYS.contains(&name.as_str()) {
                    warnings.push(format!("{child_path}: missing figure read as 0"));
                } else {
                    collect_null_figures(child, &child_path, warnings);
                }
            }
        }
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                collect_null_figures(item, &format!("{path}[{index}]"), warnings);
            }
        }
        _ => {}
    }
}

fn is_stale(amount_local: f64, amount_usd: f64, rate: ExchangeRate) -> bool {
    let expected_usd = rate.to_usd(amount_local);
    if amount_local == 0.0 {
        return amount_usd != 0.0;
    }
    (amount_usd - expected_usd).abs() > expected_usd.abs() * USD_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use finanz_domain::{BudgetMonth, Currency, EntryId, MonthKey, TransactionCategory};

    #[test]
    fn memory_store_round_trips_items() {
        let store = MemoryStore::new();
        assert_eq!(store.get_item("k").unwrap(), None);
        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));
        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);
    }

    #[test]
    fn null_figures_are_listed_with_their_path() {
        let raw: Value = serde_json::from_str(
            r#"{"2024":{"3":{"rate":1000,"incomeEst":null,"currency":null,
                "expenses":[{"id":"1","amountLocal":5,"amountUSD":null}]}}}"#,
        )
        .unwrap();

        let warnings = null_figure_warnings(&raw);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.starts_with("2024.3.incomeEst")));
        assert!(warnings
            .iter()
            .any(|w| w.starts_with("2024.3.expenses[0].amountUSD")));
    }

    #[test]
    fn warnings_flag_stale_usd_figures() {
        let rate = ExchangeRate::new(1000.0).unwrap();
        let mut month = BudgetMonth::new(Currency::new("Peso", "ARS"), rate, 0.0, 0.0, Vec::new());
        month.upsert_category(
            Flow::Income,
            TransactionCategory::from_parts(EntryId::from("1"), "Old", 1000.0, 5.0, None),
        );
        month.upsert_category(
            Flow::Expense,
            TransactionCategory::simple("Fine", 2000.0, rate, None),
        );
        let mut document = FinanceDocument::new();
        document.insert(MonthKey::new(2024, 3).unwrap(), month);

        let warnings = document_warnings(&document);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("category 1"));
    }
}
