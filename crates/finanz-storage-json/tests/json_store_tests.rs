use finanz_core::{BudgetRepository, KeyValueStore, NewMonth};
use finanz_domain::{Currency, MonthKey};
use finanz_storage_json::JsonFileStore;
use std::fs;
use tempfile::tempdir;

fn new_month(rate: f64) -> NewMonth {
    NewMonth {
        currency: Currency::new("Peso", "ARS"),
        rate,
        income_est: 500.0,
        expense_est: 200.0,
        expense_est_items: Vec::new(),
    }
}

#[test]
fn json_store_reads_back_written_items() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().join("data")).expect("create store");

    assert_eq!(store.get_item("MiFinanzApp").expect("read"), None);
    store.set_item("MiFinanzApp", "{\"2024\":{}}").expect("write");
    assert_eq!(
        store.get_item("MiFinanzApp").expect("read").as_deref(),
        Some("{\"2024\":{}}")
    );

    let path = store.item_path("MiFinanzApp");
    assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("json"));
    assert!(path.exists());
    assert!(!path.with_extension("json.tmp").exists());

    store.remove_item("MiFinanzApp").expect("remove");
    assert_eq!(store.get_item("MiFinanzApp").expect("read"), None);
}

#[test]
fn json_store_keeps_limited_backups_and_restores_them() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::with_retention(dir.path().to_path_buf(), 2).expect("create store");

    for value in ["{\"v\":1}", "{\"v\":2}", "{\"v\":3}", "{\"v\":4}"] {
        store.set_item("MiFinanzApp", value).expect("write");
    }

    let backups = store.list_backups("MiFinanzApp").expect("list backups");
    assert_eq!(backups.len(), 2);
    assert!(backups.iter().all(|backup| backup.created_at.is_some()));
    assert_eq!(
        fs::read_to_string(&backups[0].path).expect("read newest backup"),
        "{\"v\":3}"
    );

    store
        .restore_backup("MiFinanzApp", &backups[1].id)
        .expect("restore backup");
    assert_eq!(
        store.get_item("MiFinanzApp").expect("read").as_deref(),
        Some("{\"v\":2}")
    );

    assert!(store.restore_backup("MiFinanzApp", "missing.json").is_err());
}

#[test]
fn repository_persists_months_across_store_instances() {
    let dir = tempdir().expect("tempdir");
    let key = MonthKey::new(2024, 3).expect("key");
    {
        let repo = BudgetRepository::new(JsonFileStore::new(dir.path().to_path_buf()).unwrap());
        repo.create_month(key, new_month(1000.0)).expect("create month");
    }

    let repo = BudgetRepository::new(JsonFileStore::new(dir.path().to_path_buf()).unwrap());
    let month = repo.require_month(key).expect("month persisted");
    assert_eq!(month.rate().value(), 1000.0);

    let raw = fs::read_to_string(repo.store().item_path("MiFinanzApp")).expect("raw file");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(value["2024"]["3"]["currency"]["code"], "ARS");
    assert_eq!(value["2024"]["3"]["incomeEst"], 500.0);
}

#[test]
fn corrupt_document_surfaces_as_serialization_error() {
    let dir = tempdir().expect("tempdir");
    let store = JsonFileStore::new(dir.path().to_path_buf()).expect("create store");
    store.set_item("MiFinanzApp", "{not json").expect("write raw");

    let repo = BudgetRepository::new(store);
    let err = repo.get_all().expect_err("corrupt document");
    assert!(matches!(err, finanz_core::CoreError::Serde(_)));
    assert!(!err.is_validation());
}
