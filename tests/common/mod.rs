use std::sync::Mutex;

use finanzapp::{core::NewMonth, domain::Currency, FinanzApp};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated base directory that outlives the calling test.
pub fn temp_base() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Opens an app backed by a unique directory for each test.
pub fn setup_app() -> FinanzApp {
    FinanzApp::open(temp_base()).expect("open app in temp dir")
}

pub fn peso_month(rate: f64) -> NewMonth {
    NewMonth {
        currency: Currency::new("Peso", "ARS"),
        rate,
        income_est: 500.0,
        expense_est: 200.0,
        expense_est_items: Vec::new(),
    }
}

#[allow(dead_code)]
pub fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
