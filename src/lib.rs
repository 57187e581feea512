#![doc(test(attr(deny(warnings))))]

//! MiFinanzApp keeps monthly budgets in a local currency pegged to USD.
//!
//! The work is split across the workspace crates re-exported here:
//! [`domain`] holds the month model and its invariants, [`core`] the services
//! and the persistence gateway, [`storage`] the on-device JSON store and
//! [`config`] the user settings. [`FinanzApp`] wires them together.

pub mod app;
pub mod errors;
pub mod utils;

pub use app::FinanzApp;
pub use errors::AppError;
pub use finanz_config as config;
pub use finanz_core as core;
pub use finanz_domain as domain;
pub use finanz_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and logs the embedded build metadata.
pub fn init() {
    init_with_filter(None);
}

/// Like [`init`], adding `filter` directives (e.g. `Config::log_filter`).
pub fn init_with_filter(filter: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(filter);
        let build = utils::build_info::current();
        tracing::info!(build = %build.summary(), "MiFinanzApp tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init_with_filter(Some("finanz_core=debug"));
    }
}
