pub mod build_info;

use std::sync::Once;

use tracing_subscriber::{filter::Directive, fmt, EnvFilter};

static TRACING_INIT: Once = Once::new();

const DEFAULT_DIRECTIVE: &str = "finanzapp=info,finanz_core=info,finanz_storage_json=info";

/// Initializes the global tracing subscriber.
///
/// `RUST_LOG` is honoured first; `extra` (usually `Config::log_filter`) adds
/// directives on top of the info-level defaults for the app crates. Invalid
/// directives are skipped.
pub fn init_tracing(extra: Option<&str>) {
    TRACING_INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();
        let directives = DEFAULT_DIRECTIVE
            .split(',')
            .chain(extra.into_iter().flat_map(|raw| raw.split(',')));
        for directive in directives.map(str::trim).filter(|d| !d.is_empty()) {
            if let Ok(parsed) = directive.parse::<Directive>() {
                filter = filter.add_directive(parsed);
            }
        }

        let _ = fmt().with_env_filter(filter).try_init();
    });
}
