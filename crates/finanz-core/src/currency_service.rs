//! Static catalog of local currencies and the lookups used by the currency picker.

use finanz_domain::Currency;
use once_cell::sync::Lazy;

/// Minimum Jaro-Winkler similarity for a name to be offered as a suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;
const MAX_SUGGESTIONS: usize = 5;

const CATALOG_ENTRIES: &[(&str, &str)] = &[
    ("Peso Argentino", "ARS"),
    ("Boliviano", "BOB"),
    ("Real Brasileño", "BRL"),
    ("Peso Chileno", "CLP"),
    ("Peso Colombiano", "COP"),
    ("Colón Costarricense", "CRC"),
    ("Peso Cubano", "CUP"),
    ("Peso Dominicano", "DOP"),
    ("Quetzal Guatemalteco", "GTQ"),
    ("Lempira Hondureño", "HNL"),
    ("Peso Mexicano", "MXN"),
    ("Córdoba Nicaragüense", "NIO"),
    ("Balboa Panameño", "PAB"),
    ("Sol Peruano", "PEN"),
    ("Guaraní Paraguayo", "PYG"),
    ("Peso Uruguayo", "UYU"),
    ("Bolívar Venezolano", "VES"),
    ("Dólar Estadounidense", "USD"),
    ("Dólar Canadiense", "CAD"),
    ("Euro", "EUR"),
    ("Libra Esterlina", "GBP"),
    ("Franco Suizo", "CHF"),
    ("Corona Sueca", "SEK"),
    ("Corona Noruega", "NOK"),
    ("Corona Danesa", "DKK"),
    ("Zloty Polaco", "PLN"),
    ("Rublo Ruso", "RUB"),
    ("Lira Turca", "TRY"),
    ("Yen Japonés", "JPY"),
    ("Yuan Chino", "CNY"),
    ("Won Surcoreano", "KRW"),
    ("Rupia India", "INR"),
    ("Dólar Australiano", "AUD"),
    ("Dólar Neozelandés", "NZD"),
    ("Rand Sudafricano", "ZAR"),
    ("Shekel Israelí", "ILS"),
];

static CATALOG: Lazy<Vec<Currency>> = Lazy::new(|| {
    CATALOG_ENTRIES
        .iter()
        .map(|(name, code)| Currency::new(*name, *code))
        .collect()
});

pub struct CurrencyService;

impl CurrencyService {
    pub fn catalog() -> &'static [Currency] {
        &CATALOG
    }

    /// Case-insensitive substring match over name and code, in catalog order.
    /// An empty query returns the whole catalog.
    pub fn search(query: &str) -> Vec<&'static Currency> {
        let query = query.trim();
        CATALOG
            .iter()
            .filter(|currency| query.is_empty() || currency.matches(query))
            .collect()
    }

    pub fn find(code: &str) -> Option<&'static Currency> {
        let code = code.trim();
        CATALOG
            .iter()
            .find(|currency| currency.code.eq_ignore_ascii_case(code))
    }

    /// Closest catalog names for a query that matched nothing, best first.
    pub fn suggest(query: &str) -> Vec<&'static Currency> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        let mut scored: Vec<(f64, &'static Currency)> = CATALOG
            .iter()
            .filter_map(|currency| {
                let score = currency
                    .name
                    .to_lowercase()
                    .split_whitespace()
                    .map(|word| strsim::jaro_winkler(&query, word))
                    .fold(0.0, f64::max);
                (score >= SUGGESTION_THRESHOLD).then_some((score, currency))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, currency)| currency)
            .collect()
    }
}
