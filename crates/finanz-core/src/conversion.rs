//! Amount conversion and parsing helpers shared by the services.

use finanz_domain::ExchangeRate;

use crate::CoreError;

pub fn to_usd(amount_local: f64, rate: ExchangeRate) -> f64 {
    rate.to_usd(amount_local)
}

pub fn to_local(amount_usd: f64, rate: ExchangeRate) -> f64 {
    rate.to_local(amount_usd)
}

/// Rounds to two decimals for display. Stored figures keep full precision.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// "Sum to add": the new total after adding `delta` to `base`.
pub fn add_delta(base: f64, delta: f64) -> f64 {
    base + delta
}

/// Parses a user-typed amount. Accepts a comma as the decimal separator.
pub fn parse_amount(input: &str) -> Result<f64, CoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("amount is required".into()));
    }
    let normalized = trimmed.replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CoreError::Validation(format!(
            "'{trimmed}' is not a valid amount"
        ))),
    }
}

/// Lenient variant used for running totals: anything unparseable counts as 0.
pub fn amount_or_zero(input: &str) -> f64 {
    parse_amount(input).unwrap_or(0.0)
}
