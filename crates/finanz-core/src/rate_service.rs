//! Exchange-rate changes for a month.

use finanz_domain::{BudgetMonth, ExchangeRate};
use tracing::{debug, info};

use crate::CoreError;

pub struct RateService;

impl RateService {
    /// Validates `rate` and re-derives every USD figure in `month` from it.
    ///
    /// An invalid rate leaves the month untouched.
    pub fn apply(month: &mut BudgetMonth, rate: f64) -> Result<ExchangeRate, CoreError> {
        let rate = ExchangeRate::new(rate)?;
        let previous = month.rate();
        month.apply_rate(rate);
        debug!(
            categories = month.incomes().len() + month.expenses().len(),
            "repriced month categories"
        );
        info!(from = %previous, to = %rate, "exchange rate applied");
        Ok(rate)
    }
}
