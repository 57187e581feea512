use chrono::{Local, NaiveDate};

use crate::CoreError;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// Spanish label for a month number, as shown in month lists and charts.
pub fn month_name(month: u32) -> Option<&'static str> {
    let index = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

/// Three-letter label used on chart axes.
pub fn month_abbrev(month: u32) -> Option<&'static str> {
    month_name(month).map(|name| &name[..3])
}

/// Today's local date as `YYYY-MM-DD`, the default for new entries.
pub fn today_iso() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Validates an entry date, returning it normalised to `YYYY-MM-DD`.
pub fn parse_entry_date(input: &str) -> Result<String, CoreError> {
    let date = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| CoreError::Validation(format!("'{input}' is not a YYYY-MM-DD date")))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_names_cover_calendar_only() {
        assert_eq!(month_name(1), Some("Enero"));
        assert_eq!(month_name(12), Some("Diciembre"));
        assert_eq!(month_name(0), None);
        assert_eq!(month_name(13), None);
        assert_eq!(month_abbrev(9), Some("Sep"));
    }

    #[test]
    fn entry_dates_must_be_iso() {
        assert_eq!(parse_entry_date(" 2024-03-05 ").unwrap(), "2024-03-05");
        assert!(parse_entry_date("05/03/2024").is_err());
        assert!(parse_entry_date("2024-02-30").is_err());
        assert_eq!(today_iso().len(), 10);
    }
}
