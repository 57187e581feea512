use thiserror::Error;

use crate::common::{EntryId, Flow};

/// Rejections raised by the domain model before any field is touched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DomainError {
    #[error("Exchange rate must be a positive finite number, got {0}")]
    InvalidRate(f64),
    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),
    #[error("{flow} category not found: {id}")]
    CategoryNotFound { flow: Flow, id: EntryId },
    #[error("Entry {entry} not found in category {category}")]
    EntryNotFound { category: EntryId, entry: EntryId },
    #[error("Category {0} is itemized; its total comes from its entries")]
    ItemizedCategory(EntryId),
    #[error("Estimate item index {0} out of range")]
    EstimateItemNotFound(usize),
    #[error("Expense estimate is derived from its items and cannot be set directly")]
    ItemizedEstimate,
}
