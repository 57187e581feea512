//! finanz-domain
//!
//! Pure domain models (BudgetMonth, TransactionCategory, SubEntry, FinanceDocument).
//! No I/O, no storage. Data types plus the mutations that keep their totals consistent.

pub mod category;
pub mod common;
pub mod currency;
pub mod document;
pub mod entry;
pub mod error;
pub mod month;

pub use category::*;
pub use common::*;
pub use currency::*;
pub use document::*;
pub use entry::*;
pub use error::DomainError;
pub use month::*;
