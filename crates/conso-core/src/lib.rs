pub mod allocation;
pub mod capex;
pub mod config;
pub mod error;
pub mod interco;
pub mod lease;
pub mod ledger;
pub mod mapping;
pub mod payroll;
pub mod pipeline;
pub mod statement;
pub mod types;

pub use error::ConsolidationError;
pub use types::*;

/// Standard result type for all consolidation operations
pub type ConsolidationResult<T> = Result<T, ConsolidationError>;
