//! Data source collaborator interface
//!
//! The engine consumes contract listings and per-contract schedules through
//! the `DataSource` trait. Retry policy belongs to the implementation, never
//! to the engine.

mod loader;

pub use loader::CsvSource;

use thiserror::Error;

use crate::contract::{CashflowSchedule, ContractRef};
use crate::error::EngineError;

/// Failures raised by a data source implementation
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read cashflow data: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed cashflow row: {0}")]
    Csv(#[from] csv::Error),

    #[error("no cashflows stored for contract {0}")]
    UnknownContract(u64),
}

impl From<SourceError> for EngineError {
    fn from(err: SourceError) -> Self {
        EngineError::DataSource(err.to_string())
    }
}

/// Supplier of contract listings and per-contract cashflow schedules.
///
/// Implementations are shared by reference across concurrent workers, hence
/// the `Send + Sync` bound: a handle must be safe for simultaneous use, and
/// any per-call state belongs inside the method body, not on the handle.
pub trait DataSource: Send + Sync {
    /// Enumerate contracts with their declared cashflow counts.
    ///
    /// A failure here is fatal to the batch; nothing has been dispatched yet.
    fn list_contracts(&self) -> Result<Vec<ContractRef>, SourceError>;

    /// Fetch one contract's cashflow schedule, in storage order.
    ///
    /// A failure here is isolated to that contract's outcome.
    fn fetch_schedule(&self, contract_id: u64) -> Result<CashflowSchedule, SourceError>;
}
