//! Error taxonomy for per-contract and whole-batch failures

use thiserror::Error;

/// Failures produced while fetching, validating, or solving a contract.
///
/// Per-contract variants travel inside the contract's `IrrOutcome` and never
/// abort the batch. Only `DataSource` (when the contract listing itself cannot
/// be fetched) and `WorkerPool` are fatal to a run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Schedule arrived with no entries at all
    #[error("cashflow schedule is empty")]
    EmptySchedule,

    /// Fetched entry count disagrees with the declared count from the listing
    #[error("fetched {actual} cashflow entries but expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    /// `1 + rate` is not positive, so the fractional discount power is undefined
    #[error("discount base is not positive at rate {rate}")]
    RateOutOfDomain { rate: f64 },

    /// Two consecutive trial NPVs were equal and the secant denominator vanished
    #[error("secant denominator vanished after {iterations} iterations (npv {npv})")]
    DivergentSolve { iterations: u32, npv: f64 },

    /// Wrapped collaborator failure; fatal only when the contract listing fails
    #[error("data source failure: {0}")]
    DataSource(String),

    /// Panic caught at the worker task boundary
    #[error("worker task panicked: {0}")]
    TaskFailure(String),

    /// Batch was cancelled before this contract was dispatched
    #[error("batch cancelled before contract was dispatched")]
    Cancelled,

    /// Worker pool could not be built or was misconfigured
    #[error("worker pool: {0}")]
    WorkerPool(String),
}
