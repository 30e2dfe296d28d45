//! IRR Engine - Concurrent internal-rate-of-return calculation for contract cashflow schedules
//!
//! This library provides:
//! - A normalized cashflow data model (dated entries, per-contract schedules)
//! - A pure NPV evaluator using the Actual/365 day-count convention
//! - A secant-method IRR solver with structured divergence handling
//! - A bounded-concurrency batch dispatcher with per-contract failure isolation
//! - A `DataSource` collaborator trait plus a CSV-backed implementation

pub mod batch;
pub mod contract;
pub mod error;
pub mod solver;
pub mod source;

// Re-export commonly used types
pub use batch::{BatchConfig, BatchDispatcher, CancelToken};
pub use contract::{CashflowEntry, CashflowSchedule, ContractJob, ContractRef};
pub use error::EngineError;
pub use solver::{net_present_value, BatchSummary, IrrOutcome, IrrSolver, SolverConfig};
pub use source::{CsvSource, DataSource, SourceError};
