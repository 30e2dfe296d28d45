//! NPV evaluation and secant-method IRR solving

mod npv;
mod outcome;
mod secant;

pub use npv::net_present_value;
pub use outcome::{BatchSummary, IrrOutcome};
pub use secant::{IrrSolver, SolverConfig};
