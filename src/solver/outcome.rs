//! Per-contract solve outcomes and batch aggregates

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Result of solving one contract.
///
/// Produced exactly once per contract, success or failure, and always fully
/// populated: `rate` is finite on every path. Reaching the iteration cap is
/// a soft outcome (`converged = false`, no error); structured failures carry
/// the error kind alongside the last state reached.
#[derive(Debug, Clone, PartialEq)]
pub struct IrrOutcome {
    pub contract_id: u64,

    /// Last candidate rate evaluated (the solved rate when `converged`)
    pub rate: f64,

    /// Whether `|NPV|` fell inside the convergence tolerance
    pub converged: bool,

    /// NPV evaluations performed before the solve stopped
    pub iterations_used: u32,

    /// NPV at `rate`
    pub last_npv: f64,

    /// Structured failure, if the solve did not complete normally
    pub error: Option<EngineError>,
}

impl IrrOutcome {
    /// Outcome for a contract that failed before any solver iteration ran
    pub fn failed(contract_id: u64, error: EngineError) -> Self {
        Self {
            contract_id,
            rate: 0.0,
            converged: false,
            iterations_used: 0,
            last_npv: 0.0,
            error: Some(error),
        }
    }

    /// True when the solve finished without a structured error
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate counts over a batch of outcomes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub converged: usize,

    /// Hit the iteration cap without converging (soft outcome, no error)
    pub exhausted: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[IrrOutcome]) -> Self {
        let total = outcomes.len();
        let converged = outcomes.iter().filter(|o| o.converged).count();
        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        Self {
            total,
            converged,
            exhausted: total - converged - failed,
            failed,
        }
    }
}
