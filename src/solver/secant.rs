//! Secant-method IRR root finding
//!
//! Drives the NPV evaluator toward a rate whose NPV is within tolerance of
//! zero, using two fixed seed rates and the secant update thereafter.

use log::debug;

use super::npv::net_present_value;
use super::outcome::IrrOutcome;
use crate::contract::{CashflowSchedule, ContractJob};
use crate::error::EngineError;

/// Tunable solver parameters.
///
/// The seed rates are deliberately not derived from the schedule; they are
/// production defaults, not invariants.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Rate evaluated at iteration 0
    pub first_seed: f64,

    /// Rate evaluated at iteration 1
    pub second_seed: f64,

    /// Absolute NPV magnitude accepted as converged
    pub tolerance: f64,

    /// Total NPV evaluation cap
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            first_seed: 0.25,
            second_seed: 0.20,
            tolerance: 0.01,
            max_iterations: 100,
        }
    }
}

/// Secant-method IRR solver.
///
/// Strictly sequential within one solve; holds no mutable state, so a single
/// solver is safely shared across worker threads.
#[derive(Debug, Clone, Default)]
pub struct IrrSolver {
    config: SolverConfig,
}

impl IrrSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve a validated job
    pub fn solve(&self, job: &ContractJob) -> IrrOutcome {
        self.solve_schedule(job.contract_id(), job.schedule())
    }

    /// Find the rate at which the schedule's NPV vanishes.
    ///
    /// Iterations 0 and 1 evaluate the seed rates; from iteration 2 on the
    /// candidate comes from the secant update over the rolling pair of the
    /// two most recent `(rate, npv)` points. Terminal states: converged,
    /// iteration cap reached (soft, no error), or a structured failure
    /// (vanished denominator, rate out of domain). The reported rate is
    /// finite on every path.
    pub fn solve_schedule(&self, contract_id: u64, schedule: &CashflowSchedule) -> IrrOutcome {
        // Rolling pair: (rate_1, npv_1) is the newest point, (rate_2, npv_2)
        // the one before it. Untouched until iteration 2 reads them.
        let mut rate_1: f64 = 0.0;
        let mut npv_1: f64 = 0.0;
        let mut rate_2: f64 = 0.0;
        let mut npv_2: f64 = 0.0;

        for iteration in 0..self.config.max_iterations {
            let candidate = match iteration {
                0 => self.config.first_seed,
                1 => self.config.second_seed,
                _ => {
                    let next = rate_1 - npv_1 * (rate_1 - rate_2) / (npv_1 - npv_2);
                    // Equal consecutive NPVs vanish the denominator; an
                    // overflowed update is the same terminal state. Either
                    // way the last finite rate is reported, never NaN.
                    if npv_1 == npv_2 || !next.is_finite() {
                        return IrrOutcome {
                            contract_id,
                            rate: rate_1,
                            converged: false,
                            iterations_used: iteration,
                            last_npv: npv_1,
                            error: Some(EngineError::DivergentSolve {
                                iterations: iteration,
                                npv: npv_1,
                            }),
                        };
                    }
                    next
                }
            };

            let npv = match net_present_value(schedule, candidate) {
                Ok(npv) => npv,
                Err(err) => {
                    return IrrOutcome {
                        contract_id,
                        rate: rate_1,
                        converged: false,
                        iterations_used: iteration,
                        last_npv: npv_1,
                        error: Some(err),
                    };
                }
            };

            rate_2 = rate_1;
            npv_2 = npv_1;
            rate_1 = candidate;
            npv_1 = npv;

            if npv.abs() < self.config.tolerance {
                debug!(
                    "contract {} converged after {} evaluations (rate {:.8}, npv {:.6})",
                    contract_id,
                    iteration + 1,
                    rate_1,
                    npv_1
                );
                return IrrOutcome {
                    contract_id,
                    rate: rate_1,
                    converged: true,
                    iterations_used: iteration + 1,
                    last_npv: npv_1,
                    error: None,
                };
            }
        }

        // Iteration cap reached: soft outcome carrying the last candidate
        IrrOutcome {
            contract_id,
            rate: rate_1,
            converged: false,
            iterations_used: self.config.max_iterations,
            last_npv: npv_1,
            error: None,
        }
    }
}
