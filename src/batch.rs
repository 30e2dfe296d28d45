//! Bounded-concurrency batch dispatch
//!
//! Fans one solver invocation per contract across a fixed-size rayon pool.
//! The worker boundary converts every failure (fetch error, size mismatch,
//! solver divergence, panic) into that contract's outcome; siblings and the
//! batch itself keep running. Only a failure to enumerate contracts at all
//! is fatal, since nothing has been dispatched at that point.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::contract::{ContractJob, ContractRef};
use crate::error::EngineError;
use crate::solver::{IrrOutcome, IrrSolver, SolverConfig};
use crate::source::DataSource;

/// Configuration for a batch run
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of concurrent workers; the dispatcher never starts more solves
    /// than this at once
    pub concurrency: usize,

    /// Cap on how many contracts from the listing are dispatched (None = all)
    pub max_contracts: Option<usize>,

    /// Solver parameters applied to every contract
    pub solver: SolverConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            max_contracts: None,
            solver: SolverConfig::default(),
        }
    }
}

/// Cooperative cancellation signal shared between a caller and a dispatcher.
///
/// Cancelling stops contracts that have not started; in-flight solves run to
/// completion, each bounded by the solver's iteration cap. Every submitted
/// contract still yields exactly one outcome.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Dispatches one IRR solve per contract across a bounded worker pool
pub struct BatchDispatcher {
    config: BatchConfig,
    cancel: CancelToken,
}

impl BatchDispatcher {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            cancel: CancelToken::new(),
        }
    }

    /// Token that cancels this dispatcher's runs
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Enumerate contracts from the source and solve them all.
    ///
    /// Failure to list contracts aborts the batch before any work is
    /// dispatched. The listing is truncated to `max_contracts` when set.
    pub fn run(&self, source: &dyn DataSource) -> Result<Vec<IrrOutcome>, EngineError> {
        let mut contracts = source.list_contracts().map_err(EngineError::from)?;
        if let Some(cap) = self.config.max_contracts {
            contracts.truncate(cap);
        }
        self.run_contracts(source, &contracts)
    }

    /// Solve an explicit contract listing.
    ///
    /// Yields exactly one outcome per contract, in listing order; the
    /// `collect` inside the pool is the blocking join.
    pub fn run_contracts(
        &self,
        source: &dyn DataSource,
        contracts: &[ContractRef],
    ) -> Result<Vec<IrrOutcome>, EngineError> {
        if self.config.concurrency == 0 {
            return Err(EngineError::WorkerPool(
                "concurrency must be at least 1".into(),
            ));
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.concurrency)
            .build()
            .map_err(|err| EngineError::WorkerPool(err.to_string()))?;

        info!(
            "dispatching {} contracts across {} workers",
            contracts.len(),
            self.config.concurrency
        );
        let solver = IrrSolver::new(self.config.solver.clone());
        let outcomes = pool.install(|| {
            contracts
                .par_iter()
                .map(|contract| self.solve_one(source, &solver, contract))
                .collect()
        });
        Ok(outcomes)
    }

    /// Worker body: the task boundary where every failure becomes an outcome
    fn solve_one(
        &self,
        source: &dyn DataSource,
        solver: &IrrSolver,
        contract: &ContractRef,
    ) -> IrrOutcome {
        if self.cancel.is_cancelled() {
            debug!("contract {} skipped: batch cancelled", contract.contract_id);
            return IrrOutcome::failed(contract.contract_id, EngineError::Cancelled);
        }

        match panic::catch_unwind(AssertUnwindSafe(|| fetch_and_solve(source, solver, contract))) {
            Ok(outcome) => {
                if let Some(err) = &outcome.error {
                    warn!("contract {} failed: {}", contract.contract_id, err);
                }
                outcome
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(
                    "contract {} worker panicked: {}",
                    contract.contract_id, message
                );
                IrrOutcome::failed(contract.contract_id, EngineError::TaskFailure(message))
            }
        }
    }
}

/// Fetch, validate, and solve a single contract
fn fetch_and_solve(
    source: &dyn DataSource,
    solver: &IrrSolver,
    contract: &ContractRef,
) -> IrrOutcome {
    let schedule = match source.fetch_schedule(contract.contract_id) {
        Ok(schedule) => schedule,
        Err(err) => return IrrOutcome::failed(contract.contract_id, err.into()),
    };
    let job = match ContractJob::new(contract.contract_id, contract.expected_entries, schedule) {
        Ok(job) => job,
        Err(err) => return IrrOutcome::failed(contract.contract_id, err),
    };
    solver.solve(&job)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
