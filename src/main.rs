//! IRR Engine CLI
//!
//! Loads a cashflow table from CSV, solves IRR for every contract across a
//! bounded worker pool, and writes per-contract outcomes to CSV (with an
//! optional JSON run report on stdout for API integration).

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use irr_engine::{
    BatchConfig, BatchDispatcher, BatchSummary, CsvSource, IrrOutcome, SolverConfig,
};
use serde::Serialize;

/// Concurrent IRR calculation over contract cashflow schedules
#[derive(Debug, Parser)]
#[command(name = "irr_engine", version, about)]
struct Cli {
    /// Cashflow table (ContractID,PaymentDate,AmountPrincipal)
    #[arg(long, default_value = "cashflows.csv")]
    input: PathBuf,

    /// Per-contract outcome CSV
    #[arg(long, default_value = "irr_outcomes.csv")]
    output: PathBuf,

    /// Number of concurrent workers
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Dispatch at most this many contracts from the listing
    #[arg(long)]
    limit: Option<usize>,

    /// Absolute NPV magnitude accepted as converged
    #[arg(long, default_value_t = 0.01)]
    tolerance: f64,

    /// NPV evaluation cap per contract
    #[arg(long, default_value_t = 100)]
    max_iterations: u32,

    /// Emit the run report as JSON on stdout instead of the text summary
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct RunReport {
    contract_count: usize,
    summary: BatchSummary,
    execution_time_ms: u64,
    outcomes: Vec<OutcomeRecord>,
}

/// Flattened outcome row for the CSV sink and JSON report
#[derive(Serialize)]
struct OutcomeRecord {
    #[serde(rename = "ContractID")]
    contract_id: u64,
    #[serde(rename = "Rate")]
    rate: f64,
    #[serde(rename = "Converged")]
    converged: bool,
    #[serde(rename = "Iterations")]
    iterations: u32,
    #[serde(rename = "LastNPV")]
    last_npv: f64,
    #[serde(rename = "Error")]
    error: Option<String>,
}

impl From<&IrrOutcome> for OutcomeRecord {
    fn from(outcome: &IrrOutcome) -> Self {
        Self {
            contract_id: outcome.contract_id,
            rate: outcome.rate,
            converged: outcome.converged,
            iterations: outcome.iterations_used,
            last_npv: outcome.last_npv,
            error: outcome.error.as_ref().map(|e| e.to_string()),
        }
    }
}

fn write_outcome_csv(path: &Path, outcomes: &[IrrOutcome]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for outcome in outcomes {
        writer.serialize(OutcomeRecord::from(outcome))?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let start = Instant::now();
    let source = CsvSource::from_path(&cli.input)
        .with_context(|| format!("failed to load cashflow table {}", cli.input.display()))?;

    let config = BatchConfig {
        concurrency: cli.concurrency,
        max_contracts: cli.limit,
        solver: SolverConfig {
            tolerance: cli.tolerance,
            max_iterations: cli.max_iterations,
            ..SolverConfig::default()
        },
    };

    let dispatcher = BatchDispatcher::new(config);
    let outcomes = dispatcher.run(&source).context("batch run failed")?;
    let elapsed = start.elapsed();
    let summary = BatchSummary::from_outcomes(&outcomes);

    write_outcome_csv(&cli.output, &outcomes)?;

    if cli.json {
        let report = RunReport {
            contract_count: outcomes.len(),
            summary,
            execution_time_ms: elapsed.as_millis() as u64,
            outcomes: outcomes.iter().map(OutcomeRecord::from).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("IRR Engine v0.1.0");
    println!("=================\n");

    println!(
        "{:>12} {:>14} {:>10} {:>6} {:>14}  {}",
        "Contract", "Rate", "Converged", "Iters", "LastNPV", "Error"
    );
    println!("{}", "-".repeat(80));
    for outcome in outcomes.iter().take(24) {
        println!(
            "{:>12} {:>14.8} {:>10} {:>6} {:>14.6}  {}",
            outcome.contract_id,
            outcome.rate,
            outcome.converged,
            outcome.iterations_used,
            outcome.last_npv,
            outcome
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default(),
        );
    }
    if outcomes.len() > 24 {
        println!("... ({} more contracts)", outcomes.len() - 24);
    }

    println!("\nFull results written to: {}", cli.output.display());

    println!("\nSummary:");
    println!("  Contracts: {}", summary.total);
    println!("  Converged: {}", summary.converged);
    println!("  Hit iteration cap: {}", summary.exhausted);
    println!("  Failed: {}", summary.failed);
    println!("\nTotal time: {:?}", elapsed);

    Ok(())
}
