//! Cashflow data structures matching the upstream contract feed

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A single dated cashflow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashflowEntry {
    /// Days since the data source epoch
    pub day_offset: i64,

    /// Signed amount: outflow negative, inflow positive
    pub amount: f64,
}

/// Ordered cashflow schedule for one contract.
///
/// Entry order is arrival order from the data source and is not required to
/// be sorted by date. The first entry is the valuation anchor every discount
/// factor is measured from. Invariant: never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowSchedule {
    entries: Vec<CashflowEntry>,
}

impl CashflowSchedule {
    /// Build a schedule, rejecting an empty entry list
    pub fn new(entries: Vec<CashflowEntry>) -> Result<Self, EngineError> {
        if entries.is_empty() {
            return Err(EngineError::EmptySchedule);
        }
        Ok(Self { entries })
    }

    /// Build a schedule from `(day_offset, amount)` pairs
    pub fn from_pairs(pairs: &[(i64, f64)]) -> Result<Self, EngineError> {
        Self::new(
            pairs
                .iter()
                .map(|&(day_offset, amount)| CashflowEntry { day_offset, amount })
                .collect(),
        )
    }

    /// Schedule holding a single entry
    pub fn single(entry: CashflowEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    /// Append an entry, preserving arrival order
    pub fn push(&mut self, entry: CashflowEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[CashflowEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anchor day offset (`d1`) every discount exponent is measured from
    pub fn anchor(&self) -> i64 {
        self.entries[0].day_offset
    }
}

/// One row of the contract listing: identifier plus declared cashflow count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRef {
    pub contract_id: u64,

    /// Number of cashflow entries the listing declares for this contract
    pub expected_entries: usize,
}

/// A fully fetched unit of work: one contract's schedule, validated against
/// the declared entry count. Immutable once built and owned exclusively by
/// the worker that solves it.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractJob {
    contract_id: u64,
    expected_entries: usize,
    schedule: CashflowSchedule,
}

impl ContractJob {
    /// Validate the fetched schedule against the declared entry count
    pub fn new(
        contract_id: u64,
        expected_entries: usize,
        schedule: CashflowSchedule,
    ) -> Result<Self, EngineError> {
        if schedule.len() != expected_entries {
            return Err(EngineError::SizeMismatch {
                expected: expected_entries,
                actual: schedule.len(),
            });
        }
        Ok(Self {
            contract_id,
            expected_entries,
            schedule,
        })
    }

    pub fn contract_id(&self) -> u64 {
        self.contract_id
    }

    pub fn expected_entries(&self) -> usize {
        self.expected_entries
    }

    pub fn schedule(&self) -> &CashflowSchedule {
        &self.schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_schedule_rejected() {
        let result = CashflowSchedule::new(Vec::new());
        assert_eq!(result.unwrap_err(), EngineError::EmptySchedule);
    }

    #[test]
    fn test_anchor_is_first_entry() {
        // Arrival order is preserved even when entries are not date-sorted
        let schedule = CashflowSchedule::from_pairs(&[(730, 54800.0), (0, -123400.0)]).unwrap();
        assert_eq!(schedule.anchor(), 730);
        assert_eq!(schedule.len(), 2);
    }

    #[test]
    fn test_single_and_push_preserve_order() {
        let mut schedule = CashflowSchedule::single(CashflowEntry {
            day_offset: 10,
            amount: -50.0,
        });
        schedule.push(CashflowEntry {
            day_offset: 5,
            amount: 60.0,
        });
        assert_eq!(schedule.anchor(), 10);
        assert_eq!(schedule.entries()[1].day_offset, 5);
    }

    #[test]
    fn test_job_size_mismatch() {
        let schedule = CashflowSchedule::from_pairs(&[(0, -100.0), (365, 110.0)]).unwrap();
        let result = ContractJob::new(7, 3, schedule);
        assert_eq!(
            result.unwrap_err(),
            EngineError::SizeMismatch {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_job_accepts_matching_count() {
        let schedule = CashflowSchedule::from_pairs(&[(0, -100.0), (365, 110.0)]).unwrap();
        let job = ContractJob::new(7, 2, schedule).unwrap();
        assert_eq!(job.contract_id(), 7);
        assert_eq!(job.expected_entries(), 2);
        assert_eq!(job.schedule().len(), 2);
    }
}
