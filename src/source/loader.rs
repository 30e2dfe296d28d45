//! CSV-backed data source
//!
//! Loads a cashflow table with columns `ContractID,PaymentDate,AmountPrincipal`
//! and serves it as a `DataSource`. Payment dates are converted to day offsets
//! from the 1990-01-01 epoch used by the upstream cashflow feed.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;
use log::info;

use super::{DataSource, SourceError};
use crate::contract::{CashflowEntry, CashflowSchedule, ContractRef};

/// Epoch all payment dates are measured from
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).expect("fixed epoch date is valid")
}

/// Raw CSV row matching the cashflow table columns
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "ContractID")]
    contract_id: u64,
    #[serde(rename = "PaymentDate")]
    payment_date: NaiveDate,
    #[serde(rename = "AmountPrincipal")]
    amount: f64,
}

/// In-memory data source loaded from a cashflow CSV.
///
/// All state is read-only after construction, so one handle is safe to share
/// across every worker in a batch.
#[derive(Debug, Clone)]
pub struct CsvSource {
    schedules: BTreeMap<u64, CashflowSchedule>,
}

impl CsvSource {
    /// Load a cashflow table from a CSV file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        info!("loading cashflow table from {}", path.as_ref().display());
        Self::from_csv_reader(Reader::from_path(path)?)
    }

    /// Load a cashflow table from any reader (e.g. string buffer, network stream)
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        Self::from_csv_reader(Reader::from_reader(reader))
    }

    fn from_csv_reader<R: Read>(mut reader: Reader<R>) -> Result<Self, SourceError> {
        let epoch = epoch();
        let mut schedules: BTreeMap<u64, CashflowSchedule> = BTreeMap::new();

        for result in reader.deserialize() {
            let row: CsvRow = result?;
            let entry = CashflowEntry {
                day_offset: (row.payment_date - epoch).num_days(),
                amount: row.amount,
            };
            match schedules.entry(row.contract_id) {
                Entry::Vacant(slot) => {
                    slot.insert(CashflowSchedule::single(entry));
                }
                Entry::Occupied(mut slot) => slot.get_mut().push(entry),
            }
        }

        info!("loaded {} contracts", schedules.len());
        Ok(Self { schedules })
    }

    /// Number of distinct contracts in the table
    pub fn contract_count(&self) -> usize {
        self.schedules.len()
    }
}

impl DataSource for CsvSource {
    fn list_contracts(&self) -> Result<Vec<ContractRef>, SourceError> {
        Ok(self
            .schedules
            .iter()
            .map(|(&contract_id, schedule)| ContractRef {
                contract_id,
                expected_entries: schedule.len(),
            })
            .collect())
    }

    fn fetch_schedule(&self, contract_id: u64) -> Result<CashflowSchedule, SourceError> {
        self.schedules
            .get(&contract_id)
            .cloned()
            .ok_or(SourceError::UnknownContract(contract_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
ContractID,PaymentDate,AmountPrincipal
42,1990-01-01,-123400
42,1991-01-01,36200
42,1992-01-01,54800
7,1990-06-15,-500
7,1990-06-25,520
";

    #[test]
    fn test_load_groups_by_contract() {
        let source = CsvSource::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(source.contract_count(), 2);

        let contracts = source.list_contracts().unwrap();
        assert_eq!(
            contracts,
            vec![
                ContractRef {
                    contract_id: 7,
                    expected_entries: 2
                },
                ContractRef {
                    contract_id: 42,
                    expected_entries: 3
                },
            ]
        );
    }

    #[test]
    fn test_dates_become_day_offsets() {
        let source = CsvSource::from_reader(SAMPLE.as_bytes()).unwrap();

        let schedule = source.fetch_schedule(42).unwrap();
        let offsets: Vec<i64> = schedule.entries().iter().map(|e| e.day_offset).collect();
        assert_eq!(offsets, vec![0, 365, 730]);

        // Ten days apart, anchored mid-1990
        let schedule = source.fetch_schedule(7).unwrap();
        assert_eq!(schedule.anchor(), 165);
        assert_eq!(schedule.entries()[1].day_offset, 175);
        assert_eq!(schedule.entries()[1].amount, 520.0);
    }

    #[test]
    fn test_unknown_contract() {
        let source = CsvSource::from_reader(SAMPLE.as_bytes()).unwrap();
        let err = source.fetch_schedule(999).unwrap_err();
        assert!(matches!(err, SourceError::UnknownContract(999)));
    }

    #[test]
    fn test_malformed_row_is_csv_error() {
        let bad = "ContractID,PaymentDate,AmountPrincipal\n42,not-a-date,100\n";
        let err = CsvSource::from_reader(bad.as_bytes()).unwrap_err();
        assert!(matches!(err, SourceError::Csv(_)));
    }
}
