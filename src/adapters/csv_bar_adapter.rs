//! CSV file bar adapter.
//!
//! One `{SYMBOL}.csv` per instrument under a base directory, with a header
//! row and columns date,open,high,low,close,volume. The benchmark index is
//! just another symbol file, named in configuration.

use crate::domain::bar::Bar;
use crate::domain::error::MarketstageError;
use crate::ports::data_port::BarDataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvBarAdapter {
    base_path: PathBuf,
    benchmark_symbol: String,
}

impl CsvBarAdapter {
    pub fn new(base_path: PathBuf, benchmark_symbol: impl Into<String>) -> Self {
        Self {
            base_path,
            benchmark_symbol: benchmark_symbol.into(),
        }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    fn read_file(&self, symbol: &str) -> Result<Vec<Bar>, MarketstageError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| MarketstageError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| MarketstageError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = field(&record, 0, "date")?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                MarketstageError::DataSource {
                    reason: format!("invalid date format: {}", e),
                }
            })?;

            bars.push(Bar {
                date,
                open: parse_f64(&record, 1, "open")?,
                high: parse_f64(&record, 2, "high")?,
                low: parse_f64(&record, 3, "low")?,
                close: parse_f64(&record, 4, "close")?,
                volume: field(&record, 5, "volume")?.parse().map_err(|e| {
                    MarketstageError::DataSource {
                        reason: format!("invalid volume value: {}", e),
                    }
                })?,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<&'r str, MarketstageError> {
    record.get(index).ok_or_else(|| MarketstageError::DataSource {
        reason: format!("missing {} column", name),
    })
}

fn parse_f64(
    record: &csv::StringRecord,
    index: usize,
    name: &str,
) -> Result<f64, MarketstageError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| MarketstageError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl BarDataPort for CsvBarAdapter {
    fn fetch_daily(
        &self,
        symbol: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, MarketstageError> {
        let mut bars = self.read_file(symbol)?;
        if let Some(start) = start {
            bars.retain(|b| b.date >= start);
        }
        if let Some(end) = end {
            bars.retain(|b| b.date <= end);
        }
        Ok(bars)
    }

    fn fetch_benchmark_daily(&self) -> Result<Vec<Bar>, MarketstageError> {
        self.read_file(&self.benchmark_symbol)
    }
}
