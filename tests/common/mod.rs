#![allow(dead_code)]

use chrono::{Datelike, Days, NaiveDate};
use marketstage::domain::bar::Bar;
use marketstage::domain::error::MarketstageError;
use marketstage::ports::data_port::BarDataPort;
use marketstage::ports::metadata_port::MetadataPort;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: NaiveDate, close: f64) -> Bar {
    Bar {
        date,
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1000,
    }
}

/// Weekday-only daily bars starting at `start`, one per calendar day skipping
/// Saturday/Sunday, with closes from the supplied function.
pub fn generate_trading_days(
    start: NaiveDate,
    count: usize,
    close_at: impl Fn(usize) -> f64,
) -> Vec<Bar> {
    let mut bars = Vec::with_capacity(count);
    let mut date = start;
    let mut i = 0;
    while bars.len() < count {
        if !matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun) {
            bars.push(make_bar(date, close_at(i)));
            i += 1;
        }
        date = date + Days::new(1);
    }
    bars
}

pub struct MockBarPort {
    pub data: HashMap<String, Vec<Bar>>,
    pub benchmark: Vec<Bar>,
    pub errors: HashMap<String, String>,
}

impl MockBarPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            benchmark: Vec::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<Bar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_benchmark(mut self, bars: Vec<Bar>) -> Self {
        self.benchmark = bars;
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl BarDataPort for MockBarPort {
    fn fetch_daily(
        &self,
        symbol: &str,
        _start: Option<NaiveDate>,
        _end: Option<NaiveDate>,
    ) -> Result<Vec<Bar>, MarketstageError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(MarketstageError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }

    fn fetch_benchmark_daily(&self) -> Result<Vec<Bar>, MarketstageError> {
        Ok(self.benchmark.clone())
    }
}

pub struct MockMetadataPort {
    pub sectors: HashMap<String, String>,
    pub names: HashMap<String, String>,
}

impl MockMetadataPort {
    pub fn new() -> Self {
        Self {
            sectors: HashMap::new(),
            names: HashMap::new(),
        }
    }

    pub fn with_instrument(mut self, symbol: &str, name: &str, sector: &str) -> Self {
        self.names.insert(symbol.to_string(), name.to_string());
        self.sectors.insert(symbol.to_string(), sector.to_string());
        self
    }
}

impl MetadataPort for MockMetadataPort {
    fn list_symbols(&self) -> Result<Vec<String>, MarketstageError> {
        let mut symbols: Vec<String> = self.names.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn sector_of(&self, symbol: &str) -> Option<String> {
        self.sectors.get(symbol).cloned()
    }

    fn name_of(&self, symbol: &str) -> String {
        self.names
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| symbol.to_string())
    }
}
