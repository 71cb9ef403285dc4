//! Per-symbol pipelines and batch orchestration.
//!
//! Two independent pipelines per instrument:
//!   daily:  IndicatorFrame → confidence score + cross states
//!   weekly: resample → MA30 / relative strength / 52w high → stage → score
//!
//! Batch runs fetch every series up front (the data port is the only I/O),
//! then fan the pure numeric work out across a rayon worker pool. A bad
//! symbol is tallied and skipped; it never aborts the batch.

use crate::domain::bar::{BarSeries, Timeframe};
use crate::domain::confidence::{self, ConfidenceScore, MacdCross, PriceCross};
use crate::domain::error::MarketstageError;
use crate::domain::frame::{compute_frame, IndicatorFrame};
use crate::domain::relative_strength::compute_relative_strength;
use crate::domain::resample::to_weekly;
use crate::domain::stage::{classify_weekly, StageLabel};
use crate::domain::weinstein::{score_week, WeinsteinScore};
use crate::ports::data_port::BarDataPort;
use crate::ports::metadata_port::MetadataPort;
use chrono::Weekday;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, warn};

/// Minimum daily bars before the indicator/confidence pipeline runs.
pub const MIN_DAILY_BARS: usize = 30;
/// Minimum weekly bars before the screening pipeline runs.
pub const MIN_WEEKLY_BARS: usize = 52;

/// Daily pipeline output for one instrument (analysis table + chart feed).
#[derive(Debug, Clone, Serialize)]
pub struct SymbolAnalysis {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub current_price: f64,
    pub confidence: ConfidenceScore,
    pub macd_state: MacdCross,
    pub ema_21_state: PriceCross,
    pub ema_200_state: PriceCross,
    pub frame: IndicatorFrame,
}

/// Weekly pipeline output for one instrument (screening table feed).
#[derive(Debug, Clone, Serialize)]
pub struct SymbolScreening {
    pub symbol: String,
    pub name: String,
    pub sector: Option<String>,
    pub stage: StageLabel,
    pub weinstein: WeinsteinScore,
    pub price: f64,
    /// Latest weekly close vs. the week before, percent.
    pub change_percent: Option<f64>,
    pub volume: i64,
    pub ma30: Option<f64>,
    pub rs: Option<f64>,
    /// Rolling 52-week high of weekly highs.
    pub high_52w: Option<f64>,
}

/// Why a symbol dropped out of a batch.
#[derive(Debug, Clone)]
pub enum SkipReason {
    NoData,
    InsufficientBars { bars: usize, minimum: usize },
    DataSource { reason: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoData => write!(f, "no data"),
            SkipReason::InsufficientBars { bars, minimum } => {
                write!(f, "only {} bars, minimum {} required", bars, minimum)
            }
            SkipReason::DataSource { reason } => write!(f, "data source error: {}", reason),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Per-symbol success/failure accounting for a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchTally {
    pub requested: usize,
    pub succeeded: usize,
    pub skipped: Vec<SkippedSymbol>,
}

/// Parse a comma-separated symbol list: trimmed, uppercased, deduplicated.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, MarketstageError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = token.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(MarketstageError::DataSource {
                reason: "empty token in symbol list".into(),
            });
        }
        if seen.insert(symbol.clone()) {
            symbols.push(symbol);
        }
    }

    Ok(symbols)
}

/// Run the daily pipeline over an already-built series.
pub fn analyze_series(
    series: &BarSeries,
    name: String,
    sector: Option<String>,
) -> Result<SymbolAnalysis, MarketstageError> {
    if series.is_empty() {
        return Err(MarketstageError::NoData {
            symbol: series.symbol.clone(),
        });
    }
    if series.len() < MIN_DAILY_BARS {
        return Err(MarketstageError::InsufficientData {
            symbol: series.symbol.clone(),
            bars: series.len(),
            minimum: MIN_DAILY_BARS,
        });
    }

    let frame = compute_frame(series);
    let Some(latest) = frame.latest() else {
        return Err(MarketstageError::NoData {
            symbol: series.symbol.clone(),
        });
    };

    let confidence = confidence::score_row(latest);
    let macd_state = confidence::macd_cross(&frame);
    let ema_21_state = confidence::price_cross(&frame, |row| row.ema_21);
    let ema_200_state = confidence::price_cross(&frame, |row| row.ema_200);
    let current_price = latest.close;

    Ok(SymbolAnalysis {
        symbol: series.symbol.clone(),
        name,
        sector,
        current_price,
        confidence,
        macd_state,
        ema_21_state,
        ema_200_state,
        frame,
    })
}

/// Run the weekly screening pipeline over an already-built daily series.
///
/// `benchmark_weekly` is shared across the batch; `None` (or no timestamp
/// overlap) simply leaves the RS field absent — stage and score still work
/// from price and MA30 alone.
pub fn screen_series(
    daily: &BarSeries,
    benchmark_weekly: Option<&BarSeries>,
    week_end: Weekday,
    name: String,
    sector: Option<String>,
) -> Result<SymbolScreening, MarketstageError> {
    if daily.is_empty() {
        return Err(MarketstageError::NoData {
            symbol: daily.symbol.clone(),
        });
    }

    let weekly = to_weekly(daily, week_end);
    if weekly.len() < MIN_WEEKLY_BARS {
        return Err(MarketstageError::InsufficientData {
            symbol: daily.symbol.clone(),
            bars: weekly.len(),
            minimum: MIN_WEEKLY_BARS,
        });
    }

    let rs = benchmark_weekly.map(|bench| compute_relative_strength(&weekly, bench));
    let weeks = classify_weekly(&weekly, rs.as_ref());
    let Some(latest) = weeks.last() else {
        return Err(MarketstageError::NoData {
            symbol: daily.symbol.clone(),
        });
    };

    let weinstein = score_week(latest);
    let change_percent = weeks.len().checked_sub(2).map(|i| &weeks[i]).and_then(|prev| {
        (prev.bar.close > 0.0)
            .then(|| (latest.bar.close - prev.bar.close) / prev.bar.close * 100.0)
    });

    Ok(SymbolScreening {
        symbol: daily.symbol.clone(),
        name,
        sector,
        stage: latest.stage,
        price: latest.bar.close,
        change_percent,
        volume: latest.bar.volume,
        ma30: latest.ma30,
        rs: latest.rs,
        high_52w: latest.high_52w,
        weinstein,
    })
}

/// Fetch one daily series through the port, applying the construction policy.
fn fetch_series(
    data: &dyn BarDataPort,
    symbol: &str,
) -> Result<BarSeries, SkipReason> {
    let bars = data
        .fetch_daily(symbol, None, None)
        .map_err(|e| SkipReason::DataSource {
            reason: e.to_string(),
        })?;
    let series = BarSeries::from_bars(symbol, Timeframe::Daily, bars);
    if series.is_empty() {
        return Err(SkipReason::NoData);
    }
    Ok(series)
}

fn fetch_all(
    data: &dyn BarDataPort,
    symbols: &[String],
    tally: &mut BatchTally,
) -> Vec<BarSeries> {
    let mut fetched = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        match fetch_series(data, symbol) {
            Ok(series) => fetched.push(series),
            Err(reason) => {
                warn!(%symbol, %reason, "skipping symbol");
                tally.skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                });
            }
        }
    }
    fetched
}

fn record_outcome<T>(
    outcome: Result<T, MarketstageError>,
    symbol: &str,
    results: &mut Vec<T>,
    tally: &mut BatchTally,
) {
    match outcome {
        Ok(value) => {
            results.push(value);
            tally.succeeded += 1;
        }
        Err(err) => {
            let reason = match err {
                MarketstageError::NoData { .. } => SkipReason::NoData,
                MarketstageError::InsufficientData { bars, minimum, .. } => {
                    SkipReason::InsufficientBars { bars, minimum }
                }
                other => SkipReason::DataSource {
                    reason: other.to_string(),
                },
            };
            warn!(%symbol, %reason, "skipping symbol");
            tally.skipped.push(SkippedSymbol {
                symbol: symbol.to_string(),
                reason,
            });
        }
    }
}

/// Daily analysis across a universe: fetch serially, compute in parallel.
pub fn run_analysis_batch(
    data: &dyn BarDataPort,
    metadata: &dyn MetadataPort,
    symbols: &[String],
) -> (Vec<SymbolAnalysis>, BatchTally) {
    let mut tally = BatchTally {
        requested: symbols.len(),
        ..BatchTally::default()
    };

    let fetched = fetch_all(data, symbols, &mut tally);

    let outcomes: Vec<(String, Result<SymbolAnalysis, MarketstageError>)> = fetched
        .par_iter()
        .map(|series| {
            let name = metadata.name_of(&series.symbol);
            let sector = metadata.sector_of(&series.symbol);
            (series.symbol.clone(), analyze_series(series, name, sector))
        })
        .collect();

    let mut results = Vec::with_capacity(outcomes.len());
    for (symbol, outcome) in outcomes {
        record_outcome(outcome, &symbol, &mut results, &mut tally);
    }

    results.sort_by(|a, b| {
        b.confidence
            .total
            .cmp(&a.confidence.total)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    info!(
        requested = tally.requested,
        succeeded = tally.succeeded,
        skipped = tally.skipped.len(),
        "analysis batch complete"
    );
    (results, tally)
}

/// Weinstein screening across a universe: fetch serially (benchmark once),
/// compute in parallel, order by score descending.
pub fn run_screening_batch(
    data: &dyn BarDataPort,
    metadata: &dyn MetadataPort,
    symbols: &[String],
    week_end: Weekday,
) -> (Vec<SymbolScreening>, BatchTally) {
    let mut tally = BatchTally {
        requested: symbols.len(),
        ..BatchTally::default()
    };

    let benchmark_weekly = match data.fetch_benchmark_daily() {
        Ok(bars) => {
            let daily = BarSeries::from_bars("BENCHMARK", Timeframe::Daily, bars);
            if daily.is_empty() {
                warn!("benchmark series is empty; screening without relative strength");
                None
            } else {
                Some(to_weekly(&daily, week_end))
            }
        }
        Err(e) => {
            warn!(error = %e, "benchmark unavailable; screening without relative strength");
            None
        }
    };

    let fetched = fetch_all(data, symbols, &mut tally);

    let outcomes: Vec<(String, Result<SymbolScreening, MarketstageError>)> = fetched
        .par_iter()
        .map(|series| {
            let name = metadata.name_of(&series.symbol);
            let sector = metadata.sector_of(&series.symbol);
            (
                series.symbol.clone(),
                screen_series(series, benchmark_weekly.as_ref(), week_end, name, sector),
            )
        })
        .collect();

    let mut results = Vec::with_capacity(outcomes.len());
    for (symbol, outcome) in outcomes {
        record_outcome(outcome, &symbol, &mut results, &mut tally);
    }

    results.sort_by(|a, b| {
        b.weinstein
            .score
            .cmp(&a.weinstein.score)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    info!(
        requested = tally.requested,
        succeeded = tally.succeeded,
        skipped = tally.skipped.len(),
        "screening batch complete"
    );
    (results, tally)
}

/// Symbols whose latest week passed all three screening conditions.
pub fn shortlist(rows: &[SymbolScreening]) -> Vec<String> {
    rows.iter()
        .filter(|row| {
            row.weinstein.stage_condition
                && row.weinstein.low_resistance_condition
                && row.weinstein.not_overextended_condition
        })
        .map(|row| row.symbol.clone())
        .collect()
}
