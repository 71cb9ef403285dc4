//! Sector-level aggregation for the performance heatmap.
//!
//! Instruments are grouped by sector over a resolved [start, end] window.
//! Percent change per instrument uses the latest available close at or before
//! each window endpoint — never a later one. Sectors with no scorable member
//! are omitted rather than emitted with NaN.

use crate::domain::bar::BarSeries;
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

pub const DEFAULT_TOP_MOVERS: usize = 5;

/// Named duration buckets a caller can pick instead of explicit dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationBucket {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    YearToDate,
}

impl DurationBucket {
    /// Parse the short-code form used by callers (`1d`, `1w`, ... `ytd`).
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "1d" => Some(Self::OneDay),
            "1w" => Some(Self::OneWeek),
            "1m" => Some(Self::OneMonth),
            "3m" => Some(Self::ThreeMonths),
            "6m" => Some(Self::SixMonths),
            "1y" => Some(Self::OneYear),
            "ytd" => Some(Self::YearToDate),
            _ => None,
        }
    }

    /// Resolve to a concrete window ending at `as_of`.
    pub fn resolve(self, as_of: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = match self {
            Self::OneDay => as_of - Days::new(1),
            Self::OneWeek => as_of - Days::new(7),
            Self::OneMonth => as_of - Months::new(1),
            Self::ThreeMonths => as_of - Months::new(3),
            Self::SixMonths => as_of - Months::new(6),
            Self::OneYear => as_of - Months::new(12),
            Self::YearToDate => NaiveDate::from_ymd_opt(as_of.year(), 1, 1)
                .unwrap_or(as_of),
        };
        (start, as_of)
    }
}

/// One ranked mover inside a sector.
#[derive(Debug, Clone, Serialize)]
pub struct Mover {
    pub symbol: String,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectorSummary {
    pub sector_name: String,
    /// Equal-weight arithmetic mean of member percent changes.
    pub average_change_percent: f64,
    pub member_count: usize,
    pub total_volume: i64,
    /// Largest absolute movers, descending, at most `top_movers` entries.
    pub ranked_top_movers: Vec<Mover>,
}

/// Aggregate per-instrument performance into sector summaries.
///
/// `sector_of` maps a symbol to its sector; instruments it returns `None` for
/// are skipped. Output sectors are ordered by average change descending (name
/// ascending on ties); movers within a sector by |change| descending with
/// symbol lexical order on ties. Both orderings are deterministic so repeated
/// aggregation over the same snapshot reproduces identical output.
pub fn aggregate_sectors(
    series: &[BarSeries],
    sector_of: impl Fn(&str) -> Option<String>,
    window: (NaiveDate, NaiveDate),
    top_movers: usize,
) -> Vec<SectorSummary> {
    let (start, end) = window;
    let mut groups: BTreeMap<String, Vec<(String, f64, i64)>> = BTreeMap::new();

    for s in series {
        let Some(sector) = sector_of(&s.symbol) else {
            continue;
        };
        let Some(change) = percent_change(s, start, end) else {
            continue;
        };
        let volume: i64 = s
            .bars()
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .map(|b| b.volume)
            .sum();

        groups
            .entry(sector)
            .or_default()
            .push((s.symbol.clone(), change, volume));
    }

    let mut summaries: Vec<SectorSummary> = groups
        .into_iter()
        .map(|(sector_name, members)| {
            let member_count = members.len();
            let average_change_percent =
                members.iter().map(|(_, change, _)| change).sum::<f64>() / member_count as f64;
            let total_volume = members.iter().map(|(_, _, volume)| volume).sum();

            let mut ranked: Vec<Mover> = members
                .into_iter()
                .map(|(symbol, change_percent, _)| Mover {
                    symbol,
                    change_percent,
                })
                .collect();
            ranked.sort_by(|a, b| {
                b.change_percent
                    .abs()
                    .partial_cmp(&a.change_percent.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| a.symbol.cmp(&b.symbol))
            });
            ranked.truncate(top_movers);

            SectorSummary {
                sector_name,
                average_change_percent,
                member_count,
                total_volume,
                ranked_top_movers: ranked,
            }
        })
        .collect();

    summaries.sort_by(|a, b| {
        b.average_change_percent
            .partial_cmp(&a.average_change_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.sector_name.cmp(&b.sector_name))
    });

    summaries
}

/// Percent change over the window, or `None` when either endpoint has no
/// usable close.
fn percent_change(series: &BarSeries, start: NaiveDate, end: NaiveDate) -> Option<f64> {
    let start_close = series.last_at_or_before(start)?.close;
    let end_close = series.last_at_or_before(end)?.close;
    if start_close == 0.0 {
        return None;
    }
    Some((end_close - start_close) / start_close * 100.0)
}
