//! OHLCV bar and per-instrument series representation.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;

/// One open/high/low/close/volume record for a single instrument and date.
///
/// A bar with `close == 0.0` is the upstream "no trade" sentinel and is
/// filtered out during [`BarSeries`] construction, never treated as a price.
#[derive(Debug, Clone, Serialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// Upstream sentinel for an exchange holiday / untraded session.
    pub fn is_no_trade(&self) -> bool {
        self.close == 0.0
    }

    /// Contract check for bars supplied by a data collaborator.
    pub fn validate(&self) -> Result<(), MalformedBar> {
        if self.low > self.high {
            return Err(MalformedBar::InvertedRange {
                date: self.date,
                low: self.low,
                high: self.high,
            });
        }
        if self.volume < 0 {
            return Err(MalformedBar::NegativeVolume {
                date: self.date,
                volume: self.volume,
            });
        }
        Ok(())
    }
}

/// Why a supplied bar was rejected during series construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MalformedBar {
    #[error("bar on {date}: low {low} exceeds high {high}")]
    InvertedRange {
        date: NaiveDate,
        low: f64,
        high: f64,
    },

    #[error("bar on {date}: negative volume {volume}")]
    NegativeVolume { date: NaiveDate, volume: i64 },

    #[error("bar on {date}: timestamp not after previous bar")]
    NonMonotonicTimestamp { date: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Timeframe {
    Daily,
    Weekly,
}

/// Ordered bar sequence for one instrument and one timeframe.
///
/// Invariants held after construction: strictly increasing dates, no zero-close
/// sentinel rows, every bar passes [`Bar::validate`]. Immutable once built.
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub symbol: String,
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series from collaborator-supplied bars.
    ///
    /// Zero-close sentinel rows are dropped silently (market closed).
    /// Malformed bars are rejected and logged, construction continues with the
    /// remaining bars (log-and-skip, per the bar-retrieval contract).
    pub fn from_bars(symbol: impl Into<String>, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        let symbol = symbol.into();
        let mut accepted: Vec<Bar> = Vec::with_capacity(bars.len());

        for bar in bars {
            if bar.is_no_trade() {
                continue;
            }
            if let Err(reason) = bar.validate() {
                warn!(symbol = %symbol, %reason, "skipping malformed bar");
                continue;
            }
            if let Some(last) = accepted.last() {
                if bar.date <= last.date {
                    let reason = MalformedBar::NonMonotonicTimestamp { date: bar.date };
                    warn!(symbol = %symbol, %reason, "skipping malformed bar");
                    continue;
                }
            }
            accepted.push(bar);
        }

        Self {
            symbol,
            timeframe,
            bars: accepted,
        }
    }

    /// Construct directly from bars already known to satisfy the invariants,
    /// e.g. the output of the weekly resampler.
    pub(crate) fn from_clean_bars(
        symbol: impl Into<String>,
        timeframe: Timeframe,
        bars: Vec<Bar>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe,
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Latest bar dated at or before `date`, if any.
    pub fn last_at_or_before(&self, date: NaiveDate) -> Option<&Bar> {
        match self.bars.partition_point(|b| b.date <= date) {
            0 => None,
            n => Some(&self.bars[n - 1]),
        }
    }
}
