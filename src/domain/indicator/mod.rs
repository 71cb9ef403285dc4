//! Technical indicator kernels.
//!
//! One module per indicator, each exposing a `calculate_*` function over a bar
//! slice. Output points are tagged-optional: `None` means "not yet computable"
//! (warm-up window not filled), which downstream scoring must never conflate
//! with a computed zero.

pub mod sma;
pub mod ema;
pub mod rsi;
pub mod macd;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, calculate_macd_default, MacdPoint, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use chrono::NaiveDate;
use std::fmt;

/// A single point in an indicator time series, aligned to a source bar.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    /// `None` during the indicator's warm-up window.
    pub value: Option<f64>,
}

/// Indicator identity plus parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorKind {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
}

/// A time series of single-valued indicator points.
#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub kind: IndicatorKind,
    pub points: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `index`, flattening out-of-range and warm-up to `None`.
    pub fn value_at(&self, index: usize) -> Option<f64> {
        self.points.get(index).and_then(|p| p.value)
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorKind::Sma(period) => write!(f, "SMA({})", period),
            IndicatorKind::Ema(period) => write!(f, "EMA({})", period),
            IndicatorKind::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorKind::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
        }
    }
}
