//! Daily indicator frame assembly.
//!
//! Combines the trend and momentum kernels into one frame aligned 1:1 with the
//! source daily series. Warm-up indices stay `None`; callers must treat them as
//! "insufficient history", never as zero.

use crate::domain::bar::BarSeries;
use crate::domain::indicator::{calculate_ema, calculate_macd_default, calculate_rsi};
use chrono::NaiveDate;
use serde::Serialize;

pub const EMA_SHORT: usize = 21;
pub const EMA_MEDIUM: usize = 44;
pub const EMA_LONG: usize = 200;
pub const RSI_PERIOD: usize = 14;

/// Derived values for one daily bar.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub close: f64,
    pub ema_21: Option<f64>,
    pub ema_44: Option<f64>,
    pub ema_200: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
}

/// Indicator values aligned 1:1 with a daily [`BarSeries`].
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorFrame {
    pub rows: Vec<IndicatorRow>,
}

impl IndicatorFrame {
    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Row one index before the latest, for cross detection.
    pub fn previous(&self) -> Option<&IndicatorRow> {
        self.rows.len().checked_sub(2).map(|i| &self.rows[i])
    }
}

/// Compute the full daily indicator set for one instrument.
///
/// A pure function of the input series. With fewer than 2 bars every field is
/// undefined; that is not an error condition.
pub fn compute_frame(series: &BarSeries) -> IndicatorFrame {
    let bars = series.bars();

    if bars.len() < 2 {
        let rows = bars
            .iter()
            .map(|bar| IndicatorRow {
                date: bar.date,
                close: bar.close,
                ema_21: None,
                ema_44: None,
                ema_200: None,
                rsi_14: None,
                macd: None,
                macd_signal: None,
                macd_hist: None,
            })
            .collect();
        return IndicatorFrame { rows };
    }

    let ema_21 = calculate_ema(bars, EMA_SHORT);
    let ema_44 = calculate_ema(bars, EMA_MEDIUM);
    let ema_200 = calculate_ema(bars, EMA_LONG);
    let rsi_14 = calculate_rsi(bars, RSI_PERIOD);
    let macd = calculate_macd_default(bars);

    let rows = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            close: bar.close,
            ema_21: ema_21.value_at(i),
            ema_44: ema_44.value_at(i),
            ema_200: ema_200.value_at(i),
            rsi_14: rsi_14.value_at(i),
            macd: macd.points[i].line,
            macd_signal: macd.points[i].signal,
            macd_hist: macd.points[i].histogram,
        })
        .collect();

    IndicatorFrame { rows }
}
