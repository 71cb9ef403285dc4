//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of the MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! Default parameters: fast=12, slow=26, signal=9.
//! The line and the signal have distinct warmups: the line is defined once
//! EMA(slow) is (index slow-1), the signal needs a further signal-1 line
//! points (index slow-1 + signal-1). Histogram validity follows the signal.

use crate::domain::bar::Bar;
use crate::domain::indicator::{calculate_ema, IndicatorKind};
use chrono::NaiveDate;

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

/// One MACD point. The three parts become defined at different indices.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdPoint {
    pub date: NaiveDate,
    pub line: Option<f64>,
    pub signal: Option<f64>,
    pub histogram: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub kind: IndicatorKind,
    pub points: Vec<MacdPoint>,
}

pub fn calculate_macd(
    bars: &[Bar],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let kind = IndicatorKind::Macd {
        fast,
        slow,
        signal: signal_period,
    };

    if fast == 0 || slow == 0 || signal_period == 0 {
        return MacdSeries {
            kind,
            points: bars
                .iter()
                .map(|b| MacdPoint {
                    date: b.date,
                    line: None,
                    signal: None,
                    histogram: None,
                })
                .collect(),
        };
    }

    let ema_fast = calculate_ema(bars, fast);
    let ema_slow = calculate_ema(bars, slow);

    // Line is defined wherever both EMAs are; the slower EMA dominates.
    let line: Vec<Option<f64>> = (0..bars.len())
        .map(|i| match (ema_fast.value_at(i), ema_slow.value_at(i)) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // Signal: EMA(signal_period) of the line, seeded with the SMA of the
    // first signal_period defined line values.
    let line_start = fast.max(slow) - 1;
    let signal_start = line_start + signal_period - 1;
    let k = 2.0 / (signal_period as f64 + 1.0);

    let mut signal: Vec<Option<f64>> = vec![None; bars.len()];
    if signal_start < bars.len() {
        let seed: f64 = line[line_start..=signal_start]
            .iter()
            .map(|v| v.unwrap_or(0.0))
            .sum::<f64>()
            / signal_period as f64;
        let mut signal_ema = seed;
        signal[signal_start] = Some(signal_ema);

        for i in (signal_start + 1)..bars.len() {
            if let Some(line_value) = line[i] {
                signal_ema = line_value * k + signal_ema * (1.0 - k);
                signal[i] = Some(signal_ema);
            }
        }
    }

    let points = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| MacdPoint {
            date: bar.date,
            line: line[i],
            signal: signal[i],
            histogram: match (line[i], signal[i]) {
                (Some(l), Some(s)) => Some(l - s),
                _ => None,
            },
        })
        .collect();

    MacdSeries { kind, points }
}

pub fn calculate_macd_default(bars: &[Bar]) -> MacdSeries {
    calculate_macd(bars, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let month = i / 28 + 1;
                let day = i % 28 + 1;
                Bar {
                    date: NaiveDate::from_ymd_opt(2024, month as u32, day as u32).unwrap(),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 1000,
                }
            })
            .collect()
    }

    fn ramp(n: usize) -> Vec<Bar> {
        make_bars(&(0..n).map(|i| 100.0 + i as f64).collect::<Vec<_>>())
    }

    #[test]
    fn macd_line_defined_from_slow_ema() {
        let bars = ramp(40);
        let series = calculate_macd_default(&bars);

        let line_start = DEFAULT_SLOW - 1;
        for i in 0..line_start {
            assert!(series.points[i].line.is_none(), "line at {} defined", i);
        }
        assert!(series.points[line_start].line.is_some());
        // Signal still warming up at that point.
        assert!(series.points[line_start].signal.is_none());
        assert!(series.points[line_start].histogram.is_none());
    }

    #[test]
    fn macd_signal_needs_nine_line_points() {
        let bars = ramp(40);
        let series = calculate_macd_default(&bars);

        let signal_start = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        for i in 0..signal_start {
            assert!(series.points[i].signal.is_none(), "signal at {} defined", i);
        }
        assert!(series.points[signal_start].signal.is_some());
        assert!(series.points[signal_start].histogram.is_some());
    }

    #[test]
    fn macd_histogram_equals_line_minus_signal() {
        let bars = ramp(40);
        let series = calculate_macd_default(&bars);

        for point in &series.points {
            if let (Some(line), Some(signal), Some(histogram)) =
                (point.line, point.signal, point.histogram)
            {
                assert!((histogram - (line - signal)).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn macd_line_is_ema_fast_minus_ema_slow() {
        let bars = ramp(12);
        let series = calculate_macd(&bars, 3, 5, 2);

        let ema_fast = calculate_ema(&bars, 3);
        let ema_slow = calculate_ema(&bars, 5);

        for (i, point) in series.points.iter().enumerate() {
            if let Some(line) = point.line {
                let expected = ema_fast.value_at(i).unwrap() - ema_slow.value_at(i).unwrap();
                assert!(
                    (line - expected).abs() < f64::EPSILON,
                    "line mismatch at index {}",
                    i
                );
            }
        }
    }

    #[test]
    fn macd_signal_seed_is_sma_of_first_line_values() {
        let bars = ramp(12);
        let series = calculate_macd(&bars, 3, 5, 2);

        let line_start = 4;
        let signal_start = 5;
        let seed = (series.points[line_start].line.unwrap()
            + series.points[signal_start].line.unwrap())
            / 2.0;
        assert!((series.points[signal_start].signal.unwrap() - seed).abs() < f64::EPSILON);
    }

    #[test]
    fn macd_constant_price_is_flat_zero() {
        let bars = make_bars(&[100.0; 40]);
        let series = calculate_macd_default(&bars);

        let signal_start = DEFAULT_SLOW - 1 + DEFAULT_SIGNAL - 1;
        for point in &series.points[signal_start..] {
            assert!(point.line.unwrap().abs() < 1e-9);
            assert!(point.signal.unwrap().abs() < 1e-9);
            assert!(point.histogram.unwrap().abs() < 1e-9);
        }
    }

    #[test]
    fn macd_zero_period_all_undefined() {
        let bars = make_bars(&[100.0, 101.0, 102.0]);

        for (fast, slow, signal) in [(0, 26, 9), (12, 0, 9), (12, 26, 0)] {
            let series = calculate_macd(&bars, fast, slow, signal);
            assert_eq!(series.points.len(), 3);
            assert!(series
                .points
                .iter()
                .all(|p| p.line.is_none() && p.signal.is_none() && p.histogram.is_none()));
        }
    }

    #[test]
    fn macd_empty_bars() {
        let series = calculate_macd_default(&[]);
        assert!(series.points.is_empty());
    }

    #[test]
    fn macd_too_short_for_signal() {
        let bars = ramp(DEFAULT_SLOW + 2);
        let series = calculate_macd_default(&bars);

        assert!(series.points[DEFAULT_SLOW - 1].line.is_some());
        assert!(series.points.iter().all(|p| p.signal.is_none()));
    }
}
