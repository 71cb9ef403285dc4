//! Simple Moving Average indicator.
//!
//! Plain arithmetic mean of the last n closes. Warmup: first (n-1) bars are
//! undefined.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};

pub fn calculate_sma(bars: &[Bar], period: usize) -> IndicatorSeries {
    let kind = IndicatorKind::Sma(period);
    if period == 0 {
        return IndicatorSeries {
            kind,
            points: bars
                .iter()
                .map(|b| IndicatorPoint {
                    date: b.date,
                    value: None,
                })
                .collect(),
        };
    }

    let mut points = Vec::with_capacity(bars.len());
    let mut window_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        window_sum += bar.close;
        if i >= period {
            window_sum -= bars[i - period].close;
        }

        let value = if i >= period - 1 {
            Some(window_sum / period as f64)
        } else {
            None
        };
        points.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries { kind, points }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<Bar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32).unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    #[test]
    fn sma_warmup() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3);

        assert_eq!(series.value_at(0), None);
        assert_eq!(series.value_at(1), None);
        assert!(series.value_at(2).is_some());
        assert!(series.value_at(3).is_some());
    }

    #[test]
    fn sma_values() {
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0]);
        let series = calculate_sma(&bars, 3);

        let v2 = series.value_at(2).unwrap();
        assert!((v2 - 20.0).abs() < f64::EPSILON);

        let v3 = series.value_at(3).unwrap();
        assert!((v3 - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sma_period_1_tracks_close() {
        let bars = make_bars(&[10.0, 20.0, 30.0]);
        let series = calculate_sma(&bars, 1);

        for (i, bar) in bars.iter().enumerate() {
            assert!((series.value_at(i).unwrap() - bar.close).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn sma_period_0_all_undefined() {
        let bars = make_bars(&[10.0, 20.0]);
        let series = calculate_sma(&bars, 0);
        assert_eq!(series.points.len(), 2);
        assert!(series.points.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn sma_empty_bars() {
        let series = calculate_sma(&[], 3);
        assert!(series.points.is_empty());
    }
}
