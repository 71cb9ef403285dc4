//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with the SMA of the first n closes, then
//! EMA[i] = C[i]*k + EMA[i-1]*(1-k). Warmup: first (n-1) bars are undefined.

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};

pub fn calculate_ema(bars: &[Bar], period: usize) -> IndicatorSeries {
    let kind = IndicatorKind::Ema(period);
    if period == 0 || bars.is_empty() {
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
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut seed_sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            seed_sum += bar.close;
            points.push(IndicatorPoint {
                date: bar.date,
                value: None,
            });
        } else if i == period - 1 {
            seed_sum += bar.close;
            ema = seed_sum / period as f64;
            points.push(IndicatorPoint {
                date: bar.date,
                value: Some(ema),
            });
        } else {
            ema = bar.close * k + ema * (1.0 - k);
            points.push(IndicatorPoint {
                date: bar.date,
                value: Some(ema),
            });
        }
    }

    IndicatorSeries { kind, points }
}
