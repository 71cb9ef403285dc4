//! RSI (Relative Strength Index) indicator.
//!
//! Wilder's smoothing for the average gain/loss:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - (100 / (1 + avg_gain / avg_loss)); if avg_loss == 0, RSI = 100.
//! Warmup: the first n bars are undefined (n price changes are needed for the
//! initial average).

use crate::domain::bar::Bar;
use crate::domain::indicator::{IndicatorKind, IndicatorPoint, IndicatorSeries};

pub fn calculate_rsi(bars: &[Bar], period: usize) -> IndicatorSeries {
    let kind = IndicatorKind::Rsi(period);
    if period == 0 || bars.len() < 2 {
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
    points.push(IndicatorPoint {
        date: bars[0].date,
        value: None,
    });

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 1..bars.len() {
        let change = bars[i].close - bars[i - 1].close;
        let gain = if change > 0.0 { change } else { 0.0 };
        let loss = if change < 0.0 { -change } else { 0.0 };

        let value = if i < period {
            // Still accumulating the first window.
            avg_gain += gain;
            avg_loss += loss;
            None
        } else if i == period {
            avg_gain = (avg_gain + gain) / period as f64;
            avg_loss = (avg_loss + loss) / period as f64;
            Some(rsi_from_averages(avg_gain, avg_loss))
        } else {
            avg_gain = (avg_gain * (period - 1) as f64 + gain) / period as f64;
            avg_loss = (avg_loss * (period - 1) as f64 + loss) / period as f64;
            Some(rsi_from_averages(avg_gain, avg_loss))
        };

        points.push(IndicatorPoint {
            date: bars[i].date,
            value,
        });
    }

    IndicatorSeries { kind, points }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        // No price decreases in the window.
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
