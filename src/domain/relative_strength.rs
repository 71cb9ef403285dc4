//! Relative strength versus a benchmark series.
//!
//! Both series are aligned on the intersection of their weekly timestamps;
//! misaligned weeks are discarded, not interpolated. Per aligned index:
//!
//!   stock_ret = close[t]/close[t-1] - 1       (benchmark analogous)
//!   ratio     = (1 + stock_ret) / (1 + bench_ret)
//!
//! The smoothed value is a rolling mean of the ratio over [`RS_SMOOTHING`]
//! aligned periods. A week where the benchmark return is -1 has no defined
//! ratio; it is excluded from the rolling window (the window shrinks, no
//! placeholder is inserted).

use crate::domain::bar::BarSeries;
use chrono::NaiveDate;

pub const RS_SMOOTHING: usize = 52;

#[derive(Debug, Clone, PartialEq)]
pub struct RsPoint {
    pub date: NaiveDate,
    /// Week-on-week return ratio; `None` at the first aligned index and where
    /// the benchmark return is -1.
    pub ratio: Option<f64>,
    /// Rolling mean of the ratio; `None` before [`RS_SMOOTHING`] aligned
    /// periods exist.
    pub smoothed: Option<f64>,
}

/// Relative-strength series on the timestamp intersection of instrument and
/// benchmark. Empty when the two series share no timestamps.
#[derive(Debug, Clone)]
pub struct RsSeries {
    pub points: Vec<RsPoint>,
}

impl RsSeries {
    pub fn latest_smoothed(&self) -> Option<f64> {
        self.points.last().and_then(|p| p.smoothed)
    }

    /// Smoothed value at the given date, if that date is an aligned index.
    pub fn smoothed_on(&self, date: NaiveDate) -> Option<f64> {
        self.points
            .iter()
            .find(|p| p.date == date)
            .and_then(|p| p.smoothed)
    }
}

/// Compute smoothed relative strength for one instrument.
pub fn compute_relative_strength(instrument: &BarSeries, benchmark: &BarSeries) -> RsSeries {
    // Intersection walk; both inputs are strictly date-ordered.
    let mut aligned: Vec<(NaiveDate, f64, f64)> = Vec::new();
    let (mut i, mut j) = (0, 0);
    let (inst, bench) = (instrument.bars(), benchmark.bars());

    while i < inst.len() && j < bench.len() {
        match inst[i].date.cmp(&bench[j].date) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                aligned.push((inst[i].date, inst[i].close, bench[j].close));
                i += 1;
                j += 1;
            }
        }
    }

    let mut points = Vec::with_capacity(aligned.len());

    for (t, &(date, close, bench_close)) in aligned.iter().enumerate() {
        let ratio = if t == 0 {
            None
        } else {
            let (_, prev_close, prev_bench) = aligned[t - 1];
            let stock_ret = close / prev_close - 1.0;
            let bench_ret = bench_close / prev_bench - 1.0;
            if bench_ret == -1.0 {
                // Benchmark wiped out; the ratio is undefined here.
                None
            } else {
                Some((1.0 + stock_ret) / (1.0 + bench_ret))
            }
        };

        points.push(RsPoint {
            date,
            ratio,
            smoothed: None,
        });

        if t + 1 >= RS_SMOOTHING {
            let window_start = t + 1 - RS_SMOOTHING;
            let defined: Vec<f64> = points[window_start..=t]
                .iter()
                .filter_map(|p| p.ratio)
                .collect();
            if !defined.is_empty() {
                let mean = defined.iter().sum::<f64>() / defined.len() as f64;
                points[t].smoothed = Some(mean);
            }
        }
    }

    RsSeries { points }
}
