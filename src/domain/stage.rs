//! Weinstein market-phase classification.
//!
//! One label per weekly bar, a pure function of (close, ma30, ma30 one week
//! prior). Only Advancing (Stage 2) and Declining (Stage 4) have positive
//! rules; everything else — including any week where the MA30 window is not
//! yet filled — is Undetermined. Basing (Stage 1) and Topping (Stage 3) exist
//! in the vocabulary but are never emitted: the upstream methodology
//! documentation defines them without ever assigning them, and that gap is
//! preserved here rather than papered over with invented rules.

use crate::domain::bar::{Bar, BarSeries};
use crate::domain::indicator::calculate_sma;
use crate::domain::relative_strength::RsSeries;
use serde::Serialize;
use std::fmt;

pub const MA30_PERIOD: usize = 30;
pub const HIGH_52W_PERIOD: usize = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StageLabel {
    /// Stage 1 — never emitted by [`classify`]; see module docs.
    Basing,
    /// Stage 2.
    Advancing,
    /// Stage 3 — never emitted by [`classify`]; see module docs.
    Topping,
    /// Stage 4.
    Declining,
    Undetermined,
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageLabel::Basing => "Stage 1",
            StageLabel::Advancing => "Stage 2",
            StageLabel::Topping => "Stage 3",
            StageLabel::Declining => "Stage 4",
            StageLabel::Undetermined => "Undetermined",
        };
        f.write_str(name)
    }
}

/// Label one weekly bar from its close and the 30-week MA at this and the
/// previous index.
pub fn classify(close: f64, ma30: Option<f64>, ma30_prev: Option<f64>) -> StageLabel {
    let (Some(ma30), Some(ma30_prev)) = (ma30, ma30_prev) else {
        return StageLabel::Undetermined;
    };

    if close > ma30 && ma30 > ma30_prev {
        StageLabel::Advancing
    } else if close < ma30 && ma30 < ma30_prev {
        StageLabel::Declining
    } else {
        StageLabel::Undetermined
    }
}

/// One weekly bar with its classification context attached.
#[derive(Debug, Clone)]
pub struct ClassifiedWeek {
    pub bar: Bar,
    pub ma30: Option<f64>,
    pub stage: StageLabel,
    /// Smoothed relative strength on this week, when a benchmark overlaps.
    pub rs: Option<f64>,
    /// Rolling 52-week high of weekly highs.
    pub high_52w: Option<f64>,
}

/// Classify every bar of a weekly series.
///
/// Recomputed per call; nothing beyond the one-week MA30 lookback is carried
/// between indices.
pub fn classify_weekly(weekly: &BarSeries, rs: Option<&RsSeries>) -> Vec<ClassifiedWeek> {
    let bars = weekly.bars();
    let ma30 = calculate_sma(bars, MA30_PERIOD);

    let mut high_window: Vec<f64> = Vec::with_capacity(bars.len());
    let mut weeks = Vec::with_capacity(bars.len());

    for (i, bar) in bars.iter().enumerate() {
        high_window.push(bar.high);

        let ma = ma30.value_at(i);
        let ma_prev = if i > 0 { ma30.value_at(i - 1) } else { None };
        let stage = classify(bar.close, ma, ma_prev);

        let high_52w = if i + 1 >= HIGH_52W_PERIOD {
            high_window[i + 1 - HIGH_52W_PERIOD..=i]
                .iter()
                .copied()
                .reduce(f64::max)
        } else {
            None
        };

        weeks.push(ClassifiedWeek {
            bar: bar.clone(),
            ma30: ma,
            stage,
            rs: rs.and_then(|s| s.smoothed_on(bar.date)),
            high_52w,
        });
    }

    weeks
}
