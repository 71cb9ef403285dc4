//! Weinstein screening score for the latest classified week.
//!
//! Three boolean conditions, weighted 33.33 / 33.33 / 33.34 so the all-true
//! case lands on exactly 100 after rounding (naive equal thirds would give
//! 99 or 101). Missing MA30 means the week cannot be screened: every
//! condition defaults to false and the score is 0, with an explicit flag so
//! callers can tell "insufficient history" apart from a legitimately scored
//! zero.

use crate::domain::stage::{ClassifiedWeek, StageLabel};
use serde::Serialize;

/// Close must be within 5% of the week's high.
pub const LOW_RESISTANCE_MAX_GAP: f64 = 0.05;
/// Close must not be more than 20% above the 30-week MA.
pub const OVEREXTENSION_LIMIT: f64 = 0.20;

const STAGE_WEIGHT: f64 = 33.33;
const RESISTANCE_WEIGHT: f64 = 33.33;
const OVEREXTENSION_WEIGHT: f64 = 33.34;

#[derive(Debug, Clone, Serialize)]
pub struct WeinsteinScore {
    pub stage_condition: bool,
    pub low_resistance_condition: bool,
    pub not_overextended_condition: bool,
    /// True when MA30 was undefined for the scored week. The score is 0
    /// either way; this flag is the only way to tell the cases apart.
    pub insufficient_history: bool,
    pub score: u8,
}

/// Score a classified week against the three screening conditions.
pub fn score_week(week: &ClassifiedWeek) -> WeinsteinScore {
    let Some(ma30) = week.ma30 else {
        return WeinsteinScore {
            stage_condition: false,
            low_resistance_condition: false,
            not_overextended_condition: false,
            insufficient_history: true,
            score: 0,
        };
    };

    let close = week.bar.close;
    let stage_condition = week.stage == StageLabel::Advancing;
    let low_resistance_condition = (week.bar.high - close) / close < LOW_RESISTANCE_MAX_GAP;
    let not_overextended_condition = (close - ma30) / ma30 < OVEREXTENSION_LIMIT;

    let mut total = 0.0;
    if stage_condition {
        total += STAGE_WEIGHT;
    }
    if low_resistance_condition {
        total += RESISTANCE_WEIGHT;
    }
    if not_overextended_condition {
        total += OVEREXTENSION_WEIGHT;
    }

    WeinsteinScore {
        stage_condition,
        low_resistance_condition,
        not_overextended_condition,
        insufficient_history: false,
        score: total.round() as u8,
    }
}
