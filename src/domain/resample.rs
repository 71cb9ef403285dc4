//! Daily → weekly bar resampling.
//!
//! Daily bars are grouped into exchange weeks ending on a configured weekday
//! (Friday for NSE). Per week: first open, max high, min low, last close,
//! summed volume. Weeks with no contributing daily bars are omitted — never
//! synthesized or forward-filled. The weekly bar is stamped with the
//! week-ending date.

use crate::domain::bar::{Bar, BarSeries, Timeframe};
use chrono::{Datelike, Days, NaiveDate, Weekday};

pub const DEFAULT_WEEK_END: Weekday = Weekday::Fri;

/// The week-ending date (on `week_end`) for the week containing `date`.
pub fn week_ending(date: NaiveDate, week_end: Weekday) -> NaiveDate {
    let days_ahead = (7 + week_end.num_days_from_monday() - date.weekday().num_days_from_monday())
        % 7;
    date.checked_add_days(Days::new(days_ahead as u64))
        .unwrap_or(date)
}

/// Resample a daily series into a weekly one.
pub fn to_weekly(daily: &BarSeries, week_end: Weekday) -> BarSeries {
    let mut weekly: Vec<Bar> = Vec::new();
    let mut current: Option<(NaiveDate, Bar)> = None;

    for bar in daily.bars() {
        let bucket = week_ending(bar.date, week_end);
        let same_week = current.as_ref().is_some_and(|(b, _)| *b == bucket);

        if same_week {
            if let Some((_, agg)) = current.as_mut() {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
        } else {
            if let Some((bucket_date, mut agg)) = current.take() {
                agg.date = bucket_date;
                weekly.push(agg);
            }
            current = Some((bucket, bar.clone()));
        }
    }

    if let Some((bucket_date, mut agg)) = current.take() {
        agg.date = bucket_date;
        weekly.push(agg);
    }

    BarSeries::from_clean_bars(daily.symbol.clone(), Timeframe::Weekly, weekly)
}
