//! Composite daily confidence score and indicator cross states.
//!
//! Four independent binary components over the latest daily indicator row,
//! +25 each: RSI in the neutral 30-70 band (non-extreme momentum, distinct
//! from the weekly resistance check), MACD above its signal, EMA21 above
//! EMA44, and close above EMA200. An undefined input zeroes its component.
//! The total is the plain sum, so it is always one of 0/25/50/75/100.

use crate::domain::frame::{IndicatorFrame, IndicatorRow};
use serde::Serialize;

pub const COMPONENT_WEIGHT: u8 = 25;
pub const RSI_NEUTRAL_LOW: f64 = 30.0;
pub const RSI_NEUTRAL_HIGH: f64 = 70.0;

#[derive(Debug, Clone, Serialize)]
pub struct ConfidenceScore {
    pub rsi_component: u8,
    pub macd_component: u8,
    pub ema_cross_component: u8,
    pub ema200_component: u8,
    pub total: u8,
}

/// Score the latest row of a daily indicator frame.
pub fn score_row(row: &IndicatorRow) -> ConfidenceScore {
    let rsi_component = component(
        row.rsi_14
            .map(|rsi| (RSI_NEUTRAL_LOW..=RSI_NEUTRAL_HIGH).contains(&rsi)),
    );
    let macd_component = component(
        row.macd
            .zip(row.macd_signal)
            .map(|(macd, signal)| macd > signal),
    );
    let ema_cross_component = component(
        row.ema_21
            .zip(row.ema_44)
            .map(|(short, medium)| short > medium),
    );
    let ema200_component = component(row.ema_200.map(|ema| row.close > ema));

    ConfidenceScore {
        rsi_component,
        macd_component,
        ema_cross_component,
        ema200_component,
        total: rsi_component + macd_component + ema_cross_component + ema200_component,
    }
}

fn component(predicate: Option<bool>) -> u8 {
    match predicate {
        Some(true) => COMPONENT_WEIGHT,
        // Undefined inputs score 0, same as a failed predicate.
        Some(false) | None => 0,
    }
}

/// MACD line position relative to its signal, with fresh crossings called out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MacdCross {
    /// Line crossed above the signal on the latest bar.
    BullishCross,
    Bullish,
    /// Line crossed below the signal on the latest bar.
    BearishCross,
    Bearish,
    Neutral,
}

/// Price position relative to one EMA, with fresh crossings called out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceCross {
    /// Close crossed above the EMA on the latest bar.
    CrossedAbove,
    Above,
    Below,
    Undefined,
}

/// Classify the MACD/signal relationship from the last two frame rows.
pub fn macd_cross(frame: &IndicatorFrame) -> MacdCross {
    let Some(latest) = frame.latest() else {
        return MacdCross::Neutral;
    };
    let (Some(macd), Some(signal)) = (latest.macd, latest.macd_signal) else {
        return MacdCross::Neutral;
    };

    let prev = frame
        .previous()
        .and_then(|row| row.macd.zip(row.macd_signal));

    match prev {
        Some((prev_macd, prev_signal)) => {
            if macd > signal && prev_macd <= prev_signal {
                MacdCross::BullishCross
            } else if macd < signal && prev_macd >= prev_signal {
                MacdCross::BearishCross
            } else if macd > signal {
                MacdCross::Bullish
            } else if macd < signal {
                MacdCross::Bearish
            } else {
                MacdCross::Neutral
            }
        }
        None => {
            if macd > signal {
                MacdCross::Bullish
            } else if macd < signal {
                MacdCross::Bearish
            } else {
                MacdCross::Neutral
            }
        }
    }
}

/// Classify the close/EMA relationship from the last two frame rows.
pub fn price_cross(frame: &IndicatorFrame, ema_of: fn(&IndicatorRow) -> Option<f64>) -> PriceCross {
    let Some(latest) = frame.latest() else {
        return PriceCross::Undefined;
    };
    let Some(ema) = ema_of(latest) else {
        return PriceCross::Undefined;
    };

    if latest.close > ema {
        let crossed = frame
            .previous()
            .and_then(|prev| ema_of(prev).map(|prev_ema| prev.close <= prev_ema))
            .unwrap_or(false);
        if crossed {
            PriceCross::CrossedAbove
        } else {
            PriceCross::Above
        }
    } else {
        PriceCross::Below
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(
        close: f64,
        rsi: Option<f64>,
        macd: Option<f64>,
        signal: Option<f64>,
        ema_21: Option<f64>,
        ema_44: Option<f64>,
        ema_200: Option<f64>,
    ) -> IndicatorRow {
        IndicatorRow {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            close,
            ema_21,
            ema_44,
            ema_200,
            rsi_14: rsi,
            macd,
            macd_signal: signal,
            macd_hist: macd.zip(signal).map(|(m, s)| m - s),
        }
    }

    #[test]
    fn all_bullish_scores_100() {
        let result = score_row(&row(
            110.0,
            Some(55.0),
            Some(1.2),
            Some(0.8),
            Some(108.0),
            Some(105.0),
            Some(100.0),
        ));

        assert_eq!(result.rsi_component, 25);
        assert_eq!(result.macd_component, 25);
        assert_eq!(result.ema_cross_component, 25);
        assert_eq!(result.ema200_component, 25);
        assert_eq!(result.total, 100);
    }

    #[test]
    fn extreme_rsi_loses_its_component() {
        let overbought = score_row(&row(
            110.0,
            Some(82.0),
            Some(1.2),
            Some(0.8),
            Some(108.0),
            Some(105.0),
            Some(100.0),
        ));
        assert_eq!(overbought.rsi_component, 0);
        assert_eq!(overbought.total, 75);

        let oversold = score_row(&row(
            110.0,
            Some(22.0),
            Some(1.2),
            Some(0.8),
            Some(108.0),
            Some(105.0),
            Some(100.0),
        ));
        assert_eq!(oversold.rsi_component, 0);
    }

    #[test]
    fn rsi_band_bounds_are_inclusive() {
        let low_edge = score_row(&row(100.0, Some(30.0), None, None, None, None, None));
        assert_eq!(low_edge.rsi_component, 25);

        let high_edge = score_row(&row(100.0, Some(70.0), None, None, None, None, None));
        assert_eq!(high_edge.rsi_component, 25);
    }

    #[test]
    fn undefined_inputs_score_zero_components() {
        let result = score_row(&row(110.0, None, None, None, None, None, None));

        assert_eq!(result.rsi_component, 0);
        assert_eq!(result.macd_component, 0);
        assert_eq!(result.ema_cross_component, 0);
        assert_eq!(result.ema200_component, 0);
        assert_eq!(result.total, 0);
    }

    #[test]
    fn total_is_quantized() {
        let combos = [
            row(110.0, Some(50.0), None, None, None, None, None),
            row(
                110.0,
                Some(50.0),
                Some(1.0),
                Some(0.5),
                None,
                None,
                None,
            ),
            row(
                110.0,
                Some(50.0),
                Some(1.0),
                Some(0.5),
                Some(109.0),
                Some(104.0),
                None,
            ),
        ];
        let expected = [25u8, 50, 75];

        for (r, want) in combos.iter().zip(expected) {
            assert_eq!(score_row(r).total, want);
        }
    }

    fn frame_of(rows: Vec<IndicatorRow>) -> IndicatorFrame {
        IndicatorFrame { rows }
    }

    #[test]
    fn macd_fresh_cross_is_distinguished() {
        let frame = frame_of(vec![
            row(100.0, None, Some(0.4), Some(0.5), None, None, None),
            row(101.0, None, Some(0.7), Some(0.5), None, None, None),
        ]);
        assert_eq!(macd_cross(&frame), MacdCross::BullishCross);

        let frame = frame_of(vec![
            row(100.0, None, Some(0.7), Some(0.5), None, None, None),
            row(101.0, None, Some(0.9), Some(0.6), None, None, None),
        ]);
        assert_eq!(macd_cross(&frame), MacdCross::Bullish);

        let frame = frame_of(vec![
            row(100.0, None, Some(0.7), Some(0.5), None, None, None),
            row(101.0, None, Some(0.3), Some(0.5), None, None, None),
        ]);
        assert_eq!(macd_cross(&frame), MacdCross::BearishCross);
    }

    #[test]
    fn macd_undefined_is_neutral() {
        let frame = frame_of(vec![row(100.0, None, None, None, None, None, None)]);
        assert_eq!(macd_cross(&frame), MacdCross::Neutral);
    }

    #[test]
    fn price_cross_ladder() {
        let ema21 = |r: &IndicatorRow| r.ema_21;

        let frame = frame_of(vec![
            row(100.0, None, None, None, Some(101.0), None, None),
            row(105.0, None, None, None, Some(102.0), None, None),
        ]);
        assert_eq!(price_cross(&frame, ema21), PriceCross::CrossedAbove);

        let frame = frame_of(vec![
            row(104.0, None, None, None, Some(101.0), None, None),
            row(105.0, None, None, None, Some(102.0), None, None),
        ]);
        assert_eq!(price_cross(&frame, ema21), PriceCross::Above);

        let frame = frame_of(vec![
            row(104.0, None, None, None, Some(101.0), None, None),
            row(100.0, None, None, None, Some(102.0), None, None),
        ]);
        assert_eq!(price_cross(&frame, ema21), PriceCross::Below);

        let frame = frame_of(vec![row(104.0, None, None, None, None, None, None)]);
        assert_eq!(price_cross(&frame, ema21), PriceCross::Undefined);
    }
}
