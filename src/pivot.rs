//! 中枢与同级别分解线。
//!
//! 负责：
//! - 定义 `IsolationLine` / `Pivot`；
//! - 新段生成时落分解线；
//! - 由段内第 2、4 笔推导笔中枢，由最近四段推导段中枢。

use serde::{Deserialize, Serialize};

use crate::candle::MergedCandle;
use crate::constant::{Action, ChanError, Const, Trend};
use crate::chan::ChanCore;
use crate::segment::PriceBand;
use crate::utils::approx_eq_f64;

/// 同级别分解线：落在段左端K线上的结构边界标记。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IsolationLine {
    pub id: usize,
    pub candle: MergedCandle,
}

/// 中枢：一段价格重叠的交易区间。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub id: usize,
    pub left_candle: MergedCandle,
    pub right_candle: MergedCandle,
    pub high: f64,
    pub low: f64,
}

impl Pivot {
    pub fn price_range(&self) -> f64 {
        self.high - self.low
    }
}

/// 同向两条线（笔或段）的中枢价带。
///
/// `(left_left, left_right)` / `(right_left, right_right)` 是两条线的左右
/// 侧价。右线整体越过左线起点为无重叠；右线起点越过左线终点说明上层
/// 结构已经破坏，由调用方决定如何上报。
fn pivot_band(
    trend: Trend,
    left_left: f64,
    left_right: f64,
    right_left: f64,
    right_right: f64,
) -> Result<Option<PriceBand>, ()> {
    match trend {
        Trend::Bullish => {
            if right_left < left_left && right_right < left_left {
                return Ok(None);
            }
            if right_left >= left_right {
                return Err(());
            }
            Ok(Some(PriceBand {
                high: left_right.min(right_right),
                low: left_left.max(right_left),
            }))
        }
        Trend::Bearish => {
            if right_left > left_left && right_right > left_left {
                return Ok(None);
            }
            if right_left <= left_right {
                return Err(());
            }
            Ok(Some(PriceBand {
                high: left_left.min(right_left),
                low: left_right.max(right_right),
            }))
        }
    }
}

impl ChanCore {
    /// 新段生成后调用，在新段左端K线处落一条分解线。
    pub(crate) fn generate_isolation_line(&mut self) -> Action {
        let last_segment = self.segments.last().expect("segments not empty");
        self.isolation_lines.push(IsolationLine {
            id: self.isolation_lines.len(),
            candle: last_segment.left_candle,
        });
        Action::IsolationLineGenerated
    }

    /// 笔中枢：最新段含四笔以上时，取段内第 2、4 笔的重叠价带。
    ///
    /// 第 2、4 笔反向是段结构被破坏的信号，按内部一致性错误上报；
    /// 每段至多一个中枢，几何变化时原地修订。
    pub(crate) fn update_stroke_pivot(&mut self) -> Result<Action, ChanError> {
        let Some(last_segment) = self.segments.last() else {
            return Ok(Action::NothingChanged);
        };
        if last_segment.strokes_count() < Const::PIVOT_MINIMUM_STROKES {
            return Ok(Action::NothingChanged);
        }

        let stroke_2 = &self.strokes[last_segment.stroke_id_list[1]];
        let stroke_4 = &self.strokes[last_segment.stroke_id_list[3]];
        if stroke_2.trend != stroke_4.trend {
            return Err(ChanError::Inconsistency(format!(
                "stroke pivot: stroke {} and stroke {} in segment {} have mismatched trends",
                stroke_2.id, stroke_4.id, last_segment.id
            )));
        }

        let band = pivot_band(
            stroke_2.trend,
            stroke_2.left_price(),
            stroke_2.right_price(),
            stroke_4.left_price(),
            stroke_4.right_price(),
        )
        .map_err(|_| {
            ChanError::Inconsistency(format!(
                "stroke pivot: stroke {} starts beyond stroke {} range in segment {}",
                stroke_4.id, stroke_2.id, last_segment.id
            ))
        })?;
        let Some(band) = band else {
            return Ok(Action::NothingChanged);
        };

        let left_candle = stroke_2.left_candle;
        let right_candle = stroke_4.right_candle;

        if let Some(existing) = self.stroke_pivots.last_mut() {
            if existing.left_candle.id == left_candle.id {
                if existing.right_candle.id == right_candle.id
                    && approx_eq_f64(existing.high, band.high)
                    && approx_eq_f64(existing.low, band.low)
                {
                    return Ok(Action::NothingChanged);
                }
                existing.right_candle = right_candle;
                existing.high = band.high;
                existing.low = band.low;
                return Ok(Action::StrokePivotExtended);
            }
        }

        self.stroke_pivots.push(Pivot {
            id: self.stroke_pivots.len(),
            left_candle,
            right_candle,
            high: band.high,
            low: band.low,
        });
        Ok(Action::StrokePivotGenerated)
    }

    /// 段中枢：与笔中枢同构，上推一层作用在最近四段的第 2、4 段上。
    ///
    /// 段序列不保证严格交替，反向或越界只是不成枢，不作错误上报。
    pub(crate) fn update_segment_pivot(&mut self) -> Action {
        if self.segments.len() < Const::PIVOT_MINIMUM_SEGMENTS {
            return Action::NothingChanged;
        }

        let window = &self.segments[self.segments.len() - Const::PIVOT_MINIMUM_SEGMENTS..];
        let segment_2 = &window[1];
        let segment_4 = &window[3];
        if segment_2.trend != segment_4.trend {
            return Action::NothingChanged;
        }

        let band = match pivot_band(
            segment_2.trend,
            segment_2.left_price(),
            segment_2.right_price(),
            segment_4.left_price(),
            segment_4.right_price(),
        ) {
            Ok(Some(band)) => band,
            _ => return Action::NothingChanged,
        };

        let left_candle = segment_2.left_candle;
        let right_candle = segment_4.right_candle;

        if let Some(existing) = self.segment_pivots.last_mut() {
            if existing.left_candle.id == left_candle.id {
                if existing.right_candle.id == right_candle.id
                    && approx_eq_f64(existing.high, band.high)
                    && approx_eq_f64(existing.low, band.low)
                {
                    return Action::NothingChanged;
                }
                existing.right_candle = right_candle;
                existing.high = band.high;
                existing.low = band.low;
                return Action::SegmentPivotExtended;
            }
        }

        self.segment_pivots.push(Pivot {
            id: self.segment_pivots.len(),
            left_candle,
            right_candle,
            high: band.high,
            low: band.low,
        });
        Action::SegmentPivotGenerated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bullish_pivot_band_is_overlap_of_second_and_fourth() {
        // 第2笔 10 -> 14，第4笔 11 -> 16：中枢 [11, 14]。
        let band = pivot_band(Trend::Bullish, 10.0, 14.0, 11.0, 16.0)
            .expect("valid geometry")
            .expect("bands intersect");
        assert_eq!(band.low, 11.0);
        assert_eq!(band.high, 14.0);
    }

    #[test]
    fn bullish_pivot_without_overlap_yields_none() {
        // 第4笔整体低于第2笔起点。
        let band = pivot_band(Trend::Bullish, 10.0, 14.0, 7.0, 9.0).expect("valid geometry");
        assert!(band.is_none());
    }

    #[test]
    fn bullish_pivot_beyond_range_is_error() {
        // 第4笔起点越过第2笔终点。
        assert!(pivot_band(Trend::Bullish, 10.0, 14.0, 15.0, 18.0).is_err());
    }

    #[test]
    fn bearish_pivot_band_mirrors_bullish() {
        // 第2笔 14 -> 10，第4笔 13 -> 8：中枢 [10, 13]。
        let band = pivot_band(Trend::Bearish, 14.0, 10.0, 13.0, 8.0)
            .expect("valid geometry")
            .expect("bands intersect");
        assert_eq!(band.high, 13.0);
        assert_eq!(band.low, 10.0);
    }

    #[test]
    fn bearish_pivot_beyond_range_is_error() {
        assert!(pivot_band(Trend::Bearish, 14.0, 10.0, 9.0, 6.0).is_err());
    }
}
