//! 笔的构建。
//!
//! 负责：
//! - 定义 `Stroke`；
//! - 首笔的向前穷举（距离、分型、反向、价带四重检验）；
//! - 顺向延伸与反向生成。

use serde::{Deserialize, Serialize};

use crate::candle::MergedCandle;
use crate::constant::{Action, FractalPattern, Trend};
use crate::chan::ChanCore;
use crate::fractal::fractal_pattern;

/// 笔。锚定在两个反向分型的中间K线上，左右价由趋势方向决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: usize,
    pub trend: Trend,
    pub left_candle: MergedCandle,
    pub right_candle: MergedCandle,
}

impl Stroke {
    pub fn left_price(&self) -> f64 {
        match self.trend {
            Trend::Bullish => self.left_candle.low,
            Trend::Bearish => self.left_candle.high,
        }
    }

    pub fn right_price(&self) -> f64 {
        match self.trend {
            Trend::Bullish => self.right_candle.high,
            Trend::Bearish => self.right_candle.low,
        }
    }

    pub fn period(&self) -> usize {
        self.right_candle.id - self.left_candle.id
    }

    pub fn price_range(&self) -> f64 {
        self.right_price() - self.left_price()
    }
}

impl ChanCore {
    /// 笔推进：无笔时尝试首笔；有笔时先顺向延伸，失败再尝试反向生成。
    pub(crate) fn update_stroke(&mut self) -> Action {
        if self.strokes.is_empty() {
            return self.generate_first_stroke();
        }

        let action = self.extend_stroke();
        if action == Action::StrokeExtended {
            return action;
        }
        self.generate_following_stroke()
    }

    /// 首笔。最新合并K线作为右侧潜在分型，自最左端向右穷举左侧候选：
    /// 距离不足即止（再往右只会更近）；候选须构成分型、与右侧反向，且
    /// 两个分型之间没有任何合并K线刺穿两端极值围成的价带。
    fn generate_first_stroke(&mut self) -> Action {
        let minimum_distance = self.config.minimum_distance();
        if self.merged_candles.len() < minimum_distance + 1 {
            return Action::NothingChanged;
        }

        let Some(right_potential) = self.potential_fractal() else {
            return Action::NothingChanged;
        };
        let right_candle = right_potential.candle;

        for middle_id in 0..right_candle.id {
            let distance = right_candle.id - middle_id;
            if distance < minimum_distance {
                break;
            }

            let left = middle_id.checked_sub(1).map(|i| &self.merged_candles[i]);
            let middle = &self.merged_candles[middle_id];
            let right = &self.merged_candles[middle_id + 1];
            let Some(left_pattern) = fractal_pattern(left, middle, Some(right)) else {
                continue;
            };
            if left_pattern == right_potential.pattern {
                continue;
            }

            // 价带：两端极值之间不允许中途刺穿。
            let (band_low, band_high) = match right_potential.pattern {
                FractalPattern::Top => (middle.low, right_candle.high),
                FractalPattern::Bottom => (right_candle.low, middle.high),
            };
            let breached = self.merged_candles[middle_id + 1..right_candle.id]
                .iter()
                .any(|candle| candle.low < band_low || candle.high > band_high);
            if breached {
                continue;
            }

            let trend = if left_pattern == FractalPattern::Bottom {
                Trend::Bullish
            } else {
                Trend::Bearish
            };
            self.strokes.push(Stroke {
                id: 0,
                trend,
                left_candle: *middle,
                right_candle,
            });
            return Action::StrokeGenerated;
        }

        Action::NothingChanged
    }

    /// 顺向延伸：最新合并K线顺向达到或超越最新笔的右侧价时，右锚换到该
    /// K线。右锚已是最新K线时不做任何事。
    fn extend_stroke(&mut self) -> Action {
        let last_candle = *self.merged_candles.last().expect("candles not empty");
        let last_stroke = self.strokes.last_mut().expect("strokes not empty");

        if last_stroke.right_candle.id == last_candle.id {
            return Action::NothingChanged;
        }

        let reaches = match last_stroke.trend {
            Trend::Bullish => last_candle.high >= last_stroke.right_price(),
            Trend::Bearish => last_candle.low <= last_stroke.right_price(),
        };
        if reaches {
            last_stroke.right_candle = last_candle;
            Action::StrokeExtended
        } else {
            Action::NothingChanged
        }
    }

    /// 反向生成：最新合并K线构成反向潜在分型、距离足够，且其回撤没有
    /// 触及最新笔的右侧价、本身是回撤区间的极值。
    fn generate_following_stroke(&mut self) -> Action {
        let minimum_distance = self.config.minimum_distance();
        let last_candle = *self.merged_candles.last().expect("candles not empty");
        let last_stroke = self.strokes.last().expect("strokes not empty");

        let distance = last_candle.id - last_stroke.right_candle.id;
        if distance < minimum_distance {
            return Action::NothingChanged;
        }

        let Some(potential) = self.potential_fractal() else {
            return Action::NothingChanged;
        };

        let span = &self.merged_candles[last_stroke.right_candle.id + 1..=last_candle.id];
        let previous = &self.merged_candles[last_candle.id - 1];

        let reversal_ok = match (last_stroke.trend, potential.pattern) {
            (Trend::Bullish, FractalPattern::Bottom) => {
                let envelope_high = previous.high.max(last_candle.high);
                let span_low = span.iter().map(|c| c.low).fold(f64::MAX, f64::min);
                envelope_high < last_stroke.right_price() && last_candle.low <= span_low
            }
            (Trend::Bearish, FractalPattern::Top) => {
                let envelope_low = previous.low.min(last_candle.low);
                let span_high = span.iter().map(|c| c.high).fold(f64::MIN, f64::max);
                envelope_low > last_stroke.right_price() && last_candle.high >= span_high
            }
            _ => false,
        };
        if !reversal_ok {
            return Action::NothingChanged;
        }

        let new_stroke = Stroke {
            id: self.strokes.len(),
            trend: last_stroke.trend.opposite(),
            left_candle: last_stroke.right_candle,
            right_candle: last_candle,
        };
        self.strokes.push(new_stroke);
        Action::StrokeGenerated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChanConfig;

    fn feed(core: &mut ChanCore, series: &[(f64, f64)]) {
        for &(high, low) in series {
            core.step(high, low).expect("step must succeed");
        }
    }

    /// 10 -> 4 的单边下跌再回升：首笔应为下降笔，锚定在峰与谷。
    fn descending_then_rising() -> Vec<(f64, f64)> {
        [10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 5.0, 6.0, 7.0, 8.0]
            .iter()
            .map(|p| (p + 0.4, p - 0.4))
            .collect()
    }

    #[test]
    fn first_stroke_connects_opposite_fractals() {
        let mut core = ChanCore::new(ChanConfig::default());
        feed(&mut core, &descending_then_rising()[..8]);

        let strokes = core.strokes();
        assert_eq!(strokes.len(), 1);
        let stroke = &strokes[0];
        assert_eq!(stroke.trend, Trend::Bearish);
        assert_eq!(stroke.left_candle.id, 0);
        assert!(stroke.period() >= core.config().minimum_distance());
        assert_eq!(stroke.right_price(), 3.6);
    }

    #[test]
    fn first_stroke_needs_minimum_candles() {
        let mut core = ChanCore::new(ChanConfig::default());
        feed(&mut core, &descending_then_rising()[..4]);
        assert!(core.strokes().is_empty());
    }

    #[test]
    fn stroke_extends_when_price_advances_in_trend() {
        let mut core = ChanCore::new(ChanConfig::default());
        let mut series = descending_then_rising()[..8].to_vec();
        feed(&mut core, &series);
        let before = core.strokes()[0].clone();

        // 继续下破：右锚应跟随新低。
        series.clear();
        series.push((3.4, 2.6));
        feed(&mut core, &series);

        let after = &core.strokes()[0];
        assert_eq!(core.strokes().len(), 1);
        assert_eq!(after.trend, Trend::Bearish);
        assert!(after.right_candle.id > before.right_candle.id);
        assert_eq!(after.right_price(), 2.6);
    }

    #[test]
    fn following_stroke_reverses_trend() {
        let mut core = ChanCore::new(ChanConfig::default());
        feed(&mut core, &descending_then_rising());

        let strokes = core.strokes();
        assert_eq!(strokes.len(), 2);
        assert_eq!(strokes[0].trend, Trend::Bearish);
        assert_eq!(strokes[1].trend, Trend::Bullish);
        // 相邻笔共享锚点。
        assert_eq!(
            strokes[0].right_candle.id,
            strokes[1].left_candle.id
        );
        assert!(
            strokes[1].period() >= core.config().minimum_distance(),
            "following stroke must honor minimum distance"
        );
    }

    #[test]
    fn stroke_trends_alternate_over_long_series() {
        let mut core = ChanCore::new(ChanConfig::default());
        let wave = [
            10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 10.0, 9.0,
            8.0, 7.0, 6.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 11.0, 10.0, 9.0, 8.0, 7.0,
        ];
        let series: Vec<_> = wave.iter().map(|p| (p + 0.4, p - 0.4)).collect();
        feed(&mut core, &series);

        let strokes = core.strokes();
        assert!(strokes.len() >= 3, "fixture must produce several strokes");
        for pair in strokes.windows(2) {
            assert_ne!(pair[0].trend, pair[1].trend);
            assert_eq!(pair[0].right_candle.id, pair[1].left_candle.id);
        }
    }
}
