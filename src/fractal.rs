//! 分型检测。
//!
//! 负责：
//! - 定义 `Fractal` / `PotentialFractal`；
//! - 对最新三根合并K线做严格极值判定；
//! - 维护可修订的分型列表：丢弃、生成、确认。

use serde::{Deserialize, Serialize};

use crate::candle::MergedCandle;
use crate::constant::{Action, FractalPattern};
use crate::chan::ChanCore;

/// 分型。中间K线是局部极值点；边界分型缺少一侧K线。
///
/// 未确认的分型仍可能被后续行情丢弃；一旦确认几何不再修订。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fractal {
    pub id: usize,
    pub pattern: FractalPattern,
    pub left_candle: Option<MergedCandle>,
    pub middle_candle: MergedCandle,
    pub right_candle: Option<MergedCandle>,
    pub is_confirmed: bool,
}

impl Fractal {
    pub fn extreme_price(&self) -> f64 {
        match self.pattern {
            FractalPattern::Top => self.middle_candle.high,
            FractalPattern::Bottom => self.middle_candle.low,
        }
    }

    pub fn merged_id(&self) -> usize {
        self.middle_candle.id
    }

    pub fn ordinary_id(&self) -> usize {
        self.middle_candle.right_ordinary_id()
    }
}

/// 潜在分型：序列右端右侧未闭合的临时分型视图。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PotentialFractal {
    pub pattern: FractalPattern,
    pub candle: MergedCandle,
}

impl PotentialFractal {
    pub fn extreme_price(&self) -> f64 {
        match self.pattern {
            FractalPattern::Top => self.candle.high,
            FractalPattern::Bottom => self.candle.low,
        }
    }
}

/// 三根（或边界上两根）合并K线的分型判定。
///
/// 序列边界上缺少的一侧按潜在分型处理：只要已有的一侧满足严格高低关系
/// 即可给出模式。相邻合并K线非包含保证了两种边界写法等价。
pub(crate) fn fractal_pattern(
    left: Option<&MergedCandle>,
    middle: &MergedCandle,
    right: Option<&MergedCandle>,
) -> Option<FractalPattern> {
    let higher_than = |side: Option<&MergedCandle>| side.is_none_or(|c| middle.high > c.high);
    let lower_than = |side: Option<&MergedCandle>| side.is_none_or(|c| middle.low < c.low);

    if left.is_none() && right.is_none() {
        return None;
    }
    if higher_than(left) && higher_than(right) {
        return Some(FractalPattern::Top);
    }
    if lower_than(left) && lower_than(right) {
        return Some(FractalPattern::Bottom);
    }
    None
}

impl ChanCore {
    /// 序列右端的潜在分型：最新合并K线相对前一根的方向。
    pub fn potential_fractal(&self) -> Option<PotentialFractal> {
        let count = self.merged_candles.len();
        if count < 2 {
            return None;
        }
        let current = self.merged_candles[count - 1];
        let previous = &self.merged_candles[count - 2];
        if current.high > previous.high {
            Some(PotentialFractal {
                pattern: FractalPattern::Top,
                candle: current,
            })
        } else if current.low < previous.low {
            Some(PotentialFractal {
                pattern: FractalPattern::Bottom,
                candle: current,
            })
        } else {
            None
        }
    }

    /// 分型推进，在新合并K线生成后调用。
    ///
    /// 顺序：
    /// 1. 最新分型未确认且被最新K线顺向穿越 -> 丢弃；
    /// 2. 最新三根K线构成候选分型 -> 按首个 / 反向且距离足够 / 同向 分别
    ///    追加、确认前分型并追加、丢弃候选。
    pub(crate) fn update_fractal(&mut self) -> Action {
        let mut action = Action::NothingChanged;
        let count = self.merged_candles.len();

        if let Some(last_fractal) = self.fractals.last() {
            if !last_fractal.is_confirmed {
                let newest = &self.merged_candles[count - 1];
                let is_broken = match last_fractal.pattern {
                    FractalPattern::Top => newest.high >= last_fractal.middle_candle.high,
                    FractalPattern::Bottom => newest.low <= last_fractal.middle_candle.low,
                };
                if is_broken {
                    self.fractals.pop();
                    action = Action::FractalDropped;
                }
            }
        }

        if count < 3 {
            return action;
        }

        let left = self.merged_candles[count - 3];
        let middle = self.merged_candles[count - 2];
        let right = self.merged_candles[count - 1];
        let Some(pattern) = fractal_pattern(Some(&left), &middle, Some(&right)) else {
            return action;
        };

        if let Some(previous) = self.fractals.last() {
            // 同向候选永不追加；更极端的同向极值已在丢弃阶段让位。
            if pattern == previous.pattern {
                return action;
            }
            let distance = middle.id - previous.middle_candle.id;
            if distance < self.config.minimum_distance() {
                return action;
            }
        }

        // 接受新分型的同时确认它的前一个分型。
        if let Some(previous) = self.fractals.last_mut() {
            previous.is_confirmed = true;
        }
        self.fractals.push(Fractal {
            id: self.fractals.len(),
            pattern,
            left_candle: Some(left),
            middle_candle: middle,
            right_candle: Some(right),
            is_confirmed: false,
        });
        Action::FractalGenerated
    }
}
