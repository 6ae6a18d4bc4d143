//! 普通K线与合并K线。
//!
//! 负责：
//! - 定义 `OrdinaryCandle` / `MergedCandle`；
//! - 包含关系判定；
//! - 基于包含关系的增量合并（`ChanCore::update_merged_candle`）。

use serde::{Deserialize, Serialize};

use crate::constant::{Action, ChanError};
use crate::chan::ChanCore;

/// 普通K线。只保留高低点，开收盘价在缠论合并中无意义。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrdinaryCandle {
    pub high: f64,
    pub low: f64,
}

impl OrdinaryCandle {
    /// 两根K线的九种高低关系中，只有双双严格同向（高高且低低）是非包含。
    pub fn is_inclusive(&self, other: &Self) -> bool {
        !((self.high > other.high && self.low > other.low)
            || (self.high < other.high && self.low < other.low))
    }
}

/// 合并K线。`period` 根连续普通K线在包含关系下收敛成的一根。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MergedCandle {
    pub id: usize,
    pub high: f64,
    pub low: f64,
    pub period: usize,
    pub left_ordinary_id: usize,
}

impl MergedCandle {
    pub fn right_ordinary_id(&self) -> usize {
        self.left_ordinary_id + self.period - 1
    }

    pub fn is_inclusive(&self, other: &OrdinaryCandle) -> bool {
        !((self.high > other.high && self.low > other.low)
            || (self.high < other.high && self.low < other.low))
    }
}

impl ChanCore {
    /// 合并K线推进。
    ///
    /// 非包含：追加新合并K线，返回 `MergedCandleGenerated`。
    /// 包含：原地延展最后一根，返回 `MergedCandleUpdated`。延展方向由最后
    /// 两根合并K线的相对位置决定；两者互相包含按构造不可能出现，一旦出现
    /// 即为内部一致性错误。
    pub(crate) fn update_merged_candle(
        &mut self,
        ordinary_candle: OrdinaryCandle,
    ) -> Result<Action, ChanError> {
        let count = self.merged_candles.len();

        if count == 0 {
            self.merged_candles.push(MergedCandle {
                id: 0,
                high: ordinary_candle.high,
                low: ordinary_candle.low,
                period: 1,
                left_ordinary_id: 0,
            });
            return Ok(Action::MergedCandleGenerated);
        }

        if !self.merged_candles[count - 1].is_inclusive(&ordinary_candle) {
            let left_ordinary_id = self.merged_candles[count - 1].right_ordinary_id() + 1;
            self.merged_candles.push(MergedCandle {
                id: count,
                high: ordinary_candle.high,
                low: ordinary_candle.low,
                period: 1,
                left_ordinary_id,
            });
            return Ok(Action::MergedCandleGenerated);
        }

        // 有包含关系，先确定延展方向。
        if count == 1 {
            let last = &mut self.merged_candles[0];
            last.high = last.high.max(ordinary_candle.high);
            last.low = last.low.min(ordinary_candle.low);
            last.period += 1;
            return Ok(Action::MergedCandleUpdated);
        }

        let prev = self.merged_candles[count - 2];
        let last = &mut self.merged_candles[count - 1];

        if last.high > prev.high && last.low > prev.low {
            // 上行：取 高-高。
            last.high = last.high.max(ordinary_candle.high);
            last.low = last.low.max(ordinary_candle.low);
            last.period += 1;
            Ok(Action::MergedCandleUpdated)
        } else if last.high < prev.high && last.low < prev.low {
            // 下行：取 低-低。
            last.high = last.high.min(ordinary_candle.high);
            last.low = last.low.min(ordinary_candle.low);
            last.period += 1;
            Ok(Action::MergedCandleUpdated)
        } else {
            Err(ChanError::Inconsistency(format!(
                "consecutive merged candles are mutually inclusive: \
                 prev high={}, low={}; last high={}, low={}",
                prev.high, prev.low, last.high, last.low
            )))
        }
    }
}
