//! 线段的构建。
//!
//! 负责：
//! - 定义 `Segment` 与笔间重叠价带；
//! - 首段识别；
//! - 按最新笔与段内右侧笔的 id 距离分派：延伸、扩张、反向、跳空。

use serde::{Deserialize, Serialize};

use crate::candle::MergedCandle;
use crate::constant::{Action, ChanError, Const, Trend};
use crate::chan::ChanCore;
use crate::stroke::Stroke;

/// 两笔重叠区间。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBand {
    pub high: f64,
    pub low: f64,
}

/// 线段。`stroke_id_list` 为段内笔的有序 id 列表，最少三笔。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub id: usize,
    pub trend: Trend,
    pub left_candle: MergedCandle,
    pub right_candle: MergedCandle,
    pub stroke_id_list: Vec<usize>,
}

impl Segment {
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

    pub fn strokes_count(&self) -> usize {
        self.stroke_id_list.len()
    }
}

/// 同向两笔的重叠价带。
///
/// 右笔两端都越过左笔起点（顺自身趋势方向）则无重叠；否则上升取
/// （左侧价高者，右侧价低者），下降镜像。空区间视同无重叠。
pub(crate) fn stroke_overlap(left: &Stroke, right: &Stroke) -> Option<PriceBand> {
    if left.trend != right.trend {
        return None;
    }

    let band = match right.trend {
        Trend::Bullish => {
            if right.left_price() < left.left_price() && right.right_price() < left.left_price() {
                return None;
            }
            PriceBand {
                high: left.right_price().min(right.right_price()),
                low: left.left_price().max(right.left_price()),
            }
        }
        Trend::Bearish => {
            if right.left_price() > left.left_price() && right.right_price() > left.left_price() {
                return None;
            }
            PriceBand {
                high: left.left_price().min(right.left_price()),
                low: left.right_price().max(right.right_price()),
            }
        }
    };

    (band.high > band.low).then_some(band)
}

impl ChanCore {
    /// 线段推进。无段时尝试首段；有段时按 Δ 分派。
    pub(crate) fn update_segment(&mut self) -> Result<Action, ChanError> {
        if self.segments.is_empty() {
            return Ok(self.generate_first_segment());
        }

        let last_stroke_id = self.strokes.last().expect("strokes not empty").id;
        let terminal_id = *self
            .segments
            .last()
            .expect("segments not empty")
            .stroke_id_list
            .last()
            .expect("segment holds strokes");

        match last_stroke_id - terminal_id {
            0 => Ok(self.extend_segment()),
            1 => Ok(Action::NothingChanged),
            2 => Ok(self.expand_segment()),
            3 => Ok(self.generate_following_segment()),
            _ => Ok(self.generate_gap_segment()),
        }
    }

    /// 首段：最新三笔中左右两笔重叠即成段，方向取其共同趋势。
    fn generate_first_segment(&mut self) -> Action {
        let count = self.strokes.len();
        if count < Const::SEGMENT_MINIMUM_STROKES {
            return Action::NothingChanged;
        }

        let left = &self.strokes[count - 3];
        let middle = &self.strokes[count - 2];
        let right = &self.strokes[count - 1];
        if stroke_overlap(left, right).is_none() {
            return Action::NothingChanged;
        }

        let new_segment = Segment {
            id: self.segments.len(),
            trend: right.trend,
            left_candle: left.left_candle,
            right_candle: right.right_candle,
            stroke_id_list: vec![left.id, middle.id, right.id],
        };
        self.segments.push(new_segment);
        Action::SegmentGenerated
    }

    /// Δ=0：段内右侧笔自身又被延伸，顺向达到或超越段右侧价时右边界跟进。
    fn extend_segment(&mut self) -> Action {
        let last_stroke = self.strokes.last().expect("strokes not empty").clone();
        let last_segment = self.segments.last_mut().expect("segments not empty");

        if last_stroke.trend != last_segment.trend {
            return Action::NothingChanged;
        }
        let reaches = match last_segment.trend {
            Trend::Bullish => last_stroke.right_price() >= last_segment.right_price(),
            Trend::Bearish => last_stroke.right_price() <= last_segment.right_price(),
        };
        if !reaches {
            return Action::NothingChanged;
        }
        if last_segment.right_candle.id == last_stroke.right_candle.id {
            return Action::NothingChanged;
        }

        last_segment.right_candle = last_stroke.right_candle;
        Action::SegmentExtended
    }

    /// Δ=2（及跳空兜底）：最新笔与段内右侧笔同向且顺向达到或超越其右侧
    /// 价，段吸收中间的笔。
    fn expand_segment(&mut self) -> Action {
        let last_stroke = self.strokes.last().expect("strokes not empty").clone();
        let last_segment = self.segments.last().expect("segments not empty");
        let terminal_id = *last_segment.stroke_id_list.last().expect("non-empty");
        let terminal_stroke = &self.strokes[terminal_id];

        if last_stroke.trend != terminal_stroke.trend {
            return Action::NothingChanged;
        }
        let reaches = match last_stroke.trend {
            Trend::Bullish => last_stroke.right_price() >= terminal_stroke.right_price(),
            Trend::Bearish => last_stroke.right_price() <= terminal_stroke.right_price(),
        };
        if !reaches {
            return Action::NothingChanged;
        }

        let last_segment = self.segments.last_mut().expect("segments not empty");
        last_segment
            .stroke_id_list
            .extend(terminal_id + 1..=last_stroke.id);
        last_segment.right_candle = last_stroke.right_candle;
        Action::SegmentExpanded
    }

    /// Δ=3：反向检验。最新三笔不再创出段方向的新极值，并且创出左侧笔的
    /// 反向新极值、或未能重新测试段内右侧笔的起点，则生成反向新段。
    fn generate_following_segment(&mut self) -> Action {
        let count = self.strokes.len();
        let last_segment = self.segments.last().expect("segments not empty");
        let terminal_id = *last_segment.stroke_id_list.last().expect("non-empty");
        let terminal_stroke = &self.strokes[terminal_id];

        let left = &self.strokes[count - 3];
        let middle = &self.strokes[count - 2];
        let right = &self.strokes[count - 1];

        let reverses = match last_segment.trend {
            Trend::Bullish => {
                right.trend == Trend::Bearish
                    && right.left_price() < left.left_price()
                    && (right.right_price() <= left.right_price()
                        || left.right_price() < terminal_stroke.left_price())
            }
            Trend::Bearish => {
                right.trend == Trend::Bullish
                    && right.left_price() > left.left_price()
                    && (right.right_price() >= left.right_price()
                        || left.right_price() > terminal_stroke.left_price())
            }
        };
        if !reverses {
            return Action::NothingChanged;
        }

        let new_segment = Segment {
            id: self.segments.len(),
            trend: right.trend,
            left_candle: left.left_candle,
            right_candle: right.right_candle,
            stroke_id_list: vec![left.id, middle.id, right.id],
        };
        self.segments.push(new_segment);
        Action::SegmentGenerated
    }

    /// Δ>3：跳空处理。偶数 Δ 先按扩张兜底；随后检验最新笔对向左第三笔
    /// 的顺向突破，按与旧段同向与否补段或扩张。
    fn generate_gap_segment(&mut self) -> Action {
        let last_stroke_id = self.strokes.last().expect("strokes not empty").id;
        let terminal_id = *self
            .segments
            .last()
            .expect("segments not empty")
            .stroke_id_list
            .last()
            .expect("non-empty");

        if (last_stroke_id - terminal_id) % 2 == 0 {
            let action = self.expand_segment();
            if action == Action::SegmentExpanded {
                return action;
            }
        }

        let count = self.strokes.len();
        let right = self.strokes[count - 1].clone();
        let left = self.strokes[count - 3].clone();

        let breakout = match right.trend {
            Trend::Bullish => {
                right.left_price() >= left.left_price() && right.right_price() > left.right_price()
            }
            Trend::Bearish => {
                right.left_price() <= left.left_price() && right.right_price() < left.right_price()
            }
        };
        if !breakout {
            return Action::NothingChanged;
        }

        let last_segment = self.segments.last().expect("segments not empty");
        if right.trend == last_segment.trend {
            if left.id - terminal_id == 2 {
                // 与段只隔一笔，整体吸收到最新笔。
                let last_segment = self.segments.last_mut().expect("segments not empty");
                last_segment
                    .stroke_id_list
                    .extend(terminal_id + 1..=right.id);
                last_segment.right_candle = right.right_candle;
                return Action::SegmentExpanded;
            }

            // 缺口更宽：补一根反向的过渡段，终点落在缺口内最后一笔。
            let stroke_id_list: Vec<usize> = (terminal_id + 1..left.id).collect();
            if stroke_id_list.len() < Const::SEGMENT_MINIMUM_STROKES {
                return Action::NothingChanged;
            }
            let right_edge = self.strokes[*stroke_id_list.last().expect("non-empty")]
                .right_candle;
            let new_segment = Segment {
                id: self.segments.len(),
                trend: last_segment.trend.opposite(),
                left_candle: last_segment.right_candle,
                right_candle: right_edge,
                stroke_id_list,
            };
            self.segments.push(new_segment);
            Action::SegmentGenerated
        } else {
            let new_segment = Segment {
                id: self.segments.len(),
                trend: right.trend,
                left_candle: last_segment.right_candle,
                right_candle: right.right_candle,
                stroke_id_list: (terminal_id + 1..=right.id).collect(),
            };
            self.segments.push(new_segment);
            Action::SegmentGenerated
        }
    }
}
