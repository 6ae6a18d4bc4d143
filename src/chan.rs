//! 缠论推导核心。
//!
//! 负责：
//! - 持有全部派生结构的有序列表（唯一的可变入口）；
//! - 单步推进 `step`：合并K线 -> 分型 -> 笔 -> 线段 -> 分解线 / 中枢；
//! - 对外提供只读快照访问。

use crate::candle::{MergedCandle, OrdinaryCandle};
use crate::config::ChanConfig;
use crate::constant::{Action, ChanError};
use crate::fractal::Fractal;
use crate::pivot::{IsolationLine, Pivot};
use crate::segment::Segment;
use crate::stroke::Stroke;

/// 一次推进中各层产生的动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    pub candle: Action,
    pub fractal: Action,
    pub stroke: Action,
    pub segment: Action,
    pub isolation_line: Action,
    pub stroke_pivot: Action,
    pub segment_pivot: Action,
}

impl Default for StepReport {
    fn default() -> Self {
        Self {
            candle: Action::NothingChanged,
            fractal: Action::NothingChanged,
            stroke: Action::NothingChanged,
            segment: Action::NothingChanged,
            isolation_line: Action::NothingChanged,
            stroke_pivot: Action::NothingChanged,
            segment_pivot: Action::NothingChanged,
        }
    }
}

impl StepReport {
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// 聚合根。所有实体列表只能经由 `step` 变更；跨层引用一律是向前的
/// id / 下标，不持有所有权。
pub struct ChanCore {
    pub(crate) config: ChanConfig,
    pub(crate) merged_candles: Vec<MergedCandle>,
    pub(crate) fractals: Vec<Fractal>,
    pub(crate) strokes: Vec<Stroke>,
    pub(crate) segments: Vec<Segment>,
    pub(crate) isolation_lines: Vec<IsolationLine>,
    pub(crate) stroke_pivots: Vec<Pivot>,
    pub(crate) segment_pivots: Vec<Pivot>,
}

impl Default for ChanCore {
    fn default() -> Self {
        Self::new(ChanConfig::default())
    }
}

impl ChanCore {
    pub fn new(config: ChanConfig) -> Self {
        Self {
            config,
            merged_candles: Vec::new(),
            fractals: Vec::new(),
            strokes: Vec::new(),
            segments: Vec::new(),
            isolation_lines: Vec::new(),
            stroke_pivots: Vec::new(),
            segment_pivots: Vec::new(),
        }
    }

    /// 单步推进：一根普通K线走完整条流水线。
    ///
    /// 只有合并K线真正新增时才继续向下游推导；原地更新会短路本轮全部
    /// 下游计算。批量回放就是对本函数的逐根调用，两种喂入方式的最终
    /// 状态保证一致。
    pub fn step(&mut self, high: f64, low: f64) -> Result<StepReport, ChanError> {
        let mut report = StepReport::default();

        report.candle = self.update_merged_candle(OrdinaryCandle { high, low })?;
        if report.candle != Action::MergedCandleGenerated {
            return Ok(report);
        }

        report.fractal = self.update_fractal();

        report.stroke = self.update_stroke();
        if self.strokes.is_empty() {
            return Ok(report);
        }

        report.segment = self.update_segment()?;
        if report.segment == Action::SegmentGenerated {
            report.isolation_line = self.generate_isolation_line();
        }
        if self.segments.is_empty() {
            return Ok(report);
        }

        report.stroke_pivot = self.update_stroke_pivot()?;
        report.segment_pivot = self.update_segment_pivot();

        Ok(report)
    }

    pub fn config(&self) -> &ChanConfig {
        &self.config
    }

    pub fn merged_candles(&self) -> &[MergedCandle] {
        &self.merged_candles
    }

    pub fn fractals(&self) -> &[Fractal] {
        &self.fractals
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn isolation_lines(&self) -> &[IsolationLine] {
        &self.isolation_lines
    }

    pub fn stroke_pivots(&self) -> &[Pivot] {
        &self.stroke_pivots
    }

    pub fn segment_pivots(&self) -> &[Pivot] {
        &self.segment_pivots
    }
}
