//! 对外分析入口。
//!
//! 该模块负责：
//! - 包装 `ChanCore`，对外提供逐根与批量两种喂入方式（同一个 step）；
//! - 将每层动作转成事件通知与 tracing 日志；
//! - 导出最新状态快照。

use tracing::{debug, info};

use crate::candle::MergedCandle;
use crate::config::ChanConfig;
use crate::constant::{Action, ChanError, EventType};
use crate::chan::{ChanCore, StepReport};
use crate::events::{EventPayload, Observable, Subscriber};
use crate::fractal::Fractal;
use crate::pivot::{IsolationLine, Pivot};
use crate::segment::Segment;
use crate::stroke::Stroke;

/// 各层最新一条记录的快照。
#[derive(Debug, Clone)]
pub struct StructureSnapshot {
    pub merged_candle: Option<MergedCandle>,
    pub fractal: Option<Fractal>,
    pub stroke: Option<Stroke>,
    pub segment: Option<Segment>,
    pub isolation_line: Option<IsolationLine>,
    pub stroke_pivot: Option<Pivot>,
    pub segment_pivot: Option<Pivot>,
}

pub struct ChanEngine {
    core: ChanCore,
    observable: Observable,
}

impl Default for ChanEngine {
    fn default() -> Self {
        Self::new(ChanConfig::default())
    }
}

impl ChanEngine {
    pub fn new(config: ChanConfig) -> Self {
        Self {
            core: ChanCore::new(config),
            observable: Observable::default(),
        }
    }

    pub fn subscribe(&mut self, event_type: Option<EventType>, subscriber: Subscriber) {
        self.observable.subscribe(event_type, subscriber);
    }

    /// 逐根喂入（动态模式）。
    pub fn on_candle(&mut self, high: f64, low: f64) -> Result<StepReport, ChanError> {
        let report = self.core.step(high, low)?;
        self.trace(&report);
        self.dispatch(&report);
        Ok(report)
    }

    /// 批量回放（静态模式）：对同一 step 的逐根调用。
    pub fn replay(&mut self, series: &[(f64, f64)]) -> Result<Vec<StepReport>, ChanError> {
        let mut reports = Vec::with_capacity(series.len());
        for &(high, low) in series {
            reports.push(self.on_candle(high, low)?);
        }
        Ok(reports)
    }

    pub fn core(&self) -> &ChanCore {
        &self.core
    }

    pub fn snapshot(&self) -> StructureSnapshot {
        StructureSnapshot {
            merged_candle: self.core.merged_candles().last().copied(),
            fractal: self.core.fractals().last().cloned(),
            stroke: self.core.strokes().last().cloned(),
            segment: self.core.segments().last().cloned(),
            isolation_line: self.core.isolation_lines().last().copied(),
            stroke_pivot: self.core.stroke_pivots().last().copied(),
            segment_pivot: self.core.segment_pivots().last().copied(),
        }
    }

    fn trace(&self, report: &StepReport) {
        match report.candle {
            Action::MergedCandleGenerated => {
                let candle = self.core.merged_candles().last().expect("just generated");
                debug!(
                    id = candle.id,
                    high = candle.high,
                    low = candle.low,
                    "merged candle generated"
                );
            }
            Action::MergedCandleUpdated => {
                let candle = self.core.merged_candles().last().expect("just updated");
                debug!(
                    id = candle.id,
                    high = candle.high,
                    low = candle.low,
                    period = candle.period,
                    "merged candle updated"
                );
            }
            _ => {}
        }

        match report.fractal {
            Action::FractalGenerated => {
                let fractal = self.core.fractals().last().expect("just generated");
                debug!(
                    id = fractal.id,
                    pattern = ?fractal.pattern,
                    merged_id = fractal.merged_id(),
                    "fractal generated"
                );
            }
            Action::FractalDropped => debug!("unconfirmed fractal dropped"),
            _ => {}
        }

        match report.stroke {
            Action::StrokeGenerated => {
                let stroke = self.core.strokes().last().expect("just generated");
                debug!(
                    id = stroke.id,
                    trend = ?stroke.trend,
                    left = stroke.left_candle.id,
                    right = stroke.right_candle.id,
                    "stroke generated"
                );
            }
            Action::StrokeExtended => {
                let stroke = self.core.strokes().last().expect("just extended");
                debug!(id = stroke.id, right = stroke.right_candle.id, "stroke extended");
            }
            _ => {}
        }

        match report.segment {
            Action::SegmentGenerated => {
                let segment = self.core.segments().last().expect("just generated");
                info!(
                    id = segment.id,
                    trend = ?segment.trend,
                    strokes = segment.strokes_count(),
                    "segment generated"
                );
            }
            Action::SegmentExtended | Action::SegmentExpanded => {
                let segment = self.core.segments().last().expect("just changed");
                debug!(
                    id = segment.id,
                    strokes = segment.strokes_count(),
                    action = ?report.segment,
                    "segment changed"
                );
            }
            _ => {}
        }

        if report.stroke_pivot != Action::NothingChanged {
            let pivot = self.core.stroke_pivots().last().expect("just changed");
            debug!(
                id = pivot.id,
                high = pivot.high,
                low = pivot.low,
                action = ?report.stroke_pivot,
                "stroke pivot changed"
            );
        }
        if report.segment_pivot != Action::NothingChanged {
            let pivot = self.core.segment_pivots().last().expect("just changed");
            debug!(
                id = pivot.id,
                high = pivot.high,
                low = pivot.low,
                action = ?report.segment_pivot,
                "segment pivot changed"
            );
        }
    }

    fn dispatch(&self, report: &StepReport) {
        self.observable.notify(
            EventType::CandleChanged,
            EventPayload {
                action: Some(report.candle),
                id: self.core.merged_candles().last().map(|x| x.id),
                note: None,
            },
        );

        if report.fractal != Action::NothingChanged {
            self.observable.notify(
                EventType::FractalChanged,
                EventPayload {
                    action: Some(report.fractal),
                    id: self.core.fractals().last().map(|x| x.id),
                    note: None,
                },
            );
            // 新分型确认了它的前一个分型。
            if report.fractal == Action::FractalGenerated {
                let fractals = self.core.fractals();
                if fractals.len() >= 2 && fractals[fractals.len() - 2].is_confirmed {
                    self.observable.notify(
                        EventType::FractalChanged,
                        EventPayload {
                            action: Some(Action::FractalConfirmed),
                            id: Some(fractals[fractals.len() - 2].id),
                            note: None,
                        },
                    );
                }
            }
        }

        if report.stroke != Action::NothingChanged {
            self.observable.notify(
                EventType::StrokeChanged,
                EventPayload {
                    action: Some(report.stroke),
                    id: self.core.strokes().last().map(|x| x.id),
                    note: None,
                },
            );
        }

        if report.segment != Action::NothingChanged {
            self.observable.notify(
                EventType::SegmentChanged,
                EventPayload {
                    action: Some(report.segment),
                    id: self.core.segments().last().map(|x| x.id),
                    note: None,
                },
            );
        }

        if report.isolation_line != Action::NothingChanged {
            self.observable.notify(
                EventType::IsolationLineChanged,
                EventPayload {
                    action: Some(report.isolation_line),
                    id: self.core.isolation_lines().last().map(|x| x.id),
                    note: None,
                },
            );
        }

        if report.stroke_pivot != Action::NothingChanged {
            self.observable.notify(
                EventType::PivotChanged,
                EventPayload {
                    action: Some(report.stroke_pivot),
                    id: self.core.stroke_pivots().last().map(|x| x.id),
                    note: None,
                },
            );
        }
        if report.segment_pivot != Action::NothingChanged {
            self.observable.notify(
                EventType::PivotChanged,
                EventPayload {
                    action: Some(report.segment_pivot),
                    id: self.core.segment_pivots().last().map(|x| x.id),
                    note: None,
                },
            );
        }

        self.observable.notify(
            EventType::StepEnd,
            EventPayload {
                action: None,
                id: None,
                note: None,
            },
        );
    }
}
