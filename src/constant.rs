use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// 分型模式：顶分型 / 底分型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FractalPattern {
    Top,
    Bottom,
}

impl FractalPattern {
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
        }
    }
}

/// 趋势方向：上升 / 下降。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    pub fn opposite(self) -> Self {
        match self {
            Self::Bullish => Self::Bearish,
            Self::Bearish => Self::Bullish,
        }
    }
}

/// 单步推进中每一层产生的动作。
///
/// 数据不足、条件不满足一律返回 `NothingChanged`，不是错误。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    NothingChanged,
    MergedCandleGenerated,
    MergedCandleUpdated,
    FractalGenerated,
    FractalConfirmed,
    FractalDropped,
    StrokeGenerated,
    StrokeExtended,
    SegmentGenerated,
    SegmentExtended,
    SegmentExpanded,
    IsolationLineGenerated,
    StrokePivotGenerated,
    StrokePivotExtended,
    SegmentPivotGenerated,
    SegmentPivotExtended,
}

/// 事件类型，供外部订阅者使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    CandleChanged,
    FractalChanged,
    StrokeChanged,
    SegmentChanged,
    IsolationLineChanged,
    PivotChanged,
    StepEnd,
}

pub struct Const;

impl Const {
    /// 严格模式下分型中间K线之间的最小合并K线距离。
    pub const STRICT_MINIMUM_DISTANCE: usize = 4;
    /// 宽松模式下的最小距离。
    pub const RELAXED_MINIMUM_DISTANCE: usize = 3;
    /// 构成线段所需的最少笔数。
    pub const SEGMENT_MINIMUM_STROKES: usize = 3;
    /// 构成笔中枢所需的线段内最少笔数。
    pub const PIVOT_MINIMUM_STROKES: usize = 4;
    /// 构成段中枢所需的最少线段数。
    pub const PIVOT_MINIMUM_SEGMENTS: usize = 4;
}

#[derive(Debug)]
pub enum ChanError {
    /// 内部几何不变量被破坏，当前推导步必须中止。
    Inconsistency(String),
    InvalidConfig(String),
    InvalidDatetime(String),
    Io(std::io::Error),
    Csv(csv::Error),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    Polars(polars::error::PolarsError),
}

impl Display for ChanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inconsistency(v) => write!(f, "internal inconsistency: {v}"),
            Self::InvalidConfig(v) => write!(f, "invalid config: {v}"),
            Self::InvalidDatetime(v) => write!(f, "invalid datetime: {v}"),
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Csv(e) => write!(f, "csv error: {e}"),
            Self::Yaml(e) => write!(f, "yaml error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Polars(e) => write!(f, "polars error: {e}"),
        }
    }
}

impl std::error::Error for ChanError {}

impl From<std::io::Error> for ChanError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ChanError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<serde_yaml::Error> for ChanError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

impl From<serde_json::Error> for ChanError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<polars::error::PolarsError> for ChanError {
    fn from(value: polars::error::PolarsError) -> Self {
        Self::Polars(value)
    }
}
