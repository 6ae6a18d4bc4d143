//! 行情喂入。
//!
//! 采集器（交易所下载、表格解析等）在别处；这里只接收已经整理好的
//! (high, low) 序列，逐根或成批送进引擎，并附带一个 CSV 便捷入口。

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

use crate::candle::OrdinaryCandle;
use crate::config::ChanConfig;
use crate::constant::ChanError;
use crate::chan::StepReport;
use crate::engine::ChanEngine;

/// 标准化的K线输入。时间戳只作审计记录，不参与推导。
#[derive(Debug, Clone)]
pub struct CandleInput {
    pub datetime: Option<DateTime<Utc>>,
    pub high: f64,
    pub low: f64,
}

impl CandleInput {
    pub fn into_ordinary(self) -> OrdinaryCandle {
        OrdinaryCandle {
            high: self.high,
            low: self.low,
        }
    }
}

pub struct CandleFeed {
    engine: ChanEngine,
}

impl Default for CandleFeed {
    fn default() -> Self {
        Self::new(ChanConfig::default())
    }
}

impl CandleFeed {
    pub fn new(config: ChanConfig) -> Self {
        Self {
            engine: ChanEngine::new(config),
        }
    }

    pub fn with_engine(engine: ChanEngine) -> Self {
        Self { engine }
    }

    pub fn ingest_candle(&mut self, input: CandleInput) -> Result<StepReport, ChanError> {
        self.engine.on_candle(input.high, input.low)
    }

    pub fn ingest_batch(&mut self, inputs: Vec<CandleInput>) -> Result<Vec<StepReport>, ChanError> {
        let mut reports = Vec::with_capacity(inputs.len());
        for input in inputs {
            reports.push(self.ingest_candle(input)?);
        }
        Ok(reports)
    }

    pub fn ingest_csv(&mut self, file_path: impl AsRef<Path>) -> Result<usize, ChanError> {
        let inputs = load_candle_inputs(file_path)?;
        let count = inputs.len();
        self.ingest_batch(inputs)?;
        Ok(count)
    }

    pub fn engine(&self) -> &ChanEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut ChanEngine {
        &mut self.engine
    }
}

#[derive(Debug, Deserialize)]
struct CsvCandleRow {
    #[serde(default)]
    datetime: Option<String>,
    #[serde(alias = "high_price")]
    high: f64,
    #[serde(alias = "low_price")]
    low: f64,
}

pub fn load_candle_inputs(
    file_path: impl AsRef<Path>,
) -> Result<Vec<CandleInput>, ChanError> {
    let mut reader = csv::Reader::from_path(file_path)?;
    let mut out = Vec::new();

    for row in reader.deserialize::<CsvCandleRow>() {
        let row = row?;
        let datetime = match row.datetime.as_deref() {
            Some(value) if !value.is_empty() => Some(parse_datetime(value)?),
            _ => None,
        };
        out.push(CandleInput {
            datetime,
            high: row.high,
            low: row.low,
        });
    }

    Ok(out)
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, ChanError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    let patterns = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S%.f",
        "%Y%m%d%H%M%S%.f",
    ];

    for pattern in patterns {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc));
        }
    }

    Err(ChanError::InvalidDatetime(value.to_string()))
}
