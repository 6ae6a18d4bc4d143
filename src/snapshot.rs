//! 派生结构快照导出。
//!
//! 把核心的各实体列表转成 polars DataFrame，支持 parquet 落盘与 JSON
//! 序列化，供外部渲染 / 报表层消费。核心本身不做任何 I/O。

use std::fs::{File, create_dir_all};
use std::path::Path;

use polars::df;
use polars::prelude::{DataFrame, ParquetWriter};
use serde::Serialize;

use crate::constant::ChanError;
use crate::chan::ChanCore;
use crate::pivot::Pivot;

pub fn merged_candles_frame(core: &ChanCore) -> Result<DataFrame, ChanError> {
    let rows = core.merged_candles();
    let ids: Vec<u64> = rows.iter().map(|x| x.id as u64).collect();
    let high: Vec<f64> = rows.iter().map(|x| x.high).collect();
    let low: Vec<f64> = rows.iter().map(|x| x.low).collect();
    let period: Vec<u64> = rows.iter().map(|x| x.period as u64).collect();
    let left_ordinary_id: Vec<u64> = rows.iter().map(|x| x.left_ordinary_id as u64).collect();
    let right_ordinary_id: Vec<u64> = rows.iter().map(|x| x.right_ordinary_id() as u64).collect();

    Ok(df!(
        "id" => ids,
        "high" => high,
        "low" => low,
        "period" => period,
        "left_ordinary_id" => left_ordinary_id,
        "right_ordinary_id" => right_ordinary_id
    )?)
}

pub fn fractals_frame(core: &ChanCore) -> Result<DataFrame, ChanError> {
    let rows = core.fractals();
    let ids: Vec<u64> = rows.iter().map(|x| x.id as u64).collect();
    let pattern: Vec<i8> = rows
        .iter()
        .map(|x| match x.pattern {
            crate::constant::FractalPattern::Top => 1,
            crate::constant::FractalPattern::Bottom => -1,
        })
        .collect();
    let merged_id: Vec<u64> = rows.iter().map(|x| x.merged_id() as u64).collect();
    let ordinary_id: Vec<u64> = rows.iter().map(|x| x.ordinary_id() as u64).collect();
    let extreme_price: Vec<f64> = rows.iter().map(|x| x.extreme_price()).collect();
    let is_confirmed: Vec<bool> = rows.iter().map(|x| x.is_confirmed).collect();

    Ok(df!(
        "id" => ids,
        "pattern" => pattern,
        "merged_id" => merged_id,
        "ordinary_id" => ordinary_id,
        "extreme_price" => extreme_price,
        "is_confirmed" => is_confirmed
    )?)
}

pub fn strokes_frame(core: &ChanCore) -> Result<DataFrame, ChanError> {
    let rows = core.strokes();
    let ids: Vec<u64> = rows.iter().map(|x| x.id as u64).collect();
    let trend: Vec<i8> = rows
        .iter()
        .map(|x| match x.trend {
            crate::constant::Trend::Bullish => 1,
            crate::constant::Trend::Bearish => -1,
        })
        .collect();
    let left_merged_id: Vec<u64> = rows.iter().map(|x| x.left_candle.id as u64).collect();
    let right_merged_id: Vec<u64> = rows.iter().map(|x| x.right_candle.id as u64).collect();
    let left_price: Vec<f64> = rows.iter().map(|x| x.left_price()).collect();
    let right_price: Vec<f64> = rows.iter().map(|x| x.right_price()).collect();

    Ok(df!(
        "id" => ids,
        "trend" => trend,
        "left_merged_id" => left_merged_id,
        "right_merged_id" => right_merged_id,
        "left_price" => left_price,
        "right_price" => right_price
    )?)
}

pub fn segments_frame(core: &ChanCore) -> Result<DataFrame, ChanError> {
    let rows = core.segments();
    let ids: Vec<u64> = rows.iter().map(|x| x.id as u64).collect();
    let trend: Vec<i8> = rows
        .iter()
        .map(|x| match x.trend {
            crate::constant::Trend::Bullish => 1,
            crate::constant::Trend::Bearish => -1,
        })
        .collect();
    let left_merged_id: Vec<u64> = rows.iter().map(|x| x.left_candle.id as u64).collect();
    let right_merged_id: Vec<u64> = rows.iter().map(|x| x.right_candle.id as u64).collect();
    let left_price: Vec<f64> = rows.iter().map(|x| x.left_price()).collect();
    let right_price: Vec<f64> = rows.iter().map(|x| x.right_price()).collect();
    let strokes_count: Vec<u64> = rows.iter().map(|x| x.strokes_count() as u64).collect();

    Ok(df!(
        "id" => ids,
        "trend" => trend,
        "left_merged_id" => left_merged_id,
        "right_merged_id" => right_merged_id,
        "left_price" => left_price,
        "right_price" => right_price,
        "strokes_count" => strokes_count
    )?)
}

pub fn isolation_lines_frame(core: &ChanCore) -> Result<DataFrame, ChanError> {
    let rows = core.isolation_lines();
    let ids: Vec<u64> = rows.iter().map(|x| x.id as u64).collect();
    let merged_id: Vec<u64> = rows.iter().map(|x| x.candle.id as u64).collect();
    let ordinary_id: Vec<u64> = rows
        .iter()
        .map(|x| x.candle.right_ordinary_id() as u64)
        .collect();

    Ok(df!(
        "id" => ids,
        "merged_id" => merged_id,
        "ordinary_id" => ordinary_id
    )?)
}

pub fn pivots_frame(rows: &[Pivot]) -> Result<DataFrame, ChanError> {
    let ids: Vec<u64> = rows.iter().map(|x| x.id as u64).collect();
    let left_merged_id: Vec<u64> = rows.iter().map(|x| x.left_candle.id as u64).collect();
    let right_merged_id: Vec<u64> = rows.iter().map(|x| x.right_candle.id as u64).collect();
    let high: Vec<f64> = rows.iter().map(|x| x.high).collect();
    let low: Vec<f64> = rows.iter().map(|x| x.low).collect();

    Ok(df!(
        "id" => ids,
        "left_merged_id" => left_merged_id,
        "right_merged_id" => right_merged_id,
        "high" => high,
        "low" => low
    )?)
}

/// 把全部派生列表写成一组 parquet 文件。
pub fn write_parquet_snapshot(
    core: &ChanCore,
    output_dir: impl AsRef<Path>,
) -> Result<(), ChanError> {
    let output_dir = output_dir.as_ref();
    create_dir_all(output_dir)?;

    let frames = [
        ("merged_candles", merged_candles_frame(core)?),
        ("fractals", fractals_frame(core)?),
        ("strokes", strokes_frame(core)?),
        ("segments", segments_frame(core)?),
        ("isolation_lines", isolation_lines_frame(core)?),
        ("stroke_pivots", pivots_frame(core.stroke_pivots())?),
        ("segment_pivots", pivots_frame(core.segment_pivots())?),
    ];

    for (name, mut frame) in frames {
        let mut file = File::create(output_dir.join(format!("{name}.parquet")))?;
        ParquetWriter::new(&mut file).finish(&mut frame)?;
    }

    Ok(())
}

#[derive(Serialize)]
struct StateExport<'a> {
    merged_candles: &'a [crate::candle::MergedCandle],
    fractals: &'a [crate::fractal::Fractal],
    strokes: &'a [crate::stroke::Stroke],
    segments: &'a [crate::segment::Segment],
    isolation_lines: &'a [crate::pivot::IsolationLine],
    stroke_pivots: &'a [Pivot],
    segment_pivots: &'a [Pivot],
}

/// 全量状态的 JSON 文本，字段顺序与列表顺序一致。
pub fn state_json(core: &ChanCore) -> Result<String, ChanError> {
    let export = StateExport {
        merged_candles: core.merged_candles(),
        fractals: core.fractals(),
        strokes: core.strokes(),
        segments: core.segments(),
        isolation_lines: core.isolation_lines(),
        stroke_pivots: core.stroke_pivots(),
        segment_pivots: core.segment_pivots(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}
