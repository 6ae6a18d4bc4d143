use chanlun::{ChanCore, Trend};

fn feed(core: &mut ChanCore, prices: &[f64]) {
    for price in prices {
        core.step(price + 0.4, price - 0.4).expect("step must succeed");
    }
}

/// 下跌段（三笔）后反转上行，反转再下行、再上行：共四段。
/// 每个波峰波谷间隔 4 根以上，回撤足够深以保证笔间重叠。
const FOUR_SEGMENT_WAVE: [f64; 59] = [
    10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, // 下跌笔 0
    5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, // 上升笔 1
    10.0, 9.0, 8.0, 7.0, 6.0, 5.0, // 下跌笔 2，至此首段成立
    6.0, 7.0, 8.0, 9.0, 10.0, // 上升笔 3
    9.0, 8.0, 7.0, 6.0, // 下跌笔 4
    7.0, 8.0, 9.0, 10.0, // 上升笔 5，Δ=3 反向成段
    9.0, 8.0, 7.0, 6.0, 5.0, // 下跌笔 6
    6.0, 7.0, 8.0, 9.0, // 上升笔 7
    8.0, 7.0, 6.0, 5.0, // 下跌笔 8，Δ=3 反向成段
    6.0, 7.0, 8.0, 9.0, 10.0, // 上升笔 9
    9.0, 8.0, 7.0, 6.0, // 下跌笔 10
    7.0, 8.0, 9.0, 10.0, // 上升笔 11，Δ=3 反向成段
];

#[test]
fn first_segment_spans_three_overlapping_strokes() {
    let mut core = ChanCore::default();
    feed(&mut core, &FOUR_SEGMENT_WAVE[..20]);

    let segments = core.segments();
    assert_eq!(segments.len(), 1);
    let segment = &segments[0];
    assert_eq!(segment.trend, Trend::Bearish);
    assert_eq!(segment.stroke_id_list, vec![0, 1, 2]);
    assert_eq!(segment.trend, core.strokes()[0].trend);
}

#[test]
fn reversal_generates_opposite_segment() {
    let mut core = ChanCore::default();
    feed(&mut core, &FOUR_SEGMENT_WAVE[..33]);

    let segments = core.segments();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].trend, Trend::Bearish);
    assert_eq!(segments[1].trend, Trend::Bullish);
    assert_eq!(segments[1].stroke_id_list, vec![3, 4, 5]);
    // 新段自旧段终点处的笔起步。
    assert_eq!(
        segments[1].left_candle.id,
        core.strokes()[3].left_candle.id
    );
}

#[test]
fn four_segments_alternate_and_partition_strokes() {
    let mut core = ChanCore::default();
    feed(&mut core, &FOUR_SEGMENT_WAVE);

    let segments = core.segments();
    assert_eq!(segments.len(), 4);
    for pair in segments.windows(2) {
        assert_ne!(pair[0].trend, pair[1].trend);
    }

    // 每段至少三笔，段内笔 id 连续。
    for segment in segments {
        assert!(segment.strokes_count() >= 3);
        for pair in segment.stroke_id_list.windows(2) {
            assert_eq!(pair[0] + 1, pair[1]);
        }
    }
}

#[test]
fn isolation_lines_mark_each_segment_boundary() {
    let mut core = ChanCore::default();
    feed(&mut core, &FOUR_SEGMENT_WAVE);

    let segments = core.segments();
    let lines = core.isolation_lines();
    assert_eq!(lines.len(), segments.len());
    for (line, segment) in lines.iter().zip(segments) {
        assert_eq!(line.candle.id, segment.left_candle.id);
    }
}

#[test]
fn segment_pivot_emerges_from_four_segments() {
    let mut core = ChanCore::default();
    feed(&mut core, &FOUR_SEGMENT_WAVE);

    let pivots = core.segment_pivots();
    assert_eq!(pivots.len(), 1);
    let pivot = &pivots[0];
    assert!(pivot.high > pivot.low);
    // 中枢区间必须落在第 2、4 段价格范围的交集内。
    let segment_2 = &core.segments()[1];
    assert!(pivot.low >= segment_2.left_price().min(segment_2.right_price()));
    assert!(pivot.high <= segment_2.left_price().max(segment_2.right_price()));
}

/// 扩张行情：第四、五笔顺势创新低，段吸收它们后出现笔中枢。
const EXPANDING_WAVE: [f64; 28] = [
    10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, // 下跌笔 0
    5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, // 上升笔 1
    10.0, 9.0, 8.0, 7.0, 6.0, 5.0, // 下跌笔 2，首段成立
    6.0, 7.0, 8.0, 9.0, // 上升笔 3
    8.0, 7.0, 6.0, 5.0, // 下跌笔 4，右侧价触及段低点，Δ=2 扩张
];

#[test]
fn in_trend_breakout_expands_segment() {
    let mut core = ChanCore::default();
    feed(&mut core, &EXPANDING_WAVE);

    let segments = core.segments();
    assert_eq!(segments.len(), 1);
    let segment = &segments[0];
    assert_eq!(segment.trend, Trend::Bearish);
    assert_eq!(segment.stroke_id_list, vec![0, 1, 2, 3, 4]);
}

#[test]
fn stroke_pivot_emerges_inside_expanded_segment() {
    let mut core = ChanCore::default();
    feed(&mut core, &EXPANDING_WAVE);

    let pivots = core.stroke_pivots();
    assert_eq!(pivots.len(), 1);
    let pivot = &pivots[0];
    assert!(pivot.high > pivot.low);

    // 中枢由段内第 2、4 笔的重叠构成。
    let segment = &core.segments()[0];
    let stroke_2 = &core.strokes()[segment.stroke_id_list[1]];
    let stroke_4 = &core.strokes()[segment.stroke_id_list[3]];
    assert_eq!(stroke_2.trend, stroke_4.trend);
    assert_eq!(pivot.left_candle.id, stroke_2.left_candle.id);
    assert_eq!(pivot.right_candle.id, stroke_4.right_candle.id);
}

#[test]
fn segment_right_edge_tracks_terminal_stroke() {
    let mut core = ChanCore::default();
    let mut prices = FOUR_SEGMENT_WAVE[..20].to_vec();
    feed(&mut core, &prices);
    let edge_before = core.segments()[0].right_candle.id;

    // 段内右侧笔继续创新低：Δ=0 延伸，右边界跟随。
    prices.clear();
    prices.push(4.0);
    feed(&mut core, &prices);

    let segments = core.segments();
    assert_eq!(segments.len(), 1);
    assert!(segments[0].right_candle.id > edge_before);
    assert_eq!(segments[0].stroke_id_list, vec![0, 1, 2]);
}
