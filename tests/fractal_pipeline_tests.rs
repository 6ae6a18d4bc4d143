use chanlun::{ChanCore, FractalPattern};

fn feed(core: &mut ChanCore, series: &[(f64, f64)]) {
    for &(high, low) in series {
        core.step(high, low).expect("step must succeed");
    }
}

#[test]
fn single_peak_yields_exactly_one_confirmed_top() {
    let mut core = ChanCore::default();
    // 峰在合并K线 2 处，随后一路下行到距离 4 的谷，再回头确认。
    feed(
        &mut core,
        &[
            (10.0, 8.0),
            (12.0, 10.0),
            (14.0, 12.0),
            (12.0, 10.0),
            (10.0, 8.0),
            (8.0, 6.0),
            (6.0, 4.0),
            (7.0, 5.0),
        ],
    );

    let tops: Vec<_> = core
        .fractals()
        .iter()
        .filter(|x| x.pattern == FractalPattern::Top)
        .collect();
    assert_eq!(tops.len(), 1, "exactly one top fractal expected");
    assert_eq!(tops[0].middle_candle.id, 2);
    assert!(tops[0].is_confirmed, "later bottom must confirm the top");
}

#[test]
fn confirmed_fractals_alternate_with_minimum_distance() {
    let mut core = ChanCore::default();
    let wave = [
        10.0, 11.0, 12.0, 13.0, 14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0,
        15.0, 14.0, 13.0, 12.0, 11.0, 10.0, 9.0, 8.0, 9.0, 10.0, 11.0, 12.0,
    ];
    let series: Vec<_> = wave.iter().map(|p| (p + 0.4, p - 0.4)).collect();
    feed(&mut core, &series);

    let fractals = core.fractals();
    assert!(fractals.len() >= 3, "fixture must generate several fractals");

    let minimum = core.config().minimum_distance();
    for pair in fractals.windows(2) {
        assert_ne!(pair[0].pattern, pair[1].pattern, "patterns must alternate");
        assert!(
            pair[1].middle_candle.id - pair[0].middle_candle.id >= minimum,
            "fractal distance below configured minimum"
        );
    }

    // 除最后一个外全部被后继分型确认。
    for fractal in &fractals[..fractals.len() - 1] {
        assert!(fractal.is_confirmed);
    }
    assert!(!fractals.last().unwrap().is_confirmed);
}

#[test]
fn fractal_extreme_price_matches_pattern_side() {
    let mut core = ChanCore::default();
    let wave = [
        10.0, 9.0, 8.0, 7.0, 6.0, 5.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 10.0, 9.0, 8.0,
        7.0, 6.0, 5.0,
    ];
    let series: Vec<_> = wave.iter().map(|p| (p + 0.4, p - 0.4)).collect();
    feed(&mut core, &series);

    for fractal in core.fractals() {
        match fractal.pattern {
            FractalPattern::Top => {
                assert_eq!(fractal.extreme_price(), fractal.middle_candle.high)
            }
            FractalPattern::Bottom => {
                assert_eq!(fractal.extreme_price(), fractal.middle_candle.low)
            }
        }
    }
}
