use approx::assert_abs_diff_eq;
use bloodbeacon::features::compute_bmi;
use bloodbeacon::heuristic::score;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 2_000;

/// Draws readings across (and slightly beyond) the intake ranges.
fn draw(rng: &mut StdRng) -> [f64; 4] {
    [
        rng.gen_range(10.0..=120.0),
        rng.gen_range(60.0..=420.0),
        rng.gen_range(3.0..=15.0),
        rng.gen_range(12.0..=60.0),
    ]
}

fn score_of(readings: [f64; 4]) -> f64 {
    score(readings[0], readings[1], readings[2], readings[3]).value
}

#[test]
fn index_stays_within_unit_interval() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for _ in 0..SAMPLES {
        let value = score_of(draw(&mut rng));
        assert!((0.0..=1.0).contains(&value), "score {value} escaped [0, 1]");
    }
}

#[test]
fn index_is_monotone_in_each_biomarker() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..SAMPLES {
        let base = draw(&mut rng);
        for biomarker in 0..4 {
            let mut raised = base;
            raised[biomarker] += rng.gen_range(0.0..=50.0);
            assert!(
                score_of(raised) >= score_of(base),
                "raising column {biomarker} lowered the score: {base:?} -> {raised:?}"
            );
        }
    }
}

#[test]
fn raw_sum_is_a_multiple_of_the_rule_weights() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let readings = draw(&mut rng);
        let risk = score(readings[0], readings[1], readings[2], readings[3]);
        // Every weight is a multiple of 0.5 and the largest sum is 18.
        assert_abs_diff_eq!((risk.raw * 2.0).fract(), 0.0, epsilon = 1e-9);
        assert!((0.0..=18.0).contains(&risk.raw));
        assert_abs_diff_eq!(risk.value, (risk.raw / 12.0).min(1.0), epsilon = 1e-12);
    }
}

#[test]
fn reference_values() {
    assert_eq!(score(70.0, 220.0, 7.0, 32.0).value, 1.0);
    assert_eq!(score(30.0, 90.0, 5.0, 22.0).value, 0.0);
    assert_abs_diff_eq!(score(50.0, 150.0, 5.8, 28.0).value, 0.625, epsilon = 1e-12);
    assert_eq!(compute_bmi(70.0, 170.0), 24.22);
}
