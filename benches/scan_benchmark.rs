// ========================================================================================
//
//                 BLOODBEACON PER-REQUEST SCAN BENCHMARK
//
// ========================================================================================
//
// Measures one full scan (assembly, heuristic, scaling, forest traversal, breakdown)
// against the shipped test artifacts, and the heuristic on its own.

use bloodbeacon::classify::ClassifierAdapter;
use bloodbeacon::features::ClinicalInputs;
use bloodbeacon::heuristic;
use bloodbeacon::pipeline::PredictionOrchestrator;
use bloodbeacon::types::Gender;
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::path::PathBuf;

fn data_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

fn bench_scan(c: &mut Criterion) {
    let adapter = ClassifierAdapter::load(data_path("forest.toml"), data_path("scaler.toml"))
        .expect("test artifacts load");
    let orchestrator = PredictionOrchestrator::new(&adapter);
    let inputs = ClinicalInputs {
        gender: Gender::Female,
        age: 52,
        hypertension: false,
        heart_disease: true,
        hba1c: 6.1,
        glucose: 155.0,
        bmi: None,
        weight_kg: Some(82.0),
        height_cm: Some(165.0),
    };

    c.bench_function("run_scan", |b| {
        b.iter(|| orchestrator.run_scan(black_box(&inputs)))
    });

    c.bench_function("heuristic_score", |b| {
        b.iter(|| {
            heuristic::score(
                black_box(52.0),
                black_box(155.0),
                black_box(6.1),
                black_box(30.1),
            )
        })
    });
}

criterion_group!(benches, bench_scan);
criterion_main!(benches);
