//! Latency benchmarks for single-row scoring

use carprice_core::{Feature, FeatureVector, RawInputs};
use carprice_model::{Frame, LoadedModel};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bundled_model() -> LoadedModel {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../GBM_grid_1_AutoML_1_20250807_144050_model_2"
    );
    LoadedModel::load(path).expect("bundled artifact should load")
}

fn example_frame() -> Frame {
    let inputs =
        RawInputs::from_values([3.0, 120.0, 2.0, 2000.0, 150.0, 210.0, 7.5, 1.0, 5.0, 300.0]);
    let vector = FeatureVector::coerce(&inputs).expect("example inputs are numeric");
    let mut frame = Frame::from_features(&vector);
    frame.as_factor(Feature::EngineCode.column()).expect("column exists");
    frame.as_factor(Feature::FuelTypeCode.column()).expect("column exists");
    frame
}

fn bench_predict(c: &mut Criterion) {
    let loaded = bundled_model();
    let frame = example_frame();

    c.bench_function("predict_one_row", |b| {
        b.iter(|| loaded.model.predict(black_box(&frame)))
    });

    c.bench_function("coerce_and_predict", |b| {
        let inputs =
            RawInputs::from_values([3.0, 120.0, 2.0, 2000.0, 150.0, 210.0, 7.5, 1.0, 5.0, 300.0]);
        b.iter(|| {
            let vector = FeatureVector::coerce(black_box(&inputs)).expect("numeric");
            let mut frame = Frame::from_features(&vector);
            frame.as_factor(Feature::EngineCode.column()).expect("column exists");
            frame.as_factor(Feature::FuelTypeCode.column()).expect("column exists");
            loaded.model.predict(&frame)
        })
    });
}

criterion_group!(benches, bench_predict);
criterion_main!(benches);
