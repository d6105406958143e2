use std::sync::Arc;

use benchmarks::{SyntheticRatings, SyntheticSpec};
use cinefactor::{Baseline, ExecutionPath, Model, SvdConfig, SvdEngine};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn initialized_engine(data: &SyntheticRatings, execution: ExecutionPath) -> SvdEngine {
    let stats: Arc<dyn Baseline> = Arc::new(data.stats.clone());
    let mut engine = SvdEngine::new(SvdConfig::builder().execution(execution).build());
    engine
        .train(data.train.clone(), stats, 0)
        .expect("Failed to initialize engine");
    engine
}

fn bench_epoch(c: &mut Criterion) {
    let mut group = c.benchmark_group("epoch");
    for num_ratings in [1_000, 10_000, 50_000] {
        let spec = SyntheticSpec {
            num_ratings,
            ..SyntheticSpec::default()
        };
        let data = SyntheticRatings::generate(spec, 0.0).expect("Failed to generate ratings");

        for (name, path) in [
            ("reference", ExecutionPath::Reference),
            ("accelerated", ExecutionPath::Accelerated),
        ] {
            let mut engine = initialized_engine(&data, path);
            group.bench_with_input(BenchmarkId::new(name, num_ratings), &num_ratings, |b, _| {
                b.iter(|| engine.update_all_features().expect("epoch failed"));
            });
        }
    }
    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let data = SyntheticRatings::generate(SyntheticSpec::default(), 0.2)
        .expect("Failed to generate ratings");
    let mut engine = initialized_engine(&data, ExecutionPath::Accelerated);
    engine.train_more(None, 5).expect("Failed to train");

    c.bench_function("predict_test_split", |b| {
        b.iter(|| {
            let predictions = engine.predict(black_box(&data.test));
            black_box(predictions)
        });
    });
}

criterion_group!(benches, bench_epoch, bench_predict);
criterion_main!(benches);
