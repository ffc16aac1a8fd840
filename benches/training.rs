use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use traffic_gbdt::metrics_eval::auc;
use traffic_gbdt::{
    generate, Config, FeatureAssembler, GBDTTrainer, GrowthStrategy, Predictor, TrainingPipeline,
};

fn bench_training(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit");
    group.sample_size(10);

    for count in [100usize, 1_000, 5_000] {
        let samples = generate(count, 0.2, Some(42)).unwrap();
        let (_, features) = FeatureAssembler::new().fit_transform(&samples).unwrap();
        let labels = FeatureAssembler::new().labels(&samples).unwrap();

        for strategy in [GrowthStrategy::LeafWise, GrowthStrategy::DepthWise] {
            let trainer = GBDTTrainer::new(Config {
                num_trees: 50,
                num_leaves: 20,
                growth_strategy: strategy,
                ..Config::default()
            })
            .unwrap();

            group.bench_with_input(
                BenchmarkId::new(strategy.to_string(), count),
                &count,
                |b, _| {
                    b.iter(|| black_box(trainer.fit(&features.view(), &labels).unwrap()));
                },
            );
        }
    }
    group.finish();
}

fn bench_prediction(c: &mut Criterion) {
    let samples = generate(1_000, 0.2, Some(7)).unwrap();
    let pipeline = TrainingPipeline::fit(&samples, &Config::default()).unwrap();
    let predictor = Predictor::default();

    c.bench_function("predict_batch_1000", |b| {
        b.iter(|| black_box(predictor.predict_batch(&pipeline, &samples).unwrap()));
    });
}

fn bench_auc(c: &mut Criterion) {
    let n = 10_000;
    let scores = ndarray::Array1::from_shape_fn(n, |i| ((i * 7919) % 1000) as f64 / 1000.0);
    let labels: Vec<bool> = (0..n).map(|i| i % 3 != 0).collect();

    c.bench_function("auc_10000", |b| {
        b.iter(|| black_box(auc(&scores.view(), &labels)));
    });
}

criterion_group!(benches, bench_training, bench_prediction, bench_auc);
criterion_main!(benches);
