use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use thesis_stats::thesis_data::{ColumnData, Dataset};
use thesis_stats::{TestEngine, TestParameters, TestSelector};

/// Deterministic two-group study with a linear predictor
fn generate_study(size: usize) -> Dataset {
    let groups: Vec<&str> = (0..size)
        .map(|i| ["control", "music", "silence"][i % 3])
        .collect();
    let hours: Vec<f64> = (0..size).map(|i| (i % 24) as f64 * 0.5).collect();
    let score: Vec<f64> = (0..size)
        .map(|i| 50.0 + 2.0 * hours[i] + (i % 3) as f64 * 4.0 + ((i * 7) % 11) as f64)
        .collect();
    let passed: Vec<&str> = score
        .iter()
        .enumerate()
        .map(|(i, s)| if s + ((i * 5) % 13) as f64 > 66.0 { "yes" } else { "no" })
        .collect();
    Dataset::from_columns(
        "bench",
        vec![
            ("group", ColumnData::text(groups)),
            ("hours", ColumnData::numeric(hours)),
            ("score", ColumnData::numeric(score)),
            ("passed", ColumnData::text(passed)),
        ],
    )
    .unwrap()
}

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("EngineDispatch");
    let engine = TestEngine::default();
    let cases = [
        (TestSelector::KGroup, TestParameters::grouped("group", "score")),
        (TestSelector::Association, TestParameters::pair("group", "passed")),
        (TestSelector::Correlation, TestParameters::pair("hours", "score")),
        (TestSelector::LinearModel, TestParameters::model("score", vec!["hours"])),
        (TestSelector::LogisticModel, TestParameters::model("passed", vec!["hours"])),
        (TestSelector::RankKGroup, TestParameters::grouped("group", "score")),
    ];

    for size in [60, 300, 1500] {
        let dataset = generate_study(size);
        for (selector, params) in &cases {
            group.bench_with_input(
                BenchmarkId::new(selector.name(), size),
                &dataset,
                |b, ds| b.iter(|| engine.run(black_box(ds), *selector, params)),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
