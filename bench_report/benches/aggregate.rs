use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use itertools::Itertools;

use bench_report::aggregate::{collapsed_medians, median_pivot};
use bench_report::compare::compare_observations;
use bench_report::defaults::builtin_metrics;
use bench_report::filter::select_metric;
use bench_report::test_helpers::synthetic_observations;

fn aggregate_observations(c: &mut Criterion) {
    let time = &builtin_metrics()[0];

    let mut group = c.benchmark_group("aggregate");
    for num_benches in [10, 50, 200].into_iter() {
        let observations = synthetic_observations(num_benches, 6, 5, 10);
        let scope = select_metric(&observations, time);

        group.bench_with_input(
            BenchmarkId::new("collapsed_medians", num_benches),
            &scope,
            |b, scope| b.iter(|| collapsed_medians(scope.iter().copied())),
        );
        group.bench_with_input(
            BenchmarkId::new("median_pivot", num_benches),
            &scope,
            |b, scope| b.iter(|| median_pivot(scope.iter().copied())),
        );
        group.bench_with_input(
            BenchmarkId::new("compare", num_benches),
            &scope,
            |b, scope| b.iter(|| compare_observations(scope, "exe-0")),
        );
    }
    group.finish();
}

fn select_metrics(c: &mut Criterion) {
    let metrics = builtin_metrics();
    let observations = synthetic_observations(100, 6, 5, 10);

    c.bench_function("select_all_metrics", |b| {
        b.iter(|| {
            metrics
                .iter()
                .map(|m| select_metric(&observations, m).len())
                .collect_vec()
        })
    });
}

criterion_group!(benches, aggregate_observations, select_metrics);
criterion_main!(benches);
