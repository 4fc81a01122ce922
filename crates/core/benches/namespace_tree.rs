use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use metricspace_core::namespace::{FixedRetention, MetricTree, VecSink};
use metricspace_domain::{LimitsConfig, StatusPolicy};

fn sample_names() -> Vec<String> {
    let mut names = Vec::with_capacity(10_000);
    for host in 0..100 {
        for metric in 0..100 {
            names.push(format!("one_min.host-{host:03}.metric_{metric:03}"));
        }
    }
    names
}

fn populated_tree(names: &[String]) -> MetricTree {
    let tree = MetricTree::new(
        Arc::new(FixedRetention::default()),
        StatusPolicy::default(),
        LimitsConfig::default(),
    );
    for name in names {
        tree.add(name);
    }
    tree
}

fn namespace_tree_benchmark(c: &mut Criterion) {
    let names = sample_names();
    let tree = populated_tree(&names);

    let mut group = c.benchmark_group("namespace_tree");
    group.sample_size(20).measurement_time(std::time::Duration::from_secs(10));

    group.bench_function("populate_10k", |b| {
        b.iter(|| black_box(populated_tree(&names)));
    });

    group.bench_function("add_existing", |b| {
        b.iter(|| black_box(tree.add(black_box("one_min.host-042.metric_042"))));
    });

    group.bench_function("search_literal", |b| {
        b.iter(|| {
            let mut sink = VecSink::new();
            let _ = tree.search(black_box("one_min.host-042.metric_042"), &mut sink);
            black_box(sink.len())
        });
    });

    group.bench_function("search_wildcard", |b| {
        b.iter(|| {
            let mut sink = VecSink::new();
            let _ = tree.search(black_box("one_min.*.metric_0[0-4]?"), &mut sink);
            black_box(sink.len())
        });
    });

    group.finish();
}

criterion_group!(core_benchmarks, namespace_tree_benchmark);
criterion_main!(core_benchmarks);
