// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use boolfn::bf_simplify::simplify;
use boolfn::fuzz_utils::arbitrary_boolean_function;

/// Benchmarks fixed-point simplification of random expressions at several
/// nesting depths.
fn simplify_benchmark(c: &mut Criterion) {
    // A fixed seed keeps the generated expressions identical across runs so
    // results are comparable.
    let mut rng = StdRng::seed_from_u64(0x51217);
    let variables = ["a", "b", "c", "d"];

    let mut group = c.benchmark_group("simplify_random_expressions");
    for depth in [4usize, 8, 12] {
        let functions: Vec<_> = (0..16)
            .map(|_| arbitrary_boolean_function(&mut rng, &variables, 8, depth))
            .collect();
        group.bench_function(BenchmarkId::from_parameter(depth), |b| {
            b.iter(|| {
                for f in &functions {
                    black_box(simplify(f));
                }
            });
        });
    }
    group.finish();
}

criterion_group!(benches, simplify_benchmark);
criterion_main!(benches);
