use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tunelib::cache_spec::CacheSpec;
use tunelib::config::GenerationBounds;
use tunelib::feasibility::Feasibility;
use tunelib::generator::CandidateGenerator;

/// The generators reject hundreds of specs per candidate, so the predicate is the hot path
pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Search");
    let feasibility = Feasibility::default();

    group.bench_function("feasibility check", |bench| {
        let spec = CacheSpec::default();
        bench.iter(|| feasibility.is_valid(black_box(&spec)));
    });

    group.bench_function("random candidate", |bench| {
        let mut generator = CandidateGenerator::new(feasibility, GenerationBounds::default(), StdRng::seed_from_u64(0));
        bench.iter(|| generator.random_candidate().unwrap());
    });

    group.bench_function("permutation", |bench| {
        let mut generator = CandidateGenerator::new(feasibility, GenerationBounds::default(), StdRng::seed_from_u64(0));
        let base = CacheSpec::default();
        bench.iter(|| generator.permute(black_box(&base)).unwrap());
    });

    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().significance_level(0.1).sample_size(10);
    targets = criterion_benchmark
);
criterion_main!(benches);
