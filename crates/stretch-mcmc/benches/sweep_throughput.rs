use criterion::{criterion_group, criterion_main, Criterion};

use stretch_mcmc::{ExecutionStrategy, RunOptions, Sampler, SamplerConfig};

fn correlated_gaussian(x: &[f64]) -> f64 {
    let mut acc = 0.0;
    for window in x.windows(2) {
        acc += (window[1] - 0.9 * window[0]).powi(2);
    }
    -0.5 * (x[0] * x[0] + acc)
}

fn start(walkers: usize, dimension: usize) -> Vec<Vec<f64>> {
    (0..walkers)
        .map(|w| (0..dimension).map(|d| ((w * 7 + d) as f64).sin()).collect())
        .collect()
}

fn bench_sweep(c: &mut Criterion) {
    let walkers = 64;
    let dimension = 8;
    let initial = start(walkers, dimension);

    for (name, strategy) in [
        ("stretch_sweep_serial", ExecutionStrategy::Serial),
        ("stretch_sweep_parallel", ExecutionStrategy::Parallel { threads: 0 }),
    ] {
        let options = RunOptions::new(50).thin(5).strategy(strategy);
        c.bench_function(name, |b| {
            b.iter(|| {
                let config = SamplerConfig::new(walkers, dimension).with_seed(42);
                let mut sampler = Sampler::new(config, correlated_gaussian).unwrap();
                sampler.run(&initial, &options).unwrap()
            })
        });
    }
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
