use std::hint::black_box;
use std::time::Duration;

use criterion::criterion_group;
use criterion::criterion_main;
use criterion::BenchmarkId;
use criterion::Criterion;
use quantfolio::config::AnalyticsConfig;
use quantfolio::monte_carlo::simulate;
use quantfolio::monte_carlo::MonteCarloConfig;
use quantfolio::portfolio::Asset;

fn bench_simulation(c: &mut Criterion) {
  let mut group = c.benchmark_group("MonteCarlo");
  group.measurement_time(Duration::from_secs(3));
  group.warm_up_time(Duration::from_millis(500));

  let analytics = AnalyticsConfig::default();
  let assets = vec![
    Asset::new("EQTY".to_string(), 60.0, 0.12, 0.25, 210.0),
    Asset::new("BOND".to_string(), 40.0, 0.05, 0.08, 98.0),
  ];

  for &count in &[1_000usize, 10_000usize] {
    group.bench_with_input(BenchmarkId::new("simulate/1y", count), &count, |b, &count| {
      let config = MonteCarloConfig {
        simulation_count: count,
        include_multi_period: false,
        seed: Some(42),
        ..MonteCarloConfig::default()
      };
      b.iter(|| black_box(simulate(&assets, &config, &analytics).unwrap()));
    });
  }

  group.bench_function("simulate/multi-period", |b| {
    let config = MonteCarloConfig {
      simulation_count: 1_000,
      seed: Some(42),
      ..MonteCarloConfig::default()
    };
    b.iter(|| black_box(simulate(&assets, &config, &analytics).unwrap()));
  });

  group.finish();
}

criterion_group!(benches, bench_simulation);
criterion_main!(benches);
