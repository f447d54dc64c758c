//! Cascade benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use photoreceptor_sim::phototransduction::{half_saturation_intensity, SteadyState};
use photoreceptor_sim::{CascadeIntegrator, Photoreceptor, SimulationDriver};

fn bench_single_step(c: &mut Criterion) {
    let integrator = CascadeIntegrator::default();
    let mut rod = Photoreceptor::rod().unwrap();

    c.bench_function("cascade_step", |b| {
        b.iter(|| integrator.step(black_box(&mut rod), black_box(600.0)))
    });
}

fn bench_driver_tick(c: &mut Criterion) {
    let mut driver = SimulationDriver::with_defaults().unwrap();

    c.bench_function("driver_tick", |b| {
        b.iter(|| driver.tick(black_box(600.0)))
    });
}

fn bench_simulated_second(c: &mut Criterion) {
    let mut driver = SimulationDriver::with_defaults().unwrap();

    c.bench_function("simulated_second", |b| {
        b.iter(|| {
            driver.reset();
            driver.advance(black_box(5e4), 1.0)
        })
    });
}

fn bench_steady_state(c: &mut Criterion) {
    let rod = Photoreceptor::rod().unwrap();

    c.bench_function("steady_state_solve", |b| {
        b.iter(|| SteadyState::at_intensity(black_box(rod.constants()), black_box(600.0)))
    });

    c.bench_function("half_saturation_closed_form", |b| {
        b.iter(|| half_saturation_intensity(black_box(rod.constants())))
    });
}

criterion_group!(
    benches,
    bench_single_step,
    bench_driver_tick,
    bench_simulated_second,
    bench_steady_state,
);
criterion_main!(benches);
