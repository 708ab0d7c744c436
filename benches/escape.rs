#[macro_use]
extern crate criterion;

use criterion::Criterion;
use mandelbrot::escape::{escape_count, maybe_outside};
use mandelbrot::julia::{render_julia, JuliaParams};
use mandelbrot::{FractalEngine, Viewport};
use num::Complex;

fn escape_benchmark(c: &mut Criterion) {
    c.bench_function("escape_count seahorse valley", |b| {
        b.iter(|| escape_count(Complex::new(-0.7436, 0.1318), 10_000))
    });
    c.bench_function("maybe_outside", |b| {
        b.iter(|| maybe_outside(Complex::new(-0.1, 0.1)))
    });
}

fn render_benchmark(c: &mut Criterion) {
    c.bench_function("julia 200x150", |b| {
        let params = JuliaParams::new(Complex::new(-0.8, 0.156), 200).unwrap();
        b.iter(|| render_julia(200, 150, &params).unwrap())
    });
    c.bench_function("mandelbrot 200x150", |b| {
        let mut engine = FractalEngine::with_size(200, 150).unwrap();
        b.iter(|| {
            engine.render_mandelbrot(Viewport::default(), 200).unwrap();
            engine.wait()
        })
    });
}

criterion_group!(benches, escape_benchmark, render_benchmark);
criterion_main!(benches);
