//! Benchmarks for the per-frame plot work
//!
//! Every frame runs the peak search and composes a full scene, so both have to
//! stay well inside the 20 ms frame budget at 50 fps.

#![allow(clippy::unwrap_used)]
#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use microspec_gui::config::AppConfig;
use microspec_gui::device::{AutoExposeResult, DevKit, SimulatedKit};
use microspec_gui::exposure::Exposure;
use microspec_gui::plot::{
    LabelTones, PlotLayout, PlotView, ThresholdLevels, compose, find_peak,
};
use std::hint::black_box;

fn simulated_frame() -> Vec<u16> {
    let mut kit = SimulatedKit::new("BENCH");
    kit.set_exposure(Exposure::from_ms(5.0)).unwrap();
    kit.capture_frame().unwrap().unwrap().pixels
}

fn bench_find_peak(c: &mut Criterion) {
    let config = AppConfig::default();
    let counts = simulated_frame();
    let range = config.pixel_range();

    c.bench_function("find_peak_binned_frame", |b| {
        b.iter(|| find_peak(black_box(&counts), black_box(range)));
    });
}

fn bench_compose(c: &mut Criterion) {
    let config = AppConfig::default();
    let counts = simulated_frame();
    let range = config.pixel_range();
    let layout = PlotLayout::new(&config.display, counts.len());
    let peak = find_peak(&counts, range);
    let levels = ThresholdLevels {
        target: config.auto_expose.target,
        tolerance: config.auto_expose.tolerance,
        max_dark: config.display.max_dark,
    };

    c.bench_function("compose_scene", |b| {
        b.iter(|| {
            let view = PlotView {
                counts: black_box(&counts),
                range,
                cursor_pixel: usize::from(range.stop),
                peak,
                exposure: Exposure::from_ms(5.0),
                auto_expose: AutoExposeResult::default(),
                tones: LabelTones::after_auto_expose(),
                levels,
            };
            compose(&layout, &view)
        });
    });
}

criterion_group!(benches, bench_find_peak, bench_compose);
criterion_main!(benches);
