//! Focus Engine Benchmarks
//!
//! Measures signal-processing throughput and attribution cost at
//! realistic display counts.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use lamco_focus::display::{attribute, DisplayBounds, DisplayMap, ScreenId, SharedDisplayMap};
use lamco_focus::engine::{EngineConfig, FocusEngine, NullSink};
use lamco_focus::signal::{IntentSignal, SignalType};

/// Build a horizontal strip of displays
fn strip(count: u32) -> DisplayMap {
    let displays = (0..count)
        .map(|i| DisplayBounds::new(ScreenId(i + 1), i as i32 * 1920, 0, 1920, 1080))
        .collect();
    DisplayMap::new(displays).unwrap()
}

fn engine(count: u32) -> FocusEngine {
    let config = EngineConfig {
        max_screens: count as usize,
        ..Default::default()
    };
    FocusEngine::new(
        "bench",
        config,
        SharedDisplayMap::new(strip(count)),
        Box::new(NullSink),
    )
    .unwrap()
}

/// Alternating pointer traffic across two displays, 20 Hz timestamps
fn pointer_stream(count: usize) -> Vec<IntentSignal> {
    (0..count)
        .map(|i| {
            let x = if i % 2 == 0 { 960.0 } else { 2880.0 };
            IntentSignal::new(SignalType::PointerMove, x, 540.0, 1000 + i as u64 * 50)
                .with_speed(800.0)
        })
        .collect()
}

fn bench_process_signal(c: &mut Criterion) {
    let mut group = c.benchmark_group("process_signal");

    for display_count in [1u32, 2, 3] {
        let signals = pointer_stream(1000);
        group.throughput(Throughput::Elements(signals.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("pointer_stream", display_count),
            &display_count,
            |b, &count| {
                b.iter(|| {
                    let mut engine = engine(count);
                    for signal in &signals {
                        engine.process_signal(black_box(signal));
                    }
                    engine.metrics().focus_changes
                });
            },
        );
    }

    group.finish();
}

fn bench_attribution(c: &mut Criterion) {
    let mut group = c.benchmark_group("attribution");

    let map = strip(3);
    let contained = IntentSignal::new(SignalType::Click, 2880.0, 540.0, 1000);
    let in_gap = IntentSignal::new(SignalType::Click, -500.0, -200.0, 1000);

    group.bench_function("containment_hit", |b| {
        b.iter(|| attribute(black_box(&contained), black_box(&map)))
    });

    group.bench_function("proximity_fallback", |b| {
        b.iter(|| attribute(black_box(&in_gap), black_box(&map)))
    });

    group.finish();
}

fn bench_click_switch_cycle(c: &mut Criterion) {
    // Full switch cycle: candidate, dwell, switch, cooldown recovery
    let signals: Vec<IntentSignal> = (0..250u64)
        .flat_map(|i| {
            let base = 1000 + i * 2000;
            let (x, alt_x) = if i % 2 == 0 {
                (960.0, 2880.0)
            } else {
                (2880.0, 960.0)
            };
            vec![
                IntentSignal::new(SignalType::Click, x, 540.0, base),
                IntentSignal::new(SignalType::Click, x, 540.0, base + 400),
                IntentSignal::new(SignalType::Click, alt_x, 540.0, base + 1000),
            ]
        })
        .collect();

    let mut group = c.benchmark_group("switch_cycle");
    group.throughput(Throughput::Elements(signals.len() as u64));
    group.bench_function("click_alternation", |b| {
        b.iter(|| {
            let mut engine = engine(3);
            for signal in &signals {
                engine.process_signal(black_box(signal));
            }
            engine.metrics().focus_changes
        });
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_process_signal,
    bench_attribution,
    bench_click_switch_cycle
);
criterion_main!(benches);
