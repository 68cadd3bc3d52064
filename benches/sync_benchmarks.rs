use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use hashrate_chart_wasm::application::{SyncConfig, TelemetrySync};
use hashrate_chart_wasm::domain::telemetry::{HashrateSeries, HistoryFragment, HistoryImporter, Timestamp};
use hashrate_chart_wasm::infrastructure::MemoryStore;
use std::hint::black_box;
use std::time::Duration;

const BASE: u64 = 1_700_000_000_000;
const STEP_MS: u64 = 5_000;

/// One fragment with `count` samples, 5 s apart like the device records them
fn generate_fragment(count: usize, base: u64) -> HistoryFragment {
    HistoryFragment {
        timestamp_base: base,
        timestamps: (0..count as u64).map(|i| i * STEP_MS).collect(),
        hashrate_10m: (0..count).map(|i| 47_500.0 + (i as f64 * 0.1).sin() * 500.0).collect(),
        hashrate_1h: vec![47_500.0; count],
        hashrate_1d: vec![47_400.0; count],
    }
}

fn bench_import(c: &mut Criterion) {
    let mut group = c.benchmark_group("history_import");
    group.measurement_time(Duration::from_secs(5));

    for count in [100usize, 720, 5_000] {
        let fragment = generate_fragment(count, BASE);
        let now = Timestamp::new(BASE + count as u64 * STEP_MS);

        group.bench_with_input(BenchmarkId::new("import_fresh", count), &count, |b, _| {
            b.iter(|| {
                let mut series = HashrateSeries::new();
                HistoryImporter::default().import(&mut series, black_box(&fragment), now).ok();
                black_box(series.len())
            })
        });
    }

    group.finish();
}

fn bench_incremental_polls(c: &mut Criterion) {
    let mut group = c.benchmark_group("incremental_polls");

    // A full hour in the buffer, then one new sample per poll with eviction
    group.bench_function("one_sample_per_poll_with_persist", |b| {
        b.iter_batched(
            || {
                let mut sync = TelemetrySync::hydrate(MemoryStore::new(), SyncConfig::default()).ok()?;
                sync.import_fragment(&generate_fragment(720, BASE), Timestamp::new(BASE + 720 * STEP_MS)).ok()?;
                Some(sync)
            },
            |sync| {
                let mut sync = sync?;
                for poll in 0..12u64 {
                    let ts = BASE + (720 + poll) * STEP_MS;
                    sync.import_fragment(&generate_fragment(1, ts), Timestamp::new(ts)).ok()?;
                }
                Some(black_box(sync.projection().len))
            },
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("evict_half", |b| {
        let fragment = generate_fragment(1_440, BASE);
        b.iter_batched(
            || {
                let mut series = HashrateSeries::new();
                series.append(fragment.to_points());
                series
            },
            |mut series| black_box(series.evict_before(Timestamp::new(BASE + 720 * STEP_MS))),
            criterion::BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_import, bench_incremental_polls);
criterion_main!(benches);
