use hashrate_chart_wasm::domain::telemetry::{
    HashrateSeries, HistoryFragment, HistoryImporter, RetentionWindow, Timestamp, next_fetch_start, scale_raw_hashrate,
};
use quickcheck_macros::quickcheck;

fn fragment_from(base: u32, offsets: &[u16]) -> HistoryFragment {
    HistoryFragment {
        timestamp_base: u64::from(base),
        timestamps: offsets.iter().map(|&o| u64::from(o)).collect(),
        hashrate_10m: offsets.iter().map(|&o| f64::from(o)).collect(),
        hashrate_1h: vec![1.0; offsets.len()],
        hashrate_1d: vec![1.0; offsets.len()],
    }
}

#[quickcheck]
fn labels_stay_strictly_increasing(batches: Vec<(u32, Vec<u16>)>) -> bool {
    let importer = HistoryImporter::new(RetentionWindow::from_millis(u64::MAX));
    let mut series = HashrateSeries::new();

    for (base, offsets) in &batches {
        let _ = importer.import(&mut series, &fragment_from(*base, offsets), Timestamp::new(u64::from(u32::MAX)));
    }

    let snapshot = series.snapshot();
    let aligned = snapshot.hashrate_10m.len() == snapshot.len
        && snapshot.hashrate_1h.len() == snapshot.len
        && snapshot.hashrate_1d.len() == snapshot.len
        && snapshot.labels.len() == snapshot.len;
    aligned && snapshot.labels.windows(2).all(|pair| pair[0] < pair[1])
}

#[quickcheck]
fn window_is_bounded_after_import(base: u32, offsets: Vec<u16>, window: u16) -> bool {
    let retention = RetentionWindow::from_millis(u64::from(window));
    let importer = HistoryImporter::new(retention);
    let mut series = HashrateSeries::new();
    let now = Timestamp::new(u64::from(base) + u64::from(u16::MAX));

    let _ = importer.import(&mut series, &fragment_from(base, &offsets), now);

    series.oldest().is_none_or(|oldest| now.value() - oldest.value() <= retention.duration_ms())
}

#[quickcheck]
fn no_gap_on_resume(cursor: u32, elapsed: u32) -> bool {
    let cursor = Timestamp::new(u64::from(cursor));
    let now = Timestamp::new(cursor.value() + u64::from(elapsed));
    let retention = RetentionWindow::ONE_HOUR;
    let start = next_fetch_start(Some(cursor), now, retention);

    if cursor.value() + 1 < retention.floor(now).value() {
        start == retention.floor(now)
    } else {
        start == cursor.next()
    }
}

#[quickcheck]
fn scaling_is_exact(raw: u32) -> bool {
    let raw = f64::from(raw);
    (scale_raw_hashrate(raw) - raw * 10_000_000.0).abs() <= 1e-6 * raw.max(1.0)
}
