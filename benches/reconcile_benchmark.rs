use beatdown_sync::models::upstream::{EventTypeRef, RegionRef, UpstreamEvent, UpstreamLocation};
use beatdown_sync::services::reconcile;
use criterion::{criterion_group, criterion_main, Criterion};
use std::collections::HashMap;
use std::hint::black_box;

const DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Roughly the size of the national feed: a few thousand locations with
/// a couple of events each.
fn synthetic_feed(locations: i64) -> (Vec<UpstreamEvent>, Vec<UpstreamLocation>) {
    let locs: Vec<UpstreamLocation> = (0..locations)
        .map(|id| UpstreamLocation {
            id,
            latitude: Some(30.0 + id as f64 * 0.001),
            longitude: Some(-81.0 - id as f64 * 0.001),
            region_name: Some(format!("Region {}", id % 300)),
            address_street: Some(format!("{} Main St", id)),
            ..Default::default()
        })
        .collect();

    let events: Vec<UpstreamEvent> = (0..locations * 2)
        .map(|id| UpstreamEvent {
            id,
            name: Some(format!("AO {}", id / 2)),
            location_id: Some(id / 2),
            day_of_week: Some(DAYS[(id % 7) as usize].to_string()),
            start_time: Some("0530".to_string()),
            end_time: Some("0615".to_string()),
            regions: vec![RegionRef {
                region_id: None,
                region_name: Some(format!("Region {}", (id / 2) % 300)),
            }],
            event_types: vec![EventTypeRef {
                event_type_id: Some(1),
                event_type_name: Some("Bootcamp".to_string()),
            }],
            ..Default::default()
        })
        .collect();

    (events, locs)
}

fn benchmark_reconcile(c: &mut Criterion) {
    let (events, locations) = synthetic_feed(3000);
    let now = "2026-01-01T00:00:00Z";

    // Steady state: everything already stored and unchanged
    let initial = reconcile(&HashMap::new(), &events, &locations, now);
    let stored: HashMap<_, _> = initial
        .upserts
        .into_iter()
        .map(|u| (u.id, u.beatdown))
        .collect();

    let mut group = c.benchmark_group("reconcile");

    group.bench_function("initial_load", |b| {
        b.iter(|| reconcile(black_box(&HashMap::new()), &events, &locations, now))
    });

    group.bench_function("steady_state", |b| {
        b.iter(|| reconcile(black_box(&stored), &events, &locations, now))
    });

    group.finish();
}

criterion_group!(benches, benchmark_reconcile);
criterion_main!(benches);
