// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Field-level change detection between a stored and a fresh beatdown.
//!
//! Upstream coordinates jitter slightly between fetches, so coordinates are
//! compared with a tolerance. Identity fields (`locationId`, `eventId`) and
//! bookkeeping fields are not compared here.

use crate::models::Beatdown;

/// Meters per degree of latitude (and of longitude at the equator).
const METERS_PER_DEGREE: f64 = 111_000.0;
/// Points closer than this are the same place.
const COORDINATE_TOLERANCE_METERS: f64 = 10.0;
/// 5 decimal places is roughly 1.1 m.
const COORDINATE_SCALE: f64 = 100_000.0;

/// Content field names as stored in Firestore.
pub mod fields {
    pub const DAY_OF_WEEK: &str = "dayOfWeek";
    pub const TIME_STRING: &str = "timeString";
    pub const TYPE: &str = "type";
    pub const REGION: &str = "region";
    pub const WEBSITE: &str = "website";
    pub const NOTES: &str = "notes";
    pub const NAME: &str = "name";
    pub const ADDRESS: &str = "address";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";
}

/// Whether two beatdowns have the same user-visible content.
pub fn equivalent(stored: &Beatdown, fresh: &Beatdown) -> bool {
    diff(stored, fresh).is_empty()
}

/// Names of the user-visible fields that differ, in a stable order.
pub fn diff(stored: &Beatdown, fresh: &Beatdown) -> Vec<&'static str> {
    let text_fields = [
        (fields::DAY_OF_WEEK, &stored.day_of_week, &fresh.day_of_week),
        (fields::TIME_STRING, &stored.time_string, &fresh.time_string),
        (fields::TYPE, &stored.event_type, &fresh.event_type),
        (fields::REGION, &stored.region, &fresh.region),
        (fields::WEBSITE, &stored.website, &fresh.website),
        (fields::NOTES, &stored.notes, &fresh.notes),
        (fields::NAME, &stored.name, &fresh.name),
        (fields::ADDRESS, &stored.address, &fresh.address),
    ];

    let mut changed: Vec<&'static str> = text_fields
        .into_iter()
        .filter(|(_, a, b)| !text_equal(a, b))
        .map(|(name, _, _)| name)
        .collect();

    if !coordinates_equivalent(stored.lat, stored.long, fresh.lat, fresh.long) {
        // Name whichever axis moved; if only the combination is off, both
        let lat_moved = round5(stored.lat) != round5(fresh.lat);
        let long_moved = round5(stored.long) != round5(fresh.long);
        if lat_moved || !long_moved {
            changed.push(fields::LAT);
        }
        if long_moved || !lat_moved {
            changed.push(fields::LONG);
        }
    }

    changed
}

fn text_equal(a: &str, b: &str) -> bool {
    a.trim() == b.trim()
}

fn round5(value: f64) -> f64 {
    (value * COORDINATE_SCALE).round()
}

/// Tolerant coordinate comparison.
///
/// Equal when both axes agree to 5 decimal places, or when the planar
/// approximate distance between the points is under 10 m.
pub fn coordinates_equivalent(lat_a: f64, long_a: f64, lat_b: f64, long_b: f64) -> bool {
    if round5(lat_a) == round5(lat_b) && round5(long_a) == round5(long_b) {
        return true;
    }
    approximate_distance_meters(lat_a, long_a, lat_b, long_b) < COORDINATE_TOLERANCE_METERS
}

/// Equirectangular distance approximation, good enough at meter scale.
pub fn approximate_distance_meters(lat_a: f64, long_a: f64, lat_b: f64, long_b: f64) -> f64 {
    let mean_lat = ((lat_a + lat_b) / 2.0).to_radians();
    let dy = (lat_a - lat_b) * METERS_PER_DEGREE;
    let dx = (long_a - long_b) * METERS_PER_DEGREE * mean_lat.cos();
    (dx * dx + dy * dy).sqrt()
}
