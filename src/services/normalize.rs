// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Flatten an upstream (location, event) pair into a stored beatdown.
//!
//! The fallback chains here mirror quirks of the upstream data: events may
//! carry their own region and address that override the location's, and
//! many fields are simply missing.

use crate::models::upstream::{UpstreamEvent, UpstreamLocation};
use crate::models::{Beatdown, DayOfWeek};

pub const UNKNOWN_REGION: &str = "Unknown Region";
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Reasons a single event cannot be turned into a beatdown.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NormalizeError {
    #[error("Event {event_id} has no usable day of week ({value:?})")]
    InvalidDay { event_id: i64, value: Option<String> },

    #[error("Event {event_id} references location {expected:?}, got location {actual}")]
    LocationMismatch {
        event_id: i64,
        expected: Option<i64>,
        actual: i64,
    },

    #[error("Location {location_id} has no coordinates")]
    MissingCoordinates { location_id: i64 },
}

/// Build a beatdown from an event and the location it references.
///
/// Bookkeeping fields (`lastUpdated`, `deleted`, `deletedAt`) are left at
/// their defaults; the caller stamps them when writing.
pub fn normalize(
    location: &UpstreamLocation,
    event: &UpstreamEvent,
) -> Result<Beatdown, NormalizeError> {
    if event.location_id != Some(location.id) {
        return Err(NormalizeError::LocationMismatch {
            event_id: event.id,
            expected: event.location_id,
            actual: location.id,
        });
    }

    let day: DayOfWeek = event
        .day_of_week
        .as_deref()
        .and_then(|d| d.parse().ok())
        .ok_or_else(|| NormalizeError::InvalidDay {
            event_id: event.id,
            value: event.day_of_week.clone(),
        })?;

    let (lat, long) = match (location.latitude, location.longitude) {
        (Some(lat), Some(long)) if lat.is_finite() && long.is_finite() => (lat, long),
        _ => {
            return Err(NormalizeError::MissingCoordinates {
                location_id: location.id,
            })
        }
    };

    Ok(Beatdown {
        day_of_week: day.as_str().to_string(),
        time_string: format_time_range(event.start_time.as_deref(), event.end_time.as_deref()),
        event_type: event_type_name(event),
        region: region_name(location, event),
        website: String::new(),
        notes: event.description.clone().unwrap_or_default(),
        name: display_name(location, event),
        address: address(location, event),
        lat,
        long,
        location_id: Some(location.id),
        event_id: Some(event.id),
        last_updated: None,
        deleted: false,
        deleted_at: None,
    })
}

/// Returns the string if it has non-whitespace content.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Event's own region wins over the location's.
fn region_name(location: &UpstreamLocation, event: &UpstreamEvent) -> String {
    event
        .regions
        .first()
        .and_then(|r| non_blank(r.region_name.as_deref()))
        .or_else(|| non_blank(location.region_name.as_deref()))
        .unwrap_or(UNKNOWN_REGION)
        .to_string()
}

fn display_name(location: &UpstreamLocation, event: &UpstreamEvent) -> String {
    non_blank(event.name.as_deref())
        .or_else(|| non_blank(event.location_name.as_deref()))
        .or_else(|| non_blank(location.location_name.as_deref()))
        .unwrap_or_default()
        .to_string()
}

fn event_type_name(event: &UpstreamEvent) -> String {
    event
        .event_types
        .first()
        .and_then(|t| non_blank(t.event_type_name.as_deref()))
        .unwrap_or(UNKNOWN_TYPE)
        .to_string()
}

fn address(location: &UpstreamLocation, event: &UpstreamEvent) -> String {
    if let Some(full) = non_blank(event.location.as_deref()) {
        return full.to_string();
    }

    let from_event = join_address([
        event.location_address.as_deref(),
        event.location_address2.as_deref(),
        event.location_city.as_deref(),
        event.location_state.as_deref(),
        event.location_zip.as_deref(),
    ]);
    if !from_event.is_empty() {
        return from_event;
    }

    join_address([
        location.address_street.as_deref(),
        location.address_street2.as_deref(),
        location.address_city.as_deref(),
        location.address_state.as_deref(),
        location.address_zip.as_deref(),
    ])
}

/// Join address parts with ", ", skipping blanks.
fn join_address(parts: [Option<&str>; 5]) -> String {
    parts
        .into_iter()
        .filter_map(non_blank)
        .map(str::trim)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a start/end pair as "5:30 am - 6:15 am".
///
/// A missing time formats as an empty string, so the separator is always
/// present.
pub fn format_time_range(start: Option<&str>, end: Option<&str>) -> String {
    format!(
        "{} - {}",
        start.map(format_time).unwrap_or_default(),
        end.map(format_time).unwrap_or_default()
    )
}

/// Format a 24-hour "HHMM" string as 12-hour "h:mm am".
///
/// Short inputs are left-padded ("530" is 5:30). Anything that is not one
/// to four digits formats as an empty string.
pub fn format_time(hhmm: &str) -> String {
    let trimmed = hhmm.trim();
    if trimmed.is_empty() || trimmed.len() > 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return String::new();
    }

    let padded = format!("{:0>4}", trimmed);
    let (hour_part, minute_part) = padded.split_at(2);
    let Ok(hour) = hour_part.parse::<u32>() else {
        return String::new();
    };

    let display_hour = match hour % 12 {
        0 => 12,
        h => h,
    };
    let suffix = if hour >= 12 { "pm" } else { "am" };

    format!("{}:{} {}", display_hour, minute_part, suffix)
}
