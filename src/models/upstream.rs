// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! F3 Nation API response models.
//!
//! The API is loose about which fields are present, so nearly everything
//! is optional and the fallback rules live in the normalizer.

use serde::Deserialize;

/// A scheduled event (one weekly workout) from `/v1/event`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamEvent {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Missing means active
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub location_id: Option<i64>,
    #[serde(default)]
    pub day_of_week: Option<String>,
    /// 24-hour "HHMM"
    #[serde(default)]
    pub start_time: Option<String>,
    /// 24-hour "HHMM"
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub regions: Vec<RegionRef>,
    #[serde(default)]
    pub event_types: Vec<EventTypeRef>,
    /// Composed full address of the event's location
    #[serde(default)]
    pub location: Option<String>,
    /// Bare location name
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub location_address: Option<String>,
    #[serde(default)]
    pub location_address2: Option<String>,
    #[serde(default)]
    pub location_city: Option<String>,
    #[serde(default)]
    pub location_state: Option<String>,
    #[serde(default)]
    pub location_zip: Option<String>,
}

impl UpstreamEvent {
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRef {
    #[serde(default)]
    pub region_id: Option<i64>,
    #[serde(default)]
    pub region_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTypeRef {
    #[serde(default)]
    pub event_type_id: Option<i64>,
    #[serde(default)]
    pub event_type_name: Option<String>,
}

/// A physical location (AO) from `/v1/location`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamLocation {
    pub id: i64,
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub region_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub address_street: Option<String>,
    #[serde(default)]
    pub address_street2: Option<String>,
    #[serde(default)]
    pub address_city: Option<String>,
    #[serde(default)]
    pub address_state: Option<String>,
    #[serde(default)]
    pub address_zip: Option<String>,
    /// Missing means active
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl UpstreamLocation {
    pub fn is_active(&self) -> bool {
        self.is_active.unwrap_or(true)
    }
}

/// Response envelope for the bulk event list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub events: Vec<UpstreamEvent>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Response envelope for the bulk location list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationList {
    #[serde(default)]
    pub locations: Vec<UpstreamLocation>,
    #[serde(default)]
    pub total_count: Option<u64>,
}

/// Response envelope for a single event.
#[derive(Debug, Clone, Deserialize)]
pub struct EventEnvelope {
    pub event: UpstreamEvent,
}

/// Response envelope for a single location.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationEnvelope {
    pub location: UpstreamLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_with_sparse_fields() {
        let json = serde_json::json!({
            "id": 9,
            "name": "Gauntlet",
            "dayOfWeek": "monday",
            "locationId": 5,
            "startTime": "0530",
            "endTime": "0615",
            "regions": [{ "regionName": "River City" }],
            "extraField": "ignored"
        });

        let event: UpstreamEvent = serde_json::from_value(json).unwrap();
        assert_eq!(event.id, 9);
        assert_eq!(event.location_id, Some(5));
        assert_eq!(event.regions[0].region_name.as_deref(), Some("River City"));
        assert!(event.event_types.is_empty());
        assert!(event.is_active());
    }

    #[test]
    fn test_location_null_coordinates() {
        let json = serde_json::json!({
            "id": 5,
            "latitude": null,
            "longitude": -81.6,
            "isActive": false
        });

        let location: UpstreamLocation = serde_json::from_value(json).unwrap();
        assert_eq!(location.latitude, None);
        assert_eq!(location.longitude, Some(-81.6));
        assert!(!location.is_active());
    }
}
