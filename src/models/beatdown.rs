// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Beatdown (workout event) model as stored in Firestore.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Stored beatdown document in the `beatdowns` collection.
///
/// Field names match what the web app reads, so they are camelCase on the
/// wire. Every content field defaults when missing so that documents written
/// by older sync versions still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Beatdown {
    /// Lowercase day name ("monday")
    #[serde(default)]
    pub day_of_week: String,
    /// Display time range ("5:30 am - 6:15 am")
    #[serde(default)]
    pub time_string: String,
    /// Workout type ("Bootcamp", "Run", ...)
    #[serde(default, rename = "type")]
    pub event_type: String,
    /// Owning region name
    #[serde(default)]
    pub region: String,
    /// Always empty: the upstream feed does not carry a website
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub lat: f64,
    #[serde(default)]
    pub long: f64,
    /// Upstream location ID
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub location_id: Option<i64>,
    /// Upstream event ID (absent on documents written before the ID migration)
    #[serde(default)]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub event_id: Option<i64>,
    /// Last write timestamp (RFC3339)
    #[serde(default)]
    pub last_updated: Option<String>,
    /// Soft-delete flag
    #[serde(default)]
    pub deleted: bool,
    /// Soft-delete timestamp (RFC3339)
    #[serde(default)]
    pub deleted_at: Option<String>,
}

/// Day of the week a beatdown meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an upstream day name is not a weekday.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown day of week: {0:?}")]
pub struct UnknownDayOfWeek(pub String);

impl FromStr for DayOfWeek {
    type Err = UnknownDayOfWeek;

    /// Parse a day name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monday" => Ok(DayOfWeek::Monday),
            "tuesday" => Ok(DayOfWeek::Tuesday),
            "wednesday" => Ok(DayOfWeek::Wednesday),
            "thursday" => Ok(DayOfWeek::Thursday),
            "friday" => Ok(DayOfWeek::Friday),
            "saturday" => Ok(DayOfWeek::Saturday),
            "sunday" => Ok(DayOfWeek::Sunday),
            _ => Err(UnknownDayOfWeek(s.to_string())),
        }
    }
}

impl Beatdown {
    /// Whether this document has ever been stamped by a sync pass.
    pub fn has_update_timestamp(&self) -> bool {
        self.last_updated
            .as_deref()
            .is_some_and(|ts| !ts.trim().is_empty())
    }
}
