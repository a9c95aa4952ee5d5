// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document ID derivation for beatdowns.
//!
//! Two schemes exist. Legacy IDs were built from region, name and day, so
//! two events with the same name on the same day in one region collided.
//! Current IDs append the upstream event ID. Both derivations are kept
//! separate: the extra hyphen cleanup of the current scheme was never
//! applied to legacy documents, so legacy IDs must be reproduced as-is to
//! find them.

use crate::models::Beatdown;

/// Which ID scheme to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdScheme {
    /// `region_name_day`
    Legacy,
    /// `region_name_day_eventId`, with hyphen runs collapsed and trimmed
    Current,
}

/// Derive the document ID for a beatdown under the given scheme.
///
/// A missing event ID contributes an empty segment under the current scheme.
pub fn derive_id(beatdown: &Beatdown, scheme: IdScheme) -> String {
    match scheme {
        IdScheme::Legacy => slugify(&format!(
            "{}_{}_{}",
            beatdown.region, beatdown.name, beatdown.day_of_week
        )),
        IdScheme::Current => {
            let event_id = beatdown
                .event_id
                .map(|id| id.to_string())
                .unwrap_or_default();
            collapse_hyphens(&slugify(&format!(
                "{}_{}_{}_{}",
                beatdown.region, beatdown.name, beatdown.day_of_week, event_id
            )))
        }
    }
}

/// Lowercase and replace each run of characters outside `[a-z0-9_-]` with
/// a single hyphen. Underscores are the field separator and survive.
fn slugify(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;

    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('-');
            in_run = true;
        }
    }

    out
}

/// Collapse repeated hyphens and strip them from both ends.
fn collapse_hyphens(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    for c in slug.chars() {
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }
    out.trim_matches('-').to_string()
}
