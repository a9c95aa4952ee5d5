// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! F3 Nation API client for fetching events and locations.
//!
//! Handles:
//! - Bearer token + `client` header authentication
//! - Bulk event and location fetches
//! - Single event/location lookups (404 means gone)
//! - Bounded retry of transient failures (429, 5xx, network), honoring
//!   `Retry-After` when the server sends one

use crate::config::Config;
use crate::error::AppError;
use crate::models::upstream::{
    EventEnvelope, EventList, LocationEnvelope, LocationList, UpstreamEvent, UpstreamLocation,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Large enough to fetch every event or location in one request.
const BULK_PAGE_SIZE: u32 = 10_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of a single HTTP attempt.
enum Attempt<T> {
    Done(Result<T, AppError>),
    Retry {
        message: String,
        wait_hint: Option<Duration>,
    },
}

/// F3 Nation API client.
#[derive(Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    client_name: String,
    max_attempts: u32,
    backoff: Duration,
    max_backoff: Duration,
}

impl UpstreamClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            client_name: config.api_client.clone(),
            max_attempts: config.upstream_max_attempts.max(1),
            backoff: config.upstream_backoff,
            max_backoff: config.upstream_max_backoff,
        }
    }

    /// Fetch every event.
    ///
    /// A response shorter than its `totalCount` is an error: reconciling a
    /// partial list would soft-delete everything past the page.
    pub async fn fetch_events(&self) -> Result<Vec<UpstreamEvent>, AppError> {
        let list: EventList = self
            .get_json("/v1/event", &[("pageSize", BULK_PAGE_SIZE.to_string())])
            .await?;

        ensure_complete("events", list.events.len(), list.total_count)?;

        tracing::debug!(count = list.events.len(), "Fetched upstream events");
        Ok(list.events)
    }

    /// Fetch every location. Short responses fail like `fetch_events`.
    pub async fn fetch_locations(&self) -> Result<Vec<UpstreamLocation>, AppError> {
        let list: LocationList = self
            .get_json("/v1/location", &[("pageSize", BULK_PAGE_SIZE.to_string())])
            .await?;

        ensure_complete("locations", list.locations.len(), list.total_count)?;

        tracing::debug!(count = list.locations.len(), "Fetched upstream locations");
        Ok(list.locations)
    }

    /// Fetch one event; `None` if upstream no longer has it.
    pub async fn fetch_event(&self, event_id: i64) -> Result<Option<UpstreamEvent>, AppError> {
        let path = format!("/v1/event/id/{}", event_id);
        match self.get_json::<EventEnvelope>(&path, &[]).await {
            Ok(envelope) => Ok(Some(envelope.event)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fetch one location; `None` if upstream no longer has it.
    pub async fn fetch_location(
        &self,
        location_id: i64,
    ) -> Result<Option<UpstreamLocation>, AppError> {
        let path = format!("/v1/location/id/{}", location_id);
        match self.get_json::<LocationEnvelope>(&path, &[]).await {
            Ok(envelope) => Ok(Some(envelope.location)),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET a JSON resource, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);

        for attempt in 1..=self.max_attempts {
            match self.attempt(&url, query).await {
                Attempt::Done(result) => return result,
                Attempt::Retry { message, wait_hint } => {
                    if attempt == self.max_attempts {
                        tracing::error!(
                            url = %url,
                            attempts = attempt,
                            error = %message,
                            "Upstream request failed, giving up"
                        );
                        return Err(AppError::UpstreamUnavailable {
                            attempts: attempt,
                            message,
                        });
                    }

                    let wait = self.retry_delay(attempt, wait_hint);
                    tracing::warn!(
                        url = %url,
                        attempt,
                        wait_ms = wait.as_millis() as u64,
                        error = %message,
                        "Transient upstream failure, retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
            }
        }

        // max_attempts is at least 1, so the loop always returns
        Err(AppError::UpstreamUnavailable {
            attempts: self.max_attempts,
            message: "no attempts made".to_string(),
        })
    }

    async fn attempt<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Attempt<T> {
        let response = match self
            .http
            .get(url)
            .bearer_auth(&self.api_key)
            .header("client", &self.client_name)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return Attempt::Retry {
                    message: e.to_string(),
                    wait_hint: None,
                }
            }
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Done(
                response
                    .json()
                    .await
                    .map_err(|e| AppError::UpstreamApi(format!("JSON parse error: {}", e))),
            );
        }

        let wait_hint = retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();

        match status {
            StatusCode::NOT_FOUND => Attempt::Done(Err(AppError::NotFound(url.to_string()))),
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!("Upstream rate limit hit (429)");
                Attempt::Retry {
                    message: format!("HTTP {}", status),
                    wait_hint,
                }
            }
            s if s.is_server_error() => Attempt::Retry {
                message: format!("HTTP {}: {}", status, body),
                wait_hint,
            },
            _ => Attempt::Done(Err(AppError::UpstreamApi(format!(
                "HTTP {}: {}",
                status, body
            )))),
        }
    }

    /// Server hint if present, else exponential backoff; both capped.
    fn retry_delay(&self, attempt: u32, wait_hint: Option<Duration>) -> Duration {
        let exponential = self
            .backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)));
        wait_hint.unwrap_or(exponential).min(self.max_backoff)
    }
}

/// Fail a bulk fetch that returned fewer items than upstream says exist.
fn ensure_complete(kind: &str, fetched: usize, total: Option<u64>) -> Result<(), AppError> {
    match total {
        Some(total) if total > fetched as u64 => {
            tracing::error!(kind, total, fetched, "Upstream returned a partial list");
            Err(AppError::UpstreamApi(format!(
                "partial {} list: got {} of {}",
                kind, fetched, total
            )))
        }
        _ => Ok(()),
    }
}

/// Parse a `Retry-After` header given as seconds or as an HTTP date.
fn retry_after(headers: &reqwest::header::HeaderMap) -> Option<Duration> {
    let value = headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim();

    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }

    let at = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let wait = at.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}
