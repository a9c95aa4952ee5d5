// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod beatdown;
pub mod upstream;
pub mod webhook;

pub use beatdown::{Beatdown, DayOfWeek};
pub use upstream::{UpstreamEvent, UpstreamLocation};
pub use webhook::{WebhookAction, WebhookLog, WebhookOutcome, WebhookPayload};
