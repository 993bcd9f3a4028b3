//! Business logic services

pub mod aggregator;
pub mod calendar;
pub mod calendar_grid;
pub mod google_auth;
pub mod inbox_watcher;
pub mod lead_export;
pub mod messaging;
pub mod meta_ads;
pub mod normalizer;
pub mod sheets;
pub mod vapi;

#[cfg(test)]
pub mod fakes;

use std::time::Duration;

use crate::defaults::UPSTREAM_TIMEOUT_SECS;

/// HTTP client for upstream calls; a stalled upstream fails after `timeout`.
pub fn upstream_client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .expect("Failed to create HTTP client")
}

pub fn upstream_client() -> reqwest::Client {
    upstream_client_with_timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
}
