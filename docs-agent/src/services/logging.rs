// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Tracing setup and redaction helpers for log fields.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";
const VISIBLE_ID_CHARS: usize = 5;

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Returns an error when a subscriber is already installed.
pub fn init(default_filter: Option<&str>) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter.unwrap_or(DEFAULT_FILTER)));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
}

/// Redact a requester id for logging.
/// Shows the first five characters: "12345..."
pub fn redact_id(id: &str) -> String {
    if id.chars().count() <= VISIBLE_ID_CHARS {
        return "***".to_string();
    }
    let head: String = id.chars().take(VISIBLE_ID_CHARS).collect();
    format!("{}...", head)
}

/// Redact the secret path of a webhook URL, keeping scheme and host.
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(url) => match url.host_str() {
            Some(host) => format!("{}://{}/***", url.scheme(), host),
            None => "***".to_string(),
        },
        // Not a URL: redact completely
        Err(_) => "***".to_string(),
    }
}
