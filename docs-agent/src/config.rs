// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Environment-driven configuration.
//!
//! Every key is optional. `Config::from_lookup` takes the lookup as a closure so tests can
//! feed a map instead of touching the process environment.

use crate::models::mode::IndexingMode;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_REPO_OWNER: &str = "facebook";
const DEFAULT_REPO_NAME: &str = "docusaurus";
const DEFAULT_REFRESH_MINUTES: u64 = 30;
const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_USER_AGENT: &str = "DocsAgent Documentation Indexer";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Documentation site base URLs, trailing slashes removed, in priority order
    pub docs_urls: Vec<String>,
    /// Repository used to build contribution links
    pub repo_url: String,
    pub indexing_mode: IndexingMode,
    pub docs_root: PathBuf,
    pub auto_refresh: bool,
    pub refresh_interval: Duration,
    /// Webhook URL that receives refresh confirmations and announcements
    pub notification_target: Option<String>,
    pub user_agent: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let owner = get("GITHUB_REPO_OWNER").unwrap_or_else(|| DEFAULT_REPO_OWNER.to_string());
        let name = get("GITHUB_REPO_NAME").unwrap_or_else(|| DEFAULT_REPO_NAME.to_string());

        // DOCS_URLS takes a comma-separated list; DOCS_URL is the older single-site key
        let docs_urls = get("DOCS_URLS")
            .or_else(|| get("DOCS_URL"))
            .map(|raw| parse_docs_urls(&raw))
            .filter(|urls| !urls.is_empty())
            .unwrap_or_else(|| vec![format!("https://{}.github.io/{}", owner, name)]);

        let repo_url = get("GITHUB_REPO_URL")
            .map(|u| normalize_base_url(&u))
            .unwrap_or_else(|| format!("https://github.com/{}/{}", owner, name));

        let indexing_mode = match get("INDEXING_MODE") {
            Some(raw) => IndexingMode::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown INDEXING_MODE, using auto");
                IndexingMode::Auto
            }),
            None => IndexingMode::Auto,
        };

        let refresh_minutes = get("REFRESH_INTERVAL_MINUTES")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_REFRESH_MINUTES);

        Self {
            docs_urls,
            repo_url,
            indexing_mode,
            docs_root: get("DOCS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("docs")),
            auto_refresh: get("AUTO_REFRESH").is_some_and(|v| v.eq_ignore_ascii_case("true")),
            refresh_interval: Duration::from_secs(refresh_minutes * 60),
            notification_target: get("NOTIFICATION_TARGET"),
            user_agent: get("USER_AGENT").unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            port: get("PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PORT),
        }
    }

    /// Site used for links when a document has no source of its own.
    pub fn primary_docs_url(&self) -> &str {
        self.docs_urls.first().map(String::as_str).unwrap_or_default()
    }
}

/// Strip trailing slashes from a base URL
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Split a comma-separated list of documentation URLs, dropping blanks and duplicates.
pub fn parse_docs_urls(raw: &str) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for url in raw.split(',').map(normalize_base_url) {
        if url.is_empty() {
            continue;
        }
        if url::Url::parse(&url).is_err() {
            warn!(url = %url, "ignoring invalid documentation URL");
            continue;
        }
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}
