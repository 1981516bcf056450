// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};

/// Where the documentation corpus is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexingMode {
    /// Only index the local docs directory
    Local,
    /// Only crawl the published documentation sites
    Web,
    /// Local first, crawl when local content is missing or empty
    #[default]
    Auto,
}

impl IndexingMode {
    /// Parse an indexing mode, case-insensitively.
    /// Unknown values fall back to `Auto`; `None` is returned for them so callers can warn.
    pub fn parse(mode: &str) -> Option<Self> {
        match mode.trim().to_lowercase().as_str() {
            "local" => Some(IndexingMode::Local),
            "web" => Some(IndexingMode::Web),
            "auto" => Some(IndexingMode::Auto),
            _ => None,
        }
    }
}

/// Lifecycle of the documentation index: `Idle -> Indexing -> {Ready, Failed}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum IndexState {
    Idle,
    Indexing,
    Ready { documents: usize },
    /// Last run failed; the previous corpus is still served
    Failed { error: String },
}

impl std::fmt::Display for IndexingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexingMode::Local => write!(f, "local"),
            IndexingMode::Web => write!(f, "web"),
            IndexingMode::Auto => write!(f, "auto"),
        }
    }
}
