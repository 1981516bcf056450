// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Front-matter values carried over from a markdown document
pub type Metadata = BTreeMap<String, serde_yaml::Value>;

/// One entry of the documentation corpus.
///
/// Local markdown files and crawled HTML pages share this shape. Web documents carry
/// `source_base`; local documents carry `metadata`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Display title, never empty
    pub title: String,
    /// Corpus-relative path, slash-separated, without a leading slash
    pub path: String,
    /// Site-relative URL (e.g. `/docs/guide/intro`)
    pub url: String,
    /// Plain text used for search, capped for crawled pages
    pub content: String,
    /// Untruncated text (web) or raw markdown body (local)
    pub full_content: String,
    /// Base URL of the documentation source the page was crawled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_base: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

impl IndexedDocument {
    /// Absolute link to the page. Web documents use their own source, local ones `default_base`.
    pub fn link(&self, default_base: &str) -> String {
        let base = self.source_base.as_deref().unwrap_or(default_base);
        format!("{}{}", base, self.url)
    }

    /// Top-level path segment used to group documents in listings.
    pub fn category(&self) -> &str {
        match self.path.split('/').next() {
            Some(segment) if !segment.is_empty() && segment != self.path => segment,
            _ => "root",
        }
    }
}

/// A document that matched a query, with its relevance score (always >= 1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    #[serde(flatten)]
    pub document: IndexedDocument,
    pub score: u32,
}
