// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::document::ScoredDocument;
use crate::models::mode::{IndexState, IndexingMode};
use serde::{Deserialize, Serialize};

/// Which search command produced a result set. Pagination replays the same presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// Quick `search` command
    Search,
    /// `docs search` subcommand, longer excerpts
    DocsSearch,
}

impl CommandKind {
    pub fn excerpt_chars(&self) -> usize {
        match self {
            CommandKind::Search => 200,
            CommandKind::DocsSearch => 250,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Prev,
    Next,
}

/// Request for the `search` and `docs search` commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Search query (`keyword` is accepted for the quick search command)
    #[serde(alias = "keyword")]
    pub query: String,
    /// Platform identity of the user running the search
    pub requester_id: String,
}

/// One ranked result as shown to the user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub path: String,
    pub link: String,
    pub excerpt: String,
    pub score: u32,
}

impl SearchHit {
    pub fn from_scored(scored: &ScoredDocument, default_base: &str, excerpt_chars: usize) -> Self {
        Self {
            title: scored.document.title.clone(),
            path: scored.document.path.clone(),
            link: scored.document.link(default_base),
            excerpt: excerpt(&scored.document.content, excerpt_chars),
            score: scored.score,
        }
    }
}

/// One page of search results, or a no-results message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub command: CommandKind,
    pub total_results: usize,
    /// Zero-based page index
    pub page: usize,
    pub total_pages: usize,
    pub results: Vec<SearchHit>,
    /// Set when nothing matched
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Documentation sites to browse when nothing matched
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

/// Pagination button press
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigateRequest {
    pub direction: Direction,
    /// Requester who ran the search and owns the session
    pub owner_id: String,
    /// User who pressed the button
    pub actor_id: String,
    pub current_page: usize,
    pub command: CommandKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLink {
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryListing {
    pub name: String,
    pub documents: Vec<DocumentLink>,
}

/// Response for `docs list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub total: usize,
    pub docs_url: String,
    pub categories: Vec<CategoryListing>,
}

/// Response for `docs refresh`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    pub documents: usize,
    pub strategy: IndexingMode,
    /// Index state after the run
    pub index: IndexState,
    pub message: String,
}

/// Message posted by a repository webhook when documentation changed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentChangedNotification {
    #[serde(default)]
    pub webhook_id: Option<String>,
    #[serde(default)]
    pub embeds: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentChangedResponse {
    pub refreshed: bool,
    pub documents: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedLink {
    pub label: String,
    pub url: String,
}

impl NamedLink {
    pub fn new(label: &str, url: String) -> Self {
        Self {
            label: label.to_string(),
            url,
        }
    }
}

/// Response for the `contribute` subcommands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributeResponse {
    pub title: String,
    pub description: String,
    pub links: Vec<NamedLink>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// First `max_chars` characters of `text`, with an ellipsis when cut.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
