// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error taxonomy shared by the indexer, the search engine and the command surface.

use std::path::PathBuf;
use thiserror::Error;

/// Minimum number of characters a search keyword must have.
pub const MIN_QUERY_CHARS: usize = 2;

#[derive(Debug, Error)]
pub enum DocsError {
    /// Sitemap or page fetch failed (network error, timeout, non-success status)
    #[error("failed to fetch {url}: {message}")]
    SourceUnreachable { url: String, message: String },

    /// A single document could not be turned into an `IndexedDocument`
    #[error("failed to extract {location}: {message}")]
    Extraction { location: String, message: String },

    /// Sitemap body was not XML or had an unknown root element
    #[error("invalid sitemap {url}: {message}")]
    Sitemap { url: String, message: String },

    #[error("local docs directory not found: {}", .0.display())]
    DocsRootMissing(PathBuf),

    #[error("missing configuration: {0}")]
    ConfigurationMissing(String),

    #[error("search session not found, please run the search again")]
    SessionNotFound,

    #[error("search session expired, please run the search again")]
    SessionExpired,

    #[error("only the user who ran this search can change its pages")]
    NotOwner,

    #[error("page {requested} is out of range (total pages: {total_pages})")]
    PageOutOfRange { requested: i64, total_pages: usize },

    #[error("please provide a search query with at least {MIN_QUERY_CHARS} characters")]
    QueryTooShort,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DocsError {
    pub fn unreachable(url: &str, err: impl std::fmt::Display) -> Self {
        DocsError::SourceUnreachable {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    pub fn extraction(location: impl Into<String>, err: impl std::fmt::Display) -> Self {
        DocsError::Extraction {
            location: location.into(),
            message: err.to_string(),
        }
    }

    /// Whether the error is a rejection meant for the user rather than a failure.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DocsError::SessionNotFound
                | DocsError::SessionExpired
                | DocsError::NotOwner
                | DocsError::PageOutOfRange { .. }
                | DocsError::QueryTooShort
        )
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_too_short_message_mentions_minimum() {
        assert_eq!(
            DocsError::QueryTooShort.to_string(),
            "please provide a search query with at least 2 characters"
        );
    }

    #[test]
    fn test_user_facing_classification() {
        assert!(DocsError::NotOwner.is_user_facing());
        assert!(DocsError::PageOutOfRange {
            requested: 3,
            total_pages: 3
        }
        .is_user_facing());
        assert!(!DocsError::unreachable("https://example.com", "timeout").is_user_facing());
        assert!(!DocsError::ConfigurationMissing("NOTIFICATION_TARGET".into()).is_user_facing());
    }

    #[test]
    fn test_unreachable_names_url() {
        let err = DocsError::unreachable("https://example.com/sitemap.xml", "connection refused");
        assert!(err.to_string().contains("https://example.com/sitemap.xml"));
    }
}
