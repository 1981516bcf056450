// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Web indexer: sitemap discovery, batched page fetches and HTML extraction.

use crate::config::{normalize_base_url, DEFAULT_USER_AGENT};
use crate::error::{DocsError, Result};
use crate::models::document::IndexedDocument;
use crate::services::extractor::extract_html;
use crate::services::sitemap::{parse_sitemap, Sitemap};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pages fetched concurrently per batch
pub const PAGE_BATCH_SIZE: usize = 10;
pub const PAGE_TIMEOUT: Duration = Duration::from_secs(8);
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of crawling one documentation source
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceReport {
    pub source: String,
    /// URLs kept from the sitemap after domain filtering
    pub discovered: usize,
    pub indexed: usize,
    pub failed: usize,
    /// Sitemap discovery failed and the `/docs/` page was tried instead
    pub used_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of a web indexing run over all sources
#[derive(Debug, Clone, Default, Serialize)]
pub struct WebIndexReport {
    pub sources: Vec<SourceReport>,
}

impl WebIndexReport {
    pub fn indexed(&self) -> usize {
        self.sources.iter().map(|s| s.indexed).sum()
    }
}

/// Crawls published documentation sites
#[derive(Clone)]
pub struct WebIndexer {
    client: reqwest::Client,
    user_agent: String,
    batch_size: usize,
    page_timeout: Duration,
    sitemap_timeout: Duration,
}

impl Default for WebIndexer {
    fn default() -> Self {
        Self::new(DEFAULT_USER_AGENT)
    }
}

impl WebIndexer {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: user_agent.into(),
            batch_size: PAGE_BATCH_SIZE,
            page_timeout: PAGE_TIMEOUT,
            sitemap_timeout: SITEMAP_TIMEOUT,
        }
    }

    /// Override the per-request timeouts
    pub fn with_timeouts(mut self, page_timeout: Duration, sitemap_timeout: Duration) -> Self {
        self.page_timeout = page_timeout;
        self.sitemap_timeout = sitemap_timeout;
        self
    }

    /// Crawl every source in order, appending documents to `corpus` as they arrive.
    ///
    /// Errors never abort the run: each source reports what it managed to index.
    pub async fn index_sources(
        &self,
        sources: &[String],
        corpus: &mut Vec<IndexedDocument>,
    ) -> WebIndexReport {
        let mut report = WebIndexReport::default();

        for source in sources {
            let source = normalize_base_url(source);
            info!(source = %source, "crawling documentation source");
            report.sources.push(self.index_source(&source, corpus).await);
        }

        info!(
            indexed = report.indexed(),
            corpus = corpus.len(),
            "web indexing finished"
        );
        report
    }

    /// Crawl a single source, falling back to its `/docs/` page when the sitemap is unusable.
    pub async fn index_source(&self, source: &str, corpus: &mut Vec<IndexedDocument>) -> SourceReport {
        let mut report = SourceReport {
            source: source.to_string(),
            ..SourceReport::default()
        };

        match self.discover_urls(source).await {
            Ok(urls) => {
                report.discovered = urls.len();
                if urls.is_empty() {
                    warn!(source = %source, "no documentation URLs found in sitemap");
                    return report;
                }
                let (indexed, failed) = self.fetch_in_batches(source, &urls, corpus).await;
                report.indexed = indexed;
                report.failed = failed;
            }
            Err(e) => {
                warn!(source = %source, error = %e, "sitemap discovery failed, trying fallback page");
                report.error = Some(e.to_string());
                report.used_fallback = true;

                let fallback_url = format!("{}/docs/", source);
                match self.fetch_page(&fallback_url, source).await {
                    Ok(doc) => {
                        corpus.push(doc);
                        report.indexed = 1;
                        info!(url = %fallback_url, "indexed fallback page");
                    }
                    Err(e) => {
                        report.failed = 1;
                        warn!(url = %fallback_url, error = %e, "fallback page failed");
                    }
                }
            }
        }

        report
    }

    /// Page URLs listed in the source's sitemap that belong to the source itself.
    pub async fn discover_urls(&self, source: &str) -> Result<Vec<String>> {
        let sitemap_url = format!("{}/sitemap.xml", source);
        let body = self.fetch_text(&sitemap_url, self.sitemap_timeout).await?;

        let urls = match parse_sitemap(&sitemap_url, &body)? {
            Sitemap::UrlSet(urls) => urls,
            Sitemap::Index(children) => {
                info!(sitemap = %sitemap_url, children = children.len(), "found sitemap index");
                let mut urls = Vec::new();
                for child in children {
                    match self.fetch_child_sitemap(&child).await {
                        Ok(mut child_urls) => urls.append(&mut child_urls),
                        Err(e) => warn!(sitemap = %child, error = %e, "skipping child sitemap"),
                    }
                }
                urls
            }
            Sitemap::Unknown { root } => {
                warn!(sitemap = %sitemap_url, root = %root, "unknown sitemap structure");
                Vec::new()
            }
        };

        let total = urls.len();
        let mut seen = HashSet::new();
        let kept: Vec<String> = urls
            .into_iter()
            .filter(|url| url.starts_with(source))
            .filter(|url| seen.insert(url.clone()))
            .collect();

        info!(source = %source, total, kept = kept.len(), "sitemap URLs discovered");
        Ok(kept)
    }

    async fn fetch_child_sitemap(&self, url: &str) -> Result<Vec<String>> {
        let body = self.fetch_text(url, self.sitemap_timeout).await?;
        match parse_sitemap(url, &body)? {
            Sitemap::UrlSet(urls) => Ok(urls),
            Sitemap::Index(_) => Err(DocsError::Sitemap {
                url: url.to_string(),
                message: "nested sitemap indexes are not followed".to_string(),
            }),
            Sitemap::Unknown { root } => Err(DocsError::Sitemap {
                url: url.to_string(),
                message: format!("unknown root element <{}>", root),
            }),
        }
    }

    /// Fetch `urls` in fixed-size batches. Every page in a batch settles before the next
    /// batch starts; one failure never affects its siblings.
    async fn fetch_in_batches(
        &self,
        source: &str,
        urls: &[String],
        corpus: &mut Vec<IndexedDocument>,
    ) -> (usize, usize) {
        let (mut indexed, mut failed) = (0, 0);

        for (batch_no, batch) in urls.chunks(self.batch_size.max(1)).enumerate() {
            let results = join_all(batch.iter().map(|url| self.fetch_page(url, source))).await;

            for (url, result) in batch.iter().zip(results) {
                match result {
                    Ok(doc) => {
                        corpus.push(doc);
                        indexed += 1;
                    }
                    Err(e) => {
                        failed += 1;
                        warn!(url = %url, error = %e, "failed to index page");
                    }
                }
            }

            let processed = ((batch_no + 1) * self.batch_size.max(1)).min(urls.len());
            debug!(source = %source, processed, total = urls.len(), "crawl progress");
        }

        (indexed, failed)
    }

    /// Fetch one page and extract it.
    pub async fn fetch_page(&self, page_url: &str, source: &str) -> Result<IndexedDocument> {
        let html = self.fetch_text(page_url, self.page_timeout).await?;
        Ok(extract_html(page_url, source, &html))
    }

    async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| DocsError::unreachable(url, e))?
            .error_for_status()
            .map_err(|e| DocsError::unreachable(url, e))?;

        response
            .text()
            .await
            .map_err(|e| DocsError::unreachable(url, e))
    }
}
