// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Index orchestrator: owns the corpus and rebuilds it with the configured strategy.
//!
//! Every refresh builds a fresh corpus and swaps it in only when the run succeeds. Searches
//! running during a refresh keep the snapshot they started with.

use crate::config::Config;
use crate::error::{DocsError, Result};
use crate::models::document::{IndexedDocument, ScoredDocument};
use crate::models::mode::{IndexState, IndexingMode};
use crate::services::crawler::WebIndexer;
use crate::services::local_indexer::index_directory;
use crate::services::search;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub type Corpus = Arc<Vec<IndexedDocument>>;

/// Result of one refresh run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefreshOutcome {
    pub success: bool,
    /// Corpus size after the run; the retained corpus when the run failed
    pub documents: usize,
    /// Strategy that produced the corpus, or the configured mode when the run failed
    pub strategy: IndexingMode,
}

pub struct DocsIndex {
    corpus: RwLock<Corpus>,
    state: RwLock<IndexState>,
    refresh_lock: Mutex<()>,
    mode: IndexingMode,
    docs_root: PathBuf,
    sources: Vec<String>,
    web: WebIndexer,
}

impl DocsIndex {
    pub fn new(
        mode: IndexingMode,
        docs_root: impl Into<PathBuf>,
        sources: Vec<String>,
        web: WebIndexer,
    ) -> Self {
        Self {
            corpus: RwLock::new(Arc::new(Vec::new())),
            state: RwLock::new(IndexState::Idle),
            refresh_lock: Mutex::new(()),
            mode,
            docs_root: docs_root.into(),
            sources,
            web,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.indexing_mode,
            config.docs_root.clone(),
            config.docs_urls.clone(),
            WebIndexer::new(config.user_agent.clone()),
        )
    }

    /// Start with an already built corpus
    pub fn with_documents(self, documents: Vec<IndexedDocument>) -> Self {
        let count = documents.len();
        *self.corpus.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(documents);
        *self.state.write().unwrap_or_else(|e| e.into_inner()) =
            IndexState::Ready { documents: count };
        self
    }

    pub fn mode(&self) -> IndexingMode {
        self.mode
    }

    /// Current corpus. Cheap: clones the `Arc`, not the documents.
    pub fn snapshot(&self) -> Corpus {
        self.corpus
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn state(&self) -> IndexState {
        self.state.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn search(&self, query: &str) -> Vec<ScoredDocument> {
        search::search(&self.snapshot(), query)
    }

    /// Rebuild the corpus. Concurrent calls run one after another.
    pub async fn refresh(&self) -> RefreshOutcome {
        let _guard = self.refresh_lock.lock().await;
        self.set_state(IndexState::Indexing);
        info!(mode = %self.mode, "refreshing documentation index");

        match self.run().await {
            Ok((strategy, documents)) => {
                let count = documents.len();
                *self.corpus.write().unwrap_or_else(|e| e.into_inner()) = Arc::new(documents);
                self.set_state(IndexState::Ready { documents: count });
                info!(strategy = %strategy, documents = count, "documentation index ready");
                RefreshOutcome {
                    success: true,
                    documents: count,
                    strategy,
                }
            }
            Err(e) => {
                error!(mode = %self.mode, error = %e, "indexing failed, keeping previous corpus");
                self.set_state(IndexState::Failed {
                    error: e.to_string(),
                });
                RefreshOutcome {
                    success: false,
                    documents: self.len(),
                    strategy: self.mode,
                }
            }
        }
    }

    async fn run(&self) -> Result<(IndexingMode, Vec<IndexedDocument>)> {
        match self.mode {
            IndexingMode::Local => Ok((IndexingMode::Local, self.run_local().await?)),
            IndexingMode::Web => Ok((IndexingMode::Web, self.run_web().await?)),
            IndexingMode::Auto => match self.run_local().await {
                Ok(documents) if !documents.is_empty() => Ok((IndexingMode::Local, documents)),
                Ok(_) => {
                    info!(root = %self.docs_root.display(), "no local documents, crawling sources");
                    Ok((IndexingMode::Web, self.run_web().await?))
                }
                Err(e) => {
                    warn!(error = %e, "local indexing unavailable, crawling sources");
                    Ok((IndexingMode::Web, self.run_web().await?))
                }
            },
        }
    }

    async fn run_local(&self) -> Result<Vec<IndexedDocument>> {
        let root = self.docs_root.clone();
        tokio::task::spawn_blocking(move || index_directory(&root))
            .await
            .map_err(|e| DocsError::Io(std::io::Error::other(e)))?
    }

    async fn run_web(&self) -> Result<Vec<IndexedDocument>> {
        let mut documents = Vec::new();
        let report = self.web.index_sources(&self.sources, &mut documents).await;
        if documents.is_empty() {
            let failed: usize = report.sources.iter().map(|s| s.failed).sum();
            return Err(DocsError::SourceUnreachable {
                url: self.sources.join(", "),
                message: format!("no documents indexed ({} pages failed)", failed),
            });
        }
        Ok(documents)
    }

    fn set_state(&self, state: IndexState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }
}
