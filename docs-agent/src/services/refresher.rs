// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::services::index::DocsIndex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Periodically rebuilds the documentation index
pub struct AutoRefresher {
    index: Arc<DocsIndex>,
    interval: Duration,
}

impl AutoRefresher {
    pub fn new(index: Arc<DocsIndex>, interval: Duration) -> Self {
        Self { index, interval }
    }

    /// Refresh every `interval`, starting one interval from now. Never returns.
    pub async fn start(&self) {
        info!(interval_secs = self.interval.as_secs(), "auto-refresh started");

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }

    /// Run a single refresh. Returns whether it succeeded.
    pub async fn tick(&self) -> bool {
        let outcome = self.index.refresh().await;
        if outcome.success {
            info!(documents = outcome.documents, "scheduled refresh finished");
        } else {
            warn!(
                documents = outcome.documents,
                "scheduled refresh failed, serving previous corpus"
            );
        }
        outcome.success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mode::IndexingMode;
    use crate::services::crawler::WebIndexer;

    #[tokio::test]
    async fn test_tick_refreshes_index() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("intro.md"), "# Intro").unwrap();
        let index = Arc::new(DocsIndex::new(
            IndexingMode::Local,
            temp.path(),
            Vec::new(),
            WebIndexer::default(),
        ));

        let refresher = AutoRefresher::new(index.clone(), Duration::from_secs(60));
        assert!(refresher.tick().await);
        assert_eq!(index.len(), 1);
    }
}
