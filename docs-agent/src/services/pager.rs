// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Result pages and per-requester pagination sessions.

use crate::error::{DocsError, Result};
use crate::models::commands::{CommandKind, Direction, NavigateRequest};
use crate::models::document::ScoredDocument;
use crate::services::logging::redact_id;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::debug;

pub const PAGE_SIZE: usize = 5;
/// Idle time after which a session is dropped
pub const SESSION_TTL: Duration = Duration::from_secs(10 * 60);

pub fn total_pages(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1))
}

/// Slice of `items` shown on zero-based `page`.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Result<&[T]> {
    let page_size = page_size.max(1);
    let pages = total_pages(items.len(), page_size);
    if page >= pages {
        return Err(DocsError::PageOutOfRange {
            requested: i64::try_from(page).unwrap_or(i64::MAX),
            total_pages: pages,
        });
    }
    let start = page * page_size;
    let end = (start + page_size).min(items.len());
    Ok(&items[start..end])
}

/// Ranked results of one search, owned by the requester who ran it
#[derive(Debug, Clone)]
pub struct SearchSession {
    pub owner: String,
    pub query: String,
    pub command: CommandKind,
    pub results: Vec<ScoredDocument>,
    pub current_page: usize,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl SearchSession {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        // A clock that went backwards yields an error here: treat as fresh
        (now - self.last_active)
            .to_std()
            .is_ok_and(|idle| idle > SESSION_TTL)
    }

    fn page(&self, page: usize, command: CommandKind) -> Result<ResultPage> {
        let results = paginate(&self.results, page, PAGE_SIZE)?.to_vec();
        Ok(ResultPage {
            query: self.query.clone(),
            command,
            page,
            total_pages: total_pages(self.results.len(), PAGE_SIZE),
            total_results: self.results.len(),
            results,
        })
    }
}

/// One page of a session's results
#[derive(Debug, Clone)]
pub struct ResultPage {
    pub query: String,
    pub command: CommandKind,
    pub page: usize,
    pub total_pages: usize,
    pub total_results: usize,
    pub results: Vec<ScoredDocument>,
}

/// Pagination sessions keyed by requester id
#[derive(Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SearchSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a fresh search for `owner`, replacing any previous one, and return its first page.
    ///
    /// Expired sessions of every requester are swept first. `results` must not be empty.
    pub fn start(
        &self,
        owner: &str,
        query: &str,
        command: CommandKind,
        results: Vec<ScoredDocument>,
    ) -> Result<ResultPage> {
        self.start_at(owner, query, command, results, Utc::now())
    }

    pub fn start_at(
        &self,
        owner: &str,
        query: &str,
        command: CommandKind,
        results: Vec<ScoredDocument>,
        now: DateTime<Utc>,
    ) -> Result<ResultPage> {
        let mut sessions = self.lock();
        sweep_locked(&mut sessions, now);

        let session = SearchSession {
            owner: owner.to_string(),
            query: query.to_string(),
            command,
            results,
            current_page: 0,
            created_at: now,
            last_active: now,
        };
        let first = session.page(0, command)?;
        sessions.insert(owner.to_string(), session);
        debug!(owner = %redact_id(owner), results = first.total_results, "search session started");
        Ok(first)
    }

    /// Move the owner's session one page in `request.direction`.
    pub fn navigate(&self, request: &NavigateRequest) -> Result<ResultPage> {
        self.navigate_at(request, Utc::now())
    }

    pub fn navigate_at(&self, request: &NavigateRequest, now: DateTime<Utc>) -> Result<ResultPage> {
        if request.actor_id != request.owner_id {
            return Err(DocsError::NotOwner);
        }

        let mut sessions = self.lock();
        let expired = match sessions.get(&request.owner_id) {
            None => return Err(DocsError::SessionNotFound),
            Some(session) => session.is_expired(now),
        };
        if expired {
            sessions.remove(&request.owner_id);
            return Err(DocsError::SessionExpired);
        }
        let session = sessions
            .get_mut(&request.owner_id)
            .ok_or(DocsError::SessionNotFound)?;

        let current = i64::try_from(request.current_page).unwrap_or(i64::MAX);
        let target = match request.direction {
            Direction::Prev => current - 1,
            Direction::Next => current.saturating_add(1),
        };
        let pages = total_pages(session.results.len(), PAGE_SIZE);
        let page = usize::try_from(target)
            .ok()
            .filter(|p| *p < pages)
            .ok_or(DocsError::PageOutOfRange {
                requested: target,
                total_pages: pages,
            })?;

        let result = session.page(page, request.command)?;
        session.current_page = page;
        session.last_active = now;
        Ok(result)
    }

    /// Drop sessions idle longer than `SESSION_TTL`. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        sweep_locked(&mut self.lock(), now)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, owner: &str) -> Option<SearchSession> {
        self.lock().get(owner).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SearchSession>> {
        // A panic while holding the lock cannot leave the map half-written
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn sweep_locked(sessions: &mut HashMap<String, SearchSession>, now: DateTime<Utc>) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(now));
    let removed = before - sessions.len();
    if removed > 0 {
        debug!(removed, "swept expired search sessions");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{IndexedDocument, Metadata};
    use chrono::TimeDelta;

    fn results(n: usize) -> Vec<ScoredDocument> {
        (0..n)
            .map(|i| ScoredDocument {
                document: IndexedDocument {
                    title: format!("Doc {i}"),
                    path: format!("doc-{i}"),
                    url: format!("/docs/doc-{i}"),
                    content: String::new(),
                    full_content: String::new(),
                    source_base: None,
                    metadata: Metadata::new(),
                },
                score: 1,
            })
            .collect()
    }

    fn nav(owner: &str, actor: &str, page: usize, direction: Direction) -> NavigateRequest {
        NavigateRequest {
            direction,
            owner_id: owner.to_string(),
            actor_id: actor.to_string(),
            current_page: page,
            command: CommandKind::Search,
        }
    }

    #[test]
    fn test_paginate_twelve_results() {
        let items: Vec<u32> = (0..12).collect();
        assert_eq!(total_pages(items.len(), PAGE_SIZE), 3);
        assert_eq!(paginate(&items, 0, PAGE_SIZE).unwrap().len(), 5);
        assert_eq!(paginate(&items, 2, PAGE_SIZE).unwrap(), &[10, 11]);
        assert!(matches!(
            paginate(&items, 3, PAGE_SIZE),
            Err(DocsError::PageOutOfRange {
                requested: 3,
                total_pages: 3
            })
        ));
    }

    #[test]
    fn test_paginate_empty_rejects_every_page() {
        let items: Vec<u32> = Vec::new();
        assert!(paginate(&items, 0, PAGE_SIZE).is_err());
    }

    #[test]
    fn test_navigation_walks_pages_and_rejects_past_end() {
        let store = SessionStore::new();
        let first = store
            .start("alice", "setup", CommandKind::Search, results(12))
            .unwrap();
        assert_eq!(first.page, 0);
        assert_eq!(first.total_pages, 3);

        let second = store.navigate(&nav("alice", "alice", 0, Direction::Next)).unwrap();
        assert_eq!(second.page, 1);
        assert_eq!(second.results[0].document.title, "Doc 5");

        let last = store.navigate(&nav("alice", "alice", 1, Direction::Next)).unwrap();
        assert_eq!(last.page, 2);
        assert_eq!(last.results.len(), 2);
        assert_eq!(store.get("alice").unwrap().current_page, 2);

        let err = store
            .navigate(&nav("alice", "alice", 2, Direction::Next))
            .unwrap_err();
        assert!(matches!(err, DocsError::PageOutOfRange { requested: 3, .. }));

        let err = store
            .navigate(&nav("alice", "alice", 0, Direction::Prev))
            .unwrap_err();
        assert!(matches!(err, DocsError::PageOutOfRange { requested: -1, .. }));
    }

    #[test]
    fn test_only_owner_can_navigate() {
        let store = SessionStore::new();
        store
            .start("alice", "setup", CommandKind::Search, results(8))
            .unwrap();
        let err = store
            .navigate(&nav("alice", "mallory", 0, Direction::Next))
            .unwrap_err();
        assert!(matches!(err, DocsError::NotOwner));
    }

    #[test]
    fn test_missing_session() {
        let store = SessionStore::new();
        let err = store.navigate(&nav("bob", "bob", 0, Direction::Next)).unwrap_err();
        assert!(matches!(err, DocsError::SessionNotFound));
    }

    #[test]
    fn test_session_expires_after_ttl() {
        let store = SessionStore::new();
        let start = Utc::now();
        store
            .start_at("alice", "setup", CommandKind::DocsSearch, results(8), start)
            .unwrap();

        let later = start + TimeDelta::minutes(11);
        let err = store
            .navigate_at(&nav("alice", "alice", 0, Direction::Next), later)
            .unwrap_err();
        assert!(matches!(err, DocsError::SessionExpired));
        assert!(store.is_empty());
    }

    #[test]
    fn test_activity_extends_session() {
        let store = SessionStore::new();
        let start = Utc::now();
        store
            .start_at("alice", "setup", CommandKind::Search, results(12), start)
            .unwrap();

        let t1 = start + TimeDelta::minutes(8);
        store
            .navigate_at(&nav("alice", "alice", 0, Direction::Next), t1)
            .unwrap();
        let t2 = start + TimeDelta::minutes(16);
        assert!(store
            .navigate_at(&nav("alice", "alice", 1, Direction::Next), t2)
            .is_ok());
    }

    #[test]
    fn test_new_search_sweeps_and_overwrites() {
        let store = SessionStore::new();
        let start = Utc::now();
        store
            .start_at("alice", "old", CommandKind::Search, results(3), start)
            .unwrap();
        store
            .start_at("bob", "other", CommandKind::Search, results(3), start)
            .unwrap();

        let later = start + TimeDelta::minutes(15);
        store
            .start_at("alice", "new", CommandKind::Search, results(6), later)
            .unwrap();

        assert_eq!(store.len(), 1);
        let session = store.get("alice").unwrap();
        assert_eq!(session.query, "new");
        assert_eq!(session.results.len(), 6);
    }

    #[test]
    fn test_sweep_keeps_fresh_sessions() {
        let store = SessionStore::new();
        let start = Utc::now();
        store
            .start_at("alice", "q", CommandKind::Search, results(1), start)
            .unwrap();
        assert_eq!(store.sweep_at(start + TimeDelta::minutes(5)), 0);
        assert_eq!(store.sweep_at(start + TimeDelta::minutes(10) + TimeDelta::seconds(1)), 1);
    }
}
