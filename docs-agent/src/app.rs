// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, command handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::config::Config;
use crate::error::{DocsError, MIN_QUERY_CHARS};
use crate::models::commands::{
    CategoryListing, CommandKind, ContentChangedNotification, ContentChangedResponse,
    ContributeResponse, DocumentLink, ListResponse, NavigateRequest, RefreshResponse, SearchHit,
    SearchRequest, SearchResponse,
};
use crate::models::notification::NotificationMessage;
use crate::models::version::VersionResponse;
use crate::services::contribute;
use crate::services::index::DocsIndex;
use crate::services::logging::redact_id;
use crate::services::notification::Notifier;
use crate::services::pager::{ResultPage, SessionStore};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `DOCS_AGENT_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("DOCS_AGENT_VERSION");

const GENERIC_FAILURE: &str = "An error occurred while processing your command";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub index: Arc<DocsIndex>,
    pub sessions: Arc<SessionStore>,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config, index: DocsIndex) -> Self {
        Self {
            config: Arc::new(config),
            index: Arc::new(index),
            sessions: Arc::new(SessionStore::new()),
            notifier: Notifier::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error response for command handlers.
///
/// Rejections meant for the user keep their message; everything else is logged and
/// replaced with a generic notice.
#[derive(Debug)]
pub struct ApiError(pub DocsError);

impl From<DocsError> for ApiError {
    fn from(err: DocsError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DocsError::QueryTooShort | DocsError::PageOutOfRange { .. } => StatusCode::BAD_REQUEST,
            DocsError::NotOwner => StatusCode::FORBIDDEN,
            DocsError::SessionNotFound => StatusCode::NOT_FOUND,
            DocsError::SessionExpired => StatusCode::GONE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if self.0.is_user_facing() {
            self.0.to_string()
        } else {
            error!(error = %self.0, "command failed");
            GENERIC_FAILURE.to_string()
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        agent: "docs-agent".to_string(),
        version: VERSION.to_string(),
        indexing_mode: state.index.mode().to_string(),
        index: state.index.state(),
    })
}

pub async fn search_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, payload, CommandKind::Search).map(Json)
}

pub async fn docs_search_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    run_search(&state, payload, CommandKind::DocsSearch).map(Json)
}

fn run_search(
    state: &AppState,
    request: SearchRequest,
    command: CommandKind,
) -> Result<SearchResponse, ApiError> {
    let query = request.query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        return Err(DocsError::QueryTooShort.into());
    }

    let results = state.index.search(query);
    info!(
        requester = %redact_id(&request.requester_id),
        query,
        results = results.len(),
        "search"
    );

    if results.is_empty() {
        return Ok(SearchResponse {
            query: query.to_string(),
            command,
            total_results: 0,
            page: 0,
            total_pages: 0,
            results: Vec::new(),
            message: Some(format!("No results found for \"{}\"", query)),
            sources: state.config.docs_urls.clone(),
        });
    }

    let page = state
        .sessions
        .start(&request.requester_id, query, command, results)?;
    Ok(page_response(page, state.config.primary_docs_url()))
}

pub async fn navigate_handler(
    State(state): State<AppState>,
    Json(payload): Json<NavigateRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = state.sessions.navigate(&payload).map_err(|e| {
        warn!(
            owner = %redact_id(&payload.owner_id),
            actor = %redact_id(&payload.actor_id),
            error = %e,
            "pagination rejected"
        );
        e
    })?;
    Ok(Json(page_response(page, state.config.primary_docs_url())))
}

fn page_response(page: ResultPage, default_base: &str) -> SearchResponse {
    let excerpt_chars = page.command.excerpt_chars();
    SearchResponse {
        query: page.query,
        command: page.command,
        total_results: page.total_results,
        page: page.page,
        total_pages: page.total_pages,
        results: page
            .results
            .iter()
            .map(|scored| SearchHit::from_scored(scored, default_base, excerpt_chars))
            .collect(),
        message: None,
        sources: Vec::new(),
    }
}

pub async fn list_handler(State(state): State<AppState>) -> Json<ListResponse> {
    let corpus = state.index.snapshot();
    let default_base = state.config.primary_docs_url();

    let mut grouped: BTreeMap<&str, Vec<DocumentLink>> = BTreeMap::new();
    for doc in corpus.iter() {
        grouped.entry(doc.category()).or_default().push(DocumentLink {
            title: doc.title.clone(),
            link: doc.link(default_base),
        });
    }

    Json(ListResponse {
        total: corpus.len(),
        docs_url: default_base.to_string(),
        categories: grouped
            .into_iter()
            .map(|(name, documents)| CategoryListing {
                name: name.to_string(),
                documents,
            })
            .collect(),
    })
}

pub async fn refresh_handler(State(state): State<AppState>) -> Json<RefreshResponse> {
    let outcome = state.index.refresh().await;
    let message = if outcome.success {
        format!(
            "Documentation index refreshed: {} documents indexed",
            outcome.documents
        )
    } else {
        format!(
            "Refresh failed; still serving {} previously indexed documents",
            outcome.documents
        )
    };

    Json(RefreshResponse {
        success: outcome.success,
        documents: outcome.documents,
        strategy: outcome.strategy,
        index: state.index.state(),
        message,
    })
}

#[derive(Debug, Deserialize)]
pub struct PullRequestQuery {
    pub file: Option<String>,
}

pub async fn contribute_guide_handler(State(state): State<AppState>) -> Json<ContributeResponse> {
    Json(contribute::guide(&state.config.repo_url))
}

pub async fn contribute_pr_handler(
    State(state): State<AppState>,
    Query(query): Query<PullRequestQuery>,
) -> Json<ContributeResponse> {
    Json(contribute::pull_request(
        &state.config.repo_url,
        query.file.as_deref(),
    ))
}

pub async fn contribute_issue_handler(State(state): State<AppState>) -> Json<ContributeResponse> {
    Json(contribute::issue(&state.config.repo_url))
}

/// Repository webhook relay: a webhook message carrying structured content triggers a reindex.
pub async fn content_changed_handler(
    State(state): State<AppState>,
    Json(payload): Json<ContentChangedNotification>,
) -> Json<ContentChangedResponse> {
    let webhook = match payload.webhook_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() && !payload.embeds.is_empty() => id,
        _ => {
            return Json(ContentChangedResponse {
                refreshed: false,
                documents: state.index.len(),
            })
        }
    };

    info!(webhook, "documentation change received, refreshing index");
    let outcome = state.index.refresh().await;

    if let Some(target) = &state.config.notification_target {
        let text = if outcome.success {
            format!(
                "Documentation index refreshed: {} documents",
                outcome.documents
            )
        } else {
            "Documentation refresh failed; serving the previous index".to_string()
        };
        if let Err(e) = state
            .notifier
            .send(target, &NotificationMessage::text(text))
            .await
        {
            warn!(error = %e, "failed to send refresh confirmation");
        }
    }

    Json(ContentChangedResponse {
        refreshed: outcome.success,
        documents: outcome.documents,
    })
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/version", get(version_handler))
        .route("/search", post(search_handler))
        .route("/docs/search", post(docs_search_handler))
        .route("/docs/list", get(list_handler))
        .route("/docs/refresh", post(refresh_handler))
        .route("/contribute/guide", get(contribute_guide_handler))
        .route("/contribute/pr", get(contribute_pr_handler))
        .route("/contribute/issue", get(contribute_issue_handler))
        .route("/pagination/navigate", post(navigate_handler))
        .route("/webhooks/content-changed", post(content_changed_handler))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::{IndexedDocument, Metadata};
    use crate::models::mode::{IndexState, IndexingMode};
    use crate::services::crawler::WebIndexer;
    use axum::body::Body;
    use axum::http::Request;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    fn doc(title: &str, path: &str, content: &str) -> IndexedDocument {
        IndexedDocument {
            title: title.to_string(),
            path: path.to_string(),
            url: format!("/docs/{}", path),
            content: content.to_string(),
            full_content: content.to_string(),
            source_base: None,
            metadata: Metadata::new(),
        }
    }

    fn test_state(documents: Vec<IndexedDocument>) -> AppState {
        let config = Config::from_lookup(|key| match key {
            "DOCS_URLS" => Some("https://docs.example.com".to_string()),
            "GITHUB_REPO_URL" => Some("https://github.com/acme/handbook".to_string()),
            _ => None,
        });
        let index = DocsIndex::new(
            IndexingMode::Local,
            "does-not-exist",
            config.docs_urls.clone(),
            WebIndexer::default(),
        )
        .with_documents(documents);
        AppState::new(config, index)
    }

    fn many_docs(n: usize) -> Vec<IndexedDocument> {
        (0..n)
            .map(|i| doc(&format!("Plugin {i}"), &format!("plugins/p{i}"), "plugin api"))
            .collect()
    }

    async fn send<T: DeserializeOwned>(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, T) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_version_endpoint_response() {
        let app = create_router(test_state(Vec::new()));
        let (status, version): (_, VersionResponse) = send(app, "GET", "/version", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(version.agent, "docs-agent");
        assert_eq!(version.version, VERSION);
        assert_eq!(version.indexing_mode, "local");
        assert_eq!(version.index, IndexState::Ready { documents: 0 });

        let parts: Vec<&str> = version.version.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.parse::<u32>().is_ok()));
    }

    #[tokio::test]
    async fn test_search_returns_first_page() {
        let state = test_state(many_docs(12));
        let app = create_router(state.clone());
        let (status, response): (_, SearchResponse) = send(
            app,
            "POST",
            "/search",
            Some(serde_json::json!({"keyword": "plugin", "requester_id": "1234567"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.total_results, 12);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.results.len(), 5);
        assert_eq!(
            response.results[0].link,
            "https://docs.example.com/docs/plugins/p0"
        );
        assert!(state.sessions.get("1234567").is_some());
    }

    #[tokio::test]
    async fn test_short_query_is_rejected() {
        let app = create_router(test_state(many_docs(1)));
        let (status, body): (_, serde_json::Value) = send(
            app,
            "POST",
            "/docs/search",
            Some(serde_json::json!({"query": " a ", "requester_id": "1"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "please provide a search query with at least 2 characters"
        );
    }

    #[tokio::test]
    async fn test_no_results_lists_sources() {
        let state = test_state(many_docs(2));
        let app = create_router(state.clone());
        let (status, response): (_, SearchResponse) = send(
            app,
            "POST",
            "/docs/search",
            Some(serde_json::json!({"query": "kubernetes", "requester_id": "1"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(response.total_results, 0);
        assert!(response.message.unwrap().contains("kubernetes"));
        assert_eq!(response.sources, vec!["https://docs.example.com"]);
        assert!(state.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_navigation_through_router() {
        let state = test_state(many_docs(12));
        let search = serde_json::json!({"query": "plugin", "requester_id": "owner-1"});
        let _: (_, SearchResponse) =
            send(create_router(state.clone()), "POST", "/docs/search", Some(search)).await;

        let next = serde_json::json!({
            "direction": "next",
            "owner_id": "owner-1",
            "actor_id": "owner-1",
            "current_page": 1,
            "command": "docs_search"
        });
        let (status, page): (_, SearchResponse) = send(
            create_router(state.clone()),
            "POST",
            "/pagination/navigate",
            Some(next.clone()),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(page.page, 2);
        assert_eq!(page.results.len(), 2);

        let mut stranger = next;
        stranger["actor_id"] = serde_json::json!("someone-else");
        let (status, _): (_, serde_json::Value) = send(
            create_router(state),
            "POST",
            "/pagination/navigate",
            Some(stranger),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_groups_by_category() {
        let app = create_router(test_state(vec![
            doc("Intro", "intro.md", ""),
            doc("Setup", "guide/setup.md", ""),
            doc("Deploy", "guide/deploy.md", ""),
        ]));
        let (status, list): (_, ListResponse) = send(app, "GET", "/docs/list", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.total, 3);
        let names: Vec<&str> = list.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["guide", "root"]);
        assert_eq!(list.categories[0].documents.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_corpus() {
        let app = create_router(test_state(many_docs(3)));
        let (status, refresh): (_, RefreshResponse) =
            send(app, "POST", "/docs/refresh", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!refresh.success);
        assert_eq!(refresh.documents, 3);
        assert!(matches!(refresh.index, IndexState::Failed { .. }));
    }

    #[tokio::test]
    async fn test_getting_started_end_to_end() {
        let temp = tempfile::tempdir().unwrap();
        let guide = temp.path().join("guide");
        std::fs::create_dir_all(&guide).unwrap();
        std::fs::write(
            guide.join("intro.md"),
            "---\ntitle: \"Getting Started\"\n---\n## Setup\nInstall the CLI and run it.",
        )
        .unwrap();

        let config = Config::from_lookup(|_| None);
        let index = DocsIndex::new(
            IndexingMode::Local,
            temp.path(),
            Vec::new(),
            WebIndexer::default(),
        );
        let state = AppState::new(config, index);

        let (_, refresh): (_, RefreshResponse) =
            send(create_router(state.clone()), "POST", "/docs/refresh", None).await;
        assert!(refresh.success);
        assert_eq!(refresh.documents, 1);
        assert_eq!(refresh.strategy, IndexingMode::Local);
        assert_eq!(refresh.index, IndexState::Ready { documents: 1 });

        let results = state.index.search("getting started");
        assert_eq!(results[0].document.url, "/docs/guide/intro");
        assert!(results[0].score >= 50);
    }

    #[tokio::test]
    async fn test_contribute_pr_with_file() {
        let app = create_router(test_state(Vec::new()));
        let (status, response): (_, ContributeResponse) =
            send(app, "GET", "/contribute/pr?file=docs/intro.md", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.links[0].url,
            "https://github.com/acme/handbook/edit/main/docs/intro.md"
        );
    }

    #[tokio::test]
    async fn test_content_changed_without_embeds_is_ignored() {
        let app = create_router(test_state(many_docs(2)));
        let (status, response): (_, ContentChangedResponse) = send(
            app,
            "POST",
            "/webhooks/content-changed",
            Some(serde_json::json!({"webhook_id": "42"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!response.refreshed);
        assert_eq!(response.documents, 2);
    }

    #[tokio::test]
    async fn test_content_changed_without_webhook_id_is_ignored() {
        let app = create_router(test_state(many_docs(2)));
        let (_, response): (_, ContentChangedResponse) = send(
            app,
            "POST",
            "/webhooks/content-changed",
            Some(serde_json::json!({"embeds": [{"title": "push"}]})),
        )
        .await;

        assert!(!response.refreshed);
        assert_eq!(response.documents, 2);
    }

    #[tokio::test]
    async fn test_content_changed_reindexes_and_confirms() {
        use wiremock::matchers::{body_partial_json, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let target = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook/token"))
            .and(body_partial_json(serde_json::json!({
                "content": "Documentation index refreshed: 2 documents"
            })))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&target)
            .await;

        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("intro.md"), "# Intro").unwrap();
        std::fs::write(temp.path().join("setup.md"), "# Setup").unwrap();

        let hook = format!("{}/hook/token", target.uri());
        let config = Config::from_lookup(|key| match key {
            "NOTIFICATION_TARGET" => Some(hook.clone()),
            _ => None,
        });
        let index = DocsIndex::new(
            IndexingMode::Local,
            temp.path(),
            Vec::new(),
            WebIndexer::default(),
        )
        .with_documents(many_docs(5));
        let state = AppState::new(config, index);

        let (status, response): (_, ContentChangedResponse) = send(
            create_router(state.clone()),
            "POST",
            "/webhooks/content-changed",
            Some(serde_json::json!({
                "webhook_id": "123456",
                "embeds": [{"title": "[acme/handbook] 1 new commit"}]
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(response.refreshed);
        assert_eq!(response.documents, 2);
        assert_eq!(state.index.len(), 2);
        target.verify().await;
    }

    #[tokio::test]
    async fn test_invalid_route_returns_404() {
        let app = create_router(test_state(Vec::new()));
        let response = app
            .oneshot(Request::builder().uri("/invalid").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_errors_are_hidden() {
        let response =
            ApiError(DocsError::unreachable("https://internal", "boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
