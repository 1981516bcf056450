// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Outbound announcements: release and documentation-update messages posted to a webhook.

use crate::error::{DocsError, Result};
use crate::models::notification::{Embed, EmbedField, NotificationMessage};
use crate::services::logging::redact_url;
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::info;

const RELEASE_COLOR: u32 = 0x00ff00;
const DOCS_UPDATE_COLOR: u32 = 0x5865f2;
const RELEASE_BODY_CHARS: usize = 500;
const FIELD_CHARS: usize = 1024;
const MAX_LISTED_FILES: usize = 10;
const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Announcement built from CI environment values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateNotification {
    Release {
        tag: String,
        name: String,
        body: String,
        url: Option<String>,
        docs_url: Option<String>,
    },
    DocsUpdate {
        actor: String,
        branch: String,
        commit_message: String,
        changed_files: Vec<String>,
        commit_url: Option<String>,
        docs_url: Option<String>,
    },
}

impl UpdateNotification {
    /// Build from environment-style keys. `GITHUB_EVENT_NAME=release` selects a release
    /// announcement; anything else is a documentation update.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        if get("GITHUB_EVENT_NAME").as_deref() == Some("release") {
            let tag = or("RELEASE_TAG", "unknown");
            UpdateNotification::Release {
                name: get("RELEASE_NAME").unwrap_or_else(|| tag.clone()),
                tag,
                body: get("RELEASE_BODY").unwrap_or_default(),
                url: get("RELEASE_URL"),
                docs_url: get("DOCS_URL"),
            }
        } else {
            UpdateNotification::DocsUpdate {
                actor: or("GITHUB_ACTOR", "unknown"),
                branch: or("GITHUB_REF_NAME", "main"),
                commit_message: get("GITHUB_COMMIT_MESSAGE").unwrap_or_default(),
                changed_files: get("CHANGED_FILES")
                    .map(|raw| {
                        raw.split(|c: char| c == ',' || c.is_whitespace())
                            .filter(|f| !f.is_empty())
                            .map(str::to_string)
                            .collect()
                    })
                    .unwrap_or_default(),
                commit_url: get("GITHUB_COMMIT_URL"),
                docs_url: get("DOCS_URL"),
            }
        }
    }

    pub fn render(&self, timestamp: DateTime<Utc>) -> NotificationMessage {
        let embed = match self {
            UpdateNotification::Release {
                tag,
                name,
                body,
                url,
                docs_url,
            } => {
                let mut fields = vec![EmbedField {
                    inline: true,
                    ..EmbedField::new("Version", tag.clone())
                }];
                if let Some(docs_url) = docs_url {
                    fields.push(EmbedField::new("Documentation", docs_url.clone()));
                }
                Embed {
                    title: format!("New release: {}", name),
                    description: if body.is_empty() {
                        "A new version has been released.".to_string()
                    } else {
                        truncate(body, RELEASE_BODY_CHARS)
                    },
                    url: url.clone(),
                    color: RELEASE_COLOR,
                    fields,
                    timestamp: Some(timestamp.to_rfc3339()),
                }
            }
            UpdateNotification::DocsUpdate {
                actor,
                branch,
                commit_message,
                changed_files,
                commit_url,
                docs_url,
            } => {
                let mut fields = Vec::new();
                if !commit_message.is_empty() {
                    fields.push(EmbedField::new("Commit", truncate(commit_message, FIELD_CHARS)));
                }
                if !changed_files.is_empty() {
                    fields.push(EmbedField::new("Changed files", list_files(changed_files)));
                }
                if let Some(docs_url) = docs_url {
                    fields.push(EmbedField::new("Documentation", docs_url.clone()));
                }
                Embed {
                    title: "Documentation updated".to_string(),
                    description: format!("{} pushed changes to `{}`", actor, branch),
                    url: commit_url.clone(),
                    color: DOCS_UPDATE_COLOR,
                    fields,
                    timestamp: Some(timestamp.to_rfc3339()),
                }
            }
        };

        let content = match self {
            UpdateNotification::Release { .. } => "A new release is out",
            UpdateNotification::DocsUpdate { .. } => "The documentation has been updated",
        };
        NotificationMessage {
            content: content.to_string(),
            embeds: vec![embed],
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", head)
}

fn list_files(files: &[String]) -> String {
    let mut listed: Vec<String> = files
        .iter()
        .take(MAX_LISTED_FILES)
        .map(|f| format!("- {}", f))
        .collect();
    if files.len() > MAX_LISTED_FILES {
        listed.push(format!("...and {} more", files.len() - MAX_LISTED_FILES));
    }
    truncate(&listed.join("\n"), FIELD_CHARS)
}

/// Posts messages to webhook URLs
#[derive(Clone, Default)]
pub struct Notifier {
    client: reqwest::Client,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn send(&self, target: &str, message: &NotificationMessage) -> Result<()> {
        let redacted = redact_url(target);
        self.client
            .post(target)
            .json(message)
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            // reqwest errors embed the full URL, which holds the webhook secret
            .map_err(|e| DocsError::unreachable(&redacted, e.without_url()))?;

        info!(target = %redacted, "notification sent");
        Ok(())
    }
}
