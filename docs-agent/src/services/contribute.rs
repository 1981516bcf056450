// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Contribution links built from the repository URL. No index access.

use crate::models::commands::{ContributeResponse, NamedLink};

const DEFAULT_BRANCH: &str = "main";

/// How to contribute: where the sources live and how changes get in.
pub fn guide(repo_url: &str) -> ContributeResponse {
    ContributeResponse {
        title: "Contributing to the documentation".to_string(),
        description: "Documentation lives in the repository. Edit a page, open a pull request, \
                      or report a problem with an issue."
            .to_string(),
        links: vec![
            NamedLink::new("Repository", repo_url.to_string()),
            NamedLink::new("Create a pull request", format!("{}/compare", repo_url)),
            NamedLink::new("Report an issue", format!("{}/issues/new", repo_url)),
            NamedLink::new(
                "Contribution guidelines",
                format!("{}/blob/{}/CONTRIBUTING.md", repo_url, DEFAULT_BRANCH),
            ),
        ],
        notes: vec![
            "Pages are markdown files under the docs/ directory".to_string(),
            "Front-matter `title` sets the page title shown in search".to_string(),
            "Images go in docs/img/".to_string(),
        ],
    }
}

/// Links for opening a pull request, optionally for one file.
pub fn pull_request(repo_url: &str, file: Option<&str>) -> ContributeResponse {
    match file.map(|f| f.trim().trim_start_matches('/')).filter(|f| !f.is_empty()) {
        Some(file) => ContributeResponse {
            title: format!("Edit {}", file),
            description: "Edit the file in the browser, then open a pull request with your change."
                .to_string(),
            links: vec![
                NamedLink::new(
                    "Edit file",
                    format!("{}/edit/{}/{}", repo_url, DEFAULT_BRANCH, file),
                ),
                NamedLink::new(
                    "Open pull request",
                    format!("{}/compare/{}...HEAD", repo_url, DEFAULT_BRANCH),
                ),
                NamedLink::new("Fork repository", format!("{}/fork", repo_url)),
            ],
            notes: Vec::new(),
        },
        None => ContributeResponse {
            title: "Open a pull request".to_string(),
            description: "Fork the repository, commit your change on a branch, then open a pull \
                          request."
                .to_string(),
            links: vec![
                NamedLink::new("Create a pull request", format!("{}/compare", repo_url)),
                NamedLink::new("Fork repository", format!("{}/fork", repo_url)),
                NamedLink::new("Repository", repo_url.to_string()),
            ],
            notes: Vec::new(),
        },
    }
}

pub fn issue(repo_url: &str) -> ContributeResponse {
    ContributeResponse {
        title: "Report a documentation issue".to_string(),
        description: "Found something wrong or missing? Open an issue describing the page and \
                      the problem."
            .to_string(),
        links: vec![
            NamedLink::new("New issue", format!("{}/issues/new", repo_url)),
            NamedLink::new("Existing issues", format!("{}/issues", repo_url)),
        ],
        notes: Vec::new(),
    }
}
