// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Local indexer: walks the docs directory and extracts every markdown file.

use crate::error::{DocsError, Result};
use crate::models::document::IndexedDocument;
use crate::services::extractor::extract_markdown;
use std::fs;
use std::path::Path;
use tracing::{info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory holding images next to the docs; never contains pages
const IMAGE_DIR: &str = "img";

/// Index every `.md`/`.mdx` file under `root`.
///
/// Returns `DocsError::DocsRootMissing` when `root` does not exist. Unreadable or malformed
/// files are logged and skipped, so an existing root always succeeds, possibly with no documents.
pub fn index_directory(root: &Path) -> Result<Vec<IndexedDocument>> {
    if !root.is_dir() {
        return Err(DocsError::DocsRootMissing(root.to_path_buf()));
    }

    let mut documents = Vec::new();
    let mut skipped = 0usize;

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable docs entry");
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }

        match index_file(root, entry.path()) {
            Ok(doc) => documents.push(doc),
            Err(e) => {
                skipped += 1;
                warn!(error = %e, "skipping document");
            }
        }
    }

    info!(
        root = %root.display(),
        documents = documents.len(),
        skipped,
        "indexed local documentation"
    );
    Ok(documents)
}

fn index_file(root: &Path, path: &Path) -> Result<IndexedDocument> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let relative = relative.to_string_lossy();
    let raw = fs::read_to_string(path).map_err(|e| DocsError::extraction(relative.to_string(), e))?;
    extract_markdown(&relative, &raw)
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == IMAGE_DIR || name.starts_with('_')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "md" || ext == "mdx")
}
