// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Turns a raw markdown file or a fetched HTML page into an `IndexedDocument`.
//!
//! Both backends produce plain text only: markdown syntax, code and HTML tags never
//! reach `content`.

use crate::error::{DocsError, Result};
use crate::models::document::{IndexedDocument, Metadata};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::sync::LazyLock;

/// Crawled pages keep at most this many characters in `content`
pub const MAX_WEB_CONTENT_CHARS: usize = 5000;

const UNTITLED: &str = "Untitled";

static FENCED_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid fenced code regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid inline code regex"));
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[([^\]]+)\]\([^)]+\)").expect("valid link regex"));
static HTML_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));
static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[A-Za-z][^>]*>").expect("valid tag regex"));
static MARKDOWN_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[#*_~`]").expect("valid punctuation regex"));
static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+[ \t]+(.+)$").expect("valid heading regex"));

static ARTICLE_H1: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article h1").expect("valid selector"));
static OG_TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).expect("valid selector"));
static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("valid selector"));

/// Content containers in priority order; the first one present on the page wins.
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "article main",
        "article",
        r#"main[role="main"]"#,
        ".markdown",
        ".docMainContainer",
    ]
    .iter()
    .map(|css| Selector::parse(css).expect("valid selector"))
    .collect()
});

// ---------------------------------------------------------------------------
// Markdown
// ---------------------------------------------------------------------------

/// Build a document from a markdown file.
///
/// `relative_path` is the file path relative to the docs root; backslashes are accepted.
pub fn extract_markdown(relative_path: &str, raw: &str) -> Result<IndexedDocument> {
    let path = relative_path.replace('\\', "/");
    let (metadata, body) = split_front_matter(&path, raw)?;

    let title = metadata_text(&metadata, "title")
        .or_else(|| metadata_text(&metadata, "sidebar_label"))
        .or_else(|| first_heading(&body))
        .or_else(|| file_stem(&path))
        .ok_or_else(|| DocsError::extraction(&path, "cannot derive a title"))?;

    let url = format!("/docs/{}", strip_markdown_extension(&path));

    Ok(IndexedDocument {
        title,
        url,
        content: markdown_to_text(&body),
        full_content: body,
        path,
        source_base: None,
        metadata,
    })
}

/// Split a leading `---` delimited YAML block from the body.
/// Files without a complete block are all body.
fn split_front_matter(location: &str, raw: &str) -> Result<(Metadata, String)> {
    let normalized = raw.replace("\r\n", "\n");
    let normalized = normalized.strip_prefix('\u{feff}').unwrap_or(&normalized);
    let mut lines = normalized.lines();

    if lines.next().map(str::trim) != Some("---") {
        return Ok((Metadata::new(), normalized.to_string()));
    }

    let mut front_matter = Vec::new();
    let mut closed = false;
    for line in lines.by_ref() {
        if line.trim() == "---" {
            closed = true;
            break;
        }
        front_matter.push(line);
    }

    if !closed {
        return Ok((Metadata::new(), normalized.to_string()));
    }

    let metadata = parse_front_matter(location, &front_matter.join("\n"))?;
    let body = lines.collect::<Vec<_>>().join("\n");
    Ok((metadata, body))
}

fn parse_front_matter(location: &str, yaml: &str) -> Result<Metadata> {
    if yaml.trim().is_empty() {
        return Ok(Metadata::new());
    }

    let value: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| DocsError::extraction(location, format!("invalid front-matter: {e}")))?;

    match value {
        serde_yaml::Value::Null => Ok(Metadata::new()),
        serde_yaml::Value::Mapping(mapping) => Ok(mapping
            .into_iter()
            .filter_map(|(key, value)| scalar_text(&key).map(|key| (key, value)))
            .collect()),
        _ => Err(DocsError::extraction(
            location,
            "front-matter is not a key/value mapping",
        )),
    }
}

fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.trim().to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn metadata_text(metadata: &Metadata, key: &str) -> Option<String> {
    metadata
        .get(key)
        .and_then(scalar_text)
        .filter(|s| !s.is_empty())
}

fn first_heading(body: &str) -> Option<String> {
    // Lines starting with '#' inside fenced code are comments, not headings
    let without_code = FENCED_CODE.replace_all(body, "");
    HEADING
        .captures(&without_code)
        .map(|caps| heading_text(caps[1].trim().trim_end_matches('#')))
        .filter(|s| !s.is_empty())
}

/// Plain text of a heading line; inline code keeps its text.
fn heading_text(heading: &str) -> String {
    let text = INLINE_CODE.replace_all(heading, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = HTML_COMMENT.replace_all(&text, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = MARKDOWN_PUNCTUATION.replace_all(&text, "");
    collapse_whitespace(&text)
}

fn file_stem(path: &str) -> Option<String> {
    Path::new(path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
}

fn strip_markdown_extension(path: &str) -> &str {
    path.strip_suffix(".mdx")
        .or_else(|| path.strip_suffix(".md"))
        .unwrap_or(path)
}

/// Reduce a markdown body to searchable plain text.
pub fn markdown_to_text(body: &str) -> String {
    let text = FENCED_CODE.replace_all(body, " ");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = HTML_COMMENT.replace_all(&text, " ");
    let text = HTML_TAG.replace_all(&text, " ");
    let text = MARKDOWN_PUNCTUATION.replace_all(&text, "");
    collapse_whitespace(&text)
}

// ---------------------------------------------------------------------------
// HTML
// ---------------------------------------------------------------------------

/// Build a document from a crawled page.
///
/// `source_base` is the normalized base URL of the documentation site the page belongs to.
pub fn extract_html(page_url: &str, source_base: &str, html: &str) -> IndexedDocument {
    let document = Html::parse_document(html);
    let full_content = page_content(&document);
    let (path, url) = page_location(page_url, source_base);

    IndexedDocument {
        title: page_title(&document),
        path,
        url,
        content: full_content.chars().take(MAX_WEB_CONTENT_CHARS).collect(),
        full_content,
        source_base: Some(source_base.to_string()),
        metadata: Metadata::new(),
    }
}

/// Corpus path and site-relative URL of a crawled page.
pub fn page_location(page_url: &str, source_base: &str) -> (String, String) {
    let url = page_url
        .strip_prefix(source_base)
        .unwrap_or(page_url)
        .to_string();
    let path = url.replacen("/docs/", "", 1).trim_start_matches('/').to_string();
    (path, url)
}

fn page_title(document: &Html) -> String {
    let title = document
        .select(&ARTICLE_H1)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(&OG_TITLE)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .map(|content| content.trim().to_string())
                .filter(|t| !t.is_empty())
        })
        .or_else(|| {
            document
                .select(&TITLE)
                .next()
                .map(element_text)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| UNTITLED.to_string());

    // "Installation | My Docs" -> "Installation"
    let cleaned = title.split('|').next().unwrap_or_default().trim();
    if cleaned.is_empty() {
        UNTITLED.to_string()
    } else {
        cleaned.to_string()
    }
}

fn page_content(document: &Html) -> String {
    for selector in CONTENT_SELECTORS.iter() {
        let matched: Vec<ElementRef<'_>> = document.select(selector).collect();
        if matched.is_empty() {
            continue;
        }

        let mut text = String::new();
        for element in matched {
            collect_prose(element, &mut text);
        }
        return collapse_whitespace(&text);
    }

    String::new()
}

/// Append the text under `root`, skipping navigation, tables of contents and code.
fn collect_prose(root: ElementRef<'_>, out: &mut String) {
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| is_non_prose(ancestor.value()));

        if !hidden {
            out.push_str(text);
        }
    }
}

fn is_non_prose(element: &scraper::node::Element) -> bool {
    matches!(element.name(), "nav" | "pre" | "code" | "script" | "style")
        || element
            .classes()
            .any(|class| class == "toc" || class == "table-of-contents")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
