// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! In-memory relevance scoring over the documentation corpus.

use crate::models::document::{IndexedDocument, ScoredDocument};
use regex::Regex;

const TITLE_EXACT: u32 = 100;
const TITLE_PREFIX: u32 = 50;
const TITLE_CONTAINS: u32 = 30;
const TITLE_WORD: u32 = 10;
const PATH_CONTAINS: u32 = 20;
const PATH_WORD: u32 = 5;
const CONTENT_MATCH_CAP: u32 = 10;
const CONTENT_PHRASE: u32 = 5;

/// Normalized query: the trimmed, lowercased phrase and its distinct words
struct Query {
    phrase: String,
    words: Vec<String>,
    pattern: Option<Regex>,
}

impl Query {
    fn parse(raw: &str) -> Self {
        let phrase = raw.trim().to_lowercase();
        let mut words: Vec<String> = Vec::new();
        for word in phrase.split_whitespace() {
            if !words.iter().any(|w| w == word) {
                words.push(word.to_string());
            }
        }

        let pattern = if words.is_empty() {
            None
        } else {
            let alternation = words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|");
            // Escaped words always form a valid pattern; `ok()` only guards the size limit
            Regex::new(&alternation).ok()
        };

        Self {
            phrase,
            words,
            pattern,
        }
    }
}

/// Score every document against `query` and return the matches, best first.
///
/// Ties keep corpus order. An empty or whitespace-only query matches nothing.
pub fn search(corpus: &[IndexedDocument], query: &str) -> Vec<ScoredDocument> {
    let query = Query::parse(query);
    if query.words.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<ScoredDocument> = corpus
        .iter()
        .filter_map(|doc| {
            let score = score_document(doc, &query);
            (score > 0).then(|| ScoredDocument {
                document: doc.clone(),
                score,
            })
        })
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

fn score_document(doc: &IndexedDocument, query: &Query) -> u32 {
    let title = doc.title.to_lowercase();
    let path = doc.path.to_lowercase();
    let content = doc.content.to_lowercase();

    let mut score = 0;

    score += if title == query.phrase {
        TITLE_EXACT
    } else if title.starts_with(&query.phrase) {
        TITLE_PREFIX
    } else if title.contains(&query.phrase) {
        TITLE_CONTAINS
    } else {
        words_found(&title, &query.words) * TITLE_WORD
    };

    score += if path.contains(&query.phrase) {
        PATH_CONTAINS
    } else {
        words_found(&path, &query.words) * PATH_WORD
    };

    if let Some(pattern) = &query.pattern {
        let matches = pattern.find_iter(&content).take(CONTENT_MATCH_CAP as usize).count();
        score += matches as u32;
    }

    if content.contains(&query.phrase) {
        score += CONTENT_PHRASE;
    }

    score
}

fn words_found(haystack: &str, words: &[String]) -> u32 {
    words.iter().filter(|w| haystack.contains(w.as_str())).count() as u32
}
