// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Sitemap parsing for flat URL sets and sitemap indexes.

use crate::error::{DocsError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sitemap {
    /// `<urlset>`: page URLs
    UrlSet(Vec<String>),
    /// `<sitemapindex>`: URLs of child sitemaps
    Index(Vec<String>),
    /// Well-formed document with some other root, e.g. an HTML page served at the sitemap URL
    Unknown { root: String },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Root {
    UrlSet,
    Index,
}

/// Parse a sitemap body. `url` is only used in error messages.
///
/// Element names are matched without namespace prefixes. Parsing stops at the first element
/// when the root is neither `urlset` nor `sitemapindex`. Malformed XML and empty bodies are errors.
pub fn parse_sitemap(url: &str, xml: &str) -> Result<Sitemap> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let invalid = |message: String| DocsError::Sitemap {
        url: url.to_string(),
        message,
    };

    let mut root: Option<Root> = None;
    let mut depth = 0usize;
    let mut in_entry = false;
    let mut in_loc = false;
    let mut locs = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                let name = e.local_name();
                match (root, depth, name.as_ref()) {
                    (None, _, other) => match root_kind(other) {
                        Some(kind) => root = Some(kind),
                        None => return Ok(unknown(other)),
                    },
                    (Some(Root::UrlSet), 2, b"url") | (Some(Root::Index), 2, b"sitemap") => {
                        in_entry = true
                    }
                    // Nested <loc>s (image and video extensions) are not pages
                    (Some(_), 3, b"loc") if in_entry => in_loc = true,
                    _ => {}
                }
            }
            Ok(Event::Empty(e)) if root.is_none() => {
                let name = e.local_name();
                match root_kind(name.as_ref()) {
                    Some(kind) => root = Some(kind),
                    None => return Ok(unknown(name.as_ref())),
                }
            }
            Ok(Event::End(_)) => {
                match depth {
                    2 => in_entry = false,
                    3 => in_loc = false,
                    _ => {}
                }
                depth = depth.saturating_sub(1);
            }
            Ok(Event::Text(text)) if in_loc => {
                let loc = text
                    .unescape()
                    .map_err(|e| invalid(format!("bad <loc> text: {e}")))?;
                push_loc(&mut locs, &loc);
            }
            Ok(Event::CData(data)) if in_loc => {
                push_loc(&mut locs, &String::from_utf8_lossy(&data.into_inner()));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(invalid(e.to_string())),
            _ => {}
        }
    }

    match root {
        Some(Root::UrlSet) => Ok(Sitemap::UrlSet(locs)),
        Some(Root::Index) => Ok(Sitemap::Index(locs)),
        None => Err(invalid("empty document".to_string())),
    }
}

fn root_kind(name: &[u8]) -> Option<Root> {
    match name {
        b"urlset" => Some(Root::UrlSet),
        b"sitemapindex" => Some(Root::Index),
        _ => None,
    }
}

fn unknown(name: &[u8]) -> Sitemap {
    Sitemap::Unknown {
        root: String::from_utf8_lossy(name).into_owned(),
    }
}

fn push_loc(locs: &mut Vec<String>, loc: &str) {
    let loc = loc.trim();
    if !loc.is_empty() {
        locs.push(loc.to_string());
    }
}
