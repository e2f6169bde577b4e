//! Inline citation rendering for ChatGPT web-search answers.
//!
//! Assistant text carries opaque markers (`matched_text`) that the message
//! metadata maps to source URLs. Markers are replaced by a compact link group
//! and any leftover private-use citation delimiters are stripped.

use std::collections::{BTreeMap, HashSet};

use serde_json::{Map, Value};
use url::Url;

const CITE_OPEN: char = '\u{E200}';
const CITE_CLOSE: char = '\u{E201}';

/// Apply `metadata.content_references` to `text`.
pub fn apply_content_references(text: &str, metadata: Option<&Map<String, Value>>) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut grouped: BTreeMap<&str, Vec<&Map<String, Value>>> = BTreeMap::new();
    let references = metadata
        .and_then(|metadata| metadata.get("content_references"))
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object);
    for reference in references {
        if let Some(matched) = reference.get("matched_text").and_then(Value::as_str)
            && !matched.is_empty()
        {
            grouped.entry(matched).or_default().push(reference);
        }
    }

    let mut replacements: Vec<(&str, String)> = grouped
        .into_iter()
        .filter_map(|(matched, refs)| render_links(&refs).map(|links| (matched, links)))
        .collect();
    // Longest first so a marker never clobbers a longer one containing it
    replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut rendered = text.to_string();
    for (matched, links) in replacements {
        rendered = rendered.replace(matched, &links);
    }
    strip_citation_markers(&rendered)
}

/// `([label](url) · [label](url))`, or `None` when no usable URL exists.
fn render_links(references: &[&Map<String, Value>]) -> Option<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for reference in references {
        for raw in reference_urls(reference) {
            let normalized = normalize_url(&raw);
            if !normalized.is_empty() && seen.insert(normalized.clone()) {
                urls.push(normalized);
            }
        }
    }

    if urls.is_empty() {
        return None;
    }
    let links: Vec<String> = urls.iter().map(|url| format!("[{}]({})", label(url), url)).collect();
    Some(format!("({})", links.join(" · ")))
}

fn reference_urls(reference: &Map<String, Value>) -> Vec<String> {
    let mut collected = Vec::new();

    if let Some(alt) = reference.get("alt").and_then(Value::as_str) {
        collected.extend(markdown_link_urls(alt));
    }

    let safe_urls = reference.get("safe_urls").and_then(Value::as_array).into_iter().flatten();
    collected.extend(safe_urls.filter_map(Value::as_str).map(str::trim).filter(|u| !u.is_empty()).map(str::to_string));

    let items = reference.get("items").and_then(Value::as_array).into_iter().flatten();
    collected.extend(
        items
            .filter_map(|item| item.get("url").and_then(Value::as_str))
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string),
    );

    collected
}

/// URLs of `(http...)` link targets in a markdown snippet.
fn markdown_link_urls(markdown: &str) -> Vec<String> {
    let mut urls = Vec::new();
    let mut rest = markdown;

    while let Some(start) = rest.find('(') {
        let candidate = &rest[start + 1..];
        let end = candidate.find(|c: char| c == ')' || c.is_whitespace());
        match end {
            Some(end)
                if candidate[end..].starts_with(')')
                    && (candidate.starts_with("http://") || candidate.starts_with("https://")) =>
            {
                urls.push(candidate[..end].to_string());
                rest = &candidate[end + 1..];
            }
            _ => rest = candidate,
        }
    }
    urls
}

/// Drop `utm_*` query parameters from http(s) URLs.
fn normalize_url(raw: &str) -> String {
    let cleaned = raw.trim();
    let Ok(mut url) = Url::parse(cleaned) else {
        return cleaned.to_string();
    };
    if !matches!(url.scheme(), "http" | "https") {
        return cleaned.to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !key.to_ascii_lowercase().starts_with("utm_"))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

/// `host[:port]/path`, or just the host for root paths.
fn label(raw: &str) -> String {
    let Ok(url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let Some(host) = url.host_str() else {
        return raw.to_string();
    };

    let netloc = match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    };
    match url.path() {
        "" | "/" => netloc,
        path => format!("{}{}", netloc, path),
    }
}

/// Remove `\u{E200}cite…\u{E201}` spans (shortest match, like a lazy regex).
pub fn strip_citation_markers(text: &str) -> String {
    let open = format!("{}cite", CITE_OPEN);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(&open) {
        let after = &rest[start + open.len()..];
        match after.find(CITE_CLOSE) {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &after[end + CITE_CLOSE.len_utf8()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}
