//! # geolens-html: Article Detail Extraction
//!
//! Pulls a handful of fields out of an article page: title, description, publish
//! date and a short excerpt of the visible text. Each field is looked up
//! independently through an ordered list of candidate tags; the first non-empty
//! match wins.

use percent_encoding::percent_decode_str;
use scraper::{node::Node, ElementRef, Html, Selector};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

/// Default length, in characters, of [`ArticleDetails::content_excerpt`].
pub const DEFAULT_EXCERPT_CHARS: usize = 500;

/// Subtrees that never contribute to the content excerpt.
const NON_CONTENT_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "noscript"];

/// How to read a value from an element matched by a candidate selector.
#[derive(Clone, Copy)]
enum Source {
    Attr(&'static str),
    Text,
}

const TITLE_CANDIDATES: &[(&str, Source)] = &[
    (r#"meta[property="og:title"]"#, Source::Attr("content")),
    (r#"meta[name="twitter:title"]"#, Source::Attr("content")),
    ("title", Source::Text),
    ("h1", Source::Text),
];

const DESCRIPTION_CANDIDATES: &[(&str, Source)] = &[
    (r#"meta[property="og:description"]"#, Source::Attr("content")),
    (r#"meta[name="description"]"#, Source::Attr("content")),
    (r#"meta[name="twitter:description"]"#, Source::Attr("content")),
];

const PUBLISHED_CANDIDATES: &[(&str, Source)] = &[
    (
        r#"meta[property="article:published_time"]"#,
        Source::Attr("content"),
    ),
    (r#"meta[name="pubdate"]"#, Source::Attr("content")),
    (r#"meta[name="date"]"#, Source::Attr("content")),
    ("time[datetime]", Source::Attr("datetime")),
];

/// Details extracted from an article page. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArticleDetails {
    pub title: Option<String>,
    pub description: Option<String>,
    pub published_date: Option<String>,
    pub content_excerpt: Option<String>,
}

impl ArticleDetails {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.published_date.is_none()
            && self.content_excerpt.is_none()
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_match(document: &Html, candidates: &[(&str, Source)]) -> Option<String> {
    for (css, source) in candidates {
        let Ok(selector) = Selector::parse(css) else {
            continue;
        };
        for element in document.select(&selector) {
            let value = match source {
                Source::Attr(attr) => element.value().attr(attr).map(collapse_whitespace),
                Source::Text => Some(collapse_whitespace(
                    &element.text().collect::<Vec<_>>().join(" "),
                )),
            };
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                return Some(value);
            }
        }
    }
    None
}

fn push_visible_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(el) if NON_CONTENT_TAGS.contains(&el.name()) => {}
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    push_visible_text(child_element, out);
                }
            }
            _ => {}
        }
    }
}

fn content_excerpt(document: &Html, max_chars: usize) -> Option<String> {
    let body = Selector::parse("body")
        .ok()
        .and_then(|selector| document.select(&selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut raw = String::new();
    push_visible_text(body, &mut raw);
    let text = collapse_whitespace(&raw);
    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(max_chars).collect())
}

/// Extracts [`ArticleDetails`] from an HTML document.
pub fn extract_details(html: &str, excerpt_chars: usize) -> ArticleDetails {
    let document = Html::parse_document(html);
    ArticleDetails {
        title: first_match(&document, TITLE_CANDIDATES),
        description: first_match(&document, DESCRIPTION_CANDIDATES),
        published_date: first_match(&document, PUBLISHED_CANDIDATES),
        content_excerpt: content_excerpt(&document, excerpt_chars),
    }
}

/// Fetches `url` and extracts its [`ArticleDetails`].
///
/// Never fails: a transport error, a non-2xx status or an unreadable body is
/// logged and yields empty details, which callers treat as "use the fallback
/// title".
pub async fn fetch_details(
    client: &reqwest::Client,
    url: &str,
    excerpt_chars: usize,
) -> ArticleDetails {
    debug!(url, "Fetching article details");
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(url, "Failed to fetch article: {e}");
            return ArticleDetails::default();
        }
    };

    if !response.status().is_success() {
        warn!(url, status = %response.status(), "Article request was not successful");
        return ArticleDetails::default();
    }

    match response.text().await {
        Ok(body) => extract_details(&body, excerpt_chars),
        Err(e) => {
            warn!(url, "Failed to read article body: {e}");
            ArticleDetails::default()
        }
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Derives a human-readable title from a URL's last path segment.
///
/// `https://ex.com/news/breaking-news-event.html` becomes `Breaking News Event`.
/// Percent escapes are decoded first.
/// A URL without a usable path segment falls back to its host name. Returns
/// `None` when the URL cannot be parsed.
pub fn title_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(|s| match s.rsplit_once('.') {
            Some((stem, ext))
                if !stem.is_empty()
                    && !ext.is_empty()
                    && ext.len() <= 5
                    && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                stem
            }
            _ => s,
        });

    let decoded = percent_decode_str(segment.unwrap_or_default()).decode_utf8_lossy();
    let words: Vec<String> = decoded
        .split(['-', '_', '+'])
        .flat_map(str::split_whitespace)
        .filter(|w| !w.is_empty())
        .map(title_case)
        .collect();

    if words.is_empty() {
        return parsed.host_str().map(str::to_string);
    }
    Some(words.join(" "))
}
