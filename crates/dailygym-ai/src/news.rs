//! News article intake
//!
//! Articles arrive either as pasted text or as a URL. Pasted text is
//! validated and given a title from its first line; URLs are fetched with a
//! timeout and size cap, then the main content is scraped out of the HTML.

use std::time::Duration;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use dailygym_core::constants::{ARTICLE_FETCH_TIMEOUT_SECS, MAX_ARTICLE_FETCH_BYTES, MAX_ARTICLE_LEN};
use dailygym_core::ParsedNews;

use crate::error::{AiError, Result};

const FETCH_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Content containers tried in order; the first match wins
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role='main']",
    "main",
    ".article-content",
    ".post-content",
    ".entry-content",
    ".content",
    "#content",
];

/// Elements whose text never belongs to the article body
const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside"];
const EXCLUDED_CLASSES: &[&str] = &["ad", "advertisement", "sidebar", "comments"];

/// Shortest paragraph worth keeping, in characters
const MIN_PARAGRAPH_LEN: usize = 21;

/// Validate pasted article text and derive a title from its first line
pub fn parse_news_content(content: &str) -> Result<ParsedNews> {
    if content.trim().is_empty() {
        return Err(AiError::invalid_input("content", "Article content is required"));
    }
    if content.len() > MAX_ARTICLE_LEN {
        return Err(AiError::invalid_input(
            "content",
            format!("Article content exceeds maximum length of {MAX_ARTICLE_LEN} characters"),
        ));
    }

    let trimmed = content.trim();
    let mut title = trimmed
        .lines()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("Untitled")
        .to_string();

    // Long first lines get cut back to their first sentence
    if title.chars().count() > 100 {
        title = match first_sentence(&title) {
            Some(sentence) => sentence,
            None => {
                let prefix: String = title.chars().take(100).collect();
                format!("{prefix}...")
            }
        };
    }

    Ok(ParsedNews {
        title: title.trim().to_string(),
        content: trimmed.to_string(),
        source_url: None,
    })
}

fn first_sentence(text: &str) -> Option<String> {
    let end = text.find(['.', '!', '?'])?;
    let mut sentence = text[..end].to_string();
    sentence.push_str(&text[end..end + 1]);
    Some(sentence)
}

/// Fetch an article over HTTP and extract its title and body
pub async fn fetch_article_from_url(http: &reqwest::Client, raw_url: &str) -> Result<ParsedNews> {
    let url = Url::parse(raw_url)
        .map_err(|_| AiError::invalid_input("url", "Invalid URL format"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(AiError::invalid_input(
            "url",
            "Only HTTP and HTTPS URLs are supported",
        ));
    }

    let response = http
        .get(url)
        .timeout(Duration::from_secs(ARTICLE_FETCH_TIMEOUT_SECS))
        .header(reqwest::header::USER_AGENT, FETCH_USER_AGENT)
        .header(
            reqwest::header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() {
                AiError::invalid_input("url", "Request timed out")
            } else {
                AiError::invalid_input("url", format!("Failed to fetch URL: {e}"))
            }
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AiError::invalid_input(
            "url",
            format!("Failed to fetch URL: {status}"),
        ));
    }

    if let Some(length) = response.content_length() {
        if length > MAX_ARTICLE_FETCH_BYTES as u64 {
            return Err(AiError::invalid_input(
                "url",
                "Article is too large to process",
            ));
        }
    }

    let html = response
        .text()
        .await
        .map_err(|e| AiError::invalid_input("url", format!("Failed to fetch URL: {e}")))?;

    extract_article(&html, raw_url)
}

/// Pull the title and main text out of an article page
pub fn extract_article(html: &str, source_url: &str) -> Result<ParsedNews> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let root = content_root(&document);

    let mut content = match root {
        Some(element) => {
            let paragraphs = collect_paragraphs(element);
            // A handful of short paragraphs usually means the page does not
            // mark up its body with <p>; fall back to the element's full text.
            if paragraphs.len() < 3 {
                visible_text(element)
            } else {
                paragraphs.join("\n\n")
            }
        }
        None => String::new(),
    };

    if content.len() < 100 {
        return Err(AiError::invalid_input(
            "url",
            "Could not extract article content from the URL",
        ));
    }

    if content.len() > MAX_ARTICLE_LEN {
        content = truncate_chars(&content, MAX_ARTICLE_LEN);
    }

    Ok(ParsedNews {
        title: title.trim().to_string(),
        content: content.trim().to_string(),
        source_url: Some(source_url.to_string()),
    })
}

fn extract_title(document: &Html) -> String {
    for (selector_str, attr) in [
        ("meta[property='og:title']", Some("content")),
        ("meta[name='twitter:title']", Some("content")),
        ("title", None),
    ] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let value = match attr {
                    Some(name) => element.value().attr(name).unwrap_or_default().to_string(),
                    None => element.text().collect::<String>(),
                };
                if !value.trim().is_empty() {
                    return value;
                }
            }
        }
    }
    "Untitled".to_string()
}

fn content_root(document: &Html) -> Option<ElementRef<'_>> {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                return Some(element);
            }
        }
    }
    if let Ok(selector) = Selector::parse("body") {
        if let Some(body) = document.select(&selector).next() {
            return Some(body);
        }
    }
    None
}

fn is_excluded(element: ElementRef<'_>) -> bool {
    let name = element.value().name();
    if EXCLUDED_TAGS.contains(&name) {
        return true;
    }
    element
        .value()
        .classes()
        .any(|class| EXCLUDED_CLASSES.contains(&class))
}

fn has_excluded_ancestor(element: ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(is_excluded)
}

fn collect_paragraphs(root: ElementRef<'_>) -> Vec<String> {
    let Ok(selector) = Selector::parse("p") else {
        return Vec::new();
    };
    root.select(&selector)
        .filter(|p| !has_excluded_ancestor(*p))
        .map(|p| p.text().collect::<String>().trim().to_string())
        .filter(|text| text.len() >= MIN_PARAGRAPH_LEN)
        .collect()
}

/// Descendant text with excluded subtrees skipped, whitespace collapsed
fn visible_text(root: ElementRef<'_>) -> String {
    let mut out = String::new();
    append_visible_text(root, &mut out);
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn append_visible_text(element: ElementRef<'_>, out: &mut String) {
    if is_excluded(element) {
        return;
    }
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(&text.text);
            out.push(' ');
        } else if let Some(child_element) = ElementRef::wrap(child) {
            append_visible_text(child_element, out);
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
