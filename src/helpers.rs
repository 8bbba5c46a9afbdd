//! Helper functions for the mangatv.net scraper
//!
//! This module provides utility functions used throughout the crate:
//! - URL normalization (protocol-relative and site-relative hrefs)
//! - Manga and chapter id extraction from hrefs
//! - Chapter number, release date and scanlation group extraction
//!
//! # Examples
//!
//! ```
//! use mangatv_scraper::helpers::{absolute_url, extract_chapter_number};
//!
//! let url = absolute_url("//cdn.mangatv.net/library/1.jpg", "https://mangatv.net");
//! assert_eq!(url, "https://cdn.mangatv.net/library/1.jpg");
//!
//! let num = extract_chapter_number("Capítulo 12.5 - 2024-01-01");
//! assert_eq!(num, Some(12.5));
//! ```

use regex::Regex;
use std::sync::OnceLock;

fn chapter_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)Cap[íi]tulo\s*([\d.]+)").unwrap())
}

fn release_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{4}-\d{2}-\d{2})").unwrap())
}

fn scan_group_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)([A-Za-z\s]+Scan[s]?|[A-Za-z\s]+Fansub)").unwrap())
}

fn manga_id_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/manga/(\d+/[^/?#]+)").unwrap())
}

/// Resolve a possibly protocol-relative or site-relative URL against the base
pub fn absolute_url(url: &str, base_url: &str) -> String {
    if url.starts_with("http") {
        url.to_string()
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{}", rest)
    } else if url.starts_with('/') {
        format!("{}{}", base_url, url)
    } else {
        format!("{}/{}", base_url, url)
    }
}

/// Extract the manga id ("1234/slug") from a /manga/ href
pub fn manga_id_from_href(href: &str) -> Option<String> {
    manga_id_re()
        .captures(href)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract the chapter id from a /leer/ href: the first path segment after it
pub fn chapter_id_from_href(href: &str) -> Option<String> {
    let rest = href.split("/leer/").nth(1)?;
    let id = rest.split(['/', '?', '#']).next()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Pull a chapter number out of text like "Capítulo 12.5"
pub fn extract_chapter_number(text: &str) -> Option<f32> {
    chapter_number_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().trim_end_matches('.').parse::<f32>().ok())
}

/// Pull a YYYY-MM-DD release date out of chapter row text
pub fn extract_release_date(text: &str) -> Option<chrono::NaiveDate> {
    release_date_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| chrono::NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok())
}

/// Pull a scanlation group name ("... Scans" / "... Fansub") out of row text
pub fn extract_scan_group(text: &str) -> Option<String> {
    scan_group_re()
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collapse whitespace runs and trim, for anchor text pulled from markup
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
