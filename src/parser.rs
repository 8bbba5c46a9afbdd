//! HTML parsing for mangatv.net pages
//!
//! Every function here is a pure transformation from a fetched page body to
//! the crate's data shapes, so the selector and regex heuristics can be
//! exercised against captured fixtures without network access. The site's
//! markup is the authority; each extraction is a fallback chain over the
//! variants observed on live pages.

use crate::helpers::{
    absolute_url, chapter_id_from_href, clean_text, extract_chapter_number, extract_release_date,
    extract_scan_group, manga_id_from_href,
};
use crate::models::{
    Chapter, ChapterDetails, Manga, MangaStatus, MangaTile, PagedResults, Tag, TagSection,
};
use chrono::Utc;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

const DEFAULT_TITLE: &str = "Sin título";
/// Boilerplate paragraph present on every manga page, never a description
const DISCLAIMER: &str = "Las imágenes mostradas";

fn sel(selector: &str) -> Selector {
    Selector::parse(selector).unwrap()
}

fn meta_content(document: &Html, selector: &str) -> Option<String> {
    document
        .select(&sel(selector))
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn next_element(el: ElementRef) -> Option<ElementRef> {
    el.next_siblings().find_map(ElementRef::wrap)
}

fn host_of(base_url: &str) -> &str {
    base_url
        .split("://")
        .nth(1)
        .unwrap_or(base_url)
        .split('/')
        .next()
        .unwrap_or(base_url)
}

/// Parse a manga page (`/manga/{id}`) into full metadata
pub fn parse_manga_details(html: &str, manga_id: &str, base_url: &str) -> Manga {
    let document = Html::parse_document(html);

    let title = document
        .select(&sel("h1"))
        .next()
        .map(|el| clean_text(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .or_else(|| meta_content(&document, r#"meta[property="og:title"]"#))
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let cover = document
        .select(&sel(r#"img[src*="library"]"#))
        .next()
        .and_then(|el| el.value().attr("src"))
        .map(str::to_string)
        .or_else(|| {
            document
                .select(&sel(r#"img[data-src*="library"]"#))
                .next()
                .and_then(|el| el.value().attr("data-src"))
                .map(str::to_string)
        })
        .or_else(|| meta_content(&document, r#"meta[property="og:image"]"#))
        .map(|src| absolute_url(&src, base_url))
        .unwrap_or_default();

    let description = document
        .select(&sel("p"))
        .map(|el| clean_text(&el.text().collect::<String>()))
        .find(|text| text.len() > 100 && !text.contains(DISCLAIMER))
        .or_else(|| meta_content(&document, r#"meta[name="description"]"#))
        .unwrap_or_default();

    let status = parse_status(&document);

    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for el in document.select(&sel(r#"a[href*="genre"]"#)) {
        let label = clean_text(&el.text().collect::<String>());
        if label.is_empty() {
            continue;
        }
        let id = label.to_lowercase();
        if seen.insert(id.clone()) {
            tags.push(Tag { id, label });
        }
    }

    let author = parse_labelled_value(&document, "Autor");

    Manga {
        id: manga_id.to_string(),
        title,
        cover_url: cover,
        description,
        status,
        author: author.clone(),
        artist: author,
        tags: vec![TagSection {
            id: "0".to_string(),
            label: "Géneros".to_string(),
            tags,
        }],
    }
}

/// Status lives in free text next to an "Estado" label
fn parse_status(document: &Html) -> MangaStatus {
    let text = document.root_element().text().collect::<String>();
    if let Some(pos) = text.find("Estado") {
        let window: String = text[pos..].chars().take(120).collect();
        let window = window.to_lowercase();
        if window.contains("finalizado") || window.contains("completed") {
            return MangaStatus::Completed;
        }
    }
    MangaStatus::Ongoing
}

/// Find the element following a "{label}" marker, e.g. `<strong>Autor</strong><span>...</span>`
fn parse_labelled_value(document: &Html, label: &str) -> Option<String> {
    for el in document.select(&sel("span, strong, b, dt, th, td, li, div")) {
        let own: String = el
            .children()
            .filter_map(|n| n.value().as_text())
            .map(|t| &*t.text)
            .collect();
        if !own.contains(label) {
            continue;
        }
        if let Some(next) = next_element(el) {
            let value = clean_text(&next.text().collect::<String>());
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Parse the chapter list off a manga page: every anchor into the reader,
/// de-duplicated by chapter id and sorted newest first
pub fn parse_chapter_list(html: &str, manga_id: &str, lang_code: &str) -> Vec<Chapter> {
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut chapters = Vec::new();

    for (index, el) in document.select(&sel(r#"a[href*="/leer/"]"#)).enumerate() {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        let Some(chapter_id) = chapter_id_from_href(href) else {
            continue;
        };
        if !seen.insert(chapter_id.clone()) {
            continue;
        }

        // The number/date/group live in the surrounding row text, not the anchor
        let row_text = el
            .parent()
            .and_then(ElementRef::wrap)
            .map(|p| p.text().collect::<String>())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| el.text().collect::<String>());

        let chapter_number =
            extract_chapter_number(&row_text).unwrap_or((index + 1) as f32);

        let released = extract_release_date(&row_text)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        chapters.push(Chapter {
            id: chapter_id,
            manga_id: manga_id.to_string(),
            title: format!("Capítulo {}", format_chapter_number(chapter_number)),
            chapter_number,
            lang_code: lang_code.to_string(),
            released,
            scanlation_group: extract_scan_group(&row_text),
        });
    }

    chapters.sort_by(|a, b| {
        b.chapter_number
            .partial_cmp(&a.chapter_number)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    chapters
}

fn format_chapter_number(n: f32) -> String {
    if n.fract() == 0.0 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Parse a reader page (`/leer/{chapterId}`) into its page image URLs
pub fn parse_page_list(
    html: &str,
    manga_id: &str,
    chapter_id: &str,
    base_url: &str,
) -> ChapterDetails {
    let document = Html::parse_document(html);
    let host = host_of(base_url);

    let mut seen = HashSet::new();
    let mut pages = Vec::new();

    for el in document.select(&sel(r#"img[src*="/library/"], img[data-src*="/library/"]"#)) {
        // Lazy-loaded images keep a placeholder in src; take whichever
        // attribute actually points into the library
        let src = [el.value().attr("src"), el.value().attr("data-src")]
            .into_iter()
            .flatten()
            .find(|s| s.contains("/library/"));
        let Some(src) = src else { continue };
        let url = absolute_url(src, base_url);
        if url.contains(host) && url.contains("/library/") && seen.insert(url.clone()) {
            pages.push(url);
        }
    }

    // Some chapters only carry their pages inside inline scripts
    if pages.is_empty() {
        let image_re =
            Regex::new(r#"(?i)https?://[^"'\s]+\.(?:jpg|jpeg|png|webp|gif)"#).unwrap();
        let script_text: String = document
            .select(&sel("script"))
            .flat_map(|el| el.text())
            .collect();
        for m in image_re.find_iter(&script_text) {
            let url = m.as_str().to_string();
            if url.contains(host) && url.contains("library") && seen.insert(url.clone()) {
                pages.push(url);
            }
        }
    }

    ChapterDetails {
        id: chapter_id.to_string(),
        manga_id: manga_id.to_string(),
        pages,
    }
}

/// Extract catalog tiles from any page carrying `/manga/` anchors
/// (search results, catalog pages, the site root)
pub fn parse_manga_tiles(html: &str, base_url: &str) -> Vec<MangaTile> {
    let document = Html::parse_document(html);
    let img_sel = sel("img");

    let mut seen = HashSet::new();
    let mut tiles = Vec::new();

    for el in document.select(&sel(r#"a[href*="/manga/"]"#)) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        if href.contains("/lista") {
            continue;
        }
        let Some(id) = manga_id_from_href(href) else {
            continue;
        };

        let inner_img = el.select(&img_sel).next();

        let title = Some(clean_text(&el.text().collect::<String>()))
            .filter(|t| !t.is_empty())
            .or_else(|| {
                inner_img
                    .and_then(|img| img.value().attr("alt"))
                    .map(|alt| clean_text(alt))
                    .filter(|t| !t.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        // Catalog pages end with a "VER TODO" banner link; not a manga
        if title.contains("VER TODO") {
            continue;
        }

        // Dedupe only among tiles actually kept, so a skipped banner link
        // cannot shadow a later real tile with the same id
        if !seen.insert(id.clone()) {
            continue;
        }

        let image_url = inner_img
            .and_then(|img| {
                img.value()
                    .attr("src")
                    .or_else(|| img.value().attr("data-src"))
            })
            .map(|src| absolute_url(src, base_url))
            .unwrap_or_else(|| format!("{}/assets/images/black.png", base_url));

        tiles.push(MangaTile {
            id,
            title,
            image_url,
        });
    }

    tiles
}

/// Tiles plus next-page detection for catalog/search pages
pub fn parse_paged_results(html: &str, base_url: &str, page: u32) -> PagedResults {
    let results = parse_manga_tiles(html, base_url);
    let next_page = if has_next_page(html, page) {
        Some(page + 1)
    } else {
        None
    };
    PagedResults { results, next_page }
}

/// A further page exists when something links to `page=N+1` or a "Next" anchor
pub fn has_next_page(html: &str, current_page: u32) -> bool {
    let document = Html::parse_document(html);
    let next_href = format!("page={}", current_page + 1);

    document.select(&sel("a")).any(|el| {
        el.value()
            .attr("href")
            .map(|href| href.contains(&next_href))
            .unwrap_or(false)
            || el.text().collect::<String>().contains("Next")
    })
}

/// Parse the catalog's filter controls (`/lista`) into genre and type tags
pub fn parse_tag_sections(html: &str) -> Vec<TagSection> {
    let document = Html::parse_document(html);

    let mut seen = HashSet::new();
    let mut genres = Vec::new();
    for el in document.select(&sel(r#"select[name="generos"] option, a[href*="genre"]"#)) {
        let label = clean_text(&el.text().collect::<String>());
        let value = el
            .value()
            .attr("value")
            .map(str::to_string)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| label.clone());
        if value.is_empty() || label.is_empty() || label == "Todos" {
            continue;
        }
        let id = value.to_lowercase();
        if seen.insert(id.clone()) {
            genres.push(Tag { id, label });
        }
    }

    let mut types = Vec::new();
    for el in document.select(&sel(r#"select[name="tipos"] option"#)) {
        let label = clean_text(&el.text().collect::<String>());
        let Some(value) = el.value().attr("value") else {
            continue;
        };
        if value.is_empty() || label.is_empty() || label == "Todos" {
            continue;
        }
        types.push(Tag {
            id: value.to_string(),
            label,
        });
    }

    vec![
        TagSection {
            id: "genres".to_string(),
            label: "Géneros".to_string(),
            tags: genres,
        },
        TagSection {
            id: "types".to_string(),
            label: "Tipo".to_string(),
            tags: types,
        },
    ]
}
