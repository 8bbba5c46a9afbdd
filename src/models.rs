use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication status as shown on the site ("Estado: En emisión / Finalizado")
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MangaStatus {
    Ongoing,
    Completed,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Manga {
    /// Site id, shaped like "1234/some-slug"
    pub id: String,
    pub title: String,
    pub cover_url: String,
    pub description: String,
    pub status: MangaStatus,
    pub author: Option<String>,
    pub artist: Option<String>,
    pub tags: Vec<TagSection>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Chapter {
    /// Path segment after /leer/
    pub id: String,
    pub manga_id: String,
    pub title: String,
    pub chapter_number: f32,
    pub lang_code: String,
    pub released: DateTime<Utc>,
    pub scanlation_group: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChapterDetails {
    pub id: String,
    pub manga_id: String,
    pub pages: Vec<String>,
}

/// Catalog entry as it appears on list pages, before the manga page is fetched
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MangaTile {
    pub id: String,
    pub title: String,
    pub image_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PagedResults {
    pub results: Vec<MangaTile>,
    /// Page number to request next, when the page links to one
    pub next_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HomeSection {
    pub id: String,
    pub title: String,
    pub items: Vec<MangaTile>,
    pub view_more: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TagSection {
    pub id: String,
    pub label: String,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SearchQuery {
    pub title: Option<String>,
    /// Genre tag ids to pass as genre[] filters
    pub included_tags: Vec<String>,
}

/// Static descriptor for this source
#[derive(Debug, Serialize, Clone)]
pub struct SourceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub base_url: &'static str,
    pub language: &'static str,
}

pub const MANGATV_INFO: SourceInfo = SourceInfo {
    name: "MangaTV",
    version: "1.0.0",
    description: "Scraper para leer manga desde mangatv.net",
    base_url: "https://mangatv.net",
    language: "es",
};
