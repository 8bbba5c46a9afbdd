//! The mangatv.net source adapter
//!
//! Each operation is a single request-then-parse step: fetch one page with
//! the shared rate-limited client, hand the body to `parser`, return the
//! extracted data. Missing markup degrades to defaults; only network
//! failures surface as errors.

use crate::config::Config;
use crate::helpers::absolute_url;
use crate::http_client::EnhancedHttpClient;
use crate::metrics::MetricsTracker;
use crate::models::{
    Chapter, ChapterDetails, HomeSection, Manga, PagedResults, SearchQuery, TagSection,
};
use crate::parser;
use log::debug;
use std::time::Instant;

pub const SECTION_LATEST: &str = "latest";
pub const SECTION_POPULAR: &str = "popular";

pub struct MangaTv {
    base_url: String,
    language: String,
    client: EnhancedHttpClient,
    metrics: MetricsTracker,
}

impl MangaTv {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_config(&Config::default())
    }

    pub fn with_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            client: config.http.create_http_client()?,
            metrics: MetricsTracker::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn metrics(&self) -> &MetricsTracker {
        &self.metrics
    }

    /// Canonical share link for a manga
    pub fn manga_share_url(&self, manga_id: &str) -> String {
        format!("{}/manga/{}", self.base_url, manga_id)
    }

    async fn fetch(&self, operation: &str, url: &str) -> Result<String, reqwest::Error> {
        debug!("[{}] GET {}", operation, url);
        let start = Instant::now();
        match self.client.get_text(url).await {
            Ok(html) => {
                self.metrics.record_success(operation, start.elapsed());
                debug!("[{}] received {} bytes", operation, html.len());
                Ok(html)
            }
            Err(e) => {
                self.metrics.record_failure(operation, e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch full metadata from the manga page
    pub async fn get_manga_details(&self, manga_id: &str) -> Result<Manga, reqwest::Error> {
        let url = self.manga_share_url(manga_id);
        let html = self.fetch("manga_details", &url).await?;
        Ok(parser::parse_manga_details(&html, manga_id, &self.base_url))
    }

    /// Fetch the chapter list, newest first
    pub async fn get_chapters(&self, manga_id: &str) -> Result<Vec<Chapter>, reqwest::Error> {
        let url = self.manga_share_url(manga_id);
        let html = self.fetch("chapters", &url).await?;
        let chapters = parser::parse_chapter_list(&html, manga_id, &self.language);
        debug!("found {} chapters for {}", chapters.len(), manga_id);
        Ok(chapters)
    }

    /// Fetch the page image URLs for one chapter
    pub async fn get_chapter_details(
        &self,
        manga_id: &str,
        chapter_id: &str,
    ) -> Result<ChapterDetails, reqwest::Error> {
        let url = format!("{}/leer/{}", self.base_url, chapter_id);
        let html = self.fetch("chapter_details", &url).await?;
        Ok(parser::parse_page_list(
            &html,
            manga_id,
            chapter_id,
            &self.base_url,
        ))
    }

    /// Catalog URL for a search query; `page` starts at 1
    pub fn search_url(&self, query: &SearchQuery, page: u32) -> String {
        let mut url = match &query.title {
            Some(title) if !title.is_empty() => format!(
                "{}/lista?buscar={}&page={}",
                self.base_url,
                urlencoding::encode(title),
                page
            ),
            _ => format!("{}/lista?page={}", self.base_url, page),
        };
        for tag in &query.included_tags {
            url.push_str(&format!("&genre[]={}", urlencoding::encode(tag)));
        }
        url
    }

    /// Search the catalog; `page` starts at 1
    pub async fn get_search_results(
        &self,
        query: &SearchQuery,
        page: u32,
    ) -> Result<PagedResults, reqwest::Error> {
        let url = self.search_url(query, page);
        let html = self.fetch("search", &url).await?;
        Ok(parser::parse_paged_results(&html, &self.base_url, page))
    }

    /// Build the two home sections: latest updates from the catalog page,
    /// popular titles from the site root
    pub async fn get_home_page_sections(&self) -> Result<Vec<HomeSection>, reqwest::Error> {
        let latest_html = self
            .fetch("home_latest", &format!("{}/lista", self.base_url))
            .await?;
        let mut latest = parser::parse_manga_tiles(&latest_html, &self.base_url);
        latest.truncate(20);

        let popular_html = self.fetch("home_popular", &self.base_url).await?;
        let mut popular = parser::parse_manga_tiles(&popular_html, &self.base_url);
        popular.truncate(20);

        Ok(vec![
            HomeSection {
                id: SECTION_LATEST.to_string(),
                title: "Últimas Actualizaciones".to_string(),
                items: latest,
                view_more: true,
            },
            HomeSection {
                id: SECTION_POPULAR.to_string(),
                title: "Mangas Populares".to_string(),
                items: popular,
                view_more: true,
            },
        ])
    }

    /// Page through a home section; popular sorts the catalog by votes
    pub async fn get_view_more_items(
        &self,
        section_id: &str,
        page: u32,
    ) -> Result<PagedResults, reqwest::Error> {
        let url = if section_id == SECTION_POPULAR {
            format!("{}/lista?ordenar=votos&page={}", self.base_url, page)
        } else {
            format!("{}/lista?page={}", self.base_url, page)
        };

        let html = self.fetch("view_more", &url).await?;
        Ok(parser::parse_paged_results(&html, &self.base_url, page))
    }

    /// Fetch the catalog's genre and type filters
    pub async fn get_tags(&self) -> Result<Vec<TagSection>, reqwest::Error> {
        let html = self
            .fetch("tags", &format!("{}/lista", self.base_url))
            .await?;
        Ok(parser::parse_tag_sections(&html))
    }

    fn warm_up_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(referer) = self.base_url.parse() {
            headers.insert("Referer", referer);
        }
        headers
    }

    /// Hit the site root with browser headers to pick up Cloudflare cookies
    /// before scraping
    pub async fn warm_up(&self) -> Result<(), reqwest::Error> {
        self.client
            .get_text_with_headers(&self.base_url, self.warm_up_headers())
            .await?;
        Ok(())
    }

    /// Resolve a cover or page URL scraped off the site against the base
    pub fn absolute(&self, url: &str) -> String {
        absolute_url(url, &self.base_url)
    }
}
