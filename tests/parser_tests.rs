/// Fixture-driven tests for the mangatv.net page parsers
///
/// Fixtures under tests/fixtures/ mirror the markup shapes served by the
/// live site; the parsers must keep working against them without network.
use mangatv_scraper::models::MangaStatus;
use mangatv_scraper::parser;

const BASE: &str = "https://mangatv.net";

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name))
        .unwrap_or_else(|e| panic!("failed to read fixture {}: {}", name, e))
}

#[test]
fn manga_details_extracts_metadata() {
    let html = fixture("manga_page.html");
    let manga = parser::parse_manga_details(&html, "101/solo-leveling", BASE);

    assert_eq!(manga.id, "101/solo-leveling");
    assert_eq!(manga.title, "Solo Leveling");
    assert_eq!(
        manga.cover_url,
        "https://mangatv.net/library/covers/solo-leveling.jpg"
    );
    assert!(manga.description.starts_with("Diez años atrás"));
    // The site disclaimer paragraph must never be taken as the description
    assert!(!manga.description.contains("Las imágenes mostradas"));
    assert_eq!(manga.status, MangaStatus::Ongoing);
    assert_eq!(manga.author.as_deref(), Some("Chugong"));
    assert_eq!(manga.artist.as_deref(), Some("Chugong"));

    let genres = &manga.tags[0];
    assert_eq!(genres.label, "Géneros");
    let labels: Vec<_> = genres.tags.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Acción", "Fantasía"]);
}

#[test]
fn manga_details_falls_back_to_meta_tags() {
    let html = fixture("manga_page_completed.html");
    let manga = parser::parse_manga_details(&html, "102/berserk", BASE);

    // No h1 on this page; og:title carries the name
    assert_eq!(manga.title, "Berserk");
    assert_eq!(manga.status, MangaStatus::Completed);
    assert_eq!(manga.cover_url, "");
    assert_eq!(manga.description, "");
    assert!(manga.author.is_none());
}

#[test]
fn manga_details_defaults_on_empty_page() {
    let manga = parser::parse_manga_details("<html><body></body></html>", "1/x", BASE);
    assert_eq!(manga.title, "Sin título");
    assert_eq!(manga.status, MangaStatus::Ongoing);
}

#[test]
fn chapter_list_sorted_descending_with_duplicates_removed() {
    let html = fixture("manga_page.html");
    let chapters = parser::parse_chapter_list(&html, "101/solo-leveling", "es");

    // The fixture repeats sl-110; only the first occurrence survives
    assert_eq!(chapters.len(), 3);
    let ids: Vec<_> = chapters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["sl-110", "sl-109-5", "sl-109"]);

    let numbers: Vec<_> = chapters.iter().map(|c| c.chapter_number).collect();
    assert_eq!(numbers, vec![110.0, 109.5, 109.0]);
}

#[test]
fn chapter_rows_carry_date_group_and_title() {
    let html = fixture("manga_page.html");
    let chapters = parser::parse_chapter_list(&html, "101/solo-leveling", "es");

    let newest = &chapters[0];
    assert_eq!(newest.title, "Capítulo 110");
    assert_eq!(newest.manga_id, "101/solo-leveling");
    assert_eq!(newest.lang_code, "es");
    assert_eq!(newest.released.date_naive().to_string(), "2024-03-15");
    assert_eq!(newest.scanlation_group.as_deref(), Some("Night Scans"));

    let half = &chapters[1];
    assert_eq!(half.title, "Capítulo 109.5");

    let oldest = &chapters[2];
    assert_eq!(oldest.scanlation_group.as_deref(), Some("Luna Fansub"));
}

#[test]
fn page_list_from_img_tags() {
    let html = fixture("reader_page.html");
    let details = parser::parse_page_list(&html, "101/solo-leveling", "sl-110", BASE);

    assert_eq!(details.id, "sl-110");
    assert_eq!(details.manga_id, "101/solo-leveling");
    // Placeholder src images resolve through data-src; off-site library
    // images and duplicates are dropped
    assert_eq!(
        details.pages,
        vec![
            "https://mangatv.net/library/chapters/sl-110/01.jpg",
            "https://mangatv.net/library/chapters/sl-110/02.jpg",
        ]
    );
}

#[test]
fn page_list_falls_back_to_script_urls() {
    let html = fixture("reader_page_scripted.html");
    let details = parser::parse_page_list(&html, "101/solo-leveling", "sl-110", BASE);

    assert_eq!(
        details.pages,
        vec![
            "https://mangatv.net/library/chapters/sl-110/01.webp",
            "https://mangatv.net/library/chapters/sl-110/02.webp",
        ]
    );
}

#[test]
fn page_list_empty_when_nothing_matches() {
    let details = parser::parse_page_list("<html><body></body></html>", "1/x", "c1", BASE);
    assert!(details.pages.is_empty());
}

#[test]
fn catalog_tiles_extracted_and_deduped() {
    let html = fixture("lista_page.html");
    let tiles = parser::parse_manga_tiles(&html, BASE);

    assert_eq!(tiles.len(), 4);

    assert_eq!(tiles[0].id, "101/solo-leveling");
    assert_eq!(tiles[0].title, "Solo Leveling");
    assert_eq!(tiles[0].image_url, "https://mangatv.net/library/covers/sl.jpg");

    // Title comes from the img alt when the anchor has no text
    assert_eq!(tiles[1].id, "102/berserk");
    assert_eq!(tiles[1].title, "Berserk");
    assert_eq!(
        tiles[1].image_url,
        "https://mangatv.net/library/covers/berserk.jpg"
    );

    // No image at all falls back to the site placeholder
    assert_eq!(tiles[2].title, "One Piece");
    assert_eq!(
        tiles[2].image_url,
        "https://mangatv.net/assets/images/black.png"
    );
}

#[test]
fn banner_link_does_not_consume_tile_id() {
    let html = fixture("lista_page.html");
    let tiles = parser::parse_manga_tiles(&html, BASE);

    // The fixture carries a "VER TODO" banner pointing at 105/dragon-ball
    // before the real tile; the real tile must still come through
    let matches: Vec<_> = tiles.iter().filter(|t| t.id == "105/dragon-ball").collect();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].title, "Dragon Ball");
    assert_eq!(
        matches[0].image_url,
        "https://mangatv.net/library/covers/db.jpg"
    );
}

#[test]
fn chapter_number_falls_back_to_position() {
    // Rows without a "Capítulo N" marker get numbered by position
    let html = r#"<html><body>
        <div><a href="/leer/extra-a">Especial de año nuevo</a></div>
        <div><a href="/leer/extra-b">Especial de verano</a></div>
    </body></html>"#;
    let chapters = parser::parse_chapter_list(html, "1/x", "es");

    assert_eq!(chapters.len(), 2);
    // Sorted newest first, so the second row leads
    assert_eq!(chapters[0].id, "extra-b");
    assert_eq!(chapters[0].chapter_number, 2.0);
    assert_eq!(chapters[1].id, "extra-a");
    assert_eq!(chapters[1].chapter_number, 1.0);
    assert_eq!(chapters[1].title, "Capítulo 1");
}

#[test]
fn paged_results_detect_next_page() {
    let html = fixture("lista_page.html");

    let first = parser::parse_paged_results(&html, BASE, 1);
    assert_eq!(first.results.len(), 4);
    assert_eq!(first.next_page, Some(2));

    // No link to page 6 anywhere on the fixture
    let last = parser::parse_paged_results(&html, BASE, 5);
    assert_eq!(last.next_page, None);
}

#[test]
fn next_page_detected_from_next_anchor_text() {
    // Some list pages label pagination "Next" instead of numbering it
    let html = r#"<html><body>
        <a href="/manga/1/x">X</a>
        <a href="/lista?continuar=1">Next</a>
    </body></html>"#;
    assert!(parser::has_next_page(html, 3));

    let numbered_only = r#"<html><body><a href="/lista?page=2">2</a></body></html>"#;
    assert!(!parser::has_next_page(numbered_only, 3));
}

#[test]
fn tag_sections_from_catalog_filters() {
    let html = fixture("lista_page.html");
    let sections = parser::parse_tag_sections(&html);

    assert_eq!(sections.len(), 2);

    let genres = &sections[0];
    assert_eq!(genres.id, "genres");
    assert_eq!(genres.label, "Géneros");
    let ids: Vec<_> = genres.tags.iter().map(|t| t.id.as_str()).collect();
    // "Todos" is the filter's reset entry, not a genre
    assert_eq!(ids, vec!["accion", "drama"]);

    let types = &sections[1];
    assert_eq!(types.id, "types");
    assert_eq!(types.label, "Tipo");
    let labels: Vec<_> = types.tags.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Manga", "Manhwa"]);
}
