use mangatv_scraper::config::Config;
use mangatv_scraper::models::{SearchQuery, MANGATV_INFO};
use mangatv_scraper::source::MangaTv;

fn init_logging() {
    if log4rs::init_file("log4rs.yml", Default::default()).is_err() {
        use log4rs::append::console::ConsoleAppender;
        use log4rs::config::{Appender, Config as LogConfig, Root};

        let stdout = ConsoleAppender::builder().build();
        if let Ok(config) = LogConfig::builder()
            .appender(Appender::builder().build("stdout", Box::new(stdout)))
            .build(
                Root::builder()
                    .appender("stdout")
                    .build(log::LevelFilter::Info),
            )
        {
            let _ = log4rs::init_config(config);
        }
    }
}

fn usage() -> ! {
    eprintln!("Usage: mangatv_scraper <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info                          print the source descriptor");
    eprintln!("  details <manga_id>            fetch manga metadata");
    eprintln!("  chapters <manga_id>           fetch the chapter list");
    eprintln!("  pages <manga_id> <chapter_id> fetch page image URLs");
    eprintln!("  search <query> [page]         search the catalog");
    eprintln!("  home                          fetch the home sections");
    eprintln!("  more <latest|popular> [page]  page through a home section");
    eprintln!("  tags                          fetch genre/type filters");
    eprintln!();
    eprintln!("Manga ids look like \"1234/some-slug\".");
    std::process::exit(2);
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        usage();
    };

    if command == "info" {
        return print_json(&MANGATV_INFO);
    }

    let config = Config::load();
    let source = MangaTv::with_config(&config)?;
    log::info!("mangatv scraper against {}", source.base_url());

    // Pick up Cloudflare cookies before the real request
    if let Err(e) = source.warm_up().await {
        log::warn!("warm-up request failed: {}", e);
    }

    match command {
        "details" => {
            let Some(manga_id) = args.get(1) else { usage() };
            let manga = source.get_manga_details(manga_id).await?;
            print_json(&manga)?;
        }
        "chapters" => {
            let Some(manga_id) = args.get(1) else { usage() };
            let chapters = source.get_chapters(manga_id).await?;
            log::info!("{} chapters", chapters.len());
            print_json(&chapters)?;
        }
        "pages" => {
            let (Some(manga_id), Some(chapter_id)) = (args.get(1), args.get(2)) else {
                usage()
            };
            let details = source.get_chapter_details(manga_id, chapter_id).await?;
            log::info!("{} pages", details.pages.len());
            print_json(&details)?;
        }
        "search" => {
            let Some(title) = args.get(1) else { usage() };
            let page = args
                .get(2)
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(1);
            let query = SearchQuery {
                title: Some(title.clone()),
                included_tags: Vec::new(),
            };
            let results = source.get_search_results(&query, page).await?;
            log::info!("{} results on page {}", results.results.len(), page);
            print_json(&results)?;
        }
        "home" => {
            let sections = source.get_home_page_sections().await?;
            print_json(&sections)?;
        }
        "more" => {
            let Some(section) = args.get(1) else { usage() };
            let page = args
                .get(2)
                .and_then(|s| s.parse::<u32>().ok())
                .unwrap_or(1);
            let results = source.get_view_more_items(section, page).await?;
            print_json(&results)?;
        }
        "tags" => {
            let sections = source.get_tags().await?;
            print_json(&sections)?;
        }
        _ => usage(),
    }

    log::debug!("request metrics: {}", source.metrics().export_json());
    Ok(())
}
