use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use marquee_config::{ConfigLoad, ConfigLoader};
use marquee_core::{
    Catalog, PageView, ViewStyleState, providers::TmdbMetadataApi,
};
use marquee_model::{
    ImageSize, MovieCategory, MovieEntity, PersonEntity, ViewStyle, image_url,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browse TMDB listings through the catalog cache
#[derive(Parser, Debug)]
#[command(name = "marquee-browse")]
#[command(about = "Fetch and print a page of a TMDB movie or people listing")]
struct Cli {
    /// Movie listing to browse (popular, top_rated, upcoming, now_playing)
    #[arg(short, long, default_value = "popular")]
    category: String,

    /// Page to show; shorthand for `--query page=N`
    #[arg(short, long, conflicts_with = "query")]
    page: Option<u32>,

    /// Location query string, e.g. `region=US&page=3`
    #[arg(short, long)]
    query: Option<String>,

    /// Browse popular people instead of movies
    #[arg(long)]
    people: bool,

    /// Card style (poster or backdrop)
    #[arg(long, default_value = "poster")]
    view: ViewStyle,

    /// Configuration file (overrides MARQUEE_CONFIG_PATH)
    #[arg(long, env = "MARQUEE_CONFIG_PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marquee_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut loader = ConfigLoader::new();
    if let Some(path) = cli.config.as_ref() {
        loader = loader.with_config_path(path);
    }
    let ConfigLoad { config, warnings } =
        loader.load().context("failed to load configuration")?;

    if config.metadata.env_file_loaded {
        info!("loaded .env file");
    }
    for warning in warnings.iter() {
        warn!("{warning}");
    }

    let api = TmdbMetadataApi::from_config(&config.tmdb)
        .context("failed to build TMDB client")?;
    let catalog = Catalog::from_config(Arc::new(api), &config.catalog)
        .with_view_style(ViewStyleState::new(cli.view));

    let query = match (cli.query, cli.page) {
        (Some(query), _) => query,
        (None, Some(page)) => marquee_core::write_page("", page),
        (None, None) => String::new(),
    };
    let image_base = config.tmdb.image_base_url.as_str();

    if cli.people {
        let listing = catalog.people_listing();
        let pages = catalog.people_pages();
        let view = pages.load(&listing, &query).await;
        print_header(&view);
        for person in &view.items {
            print_person(person, image_base);
        }
        let next = view.next_page().map(|page| pages.page_href(&query, page));
        print_footer(&view, next.as_deref());
    } else {
        // Accept `top-rated` and friends for the known categories.
        let category = cli
            .category
            .parse::<MovieCategory>()
            .map(|category| category.as_str().to_string())
            .unwrap_or(cli.category);
        let listing = catalog
            .movie_listing(&category)
            .context("invalid listing")?;
        let pages = catalog.movie_pages();
        let view = pages.load(&listing, &query).await;
        print_header(&view);
        for movie in &view.items {
            print_movie(movie, view.view_style, image_base);
        }
        let next = view.next_page().map(|page| pages.page_href(&query, page));
        print_footer(&view, next.as_deref());
    }

    Ok(())
}

fn print_header<E>(view: &PageView<E>) {
    match view.total_pages {
        Some(total) => println!("{} (page {} of {})", view.title, view.page, total),
        None => println!("{} (page {})", view.title, view.page),
    }
}

fn print_footer<E>(view: &PageView<E>, next_href: Option<&str>) {
    if let Some(failure) = view.last_error.as_ref() {
        println!("  ! {failure}");
    }
    match next_href {
        Some(href) if view.show_pager() => println!("next: {href}"),
        _ => {}
    }
}

fn print_movie(movie: &MovieEntity, style: ViewStyle, image_base: &str) {
    let year = movie
        .release_date
        .map(|date| date.format("%Y").to_string())
        .unwrap_or_else(|| "----".to_string());
    let rating = movie
        .rating()
        .map(|r| format!("{r:.1}"))
        .unwrap_or_else(|| "n/a".to_string());
    let (path, size) = match style {
        ViewStyle::Poster => (movie.poster_path.as_deref(), ImageSize::poster()),
        ViewStyle::Backdrop => {
            (movie.backdrop_path.as_deref(), ImageSize::backdrop())
        }
    };

    println!("  {:>8}  {} ({year})  {rating}", movie.id, movie.title);
    if let Some(url) = image_url(image_base, path, size) {
        println!("            {url}");
    }
}

fn print_person(person: &PersonEntity, image_base: &str) {
    println!("  {:>8}  {}", person.id, person.name);
    if let Some(url) =
        image_url(image_base, person.profile_path.as_deref(), ImageSize::profile())
    {
        println!("            {url}");
    }
}
