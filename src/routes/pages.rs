//! HTML page handlers
//!
//! Each handler fans out its upstream calls with `tokio::join!`, then renders
//! one view. Upstream failures have already been resolved to empty values by
//! the client, so handlers only decide between the page and a not-found page.

use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::constants::{site::FALLBACK_GENRES, HOME_LIST_SIZE};
use crate::loader::CatalogLoader;
use crate::models::{AdConfig, FilterOption, FilterState, OrderBy, SeoData, Taxonomy};
use crate::player::{AdGate, SourceSwitcher};
use crate::views::{Chrome, GridPage, PageMeta, RenderError, WatchPage, FALLBACK_ERROR_PAGE};

use super::AppState;

/// Filter query accepted by the grid pages
#[derive(Debug, Default, Deserialize)]
pub struct GridQuery {
    pub genres: Option<String>,
    pub types: Option<String>,
    pub statuses: Option<String>,
    pub studios: Option<String>,
    pub orderby: Option<String>,
}

impl GridQuery {
    pub fn filters(&self) -> FilterState {
        FilterState::from_lists(
            self.genres.as_deref(),
            self.types.as_deref(),
            self.statuses.as_deref(),
            self.studios.as_deref(),
            self.orderby.as_deref(),
        )
    }
}

/// Server selection on the watch page
#[derive(Debug, Default, Deserialize)]
pub struct WatchQuery {
    /// Server index; anything unparsable keeps the default server
    pub server: Option<String>,
}

impl WatchQuery {
    pub fn server_index(&self) -> Option<usize> {
        self.server.as_deref().and_then(|s| s.trim().parse().ok())
    }
}

/// Wrap a rendered page, falling back to a static error page
fn html(status: StatusCode, rendered: Result<String, RenderError>) -> HttpResponse {
    match rendered {
        Ok(body) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body),
        Err(e) => {
            error!("Failed to render page: {}", e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::html())
                .body(FALLBACK_ERROR_PAGE)
        }
    }
}

fn not_found_page(data: &AppState, ads: Option<&AdConfig>, heading: &str, message: &str) -> HttpResponse {
    let chrome = Chrome::new(&data.config.site_name, ads);
    let meta = PageMeta::simple(format!("{} - {}", heading, data.config.site_name), None, None);
    html(
        StatusCode::NOT_FOUND,
        data.views.message(&chrome, &meta, heading, message),
    )
}

fn canonical(data: &AppState, path: &str) -> Option<String> {
    Some(format!("{}{}", data.config.site_url, path))
}

/// GET / - Home page
pub async fn home(data: web::Data<AppState>) -> HttpResponse {
    let client = &data.client;
    let all = FilterState::default();
    let (hero, latest, ads, seo) = tokio::join!(
        client.hero_items(),
        client.catalog_page_sized(1, HOME_LIST_SIZE, &all),
        client.ad_placements(),
        client.homepage_seo(),
    );

    let site = &data.config.site_name;
    let mut fallback = PageMeta::simple(
        format!("{} | Watch Anime with English Sub and Dub Online Free", site),
        Some(format!(
            "Watch anime online in English subbed and dubbed for free. Stream the latest anime episodes in HD on {}.",
            site
        )),
        canonical(&data, "/"),
    );
    fallback.og_title = format!("{} | Watch Anime Online Free", site);
    let meta = PageMeta::from_seo(seo.as_ref(), fallback);

    let latest = latest.map(|page| page.items);
    let chrome = Chrome::new(site, ads.as_ref());
    html(
        StatusCode::OK,
        data.views.home(
            &chrome,
            &meta,
            &hero.unwrap_or_default(),
            latest.as_deref(),
            ads.as_ref(),
        ),
    )
}

async fn grid_page(
    data: &AppState,
    filters: FilterState,
    heading: &str,
    path: &str,
    sortable: bool,
    seo: Option<SeoData>,
    description: String,
) -> HttpResponse {
    let (first, ads) = tokio::join!(
        data.client.catalog_page(1, &filters),
        data.client.ad_placements(),
    );
    info!(path = %path, items = first.as_ref().map_or(0, |p| p.items.len()), "Rendering grid");

    let loader = CatalogLoader::from_first_page(filters, first);
    let fallback = PageMeta::simple(
        format!("{} - {}", heading, data.config.site_name),
        Some(description.clone()),
        canonical(data, path),
    );
    let meta = PageMeta::from_seo(seo.as_ref(), fallback);
    let page = GridPage {
        heading,
        description: Some(&description),
        path,
        sortable,
        loader: &loader,
    };
    let chrome = Chrome::new(&data.config.site_name, ads.as_ref());
    html(StatusCode::OK, data.views.grid(&chrome, &meta, &page, ads.as_ref()))
}

/// GET /series - All series, filterable
pub async fn series(data: web::Data<AppState>, query: web::Query<GridQuery>) -> HttpResponse {
    let seo = data.client.post_type_archive_seo("anime").await;
    let description = format!(
        "Browse, filter, and sort all anime series available on {}.",
        data.config.site_name
    );
    grid_page(&data, query.filters(), "All Anime Series", "/series", true, seo, description).await
}

/// GET /movies - Grid preset to the movie type
pub async fn movies(data: web::Data<AppState>, query: web::Query<GridQuery>) -> HttpResponse {
    let seo = data.client.archive_seo(Taxonomy::Type.as_str(), "movie").await;
    let mut filters = query.filters();
    filters.types = FilterState::with_types(["movie"]).types;
    let description = format!(
        "Browse, filter, and sort all anime movies available on {}.",
        data.config.site_name
    );
    grid_page(&data, filters, "Movies", "/movies", true, seo, description).await
}

/// GET /new - Grid ordered by release date
pub async fn new_releases(data: web::Data<AppState>, query: web::Query<GridQuery>) -> HttpResponse {
    let mut filters = query.filters();
    filters.order_by = OrderBy::Date;
    let description = format!(
        "Browse, filter, and sort all the latest anime releases on {}.",
        data.config.site_name
    );
    grid_page(&data, filters, "New Releases", "/new", false, None, description).await
}

/// GET /popular - First catalog page in upstream order
pub async fn popular(data: web::Data<AppState>) -> HttpResponse {
    let all = FilterState::default();
    let (page, ads) = tokio::join!(
        data.client.catalog_page(1, &all),
        data.client.ad_placements(),
    );

    let site = &data.config.site_name;
    let meta = PageMeta::simple(
        format!("Popular Anime - {}", site),
        Some(format!("Watch the most popular and trending anime series on {}.", site)),
        canonical(&data, "/popular"),
    );
    let items = page.map(|p| p.items);
    let chrome = Chrome::new(site, ads.as_ref());
    html(StatusCode::OK, data.views.popular(&chrome, &meta, items.as_deref()))
}

/// GET /categories - Genre vocabulary, built-in list when unavailable
pub async fn categories(data: web::Data<AppState>) -> HttpResponse {
    let (genres, ads) = tokio::join!(
        data.client.filter_options(Taxonomy::Genre),
        data.client.ad_placements(),
    );

    let genres = if genres.is_empty() {
        warn!("Genre vocabulary unavailable, using built-in list");
        fallback_genres()
    } else {
        genres
    };

    let site = &data.config.site_name;
    let meta = PageMeta::simple(
        format!("Anime Categories - {}", site),
        Some(format!("Browse anime by genre on {}.", site)),
        canonical(&data, "/categories"),
    );
    let chrome = Chrome::new(site, ads.as_ref());
    html(StatusCode::OK, data.views.categories(&chrome, &meta, &genres))
}

fn fallback_genres() -> Vec<FilterOption> {
    FALLBACK_GENRES
        .iter()
        .map(|name| FilterOption {
            name: name.to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
        })
        .collect()
}

/// GET /anime/{slug} - Anime detail page
pub async fn anime_detail(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let slug = path.into_inner();
    let (anime, ads) = tokio::join!(data.client.anime_details(&slug), data.client.ad_placements());

    let Some(anime) = anime else {
        info!("Anime not found: {}", slug);
        return not_found_page(
            &data,
            ads.as_ref(),
            "Anime Not Found",
            "The anime you are looking for does not exist or has been removed.",
        );
    };

    let meta = PageMeta::for_anime(&anime, &data.config.site_name, &data.config.site_url);
    let chrome = Chrome::new(&data.config.site_name, ads.as_ref());
    html(StatusCode::OK, data.views.detail(&chrome, &meta, &anime, ads.as_ref()))
}

/// Splits `/watch/{anime}/{episode}` into its two slugs; extra segments are ignored
pub fn watch_slugs(tail: &str) -> Option<(&str, &str)> {
    let mut segments = tail.split('/').filter(|s| !s.is_empty());
    let anime = segments.next()?;
    let episode = segments.next()?;
    Some((anime, episode))
}

/// GET /watch/{tail:.*} - Episode player
pub async fn watch(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<WatchQuery>,
) -> HttpResponse {
    let tail = path.into_inner();
    let Some((anime_slug, episode_slug)) = watch_slugs(&tail) else {
        return not_found_page(&data, None, "Episode Not Found", "This episode link is incomplete.");
    };

    let (anime, ads) = tokio::join!(
        data.client.anime_details(anime_slug),
        data.client.ad_placements(),
    );

    let Some(anime) = anime else {
        return not_found_page(
            &data,
            ads.as_ref(),
            "Anime Not Found",
            "The anime you are looking for does not exist or has been removed.",
        );
    };
    let Some(index) = anime.episode_index(episode_slug) else {
        info!("Episode {} not found for {}", episode_slug, anime_slug);
        return not_found_page(&data, ads.as_ref(), "Episode Not Found", "This episode does not exist.");
    };

    let episode = &anime.episodes[index];
    let mut switcher = SourceSwitcher::new(episode, None);
    if let Some(server) = query.server_index() {
        if let Err(e) = switcher.select(server) {
            warn!("Ignoring server selection: {}", e);
        }
    }
    let gate = AdGate::from_ads(ads.as_ref());

    let site = &data.config.site_name;
    let number = index + 1;
    let title = format!("{} Episode {} English Subbed - {}", anime.title, number, site);
    let description = format!(
        "Watch {} Episode {} English Subbed free online on {}, you are watching {}.",
        anime.title, number, site, anime.title
    );
    let mut meta = PageMeta::simple(
        title,
        Some(description),
        canonical(&data, &format!("/watch/{}/{}", anime.slug, episode.slug)),
    );
    meta.og_type = "video.episode".to_string();
    meta.og_image = anime.cover_image.clone();
    meta.twitter_image = anime.cover_image.clone();

    let page = WatchPage {
        anime: &anime,
        episode_index: index,
        gate: &gate,
        switcher: &switcher,
    };
    let chrome = Chrome::new(site, ads.as_ref());
    html(StatusCode::OK, data.views.watch(&chrome, &meta, &page, ads.as_ref()))
}

/// Fallback for unknown paths
pub async fn not_found(data: web::Data<AppState>) -> HttpResponse {
    not_found_page(&data, None, "Page Not Found", "The page you are looking for does not exist.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_slugs() {
        assert_eq!(watch_slugs("naruto/naruto-1"), Some(("naruto", "naruto-1")));
        assert_eq!(watch_slugs("naruto/naruto-1/extra"), Some(("naruto", "naruto-1")));
        assert_eq!(watch_slugs("naruto/"), None);
        assert_eq!(watch_slugs("naruto"), None);
        assert_eq!(watch_slugs(""), None);
    }

    #[test]
    fn test_grid_query_filters() {
        let query = GridQuery {
            genres: Some("action,comedy".to_string()),
            orderby: Some("title".to_string()),
            ..GridQuery::default()
        };
        let filters = query.filters();
        assert_eq!(filters.genres.len(), 2);
        assert_eq!(filters.order_by, OrderBy::Title);
    }

    #[test]
    fn test_watch_query_server_index() {
        let query = |server: Option<&str>| WatchQuery {
            server: server.map(str::to_string),
        };
        assert_eq!(query(Some("1")).server_index(), Some(1));
        assert_eq!(query(Some(" 2 ")).server_index(), Some(2));
        assert_eq!(query(Some("abc")).server_index(), None);
        assert_eq!(query(Some("-1")).server_index(), None);
        assert_eq!(query(None).server_index(), None);
    }

    #[test]
    fn test_fallback_genre_slugs() {
        let genres = fallback_genres();
        let slice = genres.iter().find(|g| g.name == "Slice of Life").unwrap();
        assert_eq!(slice.slug, "slice-of-life");
    }
}
