//! Constants module for the anime catalog
//!
//! Contains upstream endpoint URL builders, freshness windows and the tuning
//! knobs of the paging, debounce and ad-gate components.

use std::time::Duration;

/// Items requested per catalog page
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Items shown on the home page list
pub const HOME_LIST_SIZE: u32 = 20;

/// Minimum trimmed length of a search query that reaches the network
pub const MIN_SEARCH_LEN: usize = 3;

/// An ad slot is interleaved after every this many grid items
pub const NATIVE_AD_CADENCE: usize = 12;

/// Player-gate countdown used when the ad config carries no duration
pub const DEFAULT_PLAYER_LOADING_SECS: u32 = 5;

/// Quiet period before a filter change triggers a fetch
pub const FILTER_DEBOUNCE: Duration = Duration::from_millis(500);

/// Quiet period before a search query triggers a fetch
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(400);

/// Distance (px) from the bottom of the grid that triggers the next page
pub const SCROLL_THRESHOLD_PX: u32 = 500;

/// Hard timeout of the sitemap feed fetch
pub const SITEMAP_TIMEOUT: Duration = Duration::from_secs(10);

/// Freshness windows per endpoint family
pub mod freshness {
    use std::time::Duration;

    /// Hero carousel
    pub const HERO: Duration = Duration::from_secs(600);
    /// Catalog pages, anime details and SEO metadata
    pub const CATALOG: Duration = Duration::from_secs(3600);
    /// Ad placements
    pub const ADS: Duration = Duration::from_secs(300);
    /// Filter vocabularies and sitemap feed
    pub const DAILY: Duration = Duration::from_secs(86_400);
}

/// URL builder functions for all upstream endpoints
pub mod endpoints {
    use crate::models::Taxonomy;

    /// Hero carousel items
    pub fn hero(base_url: &str) -> String {
        format!("{}/wp-json/gogo-hero/v1/carousel", base_url)
    }

    /// Paginated catalog; `query` holds already-built filter pairs
    pub fn animes(base_url: &str, page: u32, per_page: u32, query: &[(&str, String)]) -> String {
        let mut url = format!(
            "{}/wp-json/gogo/v1/animes?page={}&per_page={}",
            base_url, page, per_page
        );
        for (key, value) in query {
            url.push('&');
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Single anime detail
    pub fn anime(base_url: &str, slug: &str) -> String {
        format!("{}/wp-json/gogo/v1/anime/{}", base_url, urlencoding::encode(slug))
    }

    /// SEO metadata for an anime
    pub fn seo_meta(base_url: &str, slug: &str) -> String {
        format!(
            "{}/wp-json/gogo-seo/v1/meta?slug={}",
            base_url,
            urlencoding::encode(slug)
        )
    }

    /// SEO metadata for a taxonomy archive (e.g. `anime_type`/`movie`)
    pub fn archive_seo(base_url: &str, taxonomy: &str, slug: &str) -> String {
        format!(
            "{}/wp-json/gogo-seo/v1/archive-meta?taxonomy={}&slug={}",
            base_url,
            urlencoding::encode(taxonomy),
            urlencoding::encode(slug)
        )
    }

    /// SEO metadata for the home page
    pub fn homepage_seo(base_url: &str) -> String {
        format!("{}/wp-json/gogo-seo/v1/homepage-meta", base_url)
    }

    /// SEO metadata for a post-type archive (e.g. `anime`)
    pub fn post_type_archive_seo(base_url: &str, post_type: &str) -> String {
        format!(
            "{}/wp-json/gogo-seo/v1/post-type-archive-meta?post_type={}",
            base_url,
            urlencoding::encode(post_type)
        )
    }

    /// Search URL with query parameter
    pub fn search(base_url: &str, query: &str) -> String {
        format!("{}/wp-json/gogo/v1/search?q={}", base_url, urlencoding::encode(query))
    }

    /// Filter vocabulary for a taxonomy
    pub fn filters(base_url: &str, taxonomy: Taxonomy) -> String {
        format!("{}/wp-json/gogo/v1/filters/{}", base_url, taxonomy)
    }

    /// Ad placement settings
    pub fn placements(base_url: &str) -> String {
        format!("{}/wp-json/gogo-arsenal/v1/placements", base_url)
    }

    /// Sitemap feed
    pub fn sitemap(base_url: &str) -> String {
        format!("{}/wp-json/gogo/v1/sitemap-data", base_url)
    }
}

/// Site-level constants used by the views and the sitemap
pub mod site {
    /// Genres shown on the categories page when the vocabulary can't be fetched
    pub const FALLBACK_GENRES: &[&str] = &[
        "Action",
        "Adventure",
        "Comedy",
        "Drama",
        "Fantasy",
        "Magic",
        "Supernatural",
        "Horror",
        "Mystery",
        "Psychological",
        "Romance",
        "Sci-Fi",
        "Slice of Life",
        "Sports",
        "Isekai",
        "Mecha",
    ];

    /// Static routes with their sitemap priority
    pub const STATIC_ROUTES: &[(&str, f32)] = &[
        ("/", 1.0),
        ("/series", 0.9),
        ("/new", 0.9),
        ("/movies", 0.7),
        ("/popular", 0.7),
        ("/categories", 0.5),
    ];

    /// Sitemap priority of anime detail pages
    pub const ANIME_PRIORITY: f32 = 0.8;
}
