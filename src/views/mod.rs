//! HTML views rendered with Handlebars
//!
//! Every page is rendered in two passes: the page template produces the body,
//! then the layout wraps it with the head metadata and the site chrome. Ad
//! placements are read from the `AdConfig` handed to each builder; a missing
//! config simply renders no sponsor slots.

pub mod meta;
pub mod templates;

use std::sync::Arc;

use chrono::{Datelike, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::constants::{MIN_SEARCH_LEN, NATIVE_AD_CADENCE, SCROLL_THRESHOLD_PX, SEARCH_DEBOUNCE};
use crate::loader::{interleave, CatalogLoader, ExhaustReason, GridCell, LoadState};
use crate::models::{
    AdConfig, AnimeDetails, CatalogItem, FilterOption, FilterState, HeroItem, OrderBy, Placement,
};
use crate::player::{AdGate, GateView, PlayerView, SourceSwitcher, SOURCE_NOT_FOUND};

pub use meta::{json_ld, PageMeta};
pub use templates::FALLBACK_ERROR_PAGE;

pub const EMPTY_GRID_TEXT: &str = "No results match your selected filters.";
pub const END_OF_GRID_TEXT: &str = "You've reached the end!";
pub const HOME_LIST_ERROR: &str = "Failed to load main anime list.";
pub const POPULAR_ERROR: &str = "Could not load popular animes at this time. Please try again later.";
const GRID_ERROR: &str = "Could not load animes at this time. Please try again later.";

/// Errors raised while registering or rendering templates
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to register template {name}: {message}")]
    Template { name: &'static str, message: String },

    #[error("Failed to render template {name}: {message}")]
    Render { name: &'static str, message: String },
}

/// Site-wide chrome shared by every page
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Chrome {
    pub site_name: String,
    pub year: i32,
    pub popunder_script: Option<String>,
    pub footer_script: Option<String>,
    pub direct_link: Option<String>,
    /// Quiet period of the header search box
    pub search_delay_ms: u64,
    pub search_min_len: usize,
}

impl Chrome {
    pub fn new(site_name: &str, ads: Option<&AdConfig>) -> Self {
        let script = |placement: Placement| ads.and_then(|a| a.script(placement)).map(str::to_string);
        Self {
            site_name: site_name.to_string(),
            year: Utc::now().year(),
            popunder_script: script(Placement::Popunder),
            footer_script: script(Placement::Footer),
            direct_link: ads.and_then(AdConfig::direct_link).map(str::to_string),
            search_delay_ms: SEARCH_DEBOUNCE.as_millis() as u64,
            search_min_len: MIN_SEARCH_LEN,
        }
    }
}

/// Inputs of a filterable grid page
pub struct GridPage<'a> {
    pub heading: &'a str,
    pub description: Option<&'a str>,
    /// Route the order form submits to
    pub path: &'a str,
    /// Whether the order form is shown; false when the route fixes the order
    pub sortable: bool,
    pub loader: &'a CatalogLoader,
}

/// Inputs of the watch page
pub struct WatchPage<'a> {
    pub anime: &'a AnimeDetails,
    pub episode_index: usize,
    pub gate: &'a AdGate,
    pub switcher: &'a SourceSwitcher,
}

/// Template registry
#[derive(Clone)]
pub struct Views {
    handlebars: Arc<Handlebars<'static>>,
}

impl Views {
    pub fn new() -> Result<Self, RenderError> {
        let mut handlebars = Handlebars::new();

        for (name, source) in [
            ("layout", templates::LAYOUT_TEMPLATE),
            ("home", templates::HOME_TEMPLATE),
            ("grid", templates::GRID_TEMPLATE),
            ("popular", templates::POPULAR_TEMPLATE),
            ("categories", templates::CATEGORIES_TEMPLATE),
            ("detail", templates::DETAIL_TEMPLATE),
            ("watch", templates::WATCH_TEMPLATE),
            ("message", templates::MESSAGE_TEMPLATE),
        ] {
            handlebars
                .register_template_string(name, source)
                .map_err(|e| RenderError::Template {
                    name,
                    message: e.to_string(),
                })?;
        }

        for (name, source) in [
            ("card", templates::CARD_PARTIAL),
            ("player", templates::PLAYER_PARTIAL),
        ] {
            handlebars
                .register_partial(name, source)
                .map_err(|e| RenderError::Template {
                    name,
                    message: e.to_string(),
                })?;
        }

        Ok(Self {
            handlebars: Arc::new(handlebars),
        })
    }

    fn render(&self, name: &'static str, data: &Value) -> Result<String, RenderError> {
        self.handlebars
            .render(name, data)
            .map_err(|e| RenderError::Render {
                name,
                message: e.to_string(),
            })
    }

    fn page(
        &self,
        name: &'static str,
        body_data: &Value,
        chrome: &Chrome,
        meta: &PageMeta,
        json_ld: Option<String>,
    ) -> Result<String, RenderError> {
        let body = self.render(name, body_data)?;
        self.render(
            "layout",
            &json!({
                "meta": meta,
                "chrome": chrome,
                "json_ld": json_ld,
                "body": body,
            }),
        )
    }

    /// Home page: hero carousel, latest list and leaderboard/sidebar placements
    pub fn home(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        hero: &[HeroItem],
        latest: Option<&[CatalogItem]>,
        ads: Option<&AdConfig>,
    ) -> Result<String, RenderError> {
        let items = latest.unwrap_or_default();
        let data = json!({
            "hero": hero,
            "items": items.iter().map(card).collect::<Vec<_>>(),
            "error": latest.is_none().then_some(HOME_LIST_ERROR),
            "leaderboard_desktop": placement(ads, Placement::LeaderboardDesktop),
            "leaderboard_mobile": placement(ads, Placement::LeaderboardMobile),
            "sidebar": placement(ads, Placement::Sidebar),
        });
        self.page("home", &data, chrome, meta, None)
    }

    /// Grid page seeded with the loader's first page
    pub fn grid(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        page: &GridPage<'_>,
        ads: Option<&AdConfig>,
    ) -> Result<String, RenderError> {
        let loader = page.loader;
        let filters = loader.filters();
        let native = placement(ads, Placement::Native);

        let cells: Vec<Value> = interleave(loader.items(), NATIVE_AD_CADENCE, native.is_some())
            .iter()
            .map(|cell| match cell {
                GridCell::Item(item) => card(item),
                GridCell::AdSlot { .. } => json!({"ad": true, "key": cell.key()}),
            })
            .collect();

        let empty_text = match loader.state() {
            LoadState::Exhausted(ExhaustReason::Failed) => GRID_ERROR,
            _ => EMPTY_GRID_TEXT,
        };

        let data = json!({
            "heading": page.heading,
            "description": page.description,
            "path": page.path,
            "sortable": page.sortable,
            "hidden": hidden_filters(filters),
            "order_date": filters.order_by == OrderBy::Date,
            "order_title": filters.order_by == OrderBy::Title,
            "empty": loader.items().is_empty(),
            "empty_text": empty_text,
            "end_text": END_OF_GRID_TEXT,
            "cells": cells,
            "native_script": native,
            "next_page": loader.current_page() + 1,
            "has_more": loader.has_more(),
            "query": catalog_query(filters),
            "count": loader.items().len(),
            "cadence": NATIVE_AD_CADENCE,
            "threshold": SCROLL_THRESHOLD_PX,
        });
        self.page("grid", &data, chrome, meta, None)
    }

    /// Popular list; `None` renders the failure notice
    pub fn popular(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        items: Option<&[CatalogItem]>,
    ) -> Result<String, RenderError> {
        let error = match items {
            Some(items) if !items.is_empty() => None,
            _ => Some(POPULAR_ERROR),
        };
        let data = json!({
            "heading": "Popular Animes",
            "items": items.unwrap_or_default().iter().map(card).collect::<Vec<_>>(),
            "error": error,
        });
        self.page("popular", &data, chrome, meta, None)
    }

    pub fn categories(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        genres: &[FilterOption],
    ) -> Result<String, RenderError> {
        self.page("categories", &json!({ "genres": genres }), chrome, meta, None)
    }

    /// Anime detail page with its episode list and JSON-LD
    pub fn detail(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        anime: &AnimeDetails,
        ads: Option<&AdConfig>,
    ) -> Result<String, RenderError> {
        let data = json!({
            "anime": {
                "title": anime.title,
                "slug": anime.slug,
                "cover_image": anime.cover_image,
                "description": anime.description,
                "status": anime.status,
                "release_year": anime.release_year,
                "genres": anime.genres,
                "media_type": anime.media_type,
                "alternative_name": anime.alternative_name,
            },
            "first_episode": anime.episodes.first().map(|ep| ep.slug.as_str()),
            "episodes": episode_links(anime, None),
            "sidebar": placement(ads, Placement::Sidebar),
        });
        self.page("detail", &data, chrome, meta, json_ld(anime.seo.as_ref()))
    }

    /// Watch page: gate in front of the player, episode navigation below
    pub fn watch(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        page: &WatchPage<'_>,
        ads: Option<&AdConfig>,
    ) -> Result<String, RenderError> {
        let anime = page.anime;
        let index = page.episode_index;
        let Some(episode) = anime.episodes.get(index) else {
            return self.message(chrome, meta, "Episode Not Found", "This episode does not exist.");
        };

        let gate = match page.gate.view() {
            GateView::Ad { script, remaining } => json!({ "script": script, "remaining": remaining }),
            GateView::Content => Value::Null,
        };

        let data = json!({
            "heading": episode_heading(index, episode.display_name()),
            "anime_slug": anime.slug,
            "anime_title": anime.title,
            "gate": gate,
            "player": player(page.switcher),
            "prev": index.checked_sub(1).and_then(|i| anime.episodes.get(i)).map(|ep| ep.slug.as_str()),
            "next": anime.episodes.get(index + 1).map(|ep| ep.slug.as_str()),
            "episodes": episode_links(anime, Some(index)),
            "sidebar": placement(ads, Placement::Sidebar),
        });
        self.page("watch", &data, chrome, meta, None)
    }

    /// Generic message page (not found, failures)
    pub fn message(
        &self,
        chrome: &Chrome,
        meta: &PageMeta,
        heading: &str,
        message: &str,
    ) -> Result<String, RenderError> {
        let data = json!({ "heading": heading, "message": message });
        self.page("message", &data, chrome, meta, None)
    }
}

fn placement(ads: Option<&AdConfig>, placement: Placement) -> Option<&str> {
    ads.and_then(|a| a.script(placement))
}

fn card(item: &CatalogItem) -> Value {
    json!({
        "ad": false,
        "key": item.render_key(),
        "slug": item.slug,
        "title": item.title,
        "cover_image": item.cover_image,
        "media_type": item.media_type,
    })
}

/// Watch-page heading, e.g. `E3 - The Return`
pub fn episode_heading(index: usize, name: &str) -> String {
    format!("E{} - {}", index + 1, name)
}

fn episode_links(anime: &AnimeDetails, current: Option<usize>) -> Vec<Value> {
    anime
        .episodes
        .iter()
        .enumerate()
        .map(|(i, ep)| {
            json!({
                "slug": ep.slug,
                "label": format!("Episode {}: {}", i + 1, ep.name),
                "current": current == Some(i),
            })
        })
        .collect()
}

fn player(switcher: &SourceSwitcher) -> Value {
    match switcher.view() {
        PlayerView::Embed {
            active,
            active_index,
            servers,
            show_selector,
        } => json!({
            "embed": active.url,
            "show_selector": show_selector,
            "servers": servers
                .iter()
                .enumerate()
                .map(|(index, server)| json!({
                    "index": index,
                    "name": server.name,
                    "embed": server.url,
                    "active": index == active_index,
                }))
                .collect::<Vec<_>>(),
        }),
        PlayerView::NotFound => json!({ "not_found": SOURCE_NOT_FOUND }),
    }
}

/// Filter pairs other than the order, kept across order changes
fn hidden_filters(filters: &FilterState) -> Vec<Value> {
    filters
        .query_pairs()
        .into_iter()
        .filter(|(key, _)| *key != "orderby")
        .map(|(name, value)| json!({ "name": name, "value": value }))
        .collect()
}

/// Query suffix appended by the grid script to `/api/catalog?page=N`
fn catalog_query(filters: &FilterState) -> String {
    filters
        .query_pairs()
        .into_iter()
        .map(|(key, value)| format!("&{}={}", key, urlencoding::encode(&value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogPage, EpisodeRef, Server};
    use scraper::{Html, Selector};

    fn views() -> Views {
        Views::new().unwrap()
    }

    fn chrome() -> Chrome {
        Chrome::new("GogoSugoi", None)
    }

    fn meta() -> PageMeta {
        PageMeta::simple("Test - GogoSugoi", None, None)
    }

    fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
        let selector = Selector::parse(css).unwrap();
        doc.select(&selector).collect()
    }

    fn items(n: usize) -> Vec<CatalogItem> {
        (0..n)
            .map(|i| CatalogItem {
                id: i as u64,
                title: format!("Anime {}", i),
                slug: format!("anime-{}", i),
                cover_image: Some(format!("https://img/{}.jpg", i)),
                media_type: Some("TV".to_string()),
            })
            .collect()
    }

    fn ads(json: Value) -> AdConfig {
        serde_json::from_value(json).unwrap()
    }

    fn anime(episodes: Vec<EpisodeRef>) -> AnimeDetails {
        AnimeDetails {
            id: 1,
            title: "Naruto".to_string(),
            slug: "naruto".to_string(),
            cover_image: None,
            description: "<p>Ninja story</p>".to_string(),
            status: Some("Completed".to_string()),
            release_year: Some("2002".to_string()),
            genres: vec!["Action".to_string()],
            media_type: "TV".to_string(),
            alternative_name: String::new(),
            episodes,
            seo: None,
        }
    }

    fn episode(n: u64, servers: &[(&str, &str)]) -> EpisodeRef {
        EpisodeRef {
            id: n,
            name: format!("Episode {}", n),
            extended_name: String::new(),
            slug: format!("naruto-{}", n),
            release_date: String::new(),
            volume: None,
            servers: servers
                .iter()
                .map(|(name, url)| Server {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_templates_register() {
        assert!(Views::new().is_ok());
    }

    #[test]
    fn test_layout_chrome_reads_ad_config() {
        let config = ads(json!({
            "ativar_popunder": "on",
            "script_popunder": "<script>pop()</script>",
            "script_banner_footer": "<div id=\"footer-ad\"></div>",
            "url_direct_link": "https://sponsor.example"
        }));
        let html = views()
            .message(&Chrome::new("GogoSugoi", Some(&config)), &meta(), "Hi", "There")
            .unwrap();
        let doc = Html::parse_document(&html);

        assert_eq!(select(&doc, "#popunder-script").len(), 1);
        assert_eq!(select(&doc, "#footer-ad").len(), 1);
        let link = select(&doc, "a.direct-link");
        assert_eq!(link[0].value().attr("href"), Some("https://sponsor.example"));
        assert_eq!(select(&doc, "title")[0].inner_html(), "Test - GogoSugoi");
    }

    #[test]
    fn test_popunder_requires_switch() {
        let config = ads(json!({"ativar_popunder": "off", "script_popunder": "<script></script>"}));
        let html = views()
            .message(&Chrome::new("GogoSugoi", Some(&config)), &meta(), "Hi", "There")
            .unwrap();
        assert!(!html.contains("popunder-script"));
    }

    #[test]
    fn test_home_failure_message() {
        let html = views().home(&chrome(), &meta(), &[], None, None).unwrap();
        assert!(html.contains(HOME_LIST_ERROR));
    }

    #[test]
    fn test_grid_interleaves_native_ads() {
        let loader = CatalogLoader::from_first_page(
            FilterState::default(),
            Some(CatalogPage {
                items: items(24),
                current_page: 1,
                total_pages: 3,
            }),
        );
        let page = GridPage {
            heading: "Series",
            description: None,
            path: "/series",
            sortable: true,
            loader: &loader,
        };
        let config = ads(json!({"script_banner_nativo": "<div class=\"native\"></div>"}));
        let html = views().grid(&chrome(), &meta(), &page, Some(&config)).unwrap();
        let doc = Html::parse_document(&html);

        assert_eq!(select(&doc, "#catalog-grid > a.card").len(), 24);
        assert_eq!(select(&doc, "#catalog-grid > .ad-native").len(), 2);
        let grid = &select(&doc, "#catalog-grid")[0];
        assert_eq!(grid.value().attr("data-next-page"), Some("2"));
        assert_eq!(grid.value().attr("data-has-more"), Some("true"));
        assert_eq!(grid.value().attr("data-query"), Some("&orderby=date"));
    }

    #[test]
    fn test_grid_without_native_script_has_no_slots() {
        let loader = CatalogLoader::from_first_page(
            FilterState::with_types(["movie"]),
            Some(CatalogPage {
                items: items(13),
                current_page: 1,
                total_pages: 1,
            }),
        );
        let page = GridPage {
            heading: "Movies",
            description: None,
            path: "/movies",
            sortable: true,
            loader: &loader,
        };
        let html = views().grid(&chrome(), &meta(), &page, None).unwrap();
        let doc = Html::parse_document(&html);

        assert!(select(&doc, ".ad-native").is_empty());
        let grid = &select(&doc, "#catalog-grid")[0];
        assert_eq!(grid.value().attr("data-has-more"), Some("false"));
        assert_eq!(grid.value().attr("data-query"), Some("&orderby=date&types=movie"));
        assert!(html.contains("You&#x27;ve reached the end!") || html.contains("You've reached the end!"));
    }

    #[test]
    fn test_empty_grid_text() {
        let loader = CatalogLoader::from_first_page(
            FilterState::default(),
            Some(CatalogPage {
                items: Vec::new(),
                current_page: 1,
                total_pages: 0,
            }),
        );
        let page = GridPage {
            heading: "Series",
            description: None,
            path: "/series",
            sortable: true,
            loader: &loader,
        };
        let html = views().grid(&chrome(), &meta(), &page, None).unwrap();
        assert!(html.contains(EMPTY_GRID_TEXT));
        assert!(!html.contains("catalog-grid"));
    }

    #[test]
    fn test_detail_without_episodes() {
        let html = views().detail(&chrome(), &meta(), &anime(Vec::new()), None).unwrap();
        assert!(html.contains("NO EPISODES"));
        assert!(!html.contains("START WATCHING"));
        assert!(html.contains("No episodes available"));
    }

    #[test]
    fn test_detail_links_first_episode() {
        let show = anime(vec![episode(1, &[]), episode(2, &[])]);
        let html = views().detail(&chrome(), &meta(), &show, None).unwrap();
        let doc = Html::parse_document(&html);

        let button = &select(&doc, "a.watch-button")[0];
        assert_eq!(button.value().attr("href"), Some("/watch/naruto/naruto-1"));
        assert_eq!(button.inner_html(), "START WATCHING E1");
        let labels: Vec<String> = select(&doc, ".episodes li a").iter().map(|a| a.inner_html()).collect();
        assert_eq!(labels, vec!["Episode 1: Episode 1", "Episode 2: Episode 2"]);
    }

    #[test]
    fn test_watch_with_gate_wraps_player_in_template() {
        let show = anime(vec![
            episode(1, &[("HD", "<iframe src=\"https://a\"></iframe>")]),
            episode(2, &[("HD", "<iframe src=\"https://b\"></iframe>"), ("SD", "<iframe src=\"https://c\"></iframe>")]),
        ]);
        let gate = AdGate::new(Some("<div id=\"gate-ad\"></div>"), 5);
        let switcher = SourceSwitcher::new(&show.episodes[1], None);
        let page = WatchPage {
            anime: &show,
            episode_index: 1,
            gate: &gate,
            switcher: &switcher,
        };
        let html = views().watch(&chrome(), &meta(), &page, None).unwrap();
        let doc = Html::parse_document(&html);

        assert_eq!(select(&doc, "#gate-ad").len(), 1);
        assert_eq!(select(&doc, "#ad-gate-countdown")[0].inner_html(), "5");
        assert_eq!(select(&doc, "template#player-template").len(), 1);
        assert_eq!(select(&doc, "h1")[0].inner_html(), "E2 - Episode 2");
        assert_eq!(select(&doc, "a.prev")[0].value().attr("href"), Some("/watch/naruto/naruto-1"));
        assert!(select(&doc, "a.next").is_empty());
    }

    #[test]
    fn test_watch_without_gate_shows_player_and_selector() {
        let show = anime(vec![episode(
            1,
            &[("HD", "<iframe src=\"https://a\"></iframe>"), ("SD", "<iframe src=\"https://b\"></iframe>")],
        )]);
        let gate = AdGate::new(None, 5);
        let switcher = SourceSwitcher::new(&show.episodes[0], None);
        let page = WatchPage {
            anime: &show,
            episode_index: 0,
            gate: &gate,
            switcher: &switcher,
        };
        let html = views().watch(&chrome(), &meta(), &page, None).unwrap();
        let doc = Html::parse_document(&html);

        assert!(select(&doc, "#ad-gate").is_empty());
        assert_eq!(select(&doc, "#player iframe").len(), 1);
        assert_eq!(select(&doc, "a.server").len(), 2);
        assert_eq!(select(&doc, "a.server.active")[0].inner_html(), "HD");
    }

    #[test]
    fn test_watch_without_servers() {
        let show = anime(vec![episode(1, &[])]);
        let gate = AdGate::new(None, 0);
        let switcher = SourceSwitcher::new(&show.episodes[0], None);
        let page = WatchPage {
            anime: &show,
            episode_index: 0,
            gate: &gate,
            switcher: &switcher,
        };
        let html = views().watch(&chrome(), &meta(), &page, None).unwrap();
        assert!(html.contains(SOURCE_NOT_FOUND));
        assert!(!html.contains("class=\"servers\""));
    }

    #[test]
    fn test_layout_renders_search_box() {
        let html = views().message(&chrome(), &meta(), "Hi", "There").unwrap();
        let doc = Html::parse_document(&html);

        assert_eq!(select(&doc, "#search-open").len(), 1);
        assert_eq!(select(&doc, "input#search-input").len(), 1);
        assert_eq!(select(&doc, "#search-results").len(), 1);
        let overlay = &select(&doc, "#search-overlay")[0];
        assert_eq!(overlay.value().attr("data-delay"), Some("400"));
        assert_eq!(overlay.value().attr("data-min-length"), Some("3"));
        assert!(html.contains("/api/search?q="));
    }

    #[test]
    fn test_fixed_order_grid_hides_order_form() {
        let loader = CatalogLoader::from_first_page(
            FilterState::default(),
            Some(CatalogPage {
                items: items(3),
                current_page: 1,
                total_pages: 1,
            }),
        );
        let page = GridPage {
            heading: "New Releases",
            description: None,
            path: "/new",
            sortable: false,
            loader: &loader,
        };
        let html = views().grid(&chrome(), &meta(), &page, None).unwrap();
        let doc = Html::parse_document(&html);

        assert!(select(&doc, "form.filters").is_empty());
        assert_eq!(select(&doc, "#catalog-grid > a.card").len(), 3);
    }

    #[test]
    fn test_detail_json_ld() {
        let mut show = anime(Vec::new());
        show.seo = Some(
            serde_json::from_value(json!({"schema": {"@graph": [{"@type": "TVSeries"}]}})).unwrap(),
        );
        let html = views().detail(&chrome(), &meta(), &show, None).unwrap();
        let doc = Html::parse_document(&html);
        let scripts = select(&doc, "script[type=\"application/ld+json\"]");
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].inner_html().contains("TVSeries"));
    }
}
