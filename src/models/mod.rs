//! Data models for the anime catalog
//!
//! This module contains the wire contracts of the upstream content API
//! (catalog items, episodes, SEO bags, ad placements) and the JSON envelopes
//! served by the catalog's own `/api` routes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// A single anime entry as shown in grids and carousels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Upstream post ID
    pub id: u64,
    /// Display title
    pub title: String,
    /// URL slug (e.g., "naruto")
    pub slug: String,
    /// Cover image URL
    #[serde(default)]
    pub cover_image: Option<String>,
    /// Media type (TV, Movie, OVA, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl CatalogItem {
    /// Key used for rendered grid cells, unique within a page
    pub fn render_key(&self) -> String {
        format!("{}-{}", self.id, self.slug)
    }
}

/// Catalog item with the extra artwork used by the hero carousel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HeroItem {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub poster_image: Option<String>,
    #[serde(default)]
    pub logo_image: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// An alternate embed source for one episode
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Server {
    /// Server label shown on the selector button
    pub name: String,
    /// Embed markup (usually an iframe) or URL
    pub url: String,
}

/// A single episode of an anime
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpisodeRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "nameExtend", default)]
    pub extended_name: String,
    pub slug: String,
    #[serde(rename = "date", default)]
    pub release_date: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub volume: Option<String>,
    /// Ordered alternatives; the first one is the default selection
    #[serde(default)]
    pub servers: Vec<Server>,
}

impl EpisodeRef {
    /// Extended name when present, plain name otherwise
    pub fn display_name(&self) -> &str {
        if self.extended_name.trim().is_empty() {
            &self.name
        } else {
            &self.extended_name
        }
    }
}

/// Opaque SEO bag produced by the upstream SEO bridge
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeoData {
    /// Page metadata (title, description, og_* and twitter_* keys)
    #[serde(default)]
    pub meta: Map<String, Value>,
    /// Structured data (Schema.org / JSON-LD)
    #[serde(default)]
    pub schema: Map<String, Value>,
}

impl SeoData {
    /// String value of a meta key; non-string values count as absent
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// URL of the first image of an `og_image`-style array
    pub fn image_url(&self, key: &str) -> Option<&str> {
        self.meta
            .get(key)
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .and_then(|image| image.get("url"))
            .and_then(Value::as_str)
    }

    /// The `@graph` array of the structured data, if any
    pub fn schema_graph(&self) -> Option<&Vec<Value>> {
        self.schema.get("@graph").and_then(Value::as_array)
    }
}

/// Full anime record for the detail and watch pages
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimeDetails {
    pub id: u64,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub release_year: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(rename = "type", default)]
    pub media_type: String,
    #[serde(default)]
    pub alternative_name: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
    /// Filled from the separate SEO fetch; absent when that fetch fails
    #[serde(skip_deserializing, default)]
    pub seo: Option<SeoData>,
}

impl AnimeDetails {
    /// Position of an episode by slug
    pub fn episode_index(&self, episode_slug: &str) -> Option<usize> {
        self.episodes.iter().position(|ep| ep.slug == episode_slug)
    }
}

/// One page of the paginated catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPage {
    #[serde(rename = "animes", default)]
    pub items: Vec<CatalogItem>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl CatalogPage {
    /// Whether no further page exists after this one
    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

/// Sort order accepted by the catalog endpoint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Date,
    Title,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Date => "date",
            OrderBy::Title => "title",
        }
    }
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date" => Ok(OrderBy::Date),
            "title" => Ok(OrderBy::Title),
            other => Err(format!("unknown order: {}", other)),
        }
    }
}

/// Active grid filters. Compared by value; any change restarts pagination.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub genres: BTreeSet<String>,
    #[serde(default)]
    pub types: BTreeSet<String>,
    #[serde(default)]
    pub statuses: BTreeSet<String>,
    #[serde(default)]
    pub studios: BTreeSet<String>,
    #[serde(default)]
    pub order_by: OrderBy,
}

impl FilterState {
    /// Filter preset restricted to the given media types
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Builds a filter state from comma-separated lists as found in query strings
    pub fn from_lists(
        genres: Option<&str>,
        types: Option<&str>,
        statuses: Option<&str>,
        studios: Option<&str>,
        order_by: Option<&str>,
    ) -> Self {
        Self {
            genres: parse_list(genres),
            types: parse_list(types),
            statuses: parse_list(statuses),
            studios: parse_list(studios),
            order_by: order_by
                .and_then(|o| o.parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Query parameters for the upstream catalog endpoint; empty sets are omitted
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("orderby", self.order_by.as_str().to_string())];
        for (key, set) in [
            ("genres", &self.genres),
            ("types", &self.types),
            ("statuses", &self.statuses),
            ("studios", &self.studios),
        ] {
            if !set.is_empty() {
                pairs.push((key, join_list(set)));
            }
        }
        pairs
    }
}

fn parse_list(raw: Option<&str>) -> BTreeSet<String> {
    raw.unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_list(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

/// Filter vocabularies exposed by the upstream API
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum Taxonomy {
    #[serde(rename = "anime_genre")]
    Genre,
    #[serde(rename = "anime_type")]
    Type,
    #[serde(rename = "anime_status")]
    Status,
    #[serde(rename = "anime_studio")]
    Studio,
}

impl Taxonomy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::Genre => "anime_genre",
            Taxonomy::Type => "anime_type",
            Taxonomy::Status => "anime_status",
            Taxonomy::Studio => "anime_studio",
        }
    }
}

impl fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Taxonomy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "anime_genre" => Ok(Taxonomy::Genre),
            "anime_type" => Ok(Taxonomy::Type),
            "anime_status" => Ok(Taxonomy::Status),
            "anime_studio" => Ok(Taxonomy::Studio),
            other => Err(format!("unknown taxonomy: {}", other)),
        }
    }
}

/// A selectable option of a filter vocabulary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct FilterOption {
    pub name: String,
    pub slug: String,
}

/// Sitemap feed entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SitemapEntry {
    pub slug: String,
    #[serde(default)]
    pub last_modified: String,
}

/// Named slot where a sponsor script may be injected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Popunder,
    PlayerLoading,
    Sidebar,
    LeaderboardDesktop,
    LeaderboardMobile,
    Native,
    Footer,
}

/// Ad placement configuration as published by the upstream monetization plugin.
///
/// Every field is optional; an absent (or blank) script means the placement is
/// not rendered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdConfig {
    #[serde(rename = "ativar_popunder", default)]
    pub popunder_switch: Option<String>,
    #[serde(rename = "script_popunder", default)]
    pub popunder: Option<String>,
    #[serde(rename = "script_banner_player_loading", default)]
    pub player_loading: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub player_loading_time: Option<String>,
    #[serde(rename = "script_banner_sidebar", default)]
    pub sidebar: Option<String>,
    #[serde(rename = "script_banner_leaderboard_desktop", default)]
    pub leaderboard_desktop: Option<String>,
    #[serde(rename = "script_banner_leaderboard_mobile", default)]
    pub leaderboard_mobile: Option<String>,
    #[serde(rename = "script_banner_nativo", default)]
    pub native: Option<String>,
    #[serde(rename = "script_banner_footer", default)]
    pub footer: Option<String>,
    #[serde(rename = "url_direct_link", default)]
    pub direct_link: Option<String>,
}

impl AdConfig {
    /// Script for a placement, `None` when not configured.
    ///
    /// The popunder additionally requires its master switch to be `on`.
    pub fn script(&self, placement: Placement) -> Option<&str> {
        let raw = match placement {
            Placement::Popunder => {
                if self.popunder_switch.as_deref() != Some("on") {
                    return None;
                }
                &self.popunder
            }
            Placement::PlayerLoading => &self.player_loading,
            Placement::Sidebar => &self.sidebar,
            Placement::LeaderboardDesktop => &self.leaderboard_desktop,
            Placement::LeaderboardMobile => &self.leaderboard_mobile,
            Placement::Native => &self.native,
            Placement::Footer => &self.footer,
        };
        non_blank(raw)
    }

    pub fn direct_link(&self) -> Option<&str> {
        non_blank(&self.direct_link)
    }

    /// Player-gate countdown in seconds, defaulting when absent or unparsable
    pub fn loading_time_seconds(&self) -> u32 {
        self.player_loading_time
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(crate::constants::DEFAULT_PLAYER_LOADING_SECS)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Accepts `"5"`, `5` or `null` for fields the upstream sends inconsistently
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Whether the operation was successful (always true for this type)
    pub success: bool,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was produced
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Whether the operation was successful (always false for errors)
    pub success: bool,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Page of the catalog as served to the browser's infinite scroll
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPageResponse {
    /// Items of the requested page
    pub items: Vec<CatalogItem>,
    /// Page that was served
    pub current_page: u32,
    /// Total number of pages upstream
    pub total_pages: u32,
    /// Whether another page can be requested
    pub has_more: bool,
}

impl CatalogPageResponse {
    /// Response for a fetched page; `None` collapses to an exhausted empty page
    pub fn from_page(requested: u32, page: Option<CatalogPage>) -> Self {
        match page {
            Some(page) if !page.items.is_empty() => Self {
                has_more: !page.is_last(),
                current_page: page.current_page,
                total_pages: page.total_pages,
                items: page.items,
            },
            _ => Self {
                items: Vec::new(),
                current_page: requested,
                total_pages: requested,
                has_more: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_item_deserialization() {
        let json = r#"{"id": 7, "title": "Naruto", "slug": "naruto", "coverImage": null, "type": "TV"}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, 7);
        assert_eq!(item.cover_image, None);
        assert_eq!(item.media_type.as_deref(), Some("TV"));
        assert_eq!(item.render_key(), "7-naruto");
    }

    #[test]
    fn test_catalog_item_without_type() {
        let json = r#"{"id": 1, "title": "A", "slug": "a"}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert!(item.media_type.is_none());

        let out = serde_json::to_string(&item).unwrap();
        assert!(!out.contains("\"type\""));
        assert!(out.contains("\"coverImage\":null"));
    }

    #[test]
    fn test_catalog_page_uses_animes_key() {
        let json = r#"{"animes": [{"id": 1, "title": "A", "slug": "a"}], "currentPage": 1, "totalPages": 2}"#;
        let page: CatalogPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 1);
        assert!(!page.is_last());
    }

    #[test]
    fn test_episode_display_name() {
        let json = r#"{"id": 3, "name": "Episode 1", "nameExtend": "", "slug": "naruto-1",
            "date": "2024-01-01", "volume": 1, "servers": [{"name": "HD", "url": "<iframe></iframe>"}]}"#;
        let episode: EpisodeRef = serde_json::from_str(json).unwrap();
        assert_eq!(episode.display_name(), "Episode 1");
        assert_eq!(episode.volume.as_deref(), Some("1"));
        assert_eq!(episode.servers.len(), 1);

        let extended = EpisodeRef {
            extended_name: "The Beginning".to_string(),
            ..episode
        };
        assert_eq!(extended.display_name(), "The Beginning");
    }

    #[test]
    fn test_anime_details_ignores_inline_seo() {
        let json = r#"{"id": 1, "title": "Naruto", "slug": "naruto", "episodes": [],
            "seo": {"meta": {"title": "x"}}}"#;
        let details: AnimeDetails = serde_json::from_str(json).unwrap();
        assert!(details.seo.is_none());
        assert!(details.genres.is_empty());
    }

    #[test]
    fn test_seo_helpers() {
        let json = r#"{
            "meta": {"title": "Naruto - Site", "description": 42,
                     "og_image": [{"url": "https://img/cover.jpg", "width": 10}]},
            "schema": {"@graph": [{"@type": "WebPage"}]}
        }"#;
        let seo: SeoData = serde_json::from_str(json).unwrap();
        assert_eq!(seo.meta_str("title"), Some("Naruto - Site"));
        assert_eq!(seo.meta_str("description"), None);
        assert_eq!(seo.image_url("og_image"), Some("https://img/cover.jpg"));
        assert_eq!(seo.image_url("twitter_image"), None);
        assert_eq!(seo.schema_graph().map(Vec::len), Some(1));
    }

    #[test]
    fn test_filter_state_query_pairs() {
        let filters = FilterState::from_lists(Some("action, comedy"), Some("movie"), None, Some(""), Some("title"));
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("orderby", "title".to_string()),
                ("genres", "action,comedy".to_string()),
                ("types", "movie".to_string()),
            ]
        );
    }

    #[test]
    fn test_filter_state_equality_by_value() {
        let a = FilterState::with_types(["movie", "tv"]);
        let b = FilterState::from_lists(None, Some("tv,movie"), None, None, Some("date"));
        assert_eq!(a, b);
        assert_ne!(a, FilterState::default());
    }

    #[test]
    fn test_unknown_order_defaults_to_date() {
        let filters = FilterState::from_lists(None, None, None, None, Some("popular"));
        assert_eq!(filters.order_by, OrderBy::Date);
    }

    #[test]
    fn test_taxonomy_round_trip_names() {
        assert_eq!("anime_studio".parse::<Taxonomy>(), Ok(Taxonomy::Studio));
        assert!("genre".parse::<Taxonomy>().is_err());
        assert_eq!(Taxonomy::Genre.to_string(), "anime_genre");
    }

    #[test]
    fn test_ad_config_placements() {
        let json = r#"{
            "ativar_popunder": "off",
            "script_popunder": "<script>pop()</script>",
            "script_banner_player_loading": "<script>gate()</script>",
            "player_loading_time": "8",
            "script_banner_sidebar": "  ",
            "script_banner_nativo": "<script>native()</script>"
        }"#;
        let ads: AdConfig = serde_json::from_str(json).unwrap();
        assert_eq!(ads.script(Placement::Popunder), None);
        assert_eq!(ads.script(Placement::PlayerLoading), Some("<script>gate()</script>"));
        assert_eq!(ads.script(Placement::Sidebar), None);
        assert_eq!(ads.script(Placement::Footer), None);
        assert_eq!(ads.loading_time_seconds(), 8);

        let enabled = AdConfig {
            popunder_switch: Some("on".to_string()),
            ..ads
        };
        assert_eq!(enabled.script(Placement::Popunder), Some("<script>pop()</script>"));
    }

    #[test]
    fn test_ad_config_loading_time_default() {
        let ads: AdConfig = serde_json::from_str(r#"{"player_loading_time": "soon"}"#).unwrap();
        assert_eq!(ads.loading_time_seconds(), 5);

        let ads: AdConfig = serde_json::from_str(r#"{"player_loading_time": 12}"#).unwrap();
        assert_eq!(ads.loading_time_seconds(), 12);
    }

    #[test]
    fn test_catalog_page_response_from_failed_page() {
        let response = CatalogPageResponse::from_page(3, None);
        assert!(response.items.is_empty());
        assert!(!response.has_more);
        assert_eq!(response.current_page, 3);
    }

    #[test]
    fn test_api_response_serialization() {
        let response = ApiResponse::new(vec!["item1", "item2"]);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"data\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("Something went wrong");

        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"error\":\"Something went wrong\""));
    }
}
