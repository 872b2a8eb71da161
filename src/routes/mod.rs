//! HTTP routes for the anime catalog
//!
//! HTML pages are served from the site root, the JSON endpoints the browser
//! uses for paging and search live under `/api`.

pub mod api;
pub mod pages;
pub mod sitemap;

use actix_web::web;
use utoipa::OpenApi;

use crate::client::ContentClient;
use crate::config::Config;
use crate::models::{ApiError, CatalogItem, CatalogPageResponse, FilterOption, OrderBy, Taxonomy};
use crate::views::Views;

/// Application state shared across handlers
pub struct AppState {
    pub client: ContentClient,
    pub views: Views,
    pub config: Config,
}

/// OpenAPI documentation for the JSON endpoints
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Anime Catalog API",
        version = "0.1.0",
        description = "JSON endpoints behind the catalog's infinite scroll, search box and filter menus"
    ),
    paths(api::get_catalog, api::search, api::get_filters),
    components(
        schemas(
            CatalogItem,
            CatalogPageResponse,
            FilterOption,
            OrderBy,
            Taxonomy,
            ApiError,
            api::CatalogQuery,
            api::SearchQuery
        )
    ),
    tags(
        (name = "catalog", description = "Catalog paging, search and filter vocabularies")
    )
)]
pub struct ApiDoc;

/// Configure all routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(api::query_config())
            .route("/catalog", web::get().to(api::get_catalog))
            .route("/search", web::get().to(api::search))
            .route("/filters/{taxonomy}", web::get().to(api::get_filters))
            .default_service(web::to(api::not_found)),
    )
    .route("/", web::get().to(pages::home))
    .route("/series", web::get().to(pages::series))
    .route("/movies", web::get().to(pages::movies))
    .route("/new", web::get().to(pages::new_releases))
    .route("/popular", web::get().to(pages::popular))
    .route("/categories", web::get().to(pages::categories))
    .route("/anime/{slug}", web::get().to(pages::anime_detail))
    .route("/watch/{tail:.*}", web::get().to(pages::watch))
    .route("/sitemap.xml", web::get().to(sitemap::sitemap))
    .route("/robots.txt", web::get().to(sitemap::robots))
    .default_service(web::to(pages::not_found));
}
