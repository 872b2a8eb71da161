//! JSON endpoints used by the browser for infinite scroll, search and filter menus

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::constants::MIN_SEARCH_LEN;
use crate::error::{AppError, AppResult};
use crate::models::{
    ApiError, ApiResponse, CatalogItem, CatalogPageResponse, FilterOption, FilterState, Taxonomy,
};

use super::AppState;

/// Query parameters for a catalog page
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct CatalogQuery {
    /// Page number (1-indexed, default 1)
    pub page: Option<u32>,
    /// Comma-separated genre slugs
    pub genres: Option<String>,
    /// Comma-separated type slugs
    pub types: Option<String>,
    /// Comma-separated status slugs
    pub statuses: Option<String>,
    /// Comma-separated studio slugs
    pub studios: Option<String>,
    /// Sort order: `date` or `title`
    pub orderby: Option<String>,
}

impl CatalogQuery {
    fn filters(&self) -> FilterState {
        FilterState::from_lists(
            self.genres.as_deref(),
            self.types.as_deref(),
            self.statuses.as_deref(),
            self.studios.as_deref(),
            self.orderby.as_deref(),
        )
    }
}

/// Query parameters for search
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SearchQuery {
    /// Search query string (at least 3 characters after trimming); missing means empty
    pub q: Option<String>,
}

/// Query string parsing for `/api`: malformed input becomes a JSON 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        warn!("Rejected API query string: {}", err);
        AppError::validation(err.to_string()).into()
    })
}

/// GET /api/catalog - One page of the filtered catalog
#[utoipa::path(
    get,
    path = "/api/catalog",
    tag = "catalog",
    params(CatalogQuery),
    responses(
        (status = 200, description = "Catalog page; empty with hasMore=false when unavailable", body = CatalogPageResponse)
    )
)]
pub async fn get_catalog(data: web::Data<AppState>, query: web::Query<CatalogQuery>) -> impl Responder {
    let page = query.page.unwrap_or(1).max(1);
    let filters = query.filters();
    info!("Catalog page {} with {:?}", page, filters);

    let result = data.client.catalog_page(page, &filters).await;
    HttpResponse::Ok().json(ApiResponse::new(CatalogPageResponse::from_page(page, result)))
}

/// GET /api/search - Search the catalog by title
#[utoipa::path(
    get,
    path = "/api/search",
    tag = "catalog",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching titles; empty for queries shorter than 3 characters", body = Vec<CatalogItem>),
        (status = 502, description = "Upstream search failed", body = ApiError)
    )
)]
pub async fn search(
    data: web::Data<AppState>,
    query: web::Query<SearchQuery>,
) -> AppResult<HttpResponse> {
    let q = query.q.as_deref().unwrap_or_default().trim();
    if q.chars().count() < MIN_SEARCH_LEN {
        return Ok(HttpResponse::Ok().json(ApiResponse::new(Vec::<CatalogItem>::new())));
    }

    info!("Searching for: {}", q);
    match data.client.search(q).await {
        Some(items) => Ok(HttpResponse::Ok().json(ApiResponse::new(items))),
        None => {
            warn!("Search failed for: {}", q);
            Err(AppError::upstream("search results"))
        }
    }
}

/// GET /api/filters/{taxonomy} - Options of a filter vocabulary
#[utoipa::path(
    get,
    path = "/api/filters/{taxonomy}",
    tag = "catalog",
    params(
        ("taxonomy" = String, Path, description = "anime_genre, anime_type, anime_status or anime_studio")
    ),
    responses(
        (status = 200, description = "Filter options; empty when unavailable", body = Vec<FilterOption>),
        (status = 400, description = "Unknown taxonomy", body = ApiError)
    )
)]
pub async fn get_filters(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let taxonomy: Taxonomy = path.parse().map_err(AppError::validation)?;
    let options = data.client.filter_options(taxonomy).await;
    Ok(HttpResponse::Ok().json(ApiResponse::new(options)))
}

/// Fallback for unknown `/api` paths
pub async fn not_found() -> AppResult<HttpResponse> {
    Err(AppError::not_found("No such endpoint"))
}
