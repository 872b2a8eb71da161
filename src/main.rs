//! Anime Catalog Server
//!
//! Main entry point for the anime catalog web front-end.

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use anime_catalog::client::ContentClient;
use anime_catalog::config::Config;
use anime_catalog::routes::{configure_routes, ApiDoc, AppState};
use anime_catalog::views::Views;

/// Health check endpoint
async fn health_check(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "upstream": if data.client.is_configured() { "configured" } else { "missing" },
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    let bind_address = config.bind_address();

    let client = ContentClient::new(&config).map_err(|e| {
        error!("Failed to build HTTP client: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let views = Views::new().map_err(|e| {
        error!("Failed to load templates: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    let app_state = web::Data::new(AppState {
        client,
        views,
        config: config.clone(),
    });

    info!("Starting {} on {}", config.site_name, bind_address);

    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(health_check))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
