//! sitemap.xml and robots.txt

use std::fmt::Write;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use tracing::info;

use crate::constants::site::{ANIME_PRIORITY, STATIC_ROUTES};
use crate::models::SitemapEntry;

use super::AppState;

/// One `<url>` element
struct UrlEntry<'a> {
    loc: String,
    lastmod: &'a str,
    changefreq: &'static str,
    priority: f32,
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Builds the sitemap document for the static routes and the given anime entries
pub fn build_sitemap(site_url: &str, entries: &[SitemapEntry], today: &str) -> String {
    let statics = STATIC_ROUTES.iter().map(|(path, priority)| UrlEntry {
        loc: format!("{}{}", site_url, path),
        lastmod: today,
        changefreq: "daily",
        priority: *priority,
    });
    let animes = entries.iter().map(|entry| UrlEntry {
        loc: format!("{}/anime/{}", site_url, entry.slug),
        lastmod: if entry.last_modified.is_empty() {
            today
        } else {
            &entry.last_modified
        },
        changefreq: "weekly",
        priority: ANIME_PRIORITY,
    });

    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in statics.chain(animes) {
        // Writing to a String cannot fail
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <changefreq>{}</changefreq>\n    <priority>{:.1}</priority>\n  </url>\n",
            escape_xml(&url.loc),
            escape_xml(url.lastmod),
            url.changefreq,
            url.priority
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

/// robots.txt body
pub fn build_robots(site_url: &str) -> String {
    format!("User-agent: *\nAllow: /\n\nSitemap: {}/sitemap.xml\n", site_url)
}

/// GET /sitemap.xml
pub async fn sitemap(data: web::Data<AppState>) -> HttpResponse {
    let entries = data.client.sitemap_feed().await;
    info!("Building sitemap with {} anime entries", entries.len());

    let today = Utc::now().to_rfc3339();
    HttpResponse::Ok()
        .content_type("application/xml; charset=utf-8")
        .body(build_sitemap(&data.config.site_url, &entries, &today))
}

/// GET /robots.txt
pub async fn robots(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body(build_robots(&data.config.site_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SITE: &str = "https://site.example";

    #[test]
    fn test_static_routes_priorities() {
        let xml = build_sitemap(SITE, &[], "2024-01-01");
        assert!(xml.contains("<loc>https://site.example/</loc>"));
        assert!(xml.contains("<loc>https://site.example/series</loc>\n    <lastmod>2024-01-01</lastmod>\n    <changefreq>daily</changefreq>\n    <priority>0.9</priority>"));
        assert!(xml.contains("<loc>https://site.example/categories</loc>\n    <lastmod>2024-01-01</lastmod>\n    <changefreq>daily</changefreq>\n    <priority>0.5</priority>"));
        assert_eq!(xml.matches("<url>").count(), STATIC_ROUTES.len());
    }

    #[test]
    fn test_anime_entries() {
        let entries = vec![
            SitemapEntry {
                slug: "naruto".to_string(),
                last_modified: "2023-05-01T10:00:00".to_string(),
            },
            SitemapEntry {
                slug: "tom&jerry".to_string(),
                last_modified: String::new(),
            },
        ];
        let xml = build_sitemap(SITE, &entries, "2024-01-01");
        assert!(xml.contains("<loc>https://site.example/anime/naruto</loc>\n    <lastmod>2023-05-01T10:00:00</lastmod>\n    <changefreq>weekly</changefreq>\n    <priority>0.8</priority>"));
        assert!(xml.contains("<loc>https://site.example/anime/tom&amp;jerry</loc>\n    <lastmod>2024-01-01</lastmod>"));
        assert_eq!(xml.matches("<url>").count(), STATIC_ROUTES.len() + 2);
    }

    #[test]
    fn test_robots() {
        let robots = build_robots(SITE);
        assert!(robots.starts_with("User-agent: *\nAllow: /"));
        assert!(robots.contains("Sitemap: https://site.example/sitemap.xml"));
    }
}
