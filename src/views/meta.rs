//! Page metadata (title, description, Open Graph) with fallbacks

use serde::Serialize;
use serde_json::{json, Value};

use crate::models::{AnimeDetails, SeoData};

/// Maximum length of a generated description
const DESCRIPTION_LEN: usize = 155;

/// Head metadata of a rendered page
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    pub canonical: Option<String>,
    pub og_title: String,
    pub og_description: Option<String>,
    pub og_type: String,
    pub og_image: Option<String>,
    pub twitter_title: String,
    pub twitter_image: Option<String>,
}

impl PageMeta {
    /// Plain metadata for pages without an SEO bag
    pub fn simple(title: impl Into<String>, description: Option<String>, canonical: Option<String>) -> Self {
        let title = title.into();
        Self {
            og_title: title.clone(),
            twitter_title: title.clone(),
            og_description: description.clone(),
            og_type: "website".to_string(),
            title,
            description,
            canonical,
            ..Self::default()
        }
    }

    /// Metadata from an upstream SEO bag, each field falling back to `fallback`
    pub fn from_seo(seo: Option<&SeoData>, fallback: PageMeta) -> Self {
        let Some(seo) = seo else {
            return fallback;
        };
        let text = |key: &str| seo.meta_str(key).map(str::to_string);

        let title = text("title").unwrap_or(fallback.title);
        let description = text("description").or(fallback.description);
        let og_image = seo.image_url("og_image").map(str::to_string).or(fallback.og_image);

        Self {
            og_title: text("og_title").unwrap_or_else(|| title.clone()),
            og_description: text("og_description").or_else(|| description.clone()),
            og_type: text("og_type").unwrap_or(fallback.og_type),
            twitter_title: text("twitter_title").unwrap_or_else(|| title.clone()),
            twitter_image: text("twitter_image").or_else(|| og_image.clone()),
            canonical: text("canonical").or(fallback.canonical),
            og_image,
            title,
            description,
        }
    }

    /// Detail-page metadata for an anime
    pub fn for_anime(anime: &AnimeDetails, site_name: &str, site_url: &str) -> Self {
        let synopsis = plain_text(&anime.description);
        let description = if synopsis.is_empty() {
            format!("Watch episodes of {} online.", anime.title)
        } else {
            format!(
                "Watch episodes of {} online. Synopsis: {}",
                anime.title,
                truncate(&synopsis, DESCRIPTION_LEN)
            )
        };

        let mut fallback = Self::simple(
            format!("{} - {}", anime.title, site_name),
            Some(description),
            Some(format!("{}/anime/{}", site_url, anime.slug)),
        );
        fallback.og_type = "video.tv_show".to_string();
        fallback.og_image = anime.cover_image.clone();
        fallback.twitter_image = anime.cover_image.clone();

        Self::from_seo(anime.seo.as_ref(), fallback)
    }
}

/// JSON-LD script body for a page, from the `@graph` of an SEO bag.
///
/// `</` is escaped so the payload cannot close its script element.
pub fn json_ld(seo: Option<&SeoData>) -> Option<String> {
    let graph = seo?.schema_graph()?;
    let document: Value = json!({
        "@context": "https://schema.org",
        "@graph": graph,
    });
    serde_json::to_string(&document)
        .ok()
        .map(|s| s.replace("</", "<\\/"))
}

/// Text content of an HTML fragment, whitespace collapsed
pub fn plain_text(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => {
                in_tag = true;
                text.push(' ');
            }
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First `max` characters, with an ellipsis when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anime(description: &str, seo: Option<SeoData>) -> AnimeDetails {
        AnimeDetails {
            id: 1,
            title: "Naruto".to_string(),
            slug: "naruto".to_string(),
            cover_image: Some("https://img/naruto.jpg".to_string()),
            description: description.to_string(),
            status: None,
            release_year: None,
            genres: Vec::new(),
            media_type: "TV".to_string(),
            alternative_name: String::new(),
            episodes: Vec::new(),
            seo,
        }
    }

    #[test]
    fn test_plain_text_strips_tags() {
        assert_eq!(plain_text("<p>Hello <b>ninja</b></p>\n<p>world</p>"), "Hello ninja world");
        assert_eq!(plain_text("no tags"), "no tags");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[test]
    fn test_anime_fallback_meta() {
        let meta = PageMeta::for_anime(&anime("<p>A young ninja.</p>", None), "GogoSugoi", "https://site");
        assert_eq!(meta.title, "Naruto - GogoSugoi");
        assert_eq!(
            meta.description.as_deref(),
            Some("Watch episodes of Naruto online. Synopsis: A young ninja.")
        );
        assert_eq!(meta.canonical.as_deref(), Some("https://site/anime/naruto"));
        assert_eq!(meta.og_image.as_deref(), Some("https://img/naruto.jpg"));
        assert_eq!(meta.og_type, "video.tv_show");
    }

    #[test]
    fn test_seo_overrides_fallback() {
        let seo: SeoData = serde_json::from_value(json!({
            "meta": {
                "title": "Naruto Online",
                "og_image": [{"url": "https://img/og.jpg"}],
                "canonical": "https://cms/anime/naruto"
            }
        }))
        .unwrap();
        let meta = PageMeta::for_anime(&anime("", Some(seo)), "GogoSugoi", "https://site");
        assert_eq!(meta.title, "Naruto Online");
        assert_eq!(meta.og_title, "Naruto Online");
        assert_eq!(meta.og_image.as_deref(), Some("https://img/og.jpg"));
        assert_eq!(meta.twitter_image.as_deref(), Some("https://img/og.jpg"));
        assert_eq!(meta.canonical.as_deref(), Some("https://cms/anime/naruto"));
        assert_eq!(meta.description.as_deref(), Some("Watch episodes of Naruto online."));
    }

    #[test]
    fn test_json_ld_escapes_script_close() {
        let seo: SeoData = serde_json::from_value(json!({
            "schema": {"@graph": [{"@type": "WebPage", "name": "</script><script>x()"}]}
        }))
        .unwrap();
        let ld = json_ld(Some(&seo)).unwrap();
        assert!(ld.contains("\"@context\":\"https://schema.org\""));
        assert!(!ld.contains("</script>"));
        assert!(json_ld(None).is_none());
        assert!(json_ld(Some(&SeoData::default())).is_none());
    }
}
