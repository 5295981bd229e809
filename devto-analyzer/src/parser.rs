use crate::types::{Article, TagSource, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Tags arrive either as a JSON list or as one comma-joined string, and the
/// platform swaps which field carries which form between endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagsField {
    List(Vec<String>),
    Joined(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesKey {
    Number(i64),
    Text(String),
}

impl SeriesKey {
    fn normalized(&self) -> Option<String> {
        match self {
            SeriesKey::Number(n) => Some(n.to_string()),
            SeriesKey::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            SeriesKey::Text(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeriesMeta {
    Details {
        id: Option<SeriesKey>,
        title: Option<String>,
        name: Option<String>,
    },
    Title(String),
}

impl SeriesMeta {
    fn title(&self) -> Option<String> {
        let title = match self {
            SeriesMeta::Details { title, name, .. } => title.clone().or_else(|| name.clone()),
            SeriesMeta::Title(title) => Some(title.clone()),
        };
        title.filter(|t| !t.trim().is_empty())
    }

    fn key(&self) -> Option<String> {
        match self {
            SeriesMeta::Details { id: Some(id), .. } => id.normalized(),
            _ => None,
        }
    }
}

/// Article payload as returned by the list or detail endpoint. Every field is
/// optional; counts are read as floats so `3`, `3.0` and `null` all parse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub id: Option<u64>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
    pub published_timestamp: Option<String>,
    pub tags: Option<TagsField>,
    pub tag_list: Option<TagsField>,
    pub page_views_count: Option<f64>,
    pub public_reactions_count: Option<f64>,
    pub positive_reactions_count: Option<f64>,
    pub comments_count: Option<f64>,
    pub reading_time_minutes: Option<f64>,
    pub series_id: Option<SeriesKey>,
    pub collection_id: Option<SeriesKey>,
    pub series: Option<SeriesMeta>,
}

impl RawArticle {
    /// Lay a detail payload over the summary it was fetched for. Detail
    /// fields win; fields the detail lacks keep the summary's value.
    pub fn merge(summary: &RawArticle, detail: RawArticle) -> RawArticle {
        RawArticle {
            id: detail.id.or(summary.id),
            title: detail.title.or_else(|| summary.title.clone()),
            url: detail.url.or_else(|| summary.url.clone()),
            description: detail.description.or_else(|| summary.description.clone()),
            published_at: detail.published_at.or_else(|| summary.published_at.clone()),
            published_timestamp: detail.published_timestamp.or_else(|| summary.published_timestamp.clone()),
            tags: detail.tags.or_else(|| summary.tags.clone()),
            tag_list: detail.tag_list.or_else(|| summary.tag_list.clone()),
            page_views_count: detail.page_views_count.or(summary.page_views_count),
            public_reactions_count: detail.public_reactions_count.or(summary.public_reactions_count),
            positive_reactions_count: detail.positive_reactions_count.or(summary.positive_reactions_count),
            comments_count: detail.comments_count.or(summary.comments_count),
            reading_time_minutes: detail.reading_time_minutes.or(summary.reading_time_minutes),
            series_id: detail.series_id.or_else(|| summary.series_id.clone()),
            collection_id: detail.collection_id.or_else(|| summary.collection_id.clone()),
            series: detail.series.or_else(|| summary.series.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUserProfile {
    pub id: Option<u64>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub joined_at: Option<String>,
    pub profile_image: Option<String>,
}

impl RawUserProfile {
    pub fn into_profile(self, requested_username: &str) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.unwrap_or_else(|| requested_username.to_string()),
            name: self.name,
            summary: self.summary,
            location: self.location,
            joined_at: self.joined_at,
            profile_image: self.profile_image,
            follower_count: None,
        }
    }
}

/// Normalizes raw payloads into `Article`s. Repeated ids are left for the
/// store to resolve.
pub struct ArticleParser {
    synthesize_views: bool,
}

impl ArticleParser {
    pub fn new(synthesize_views: bool) -> Self {
        Self { synthesize_views }
    }

    pub fn parse_articles(&self, raw_articles: Vec<RawArticle>) -> Vec<Article> {
        let total = raw_articles.len();
        let articles: Vec<Article> = raw_articles
            .into_iter()
            .filter_map(|raw| self.parse_article(raw))
            .collect();

        info!("Normalized {} of {} article payloads", articles.len(), total);
        articles
    }

    pub fn parse_article(&self, raw: RawArticle) -> Option<Article> {
        let id = match raw.id {
            Some(id) => id,
            None => {
                warn!("Skipping article payload without an id: {:?}", raw.title);
                return None;
            }
        };

        let (tags, tags_source) = normalize_tags(&raw);

        let reactions = count(raw.public_reactions_count.or(raw.positive_reactions_count));
        let comments = count(raw.comments_count);

        let (page_views_count, views_synthetic) = match raw.page_views_count {
            Some(views) => (count(Some(views)), false),
            None if self.synthesize_views => (synthesize_views(reactions, comments), true),
            None => (0, false),
        };

        let published_at = raw
            .published_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| raw.published_timestamp.as_deref().and_then(parse_timestamp));

        // A nested series object may carry the key when the flat fields do not
        let series_id = raw
            .series_id
            .as_ref()
            .and_then(SeriesKey::normalized)
            .or_else(|| raw.collection_id.as_ref().and_then(SeriesKey::normalized))
            .or_else(|| raw.series.as_ref().and_then(SeriesMeta::key));
        let series_title = raw.series.as_ref().and_then(SeriesMeta::title);

        Some(Article {
            id,
            title: raw.title.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            description: raw.description.filter(|d| !d.trim().is_empty()),
            published_at,
            tags,
            tags_source,
            page_views_count,
            views_synthetic,
            public_reactions_count: reactions,
            comments_count: comments,
            reading_time_minutes: count(raw.reading_time_minutes),
            series_id,
            series_title,
        })
    }
}

/// Placeholder view count for posts the platform reports no views for.
///
/// A pure function of reactions and comments so repeated runs agree. Articles
/// carrying it are flagged `views_synthetic`; it is not a measurement.
pub fn synthesize_views(reactions: u64, comments: u64) -> u64 {
    let jitter = (reactions.wrapping_mul(31).wrapping_add(comments.wrapping_mul(17))) % 50;
    100u64
        .saturating_add(reactions.saturating_mul(20))
        .saturating_add(comments.saturating_mul(40))
        .saturating_add(jitter)
}

/// List forms win over joined strings; `tag_list` is checked before `tags`.
pub fn normalize_tags(raw: &RawArticle) -> (Vec<String>, TagSource) {
    let candidates = [
        (&raw.tag_list, TagSource::TagList),
        (&raw.tags, TagSource::Tags),
    ];

    let chosen = candidates
        .iter()
        .find(|(field, _)| matches!(field, Some(TagsField::List(_))))
        .or_else(|| candidates.iter().find(|(field, _)| field.is_some()));

    match chosen {
        Some((Some(field), source)) => (split_tags(field), *source),
        _ => (Vec::new(), TagSource::Missing),
    }
}

fn split_tags(field: &TagsField) -> Vec<String> {
    let pieces: Vec<&str> = match field {
        TagsField::List(list) => list.iter().map(String::as_str).collect(),
        TagsField::Joined(joined) => joined.split(',').collect(),
    };

    let mut seen = HashSet::new();
    pieces
        .into_iter()
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_string()))
        .map(str::to_string)
        .collect()
}

fn count(value: Option<f64>) -> u64 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v as u64,
        _ => 0,
    }
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            debug!("Unparsable timestamp {:?}: {}", value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joined_tags_are_split_and_deduplicated() {
        let raw = RawArticle {
            tags: Some(TagsField::Joined("rust, webdev,,rust ".to_string())),
            ..Default::default()
        };
        let (tags, source) = normalize_tags(&raw);
        assert_eq!(tags, vec!["rust", "webdev"]);
        assert_eq!(source, TagSource::Tags);
    }

    #[test]
    fn list_form_preferred_over_joined() {
        let raw = RawArticle {
            tags: Some(TagsField::Joined("a, b".to_string())),
            tag_list: Some(TagsField::List(vec!["x".to_string(), "y".to_string()])),
            ..Default::default()
        };
        let (tags, source) = normalize_tags(&raw);
        assert_eq!(tags, vec!["x", "y"]);
        assert_eq!(source, TagSource::TagList);
    }

    #[test]
    fn synthesized_views_are_deterministic() {
        assert_eq!(synthesize_views(0, 0), 100);
        assert_eq!(synthesize_views(10, 2), synthesize_views(10, 2));
        assert_eq!(synthesize_views(10, 2), 100 + 200 + 80 + (310 + 34) % 50);
    }

    #[test]
    fn untagged_payload_shapes_deserialize() {
        let raw: RawArticle = serde_json::from_str(
            r#"{
                "id": 9,
                "tags": ["rust", "cli"],
                "tag_list": "rust, cli",
                "series_id": "abc",
                "collection_id": 42,
                "series": "Rust Notes",
                "public_reactions_count": 3.0,
                "comments_count": null
            }"#,
        )
        .unwrap();

        assert_eq!(raw.tags, Some(TagsField::List(vec!["rust".to_string(), "cli".to_string()])));
        assert_eq!(raw.tag_list, Some(TagsField::Joined("rust, cli".to_string())));
        assert_eq!(raw.series_id, Some(SeriesKey::Text("abc".to_string())));
        assert_eq!(raw.collection_id, Some(SeriesKey::Number(42)));
        assert_eq!(raw.series, Some(SeriesMeta::Title("Rust Notes".to_string())));
        assert_eq!(raw.comments_count, None);

        let article = ArticleParser::new(true).parse_article(raw).unwrap();
        assert_eq!(article.series_id.as_deref(), Some("abc"));
        assert_eq!(article.series_title.as_deref(), Some("Rust Notes"));
        assert_eq!(article.public_reactions_count, 3);
        assert_eq!(article.comments_count, 0);
    }

    #[test]
    fn nested_series_object_supplies_key_and_title() {
        let raw: RawArticle =
            serde_json::from_str(r#"{"id": 1, "series": {"id": 77, "name": "Async in Practice"}}"#).unwrap();

        let article = ArticleParser::new(false).parse_article(raw).unwrap();
        assert_eq!(article.series_id.as_deref(), Some("77"));
        assert_eq!(article.series_title.as_deref(), Some("Async in Practice"));
    }

    #[test]
    fn blank_series_keys_are_ignored() {
        let raw = RawArticle {
            id: Some(1),
            series_id: Some(SeriesKey::Text("  ".to_string())),
            ..Default::default()
        };
        let article = ArticleParser::new(false).parse_article(raw).unwrap();
        assert_eq!(article.series_id, None);
    }

    #[test]
    fn bad_timestamp_is_treated_as_missing() {
        assert!(parse_timestamp("yesterday-ish").is_none());
        assert!(parse_timestamp("2024-03-05T14:30:00Z").is_some());
    }
}
