use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub use interfaces::defs::{CondensedReport, InsightGenerator, Insights, TopicIdea};

pub const DEFAULT_API_BASE: &str = "https://dev.to/api";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_pages: u32,
    pub per_page: u32,
    pub api_key: Option<String>,
    /// Fill in placeholder view counts when the platform omits them.
    pub synthesize_views: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            user_agent: "DevTo-Analyzer/1.0".to_string(),
            timeout_seconds: 30,
            max_pages: 5,
            per_page: 30,
            api_key: None,
            synthesize_views: true,
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `DEVTO_*` environment variables.
    ///
    /// Unparsable or out-of-range numeric values are ignored rather than
    /// rejected; `validate` catches values that parse but make no sense.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `DEVTO_*` name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base_url) = lookup("DEVTO_API_BASE") {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = lookup("DEVTO_API_KEY") {
            if !api_key.trim().is_empty() {
                config.api_key = Some(api_key);
            }
        }
        if let Some(max_pages) = parse_number(lookup("DEVTO_MAX_PAGES")) {
            config.max_pages = max_pages;
        }
        if let Some(per_page) = parse_number(lookup("DEVTO_PER_PAGE")) {
            config.per_page = per_page;
        }
        if let Some(timeout) = parse_number(lookup("DEVTO_TIMEOUT_SECONDS")) {
            config.timeout_seconds = timeout;
        }

        config
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            return Err(AnalyzerError::Validation("max_pages must be at least 1".to_string()));
        }
        if self.per_page == 0 || self.per_page > 1000 {
            return Err(AnalyzerError::Validation(format!(
                "per_page must be between 1 and 1000, got {}",
                self.per_page
            )));
        }
        url::Url::parse(&self.base_url)?;
        Ok(())
    }
}

/// Parses into the target width directly, so values that overflow it are dropped.
fn parse_number<T: FromStr>(value: Option<String>) -> Option<T> {
    value.and_then(|value| value.trim().parse::<T>().ok())
}

/// Which payload field supplied an article's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    Tags,
    TagList,
    Missing,
}

/// A normalized blog post. Every count is present; absent upstream values
/// have already been defaulted by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub tags_source: TagSource,
    pub page_views_count: u64,
    pub views_synthetic: bool,
    pub public_reactions_count: u64,
    pub comments_count: u64,
    pub reading_time_minutes: u64,
    pub series_id: Option<String>,
    pub series_title: Option<String>,
}

impl Article {
    pub fn new(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            url: String::new(),
            description: None,
            published_at: None,
            tags: Vec::new(),
            tags_source: TagSource::Missing,
            page_views_count: 0,
            views_synthetic: false,
            public_reactions_count: 0,
            comments_count: 0,
            reading_time_minutes: 0,
            series_id: None,
            series_title: None,
        }
    }

    pub fn with_counts(mut self, views: u64, reactions: u64, comments: u64) -> Self {
        self.page_views_count = views;
        self.public_reactions_count = reactions;
        self.comments_count = comments;
        self
    }

    pub fn with_reading_time(mut self, minutes: u64) -> Self {
        self.reading_time_minutes = minutes;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self.tags_source = TagSource::TagList;
        self
    }

    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    pub fn with_series(mut self, series_id: impl Into<String>, series_title: Option<String>) -> Self {
        self.series_id = Some(series_id.into());
        self.series_title = series_title;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

/// Public profile of the analyzed author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<u64>,
    pub username: String,
    pub name: Option<String>,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub joined_at: Option<String>,
    pub profile_image: Option<String>,
    /// Followers seen on the authenticated followers endpoint, if it was queried.
    pub follower_count: Option<u64>,
}

/// Outcome of paging through the article list. Never an error: a page that
/// fails stops pagination and its error text is kept here.
#[derive(Debug, Clone)]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
    pub error: Option<String>,
}

impl<T> FetchOutcome<T> {
    /// True when not even the first page came back.
    pub fn failed_on_first_page(&self) -> bool {
        self.pages_fetched == 0 && self.error.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream returned HTTP {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    #[error("Upstream API unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Insight generator error: {0}")]
    Insights(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
