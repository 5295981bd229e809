use crate::parser::{RawArticle, RawUserProfile};
use crate::traits::ArticleSource;
use crate::types::{AnalyzerError, FetchConfig, FetchOutcome, Result, UserProfile};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

const FOLLOWERS_MAX_PAGES: u32 = 10;
const FOLLOWERS_PER_PAGE: u32 = 80;

/// `reqwest`-backed client for the dev.to REST API
pub struct DevToClient {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl DevToClient {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        // Url::join drops the last path segment unless the base ends with '/'
        let base_url = Url::parse(&format!("{}/", config.base_url.trim_end_matches('/')))?;

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = self.endpoint(path)?;
        let start_time = Instant::now();

        let mut request = self.client.get(url.clone()).query(query);
        if let Some(api_key) = &self.api_key {
            request = request.header("api-key", api_key);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AnalyzerError::UpstreamStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.json::<T>().await?;
        debug!("GET {} -> {} in {}ms", url, status, start_time.elapsed().as_millis());
        Ok(body)
    }
}

#[async_trait]
impl ArticleSource for DevToClient {
    fn source_name(&self) -> String {
        format!("dev.to API ({})", self.base_url)
    }

    async fn fetch_page(&self, username: &str, page: u32, per_page: u32) -> Result<Vec<RawArticle>> {
        self.get_json(
            "articles",
            &[
                ("username", username.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    async fn fetch_article(&self, id: u64) -> Result<RawArticle> {
        self.get_json(&format!("articles/{}", id), &[]).await
    }

    async fn fetch_profile(&self, username: &str) -> Result<Option<UserProfile>> {
        let raw: RawUserProfile = self
            .get_json("users/by_username", &[("url", username.to_string())])
            .await?;
        Ok(Some(raw.into_profile(username)))
    }

    async fn fetch_key_owner(&self) -> Result<Option<String>> {
        if self.api_key.is_none() {
            return Ok(None);
        }
        let raw: RawUserProfile = self.get_json("users/me", &[]).await?;
        Ok(raw.username)
    }

    async fn fetch_followers_page(&self, page: u32, per_page: u32) -> Result<usize> {
        let followers: Vec<Value> = self
            .get_json(
                "followers/users",
                &[("page", page.to_string()), ("per_page", per_page.to_string())],
            )
            .await?;
        Ok(followers.len())
    }

    fn can_fetch_followers(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Page through the author's article list.
///
/// Stops at the first empty page or after `max_pages`. A failing page ends
/// pagination; whatever was collected before it is kept.
pub async fn fetch_articles(
    source: &dyn ArticleSource,
    username: &str,
    max_pages: u32,
    per_page: u32,
) -> FetchOutcome<RawArticle> {
    let mut items = Vec::new();
    let mut pages_fetched = 0;
    let mut error = None;

    for page in 1..=max_pages {
        match source.fetch_page(username, page, per_page).await {
            Ok(articles) if articles.is_empty() => {
                debug!("Page {} for {} is empty, stopping", page, username);
                break;
            }
            Ok(articles) => {
                debug!("Page {} for {}: {} articles", page, username, articles.len());
                pages_fetched += 1;
                items.extend(articles);
            }
            Err(e) => {
                warn!("Error fetching page {} for {}: {}", page, username, e);
                error = Some(e.to_string());
                break;
            }
        }
    }

    info!(
        "Fetched {} article summaries for {} from {} ({} pages)",
        items.len(),
        username,
        source.source_name(),
        pages_fetched
    );

    FetchOutcome {
        items,
        pages_fetched,
        error,
    }
}

/// Fetch one article's full payload and merge it over its summary.
/// `None` when the request failed; the caller drops the article.
pub async fn fetch_article_detail(source: &dyn ArticleSource, summary: &RawArticle) -> Option<RawArticle> {
    let id = summary.id?;

    match source.fetch_article(id).await {
        Ok(detail) => Some(RawArticle::merge(summary, detail)),
        Err(e) => {
            warn!("Error fetching article {}: {}", id, e);
            None
        }
    }
}

/// Detail-fetch every summary in order. Articles whose detail request fails
/// are left out of the result.
pub async fn fetch_detailed_articles(source: &dyn ArticleSource, summaries: &[RawArticle]) -> Vec<RawArticle> {
    let mut detailed = Vec::with_capacity(summaries.len());

    for summary in summaries {
        if let Some(merged) = fetch_article_detail(source, summary).await {
            detailed.push(merged);
        }
    }

    let dropped = summaries.len() - detailed.len();
    if dropped > 0 {
        warn!("Dropped {} articles whose details could not be fetched", dropped);
    }

    detailed
}

/// Best-effort profile lookup
pub async fn fetch_user_profile(source: &dyn ArticleSource, username: &str) -> Option<UserProfile> {
    match source.fetch_profile(username).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Error fetching profile for {}: {}", username, e);
            None
        }
    }
}

/// Count `username`'s followers across pages.
///
/// `None` when the source cannot list followers, when the key belongs to a
/// different account, or when the very first page fails. A later failure
/// keeps the partial count.
pub async fn fetch_follower_count(source: &dyn ArticleSource, username: &str) -> Option<u64> {
    if !source.can_fetch_followers() {
        debug!("Skipping follower lookup: {} cannot list followers", source.source_name());
        return None;
    }

    match source.fetch_key_owner().await {
        Ok(Some(owner)) if owner.eq_ignore_ascii_case(username) => {}
        Ok(Some(owner)) => {
            info!("API key belongs to {}, not {}; follower count left out", owner, username);
            return None;
        }
        Ok(None) => {
            debug!("Skipping follower lookup: API key owner is unknown");
            return None;
        }
        Err(e) => {
            warn!("Error identifying the API key owner: {}", e);
            return None;
        }
    }

    let mut total: u64 = 0;

    for page in 1..=FOLLOWERS_MAX_PAGES {
        match source.fetch_followers_page(page, FOLLOWERS_PER_PAGE).await {
            Ok(0) => break,
            Ok(count) => total += count as u64,
            Err(e) if page == 1 => {
                warn!("Error fetching followers: {}", e);
                return None;
            }
            Err(e) => {
                warn!("Error fetching followers page {}: {}", page, e);
                break;
            }
        }
    }

    Some(total)
}
