#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use devto_analyzer::parser::{RawArticle, TagsField};
use devto_analyzer::{AnalyzerError, Article, ArticleSource, Result, UserProfile};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub fn article(id: u64, views: u64, reactions: u64, comments: u64, tags: &[&str]) -> Article {
    Article::new(id, format!("Article {}", id))
        .with_url(format!("https://dev.to/tester/article-{}", id))
        .with_counts(views, reactions, comments)
        .with_reading_time(5)
        .with_tags(tags.iter().copied())
}

/// List-endpoint shaped payload: joined `tags`, listed `tag_list`, no views.
pub fn summary(id: u64, reactions: u64, comments: u64, tags: &[&str]) -> RawArticle {
    RawArticle {
        id: Some(id),
        title: Some(format!("Article {}", id)),
        url: Some(format!("https://dev.to/tester/article-{}", id)),
        published_at: Some(format!("2024-03-{:02}T10:00:00Z", id % 28 + 1)),
        tags: Some(TagsField::Joined(tags.join(", "))),
        tag_list: Some(TagsField::List(tags.iter().map(|t| t.to_string()).collect())),
        public_reactions_count: Some(reactions as f64),
        comments_count: Some(comments as f64),
        reading_time_minutes: Some(4.0),
        ..Default::default()
    }
}

/// Detail-endpoint shaped payload: the tag fields swap forms.
pub fn detail(id: u64, tags: &[&str]) -> RawArticle {
    RawArticle {
        id: Some(id),
        tags: Some(TagsField::List(tags.iter().map(|t| t.to_string()).collect())),
        tag_list: Some(TagsField::Joined(tags.join(", "))),
        reading_time_minutes: Some(6.0),
        ..Default::default()
    }
}

/// Article source serving canned pages, with failures on request.
#[derive(Default)]
pub struct InMemorySource {
    pub pages: Vec<Vec<RawArticle>>,
    pub details: HashMap<u64, RawArticle>,
    pub failing_pages: HashSet<u32>,
    pub failing_details: HashSet<u64>,
    pub profile: Option<UserProfile>,
    pub followers: Vec<usize>,
    pub key_owner: Option<String>,
    pub requested_pages: Mutex<Vec<u32>>,
    pub follower_requests: Mutex<u32>,
}

impl InMemorySource {
    /// Pages of summaries whose detail payloads repeat the summary's tags.
    pub fn with_pages(pages: Vec<Vec<RawArticle>>) -> Self {
        let mut details = HashMap::new();
        for raw in pages.iter().flatten() {
            if let Some(id) = raw.id {
                details.insert(
                    id,
                    RawArticle {
                        id: Some(id),
                        ..Default::default()
                    },
                );
            }
        }

        Self {
            pages,
            details,
            ..Default::default()
        }
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.requested_pages.lock().unwrap().clone()
    }

    pub fn follower_requests(&self) -> u32 {
        *self.follower_requests.lock().unwrap()
    }
}

#[async_trait]
impl ArticleSource for InMemorySource {
    fn source_name(&self) -> String {
        "in-memory".to_string()
    }

    async fn fetch_page(&self, _username: &str, page: u32, _per_page: u32) -> Result<Vec<RawArticle>> {
        self.requested_pages.lock().unwrap().push(page);
        if self.failing_pages.contains(&page) {
            return Err(AnalyzerError::UpstreamStatus {
                status: 503,
                url: format!("memory://articles?page={}", page),
            });
        }
        Ok(self.pages.get(page as usize - 1).cloned().unwrap_or_default())
    }

    async fn fetch_article(&self, id: u64) -> Result<RawArticle> {
        if self.failing_details.contains(&id) {
            return Err(AnalyzerError::UpstreamStatus {
                status: 500,
                url: format!("memory://articles/{}", id),
            });
        }
        self.details.get(&id).cloned().ok_or(AnalyzerError::UpstreamStatus {
            status: 404,
            url: format!("memory://articles/{}", id),
        })
    }

    async fn fetch_profile(&self, _username: &str) -> Result<Option<UserProfile>> {
        Ok(self.profile.clone())
    }

    async fn fetch_key_owner(&self) -> Result<Option<String>> {
        Ok(self.key_owner.clone())
    }

    async fn fetch_followers_page(&self, page: u32, _per_page: u32) -> Result<usize> {
        *self.follower_requests.lock().unwrap() += 1;
        Ok(self.followers.get(page as usize - 1).copied().unwrap_or(0))
    }

    fn can_fetch_followers(&self) -> bool {
        !self.followers.is_empty()
    }
}
