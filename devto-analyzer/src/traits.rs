use crate::parser::RawArticle;
use crate::types::{Result, UserProfile};
use async_trait::async_trait;

/// Trait for pulling an author's posts from the blogging platform (or a stand-in)
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// One page of the author's article list. An empty page means the list is exhausted.
    async fn fetch_page(&self, username: &str, page: u32, per_page: u32) -> Result<Vec<RawArticle>>;

    /// Full payload of a single article
    async fn fetch_article(&self, id: u64) -> Result<RawArticle>;

    /// Public profile of the author, if the source knows one
    async fn fetch_profile(&self, _username: &str) -> Result<Option<UserProfile>> {
        Ok(None)
    }

    /// Username of the account the API key belongs to. The followers listing
    /// always describes this account, whoever is being analyzed.
    async fn fetch_key_owner(&self) -> Result<Option<String>> {
        Ok(None)
    }

    /// Number of followers on one page of the followers listing.
    /// Sources without follower data report an empty page.
    async fn fetch_followers_page(&self, _page: u32, _per_page: u32) -> Result<usize> {
        Ok(0)
    }

    /// Whether follower data can be requested at all (it needs an API key upstream)
    fn can_fetch_followers(&self) -> bool {
        false
    }
}
