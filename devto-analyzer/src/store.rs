use crate::parser::{ArticleParser, RawArticle};
use crate::types::Article;
use std::collections::HashMap;
use tracing::debug;

/// In-memory articles of one analysis run, in fetch order and indexed by id.
///
/// Built once from completed fetches and never mutated afterwards; every
/// downstream stage reads from it.
#[derive(Debug, Clone, Default)]
pub struct ArticleStore {
    articles: Vec<Article>,
    index: HashMap<u64, usize>,
}

impl ArticleStore {
    /// Articles repeating an id already in the store are dropped.
    pub fn new(articles: Vec<Article>) -> Self {
        let mut store = Self::default();

        for article in articles {
            if store.index.contains_key(&article.id) {
                debug!("Ignoring duplicate article {}", article.id);
                continue;
            }
            store.index.insert(article.id, store.articles.len());
            store.articles.push(article);
        }

        store
    }

    /// Normalize merged summary+detail payloads into a store.
    pub fn from_payloads(payloads: Vec<RawArticle>, synthesize_views: bool) -> Self {
        Self::new(ArticleParser::new(synthesize_views).parse_articles(payloads))
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn get(&self, id: u64) -> Option<&Article> {
        self.index.get(&id).map(|&position| &self.articles[position])
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn synthetic_view_count(&self) -> u64 {
        self.articles.iter().filter(|a| a.views_synthetic).count() as u64
    }

    pub fn into_articles(self) -> Vec<Article> {
        self.articles
    }
}
