use crate::store::ArticleStore;
use crate::types::Article;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// One article's place inside a series, with the counts series stats need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesMember {
    pub article_id: u64,
    pub series_part: u32,
    pub title: String,
    pub published_at: Option<DateTime<Utc>>,
    pub page_views_count: u64,
    pub public_reactions_count: u64,
    pub comments_count: u64,
    pub reading_time_minutes: u64,
}

/// Articles sharing a series id, ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub series_id: String,
    pub title: String,
    pub members: Vec<SeriesMember>,
}

impl Series {
    pub fn article_ids(&self) -> Vec<u64> {
        self.members.iter().map(|m| m.article_id).collect()
    }

    /// Views of the last part over views of the first. Zero for single-part
    /// series or when the first part has no views.
    pub fn completion_rate(&self) -> f64 {
        match (self.members.first(), self.members.last()) {
            (Some(first), Some(last)) if self.members.len() > 1 && first.page_views_count > 0 => {
                last.page_views_count as f64 / first.page_views_count as f64
            }
            _ => 0.0,
        }
    }

    pub fn performance(&self) -> SeriesPerformance {
        let article_count = self.members.len() as u64;
        let total_views: u64 = self.members.iter().map(|m| m.page_views_count).sum();
        let total_reactions: u64 = self.members.iter().map(|m| m.public_reactions_count).sum();
        let total_comments: u64 = self.members.iter().map(|m| m.comments_count).sum();
        let total_reading_time: u64 = self.members.iter().map(|m| m.reading_time_minutes).sum();

        SeriesPerformance {
            series_id: self.series_id.clone(),
            title: self.title.clone(),
            article_count,
            article_ids: self.article_ids(),
            total_views,
            total_reactions,
            total_comments,
            total_reading_time,
            avg_views: mean(total_views, article_count),
            avg_reactions: mean(total_reactions, article_count),
            avg_comments: mean(total_comments, article_count),
            avg_reading_time: mean(total_reading_time, article_count),
            completion_rate: self.completion_rate(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPerformance {
    pub series_id: String,
    pub title: String,
    pub article_count: u64,
    pub article_ids: Vec<u64>,
    pub total_views: u64,
    pub total_reactions: u64,
    pub total_comments: u64,
    pub total_reading_time: u64,
    pub avg_views: f64,
    pub avg_reactions: f64,
    pub avg_comments: f64,
    pub avg_reading_time: f64,
    pub completion_rate: f64,
}

/// Every series found in one article store, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    series: Vec<Series>,
    parts: HashMap<u64, u32>,
}

impl SeriesSet {
    pub fn extract(store: &ArticleStore) -> Self {
        let mut groups: Vec<(String, Vec<&Article>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for article in store.articles() {
            let Some(series_id) = article.series_id.as_deref() else {
                continue;
            };
            match positions.get(series_id) {
                Some(&position) => groups[position].1.push(article),
                None => {
                    positions.insert(series_id, groups.len());
                    groups.push((series_id.to_string(), vec![article]));
                }
            }
        }

        let mut set = Self::default();

        for (series_id, mut members) in groups {
            // Stable: equal or missing timestamps keep fetch order, missing last
            members.sort_by_key(|a| (a.published_at.is_none(), a.published_at));

            let title = members
                .first()
                .and_then(|a| a.series_title.clone())
                .unwrap_or_else(|| series_id.clone());

            let members: Vec<SeriesMember> = members
                .into_iter()
                .enumerate()
                .map(|(i, a)| SeriesMember {
                    article_id: a.id,
                    series_part: i as u32 + 1,
                    title: a.title.clone(),
                    published_at: a.published_at,
                    page_views_count: a.page_views_count,
                    public_reactions_count: a.public_reactions_count,
                    comments_count: a.comments_count,
                    reading_time_minutes: a.reading_time_minutes,
                })
                .collect();

            for member in &members {
                set.parts.insert(member.article_id, member.series_part);
            }

            debug!("Series {:?} has {} parts", title, members.len());
            set.series.push(Series {
                series_id,
                title,
                members,
            });
        }

        set
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// 1-based part number of an article, if it belongs to a series
    pub fn part_of(&self, article_id: u64) -> Option<u32> {
        self.parts.get(&article_id).copied()
    }

    /// Per-series stats, most total reactions first.
    pub fn series_performance(&self) -> Vec<SeriesPerformance> {
        let mut performance: Vec<SeriesPerformance> = self.series.iter().map(Series::performance).collect();
        performance.sort_by(|a, b| b.total_reactions.cmp(&a.total_reactions));
        performance
    }
}

fn mean(total: u64, count: u64) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / count as f64
    }
}
