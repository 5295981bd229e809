use crate::series::SeriesSet;
use crate::store::ArticleStore;
use crate::types::AnalyzerError;
use crate::utils::time::{day_and_hour, day_position, UNKNOWN_DAY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Combined day/hour buckets below this size are not trusted for timing advice.
pub const MIN_COMBINATION_ARTICLES: u64 = 2;
pub const BEST_COMBINATIONS: usize = 5;
pub const MOST_USED_TAGS: usize = 5;

/// An article together with the metrics derived for it in this run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleMetrics {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub page_views_count: u64,
    pub views_synthetic: bool,
    pub public_reactions_count: u64,
    pub comments_count: u64,
    pub reading_time_minutes: u64,
    pub engagement_ratio: f64,
    pub time_efficiency: f64,
    pub day_of_week: String,
    pub hour_of_day: u32,
    pub series_id: Option<String>,
    pub series_part: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankMetric {
    PageViewsCount,
    PublicReactionsCount,
    CommentsCount,
    EngagementRatio,
    TimeEfficiency,
}

impl RankMetric {
    pub const ALL: [RankMetric; 5] = [
        RankMetric::PageViewsCount,
        RankMetric::PublicReactionsCount,
        RankMetric::CommentsCount,
        RankMetric::EngagementRatio,
        RankMetric::TimeEfficiency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RankMetric::PageViewsCount => "page_views_count",
            RankMetric::PublicReactionsCount => "public_reactions_count",
            RankMetric::CommentsCount => "comments_count",
            RankMetric::EngagementRatio => "engagement_ratio",
            RankMetric::TimeEfficiency => "time_efficiency",
        }
    }

    /// Ascending comparison of two articles on this metric.
    pub fn compare(&self, a: &ArticleMetrics, b: &ArticleMetrics) -> Ordering {
        match self {
            RankMetric::PageViewsCount => a.page_views_count.cmp(&b.page_views_count),
            RankMetric::PublicReactionsCount => a.public_reactions_count.cmp(&b.public_reactions_count),
            RankMetric::CommentsCount => a.comments_count.cmp(&b.comments_count),
            RankMetric::EngagementRatio => a.engagement_ratio.total_cmp(&b.engagement_ratio),
            RankMetric::TimeEfficiency => a.time_efficiency.total_cmp(&b.time_efficiency),
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankMetric {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankMetric::ALL
            .into_iter()
            .find(|metric| metric.as_str() == s)
            .ok_or_else(|| AnalyzerError::Validation(format!("Unknown ranking metric: {}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagStat {
    pub tag: String,
    pub count: u64,
    pub total_views: u64,
    pub total_reactions: u64,
    pub total_comments: u64,
    pub avg_views: f64,
    pub avg_reactions: f64,
    pub avg_comments: f64,
    pub engagement: f64,
}

/// Aggregate over one day, hour, or (day, hour) bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
    pub article_count: u64,
    pub total_views: u64,
    pub total_reactions: u64,
    pub total_comments: u64,
    pub total_engagement: f64,
    pub avg_views: f64,
    pub avg_reactions: f64,
    pub avg_comments: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimePerformance {
    pub by_day: Vec<TimeSlot>,
    pub by_hour: Vec<TimeSlot>,
    /// Hour buckets over dated articles only; undated ones never name an hour.
    #[serde(default)]
    pub dated_by_hour: Vec<TimeSlot>,
    pub best_combinations: Vec<TimeSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    pub total_articles: u64,
    pub total_views: u64,
    pub total_reactions: u64,
    pub total_comments: u64,
    pub total_reading_time: u64,
    pub avg_views_per_article: f64,
    pub avg_reactions_per_article: f64,
    pub avg_comments_per_article: f64,
    pub avg_reading_time: f64,
    pub most_used_tags: Vec<TagCount>,
    /// Articles whose view counts are placeholders rather than platform data
    pub synthetic_views: u64,
}

/// Everything the metrics pass produces for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metrics {
    pub articles: Vec<ArticleMetrics>,
    pub tag_performance: Vec<TagStat>,
    pub time_performance: TimePerformance,
    pub overall_stats: OverallStats,
}

impl Metrics {
    pub fn compute(store: &ArticleStore, series: &SeriesSet) -> Self {
        let articles = compute_derived_fields(store, series);
        let tag_performance = tag_performance(&articles);
        let time_performance = time_performance(&articles);
        let overall_stats = overall_stats(&articles);

        debug!(
            "Computed metrics for {} articles: {} tags, {} day buckets, {} hour buckets",
            articles.len(),
            tag_performance.len(),
            time_performance.by_day.len(),
            time_performance.by_hour.len()
        );

        Self {
            articles,
            tag_performance,
            time_performance,
            overall_stats,
        }
    }

    pub fn rank(&self, metric: RankMetric, descending: bool) -> Vec<ArticleMetrics> {
        rank(&self.articles, metric, descending)
    }
}

/// Engagement ratio and time efficiency with denominators floored at 1.
pub fn engagement_ratio(views: u64, reactions: u64, comments: u64) -> f64 {
    (reactions + comments) as f64 / views.max(1) as f64
}

pub fn time_efficiency(reactions: u64, reading_time_minutes: u64) -> f64 {
    reactions as f64 / reading_time_minutes.max(1) as f64
}

pub fn compute_derived_fields(store: &ArticleStore, series: &SeriesSet) -> Vec<ArticleMetrics> {
    store
        .articles()
        .iter()
        .map(|article| {
            let (day, hour) = day_and_hour(article.published_at);
            ArticleMetrics {
                id: article.id,
                title: article.title.clone(),
                url: article.url.clone(),
                published_at: article.published_at,
                tags: article.tags.clone(),
                page_views_count: article.page_views_count,
                views_synthetic: article.views_synthetic,
                public_reactions_count: article.public_reactions_count,
                comments_count: article.comments_count,
                reading_time_minutes: article.reading_time_minutes,
                engagement_ratio: engagement_ratio(
                    article.page_views_count,
                    article.public_reactions_count,
                    article.comments_count,
                ),
                time_efficiency: time_efficiency(article.public_reactions_count, article.reading_time_minutes),
                day_of_week: day.to_string(),
                hour_of_day: hour,
                series_id: article.series_id.clone(),
                series_part: series.part_of(article.id),
            }
        })
        .collect()
}

/// All articles ordered by `metric`. The sort is stable, so ties keep fetch order.
pub fn rank(articles: &[ArticleMetrics], metric: RankMetric, descending: bool) -> Vec<ArticleMetrics> {
    let mut ranked = articles.to_vec();
    if descending {
        ranked.sort_by(|a, b| metric.compare(b, a));
    } else {
        ranked.sort_by(|a, b| metric.compare(a, b));
    }
    ranked
}

#[derive(Default)]
struct TagAccumulator {
    count: u64,
    views: u64,
    reactions: u64,
    comments: u64,
}

/// Per-tag totals and averages, most viewed tag first.
pub fn tag_performance(articles: &[ArticleMetrics]) -> Vec<TagStat> {
    // Vec keeps first-seen order so equal view totals sort deterministically
    let mut order: Vec<String> = Vec::new();
    let mut stats: HashMap<String, TagAccumulator> = HashMap::new();

    for article in articles {
        for tag in &article.tags {
            let acc = stats.entry(tag.clone()).or_insert_with(|| {
                order.push(tag.clone());
                TagAccumulator::default()
            });
            acc.count += 1;
            acc.views += article.page_views_count;
            acc.reactions += article.public_reactions_count;
            acc.comments += article.comments_count;
        }
    }

    let mut tag_stats: Vec<TagStat> = order
        .into_iter()
        .filter_map(|tag| {
            let acc = stats.remove(&tag)?;
            let count = acc.count as f64;
            Some(TagStat {
                count: acc.count,
                total_views: acc.views,
                total_reactions: acc.reactions,
                total_comments: acc.comments,
                avg_views: acc.views as f64 / count,
                avg_reactions: acc.reactions as f64 / count,
                avg_comments: acc.comments as f64 / count,
                engagement: engagement_ratio(acc.views, acc.reactions, acc.comments),
                tag,
            })
        })
        .collect();

    tag_stats.sort_by(|a, b| b.total_views.cmp(&a.total_views));
    tag_stats
}

#[derive(Default)]
struct SlotAccumulator {
    count: u64,
    views: u64,
    reactions: u64,
    comments: u64,
    engagement: f64,
}

impl SlotAccumulator {
    fn add(&mut self, article: &ArticleMetrics) {
        self.count += 1;
        self.views += article.page_views_count;
        self.reactions += article.public_reactions_count;
        self.comments += article.comments_count;
        self.engagement += article.engagement_ratio;
    }

    fn finish(self, day: Option<String>, hour: Option<u32>) -> TimeSlot {
        let count = self.count.max(1) as f64;
        TimeSlot {
            day,
            hour,
            article_count: self.count,
            total_views: self.views,
            total_reactions: self.reactions,
            total_comments: self.comments,
            total_engagement: self.engagement,
            avg_views: self.views as f64 / count,
            avg_reactions: self.reactions as f64 / count,
            avg_comments: self.comments as f64 / count,
            avg_engagement: self.engagement / count,
        }
    }
}

/// Day-of-week and hour-of-day aggregates plus the strongest (day, hour) pairs.
///
/// Days come Monday first with `Unknown` last, hours ascending. Articles
/// without a publish time count towards the `Unknown`/0 buckets but never
/// towards a (day, hour) combination, since those drive posting advice.
pub fn time_performance(articles: &[ArticleMetrics]) -> TimePerformance {
    let mut by_day: BTreeMap<usize, (String, SlotAccumulator)> = BTreeMap::new();
    let mut by_hour: BTreeMap<u32, SlotAccumulator> = BTreeMap::new();
    let mut dated_by_hour: BTreeMap<u32, SlotAccumulator> = BTreeMap::new();
    let mut combined: BTreeMap<(usize, u32), (String, SlotAccumulator)> = BTreeMap::new();

    for article in articles {
        let day_key = day_position(&article.day_of_week);

        by_day
            .entry(day_key)
            .or_insert_with(|| (article.day_of_week.clone(), SlotAccumulator::default()))
            .1
            .add(article);
        by_hour.entry(article.hour_of_day).or_default().add(article);

        if article.day_of_week != UNKNOWN_DAY {
            dated_by_hour.entry(article.hour_of_day).or_default().add(article);
            combined
                .entry((day_key, article.hour_of_day))
                .or_insert_with(|| (article.day_of_week.clone(), SlotAccumulator::default()))
                .1
                .add(article);
        }
    }

    let mut best_combinations: Vec<TimeSlot> = combined
        .into_iter()
        .filter(|(_, (_, acc))| acc.count >= MIN_COMBINATION_ARTICLES)
        .map(|((_, hour), (day, acc))| acc.finish(Some(day), Some(hour)))
        .collect();
    best_combinations.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));
    best_combinations.truncate(BEST_COMBINATIONS);

    TimePerformance {
        by_day: by_day
            .into_values()
            .map(|(day, acc)| acc.finish(Some(day), None))
            .collect(),
        by_hour: by_hour
            .into_iter()
            .map(|(hour, acc)| acc.finish(None, Some(hour)))
            .collect(),
        dated_by_hour: dated_by_hour
            .into_iter()
            .map(|(hour, acc)| acc.finish(None, Some(hour)))
            .collect(),
        best_combinations,
    }
}

/// Totals, per-article averages, and the most used tags by post count.
pub fn overall_stats(articles: &[ArticleMetrics]) -> OverallStats {
    if articles.is_empty() {
        return OverallStats::default();
    }

    let total_articles = articles.len() as u64;
    let total_views: u64 = articles.iter().map(|a| a.page_views_count).sum();
    let total_reactions: u64 = articles.iter().map(|a| a.public_reactions_count).sum();
    let total_comments: u64 = articles.iter().map(|a| a.comments_count).sum();
    let total_reading_time: u64 = articles.iter().map(|a| a.reading_time_minutes).sum();
    let n = total_articles as f64;

    OverallStats {
        total_articles,
        total_views,
        total_reactions,
        total_comments,
        total_reading_time,
        avg_views_per_article: total_views as f64 / n,
        avg_reactions_per_article: total_reactions as f64 / n,
        avg_comments_per_article: total_comments as f64 / n,
        avg_reading_time: total_reading_time as f64 / n,
        most_used_tags: most_used_tags(articles, MOST_USED_TAGS),
        synthetic_views: articles.iter().filter(|a| a.views_synthetic).count() as u64,
    }
}

pub fn most_used_tags(articles: &[ArticleMetrics], limit: usize) -> Vec<TagCount> {
    let mut counts: Vec<TagCount> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for tag in articles.iter().flat_map(|a| a.tags.iter()) {
        match positions.get(tag.as_str()) {
            Some(&position) => counts[position].count += 1,
            None => {
                positions.insert(tag.as_str(), counts.len());
                counts.push(TagCount {
                    tag: tag.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}
