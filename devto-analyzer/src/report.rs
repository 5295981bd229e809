use crate::metrics::{ArticleMetrics, Metrics, OverallStats, RankMetric, TagStat, TimePerformance, TimeSlot};
use crate::recommend::{posting_time_recommendations, tag_recommendations, PostingTimeRecommendation, TagRecommendation};
use crate::series::{SeriesPerformance, SeriesSet};
use crate::store::ArticleStore;
use crate::types::{Article, CondensedReport, Result, UserProfile};
use crate::utils::time::UNKNOWN_DAY;
use chrono::{DateTime, Utc};
use interfaces::defs::{
    DayHourSummary, DaySummary, HourSummary, PostSummary, SeriesSummary, TagRecommendationSummary, TagSummary,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

pub const TOP_POSTS: usize = 10;
pub const TOP_TAGS: usize = 15;

const CONDENSED_POSTS: usize = 5;
const CONDENSED_TAGS: usize = 10;
const CONDENSED_HOURS: usize = 5;
const CONDENSED_SERIES: usize = 3;
const CONDENSED_COMBINATIONS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopPosts {
    pub by_views: Vec<ArticleMetrics>,
    pub by_reactions: Vec<ArticleMetrics>,
    pub by_comments: Vec<ArticleMetrics>,
    pub by_engagement: Vec<ArticleMetrics>,
    pub by_time_efficiency: Vec<ArticleMetrics>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawData {
    pub detailed_articles: Vec<Article>,
}

/// Full result of one analysis run. Built once and never modified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub username: String,
    pub analysis_date: DateTime<Utc>,
    pub profile: Option<UserProfile>,
    /// Articles whose view counts were synthesized rather than reported
    pub synthetic_views: u64,
    pub overall_stats: OverallStats,
    pub top_posts: TopPosts,
    pub tag_performance: Vec<TagStat>,
    pub best_publishing_times: TimePerformance,
    pub posting_time_recommendations: Vec<PostingTimeRecommendation>,
    pub series_performance: Vec<SeriesPerformance>,
    pub tag_recommendations: Vec<TagRecommendation>,
    pub raw_data: RawData,
}

impl Report {
    /// Run the analysis stages over a finished store and assemble the result.
    pub fn build(username: &str, store: ArticleStore, profile: Option<UserProfile>) -> Self {
        let series = SeriesSet::extract(&store);
        let metrics = Metrics::compute(&store, &series);
        let recommendations = tag_recommendations(&metrics.tag_performance, &metrics.articles);

        Self::assemble(username, store, profile, &series, metrics, recommendations)
    }

    pub fn assemble(
        username: &str,
        store: ArticleStore,
        profile: Option<UserProfile>,
        series: &SeriesSet,
        metrics: Metrics,
        tag_recommendations: Vec<TagRecommendation>,
    ) -> Self {
        let top = |metric: RankMetric| {
            let mut ranked = metrics.rank(metric, true);
            ranked.truncate(TOP_POSTS);
            ranked
        };

        let top_posts = TopPosts {
            by_views: top(RankMetric::PageViewsCount),
            by_reactions: top(RankMetric::PublicReactionsCount),
            by_comments: top(RankMetric::CommentsCount),
            by_engagement: top(RankMetric::EngagementRatio),
            by_time_efficiency: top(RankMetric::TimeEfficiency),
        };

        let mut tag_performance = metrics.tag_performance;
        tag_performance.truncate(TOP_TAGS);

        let report = Self {
            run_id: Uuid::new_v4(),
            username: username.to_string(),
            analysis_date: Utc::now(),
            profile,
            synthetic_views: metrics.overall_stats.synthetic_views,
            overall_stats: metrics.overall_stats,
            top_posts,
            tag_performance,
            posting_time_recommendations: posting_time_recommendations(&metrics.time_performance),
            best_publishing_times: metrics.time_performance,
            series_performance: series.series_performance(),
            tag_recommendations,
            raw_data: RawData {
                detailed_articles: store.into_articles(),
            },
        };

        info!(
            "Assembled report {} for {}: {} articles, {} series, {} recommendation groups",
            report.run_id,
            report.username,
            report.overall_stats.total_articles,
            report.series_performance.len(),
            report.tag_recommendations.len()
        );

        report
    }

    pub fn condense(&self) -> CondensedReport {
        condense(self)
    }
}

fn post_summary(article: &ArticleMetrics) -> PostSummary {
    PostSummary {
        id: article.id,
        title: article.title.clone(),
        url: article.url.clone(),
        views: article.page_views_count,
        reactions: article.public_reactions_count,
        comments: article.comments_count,
        reading_time: article.reading_time_minutes,
        engagement_ratio: article.engagement_ratio,
        tags: article.tags.clone(),
    }
}

fn posts(ranked: &[ArticleMetrics]) -> Vec<PostSummary> {
    ranked.iter().take(CONDENSED_POSTS).map(post_summary).collect()
}

fn by_avg_views_desc<'a>(slots: impl IntoIterator<Item = &'a TimeSlot>) -> Vec<&'a TimeSlot> {
    let mut sorted: Vec<&TimeSlot> = slots.into_iter().collect();
    sorted.sort_by(|a, b| b.avg_views.total_cmp(&a.avg_views));
    sorted
}

/// The smaller, model-facing projection of a report. Selection and
/// truncation only; the undated `Unknown`/hour-0 buckets are never offered
/// as posting slots.
pub fn condense(report: &Report) -> CondensedReport {
    let time = &report.best_publishing_times;
    let dated_days = time.by_day.iter().filter(|slot| slot.day.as_deref() != Some(UNKNOWN_DAY));

    CondensedReport {
        username: report.username.clone(),
        total_articles: report.overall_stats.total_articles,
        synthetic_views: report.synthetic_views,
        top_performing_posts: posts(&report.top_posts.by_views),
        highest_engagement_posts: posts(&report.top_posts.by_engagement),
        most_reacted_posts: posts(&report.top_posts.by_reactions),
        most_commented_posts: posts(&report.top_posts.by_comments),
        top_tags: report
            .tag_performance
            .iter()
            .take(CONDENSED_TAGS)
            .map(|stat| TagSummary {
                tag: stat.tag.clone(),
                posts: stat.count,
                avg_views: stat.avg_views,
                avg_reactions: stat.avg_reactions,
                engagement: stat.engagement,
            })
            .collect(),
        best_days: by_avg_views_desc(dated_days)
            .into_iter()
            .map(|slot| DaySummary {
                day: slot.day.clone().unwrap_or_default(),
                article_count: slot.article_count,
                avg_views: slot.avg_views,
                avg_reactions: slot.avg_reactions,
                avg_comments: slot.avg_comments,
                avg_engagement: slot.avg_engagement,
            })
            .collect(),
        best_hours: by_avg_views_desc(&time.dated_by_hour)
            .into_iter()
            .take(CONDENSED_HOURS)
            .map(|slot| HourSummary {
                hour: slot.hour.unwrap_or_default(),
                article_count: slot.article_count,
                avg_views: slot.avg_views,
                avg_reactions: slot.avg_reactions,
                avg_comments: slot.avg_comments,
                avg_engagement: slot.avg_engagement,
            })
            .collect(),
        best_day_hour_combinations: time
            .best_combinations
            .iter()
            .take(CONDENSED_COMBINATIONS)
            .map(|slot| DayHourSummary {
                day: slot.day.clone().unwrap_or_default(),
                hour: slot.hour.unwrap_or_default(),
                article_count: slot.article_count,
                avg_views: slot.avg_views,
                avg_engagement: slot.avg_engagement,
            })
            .collect(),
        series_performance: report
            .series_performance
            .iter()
            .take(CONDENSED_SERIES)
            .map(|series| SeriesSummary {
                title: series.title.clone(),
                article_count: series.article_count,
                total_reactions: series.total_reactions,
                avg_reactions: series.avg_reactions,
                completion_rate: series.completion_rate,
            })
            .collect(),
        tag_recommendations: report
            .tag_recommendations
            .iter()
            .map(|group| TagRecommendationSummary {
                kind: group.kind().to_string(),
                tags: group.tags(),
            })
            .collect(),
    }
}

/// Write the report as pretty-printed JSON.
pub fn export_report_to_json(report: &Report, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    info!("Exported report {} to {}", report.run_id, path.display());
    Ok(())
}
