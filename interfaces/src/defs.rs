use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One post as seen by an insight generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub views: u64,
    pub reactions: u64,
    pub comments: u64,
    pub reading_time: u64,
    pub engagement_ratio: f64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: String,
    pub posts: u64,
    pub avg_views: f64,
    pub avg_reactions: f64,
    pub engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: String,
    pub article_count: u64,
    pub avg_views: f64,
    pub avg_reactions: f64,
    pub avg_comments: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourSummary {
    pub hour: u32,
    pub article_count: u64,
    pub avg_views: f64,
    pub avg_reactions: f64,
    pub avg_comments: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayHourSummary {
    pub day: String,
    pub hour: u32,
    pub article_count: u64,
    pub avg_views: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub title: String,
    pub article_count: u64,
    pub total_reactions: u64,
    pub avg_reactions: f64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagRecommendationSummary {
    #[serde(rename = "type")]
    pub kind: String,
    pub tags: Vec<String>,
}

/// Truncated projection of an analysis report, shaped for a language model.
///
/// `synthetic_views` counts the posts whose view numbers were synthesized
/// because the platform did not report them; generators should not present
/// view-based claims as measured when it is non-zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CondensedReport {
    pub username: String,
    pub total_articles: u64,
    pub synthetic_views: u64,
    pub top_performing_posts: Vec<PostSummary>,
    pub highest_engagement_posts: Vec<PostSummary>,
    pub most_reacted_posts: Vec<PostSummary>,
    pub most_commented_posts: Vec<PostSummary>,
    pub top_tags: Vec<TagSummary>,
    pub best_days: Vec<DaySummary>,
    pub best_hours: Vec<HourSummary>,
    pub best_day_hour_combinations: Vec<DayHourSummary>,
    pub series_performance: Vec<SeriesSummary>,
    pub tag_recommendations: Vec<TagRecommendationSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingStrategy {
    pub best_days: Vec<String>,
    pub best_hours: Vec<String>,
    pub recommended_tags: Vec<String>,
    pub content_type: String,
    pub style_tips: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub performance_summary: String,
    pub key_patterns: Vec<String>,
    pub content_recommendations: Vec<String>,
    pub optimal_posting_strategy: PostingStrategy,
    pub series_strategy: String,
    pub engagement_boosters: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicIdea {
    pub title: String,
    pub description: String,
    pub suggested_tags: Vec<String>,
    pub estimated_reading_time: u32,
    pub performance_rationale: String,
    pub series_potential: String,
}

// Object style note:
// Generators are pure with respect to their input: the condensed report goes
// in, insights come out. They hold configuration at most, never run state.
// Returning `Ok(None)` means "this generator has nothing to say", which the
// caller treats the same as a disabled provider.

pub trait InsightGenerator: Send + Sync {
    fn generator_name(&self) -> String;
    fn generate_insights(&self, report: &CondensedReport) -> Result<Option<Insights>>;
    fn generate_topic_ideas(&self, report: &CondensedReport, num_ideas: usize) -> Result<Option<Vec<TopicIdea>>>;
}
