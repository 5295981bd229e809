use crate::metrics::{ArticleMetrics, TagStat, TimePerformance};
use crate::utils::text::capitalize;
use crate::utils::time::hour_label;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const TOP_PERFORMING_MIN_TAGS: usize = 3;
const GROUP_SIZE: usize = 3;
const UNDERUSED_MAX_COUNT: u64 = 2;
const MIN_PAIR_ARTICLES: u64 = 2;

/// Reference list of tags that draw outsized traffic on the platform.
pub const TRENDING_TAGS: &[&str] = &[
    "ai",
    "javascript",
    "typescript",
    "python",
    "rust",
    "go",
    "react",
    "webdev",
    "devops",
    "docker",
    "kubernetes",
    "aws",
    "cloud",
    "security",
    "opensource",
    "machinelearning",
    "productivity",
    "beginners",
    "tutorial",
    "career",
];

/// Display forms for tags that plain capitalization gets wrong.
const SPECIAL_CASES: &[(&str, &str)] = &[
    ("javascript", "JavaScript"),
    ("typescript", "TypeScript"),
    ("nodejs", "Node.js"),
    ("nextjs", "Next.js"),
    ("reactjs", "React.js"),
    ("vuejs", "Vue.js"),
    ("aws", "AWS"),
    ("dotnet", ".NET"),
    ("csharp", "C#"),
    ("cpp", "C++"),
    ("devops", "DevOps"),
    ("ai", "AI"),
    ("ml", "ML"),
    ("api", "API"),
    ("graphql", "GraphQL"),
    ("postgresql", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("nosql", "NoSQL"),
    ("mongodb", "MongoDB"),
    ("php", "PHP"),
    ("css", "CSS"),
    ("html", "HTML"),
    ("sass", "Sass"),
    ("scss", "SCSS"),
    ("ios", "iOS"),
    ("macos", "macOS"),
    ("linux", "Linux"),
    ("windows", "Windows"),
    ("ci", "CI"),
    ("cd", "CD"),
    ("cicd", "CI/CD"),
    ("iot", "IoT"),
    ("ui", "UI"),
    ("ux", "UX"),
    ("jwt", "JWT"),
    ("oauth", "OAuth"),
    ("regex", "RegEx"),
    ("webdev", "WebDev"),
    ("seo", "SEO"),
];

/// Canonical display casing for a tag. Never used as an aggregation key.
pub fn tag_normalize(tag: &str) -> String {
    let lower = tag.trim().to_lowercase();

    if let Some((_, display)) = SPECIAL_CASES.iter().find(|(key, _)| *key == lower) {
        return display.to_string();
    }

    if lower.contains('-') {
        return lower.split('-').map(capitalize).collect::<Vec<_>>().join("-");
    }

    capitalize(&lower)
}

/// Engagement of one unordered tag pair across the articles carrying both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPairStat {
    pub tags: [String; 2],
    pub article_count: u64,
    pub total_engagement: f64,
    pub avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TagRecommendation {
    TopPerforming { tags: Vec<String>, reason: String },
    UnderusedHighPerformers { tags: Vec<String>, reason: String },
    TagCombinations { combinations: Vec<TagPairStat>, reason: String },
    TrendingMatches { tags: Vec<String>, reason: String },
}

impl TagRecommendation {
    pub fn kind(&self) -> &'static str {
        match self {
            TagRecommendation::TopPerforming { .. } => "top_performing",
            TagRecommendation::UnderusedHighPerformers { .. } => "underused_high_performers",
            TagRecommendation::TagCombinations { .. } => "tag_combinations",
            TagRecommendation::TrendingMatches { .. } => "trending_matches",
        }
    }

    /// Flat tag list; a pair shows up as `"a + b"`.
    pub fn tags(&self) -> Vec<String> {
        match self {
            TagRecommendation::TopPerforming { tags, .. }
            | TagRecommendation::UnderusedHighPerformers { tags, .. }
            | TagRecommendation::TrendingMatches { tags, .. } => tags.clone(),
            TagRecommendation::TagCombinations { combinations, .. } => combinations
                .iter()
                .map(|pair| format!("{} + {}", pair.tags[0], pair.tags[1]))
                .collect(),
        }
    }
}

/// Up to four recommendation groups. A group whose precondition fails is left
/// out entirely rather than emitted empty.
pub fn tag_recommendations(tag_stats: &[TagStat], articles: &[ArticleMetrics]) -> Vec<TagRecommendation> {
    let mut recommendations = Vec::new();

    if let Some(group) = top_performing(tag_stats) {
        recommendations.push(group);
    }
    if let Some(group) = underused_high_performers(tag_stats) {
        recommendations.push(group);
    }
    if let Some(group) = tag_combinations(articles) {
        recommendations.push(group);
    }
    if let Some(group) = trending_matches(tag_stats) {
        recommendations.push(group);
    }

    debug!("Built {} tag recommendation groups", recommendations.len());
    recommendations
}

fn top_performing(tag_stats: &[TagStat]) -> Option<TagRecommendation> {
    if tag_stats.len() < TOP_PERFORMING_MIN_TAGS {
        return None;
    }

    let mut ranked: Vec<&TagStat> = tag_stats.iter().collect();
    ranked.sort_by(|a, b| b.total_views.cmp(&a.total_views));

    Some(TagRecommendation::TopPerforming {
        tags: ranked.iter().take(GROUP_SIZE).map(|s| s.tag.clone()).collect(),
        reason: "These tags bring in the most views across your articles".to_string(),
    })
}

fn underused_high_performers(tag_stats: &[TagStat]) -> Option<TagRecommendation> {
    let mut candidates: Vec<&TagStat> = tag_stats
        .iter()
        .filter(|s| s.count <= UNDERUSED_MAX_COUNT && s.engagement > 0.0)
        .collect();
    if candidates.is_empty() {
        return None;
    }

    candidates.sort_by(|a, b| (b.total_reactions + b.total_comments).cmp(&(a.total_reactions + a.total_comments)));

    Some(TagRecommendation::UnderusedHighPerformers {
        tags: candidates.iter().take(GROUP_SIZE).map(|s| s.tag.clone()).collect(),
        reason: "Rarely used tags that still earned strong reactions and comments".to_string(),
    })
}

/// Average engagement per unordered tag pair, for pairs seen on at least two articles.
pub fn tag_pair_stats(articles: &[ArticleMetrics]) -> Vec<TagPairStat> {
    let mut pairs: Vec<TagPairStat> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();

    for article in articles.iter().filter(|a| a.tags.len() >= 2) {
        for (i, first) in article.tags.iter().enumerate() {
            for second in &article.tags[i + 1..] {
                let key = if first <= second {
                    (first.clone(), second.clone())
                } else {
                    (second.clone(), first.clone())
                };

                match positions.get(&key) {
                    Some(&position) => {
                        let pair = &mut pairs[position];
                        pair.article_count += 1;
                        pair.total_engagement += article.engagement_ratio;
                    }
                    None => {
                        positions.insert(key.clone(), pairs.len());
                        pairs.push(TagPairStat {
                            tags: [key.0, key.1],
                            article_count: 1,
                            total_engagement: article.engagement_ratio,
                            avg_engagement: 0.0,
                        });
                    }
                }
            }
        }
    }

    let mut pairs: Vec<TagPairStat> = pairs
        .into_iter()
        .filter(|pair| pair.article_count >= MIN_PAIR_ARTICLES)
        .map(|mut pair| {
            pair.avg_engagement = pair.total_engagement / pair.article_count as f64;
            pair
        })
        .collect();
    pairs.sort_by(|a, b| b.avg_engagement.total_cmp(&a.avg_engagement));
    pairs
}

fn tag_combinations(articles: &[ArticleMetrics]) -> Option<TagRecommendation> {
    let mut combinations = tag_pair_stats(articles);
    if combinations.is_empty() {
        return None;
    }
    combinations.truncate(GROUP_SIZE);

    Some(TagRecommendation::TagCombinations {
        combinations,
        reason: "Tag pairs that engaged readers best when used together".to_string(),
    })
}

fn trending_matches(tag_stats: &[TagStat]) -> Option<TagRecommendation> {
    let trending: HashSet<&str> = TRENDING_TAGS.iter().copied().collect();
    let tags: Vec<String> = tag_stats
        .iter()
        .filter(|s| trending.contains(s.tag.to_lowercase().as_str()))
        .map(|s| s.tag.clone())
        .collect();
    if tags.is_empty() {
        return None;
    }

    Some(TagRecommendation::TrendingMatches {
        tags,
        reason: "You already write about these currently trending tags".to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostingTimeRecommendation {
    pub day: String,
    pub hour: u32,
    pub label: String,
    pub article_count: u64,
    pub avg_engagement: f64,
}

/// The best (day, hour) combinations, surfaced as they were ranked.
pub fn posting_time_recommendations(time_performance: &TimePerformance) -> Vec<PostingTimeRecommendation> {
    time_performance
        .best_combinations
        .iter()
        .filter_map(|slot| {
            let day = slot.day.clone()?;
            let hour = slot.hour?;
            Some(PostingTimeRecommendation {
                label: format!("{} {}", day, hour_label(hour)),
                day,
                hour,
                article_count: slot.article_count,
                avg_engagement: slot.avg_engagement,
            })
        })
        .collect()
}
