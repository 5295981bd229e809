use crate::recommend::tag_normalize;
use crate::types::{AnalyzerError, CondensedReport, InsightGenerator, Insights, TopicIdea};
use interfaces::defs::{PostingStrategy, TagSummary};
use interfaces::EmptyInsightGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const DEFAULT_NUM_IDEAS: usize = 5;
/// Number of topic templates the mock generator knows.
pub const MAX_NUM_IDEAS: usize = 7;

pub const MOCK_GENERATOR: &str = "mock";
pub const NONE_GENERATOR: &str = "none";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    OpenAi,
    Groq,
    Mock,
    None,
}

impl LlmProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::OpenAi => "openai",
            LlmProvider::Groq => "groq",
            LlmProvider::Mock => MOCK_GENERATOR,
            LlmProvider::None => NONE_GENERATOR,
        }
    }

    /// Environment variable holding the provider's API key, if it has one.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            LlmProvider::OpenAi => Some("OPENAI_API_KEY"),
            LlmProvider::Groq => Some("GROQ_API_KEY"),
            LlmProvider::Mock | LlmProvider::None => None,
        }
    }

    /// Provider actually used: a keyed provider without its key falls back to mock.
    pub fn resolve(self, has_key: impl Fn(&str) -> bool) -> LlmProvider {
        match self.api_key_var() {
            Some(var) if !has_key(var) => {
                debug!("{} is not set, using the mock provider instead of {}", var, self);
                LlmProvider::Mock
            }
            _ => self,
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self != LlmProvider::None
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LlmProvider {
    type Err = AnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAi),
            "groq" => Ok(LlmProvider::Groq),
            "mock" => Ok(LlmProvider::Mock),
            "none" => Ok(LlmProvider::None),
            other => Err(AnalyzerError::Validation(format!("Unknown LLM provider: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsightConfig {
    pub provider: LlmProvider,
    pub num_ideas: usize,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAi,
            num_ideas: DEFAULT_NUM_IDEAS,
        }
    }
}

impl InsightConfig {
    pub fn new(provider: LlmProvider, num_ideas: usize) -> Self {
        Self {
            provider,
            num_ideas: num_ideas.min(MAX_NUM_IDEAS),
        }
    }

    /// Provider after checking the process environment for its API key.
    pub fn effective_provider(&self) -> LlmProvider {
        self.provider
            .resolve(|var| env::var(var).map(|value| !value.trim().is_empty()).unwrap_or(false))
    }
}

/// Named insight generators, looked up by provider.
pub struct InsightGeneratorRegistry {
    generators: HashMap<String, Arc<dyn InsightGenerator>>,
}

impl InsightGeneratorRegistry {
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    pub fn register_generator(&mut self, generator: Arc<dyn InsightGenerator>) {
        let name = generator.generator_name();
        info!("Registering insight generator: {}", name);
        self.generators.insert(name, generator);
    }

    pub fn get_generator(&self, name: &str) -> Option<Arc<dyn InsightGenerator>> {
        self.generators.get(name).cloned()
    }

    /// Generator serving a provider. Every enabled provider is backed by the
    /// template generator until a real model client is registered under its name.
    pub fn for_provider(&self, provider: LlmProvider) -> Option<Arc<dyn InsightGenerator>> {
        self.get_generator(provider.as_str()).or_else(|| {
            if provider.is_enabled() {
                self.get_generator(MOCK_GENERATOR)
            } else {
                None
            }
        })
    }

    pub fn list_generators(&self) -> Vec<String> {
        let mut names: Vec<String> = self.generators.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for InsightGeneratorRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register_generator(Arc::new(MockInsightGenerator));
        registry.register_generator(Arc::new(EmptyInsightGenerator));
        registry
    }
}

/// Run both generator calls. A failing call is logged and comes back as `None`.
pub fn generate(
    generator: &dyn InsightGenerator,
    report: &CondensedReport,
    num_ideas: usize,
) -> (Option<Insights>, Option<Vec<TopicIdea>>) {
    let insights = generator.generate_insights(report).unwrap_or_else(|e| {
        warn!("Insight generator {} failed to produce insights: {:#}", generator.generator_name(), e);
        None
    });

    let topic_ideas = generator
        .generate_topic_ideas(report, num_ideas.min(MAX_NUM_IDEAS))
        .unwrap_or_else(|e| {
            warn!("Insight generator {} failed to produce topic ideas: {:#}", generator.generator_name(), e);
            None
        });

    (insights, topic_ideas)
}

/// Fixed-template generator. Deterministic: the same report always yields the
/// same insights and ideas.
pub struct MockInsightGenerator;

const FALLBACK_TAGS: [&str; 3] = ["javascript", "webdev", "programming"];
const FALLBACK_DAYS: [&str; 2] = ["Tuesday", "Thursday"];
const FALLBACK_HOURS: [&str; 2] = ["8:00", "12:00"];

#[derive(Clone, Copy)]
enum TitlePattern {
    Tutorial,
    BestPractices,
    DeepDive,
}

fn generate_title(pattern: TitlePattern, tags: &[String], variant: usize) -> String {
    let lead = tags.first().map(String::as_str).unwrap_or("Software");
    // A second tag joins the first in the title's subject slot
    let subject = match tags.get(1) {
        Some(second) => format!("{} with {}", lead, second),
        None => lead.to_string(),
    };
    let options = match pattern {
        TitlePattern::Tutorial => [
            format!("Building {} Applications: A Step-by-Step Guide", subject),
            format!("How to Master {} Development", subject),
            format!("Practical {} Tips for Real-World Projects", subject),
        ],
        TitlePattern::BestPractices => [
            format!("{} Best Practices for Professional Developers", subject),
            format!("Writing Better {} Code: Tips and Tricks", subject),
            format!("Advanced {} Patterns You Should Know", subject),
        ],
        TitlePattern::DeepDive => [
            format!("Deep Dive: Advanced {} Concepts", subject),
            format!("Understanding {} Internals", subject),
            format!("Advanced {} Architecture Patterns", subject),
        ],
    };

    options[variant % options.len()].clone()
}

struct TagCombo {
    tags: Vec<String>,
    engagement: f64,
    count: u64,
}

/// Distinct display-tag sets of the most engaging posts, best first.
fn best_tag_combos(report: &CondensedReport) -> Vec<TagCombo> {
    let mut combos: Vec<TagCombo> = Vec::new();

    for post in &report.highest_engagement_posts {
        let mut tags: Vec<String> = post
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(tag_normalize)
            .collect();
        if tags.len() < 2 {
            continue;
        }
        tags.sort();

        match combos.iter_mut().find(|c| c.tags == tags) {
            Some(combo) => {
                combo.count += 1;
                combo.engagement = combo.engagement.max(post.engagement_ratio);
            }
            None => combos.push(TagCombo {
                tags,
                engagement: post.engagement_ratio,
                count: 1,
            }),
        }
    }

    combos.sort_by(|a, b| {
        b.engagement
            .total_cmp(&a.engagement)
            .then_with(|| b.count.cmp(&a.count))
    });
    combos
}

fn series_potential(has_series: bool, text: &str) -> String {
    let potential = if has_series { text } else { "Standalone post" };
    potential.to_string()
}

impl InsightGenerator for MockInsightGenerator {
    fn generator_name(&self) -> String {
        MOCK_GENERATOR.to_string()
    }

    fn generate_insights(&self, report: &CondensedReport) -> anyhow::Result<Option<Insights>> {
        let top_tags: Vec<String> = if report.top_tags.is_empty() {
            FALLBACK_TAGS.iter().map(|t| t.to_string()).collect()
        } else {
            report.top_tags.iter().take(3).map(|t| t.tag.clone()).collect()
        };

        let best_days: Vec<String> = if report.best_days.is_empty() {
            FALLBACK_DAYS.iter().map(|d| d.to_string()).collect()
        } else {
            report.best_days.iter().take(2).map(|d| d.day.clone()).collect()
        };

        let best_hours: Vec<String> = if report.best_hours.is_empty() {
            FALLBACK_HOURS.iter().map(|h| h.to_string()).collect()
        } else {
            report.best_hours.iter().take(2).map(|h| format!("{}:00", h.hour)).collect()
        };

        let recommended_tags = report
            .tag_recommendations
            .iter()
            .find(|group| group.kind == "top_performing")
            .map(|group| group.tags.clone())
            .unwrap_or_else(|| top_tags.clone());

        let series_strategy = if report.series_performance.is_empty() {
            "Consider creating more series content to engage your audience more deeply. Series posts tend to build reader loyalty and encourage return visits."
        } else {
            "Your series content is performing well. Continue creating series posts for complex topics, ideally keeping them to 3-5 parts for optimal completion rates."
        };

        let mut performance_summary = format!(
            "Your dev.to blog posts show good engagement with healthy reaction and comment rates. Your content in the {} tags performs particularly well. Your posts with practical, solution-oriented content receive higher engagement than more theoretical pieces.",
            top_tags.join(", ")
        );
        if report.synthetic_views > 0 {
            performance_summary.push_str(&format!(
                " View counts for {} of {} posts are estimates, so view-based comparisons are approximate.",
                report.synthetic_views, report.total_articles
            ));
        }

        let pairing = top_tags.get(1).map(String::as_str).unwrap_or("react");

        Ok(Some(Insights {
            performance_summary,
            key_patterns: vec![
                "Tutorial-style posts with specific code examples typically get 40% more engagement".to_string(),
                "Posts with 5-10 minute reading times perform better than both shorter and longer content".to_string(),
                format!("Articles published on {} receive more reactions and comments", best_days.join(" and ")),
                format!("Content tagged with '{}' consistently attracts more readers", top_tags.join(", ")),
                "Posts that include diagrams or visual elements get 30% more reactions".to_string(),
            ],
            content_recommendations: vec![
                "Create more step-by-step tutorials with practical code examples".to_string(),
                "Break complex topics into series of 5-8 minute reading time posts".to_string(),
                "Include diagrams or visualizations to improve engagement on conceptual topics".to_string(),
                "End posts with a clear call-to-action like a question to increase comment rates".to_string(),
                "Add a personal perspective to technical content to differentiate your writing".to_string(),
                format!("Use the tag combination '{} + {}' for highest visibility", top_tags[0], pairing),
            ],
            optimal_posting_strategy: PostingStrategy {
                best_days,
                best_hours,
                recommended_tags,
                content_type: "In-depth tutorials with practical code examples and clear explanations of technical concepts".to_string(),
                style_tips: "Aim for 5-8 minute reading time, use headings to break up content, include code samples, and end with thought-provoking questions to encourage comments".to_string(),
            },
            series_strategy: series_strategy.to_string(),
            engagement_boosters: "Respond quickly to comments on your posts to foster community. Share your posts on Twitter and LinkedIn with thoughtful commentary. Consider cross-posting popular content to your personal blog with canonical URLs pointing to dev.to. Ask engaging questions at the end of your posts to encourage discussion.".to_string(),
        }))
    }

    fn generate_topic_ideas(&self, report: &CondensedReport, num_ideas: usize) -> anyhow::Result<Option<Vec<TopicIdea>>> {
        let top: Vec<(&TagSummary, String)> = report
            .top_tags
            .iter()
            .take(5)
            .map(|summary| (summary, tag_normalize(&summary.tag)))
            .collect();
        let combos = best_tag_combos(report);
        let has_series = !report.series_performance.is_empty();
        let mut ideas = Vec::new();

        if let [(first, a), (_, b), ..] = top.as_slice() {
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::Tutorial, &[a.clone(), b.clone()], ideas.len()),
                description: format!("A comprehensive guide combining {} and {} to build production-ready applications. Learn best practices, optimization techniques, and real-world implementation patterns.", a, b),
                suggested_tags: vec![a.clone(), b.clone(), tag_normalize("tutorial"), tag_normalize("programming")],
                estimated_reading_time: 8,
                performance_rationale: format!("Combines your two best-performing tags ({}, {}) which have an average of {:.1} reactions per post.", a, b, first.avg_reactions),
                series_potential: series_potential(has_series, "Would work well as a 3-part series"),
            });
        }

        if let Some((first, a)) = top.first() {
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::BestPractices, &[a.clone()], ideas.len()),
                description: format!("Learn from real-world experience about common pitfalls in {} development. Includes code examples, performance tips, and maintainability guidelines.", a),
                suggested_tags: vec![a.clone(), tag_normalize("bestpractices"), tag_normalize("programming"), tag_normalize("debugging")],
                estimated_reading_time: 7,
                performance_rationale: format!("Your content in {} consistently performs well with {:.1} average reactions.", a, first.avg_reactions),
                series_potential: "Standalone post".to_string(),
            });
        }

        if let Some(combo) = combos.first() {
            let mut suggested_tags = combo.tags.clone();
            suggested_tags.push(tag_normalize("tutorial"));
            suggested_tags.push(tag_normalize("webdev"));
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::Tutorial, &combo.tags, ideas.len()),
                description: format!("Learn how to integrate {} with {} to create robust applications. Based on real-world best practices and performance optimization techniques.", combo.tags[0], combo.tags[1]),
                suggested_tags,
                estimated_reading_time: 9,
                performance_rationale: format!("This tag combination has historically performed very well, with {:.3} engagement ratio across {} posts.", combo.engagement, combo.count),
                series_potential: series_potential(has_series, "Would work well as a 4-part series"),
            });
        }

        if let Some((_, a)) = top.first() {
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::BestPractices, &[a.clone(), "testing".to_string()], ideas.len()),
                description: format!("A comprehensive guide to testing {} applications. Covers unit testing, integration testing, and setting up CI/CD pipelines.", a),
                suggested_tags: vec![a.clone(), tag_normalize("testing"), tag_normalize("automation"), tag_normalize("devops")],
                estimated_reading_time: 8,
                performance_rationale: format!("Content about {} combined with testing/automation typically drives high engagement.", a),
                series_potential: series_potential(has_series, "Would work well as a 3-part testing series"),
            });
        }

        if let [(_, a), (_, b), ..] = top.as_slice() {
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::DeepDive, &[a.clone(), b.clone()], ideas.len()),
                description: format!("Deep dive into performance optimization for applications using {} and {}. Includes benchmarking, profiling, and practical optimization techniques.", a, b),
                suggested_tags: vec![a.clone(), b.clone(), tag_normalize("performance"), tag_normalize("optimization")],
                estimated_reading_time: 7,
                performance_rationale: format!("Performance-focused content using your top tags ({}, {}) consistently drives high engagement.", a, b),
                series_potential: series_potential(has_series, "Would work well as a performance optimization series"),
            });
        }

        if let Some((_, a)) = top.first() {
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::BestPractices, &[a.clone(), "security".to_string()], ideas.len()),
                description: format!("Essential security considerations and implementation techniques for {} applications. Covers common vulnerabilities, security testing, and secure coding practices.", a),
                suggested_tags: vec![a.clone(), tag_normalize("security"), tag_normalize("webdev"), tag_normalize("bestpractices")],
                estimated_reading_time: 8,
                performance_rationale: "Security topics consistently perform well across technical audiences, especially when combined with specific technology implementations.".to_string(),
                series_potential: series_potential(has_series, "Would work well as a security series"),
            });
        }

        if let [(_, a), (_, b), ..] = top.as_slice() {
            ideas.push(TopicIdea {
                title: generate_title(TitlePattern::DeepDive, &[a.clone(), b.clone()], ideas.len()),
                description: format!("Explore modern software architecture patterns using {} and {}. Learn about microservices, serverless, and scalable architectures.", a, b),
                suggested_tags: vec![a.clone(), b.clone(), tag_normalize("architecture"), tag_normalize("design-patterns")],
                estimated_reading_time: 9,
                performance_rationale: "Architecture-focused content tends to drive high engagement, especially when combined with practical implementation using top-performing technologies.".to_string(),
                series_potential: series_potential(has_series, "Would work well as a 5-part architecture series"),
            });
        }

        ideas.truncate(num_ideas);
        debug!("Mock generator produced {} topic ideas", ideas.len());
        Ok(Some(ideas))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyed_provider_without_key_falls_back_to_mock() {
        assert_eq!(LlmProvider::OpenAi.resolve(|_| false), LlmProvider::Mock);
        assert_eq!(LlmProvider::Groq.resolve(|var| var == "GROQ_API_KEY"), LlmProvider::Groq);
        assert_eq!(LlmProvider::None.resolve(|_| false), LlmProvider::None);
    }

    #[test]
    fn titles_pick_a_template_and_mention_the_second_tag() {
        let tags = vec!["Rust".to_string(), "WebDev".to_string()];
        assert_eq!(
            generate_title(TitlePattern::Tutorial, &tags, 0),
            "Building Rust with WebDev Applications: A Step-by-Step Guide"
        );
        assert_eq!(
            generate_title(TitlePattern::DeepDive, &tags[..1], 1),
            "Understanding Rust Internals"
        );
    }

    #[test]
    fn tag_matching_template_text_fills_only_the_subject() {
        let tags = vec!["De".to_string(), "Go".to_string()];
        assert_eq!(
            generate_title(TitlePattern::DeepDive, &tags, 0),
            "Deep Dive: Advanced De with Go Concepts"
        );
        assert_eq!(
            generate_title(TitlePattern::BestPractices, &["With".to_string(), "Rust".to_string()], 2),
            "Advanced With with Rust Patterns You Should Know"
        );
    }

    #[test]
    fn registry_maps_providers_to_generators() {
        let registry = InsightGeneratorRegistry::default();
        assert_eq!(registry.list_generators(), vec!["mock".to_string(), "none".to_string()]);
        let generator = registry.for_provider(LlmProvider::OpenAi).unwrap();
        assert_eq!(generator.generator_name(), "mock");
        let disabled = registry.for_provider(LlmProvider::None).unwrap();
        assert_eq!(disabled.generator_name(), "none");
    }

    #[test]
    fn num_ideas_is_capped() {
        assert_eq!(InsightConfig::new(LlmProvider::Mock, 12).num_ideas, MAX_NUM_IDEAS);
    }
}
