use crate::fetcher::{fetch_articles, fetch_detailed_articles, fetch_follower_count, fetch_user_profile, DevToClient};
use crate::llm_adapter::{generate, InsightConfig, InsightGeneratorRegistry};
use crate::report::Report;
use crate::store::ArticleStore;
use crate::traits::ArticleSource;
use crate::types::{AnalyzerError, CondensedReport, FetchConfig, Insights, Result, TopicIdea, UserProfile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches one author's articles and turns them into a report.
pub struct DevToAnalyzer {
    source: Arc<dyn ArticleSource>,
    config: FetchConfig,
}

impl DevToAnalyzer {
    /// Analyzer backed by the live dev.to API.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = DevToClient::new(&config)?;
        Ok(Self {
            source: Arc::new(client),
            config,
        })
    }

    pub fn with_source(source: Arc<dyn ArticleSource>, config: FetchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Page through the article list, fetch every detail and normalize the
    /// result. Only a failure on the very first page is an error.
    pub async fn collect_articles(&self, username: &str) -> Result<ArticleStore> {
        let username = validate_username(username)?;
        let source = self.source.as_ref();

        let outcome = fetch_articles(source, username, self.config.max_pages, self.config.per_page).await;
        if outcome.failed_on_first_page() {
            let reason = outcome.error.unwrap_or_default();
            return Err(AnalyzerError::UpstreamUnavailable(format!(
                "could not list articles for {}: {}",
                username, reason
            )));
        }
        if let Some(error) = &outcome.error {
            warn!(
                "Article list for {} is partial after {} pages: {}",
                username, outcome.pages_fetched, error
            );
        }

        let detailed = fetch_detailed_articles(source, &outcome.items).await;
        let store = ArticleStore::from_payloads(detailed, self.config.synthesize_views);

        if store.synthetic_view_count() > 0 {
            warn!(
                "{} of {} articles for {} have synthesized view counts",
                store.synthetic_view_count(),
                store.len(),
                username
            );
        }

        Ok(store)
    }

    /// Best-effort profile. The follower count is only filled in when the API
    /// key belongs to the analyzed author.
    pub async fn collect_profile(&self, username: &str) -> Option<UserProfile> {
        let source = self.source.as_ref();
        let mut profile = fetch_user_profile(source, username).await?;
        profile.follower_count = fetch_follower_count(source, username).await;
        Some(profile)
    }

    pub async fn analyze(&self, username: &str) -> Result<Report> {
        let username = validate_username(username)?;
        info!("Starting analysis of {} via {}", username, self.source.source_name());

        let store = self.collect_articles(username).await?;
        let profile = self.collect_profile(username).await;

        Ok(Report::build(username, store, profile))
    }
}

/// Trimmed username, or a validation error when it is blank.
pub fn validate_username(username: &str) -> Result<&str> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(AnalyzerError::Validation("username must not be empty".to_string()));
    }
    Ok(trimmed)
}

/// Everything one run hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub username: String,
    pub report: Report,
    pub condensed: CondensedReport,
    pub insights: Option<Insights>,
    pub topic_ideas: Option<Vec<TopicIdea>>,
    pub llm_enabled: bool,
    pub llm_provider: String,
}

/// Analyze an author and, unless insights are disabled, run the selected
/// insight generator over the condensed report.
pub async fn run_analysis(
    analyzer: &DevToAnalyzer,
    username: &str,
    insight_config: &InsightConfig,
    registry: &InsightGeneratorRegistry,
) -> Result<AnalysisOutcome> {
    let report = analyzer.analyze(username).await?;
    let condensed = report.condense();

    let provider = insight_config.effective_provider();
    let (insights, topic_ideas) = match registry.for_provider(provider) {
        Some(generator) if provider.is_enabled() => {
            info!("Generating insights with {} ({})", generator.generator_name(), provider);
            generate(generator.as_ref(), &condensed, insight_config.num_ideas)
        }
        _ => (None, None),
    };

    Ok(AnalysisOutcome {
        username: report.username.clone(),
        report,
        condensed,
        insights,
        topic_ideas,
        llm_enabled: provider.is_enabled(),
        llm_provider: provider.to_string(),
    })
}
