pub mod types;
pub mod traits;
pub mod parser;
pub mod fetcher;
pub mod store;
pub mod series;
pub mod metrics;
pub mod recommend;
pub mod report;
pub mod llm_adapter;
pub mod analyzer;
pub mod utils;

pub use types::*;
pub use traits::ArticleSource;
pub use parser::{ArticleParser, RawArticle};
pub use fetcher::DevToClient;
pub use store::ArticleStore;
pub use series::{Series, SeriesPerformance, SeriesSet};
pub use metrics::{ArticleMetrics, Metrics, RankMetric, TagStat, TimePerformance, TimeSlot};
pub use recommend::{tag_normalize, TagRecommendation};
pub use report::{condense, export_report_to_json, Report};
pub use llm_adapter::{InsightConfig, InsightGeneratorRegistry, LlmProvider, MockInsightGenerator};
pub use analyzer::{run_analysis, AnalysisOutcome, DevToAnalyzer};
