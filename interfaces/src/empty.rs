use anyhow::Result;

use crate::defs::CondensedReport;
use crate::defs::InsightGenerator;
use crate::defs::Insights;
use crate::defs::TopicIdea;

pub struct EmptyInsightGenerator;

impl InsightGenerator for EmptyInsightGenerator {
    fn generator_name(&self) -> String {
        "none".to_owned()
    }
    fn generate_insights(&self, _report: &CondensedReport) -> Result<Option<Insights>> {
        // Insights are switched off; nothing to say.
        Ok(None)
    }
    fn generate_topic_ideas(&self, _report: &CondensedReport, _num_ideas: usize) -> Result<Option<Vec<TopicIdea>>> {
        Ok(None)
    }
}
