use crate::core::interpreter::bucket;
use crate::domain::model::{AnalysisOutcome, SentimentBucket};
use crate::domain::ports::Presenter;
use crate::utils::error::TriageError;

/// 把分析結果輸出到終端機
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsolePresenter;

impl ConsolePresenter {
    pub fn format_outcome(outcome: &AnalysisOutcome) -> String {
        let sentiment = match bucket(&outcome.classification) {
            SentimentBucket::Positive => "positive",
            SentimentBucket::Negative => "negative",
            SentimentBucket::Neutral => "neutral",
        };

        format!(
            "📝 Review: {}\n🔎 Sentiment: {} ({:.1}% confidence) [{}]\n{} {}\n👉 Action: {}",
            outcome.review,
            outcome.classification.label(),
            outcome.classification.confidence() * 100.0,
            sentiment,
            outcome.action.emoji,
            outcome.action.message,
            outcome.action.code,
        )
    }
}

impl Presenter for ConsolePresenter {
    fn render_outcome(&self, outcome: &AnalysisOutcome) {
        println!("{}", Self::format_outcome(outcome));
        println!();
    }

    fn render_error(&self, error: &TriageError) {
        eprintln!("❌ {}", error.user_friendly_message());
    }
}
