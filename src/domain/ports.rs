use crate::domain::model::{AnalysisOutcome, RawClassifierOutput, ReviewItem};
use crate::utils::error::{Result, TriageError};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn corpus_path(&self) -> &str;
    fn text_column(&self) -> &str;
    fn model_endpoint(&self) -> &str;
    fn model_name(&self) -> &str;
    fn api_token(&self) -> Option<&str>;
    fn telemetry_endpoint(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
}

/// 語料來源：同步取得目前可用的評論快照，可能為空
pub trait CorpusSupplier: Send + Sync {
    fn items(&self) -> Arc<[ReviewItem]>;
}

/// 已載入、可重複呼叫的分類模型
#[async_trait]
pub trait SentimentModel: Send + Sync {
    async fn classify(&self, text: &str) -> Result<RawClassifierOutput>;

    fn name(&self) -> &str;
}

/// 負責建立模型實例，僅由 `ModelManager` 呼叫一次
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn SentimentModel>>;
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentPayload {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TelemetryEvent {
    pub review: String,
    pub sentiment: SentimentPayload,
}

impl From<&AnalysisOutcome> for TelemetryEvent {
    fn from(outcome: &AnalysisOutcome) -> Self {
        Self {
            review: outcome.review.text().to_string(),
            sentiment: SentimentPayload {
                label: outcome.classification.label().as_str().to_string(),
                confidence: outcome.classification.confidence(),
            },
        }
    }
}

/// 遙測出口。`dispatch` 不得阻塞呼叫者，失敗只記錄日誌。
pub trait TelemetrySink: Send + Sync {
    fn dispatch(&self, event: TelemetryEvent);
}

/// 呈現層邊界
pub trait Presenter: Send + Sync {
    fn render_outcome(&self, outcome: &AnalysisOutcome);
    fn render_error(&self, error: &TriageError);
}
