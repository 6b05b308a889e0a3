//! 將分類器的原始輸出正規化為 [`ClassificationResult`]。
//!
//! 預期格式為 `[[{"label": "POSITIVE", "score": 0.99}]]`。
//! 任何不符合的輸入都退回 `NEUTRAL / 0.5`，這個函式永遠不會失敗。

use crate::domain::model::{ClassificationResult, Label, RawClassifierOutput, SentimentBucket};
use serde_json::Value;

pub const FALLBACK_CONFIDENCE: f64 = 0.5;

pub fn normalize(raw: &RawClassifierOutput) -> ClassificationResult {
    let Some(record) = first_record(&raw.0) else {
        tracing::debug!("Unexpected classifier output shape, falling back to NEUTRAL");
        return ClassificationResult::new(Label::Neutral, FALLBACK_CONFIDENCE);
    };

    let label = record
        .get("label")
        .and_then(Value::as_str)
        .map(parse_label)
        .unwrap_or(Label::Neutral);

    let confidence = record
        .get("score")
        .and_then(Value::as_f64)
        .filter(|score| score.is_finite() && (0.0..=1.0).contains(score))
        .unwrap_or(FALLBACK_CONFIDENCE);

    ClassificationResult::new(label, confidence)
}

/// 顯示用分組：只有信心度超過 0.5 的正負面才算數
pub fn bucket(result: &ClassificationResult) -> SentimentBucket {
    match result.label() {
        Label::Positive if result.confidence() > 0.5 => SentimentBucket::Positive,
        Label::Negative if result.confidence() > 0.5 => SentimentBucket::Negative,
        _ => SentimentBucket::Neutral,
    }
}

fn first_record(value: &Value) -> Option<&serde_json::Map<String, Value>> {
    value
        .as_array()?
        .first()?
        .as_array()?
        .first()?
        .as_object()
}

fn parse_label(raw: &str) -> Label {
    match raw.to_uppercase().as_str() {
        "POSITIVE" => Label::Positive,
        "NEGATIVE" => Label::Negative,
        _ => Label::Neutral,
    }
}
