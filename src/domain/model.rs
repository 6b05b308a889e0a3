use serde::{Deserialize, Serialize};
use std::fmt;

/// 推論模型的載入狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ModelState {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl fmt::Display for ModelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ModelState::Unloaded => "unloaded",
            ModelState::Loading => "loading",
            ModelState::Ready => "ready",
            ModelState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// 單次分析請求的生命週期。Completed 與 Failed 只是過渡狀態，結束後回到 Idle。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RequestState {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

/// 語料中的一則評論，內容不可為空白
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReviewItem(String);

impl ReviewItem {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self(text))
        }
    }

    pub fn text(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReviewItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 分類器回傳的原始資料，未經驗證
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RawClassifierOutput(pub serde_json::Value);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Label {
    Positive,
    Negative,
    Neutral,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Positive => "POSITIVE",
            Label::Negative => "NEGATIVE",
            Label::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 正規化後的分類結果。只能由 `core::interpreter` 建立。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassificationResult {
    label: Label,
    confidence: f64,
}

impl ClassificationResult {
    /// confidence 必須已落在 [0, 1]
    pub(crate) fn new(label: Label, confidence: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&confidence));
        Self { label, confidence }
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

/// 顯示用的情緒分組
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentBucket {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionCode {
    OfferCoupon,
    AskReferral,
    RequestFeedback,
    NoAction,
}

impl ActionCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCode::OfferCoupon => "OFFER_COUPON",
            ActionCode::AskReferral => "ASK_REFERRAL",
            ActionCode::RequestFeedback => "REQUEST_FEEDBACK",
            ActionCode::NoAction => "NO_ACTION",
        }
    }
}

impl fmt::Display for ActionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 決策引擎輸出的商業動作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusinessAction {
    pub code: ActionCode,
    pub message: &'static str,
    pub color: &'static str,
    pub emoji: &'static str,
}

/// 一次成功分析的完整結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub review: ReviewItem,
    pub classification: ClassificationResult,
    pub action: BusinessAction,
}
