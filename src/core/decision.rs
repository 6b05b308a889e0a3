//! 由分類結果決定商業動作。
//!
//! 規則依序比對，第一個符合者勝出。信心度落在 [0.4, 0.7) 的正負面評論
//! 會落到 NO_ACTION，這是產品目前的行為。

use crate::domain::model::{ActionCode, BusinessAction, ClassificationResult, Label};

pub const HIGH_CONFIDENCE: f64 = 0.7;
pub const LOW_CONFIDENCE: f64 = 0.4;

pub const OFFER_COUPON: BusinessAction = BusinessAction {
    code: ActionCode::OfferCoupon,
    message: "We're really sorry about your experience. Please accept a 50% discount for your next purchase as an apology.",
    color: "#e74c3c",
    emoji: "🚨",
};

pub const ASK_REFERRAL: BusinessAction = BusinessAction {
    code: ActionCode::AskReferral,
    message: "We're thrilled you enjoyed it! Refer a friend and earn rewards.",
    color: "#27ae60",
    emoji: "⭐",
};

pub const REQUEST_FEEDBACK: BusinessAction = BusinessAction {
    code: ActionCode::RequestFeedback,
    message: "We\u{2019}d love to understand your experience better. Please complete our short survey.",
    color: "#f39c12",
    emoji: "📝",
};

pub const NO_ACTION: BusinessAction = BusinessAction {
    code: ActionCode::NoAction,
    message: "Thank you for your feedback.",
    color: "#7f8c8d",
    emoji: "ℹ\u{fe0f}",
};

pub fn decide(result: &ClassificationResult) -> BusinessAction {
    let confidence = result.confidence();
    let high = (HIGH_CONFIDENCE..=1.0).contains(&confidence);

    match result.label() {
        Label::Negative if high => OFFER_COUPON,
        Label::Positive if high => ASK_REFERRAL,
        _ if confidence < LOW_CONFIDENCE => REQUEST_FEEDBACK,
        _ => NO_ACTION,
    }
}
