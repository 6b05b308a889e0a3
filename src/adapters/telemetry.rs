use crate::domain::ports::{TelemetryEvent, TelemetrySink};
use crate::utils::error::Result;
use chrono::{SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinSet;

pub const APP_NAME: &str = "review-triage";

/// 附加在每筆事件上的執行環境資訊
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryMeta {
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub timestamp_client: String,
    pub model: String,
    pub app: String,
}

#[derive(Debug, Serialize)]
struct TelemetryRecord<'a> {
    #[serde(flatten)]
    event: &'a TelemetryEvent,
    meta: TelemetryMeta,
}

/// 以 POST 將事件送到記錄端點，不等待結果
#[derive(Debug, Clone)]
pub struct HttpTelemetrySink {
    client: Client,
    endpoint: String,
    model: String,
    in_flight: Arc<Mutex<JoinSet<()>>>,
}

impl HttpTelemetrySink {
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            model: model.into(),
            in_flight: Arc::new(Mutex::new(JoinSet::new())),
        }
    }

    pub fn meta(&self) -> TelemetryMeta {
        TelemetryMeta {
            user_agent: format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            language: std::env::var("LANG").unwrap_or_else(|_| "unknown".to_string()),
            platform: format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH),
            timestamp_client: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            model: self.model.clone(),
            app: APP_NAME.to_string(),
        }
    }

    /// 送出單筆事件並等待回應。`dispatch` 在背景呼叫它。
    pub async fn send(&self, event: &TelemetryEvent) -> Result<()> {
        let record = TelemetryRecord {
            event,
            meta: self.meta(),
        };
        let body = serde_json::to_string(&record)?;

        self.client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!("Telemetry event delivered to {}", self.endpoint);
        Ok(())
    }

    /// 結束程式前等待尚未送出的事件，最多等 `timeout`
    pub async fn flush(&self, timeout: Duration) {
        let mut pending = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
            std::mem::take(&mut *in_flight)
        };
        if pending.is_empty() {
            return;
        }

        let count = pending.len();
        let drained = tokio::time::timeout(timeout, async {
            while pending.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            tracing::warn!("⚠️ Gave up waiting for {} telemetry event(s)", count);
        }
    }
}

impl TelemetrySink for HttpTelemetrySink {
    fn dispatch(&self, event: TelemetryEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("⚠️ Logging skipped: no async runtime available");
            return;
        };

        let sink = self.clone();
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        // 清掉已完成的任務
        while in_flight.try_join_next().is_some() {}
        in_flight.spawn_on(
            async move {
                if let Err(e) = sink.send(&event).await {
                    tracing::warn!("⚠️ Logging failed: {}", e);
                }
            },
            &handle,
        );
    }
}

/// 未設定遙測端點時使用
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn dispatch(&self, event: TelemetryEvent) {
        tracing::debug!(
            "Telemetry disabled, dropping event ({})",
            event.sentiment.label
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::SentimentPayload;
    use httpmock::prelude::*;

    fn event() -> TelemetryEvent {
        TelemetryEvent {
            review: "The soup was cold".to_string(),
            sentiment: SentimentPayload {
                label: "NEGATIVE".to_string(),
                confidence: 0.88,
            },
        }
    }

    #[tokio::test]
    async fn test_send_posts_payload_as_plain_text() {
        let server = MockServer::start_async().await;
        let log_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/exec")
                    .header("Content-Type", "text/plain")
                    .body_contains("\"review\":\"The soup was cold\"")
                    .body_contains("\"label\":\"NEGATIVE\"")
                    .body_contains("\"confidence\":0.88")
                    .body_contains("\"userAgent\":")
                    .body_contains("\"app\":\"review-triage\"")
                    .body_contains("\"model\":\"distilbert-sst2\"");
                then.status(200);
            })
            .await;

        let sink = HttpTelemetrySink::new(server.url("/exec"), "distilbert-sst2");
        sink.send(&event()).await.unwrap();

        log_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_send_reports_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/exec");
                then.status(500);
            })
            .await;

        let sink = HttpTelemetrySink::new(server.url("/exec"), "m");
        assert!(sink.send(&event()).await.is_err());
    }

    #[tokio::test]
    async fn test_dispatch_does_not_block_or_fail() {
        // 沒有伺服器在監聽，錯誤只會被記錄
        let sink = HttpTelemetrySink::new("http://127.0.0.1:9/exec", "m");
        sink.dispatch(event());
        NoopTelemetry.dispatch(event());
        sink.flush(Duration::from_secs(5)).await;
    }

    #[tokio::test]
    async fn test_dispatch_then_flush_delivers() {
        let server = MockServer::start_async().await;
        let log_mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/exec");
                then.status(200);
            })
            .await;

        let sink = HttpTelemetrySink::new(server.url("/exec"), "m");
        sink.dispatch(event());
        sink.dispatch(event());
        sink.flush(Duration::from_secs(5)).await;

        log_mock.assert_hits_async(2).await;
    }

    #[test]
    fn test_meta_fields() {
        let meta = HttpTelemetrySink::new("http://localhost/exec", "distilbert-sst2").meta();
        assert_eq!(meta.app, APP_NAME);
        assert_eq!(meta.model, "distilbert-sst2");
        assert!(meta.timestamp_client.ends_with('Z'));
        assert!(meta.user_agent.starts_with("review-triage/"));
    }
}
