use crate::domain::model::RawClassifierOutput;
use crate::domain::ports::{ConfigProvider, ModelLoader, SentimentModel};
use crate::utils::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const WARMUP_TEXT: &str = "warm up";

/// 呼叫本機 text-classification 推論服務（Hugging Face inference 介面）
#[derive(Debug, Clone)]
pub struct HttpSentimentModel {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    name: String,
}

impl HttpSentimentModel {
    pub fn new(client: Client, endpoint: String, api_token: Option<String>, name: String) -> Self {
        Self {
            client,
            endpoint,
            api_token,
            name,
        }
    }
}

#[async_trait]
impl SentimentModel for HttpSentimentModel {
    async fn classify(&self, text: &str) -> Result<RawClassifierOutput> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "inputs": text }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        tracing::debug!("POST {} ({} chars)", self.endpoint, text.len());
        let response = request
            .send()
            .await
            .map_err(|e| TriageError::Classification {
                message: format!("Inference request failed: {}", e),
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TriageError::Classification {
                message: format!("Failed to read inference response: {}", e),
            })?;

        if !status.is_success() {
            return Err(TriageError::Classification {
                message: format!("Inference endpoint returned {}: {}", status, body.trim()),
            });
        }

        // 非 JSON 的回應交給 interpreter 退回 NEUTRAL
        let value = serde_json::from_str(&body).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Inference response is not JSON: {}", e);
            Value::Null
        });

        Ok(RawClassifierOutput(nest_flat_output(value)))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// `[{label, score}, ...]` 包成 `[[{label, score}, ...]]`，其他形狀原樣傳回
fn nest_flat_output(value: Value) -> Value {
    let is_flat = value
        .as_array()
        .and_then(|items| items.first())
        .is_some_and(Value::is_object);

    if is_flat {
        Value::Array(vec![value])
    } else {
        value
    }
}

/// 建立 HTTP client 並送出一次暖機推論，確認模型服務可用
#[derive(Debug, Clone)]
pub struct HttpModelLoader {
    endpoint: String,
    api_token: Option<String>,
    model_name: String,
    timeout: Duration,
}

impl HttpModelLoader {
    pub fn new(endpoint: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: None,
            model_name: model_name.into(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self {
            endpoint: config.model_endpoint().to_string(),
            api_token: config.api_token().map(str::to_string),
            model_name: config.model_name().to_string(),
            timeout: Duration::from_secs(config.timeout_seconds()),
        }
    }

    pub fn with_api_token(mut self, token: Option<String>) -> Self {
        self.api_token = token;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl ModelLoader for HttpModelLoader {
    async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| TriageError::ModelLoad {
                reason: format!("Failed to build HTTP client: {}", e),
            })?;

        let model = HttpSentimentModel::new(
            client,
            self.endpoint.clone(),
            self.api_token.clone(),
            self.model_name.clone(),
        );

        tracing::debug!("Warming up {} at {}", self.model_name, self.endpoint);
        model
            .classify(WARMUP_TEXT)
            .await
            .map_err(|e| TriageError::ModelLoad {
                reason: e.to_string(),
            })?;

        Ok(Arc::new(model))
    }
}
