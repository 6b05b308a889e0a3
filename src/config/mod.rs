#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL_ENDPOINT: &str = "http://127.0.0.1:8080/predict";
pub const DEFAULT_MODEL_NAME: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// 合併 CLI 與 TOML 後、實際生效的設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub corpus_path: String,
    pub text_column: String,
    pub model_endpoint: String,
    pub model_name: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub telemetry_endpoint: Option<String>,
    pub timeout_seconds: u64,
    pub seed: Option<u64>,
    pub json_logs: bool,
    pub monitor: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            corpus_path: "reviews_test.tsv".to_string(),
            text_column: "text".to_string(),
            model_endpoint: DEFAULT_MODEL_ENDPOINT.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
            api_token: None,
            telemetry_endpoint: None,
            timeout_seconds: 30,
            seed: None,
            json_logs: false,
            monitor: false,
        }
    }
}

impl ConfigProvider for Settings {
    fn corpus_path(&self) -> &str {
        &self.corpus_path
    }

    fn text_column(&self) -> &str {
        &self.text_column
    }

    fn model_endpoint(&self) -> &str {
        &self.model_endpoint
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    fn telemetry_endpoint(&self) -> Option<&str> {
        self.telemetry_endpoint.as_deref()
    }

    fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_path("corpus.path", &self.corpus_path)?;
        validation::validate_non_empty_string("corpus.text_column", &self.text_column)?;
        validation::validate_url("model.endpoint", &self.model_endpoint)?;
        validation::validate_non_empty_string("model.name", &self.model_name)?;
        validation::validate_range("model.timeout_seconds", self.timeout_seconds, 1, 600)?;
        if let Some(endpoint) = &self.telemetry_endpoint {
            validation::validate_url("telemetry.endpoint", endpoint)?;
        }
        Ok(())
    }
}
