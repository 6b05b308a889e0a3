use crate::domain::model::ModelState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Model load failed: {reason}")]
    ModelLoad { reason: String },

    #[error("Model is not ready (state: {state})")]
    ModelNotReady { state: ModelState },

    #[error("Model initialization already in progress")]
    ModelBusy,

    #[error("No reviews available in corpus")]
    NoData,

    #[error("Classification failed: {message}")]
    Classification { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

/// 錯誤分類，用於日誌與告警
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Model,
    Data,
    Inference,
    Network,
    Io,
    Configuration,
}

/// 錯誤嚴重程度，決定 CLI 的退出碼
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TriageError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TriageError::ModelLoad { .. }
            | TriageError::ModelNotReady { .. }
            | TriageError::ModelBusy => ErrorCategory::Model,
            TriageError::NoData | TriageError::CsvError(_) => ErrorCategory::Data,
            TriageError::Classification { .. } | TriageError::SerializationError(_) => {
                ErrorCategory::Inference
            }
            TriageError::HttpError(_) => ErrorCategory::Network,
            TriageError::IoError(_) => ErrorCategory::Io,
            TriageError::ConfigError { .. }
            | TriageError::InvalidConfigValueError { .. }
            | TriageError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TriageError::ModelBusy => ErrorSeverity::Low,
            TriageError::ModelNotReady { .. }
            | TriageError::NoData
            | TriageError::Classification { .. }
            | TriageError::HttpError(_) => ErrorSeverity::Medium,
            TriageError::ModelLoad { .. }
            | TriageError::CsvError(_)
            | TriageError::IoError(_)
            | TriageError::SerializationError(_) => ErrorSeverity::High,
            TriageError::ConfigError { .. }
            | TriageError::InvalidConfigValueError { .. }
            | TriageError::MissingConfigError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 等待或重新觸發即可能成功的錯誤
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TriageError::ModelNotReady { .. }
                | TriageError::Classification { .. }
                | TriageError::HttpError(_)
        )
    }

    /// 顯示給終端使用者的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            TriageError::ModelLoad { .. } => "Failed to load sentiment model. Please check your network connection and try again.".to_string(),
            TriageError::ModelNotReady {
                state: ModelState::Failed,
            } => "Sentiment model failed to load. Restart the application to try again.".to_string(),
            TriageError::ModelNotReady { .. } => {
                "Sentiment model is not ready yet. Please wait a moment.".to_string()
            }
            TriageError::ModelBusy => "Sentiment model is already loading.".to_string(),
            TriageError::NoData => "No reviews available. Please try again later.".to_string(),
            TriageError::Classification { message } => message.clone(),
            TriageError::CsvError(e) => format!("Failed to parse TSV file: {}", e),
            TriageError::IoError(e) => format!("Failed to load TSV file: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Model => "Make sure the local inference server is running and reachable, then restart",
            ErrorCategory::Data => "Check that the corpus file exists, is tab-separated and has a text column",
            ErrorCategory::Inference => "Run the analysis again",
            ErrorCategory::Network => "Check network connectivity to the configured endpoints",
            ErrorCategory::Io => "Check file paths and permissions",
            ErrorCategory::Configuration => "Fix the configuration value and run again",
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
