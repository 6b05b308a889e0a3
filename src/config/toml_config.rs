use crate::config::Settings;
use crate::utils::error::{Result, TriageError};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    pub app: Option<AppConfig>,
    pub model: Option<ModelConfig>,
    pub corpus: Option<CorpusConfig>,
    pub telemetry: Option<TelemetryConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    pub endpoint: Option<String>,
    pub name: Option<String>,
    pub api_token: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusConfig {
    pub path: Option<String>,
    pub text_column: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub enabled: Option<bool>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(TriageError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| TriageError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HF_API_TOKEN})，找不到的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| TriageError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 以預設值為底，套用檔案中的設定
    pub fn into_settings(self) -> Settings {
        let mut settings = Settings::default();

        if let Some(app) = self.app {
            settings.seed = app.seed;
        }

        if let Some(model) = self.model {
            if let Some(endpoint) = model.endpoint {
                settings.model_endpoint = endpoint;
            }
            if let Some(name) = model.name {
                settings.model_name = name;
            }
            if let Some(timeout) = model.timeout_seconds {
                settings.timeout_seconds = timeout;
            }
            // 未被替換的 ${VAR} 視為沒有設定 token
            settings.api_token = model
                .api_token
                .filter(|token| !token.trim().is_empty() && !token.starts_with("${"));
        }

        if let Some(corpus) = self.corpus {
            if let Some(path) = corpus.path {
                settings.corpus_path = path;
            }
            if let Some(column) = corpus.text_column {
                settings.text_column = column;
            }
        }

        if let Some(telemetry) = self.telemetry {
            if telemetry.enabled.unwrap_or(true) {
                settings.telemetry_endpoint = telemetry.endpoint;
            }
        }

        if let Some(monitoring) = self.monitoring {
            settings.monitor = monitoring.enabled;
            settings.json_logs = monitoring.json_logs.unwrap_or(false);
        }

        settings
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.clone().into_settings().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[app]
seed = 42

[model]
endpoint = "http://127.0.0.1:8080/predict"
name = "sst2"
timeout_seconds = 15

[corpus]
path = "data/reviews_test.tsv"
text_column = "review"

[telemetry]
endpoint = "https://logs.example.com/exec"

[monitoring]
enabled = true
json_logs = true
"#;

        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .into_settings();

        assert_eq!(settings.seed, Some(42));
        assert_eq!(settings.model_name, "sst2");
        assert_eq!(settings.timeout_seconds, 15);
        assert_eq!(settings.corpus_path, "data/reviews_test.tsv");
        assert_eq!(settings.text_column, "review");
        assert_eq!(
            settings.telemetry_endpoint.as_deref(),
            Some("https://logs.example.com/exec")
        );
        assert!(settings.monitor);
        assert!(settings.json_logs);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let settings = TomlConfig::from_toml_str("").unwrap().into_settings();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_disabled_telemetry() {
        let toml_content = r#"
[telemetry]
enabled = false
endpoint = "https://logs.example.com/exec"
"#;
        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .into_settings();
        assert!(settings.telemetry_endpoint.is_none());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("REVIEW_TRIAGE_TEST_TOKEN", "hf_abc123");

        let toml_content = r#"
[model]
api_token = "${REVIEW_TRIAGE_TEST_TOKEN}"
"#;

        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .into_settings();
        assert_eq!(settings.api_token.as_deref(), Some("hf_abc123"));

        std::env::remove_var("REVIEW_TRIAGE_TEST_TOKEN");
    }

    #[test]
    fn test_unresolved_token_is_dropped() {
        let toml_content = r#"
[model]
api_token = "${REVIEW_TRIAGE_SURELY_UNSET_VAR}"
"#;
        let settings = TomlConfig::from_toml_str(toml_content)
            .unwrap()
            .into_settings();
        assert!(settings.api_token.is_none());
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[model]
endpoint = "invalid-url"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[corpus]\npath = \"file-test.tsv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.into_settings().corpus_path, "file-test.tsv");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            TomlConfig::from_toml_str("[model\nendpoint = 1"),
            Err(TriageError::ConfigError { .. })
        ));
    }
}
