use crate::config::toml_config::TomlConfig;
use crate::config::Settings;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "review-triage")]
#[command(about = "Classify a random customer review and recommend a business action")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Tab-separated review file
    #[arg(long)]
    pub corpus_path: Option<String>,

    /// Column holding the review text
    #[arg(long)]
    pub text_column: Option<String>,

    /// Local text-classification endpoint
    #[arg(long)]
    pub model_endpoint: Option<String>,

    #[arg(long)]
    pub model_name: Option<String>,

    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Endpoint receiving analysis events
    #[arg(long)]
    pub telemetry_endpoint: Option<String>,

    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    /// Seed for review sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of analyses to run
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Press Enter to analyze a review, q to quit
    #[arg(short, long)]
    pub interactive: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Log CPU and memory usage")]
    pub monitor: bool,
}

impl CliConfig {
    /// 讀取 TOML（若有），再以命令列參數覆蓋
    pub fn resolve(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => TomlConfig::from_file(path)?.into_settings(),
            None => Settings::default(),
        };

        if let Some(path) = &self.corpus_path {
            settings.corpus_path = path.clone();
        }
        if let Some(column) = &self.text_column {
            settings.text_column = column.clone();
        }
        if let Some(endpoint) = &self.model_endpoint {
            settings.model_endpoint = endpoint.clone();
        }
        if let Some(name) = &self.model_name {
            settings.model_name = name.clone();
        }
        if let Some(token) = &self.api_token {
            settings.api_token = Some(token.clone());
        }
        if let Some(endpoint) = &self.telemetry_endpoint {
            settings.telemetry_endpoint = Some(endpoint.clone());
        }
        if let Some(timeout) = self.timeout_seconds {
            settings.timeout_seconds = timeout;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        settings.json_logs |= self.log_json;
        settings.monitor |= self.monitor;

        Ok(settings)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if !self.interactive {
            validation::validate_positive_number("count", self.count, 1)?;
        }
        Ok(())
    }
}
