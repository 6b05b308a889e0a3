pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{
    corpus::{ReviewCorpus, TsvCorpusLoader},
    http_model::{HttpModelLoader, HttpSentimentModel},
    presenter::ConsolePresenter,
    storage::LocalStorage,
    telemetry::{HttpTelemetrySink, NoopTelemetry},
};
pub use crate::config::Settings;
pub use crate::core::{
    decision::decide, interpreter::normalize, lifecycle::ModelManager,
    orchestrator::AnalysisOrchestrator,
};
pub use crate::utils::error::{Result, TriageError};
