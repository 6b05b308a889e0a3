pub mod decision;
pub mod interpreter;
pub mod lifecycle;
pub mod orchestrator;

pub use crate::domain::model::{AnalysisOutcome, ClassificationResult, ModelState, RequestState};
pub use crate::domain::ports::{
    ConfigProvider, CorpusSupplier, ModelLoader, Presenter, SentimentModel, Storage, TelemetrySink,
};
pub use crate::utils::error::Result;
