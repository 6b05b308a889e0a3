// Adapters layer: concrete implementations for external systems (storage, corpus, model endpoint, telemetry, console).

pub mod corpus;
pub mod http_model;
pub mod presenter;
pub mod storage;
pub mod telemetry;
