use crate::core::decision::decide;
use crate::core::interpreter::normalize;
use crate::core::lifecycle::ModelManager;
use crate::domain::model::{AnalysisOutcome, RequestState, ReviewItem};
use crate::domain::ports::{CorpusSupplier, Presenter, SentimentModel, TelemetryEvent, TelemetrySink};
use crate::utils::error::{Result, TriageError};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

/// 串接語料、模型、解讀、決策與遙測，一次只允許一個分析請求。
pub struct AnalysisOrchestrator {
    models: Arc<ModelManager>,
    corpus: Arc<dyn CorpusSupplier>,
    telemetry: Arc<dyn TelemetrySink>,
    presenter: Arc<dyn Presenter>,
    rng: Mutex<StdRng>,
    request: Mutex<RequestState>,
    request_tx: watch::Sender<RequestState>,
}

/// 請求結束時（包含提早返回）把狀態送回 Idle
struct RequestGuard<'a> {
    owner: &'a AnalysisOrchestrator,
    terminal: RequestState,
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.owner.transition(self.terminal);
        self.owner.transition(RequestState::Idle);
    }
}

impl AnalysisOrchestrator {
    pub fn new(
        models: Arc<ModelManager>,
        corpus: Arc<dyn CorpusSupplier>,
        telemetry: Arc<dyn TelemetrySink>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        let (request_tx, _) = watch::channel(RequestState::Idle);
        Self {
            models,
            corpus,
            telemetry,
            presenter,
            rng: Mutex::new(StdRng::from_entropy()),
            request: Mutex::new(RequestState::Idle),
            request_tx,
        }
    }

    /// 固定亂數種子，讓抽樣可重現
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    pub fn request_state(&self) -> RequestState {
        *lock(&self.request)
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestState> {
        self.request_tx.subscribe()
    }

    /// 隨機抽一則評論並完成整條分析流程。
    ///
    /// 已有請求執行中時回傳 `Ok(None)`，不排隊也不報錯。
    pub async fn run_analysis(&self) -> Result<Option<AnalysisOutcome>> {
        let (review, model, mut guard) = match self.begin() {
            Ok(Some(started)) => started,
            Ok(None) => {
                tracing::debug!("Analysis already running, ignoring request");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("⚠️ Analysis not started: {}", e);
                self.presenter.render_error(&e);
                return Err(e);
            }
        };

        tracing::info!(
            "🔍 Analyzing review with {} ({} chars)",
            model.name(),
            review.text().chars().count()
        );

        let raw = match model.classify(review.text()).await {
            Ok(raw) => raw,
            Err(e) => {
                let err = match e {
                    TriageError::Classification { .. } => e,
                    other => TriageError::Classification {
                        message: other.to_string(),
                    },
                };
                drop(guard);
                tracing::error!("❌ Classification failed: {}", err);
                self.presenter.render_error(&err);
                return Err(err);
            }
        };

        let classification = normalize(&raw);
        let action = decide(&classification);
        let outcome = AnalysisOutcome {
            review,
            classification,
            action,
        };

        guard.terminal = RequestState::Completed;
        drop(guard);

        tracing::info!(
            "✅ {} ({:.1}% confidence) -> {}",
            outcome.classification.label(),
            outcome.classification.confidence() * 100.0,
            outcome.action.code
        );

        self.presenter.render_outcome(&outcome);
        self.telemetry.dispatch(TelemetryEvent::from(&outcome));

        Ok(Some(outcome))
    }

    /// 在同一個臨界區內檢查並設為 Running
    #[allow(clippy::type_complexity)]
    fn begin(&self) -> Result<Option<(ReviewItem, Arc<dyn SentimentModel>, RequestGuard<'_>)>> {
        let mut request = lock(&self.request);
        if *request == RequestState::Running {
            return Ok(None);
        }

        let items = self.corpus.items();
        if items.is_empty() {
            return Err(TriageError::NoData);
        }

        let model = self.models.ready_model()?;

        let review = items
            .choose(&mut *lock(&self.rng))
            .cloned()
            .ok_or(TriageError::NoData)?;

        *request = RequestState::Running;
        self.request_tx.send_replace(RequestState::Running);
        drop(request);

        Ok(Some((
            review,
            model,
            RequestGuard {
                owner: self,
                terminal: RequestState::Failed,
            },
        )))
    }

    fn transition(&self, next: RequestState) {
        *lock(&self.request) = next;
        self.request_tx.send_replace(next);
        tracing::debug!("Analysis request -> {:?}", next);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{ActionCode, Label, ModelState, RawClassifierOutput};
    use crate::domain::ports::ModelLoader;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct StaticCorpus(Arc<[ReviewItem]>);

    impl StaticCorpus {
        fn new(texts: &[&str]) -> Self {
            Self(
                texts
                    .iter()
                    .filter_map(|t| ReviewItem::new(*t))
                    .collect::<Vec<_>>()
                    .into(),
            )
        }
    }

    impl CorpusSupplier for StaticCorpus {
        fn items(&self) -> Arc<[ReviewItem]> {
            Arc::clone(&self.0)
        }
    }

    struct MockModel {
        output: serde_json::Value,
        fail: bool,
        calls: AtomicUsize,
        gate: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl SentimentModel for MockModel {
        async fn classify(&self, _text: &str) -> Result<RawClassifierOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail {
                return Err(TriageError::Classification {
                    message: "inference crashed".to_string(),
                });
            }
            Ok(RawClassifierOutput(self.output.clone()))
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    struct MockLoader(Arc<MockModel>);

    #[async_trait]
    impl ModelLoader for MockLoader {
        async fn load(&self) -> Result<Arc<dyn SentimentModel>> {
            Ok(self.0.clone())
        }
    }

    #[derive(Default)]
    struct RecordingPresenter {
        outcomes: Mutex<Vec<AnalysisOutcome>>,
        errors: Mutex<Vec<String>>,
    }

    impl Presenter for RecordingPresenter {
        fn render_outcome(&self, outcome: &AnalysisOutcome) {
            self.outcomes.lock().unwrap().push(outcome.clone());
        }

        fn render_error(&self, error: &TriageError) {
            self.errors.lock().unwrap().push(error.user_friendly_message());
        }
    }

    #[derive(Default)]
    struct RecordingTelemetry(Mutex<Vec<TelemetryEvent>>);

    impl TelemetrySink for RecordingTelemetry {
        fn dispatch(&self, event: TelemetryEvent) {
            self.0.lock().unwrap().push(event);
        }
    }

    struct Harness {
        orchestrator: AnalysisOrchestrator,
        models: Arc<ModelManager>,
        model: Arc<MockModel>,
        presenter: Arc<RecordingPresenter>,
        telemetry: Arc<RecordingTelemetry>,
    }

    fn model(output: serde_json::Value) -> MockModel {
        MockModel {
            output,
            fail: false,
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn harness(texts: &[&str], model: MockModel) -> Harness {
        let model = Arc::new(model);
        let models = Arc::new(ModelManager::new(Box::new(MockLoader(model.clone()))));
        let presenter = Arc::new(RecordingPresenter::default());
        let telemetry = Arc::new(RecordingTelemetry::default());
        let orchestrator = AnalysisOrchestrator::new(
            models.clone(),
            Arc::new(StaticCorpus::new(texts)),
            telemetry.clone(),
            presenter.clone(),
        )
        .with_seed(7);

        Harness {
            orchestrator,
            models,
            model,
            presenter,
            telemetry,
        }
    }

    #[tokio::test]
    async fn test_successful_analysis_emits_outcome_and_telemetry() {
        let h = harness(
            &["Terrible, never again."],
            model(serde_json::json!([[{"label": "NEGATIVE", "score": 0.92}]])),
        );
        h.models.initialize().await.unwrap();

        let outcome = h.orchestrator.run_analysis().await.unwrap().unwrap();

        assert_eq!(outcome.review.text(), "Terrible, never again.");
        assert_eq!(outcome.classification.label(), Label::Negative);
        assert_eq!(outcome.action.code, ActionCode::OfferCoupon);
        assert_eq!(h.orchestrator.request_state(), RequestState::Idle);

        assert_eq!(h.presenter.outcomes.lock().unwrap().len(), 1);
        let events = h.telemetry.0.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].review, "Terrible, never again.");
        assert_eq!(events[0].sentiment.label, "NEGATIVE");
        assert_eq!(events[0].sentiment.confidence, 0.92);
    }

    #[tokio::test]
    async fn test_empty_corpus_fails_with_no_data() {
        let h = harness(&[], model(serde_json::json!([])));

        let err = h.orchestrator.run_analysis().await.unwrap_err();

        assert!(matches!(err, TriageError::NoData));
        assert_eq!(h.models.state(), ModelState::Unloaded);
        assert_eq!(h.orchestrator.request_state(), RequestState::Idle);
        assert_eq!(
            h.presenter.errors.lock().unwrap().as_slice(),
            ["No reviews available. Please try again later."]
        );
    }

    #[tokio::test]
    async fn test_analysis_before_model_ready() {
        let h = harness(&["Fine."], model(serde_json::json!([])));
        let mut rx = h.orchestrator.subscribe();

        let err = h.orchestrator.run_analysis().await.unwrap_err();

        assert!(matches!(
            err,
            TriageError::ModelNotReady {
                state: ModelState::Unloaded
            }
        ));
        assert_eq!(h.model.calls.load(Ordering::SeqCst), 0);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_classification_failure_resets_to_idle() {
        let mut failing = model(serde_json::json!([]));
        failing.fail = true;
        let h = harness(&["Meh."], failing);
        h.models.initialize().await.unwrap();

        let err = h.orchestrator.run_analysis().await.unwrap_err();

        assert!(matches!(err, TriageError::Classification { .. }));
        assert_eq!(h.orchestrator.request_state(), RequestState::Idle);
        assert!(h.presenter.outcomes.lock().unwrap().is_empty());
        assert!(h.telemetry.0.lock().unwrap().is_empty());
        assert_eq!(
            h.presenter.errors.lock().unwrap().as_slice(),
            ["inference crashed"]
        );

        // 失敗後可以再次觸發
        assert!(h.orchestrator.run_analysis().await.is_err());
        assert_eq!(h.model.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_malformed_output_still_produces_action() {
        let h = harness(&["???"], model(serde_json::json!({"unexpected": true})));
        h.models.initialize().await.unwrap();

        let outcome = h.orchestrator.run_analysis().await.unwrap().unwrap();

        assert_eq!(outcome.classification.label(), Label::Neutral);
        assert_eq!(outcome.classification.confidence(), 0.5);
        assert_eq!(outcome.action.code, ActionCode::NoAction);
    }

    #[tokio::test]
    async fn test_second_request_while_running_is_ignored() {
        let gate = Arc::new(Notify::new());
        let mut gated = model(serde_json::json!([[{"label": "POSITIVE", "score": 0.85}]]));
        gated.gate = Some(gate.clone());
        let h = harness(&["Loved it!"], gated);
        h.models.initialize().await.unwrap();

        let first = h.orchestrator.run_analysis();
        let second = async {
            tokio::task::yield_now().await;
            assert_eq!(h.orchestrator.request_state(), RequestState::Running);
            let ignored = h.orchestrator.run_analysis().await;
            gate.notify_one();
            ignored
        };

        let (first, second) = tokio::join!(first, second);

        assert!(matches!(second, Ok(None)));
        let outcome = first.unwrap().unwrap();
        assert_eq!(outcome.action.code, ActionCode::AskReferral);
        assert_eq!(h.model.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.presenter.outcomes.lock().unwrap().len(), 1);
        assert_eq!(h.orchestrator.request_state(), RequestState::Idle);
    }

    #[tokio::test]
    async fn test_selection_covers_corpus() {
        let texts = ["one", "two", "three"];
        let h = harness(
            &texts,
            model(serde_json::json!([[{"label": "POSITIVE", "score": 0.5}]])),
        );
        h.models.initialize().await.unwrap();

        let mut seen = std::collections::HashSet::new();
        for _ in 0..60 {
            let outcome = h.orchestrator.run_analysis().await.unwrap().unwrap();
            seen.insert(outcome.review.text().to_string());
        }
        assert_eq!(seen.len(), texts.len());
    }
}
