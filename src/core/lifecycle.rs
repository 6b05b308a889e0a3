use crate::domain::model::ModelState;
use crate::domain::ports::{ModelLoader, SentimentModel};
use crate::utils::error::{Result, TriageError};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;

enum Slot {
    Unloaded,
    Loading,
    Ready(Arc<dyn SentimentModel>),
    Failed(String),
}

impl Slot {
    fn state(&self) -> ModelState {
        match self {
            Slot::Unloaded => ModelState::Unloaded,
            Slot::Loading => ModelState::Loading,
            Slot::Ready(_) => ModelState::Ready,
            Slot::Failed(_) => ModelState::Failed,
        }
    }
}

/// 持有唯一的模型實例與其載入狀態。
///
/// 狀態只會前進：Unloaded → Loading → Ready | Failed。Failed 之後不會自動重試。
pub struct ModelManager {
    loader: Box<dyn ModelLoader>,
    slot: Mutex<Slot>,
    state_tx: watch::Sender<ModelState>,
}

impl ModelManager {
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        let (state_tx, _) = watch::channel(ModelState::Unloaded);
        Self {
            loader,
            slot: Mutex::new(Slot::Unloaded),
            state_tx,
        }
    }

    /// 載入模型。載入中再次呼叫會得到 `ModelBusy`，不會排隊。
    pub async fn initialize(&self) -> Result<()> {
        {
            let mut slot = self.lock_slot();
            match &*slot {
                Slot::Loading => return Err(TriageError::ModelBusy),
                Slot::Ready(_) => {
                    tracing::debug!("Model already initialized, skipping");
                    return Ok(());
                }
                Slot::Failed(reason) => {
                    return Err(TriageError::ModelLoad {
                        reason: reason.clone(),
                    })
                }
                Slot::Unloaded => {}
            }
            *slot = Slot::Loading;
        }
        self.state_tx.send_replace(ModelState::Loading);
        tracing::info!("⏳ Loading sentiment model...");

        match self.loader.load().await {
            Ok(model) => {
                tracing::info!("✅ Sentiment model ready: {}", model.name());
                *self.lock_slot() = Slot::Ready(model);
                self.state_tx.send_replace(ModelState::Ready);
                Ok(())
            }
            Err(e) => {
                let reason = match e {
                    TriageError::ModelLoad { reason } => reason,
                    other => other.to_string(),
                };
                tracing::error!("❌ Model load failed: {}", reason);
                *self.lock_slot() = Slot::Failed(reason.clone());
                self.state_tx.send_replace(ModelState::Failed);
                Err(TriageError::ModelLoad { reason })
            }
        }
    }

    pub fn ready_model(&self) -> Result<Arc<dyn SentimentModel>> {
        match &*self.lock_slot() {
            Slot::Ready(model) => Ok(Arc::clone(model)),
            other => Err(TriageError::ModelNotReady {
                state: other.state(),
            }),
        }
    }

    pub fn state(&self) -> ModelState {
        self.lock_slot().state()
    }

    /// 狀態觀察者（例如狀態列）
    pub fn subscribe(&self) -> watch::Receiver<ModelState> {
        self.state_tx.subscribe()
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
