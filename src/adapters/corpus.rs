use crate::domain::model::ReviewItem;
use crate::domain::ports::{CorpusSupplier, Storage};
use crate::utils::error::{Result, TriageError};
use std::sync::{Arc, RwLock};

/// 記憶體中的評論快照。啟動時由 [`TsvCorpusLoader`] 非同步填入，之後唯讀。
pub struct ReviewCorpus {
    items: RwLock<Arc<[ReviewItem]>>,
}

impl ReviewCorpus {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Arc::from(Vec::new())),
        }
    }

    pub fn replace(&self, items: Vec<ReviewItem>) {
        let mut slot = self.items.write().unwrap_or_else(|p| p.into_inner());
        *slot = items.into();
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReviewCorpus {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusSupplier for ReviewCorpus {
    fn items(&self) -> Arc<[ReviewItem]> {
        let slot = self.items.read().unwrap_or_else(|p| p.into_inner());
        Arc::clone(&slot)
    }
}

/// 從 Storage 讀取以 tab 分隔、含標題列的評論檔
pub struct TsvCorpusLoader<S: Storage> {
    storage: S,
    path: String,
    text_column: String,
}

impl<S: Storage> TsvCorpusLoader<S> {
    pub fn new(storage: S, path: impl Into<String>, text_column: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
            text_column: text_column.into(),
        }
    }

    pub async fn load(&self) -> Result<Vec<ReviewItem>> {
        let data = self.storage.read_file(&self.path).await?;
        let items = parse_tsv(&data, &self.text_column)?;
        tracing::info!("📚 Loaded {} reviews from {}", items.len(), self.path);
        Ok(items)
    }

    /// 載入並填入語料；失敗時語料維持原狀
    pub async fn populate(&self, corpus: &ReviewCorpus) -> Result<usize> {
        let items = self.load().await?;
        let count = items.len();
        corpus.replace(items);
        Ok(count)
    }
}

/// 解析 TSV，只保留 `text_column` 欄位非空白的列
pub fn parse_tsv(data: &[u8], text_column: &str) -> Result<Vec<ReviewItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let column = reader
        .headers()?
        .iter()
        .position(|h| h.trim() == text_column)
        .ok_or_else(|| TriageError::ConfigError {
            message: format!("Column '{}' not found in corpus header", text_column),
        })?;

    let mut items = Vec::new();
    let mut skipped = 0usize;
    for record in reader.records() {
        let record = record?;
        match record.get(column).and_then(ReviewItem::new) {
            Some(item) => items.push(item),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!("Skipped {} rows without review text", skipped);
    }

    Ok(items)
}
