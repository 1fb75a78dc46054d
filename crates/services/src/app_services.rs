use std::sync::Arc;

use quiz_core::model::{DailyMixConfig, DifficultyRatio};
use storage::repository::Storage;

use crate::Clock;
use crate::daily::DailyQuestionService;
use crate::error::AppServicesError;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    daily_questions: Arc<DailyQuestionService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the limits are invalid or storage
    /// initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        session_size: u32,
        pool_limit: u32,
    ) -> Result<Self, AppServicesError> {
        let config = DailyMixConfig::new(session_size, pool_limit, DifficultyRatio::default())?;
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, config))
    }

    /// Build services over an already-initialized backend.
    #[must_use]
    pub fn with_storage(storage: Storage, clock: Clock, config: DailyMixConfig) -> Self {
        let daily_questions =
            Arc::new(DailyQuestionService::from_storage(clock, &storage).with_config(config));
        Self {
            storage,
            daily_questions,
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn daily_questions(&self) -> Arc<DailyQuestionService> {
        Arc::clone(&self.daily_questions)
    }
}
