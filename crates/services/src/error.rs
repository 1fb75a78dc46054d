//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::MixError;
use quiz_core::model::ConfigError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `DailyQuestionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DailyQuestionsError {
    #[error(transparent)]
    Mix(#[from] MixError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
