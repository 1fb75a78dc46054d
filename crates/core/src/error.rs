use thiserror::Error;

use crate::mix::MixError;
use crate::model::{ConfigError, QuestionError};

/// Any error raised by the core crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Mix(#[from] MixError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
