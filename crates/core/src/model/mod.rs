mod bundle;
mod difficulty;
mod ids;
mod pool;
mod question;
mod settings;

pub use bundle::{DailyBundle, DailyCacheKey};
pub use difficulty::{Difficulty, DifficultyCounts, DifficultyRatio, ParseDifficultyError};
pub use ids::{ParseIdError, QuestionId, UserId};
pub use pool::QuestionPools;
pub use question::{AnswerKey, Question, QuestionDraft, QuestionError};
pub use settings::{ConfigError, DailyMixConfig};
