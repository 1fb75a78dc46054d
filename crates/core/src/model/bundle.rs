use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::difficulty::DifficultyCounts;
use crate::model::ids::{QuestionId, UserId};
use crate::model::question::Question;

/// Version suffix of the cache key; bump when the bundle shape changes.
const CACHE_KEY_VERSION: &str = "v1";

/// A learner's question set for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyBundle {
    pub date: NaiveDate,
    pub counts: DifficultyCounts,
    pub questions: Vec<Question>,
}

impl DailyBundle {
    #[must_use]
    pub fn question_ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(Question::id).collect()
    }
}

/// Cache key for a daily bundle: one entry per user per UTC date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DailyCacheKey {
    pub user_id: UserId,
    pub date: NaiveDate,
}

impl DailyCacheKey {
    #[must_use]
    pub fn new(user_id: UserId, date: NaiveDate) -> Self {
        Self { user_id, date }
    }
}

impl fmt::Display for DailyCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "daily-questions:{}:{}:{CACHE_KEY_VERSION}",
            self.user_id,
            self.date.format("%Y-%m-%d")
        )
    }
}
