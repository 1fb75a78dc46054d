use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::{DailyBundle, DailyCacheKey, Difficulty, DifficultyRatio, Question, UserId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// One entry of a learner's activity log.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub user_id: UserId,
    pub event_type: String,
    pub details: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

/// Per-learner difficulty preferences.
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Fetch the stored ratio for a learner.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the profile cannot be read. A learner without
    /// a stored ratio yields `Ok(None)`.
    async fn difficulty_ratio(&self, user_id: UserId) -> Result<Option<DifficultyRatio>, StorageError>;

    /// Persist or replace a learner's ratio.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the ratio cannot be stored.
    async fn save_difficulty_ratio(
        &self,
        user_id: UserId,
        ratio: &DifficultyRatio,
    ) -> Result<(), StorageError>;
}

#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Persist a question; re-inserting an existing id is a conflict.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` on duplicate ids, or other storage errors.
    async fn insert_question(&self, question: &Question) -> Result<(), StorageError>;

    /// Up to `limit` questions of one band, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn questions_by_difficulty(
        &self,
        difficulty: Difficulty,
        limit: u32,
    ) -> Result<Vec<Question>, StorageError>;
}

/// Key/value store for the day's bundle of each learner.
#[async_trait]
pub trait DailyCacheRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the entry exists but cannot be read.
    async fn get_bundle(&self, key: &DailyCacheKey) -> Result<Option<DailyBundle>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be written.
    async fn put_bundle(&self, key: &DailyCacheKey, bundle: &DailyBundle) -> Result<(), StorageError>;
}

#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    /// Append an activity entry.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the entry cannot be stored.
    async fn append_activity(&self, record: &ActivityRecord) -> Result<(), StorageError>;

    /// All entries for a learner in the order they were appended.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the query fails.
    async fn activities_for_user(&self, user_id: UserId) -> Result<Vec<ActivityRecord>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    profiles: Arc<Mutex<HashMap<UserId, DifficultyRatio>>>,
    questions: Arc<Mutex<Vec<Question>>>,
    cache: Arc<Mutex<HashMap<String, DailyBundle>>>,
    activity: Arc<Mutex<Vec<ActivityRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn difficulty_ratio(&self, user_id: UserId) -> Result<Option<DifficultyRatio>, StorageError> {
        let guard = self.profiles.lock().map_err(poisoned)?;
        Ok(guard.get(&user_id).copied())
    }

    async fn save_difficulty_ratio(
        &self,
        user_id: UserId,
        ratio: &DifficultyRatio,
    ) -> Result<(), StorageError> {
        let mut guard = self.profiles.lock().map_err(poisoned)?;
        guard.insert(user_id, *ratio);
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn insert_question(&self, question: &Question) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        if guard.iter().any(|q| q.id() == question.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(question.clone());
        Ok(())
    }

    async fn questions_by_difficulty(
        &self,
        difficulty: Difficulty,
        limit: u32,
    ) -> Result<Vec<Question>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        let mut matching: Vec<Question> = guard
            .iter()
            .filter(|q| q.difficulty() == difficulty)
            .cloned()
            .collect();
        matching.sort_by_key(|q| (q.created_at(), q.id()));
        matching.truncate(limit);
        Ok(matching)
    }
}

#[async_trait]
impl DailyCacheRepository for InMemoryRepository {
    async fn get_bundle(&self, key: &DailyCacheKey) -> Result<Option<DailyBundle>, StorageError> {
        let guard = self.cache.lock().map_err(poisoned)?;
        Ok(guard.get(&key.to_string()).cloned())
    }

    async fn put_bundle(&self, key: &DailyCacheKey, bundle: &DailyBundle) -> Result<(), StorageError> {
        let mut guard = self.cache.lock().map_err(poisoned)?;
        guard.insert(key.to_string(), bundle.clone());
        Ok(())
    }
}

#[async_trait]
impl ActivityLogRepository for InMemoryRepository {
    async fn append_activity(&self, record: &ActivityRecord) -> Result<(), StorageError> {
        let mut guard = self.activity.lock().map_err(poisoned)?;
        guard.push(record.clone());
        Ok(())
    }

    async fn activities_for_user(&self, user_id: UserId) -> Result<Vec<ActivityRecord>, StorageError> {
        let guard = self.activity.lock().map_err(poisoned)?;
        Ok(guard.iter().filter(|r| r.user_id == user_id).cloned().collect())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub profiles: Arc<dyn ProfileRepository>,
    pub questions: Arc<dyn QuestionRepository>,
    pub daily_cache: Arc<dyn DailyCacheRepository>,
    pub activity: Arc<dyn ActivityLogRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            profiles: Arc::new(repo.clone()),
            questions: Arc::new(repo.clone()),
            daily_cache: Arc::new(repo.clone()),
            activity: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use quiz_core::model::{AnswerKey, DifficultyCounts, QuestionDraft, QuestionId};
    use quiz_core::time::fixed_now;
    use uuid::Uuid;

    fn build_question(id: u128, difficulty: Difficulty, minutes: i64) -> Question {
        QuestionDraft {
            subject: "Math".into(),
            difficulty,
            prompt: format!("Q{id}"),
            options: ["1".into(), "2".into(), "3".into(), "4".into()],
            correct_answer: AnswerKey::A,
            reasoning: None,
        }
        .validate(
            QuestionId::new(Uuid::from_u128(id)),
            fixed_now() + Duration::minutes(minutes),
        )
        .unwrap()
    }

    fn user(id: u128) -> UserId {
        UserId::new(Uuid::from_u128(id))
    }

    #[tokio::test]
    async fn questions_are_filtered_ordered_and_limited() {
        let repo = InMemoryRepository::new();
        repo.insert_question(&build_question(3, Difficulty::Easy, 3)).await.unwrap();
        repo.insert_question(&build_question(1, Difficulty::Easy, 1)).await.unwrap();
        repo.insert_question(&build_question(2, Difficulty::Moderate, 2)).await.unwrap();
        repo.insert_question(&build_question(4, Difficulty::Easy, 4)).await.unwrap();

        let easy = repo.questions_by_difficulty(Difficulty::Easy, 2).await.unwrap();
        let ids: Vec<_> = easy.iter().map(Question::id).collect();
        assert_eq!(
            ids,
            vec![QuestionId::new(Uuid::from_u128(1)), QuestionId::new(Uuid::from_u128(3))]
        );
    }

    #[tokio::test]
    async fn duplicate_question_is_a_conflict() {
        let repo = InMemoryRepository::new();
        let q = build_question(1, Difficulty::Easy, 0);
        repo.insert_question(&q).await.unwrap();
        let err = repo.insert_question(&q).await.unwrap_err();
        assert!(matches!(err, StorageError::Conflict));
    }

    #[tokio::test]
    async fn missing_profile_has_no_ratio() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.difficulty_ratio(user(1)).await.unwrap(), None);

        let ratio = DifficultyRatio::new(0.5, 0.3, 0.2);
        repo.save_difficulty_ratio(user(1), &ratio).await.unwrap();
        assert_eq!(repo.difficulty_ratio(user(1)).await.unwrap(), Some(ratio));
    }

    #[tokio::test]
    async fn cache_is_keyed_by_user_and_date() {
        let repo = InMemoryRepository::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let bundle = DailyBundle {
            date,
            counts: DifficultyCounts::new(8, 2, 0),
            questions: vec![build_question(1, Difficulty::Easy, 0)],
        };
        let key = DailyCacheKey::new(user(1), date);
        repo.put_bundle(&key, &bundle).await.unwrap();

        assert_eq!(repo.get_bundle(&key).await.unwrap(), Some(bundle));
        let other_day = DailyCacheKey::new(user(1), date.succ_opt().unwrap());
        assert_eq!(repo.get_bundle(&other_day).await.unwrap(), None);
        let other_user = DailyCacheKey::new(user(2), date);
        assert_eq!(repo.get_bundle(&other_user).await.unwrap(), None);
    }

    #[tokio::test]
    async fn activity_is_listed_per_user() {
        let storage = Storage::in_memory();
        for (uid, event) in [(1, "a"), (2, "b"), (1, "c")] {
            storage
                .activity
                .append_activity(&ActivityRecord {
                    user_id: user(uid),
                    event_type: event.into(),
                    details: serde_json::json!({}),
                    recorded_at: fixed_now(),
                })
                .await
                .unwrap();
        }
        let events: Vec<String> = storage
            .activity
            .activities_for_user(user(1))
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.event_type)
            .collect();
        assert_eq!(events, vec!["a".to_string(), "c".to_string()]);
    }
}
