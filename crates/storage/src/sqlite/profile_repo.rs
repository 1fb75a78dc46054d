use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::{DifficultyRatio, UserId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{ProfileRepository, StorageError};

#[async_trait]
impl ProfileRepository for SqliteRepository {
    async fn difficulty_ratio(&self, user_id: UserId) -> Result<Option<DifficultyRatio>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT difficulty_ratio
            FROM profiles
            WHERE id = ?1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let raw: Option<String> = row.try_get("difficulty_ratio").map_err(ser)?;
        raw.map(|json| serde_json::from_str::<DifficultyRatio>(&json).map_err(ser))
            .transpose()
    }

    async fn save_difficulty_ratio(
        &self,
        user_id: UserId,
        ratio: &DifficultyRatio,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(ratio).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO profiles (id, difficulty_ratio, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                difficulty_ratio = excluded.difficulty_ratio,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_id.to_string())
        .bind(json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
