use async_trait::async_trait;
use chrono::Utc;
use quiz_core::model::{DailyBundle, DailyCacheKey};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{DailyCacheRepository, StorageError};

#[async_trait]
impl DailyCacheRepository for SqliteRepository {
    async fn get_bundle(&self, key: &DailyCacheKey) -> Result<Option<DailyBundle>, StorageError> {
        let row = sqlx::query("SELECT payload FROM daily_cache WHERE cache_key = ?1")
            .bind(key.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload").map_err(ser)?;
        serde_json::from_str(&payload).map(Some).map_err(ser)
    }

    async fn put_bundle(&self, key: &DailyCacheKey, bundle: &DailyBundle) -> Result<(), StorageError> {
        let payload = serde_json::to_string(bundle).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO daily_cache (cache_key, user_id, bundle_date, payload, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(cache_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(key.to_string())
        .bind(key.user_id.to_string())
        .bind(key.date.format("%Y-%m-%d").to_string())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
