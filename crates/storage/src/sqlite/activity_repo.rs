use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quiz_core::model::UserId;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser, user_id_from_str};
use crate::repository::{ActivityLogRepository, ActivityRecord, StorageError};

#[async_trait]
impl ActivityLogRepository for SqliteRepository {
    async fn append_activity(&self, record: &ActivityRecord) -> Result<(), StorageError> {
        let details = if record.details.is_null() {
            None
        } else {
            Some(serde_json::to_string(&record.details).map_err(ser)?)
        };

        sqlx::query(
            r"
            INSERT INTO activity_log (user_id, event_type, details, recorded_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(record.user_id.to_string())
        .bind(record.event_type.as_str())
        .bind(details)
        .bind(record.recorded_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn activities_for_user(&self, user_id: UserId) -> Result<Vec<ActivityRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_id, event_type, details, recorded_at
            FROM activity_log
            WHERE user_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter()
            .map(|row| -> Result<ActivityRecord, StorageError> {
                let details: Option<String> = row.try_get("details").map_err(ser)?;
                let details = details
                    .map(|raw| serde_json::from_str(&raw).map_err(ser))
                    .transpose()?
                    .unwrap_or(serde_json::Value::Null);
                let recorded_at: DateTime<Utc> = row.try_get("recorded_at").map_err(ser)?;
                Ok(ActivityRecord {
                    user_id: user_id_from_str(&row.try_get::<String, _>("user_id").map_err(ser)?)?,
                    event_type: row.try_get("event_type").map_err(ser)?,
                    details,
                    recorded_at,
                })
            })
            .collect()
    }
}
