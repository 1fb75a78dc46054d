use async_trait::async_trait;
use quiz_core::model::{Difficulty, Question};

use super::SqliteRepository;
use super::mapping::{conn, map_question_row};
use crate::repository::{QuestionRepository, StorageError};

#[async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(&self, question: &Question) -> Result<(), StorageError> {
        let [option_a, option_b, option_c, option_d] = question.options();

        let res = sqlx::query(
            r"
            INSERT INTO questions (
                id, subject, difficulty, question_text,
                option_a, option_b, option_c, option_d,
                correct_answer, reasoning, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT(id) DO NOTHING
            ",
        )
        .bind(question.id().to_string())
        .bind(question.subject())
        .bind(question.difficulty().as_str())
        .bind(question.prompt())
        .bind(option_a.as_str())
        .bind(option_b.as_str())
        .bind(option_c.as_str())
        .bind(option_d.as_str())
        .bind(question.correct_answer().as_str())
        .bind(question.reasoning())
        .bind(question.created_at())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }
        Ok(())
    }

    async fn questions_by_difficulty(
        &self,
        difficulty: Difficulty,
        limit: u32,
    ) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT
                id, subject, difficulty, question_text,
                option_a, option_b, option_c, option_d,
                correct_answer, reasoning, created_at
            FROM questions
            WHERE difficulty = ?1
            ORDER BY created_at ASC, id ASC
            LIMIT ?2
            ",
        )
        .bind(difficulty.as_str())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}
