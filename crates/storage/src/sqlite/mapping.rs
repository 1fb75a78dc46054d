use chrono::{DateTime, Utc};
use quiz_core::model::{AnswerKey, Difficulty, Question, QuestionId, UserId};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn question_id_from_str(raw: &str) -> Result<QuestionId, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn user_id_from_str(raw: &str) -> Result<UserId, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn parse_difficulty(raw: &str) -> Result<Difficulty, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn parse_answer_key(raw: &str) -> Result<AnswerKey, StorageError> {
    raw.parse().map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let id = question_id_from_str(&row.try_get::<String, _>("id").map_err(ser)?)?;
    let difficulty = parse_difficulty(&row.try_get::<String, _>("difficulty").map_err(ser)?)?;
    let correct_answer =
        parse_answer_key(&row.try_get::<String, _>("correct_answer").map_err(ser)?)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ser)?;

    let options = [
        row.try_get::<String, _>("option_a").map_err(ser)?,
        row.try_get::<String, _>("option_b").map_err(ser)?,
        row.try_get::<String, _>("option_c").map_err(ser)?,
        row.try_get::<String, _>("option_d").map_err(ser)?,
    ];

    Question::from_persisted(
        id,
        row.try_get("subject").map_err(ser)?,
        difficulty,
        row.try_get("question_text").map_err(ser)?,
        options,
        correct_answer,
        row.try_get("reasoning").map_err(ser)?,
        created_at,
    )
    .map_err(ser)
}
