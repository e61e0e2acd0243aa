use chrono::{DateTime, Utc};
use quiz_core::model::{Difficulty, QuestionId, ReviewItem, TopicSnapshot};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{QuestionRecord, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn question_id_to_i64(id: QuestionId) -> Result<i64, StorageError> {
    i64::try_from(id.value()).map_err(|_| StorageError::Serialization("question_id overflow".into()))
}

fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    u64::try_from(v)
        .map(QuestionId::new)
        .map_err(|_| StorageError::Serialization("question_id sign overflow".into()))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} out of range")))
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuestionRecord, StorageError> {
    let difficulty = u8::try_from(row.try_get::<i64, _>("difficulty").map_err(ser)?)
        .map_err(|_| StorageError::Serialization("difficulty out of range".into()))?;
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;

    Ok(QuestionRecord {
        id: question_id_from_i64(row.try_get("id").map_err(ser)?)?,
        topic_id: row.try_get::<String, _>("topic_id").map_err(ser)?.into(),
        difficulty: Difficulty::from_level(difficulty),
        prompt: row.try_get("prompt").map_err(ser)?,
        options,
        correct_answer: row.try_get("correct_answer").map_err(ser)?,
        explanation: row.try_get("explanation").map_err(ser)?,
    })
}

pub(crate) fn map_snapshot_row(row: &SqliteRow) -> Result<TopicSnapshot, StorageError> {
    let topic_id: String = row.try_get("topic_id").map_err(ser)?;
    let last_seen: Option<DateTime<Utc>> = row.try_get("last_seen").map_err(ser)?;

    TopicSnapshot::from_persisted(
        topic_id,
        row.try_get("mastery").map_err(ser)?,
        u32_from_i64("correct_streak", row.try_get("correct_streak").map_err(ser)?)?,
        u32_from_i64("wrong_streak", row.try_get("wrong_streak").map_err(ser)?)?,
        last_seen,
    )
    .map_err(ser)
}

pub(crate) fn map_review_row(row: &SqliteRow) -> Result<ReviewItem, StorageError> {
    let topic_id: String = row.try_get("topic_id").map_err(ser)?;
    Ok(ReviewItem::new(
        topic_id,
        row.try_get::<DateTime<Utc>, _>("next_review_at").map_err(ser)?,
    ))
}
