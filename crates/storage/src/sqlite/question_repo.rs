use quiz_core::model::QuestionId;

use super::SqliteRepository;
use super::mapping::{conn, map_question_row, question_id_to_i64, ser};
use crate::repository::{QuestionBank, QuestionRecord, StorageError};

#[async_trait::async_trait]
impl QuestionBank for SqliteRepository {
    async fn upsert_question(&self, question: &QuestionRecord) -> Result<(), StorageError> {
        let options = serde_json::to_string(&question.options).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO questions (id, topic_id, difficulty, prompt, options, correct_answer, explanation)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                topic_id = excluded.topic_id,
                difficulty = excluded.difficulty,
                prompt = excluded.prompt,
                options = excluded.options,
                correct_answer = excluded.correct_answer,
                explanation = excluded.explanation
            ",
        )
        .bind(question_id_to_i64(question.id)?)
        .bind(question.topic_id.as_str())
        .bind(i64::from(question.difficulty.level()))
        .bind(&question.prompt)
        .bind(options)
        .bind(&question.correct_answer)
        .bind(&question.explanation)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuestionRecord>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, topic_id, difficulty, prompt, options, correct_answer, explanation
            FROM questions WHERE id = ?1
            ",
        )
        .bind(question_id_to_i64(id)?)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, topic_id, difficulty, prompt, options, correct_answer, explanation
            FROM questions
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_question_row).collect()
    }
}
