use quiz_core::model::{LearnerId, ReviewItem, TopicSnapshot};

use super::SqliteRepository;
use super::mapping::{conn, map_review_row, map_snapshot_row};
use crate::repository::{ProgressRepository, StorageError};

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load_snapshots(&self, learner: &LearnerId) -> Result<Vec<TopicSnapshot>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT topic_id, mastery, correct_streak, wrong_streak, last_seen
            FROM topic_progress
            WHERE learner_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(learner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_snapshot_row).collect()
    }

    async fn save_snapshot(
        &self,
        learner: &LearnerId,
        snapshot: &TopicSnapshot,
    ) -> Result<(), StorageError> {
        // `is_mastered` is derived from mastery and not stored.
        sqlx::query(
            r"
            INSERT INTO topic_progress (learner_id, topic_id, mastery, correct_streak, wrong_streak, last_seen)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(learner_id, topic_id) DO UPDATE SET
                mastery = excluded.mastery,
                correct_streak = excluded.correct_streak,
                wrong_streak = excluded.wrong_streak,
                last_seen = excluded.last_seen
            ",
        )
        .bind(learner.as_str())
        .bind(snapshot.topic_id().as_str())
        .bind(snapshot.mastery())
        .bind(i64::from(snapshot.correct_streak()))
        .bind(i64::from(snapshot.wrong_streak()))
        .bind(snapshot.last_seen())
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }

    async fn load_reviews(&self, learner: &LearnerId) -> Result<Vec<ReviewItem>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT topic_id, next_review_at
            FROM review_schedule
            WHERE learner_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(learner.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        rows.iter().map(map_review_row).collect()
    }

    async fn upsert_review(
        &self,
        learner: &LearnerId,
        review: &ReviewItem,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO review_schedule (learner_id, topic_id, next_review_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(learner_id, topic_id) DO UPDATE SET
                next_review_at = excluded.next_review_at
            ",
        )
        .bind(learner.as_str())
        .bind(review.topic_id.as_str())
        .bind(review.next_review_at)
        .execute(&self.pool)
        .await
        .map_err(conn)?;

        Ok(())
    }
}
