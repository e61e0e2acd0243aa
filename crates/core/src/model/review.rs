use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::TopicId;

/// A spaced-repetition due date for a topic.
///
/// Reviews are scheduled by the progress store that seeds a session; the
/// engine only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewItem {
    pub topic_id: TopicId,
    pub next_review_at: DateTime<Utc>,
}

impl ReviewItem {
    #[must_use]
    pub fn new(topic_id: impl Into<TopicId>, next_review_at: DateTime<Utc>) -> Self {
        Self {
            topic_id: topic_id.into(),
            next_review_at,
        }
    }

    /// A review is due once its date is not in the future.
    #[must_use]
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}
