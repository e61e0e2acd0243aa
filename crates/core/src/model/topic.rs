use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::mastery::MasteryPolicy;
use crate::model::ids::TopicId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Rejected topic snapshot inputs. These are caller bugs, not runtime conditions.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("mastery must be a finite value in [0, 100], got {provided}")]
    InvalidMastery { provided: f64 },

    #[error("correct streak ({correct}) and wrong streak ({wrong}) cannot both be non-zero")]
    ConflictingStreaks { correct: u32, wrong: u32 },
}

//
// ─── TOPIC SNAPSHOT ────────────────────────────────────────────────────────────
//

/// A learner's skill estimate for one topic at a point in time.
///
/// `last_seen == None` means the topic has never been answered, which also
/// disables passive decay for the next update.
///
/// `is_mastered` is always derived from `mastery`; there is no setter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSnapshot {
    topic_id: TopicId,
    mastery: f64,
    correct_streak: u32,
    wrong_streak: u32,
    is_mastered: bool,
    last_seen: Option<DateTime<Utc>>,
}

impl TopicSnapshot {
    /// Zero-value snapshot: no mastery, no streaks, never seen.
    ///
    /// This is also what a session uses for a topic it has no seed for.
    #[must_use]
    pub fn new(topic_id: impl Into<TopicId>) -> Self {
        Self {
            topic_id: topic_id.into(),
            mastery: 0.0,
            correct_streak: 0,
            wrong_streak: 0,
            is_mastered: false,
            last_seen: None,
        }
    }

    /// Snapshot seeded with a prior mastery value and no history.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::InvalidMastery` if `mastery` is not finite or outside `[0, 100]`.
    pub fn seeded(topic_id: impl Into<TopicId>, mastery: f64) -> Result<Self, TopicError> {
        Self::from_persisted(topic_id, mastery, 0, 0, None)
    }

    /// Rehydrate a snapshot from a progress store.
    ///
    /// # Errors
    ///
    /// - `InvalidMastery` if `mastery` is not finite or outside `[0, 100]`
    /// - `ConflictingStreaks` if both streaks are non-zero
    pub fn from_persisted(
        topic_id: impl Into<TopicId>,
        mastery: f64,
        correct_streak: u32,
        wrong_streak: u32,
        last_seen: Option<DateTime<Utc>>,
    ) -> Result<Self, TopicError> {
        if !mastery.is_finite() || !(0.0..=100.0).contains(&mastery) {
            return Err(TopicError::InvalidMastery { provided: mastery });
        }
        if correct_streak > 0 && wrong_streak > 0 {
            return Err(TopicError::ConflictingStreaks {
                correct: correct_streak,
                wrong: wrong_streak,
            });
        }

        Ok(Self {
            topic_id: topic_id.into(),
            mastery,
            correct_streak,
            wrong_streak,
            is_mastered: MasteryPolicy::default().mastered_flag(mastery),
            last_seen,
        })
    }

    /// Assembles a snapshot whose invariants the mastery model already guarantees.
    pub(crate) fn from_update(
        topic_id: TopicId,
        mastery: f64,
        correct_streak: u32,
        wrong_streak: u32,
        is_mastered: bool,
        last_seen: DateTime<Utc>,
    ) -> Self {
        Self {
            topic_id,
            mastery,
            correct_streak,
            wrong_streak,
            is_mastered,
            last_seen: Some(last_seen),
        }
    }

    /// Returns the same snapshot marked as last answered at `at`.
    #[must_use]
    pub fn seen_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_seen = Some(at);
        self
    }

    #[must_use]
    pub fn topic_id(&self) -> &TopicId {
        &self.topic_id
    }

    #[must_use]
    pub fn mastery(&self) -> f64 {
        self.mastery
    }

    #[must_use]
    pub fn correct_streak(&self) -> u32 {
        self.correct_streak
    }

    #[must_use]
    pub fn wrong_streak(&self) -> u32 {
        self.wrong_streak
    }

    #[must_use]
    pub fn is_mastered(&self) -> bool {
        self.is_mastered
    }

    #[must_use]
    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        self.last_seen.is_none()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
