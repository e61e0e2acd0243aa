//! Next-question selection.
//!
//! Stages run in priority order and the first match wins. Inside a stage,
//! candidates are scanned in input order and paired with the first pool
//! question of the required difficulty; there is no secondary scoring.
//!
//! 1. `Review`: a due review item, medium question.
//! 2. `Reinforce`: mastery below 40 or a topic missed this session, easy question.
//! 3. `Progress`: mastery in `[40, 80)`, medium question.
//! 4. `Stretch`: mastery of 80 or more, hard question.
//! 5. Fallback: the first medium question anywhere, tagged `Progress`.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::model::{
    Difficulty, Purpose, QuestionMeta, ReviewItem, SelectionResult, TopicId, TopicSnapshot,
};

/// Mastery below this is reinforced with easy questions.
pub const REINFORCE_BELOW: f64 = 40.0;
/// Mastery at or above this is stretched with hard questions.
pub const STRETCH_FROM: f64 = 80.0;

/// Pick the next question, or `None` when nothing in the pool qualifies.
///
/// `pool` must already exclude questions asked earlier in the session.
#[must_use]
pub fn select_next(
    now: DateTime<Utc>,
    snapshots: &[TopicSnapshot],
    reviews: &[ReviewItem],
    pool: &[QuestionMeta],
    recent_mistakes: &HashSet<TopicId>,
) -> Option<SelectionResult> {
    let due_reviews = reviews
        .iter()
        .filter(|r| r.is_due(now))
        .map(|r| &r.topic_id);
    if let Some(found) = first_for_topics(due_reviews, pool, Difficulty::MEDIUM, Purpose::Review) {
        return Some(found);
    }

    let weak = snapshots
        .iter()
        .filter(|s| s.mastery() < REINFORCE_BELOW || recent_mistakes.contains(s.topic_id()))
        .map(TopicSnapshot::topic_id);
    if let Some(found) = first_for_topics(weak, pool, Difficulty::EASY, Purpose::Reinforce) {
        return Some(found);
    }

    let progressing = snapshots
        .iter()
        .filter(|s| (REINFORCE_BELOW..STRETCH_FROM).contains(&s.mastery()))
        .map(TopicSnapshot::topic_id);
    if let Some(found) = first_for_topics(progressing, pool, Difficulty::MEDIUM, Purpose::Progress)
    {
        return Some(found);
    }

    let confident = snapshots
        .iter()
        .filter(|s| s.mastery() >= STRETCH_FROM)
        .map(TopicSnapshot::topic_id);
    if let Some(found) = first_for_topics(confident, pool, Difficulty::HARD, Purpose::Stretch) {
        return Some(found);
    }

    // Never block the quiz while a medium question remains.
    pool.iter()
        .find(|q| q.difficulty == Difficulty::MEDIUM)
        .map(|q| SelectionResult::new(q.id, Purpose::Progress))
}

fn first_for_topics<'a>(
    topics: impl IntoIterator<Item = &'a TopicId>,
    pool: &[QuestionMeta],
    difficulty: Difficulty,
    purpose: Purpose,
) -> Option<SelectionResult> {
    topics.into_iter().find_map(|topic| {
        pool.iter()
            .find(|q| &q.topic_id == topic && q.difficulty == difficulty)
            .map(|q| SelectionResult::new(q.id, purpose))
    })
}
