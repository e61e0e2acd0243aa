use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mastery::{MasteryInput, MasteryModel};
use crate::model::{
    Answer, QuestionId, QuestionMeta, ReviewItem, SelectionResult, SessionId, TopicId,
    TopicSnapshot,
};
use crate::selection::select_next;

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of a quiz session. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Active,
    Finished,
}

/// Result of one answered turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// `None` once nothing is left to ask; the session is then finished.
    pub next: Option<SelectionResult>,
    /// Updated snapshot for the answered topic.
    pub snapshot: TopicSnapshot,
}

/// Aggregated view of session progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub asked: usize,
    pub remaining: usize,
    pub mistakes: usize,
    pub is_complete: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One learner's quiz run.
///
/// Owns the per-topic snapshots, scheduled reviews, the fixed question pool and
/// the asked / recently-missed sets. All mutation goes through
/// [`QuizSession::submit_answer`]; callers serialize access per session.
///
/// Topic order is significant for selection tie-breaking: seeded topics keep
/// their seed order, topics first seen through an answer are appended.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: SessionId,
    started_at: DateTime<Utc>,
    snapshots: Vec<TopicSnapshot>,
    topic_index: HashMap<TopicId, usize>,
    reviews: Vec<ReviewItem>,
    pool: Vec<QuestionMeta>,
    asked: HashSet<QuestionId>,
    recent_mistakes: HashSet<TopicId>,
    state: SessionState,
    model: MasteryModel,
}

impl QuizSession {
    /// Start a session over a fixed pool.
    ///
    /// A topic that appears twice in `initial_snapshots` keeps its first
    /// position and the last value.
    #[must_use]
    pub fn new(
        pool: Vec<QuestionMeta>,
        initial_snapshots: impl IntoIterator<Item = TopicSnapshot>,
        reviews: Vec<ReviewItem>,
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut session = Self {
            id: SessionId::generate(),
            started_at,
            snapshots: Vec::new(),
            topic_index: HashMap::new(),
            reviews,
            pool,
            asked: HashSet::new(),
            recent_mistakes: HashSet::new(),
            state: SessionState::Active,
            model: MasteryModel::default(),
        };
        for snapshot in initial_snapshots {
            session.store_snapshot(snapshot);
        }
        session
    }

    /// Use a non-default mastery model for all answers in this session.
    #[must_use]
    pub fn with_mastery_model(mut self, model: MasteryModel) -> Self {
        self.model = model;
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state == SessionState::Finished
    }

    #[must_use]
    pub fn snapshots(&self) -> &[TopicSnapshot] {
        &self.snapshots
    }

    #[must_use]
    pub fn snapshot(&self, topic_id: &TopicId) -> Option<&TopicSnapshot> {
        self.topic_index.get(topic_id).map(|&i| &self.snapshots[i])
    }

    #[must_use]
    pub fn reviews(&self) -> &[ReviewItem] {
        &self.reviews
    }

    #[must_use]
    pub fn pool(&self) -> &[QuestionMeta] {
        &self.pool
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&QuestionMeta> {
        self.pool.iter().find(|q| q.id == id)
    }

    #[must_use]
    pub fn is_asked(&self, id: QuestionId) -> bool {
        self.asked.contains(&id)
    }

    #[must_use]
    pub fn recent_mistakes(&self) -> &HashSet<TopicId> {
        &self.recent_mistakes
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.pool.len();
        let asked = self.pool.iter().filter(|q| self.is_asked(q.id)).count();
        SessionProgress {
            total,
            asked,
            remaining: total - asked,
            mistakes: self.recent_mistakes.len(),
            is_complete: self.is_finished(),
        }
    }

    /// Peek at the question the engine would serve now. Does not mark it asked.
    #[must_use]
    pub fn next_question(&self, now: DateTime<Utc>) -> Option<SelectionResult> {
        let available: Vec<QuestionMeta> = self
            .pool
            .iter()
            .filter(|q| !self.asked.contains(&q.id))
            .cloned()
            .collect();

        select_next(
            now,
            &self.snapshots,
            &self.reviews,
            &available,
            &self.recent_mistakes,
        )
    }

    /// Record an answer and pick the following question.
    ///
    /// Re-submitting a question id is not detected; marking it asked again is a no-op
    /// but the mastery update is applied again.
    pub fn submit_answer(&mut self, answer: &Answer, now: DateTime<Utc>) -> TurnOutcome {
        self.asked.insert(answer.question_id);

        let current = self.snapshot_or_fresh(&answer.topic_id);
        let input = MasteryInput::at(answer.was_correct, answer.difficulty, now);
        let snapshot = self.model.update(&current, &input);
        self.store_snapshot(snapshot.clone());

        if !answer.was_correct {
            self.recent_mistakes.insert(answer.topic_id.clone());
        }

        let next = self.next_question(now);
        if next.is_none() {
            self.state = SessionState::Finished;
        }

        TurnOutcome { next, snapshot }
    }

    /// Snapshot for `topic_id`, or a zero-value one for a topic this session has not seen.
    ///
    /// Unknown topics are deliberately lenient: answering one starts it from scratch
    /// instead of failing the turn.
    #[must_use]
    pub fn snapshot_or_fresh(&self, topic_id: &TopicId) -> TopicSnapshot {
        self.snapshot(topic_id)
            .cloned()
            .unwrap_or_else(|| TopicSnapshot::new(topic_id.clone()))
    }

    fn store_snapshot(&mut self, snapshot: TopicSnapshot) {
        match self.topic_index.get(snapshot.topic_id()) {
            Some(&i) => self.snapshots[i] = snapshot,
            None => {
                self.topic_index
                    .insert(snapshot.topic_id().clone(), self.snapshots.len());
                self.snapshots.push(snapshot);
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, Purpose};
    use crate::time::fixed_now;

    fn q(id: u64, topic: &str, level: u8) -> QuestionMeta {
        QuestionMeta::new(QuestionId::new(id), topic, Difficulty::from_level(level))
    }

    fn snap(topic: &str, mastery: f64) -> TopicSnapshot {
        TopicSnapshot::seeded(topic, mastery).unwrap()
    }

    fn no_seed() -> Vec<TopicSnapshot> {
        Vec::new()
    }

    #[test]
    fn new_session_seeds_snapshots() {
        let session = QuizSession::new(
            vec![q(1, "present_simple", 2)],
            [snap("present_simple", 40.0)],
            Vec::new(),
            fixed_now(),
        );

        assert_eq!(session.snapshots().len(), 1);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.started_at(), fixed_now());
        assert!(session.recent_mistakes().is_empty());
    }

    #[test]
    fn duplicate_seed_keeps_position_and_last_value() {
        let session = QuizSession::new(
            Vec::new(),
            [snap("a", 10.0), snap("b", 20.0), snap("a", 70.0)],
            Vec::new(),
            fixed_now(),
        );

        let topics: Vec<&str> = session
            .snapshots()
            .iter()
            .map(|s| s.topic_id().as_str())
            .collect();
        assert_eq!(topics, ["a", "b"]);
        assert_eq!(session.snapshot(&"a".into()).unwrap().mastery(), 70.0);
    }

    #[test]
    fn sessions_get_distinct_ids() {
        let a = QuizSession::new(Vec::new(), no_seed(), Vec::new(), fixed_now());
        let b = QuizSession::new(Vec::new(), no_seed(), Vec::new(), fixed_now());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn next_question_is_a_pure_peek() {
        let session = QuizSession::new(
            vec![q(1, "articles", 2)],
            [snap("articles", 50.0)],
            Vec::new(),
            fixed_now(),
        );

        let first = session.next_question(fixed_now());
        let second = session.next_question(fixed_now());
        assert!(first.is_some());
        assert_eq!(first, second);
        assert!(!session.is_asked(QuestionId::new(1)));
    }

    #[test]
    fn articles_scenario_reinforces_then_finishes() {
        let mut session = QuizSession::new(
            vec![q(1, "articles", 1)],
            [snap("articles", 25.0)],
            Vec::new(),
            fixed_now(),
        );

        let first = session.next_question(fixed_now()).unwrap();
        assert_eq!(first, SelectionResult::new(QuestionId::new(1), Purpose::Reinforce));

        let answer = Answer::wrong(&q(1, "articles", 1));
        let outcome = session.submit_answer(&answer, fixed_now());

        assert!((outcome.snapshot.mastery() - 20.8).abs() < 1e-9);
        assert_eq!(outcome.snapshot.wrong_streak(), 1);
        assert_eq!(outcome.snapshot.correct_streak(), 0);
        assert_eq!(outcome.next, None);
        assert!(session.is_finished());
        assert_eq!(session.next_question(fixed_now()), None);
    }

    #[test]
    fn correct_answer_raises_mastery_and_streak() {
        let mut session = QuizSession::new(
            vec![q(1, "conditionals", 2), q(2, "conditionals", 2)],
            [snap("conditionals", 45.0).seen_at(fixed_now())],
            Vec::new(),
            fixed_now(),
        );

        let outcome = session.submit_answer(&Answer::correct(&q(1, "conditionals", 2)), fixed_now());

        assert!(outcome.snapshot.mastery() > 45.0);
        assert_eq!(outcome.snapshot.correct_streak(), 1);
        assert_eq!(
            outcome.next,
            Some(SelectionResult::new(QuestionId::new(2), Purpose::Progress))
        );
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn wrong_answer_marks_topic_as_recent_mistake_for_good() {
        let mut session = QuizSession::new(
            vec![q(1, "articles", 1), q(2, "articles", 1), q(3, "articles", 1)],
            [snap("articles", 60.0).seen_at(fixed_now())],
            Vec::new(),
            fixed_now(),
        );

        let outcome = session.submit_answer(&Answer::wrong(&q(1, "articles", 1)), fixed_now());
        assert!(session.recent_mistakes().contains(&TopicId::from("articles")));
        // Mastery is still above 40; the mistake alone drives reinforcement.
        assert_eq!(outcome.next.map(|n| n.purpose), Some(Purpose::Reinforce));

        session.submit_answer(&Answer::correct(&q(2, "articles", 1)), fixed_now());
        assert!(session.recent_mistakes().contains(&TopicId::from("articles")));
    }

    #[test]
    fn unknown_topic_starts_from_zero() {
        let mut session = QuizSession::new(vec![q(1, "misc", 2)], no_seed(), Vec::new(), fixed_now());

        let answer = Answer {
            question_id: QuestionId::new(1),
            topic_id: "never_seeded".into(),
            was_correct: true,
            difficulty: Difficulty::MEDIUM,
        };
        let outcome = session.submit_answer(&answer, fixed_now());

        assert!((outcome.snapshot.mastery() - 5.0).abs() < 1e-9);
        assert_eq!(outcome.snapshot.last_seen(), Some(fixed_now()));
        assert!(session.snapshot(&"never_seeded".into()).is_some());
    }

    #[test]
    fn never_serves_the_same_question_twice() {
        let pool = vec![
            q(1, "articles", 1),
            q(2, "articles", 2),
            q(3, "articles", 3),
            q(4, "tenses", 2),
            q(5, "tenses", 1),
        ];
        let mut session = QuizSession::new(
            pool.clone(),
            [snap("articles", 30.0), snap("tenses", 85.0)],
            Vec::new(),
            fixed_now(),
        );

        let mut served = HashSet::new();
        let mut next = session.next_question(fixed_now());
        let mut flip = false;
        while let Some(selected) = next {
            assert!(served.insert(selected.question_id), "served twice: {selected:?}");
            let meta = session.question(selected.question_id).unwrap().clone();
            flip = !flip;
            let answer = if flip { Answer::correct(&meta) } else { Answer::wrong(&meta) };
            next = session.submit_answer(&answer, fixed_now()).next;
        }

        assert!(session.is_finished());
        assert_eq!(session.next_question(fixed_now()), None);
    }

    #[test]
    fn finishes_when_only_unservable_questions_remain() {
        let mut session = QuizSession::new(
            vec![q(1, "misc", 2), q(2, "misc", 3)],
            no_seed(),
            Vec::new(),
            fixed_now(),
        );

        let outcome = session.submit_answer(&Answer::correct(&q(1, "misc", 2)), fixed_now());
        // Topic "misc" is now at 5 mastery; the hard question is never eligible.
        assert_eq!(outcome.next, None);
        assert!(session.is_finished());

        let progress = session.progress();
        assert_eq!(progress.total, 2);
        assert_eq!(progress.asked, 1);
        assert_eq!(progress.remaining, 1);
        assert!(progress.is_complete);
    }

    #[test]
    fn resubmitting_a_question_keeps_it_asked_once() {
        let mut session = QuizSession::new(
            vec![q(1, "misc", 2), q(2, "misc", 2)],
            no_seed(),
            Vec::new(),
            fixed_now(),
        );
        let answer = Answer::correct(&q(1, "misc", 2));
        session.submit_answer(&answer, fixed_now());
        let outcome = session.submit_answer(&answer, fixed_now());

        assert_eq!(session.progress().asked, 1);
        assert_eq!(outcome.snapshot.correct_streak(), 2);
    }
}
