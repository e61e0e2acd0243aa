use std::sync::Arc;

use quiz_core::model::{
    Answer, LearnerId, QuestionId, SelectionResult, SessionId, TopicSnapshot,
};
use quiz_core::{MasteryModel, QuizSession, SessionProgress};
use storage::repository::{
    ProgressRepository, QuestionBank, QuestionRecord, SessionHandle, SessionStore, StoredSession,
};

use crate::Clock;
use crate::error::SessionError;

/// A freshly started session and the first question it would serve.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStart {
    pub session_id: SessionId,
    pub next: Option<SelectionResult>,
}

/// Result of answering one question in a session.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub next: Option<SelectionResult>,
    pub snapshot: TopicSnapshot,
    pub is_complete: bool,
}

/// Orchestrates session start, answering and teardown over the storage traits.
///
/// Each turn runs under the session's own lock, including the write of the
/// learner's updated snapshot.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    model: MasteryModel,
    questions: Arc<dyn QuestionBank>,
    progress: Arc<dyn ProgressRepository>,
    sessions: Arc<dyn SessionStore>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionBank>,
        progress: Arc<dyn ProgressRepository>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            clock,
            model: MasteryModel::default(),
            questions,
            progress,
            sessions,
        }
    }

    #[must_use]
    pub fn with_mastery_model(mut self, model: MasteryModel) -> Self {
        self.model = model;
        self
    }

    /// Start a session over the whole question bank.
    ///
    /// Known learners start from their stored snapshots and review schedule;
    /// anonymous sessions start with every topic at zero.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if loading content or progress fails.
    pub async fn start_session(
        &self,
        learner: Option<LearnerId>,
    ) -> Result<SessionStart, SessionError> {
        let pool = self
            .questions
            .list_questions()
            .await?
            .iter()
            .map(QuestionRecord::meta)
            .collect();

        let (snapshots, reviews) = match &learner {
            Some(learner) => (
                self.progress.load_snapshots(learner).await?,
                self.progress.load_reviews(learner).await?,
            ),
            None => (Vec::new(), Vec::new()),
        };

        let now = self.clock.now();
        let session = QuizSession::new(pool, snapshots, reviews, now)
            .with_mastery_model(self.model.clone());
        let session_id = session.id();
        let next = session.next_question(now);

        tracing::info!(
            session_id = %session_id,
            learner = learner.as_ref().map(LearnerId::as_str),
            pool = session.pool().len(),
            topics = session.snapshots().len(),
            "quiz session started"
        );
        log_selection(session_id, next.as_ref());

        self.sessions.put(StoredSession { learner, session }).await?;

        Ok(SessionStart { session_id, next })
    }

    /// The question the session would serve now, without consuming it.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for unknown ids.
    pub async fn peek(&self, session_id: SessionId) -> Result<Option<SelectionResult>, SessionError> {
        let handle = self.handle(session_id).await?;
        let now = self.clock.now();
        let guard = handle.lock().await;
        Ok(guard.session.next_question(now))
    }

    /// Apply one answer and pick the following question.
    ///
    /// The updated snapshot is written to the learner's progress when the session
    /// belongs to one, before the session is released to the next turn. A failed
    /// write is logged and does not fail the turn.
    ///
    /// # Errors
    ///
    /// - `SessionError::NotFound` for unknown ids
    /// - `SessionError::Completed` if the session has already finished
    pub async fn answer(
        &self,
        session_id: SessionId,
        answer: &Answer,
    ) -> Result<AnswerOutcome, SessionError> {
        let handle = self.handle(session_id).await?;
        let now = self.clock.now();

        let mut guard = handle.lock().await;
        if guard.session.is_finished() {
            return Err(SessionError::Completed);
        }
        let turn = guard.session.submit_answer(answer, now);
        let outcome = AnswerOutcome {
            is_complete: guard.session.is_finished(),
            next: turn.next,
            snapshot: turn.snapshot,
        };

        tracing::debug!(
            session_id = %session_id,
            question_id = %answer.question_id,
            topic_id = %answer.topic_id,
            was_correct = answer.was_correct,
            mastery = outcome.snapshot.mastery(),
            "answer applied"
        );
        log_selection(session_id, outcome.next.as_ref());
        if outcome.is_complete {
            tracing::info!(session_id = %session_id, "quiz session finished");
        }

        // Still under the session lock, so a later turn cannot be overwritten.
        if let Some(learner) = &guard.learner {
            if let Err(err) = self.progress.save_snapshot(learner, &outcome.snapshot).await {
                tracing::warn!(
                    session_id = %session_id,
                    learner = learner.as_str(),
                    topic_id = %outcome.snapshot.topic_id(),
                    error = %err,
                    "failed to persist topic snapshot"
                );
            }
        }

        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `SessionError::NotFound` for unknown ids.
    pub async fn progress(&self, session_id: SessionId) -> Result<SessionProgress, SessionError> {
        let handle = self.handle(session_id).await?;
        let now = self.clock.now();
        let guard = handle.lock().await;
        let mut progress = guard.session.progress();
        // A session with nothing left to serve is complete even before its first answer.
        progress.is_complete |= guard.session.next_question(now).is_none();
        Ok(progress)
    }

    /// Drop a session from the store. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` on store failures.
    pub async fn end_session(&self, session_id: SessionId) -> Result<bool, SessionError> {
        let removed = self.sessions.delete(session_id).await?;
        if removed {
            tracing::info!(session_id = %session_id, "quiz session ended");
        }
        Ok(removed)
    }

    /// Question content for rendering.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the bank lookup fails.
    pub async fn question(&self, id: QuestionId) -> Result<Option<QuestionRecord>, SessionError> {
        Ok(self.questions.get_question(id).await?)
    }

    async fn handle(&self, session_id: SessionId) -> Result<SessionHandle, SessionError> {
        self.sessions
            .get(session_id)
            .await?
            .ok_or(SessionError::NotFound(session_id))
    }
}

fn log_selection(session_id: SessionId, next: Option<&SelectionResult>) {
    match next {
        Some(selection) => tracing::debug!(
            session_id = %session_id,
            question_id = %selection.question_id,
            purpose = %selection.purpose,
            "question selected"
        ),
        None => tracing::debug!(session_id = %session_id, "no eligible question"),
    }
}
