use async_trait::async_trait;
use quiz_core::QuizSession;
use quiz_core::model::{
    Difficulty, LearnerId, QuestionId, QuestionMeta, ReviewItem, SessionId, TopicId, TopicSnapshot,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── QUESTION CONTENT ──────────────────────────────────────────────────────────
//

/// Full question as kept by the question bank.
///
/// The engine only ever sees [`QuestionRecord::meta`]; prompt, options and
/// the answer key stay on this side of the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub difficulty: Difficulty,
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
}

impl QuestionRecord {
    #[must_use]
    pub fn meta(&self) -> QuestionMeta {
        QuestionMeta::new(self.id, self.topic_id.clone(), self.difficulty)
    }
}

/// Read/write access to question content.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Insert or replace a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the question cannot be stored.
    async fn upsert_question(&self, question: &QuestionRecord) -> Result<(), StorageError>;

    /// Fetch one question by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; a missing id is `Ok(None)`.
    async fn get_question(&self, id: QuestionId) -> Result<Option<QuestionRecord>, StorageError>;

    /// All questions, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StorageError>;
}

//
// ─── LEARNER PROGRESS ──────────────────────────────────────────────────────────
//

/// Durable per-learner topic snapshots and review schedule.
///
/// Seeds new sessions and receives updated snapshots after answers. Snapshots
/// come back in the order their topics were first saved.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures or rows that fail validation.
    async fn load_snapshots(&self, learner: &LearnerId) -> Result<Vec<TopicSnapshot>, StorageError>;

    /// Insert or replace the snapshot for its topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be stored.
    async fn save_snapshot(
        &self,
        learner: &LearnerId,
        snapshot: &TopicSnapshot,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn load_reviews(&self, learner: &LearnerId) -> Result<Vec<ReviewItem>, StorageError>;

    /// Insert or replace the review date for its topic.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the review cannot be stored.
    async fn upsert_review(&self, learner: &LearnerId, review: &ReviewItem)
    -> Result<(), StorageError>;
}

//
// ─── SESSION STORE ─────────────────────────────────────────────────────────────
//

/// A live session plus the learner it belongs to, if any.
#[derive(Debug)]
pub struct StoredSession {
    pub learner: Option<LearnerId>,
    pub session: QuizSession,
}

/// Exclusive access to one session.
///
/// An async mutex: a turn keeps it held until the learner's progress write has
/// finished, so writes for one session land in turn order.
pub type SessionHandle = Arc<tokio::sync::Mutex<StoredSession>>;

/// Keyed store of live sessions.
///
/// Each session sits behind its own lock so turns on different sessions never
/// wait on each other. Eviction of finished or abandoned sessions is up to the caller.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session and return its handle.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a session with the same id exists.
    async fn put(&self, session: StoredSession) -> Result<SessionHandle, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures; an unknown id is `Ok(None)`.
    async fn get(&self, id: SessionId) -> Result<Option<SessionHandle>, StorageError>;

    /// Remove a session. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete(&self, id: SessionId) -> Result<bool, StorageError>;
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

//
// ─── IN-MEMORY ADAPTERS ────────────────────────────────────────────────────────
//

/// In-memory question bank and progress store for tests and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    questions: Arc<Mutex<HashMap<QuestionId, QuestionRecord>>>,
    snapshots: Arc<Mutex<HashMap<LearnerId, Vec<TopicSnapshot>>>>,
    reviews: Arc<Mutex<HashMap<LearnerId, Vec<ReviewItem>>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuestionBank for InMemoryRepository {
    async fn upsert_question(&self, question: &QuestionRecord) -> Result<(), StorageError> {
        let mut guard = self.questions.lock().map_err(poisoned)?;
        guard.insert(question.id, question.clone());
        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuestionRecord>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn list_questions(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self.questions.lock().map_err(poisoned)?;
        let mut all: Vec<QuestionRecord> = guard.values().cloned().collect();
        all.sort_by_key(|q| q.id);
        Ok(all)
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn load_snapshots(&self, learner: &LearnerId) -> Result<Vec<TopicSnapshot>, StorageError> {
        let guard = self.snapshots.lock().map_err(poisoned)?;
        Ok(guard.get(learner).cloned().unwrap_or_default())
    }

    async fn save_snapshot(
        &self,
        learner: &LearnerId,
        snapshot: &TopicSnapshot,
    ) -> Result<(), StorageError> {
        let mut guard = self.snapshots.lock().map_err(poisoned)?;
        let topics = guard.entry(learner.clone()).or_default();
        match topics
            .iter_mut()
            .find(|s| s.topic_id() == snapshot.topic_id())
        {
            Some(existing) => *existing = snapshot.clone(),
            None => topics.push(snapshot.clone()),
        }
        Ok(())
    }

    async fn load_reviews(&self, learner: &LearnerId) -> Result<Vec<ReviewItem>, StorageError> {
        let guard = self.reviews.lock().map_err(poisoned)?;
        Ok(guard.get(learner).cloned().unwrap_or_default())
    }

    async fn upsert_review(
        &self,
        learner: &LearnerId,
        review: &ReviewItem,
    ) -> Result<(), StorageError> {
        let mut guard = self.reviews.lock().map_err(poisoned)?;
        let items = guard.entry(learner.clone()).or_default();
        match items.iter_mut().find(|r| r.topic_id == review.topic_id) {
            Some(existing) => *existing = review.clone(),
            None => items.push(review.clone()),
        }
        Ok(())
    }
}

/// Process-local session store with one mutex per session.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionHandle>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the map lock is poisoned.
    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.sessions.read().map_err(poisoned)?.len())
    }

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the map lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: StoredSession) -> Result<SessionHandle, StorageError> {
        let id = session.session.id();
        let mut guard = self.sessions.write().map_err(poisoned)?;
        if guard.contains_key(&id) {
            return Err(StorageError::Conflict);
        }
        let handle: SessionHandle = Arc::new(tokio::sync::Mutex::new(session));
        guard.insert(id, Arc::clone(&handle));
        Ok(handle)
    }

    async fn get(&self, id: SessionId) -> Result<Option<SessionHandle>, StorageError> {
        let guard = self.sessions.read().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn delete(&self, id: SessionId) -> Result<bool, StorageError> {
        let mut guard = self.sessions.write().map_err(poisoned)?;
        Ok(guard.remove(&id).is_some())
    }
}

//
// ─── AGGREGATE ─────────────────────────────────────────────────────────────────
//

/// Question bank, progress store and session store behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionBank>,
    pub progress: Arc<dyn ProgressRepository>,
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let questions: Arc<dyn QuestionBank> = Arc::new(repo.clone());
        let progress: Arc<dyn ProgressRepository> = Arc::new(repo);
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self {
            questions,
            progress,
            sessions,
        }
    }
}
