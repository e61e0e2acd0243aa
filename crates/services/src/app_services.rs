use std::sync::Arc;

use storage::demo::seed_demo_questions;
use storage::repository::{QuestionBank, Storage};

use crate::Clock;
use crate::error::AppServicesError;
use crate::sessions::QuizLoopService;

/// Assembles the quiz services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    questions: Arc<dyn QuestionBank>,
    quiz_loop: Arc<QuizLoopService>,
}

impl AppServices {
    /// Build services backed by in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            Arc::clone(&storage.questions),
            Arc::clone(&storage.progress),
            Arc::clone(&storage.sessions),
        ));
        Self {
            questions: storage.questions,
            quiz_loop,
        }
    }

    /// Load the built-in demo questions when the bank is empty.
    ///
    /// Returns how many questions were written; an already populated bank is left alone.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Storage` if reading or writing the bank fails.
    pub async fn seed_demo_if_empty(&self) -> Result<usize, AppServicesError> {
        if !self.questions.list_questions().await?.is_empty() {
            tracing::debug!("question bank already populated, skipping demo seed");
            return Ok(0);
        }
        Ok(seed_demo_questions(self.questions.as_ref()).await?)
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_clock;
    use storage::demo::demo_questions;

    #[tokio::test]
    async fn demo_seed_runs_once() {
        let services = AppServices::in_memory(fixed_clock());
        let first = services.seed_demo_if_empty().await.unwrap();
        assert_eq!(first, demo_questions().len());
        assert_eq!(services.seed_demo_if_empty().await.unwrap(), 0);
    }
}
