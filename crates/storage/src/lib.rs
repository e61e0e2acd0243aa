#![forbid(unsafe_code)]

pub mod demo;
pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, InMemorySessionStore, ProgressRepository, QuestionBank, QuestionRecord,
    SessionHandle, SessionStore, Storage, StorageError, StoredSession,
};
