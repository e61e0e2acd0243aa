mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use workflow::{AnswerOutcome, QuizLoopService, SessionStart};
