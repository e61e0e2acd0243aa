use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;

/// Why a question was picked. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// A spaced-repetition review came due.
    Review,
    /// The topic is weak or was missed earlier in the session.
    Reinforce,
    /// Normal learning; also used by the fallback stage.
    Progress,
    /// A hard question for a confident topic.
    Stretch,
}

impl Purpose {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Review => "review",
            Purpose::Reinforce => "reinforce",
            Purpose::Progress => "progress",
            Purpose::Stretch => "stretch",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The question chosen for the next turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionResult {
    pub question_id: QuestionId,
    pub purpose: Purpose,
}

impl SelectionResult {
    #[must_use]
    pub fn new(question_id: QuestionId, purpose: Purpose) -> Self {
        Self {
            question_id,
            purpose,
        }
    }
}
