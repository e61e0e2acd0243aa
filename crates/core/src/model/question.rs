use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::{QuestionId, TopicId};

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Question difficulty on the 1 (easy) – 3 (hard) scale.
///
/// Values outside the scale are kept as-is rather than rejected: the mastery
/// model scores them like `MEDIUM`, and no selection stage ever matches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const EASY: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const HARD: Self = Self(3);

    #[must_use]
    pub fn from_level(level: u8) -> Self {
        Self(level)
    }

    #[must_use]
    pub fn level(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn is_recognized(self) -> bool {
        (1..=3).contains(&self.0)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::MEDIUM
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::EASY => f.write_str("easy"),
            Self::MEDIUM => f.write_str("medium"),
            Self::HARD => f.write_str("hard"),
            Self(other) => write!(f, "level {other}"),
        }
    }
}

//
// ─── QUESTION METADATA ─────────────────────────────────────────────────────────
//

/// The part of a question the engine needs: no prompt, no answer key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionMeta {
    pub id: QuestionId,
    pub topic_id: TopicId,
    pub difficulty: Difficulty,
}

impl QuestionMeta {
    #[must_use]
    pub fn new(id: QuestionId, topic_id: impl Into<TopicId>, difficulty: Difficulty) -> Self {
        Self {
            id,
            topic_id: topic_id.into(),
            difficulty,
        }
    }
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A judged answer as reported by the caller.
///
/// Correctness is decided outside the engine; `topic_id` and `difficulty` are
/// taken as given and not cross-checked against the pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub topic_id: TopicId,
    pub was_correct: bool,
    pub difficulty: Difficulty,
}

impl Answer {
    #[must_use]
    pub fn correct(question: &QuestionMeta) -> Self {
        Self::for_question(question, true)
    }

    #[must_use]
    pub fn wrong(question: &QuestionMeta) -> Self {
        Self::for_question(question, false)
    }

    fn for_question(question: &QuestionMeta, was_correct: bool) -> Self {
        Self {
            question_id: question.id,
            topic_id: question.topic_id.clone(),
            was_correct,
            difficulty: question.difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_to_three_are_recognized() {
        assert!(Difficulty::EASY.is_recognized());
        assert!(Difficulty::HARD.is_recognized());
        assert!(!Difficulty::from_level(0).is_recognized());
        assert!(!Difficulty::from_level(7).is_recognized());
    }

    #[test]
    fn difficulty_deserializes_from_number() {
        let d: Difficulty = serde_json::from_str("3").unwrap();
        assert_eq!(d, Difficulty::HARD);
        assert_eq!(d.to_string(), "hard");
        assert_eq!(Difficulty::from_level(9).to_string(), "level 9");
    }

    #[test]
    fn answer_helpers_copy_question_metadata() {
        let q = QuestionMeta::new(QuestionId::new(4), "articles", Difficulty::EASY);
        let a = Answer::wrong(&q);
        assert_eq!(a.question_id, QuestionId::new(4));
        assert_eq!(a.topic_id, TopicId::from("articles"));
        assert!(!a.was_correct);
        assert_eq!(a.difficulty, Difficulty::EASY);
    }
}
