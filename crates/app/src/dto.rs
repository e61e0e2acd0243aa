//! Request and response bodies for the quiz routes.
//!
//! Question bodies never carry the answer key.

use quiz_core::model::{
    Answer, Difficulty, LearnerId, Purpose, QuestionId, SessionId, TopicId, TopicSnapshot,
};
use serde::{Deserialize, Serialize};
use storage::repository::QuestionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Continue,
    Finished,
}

impl QuizStatus {
    #[must_use]
    pub fn from_next<T>(next: Option<&T>) -> Self {
        if next.is_some() {
            Self::Continue
        } else {
            Self::Finished
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionResponse {
    pub id: QuestionId,
    pub prompt: String,
    pub options: Vec<String>,
    pub purpose: Purpose,
}

impl QuestionResponse {
    #[must_use]
    pub fn new(record: QuestionRecord, purpose: Purpose) -> Self {
        Self {
            id: record.id,
            prompt: record.prompt,
            options: record.options,
            purpose,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartQuizRequest {
    #[serde(default)]
    pub learner_id: Option<LearnerId>,
}

#[derive(Debug, Serialize)]
pub struct StartQuizResponse {
    pub session_id: SessionId,
    pub status: QuizStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionResponse>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerQuizRequest {
    pub session_id: SessionId,
    pub question_id: QuestionId,
    pub topic_id: TopicId,
    pub was_correct: bool,
    /// Any integer is accepted; levels other than 1..=3 score as medium.
    pub difficulty: i64,
}

impl AnswerQuizRequest {
    #[must_use]
    pub fn answer(&self) -> Answer {
        Answer {
            question_id: self.question_id,
            topic_id: self.topic_id.clone(),
            was_correct: self.was_correct,
            difficulty: Difficulty::from_level(u8::try_from(self.difficulty).unwrap_or(0)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AnswerQuizResponse {
    pub status: QuizStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<QuestionResponse>,
    pub mastery: TopicSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    pub status: QuizStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionResponse>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(difficulty: i64) -> AnswerQuizRequest {
        AnswerQuizRequest {
            session_id: SessionId::generate(),
            question_id: QuestionId::new(1),
            topic_id: "articles".into(),
            was_correct: true,
            difficulty,
        }
    }

    #[test]
    fn difficulty_keeps_known_levels() {
        assert_eq!(request(1).answer().difficulty, Difficulty::EASY);
        assert_eq!(request(3).answer().difficulty, Difficulty::HARD);
    }

    #[test]
    fn difficulty_outside_u8_is_unrecognized() {
        for level in [-1, 300, i64::MAX] {
            assert!(!request(level).answer().difficulty.is_recognized());
        }
        assert!(!request(9).answer().difficulty.is_recognized());
    }
}
