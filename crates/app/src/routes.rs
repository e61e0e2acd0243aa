use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use quiz_core::SessionProgress;
use quiz_core::model::{SelectionResult, SessionId};
use services::QuizLoopService;

use crate::dto::{
    AnswerQuizRequest, AnswerQuizResponse, HealthResponse, NextQuestionResponse, QuestionResponse,
    QuizStatus, StartQuizRequest, StartQuizResponse,
};
use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    quiz: Arc<QuizLoopService>,
}

impl AppState {
    #[must_use]
    pub fn new(quiz: Arc<QuizLoopService>) -> Self {
        Self { quiz }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/quiz/start", post(start_quiz))
        .route("/quiz/answer", post(answer_quiz))
        .route("/quiz/:session_id/next", get(next_question))
        .route("/quiz/:session_id/progress", get(progress))
        .route("/quiz/:session_id", delete(end_quiz))
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

async fn start_quiz(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<StartQuizResponse>, AppError> {
    // An empty body starts an anonymous session.
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        StartQuizRequest::default()
    } else {
        serde_json::from_slice::<StartQuizRequest>(&body)
            .map_err(|e| AppError::bad_request(format!("invalid start request: {e}")))?
    };

    let start = state.quiz.start_session(request.learner_id).await?;
    let question = render(&state.quiz, start.next).await?;

    Ok(Json(StartQuizResponse {
        session_id: start.session_id,
        status: QuizStatus::from_next(question.as_ref()),
        question,
    }))
}

async fn answer_quiz(
    State(state): State<AppState>,
    Json(request): Json<AnswerQuizRequest>,
) -> Result<Json<AnswerQuizResponse>, AppError> {
    let outcome = state
        .quiz
        .answer(request.session_id, &request.answer())
        .await?;

    let explanation = state
        .quiz
        .question(request.question_id)
        .await?
        .map(|q| q.explanation)
        .filter(|e| !e.is_empty());
    let next_question = render(&state.quiz, outcome.next).await?;

    Ok(Json(AnswerQuizResponse {
        status: QuizStatus::from_next(next_question.as_ref()),
        next_question,
        mastery: outcome.snapshot,
        explanation,
    }))
}

async fn next_question(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<NextQuestionResponse>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    let next = state.quiz.peek(session_id).await?;
    let question = render(&state.quiz, next).await?;

    Ok(Json(NextQuestionResponse {
        status: QuizStatus::from_next(question.as_ref()),
        question,
    }))
}

async fn progress(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionProgress>, AppError> {
    let session_id = parse_session_id(&session_id)?;
    Ok(Json(state.quiz.progress(session_id).await?))
}

async fn end_quiz(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let session_id = parse_session_id(&session_id)?;
    if state.quiz.end_session(session_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("session not found"))
    }
}

// A malformed id can never name a live session.
fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse()
        .map_err(|_| AppError::not_found("session not found"))
}

async fn render(
    quiz: &QuizLoopService,
    selection: Option<SelectionResult>,
) -> Result<Option<QuestionResponse>, AppError> {
    let Some(selection) = selection else {
        return Ok(None);
    };
    let record = quiz.question(selection.question_id).await?.ok_or_else(|| {
        tracing::error!(question_id = %selection.question_id, "selected question missing from bank");
        AppError::internal("selected question missing from bank")
    })?;
    Ok(Some(QuestionResponse::new(record, selection.purpose)))
}
