use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use quiz_core::model::{Difficulty, QuestionId};
use quiz_core::time::fixed_clock;
use serde_json::{Value, json};
use services::AppServices;
use storage::repository::{QuestionBank, QuestionRecord, Storage};
use tower::ServiceExt;

async fn demo_app() -> Router {
    let services = AppServices::in_memory(fixed_clock());
    services.seed_demo_if_empty().await.unwrap();
    app::create_app(&services)
}

async fn single_question_app() -> Router {
    let storage = Storage::in_memory();
    storage
        .questions
        .upsert_question(&QuestionRecord {
            id: QuestionId::new(1),
            topic_id: "articles".into(),
            difficulty: Difficulty::MEDIUM,
            prompt: "Choose the correct article: ___ university".into(),
            options: vec!["a".into(), "an".into(), "the".into()],
            correct_answer: "a".into(),
            explanation: "'University' starts with a 'you' sound, so we use 'a'.".into(),
        })
        .await
        .unwrap();
    app::create_app(&AppServices::from_storage(storage, fixed_clock()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_is_ok() {
    let app = demo_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn start_then_answer_reinforces_missed_topic() {
    let app = demo_app().await;

    let (status, start) = send(&app, Method::POST, "/quiz/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(start["status"], "continue");
    let question = &start["question"];
    assert_eq!(question["id"], 2);
    assert_eq!(question["purpose"], "progress");
    assert!(question["options"].as_array().is_some_and(|o| !o.is_empty()));
    assert!(question.get("correct_answer").is_none());

    let session_id = start["session_id"].as_str().unwrap().to_string();
    let (status, answer) = send(
        &app,
        Method::POST,
        "/quiz/answer",
        Some(json!({
            "session_id": session_id,
            "question_id": 2,
            "topic_id": "articles",
            "was_correct": false,
            "difficulty": 2,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["status"], "continue");
    assert_eq!(answer["mastery"]["topic_id"], "articles");
    assert_eq!(answer["mastery"]["wrong_streak"], 1);
    assert_eq!(answer["next_question"]["id"], 1);
    assert_eq!(answer["next_question"]["purpose"], "reinforce");
    assert!(answer["explanation"].is_string());

    let (status, peek) = send(&app, Method::GET, &format!("/quiz/{session_id}/next"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(peek["question"]["id"], 1);

    let (status, progress) =
        send(&app, Method::GET, &format!("/quiz/{session_id}/progress"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["asked"], 1);
    assert_eq!(progress["mistakes"], 1);
    assert_eq!(progress["is_complete"], false);
}

#[tokio::test]
async fn finished_session_rejects_further_answers() {
    let app = single_question_app().await;

    let (_, start) = send(
        &app,
        Method::POST,
        "/quiz/start",
        Some(json!({ "learner_id": "learner-1" })),
    )
    .await;
    let session_id = start["session_id"].as_str().unwrap().to_string();
    let answer = json!({
        "session_id": session_id,
        "question_id": 1,
        "topic_id": "articles",
        "was_correct": true,
        "difficulty": 2,
    });

    let (status, body) = send(&app, Method::POST, "/quiz/answer", Some(answer.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "finished");
    assert!(body.get("next_question").is_none());
    assert_eq!(body["mastery"]["mastery"], 5.0);

    let (status, body) = send(&app, Method::POST, "/quiz/answer", Some(answer)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn empty_bank_starts_finished() {
    let app = app::create_app(&AppServices::in_memory(fixed_clock()));
    let (status, start) = send(&app, Method::POST, "/quiz/start", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(start["status"], "finished");
    assert!(start.get("question").is_none());

    let uri = format!("/quiz/{}/progress", start["session_id"].as_str().unwrap());
    let (status, progress) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(progress["is_complete"], true);
}

#[tokio::test]
async fn unknown_sessions_are_not_found() {
    let app = demo_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/quiz/answer",
        Some(json!({
            "session_id": "6f1c2f9e-3b7a-4c1d-9a51-0d2b8e6f4a10",
            "question_id": 1,
            "topic_id": "articles",
            "was_correct": true,
            "difficulty": 1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(&app, Method::GET, "/quiz/not-a-uuid/next", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_ends_session() {
    let app = demo_app().await;
    let (_, start) = send(&app, Method::POST, "/quiz/start", None).await;
    let uri = format!("/quiz/{}", start["session_id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_start_body_is_bad_request() {
    let app = demo_app().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/quiz/start")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn out_of_range_difficulty_scores_as_medium() {
    let app = demo_app().await;
    let (_, start) = send(&app, Method::POST, "/quiz/start", None).await;
    let session_id = start["session_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/quiz/answer",
        Some(json!({
            "session_id": session_id,
            "question_id": 2,
            "topic_id": "articles",
            "was_correct": true,
            "difficulty": 300,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mastery"]["mastery"], 5.0);

    let (status, body) = send(
        &app,
        Method::POST,
        "/quiz/answer",
        Some(json!({
            "session_id": session_id,
            "question_id": 1,
            "topic_id": "articles",
            "was_correct": true,
            "difficulty": -1,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mastery"]["mastery"], 10.0);
}
