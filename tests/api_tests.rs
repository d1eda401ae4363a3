// tests/api_tests.rs

use std::sync::Arc;

use quizroom::{
    config::{Config, StorageBackend},
    error::AppError,
    models::result::QuizResult,
    routes,
    services::{ResultStore, Services, memory::MemoryStore},
    state::AppState,
};
use uuid::Uuid;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// The app runs against the in-memory storage backend, so no database
/// is required.
async fn spawn_app() -> String {
    spawn_app_with(Services::memory()).await
}

/// Like `spawn_app`, but with caller-provided collaborator
/// implementations.
async fn spawn_app_with(services: Services) -> String {
    let config = Config {
        storage_backend: StorageBackend::Memory,
        database_url: None,
        bind_address: "127.0.0.1:0".to_string(),
        rust_log: "error".to_string(),
    };

    let state = AppState::new(services, config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Creates a 2-question quiz (60 + 40 points, answers "B" and "C") and
/// returns its room code.
async fn seed_quiz(
    client: &reqwest::Client,
    address: &str,
    eligible_classes: &[&str],
) -> String {
    let response = client
        .post(format!("{}/api/quizzes", address))
        .json(&serde_json::json!({
            "title": "Math1",
            "teacher_name": "Ms. Larsen",
            "eligible_classes": eligible_classes,
            "questions": [
                {
                    "prompt": "What is 7 x 8?",
                    "options": ["48", "56", "54", "64"],
                    "answer": "56",
                    "points": 60.0
                },
                {
                    "prompt": "What is 12 / 4?",
                    "options": ["2", "4", "3", "6"],
                    "answer": "3",
                    "points": 40.0
                }
            ]
        }))
        .send()
        .await
        .expect("Failed to create quiz");

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["code"].as_str().unwrap().to_string()
}

async fn enroll(
    client: &reqwest::Client,
    address: &str,
    student_id: uuid::Uuid,
    class_name: &str,
) {
    let response = client
        .post(format!("{}/api/classes/enroll", address))
        .json(&serde_json::json!({
            "student_id": student_id,
            "student_name": "Siti",
            "class_name": class_name
        }))
        .send()
        .await
        .expect("Failed to enroll");
    assert_eq!(response.status().as_u16(), 201);
}

async fn join(
    client: &reqwest::Client,
    address: &str,
    room_code: &str,
    student_id: uuid::Uuid,
) -> reqwest::Response {
    client
        .post(format!("{}/api/sessions/join", address))
        .json(&serde_json::json!({
            "room_code": room_code,
            "student_id": student_id,
            "student_name": "Siti"
        }))
        .send()
        .await
        .expect("Failed to execute join request")
}

#[tokio::test]
async fn unknown_path_returns_404() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn created_quiz_gets_a_six_char_room_code() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let code = seed_quiz(&client, &address, &[]).await;

    assert_eq!(code.len(), 6);
    assert!(
        code.chars()
            .all(|c| "ABCDEFGHJKLMNPQRSTUVWXYZ23456789".contains(c)),
        "code was: {}",
        code
    );
}

#[tokio::test]
async fn quiz_creation_rejects_bad_authoring() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    // Point sum over 100
    let response = client
        .post(format!("{}/api/quizzes", address))
        .json(&serde_json::json!({
            "title": "Overweight",
            "teacher_name": "Ms. Larsen",
            "questions": [
                { "prompt": "Q1", "options": ["A", "B", "C", "D"], "answer": "A", "points": 70.0 },
                { "prompt": "Q2", "options": ["A", "B", "C", "D"], "answer": "A", "points": 70.0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Not exactly four options
    let response = client
        .post(format!("{}/api/quizzes", address))
        .json(&serde_json::json!({
            "title": "Short",
            "teacher_name": "Ms. Larsen",
            "questions": [
                { "prompt": "Q1", "options": ["A", "B", "C"], "answer": "A", "points": 50.0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Answer not among the options
    let response = client
        .post(format!("{}/api/quizzes", address))
        .json(&serde_json::json!({
            "title": "Detached",
            "teacher_name": "Ms. Larsen",
            "questions": [
                { "prompt": "Q1", "options": ["A", "B", "C", "D"], "answer": "E", "points": 50.0 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn join_with_unknown_code_fails_not_found() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = join(&client, &address, "ZZZZZZ", uuid::Uuid::new_v4()).await;

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn room_codes_match_case_insensitively() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &[]).await;

    let response = join(&client, &address, &code.to_lowercase(), uuid::Uuid::new_v4()).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["question_index"], 0);
    assert_eq!(body["class_context"], "general");
    // The answer must never travel to the student.
    assert!(body["question"]["answer"].is_null());
}

#[tokio::test]
async fn full_quiz_flow_records_and_publishes_the_result() {
    // Arrange
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &[]).await;
    let student_id = uuid::Uuid::new_v4();

    // Act: join and answer both questions correctly
    let body: serde_json::Value = join(&client, &address, &code, student_id)
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();
    let quiz_id = {
        // Gradebook is addressed by quiz id; fetch it from the listing.
        let quizzes: serde_json::Value = client
            .get(format!("{}/api/quizzes", address))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        quizzes[0]["id"].as_str().unwrap().to_string()
    };

    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "56" }))
        .send()
        .await
        .unwrap();
    let advance1: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(advance1["finished"], false);
    assert_eq!(advance1["question_index"], 1);

    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "3" }))
        .send()
        .await
        .unwrap();
    let advance2: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // Assert: finished with the full score
    assert_eq!(advance2["finished"], true);
    assert_eq!(advance2["score"], 100.0);

    // Advancing a finished session is a conflict
    let response = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // Rejoining is blocked: the result exists
    let response = join(&client, &address, &code, student_id).await;
    assert_eq!(response.status().as_u16(), 409);

    // Gradebook shows the unpublished result
    let gradebook: serde_json::Value = client
        .get(format!("{}/api/results/quiz/{}", address, quiz_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(gradebook[0]["score"], 100.0);
    assert_eq!(gradebook[0]["published"], false);

    // Student history hides the score until publication
    let history: serde_json::Value = client
        .get(format!("{}/api/results/student/{}", address, student_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history[0]["published"], false);
    assert!(history[0]["score"].is_null());

    // Publish, then the score is visible
    let publish: serde_json::Value = client
        .post(format!("{}/api/results/quiz/{}/publish", address, quiz_id))
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(publish["affected"], 1);

    let history: serde_json::Value = client
        .get(format!("{}/api/results/student/{}", address, student_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history[0]["score"], 100.0);
}

#[tokio::test]
async fn partially_wrong_answers_score_partial_points() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &[]).await;

    let body: serde_json::Value = join(&client, &address, &code, uuid::Uuid::new_v4())
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Wrong on question 1, right on question 2
    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "48" }))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "3" }))
        .send()
        .await
        .unwrap();
    let finished: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(finished["finished"], true);
    assert_eq!(finished["score"], 40.0);
}

#[tokio::test]
async fn restricted_quiz_enforces_eligibility() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &["10A"]).await;
    let student_id = uuid::Uuid::new_v4();

    // Student from the wrong class: denied, and the message names the
    // required class.
    enroll(&client, &address, student_id, "10B").await;
    let response = join(&client, &address, &code, student_id).await;
    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("10A"));

    // Enrolled in the right class: allowed, and the single intersecting
    // class is fixed as the context immediately.
    enroll(&client, &address, student_id, "10A").await;
    let response = join(&client, &address, &code, student_id).await;
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["class_context"], "10A");
}

#[tokio::test]
async fn multiple_eligible_classes_require_a_choice_before_advancing() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &["10A", "10B"]).await;
    let student_id = uuid::Uuid::new_v4();
    enroll(&client, &address, student_id, "10A").await;
    enroll(&client, &address, student_id, "10B").await;

    let body: serde_json::Value = join(&client, &address, &code, student_id)
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();
    assert!(body["class_context"].is_null());
    assert_eq!(body["class_options"].as_array().unwrap().len(), 2);

    // Advancing before the choice is rejected
    let response = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Choose, then the attempt proceeds
    let response = client
        .post(format!("{}/api/sessions/{}/class", address, session_id))
        .json(&serde_json::json!({ "class_name": "10B" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let response = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn abandoned_attempt_can_be_retried() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &[]).await;
    let student_id = uuid::Uuid::new_v4();

    // First attempt: answer one question, never finish.
    let body: serde_json::Value = join(&client, &address, &code, student_id)
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();
    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "56" }))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();

    // No result was written, so a fresh join succeeds.
    let response = join(&client, &address, &code, student_id).await;
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn attention_signals_drive_the_alarm() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &[]).await;

    let body: serde_json::Value = join(&client, &address, &code, uuid::Uuid::new_v4())
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Tab hidden: alarm on
    let update: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/attention", address, session_id))
        .json(&serde_json::json!({ "signal": "page_hidden" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(update["alarm_on"], true);
    assert_eq!(update["warn"], false);

    // Tab shown: alarm off, one warning
    let update: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/attention", address, session_id))
        .json(&serde_json::json!({ "signal": "page_visible" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(update["alarm_on"], false);
    assert_eq!(update["warn"], true);

    // Finish the quiz, then signals have no effect
    for answer in ["56", "3"] {
        client
            .post(format!("{}/api/sessions/{}/answer", address, session_id))
            .json(&serde_json::json!({ "answer": answer }))
            .send()
            .await
            .unwrap();
        client
            .post(format!("{}/api/sessions/{}/advance", address, session_id))
            .send()
            .await
            .unwrap();
    }

    let update: serde_json::Value = client
        .post(format!("{}/api/sessions/{}/attention", address, session_id))
        .json(&serde_json::json!({ "signal": "page_hidden" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(update["alarm_on"], false);
    assert_eq!(update["warn"], false);
}

/// Result store whose writes always fail, for exercising the
/// fire-and-forget submission path.
struct FailingResultStore;

#[async_trait::async_trait]
impl ResultStore for FailingResultStore {
    async fn has_result(&self, _student_id: Uuid, _quiz_id: Uuid) -> Result<bool, AppError> {
        Ok(false)
    }

    async fn save_result(&self, _result: &QuizResult) -> Result<bool, AppError> {
        Err(AppError::InternalServerError(
            "result storage unavailable".to_string(),
        ))
    }

    async fn results_for_quiz(&self, _quiz_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        Ok(Vec::new())
    }

    async fn results_for_student(&self, _student_id: Uuid) -> Result<Vec<QuizResult>, AppError> {
        Ok(Vec::new())
    }

    async fn publish_quiz_results(&self, _quiz_id: Uuid, _published: bool) -> Result<u64, AppError> {
        Ok(0)
    }
}

#[tokio::test]
async fn result_write_failure_still_reports_the_finished_score() {
    // Arrange: quizzes and enrollments live in memory, result writes fail.
    let memory = Arc::new(MemoryStore::new());
    let services = Services {
        directory: memory.clone(),
        results: Arc::new(FailingResultStore),
        registry: memory,
    };
    let address = spawn_app_with(services).await;
    let client = reqwest::Client::new();
    let code = seed_quiz(&client, &address, &[]).await;
    let student_id = Uuid::new_v4();

    let body: serde_json::Value = join(&client, &address, &code, student_id)
        .await
        .json()
        .await
        .unwrap();
    let session_id = body["session_id"].as_str().unwrap().to_string();

    // Act: answer both questions correctly and submit.
    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "56" }))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{}/api/sessions/{}/answer", address, session_id))
        .json(&serde_json::json!({ "answer": "3" }))
        .send()
        .await
        .unwrap();
    let response = client
        .post(format!("{}/api/sessions/{}/advance", address, session_id))
        .send()
        .await
        .unwrap();

    // Assert: the failed write is swallowed; the student still sees the
    // finished state and their local score.
    assert_eq!(response.status().as_u16(), 200);
    let advance: serde_json::Value = response.json().await.unwrap();
    assert_eq!(advance["finished"], true);
    assert_eq!(advance["score"], 100.0);

    // Nothing was recorded.
    let history: serde_json::Value = client
        .get(format!("{}/api/results/student/{}", address, student_id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 0);

    // With no record in the store, the attempt is not even blocked from
    // being retried.
    let response = join(&client, &address, &code, student_id).await;
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn enrollment_rejects_malformed_class_names() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();

    for bad in ["13A", "0B", "10", "A10", "10AB"] {
        let response = client
            .post(format!("{}/api/classes/enroll", address))
            .json(&serde_json::json!({
                "student_id": uuid::Uuid::new_v4(),
                "student_name": "Siti",
                "class_name": bad
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 400, "accepted '{}'", bad);
    }
}
