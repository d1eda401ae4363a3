// src/routes.rs

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{quiz, results, session},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (quizzes, classes, sessions, results).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (collaborator services + session table).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    let quiz_routes = Router::new()
        .route("/", post(quiz::create_quiz).get(quiz::list_quizzes));

    let class_routes = Router::new().route("/enroll", post(quiz::enroll));

    let session_routes = Router::new()
        .route("/join", post(session::join))
        .route("/{id}/class", post(session::select_class))
        .route("/{id}/answer", post(session::select_answer))
        .route("/{id}/advance", post(session::advance))
        .route("/{id}/attention", post(session::attention));

    let result_routes = Router::new()
        .route("/quiz/{quiz_id}", get(results::gradebook))
        .route("/quiz/{quiz_id}/publish", post(results::publish))
        .route("/student/{student_id}", get(results::history));

    Router::new()
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/classes", class_routes)
        .nest("/api/sessions", session_routes)
        .nest("/api/results", result_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
