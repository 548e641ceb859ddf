// src/routes.rs

use axum::{
    Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, event, forms, quiz},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, quizzes, submissions, events, admin, forms).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (Database Pool, Config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let quiz_routes = Router::new()
        .route("/", get(quiz::list_quizzes))
        .route("/submit", post(quiz::submit_quiz))
        .route("/{id}", get(quiz::get_quiz))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let submission_routes = Router::new()
        .route("/", get(quiz::list_my_submissions))
        .route("/{id}", get(quiz::get_submission))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let event_routes = Router::new()
        .route("/", get(event::list_upcoming))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/quizzes", post(admin::create_quiz))
        .route("/questions", post(admin::create_question))
        .route("/answers", post(admin::create_answer))
        .route("/events", post(admin::create_event))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Server-rendered form path; shares the submission workflow with the API.
    let form_routes = Router::new()
        .route("/{id}/submit", post(forms::submit_quiz_form))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", quiz_routes)
        .nest("/api/submissions", submission_routes)
        .nest("/api/events", event_routes)
        .nest("/api/admin", admin_routes)
        .nest("/quizzes", form_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
