// tests/api_tests.rs

use quizevent::{config::Config, routes, state::AppState};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Helper to spawn the app on a random port against a fresh in-memory
/// database. Returns the base URL and the pool for direct seeding/asserts.
async fn spawn_app() -> (String, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        admin_username: None,
        admin_password: None,
    };

    let state = AppState { pool: pool.clone(), config };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (address, pool)
}

fn unique_name(prefix: &str) -> String {
    format!("{}_{}", prefix, &uuid::Uuid::new_v4().to_string()[..8])
}

/// Builds the JSON body for a quiz submission from (question id, value) pairs.
fn submit_body(quiz_id: i64, answers: &[(i64, String)]) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = answers
        .iter()
        .map(|(question_id, value)| {
            (question_id.to_string(), serde_json::Value::String(value.clone()))
        })
        .collect();
    serde_json::json!({ "quiz_id": quiz_id, "answers": map })
}

async fn register(client: &reqwest::Client, address: &str, username: &str) {
    let response = client
        .post(format!("{address}/api/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "Password123"
        }))
        .send()
        .await
        .expect("Register failed");
    assert_eq!(response.status().as_u16(), 201);
}

async fn login(client: &reqwest::Client, address: &str, username: &str) -> String {
    let body = client
        .post(format!("{address}/api/auth/login"))
        .json(&serde_json::json!({
            "username": username,
            "password": "Password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    body["token"].as_str().expect("Token not found").to_string()
}

async fn promote_to_admin(pool: &SqlitePool, username: &str) {
    sqlx::query("UPDATE users SET role = 'admin' WHERE username = ?")
        .bind(username)
        .execute(pool)
        .await
        .unwrap();
}

/// Registers a fresh admin and returns its bearer token.
async fn admin_token(client: &reqwest::Client, address: &str, pool: &SqlitePool) -> String {
    let username = unique_name("admin");
    register(client, address, &username).await;
    promote_to_admin(pool, &username).await;
    login(client, address, &username).await
}

/// Creates a quiz with one MCQ question (Paris correct, Lyon not) via the
/// admin API. Returns (quiz_id, question_id, paris_id, lyon_id).
async fn seed_capitals_quiz(
    client: &reqwest::Client,
    address: &str,
    token: &str,
) -> (i64, i64, i64, i64) {
    let quiz: serde_json::Value = client
        .post(format!("{address}/api/admin/quizzes"))
        .bearer_auth(token)
        .json(&serde_json::json!({ "title": "Capitals", "description": "European capitals" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let quiz_id = quiz["quiz"]["id"].as_i64().unwrap();

    let question: serde_json::Value = client
        .post(format!("{address}/api/admin/questions"))
        .bearer_auth(token)
        .json(&serde_json::json!({
            "quiz_id": quiz_id,
            "text": "Capital of France?",
            "question_type": "MCQ"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_id = question["question"]["id"].as_i64().unwrap();

    let mut option_ids = Vec::new();
    for (text, is_correct) in [("Paris", true), ("Lyon", false)] {
        let answer: serde_json::Value = client
            .post(format!("{address}/api/admin/answers"))
            .bearer_auth(token)
            .json(&serde_json::json!({
                "question_id": question_id,
                "text": text,
                "is_correct": is_correct
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        option_ids.push(answer["answer"]["id"].as_i64().unwrap());
    }

    (quiz_id, question_id, option_ids[0], option_ids[1])
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{address}/random_path_that_does_not_exist"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &address, &unique_name("u")).await;
}

#[tokio::test]
async fn register_fails_validation() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    // Username too short
    let response = client
        .post(format!("{address}/api/auth/register"))
        .json(&serde_json::json!({
            "username": "yo",
            "email": "yo@example.com",
            "password": "Password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    // Password without a digit
    let response = client
        .post(format!("{address}/api/auth/register"))
        .json(&serde_json::json!({
            "username": unique_name("u"),
            "email": "nodigit@example.com",
            "password": "Passwordxx"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    register(&client, &address, &username).await;

    let response = client
        .post(format!("{address}/api/auth/register"))
        .json(&serde_json::json!({
            "username": username,
            "email": "other@example.com",
            "password": "Password123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_is_401() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    register(&client, &address, &username).await;

    let response = client
        .post(format!("{address}/api/auth/login"))
        .json(&serde_json::json!({ "username": username, "password": "Wrong123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn protected_routes_require_token() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{address}/api/quizzes"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn admin_routes_reject_plain_users() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    register(&client, &address, &username).await;
    let token = login(&client, &address, &username).await;

    let response = client
        .post(format!("{address}/api/admin/quizzes"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "title": "Nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}

#[tokio::test]
async fn quiz_creation_reports_field_errors() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;

    let response = client
        .post(format!("{address}/api/admin/quizzes"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "title": "ab" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["errors"]["title"].is_string());
}

#[tokio::test]
async fn duplicate_question_conflicts_case_insensitively() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;
    let (quiz_id, _question_id, _paris_id, _lyon_id) =
        seed_capitals_quiz(&client, &address, &token).await;

    let response = client
        .post(format!("{address}/api/admin/questions"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "quiz_id": quiz_id,
            "text": "capital of FRANCE?",
            "question_type": "MCQ"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
}

#[tokio::test]
async fn second_correct_answer_conflicts() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;
    let (_quiz_id, question_id, _paris_id, _lyon_id) =
        seed_capitals_quiz(&client, &address, &token).await;

    let response = client
        .post(format!("{address}/api/admin/answers"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "question_id": question_id,
            "text": "Marseille",
            "is_correct": true
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // A second incorrect option is fine.
    let response = client
        .post(format!("{address}/api/admin/answers"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "question_id": question_id,
            "text": "Marseille",
            "is_correct": false
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn quiz_detail_hides_correctness_flags() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;
    let (quiz_id, _question_id, _paris_id, _lyon_id) =
        seed_capitals_quiz(&client, &address, &token).await;

    let detail: serde_json::Value = client
        .get(format!("{address}/api/quizzes/{quiz_id}"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let answers = detail["questions"][0]["answers"].as_array().unwrap();
    assert_eq!(answers.len(), 2);
    for answer in answers {
        assert!(answer.get("is_correct").is_none());
    }
}

#[tokio::test]
async fn submit_and_duplicate_flow() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;
    let (quiz_id, question_id, paris_id, lyon_id) =
        seed_capitals_quiz(&client, &address, &token).await;

    let username = unique_name("u");
    register(&client, &address, &username).await;
    let user_token = login(&client, &address, &username).await;

    // Correct answer scores 1.
    let response = client
        .post(format!("{address}/api/quizzes/submit"))
        .bearer_auth(&user_token)
        .json(&submit_body(quiz_id, &[(question_id, paris_id.to_string())]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["submission"]["score"].as_i64(), Some(1));
    let submission_id = body["submission"]["id"].as_i64().unwrap();

    // The persisted submission is readable with its answer records.
    let detail: serde_json::Value = client
        .get(format!("{address}/api/submissions/{submission_id}"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(detail["score"].as_i64(), Some(1));
    assert_eq!(detail["answers"].as_array().unwrap().len(), 1);
    assert_eq!(detail["answers"][0]["answer_id"].as_i64(), Some(paris_id));

    // Second attempt conflicts.
    let response = client
        .post(format!("{address}/api/quizzes/submit"))
        .bearer_auth(&user_token)
        .json(&submit_body(quiz_id, &[(question_id, paris_id.to_string())]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);

    // A different user picking the wrong option scores 0.
    let other = unique_name("u");
    register(&client, &address, &other).await;
    let other_token = login(&client, &address, &other).await;

    let response = client
        .post(format!("{address}/api/quizzes/submit"))
        .bearer_auth(&other_token)
        .json(&submit_body(quiz_id, &[(question_id, lyon_id.to_string())]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["submission"]["score"].as_i64(), Some(0));

    // Each user sees exactly one submission of their own.
    let mine: serde_json::Value = client
        .get(format!("{address}/api/submissions"))
        .bearer_auth(&user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(mine.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_submission_persists_nothing() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;
    let (quiz_id, question_id, _paris_id, _lyon_id) =
        seed_capitals_quiz(&client, &address, &token).await;

    // Add a second, free-text question so one answer is missing.
    client
        .post(format!("{address}/api/admin/questions"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "quiz_id": quiz_id,
            "text": "Explain your reasoning.",
            "question_type": "TEXT"
        }))
        .send()
        .await
        .unwrap();

    let username = unique_name("u");
    register(&client, &address, &username).await;
    let user_token = login(&client, &address, &username).await;

    let response = client
        .post(format!("{address}/api/quizzes/submit"))
        .bearer_auth(&user_token)
        .json(&submit_body(quiz_id, &[(question_id, "999".to_string())]))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let submissions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(submissions, 0);
}

#[tokio::test]
async fn submitting_to_a_missing_quiz_is_404() {
    let (address, _pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let username = unique_name("u");

    register(&client, &address, &username).await;
    let token = login(&client, &address, &username).await;

    let response = client
        .post(format!("{address}/api/quizzes/submit"))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "quiz_id": 9999,
            "answers": { "1": "1" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn upcoming_events_endpoint_filters_and_orders() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;

    for (title, date) in [
        ("Spring meetup", "2025-06-01"),
        ("Summer final", "2025-07-01"),
        ("Qualifier round", "2025-06-20"),
    ] {
        let response = client
            .post(format!("{address}/api/admin/events"))
            .bearer_auth(&token)
            .json(&serde_json::json!({
                "title": title,
                "date": date,
                "location": "Main hall"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 201);
    }

    let events: serde_json::Value = client
        .get(format!("{address}/api/events?from=2025-06-15"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let titles: Vec<&str> = events
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Qualifier round", "Summer final"]);
}

#[tokio::test]
async fn event_creation_requires_a_date() {
    let (address, pool) = spawn_app().await;
    let client = reqwest::Client::new();
    let token = admin_token(&client, &address, &pool).await;

    let response = client
        .post(format!("{address}/api/admin/events"))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "title": "No date", "location": "Main hall" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["errors"]["date"].is_string());
}

#[tokio::test]
async fn form_submission_redirects_with_flash() {
    let (address, pool) = spawn_app().await;
    // The form path answers with redirects; don't follow them.
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let token = admin_token(&client, &address, &pool).await;
    let (quiz_id, question_id, paris_id, _lyon_id) =
        seed_capitals_quiz(&client, &address, &token).await;

    let username = unique_name("u");
    register(&client, &address, &username).await;
    let user_token = login(&client, &address, &username).await;

    let form_fields = vec![(format!("question_{question_id}"), paris_id.to_string())];

    let response = client
        .post(format!("{address}/quizzes/{quiz_id}/submit"))
        .bearer_auth(&user_token)
        .form(&form_fields)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 303);
    let location = response.headers()["location"].to_str().unwrap();
    assert!(location.starts_with("/quizzes/results/"));
    let flash = response.headers()["set-cookie"].to_str().unwrap();
    assert!(flash.contains("flash="));

    // Submitting again redirects back to the quiz list with a warning.
    let response = client
        .post(format!("{address}/quizzes/{quiz_id}/submit"))
        .bearer_auth(&user_token)
        .form(&form_fields)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 303);
    assert_eq!(response.headers()["location"].to_str().unwrap(), "/quizzes");

    // Exactly one submission survived both posts.
    let submissions = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(submissions, 1);
}
