use std::net::SocketAddr;

use courses_api::api::router;
use courses_api::config::DatabaseConfig;
use courses_api::db::{self, CourseRepository, SqliteCourseRepository};
use courses_api::models::Status;
use courses_api::state::AppState;
use reqwest::StatusCode;
use serde_json::{Value, json};
use sqlx::SqlitePool;

struct TestServer {
    addr: SocketAddr,
    pool: SqlitePool,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        let pool = db::connect(&DatabaseConfig::in_memory())
            .await
            .expect("Failed to create database");
        db::migrate(&pool).await.expect("Failed to run migrations");

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind listener");
        let addr = listener.local_addr().unwrap();
        let app = router(AppState::new(pool.clone()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            pool,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn create(&self, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/api/courses"))
            .json(body)
            .send()
            .await
            .unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let response = self.client.get(self.url(path)).send().await.unwrap();
        let status = response.status();
        (status, response.json().await.unwrap())
    }
}

fn course(name: &str, category: &str) -> Value {
    json!({
        "name": name,
        "category": category,
        "lessons": [
            {"name": "Getting started", "youtubeUrl": "dQw4w9WgXcQ"},
            {"name": "Going further", "youtubeUrl": "https://www.youtube.com/watch?v=Fj3Zvf-N4bk"}
        ]
    })
}

#[tokio::test]
async fn test_create_and_fetch_course() {
    let server = TestServer::start().await;

    let (status, created) = server.create(&course("Spring Boot Essentials", "Back-end")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Spring Boot Essentials");
    assert_eq!(created["category"], "Back-end");
    assert_eq!(created["lessons"][1]["youtubeUrl"], "Fj3Zvf-N4bk");

    let id = created["_id"].as_i64().unwrap();
    let (status, fetched) = server.get(&format!("/api/courses/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_missing_course_is_not_found() {
    let server = TestServer::start().await;

    let (status, body) = server.get("/api/courses/12345").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Could not find record 12345");
}

#[tokio::test]
async fn test_invalid_course_is_rejected() {
    let server = TestServer::start().await;
    let body = json!({
        "name": "Testing Course",
        "category": "Back-end",
        "lessons": [{"name": "Intro", "youtubeUrl": "not a video"}]
    });

    let (status, error) = server.create(&body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = error["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.iter().any(|f| f.starts_with("lessons[0].")));
    assert!(fields.contains(&"lessons"));

    let (_, page) = server.get("/api/courses").await;
    assert_eq!(page["totalElements"], 0);
}

#[tokio::test]
async fn test_duplicate_active_name_is_rejected() {
    let server = TestServer::start().await;
    server.create(&course("Angular Fundamentals", "Front-end")).await;

    let (status, error) = server.create(&course("Angular Fundamentals", "Front-end")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "A course with name Angular Fundamentals already exists.");
}

#[tokio::test]
async fn test_update_merges_lessons() {
    let server = TestServer::start().await;
    let (_, created) = server.create(&course("Angular Fundamentals", "Front-end")).await;
    let id = created["_id"].as_i64().unwrap();
    let kept = created["lessons"][0]["_id"].as_i64().unwrap();
    let removed = created["lessons"][1]["_id"].as_i64().unwrap();

    let body = json!({
        "name": "Angular Advanced",
        "category": "Front-end",
        "lessons": [
            {"_id": kept, "name": "Getting started again", "youtubeUrl": "dQw4w9WgXcQ"},
            {"_id": 0, "name": "Signals and effects", "youtubeUrl": "https://youtu.be/abcdefghijk"}
        ]
    });
    let response = server
        .client
        .put(server.url(&format!("/api/courses/{id}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();

    assert_eq!(updated["name"], "Angular Advanced");
    let lessons = updated["lessons"].as_array().unwrap();
    assert_eq!(lessons.len(), 2);
    assert_eq!(lessons[0]["_id"], kept);
    assert_eq!(lessons[0]["name"], "Getting started again");
    assert_eq!(lessons[1]["youtubeUrl"], "abcdefghijk");
    assert!(lessons.iter().all(|l| l["_id"] != removed));
}

#[tokio::test]
async fn test_delete_is_a_soft_delete() {
    let server = TestServer::start().await;
    let (_, created) = server.create(&course("Angular Fundamentals", "Front-end")).await;
    let id = created["_id"].as_i64().unwrap();

    let response = server
        .client
        .delete(server.url(&format!("/api/courses/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = server.get(&format!("/api/courses/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let repo = SqliteCourseRepository::new(server.pool.clone());
    let stored = repo.find_by_id_any_status(id).await.unwrap().unwrap();
    assert_eq!(stored.status, Status::Inactive);
    assert_eq!(stored.lessons.len(), 2);

    // the name is free again once the course is inactive
    let (status, _) = server.create(&course("Angular Fundamentals", "Front-end")).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_pagination_and_search() {
    let server = TestServer::start().await;
    let names = [
        "Angular Fundamentals",
        "Angular Forms",
        "React Hooks",
        "Vue Router",
        "Svelte Stores",
    ];
    for name in names {
        server.create(&course(name, "Front-end")).await;
    }

    let (status, page) = server.get("/api/courses?page=1&pageSize=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 5);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["courses"][0]["name"], "React Hooks");

    let (_, page) = server.get("/api/courses?size=10&name=angular").await;
    assert_eq!(page["totalElements"], 2);

    let (status, found) = server.get("/api/courses/searchByName?name=Vue%20Router").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Vue Router");
}

#[tokio::test]
async fn test_concurrent_creates_both_persist() {
    let server = TestServer::start().await;

    let first = course("Rust Async Basics", "Back-end");
    let second = course("Rust Error Handling", "Back-end");
    let ((first_status, _), (second_status, _)) =
        tokio::join!(server.create(&first), server.create(&second));

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::CREATED);

    let (_, page) = server.get("/api/courses").await;
    assert_eq!(page["totalElements"], 2);
}

#[tokio::test]
async fn test_concurrent_creates_of_one_name_keep_a_single_course() {
    let server = TestServer::start().await;
    let body = course("Rust Async Basics", "Back-end");

    let ((first, first_body), (second, second_body)) =
        tokio::join!(server.create(&body), server.create(&body));

    let mut statuses = vec![first, second];
    statuses.sort();
    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);

    let rejected = if first == StatusCode::BAD_REQUEST {
        first_body
    } else {
        second_body
    };
    assert_eq!(
        rejected["message"],
        "A course with name Rust Async Basics already exists."
    );

    let (_, page) = server.get("/api/courses").await;
    assert_eq!(page["totalElements"], 1);
}
