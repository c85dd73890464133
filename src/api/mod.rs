pub mod courses;
pub mod extract;
pub mod logging;

use axum::{Json, Router, extract::State, middleware, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/courses",
            get(courses::list_courses).post(courses::create_course),
        )
        .route("/api/courses/searchByName", get(courses::search_by_name))
        .route(
            "/api/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .layer(ServiceBuilder::new().layer(middleware::from_fn(logging::log_requests)))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<Json<Health>, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(Json(Health {
        status: "UP".to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
