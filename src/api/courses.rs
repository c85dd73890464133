use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::dto::{CourseDto, CoursePageDto, CourseRequestDto, NameQuery, PageParams};
use crate::error::AppError;
use crate::state::AppState;

pub async fn list_courses(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<PageParams>,
) -> Result<Json<CoursePageDto>, AppError> {
    let page = state.courses.find_all(&params).await?;
    Ok(Json(page))
}

pub async fn search_by_name(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<NameQuery>,
) -> Result<Json<Vec<CourseDto>>, AppError> {
    let courses = state.courses.find_by_name(&query.name).await?;
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<CourseDto>, AppError> {
    let course = state.courses.find_by_id(id).await?;
    Ok(Json(course))
}

pub async fn create_course(
    State(state): State<AppState>,
    AppJson(req): AppJson<CourseRequestDto>,
) -> Result<(StatusCode, Json<CourseDto>), AppError> {
    let course = state.courses.create(&req).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn update_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(req): AppJson<CourseRequestDto>,
) -> Result<Json<CourseDto>, AppError> {
    let course = state.courses.update(id, &req).await?;
    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, AppError> {
    state.courses.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
