use std::sync::Arc;

use tracing::{info, warn};

use crate::db::{CourseRepository, PageRequest};
use crate::dto::mapper;
use crate::dto::{CourseDto, CoursePageDto, CourseRequestDto, LessonDto, PageParams};
use crate::error::AppError;
use crate::models::Lesson;
use crate::validation::{self, FieldError};

/// Business rules for courses. Every operation validates its input before
/// touching the repository.
#[derive(Clone)]
pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    pub async fn find_all(&self, params: &PageParams) -> Result<CoursePageDto, AppError> {
        validation::into_result(params.validation_errors())?;

        let page = self
            .repo
            .find_page(params.name.as_deref(), PageRequest::new(params.page, params.page_size))
            .await?;

        Ok(CoursePageDto {
            courses: page.content.iter().map(mapper::to_dto).collect(),
            total_elements: page.total_elements,
            total_pages: page.total_pages,
        })
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<CourseDto>, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(vec![FieldError::new(
                "name",
                "must not be blank",
            )]));
        }

        let courses = self.repo.find_by_name(name.trim()).await?;
        Ok(courses.iter().map(mapper::to_dto).collect())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<CourseDto, AppError> {
        validation::ensure_positive_id(id)?;

        let course = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound(id))?;
        Ok(mapper::to_dto(&course))
    }

    pub async fn create(&self, request: &CourseRequestDto) -> Result<CourseDto, AppError> {
        validation::into_result(request.validation_errors())?;
        let new_course = mapper::to_new_course(request)?;

        if self.repo.exists_active_by_name(&new_course.name, None).await? {
            warn!("rejected duplicate course name: {}", new_course.name);
            return Err(AppError::duplicate_name(&new_course.name));
        }

        let course = self.repo.insert(new_course).await?;
        info!("created course {} ({})", course.id, course.name);
        Ok(mapper::to_dto(&course))
    }

    pub async fn update(&self, id: i64, request: &CourseRequestDto) -> Result<CourseDto, AppError> {
        validation::ensure_positive_id(id)?;
        validation::into_result(request.validation_errors())?;
        let changes = mapper::to_new_course(request)?;

        let mut course = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound(id))?;

        if self.repo.exists_active_by_name(&changes.name, Some(id)).await? {
            warn!("rejected rename of course {} to duplicate name: {}", id, changes.name);
            return Err(AppError::duplicate_name(&changes.name));
        }

        course.name = changes.name;
        course.category = changes.category;
        merge_lessons(&mut course.lessons, &request.lessons);

        let course = self.repo.update(&course).await?;
        info!("updated course {} ({} lessons)", course.id, course.lessons.len());
        Ok(mapper::to_dto(&course))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        validation::ensure_positive_id(id)?;

        if self.repo.soft_delete(id).await? {
            info!("deactivated course {}", id);
            Ok(())
        } else {
            Err(AppError::NotFound(id))
        }
    }
}

/// Reconciles the stored lessons of a course with the incoming list.
///
/// Stored lessons missing from `incoming` are dropped, lessons with a matching
/// id are updated in place and everything else is appended as a new lesson.
/// A client-supplied id that does not belong to this course is discarded.
pub fn merge_lessons(stored: &mut Vec<Lesson>, incoming: &[LessonDto]) {
    let known = |id: i64| id > 0 && incoming.iter().any(|dto| dto.id == id);
    stored.retain(|lesson| lesson.id.is_some_and(known));

    for dto in incoming {
        let existing = stored
            .iter_mut()
            .find(|lesson| dto.id > 0 && lesson.id == Some(dto.id));

        match existing {
            Some(lesson) => {
                let updated = mapper::to_lesson(dto);
                lesson.name = updated.name;
                lesson.youtube_url = updated.youtube_url;
            }
            None => stored.push(mapper::to_lesson(dto)),
        }
    }
}
