//! Conversions between the wire DTOs and the domain models.

use crate::dto::{CourseDto, CourseRequestDto, LessonDto};
use crate::error::AppError;
use crate::models::{Category, Course, Lesson, NewCourse};
use crate::validation::{FieldError, rules};

pub fn to_new_course(request: &CourseRequestDto) -> Result<NewCourse, AppError> {
    Ok(NewCourse {
        name: request.name.trim().to_string(),
        category: convert_category_value(&request.category)?,
        lessons: request.lessons.iter().map(to_lesson).collect(),
    })
}

pub fn to_dto(course: &Course) -> CourseDto {
    CourseDto {
        id: course.id,
        name: course.name.clone(),
        category: course.category,
        lessons: course
            .lessons
            .iter()
            .map(|lesson| {
                LessonDto::new(
                    lesson.id.unwrap_or_default(),
                    &lesson.name,
                    &lesson.youtube_url,
                )
            })
            .collect(),
    }
}

/// Builds a lesson that has not been stored yet. The incoming `_id` is not
/// copied; matching against stored lessons happens during the update merge.
pub fn to_lesson(dto: &LessonDto) -> Lesson {
    Lesson::new(dto.name.trim(), rules::extract_video_id(&dto.youtube_url))
}

pub fn convert_category_value(value: &str) -> Result<Category, AppError> {
    value.parse::<Category>().map_err(|e| {
        AppError::Validation(vec![FieldError::new("category", e.to_string())])
    })
}
