pub mod mapper;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Category;
use crate::validation::{self, FieldError, rules};

/// Request body for creating or updating a course.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct CourseRequestDto {
    #[validate(
        length(min = 5, max = 200, message = "Course name must be between 5 and 200 characters"),
        custom(function = "rules::course_name")
    )]
    pub name: String,

    #[validate(custom(function = "rules::category"))]
    pub category: String,

    #[validate(nested)]
    pub lessons: Vec<LessonDto>,
}

impl CourseRequestDto {
    /// Field rules plus the rule that a course needs at least one usable lesson.
    pub fn validation_errors(&self) -> Vec<FieldError> {
        let mut errors = validation::check(self);
        if self.lessons.is_empty() {
            errors.push(FieldError::new("lessons", "Course must have at least one lesson"));
        } else if !self.lessons.iter().any(LessonDto::has_content) {
            errors.push(FieldError::new(
                "lessons",
                "At least one lesson must have a valid name and YouTube URL",
            ));
        }
        errors
    }
}

/// A lesson as sent and received over the wire. `_id` is 0 for new lessons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LessonDto {
    #[serde(rename = "_id")]
    #[validate(range(min = 0, message = "Lesson id must not be negative"))]
    pub id: i64,

    #[validate(custom(function = "rules::lesson_name"))]
    pub name: String,

    #[serde(rename = "youtubeUrl")]
    #[validate(custom(function = "rules::youtube_video"))]
    pub youtube_url: String,
}

impl LessonDto {
    pub fn new(id: i64, name: impl Into<String>, youtube_url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            youtube_url: youtube_url.into(),
        }
    }

    /// True when the lesson on its own would make a usable course entry.
    pub fn has_content(&self) -> bool {
        rules::lesson_name(&self.name).is_ok()
            && rules::is_video_id(&rules::extract_video_id(&self.youtube_url))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseDto {
    #[serde(rename = "_id")]
    pub id: i64,
    pub name: String,
    pub category: Category,
    pub lessons: Vec<LessonDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoursePageDto {
    pub courses: Vec<CourseDto>,
    pub total_elements: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PageParams {
    #[serde(default)]
    #[validate(range(min = 0, message = "Page must not be negative"))]
    pub page: i64,

    #[serde(default = "default_page_size", rename = "pageSize", alias = "size")]
    #[validate(range(min = 1, max = 1000, message = "Page size must be between 1 and 1000"))]
    pub page_size: i64,

    #[serde(default)]
    pub name: Option<String>,
}

impl PageParams {
    /// Field rules plus the rule that the row offset of the page must fit in an `i64`.
    pub fn validation_errors(&self) -> Vec<FieldError> {
        let mut errors = validation::check(self);
        if errors.is_empty() && self.page.checked_mul(self.page_size).is_none() {
            errors.push(FieldError::new("page", "Page is out of range"));
        }
        errors
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: default_page_size(),
            name: None,
        }
    }
}

fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct NameQuery {
    #[serde(default)]
    pub name: String,
}
