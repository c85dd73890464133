use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::AppError;
use crate::models::{Course, Lesson, NewCourse, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    pub fn new(page: i64, size: i64) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> i64 {
        self.page.saturating_mul(self.size)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: i64, request: PageRequest) -> Self {
        let total_pages = if request.size > 0 {
            (total_elements + request.size - 1) / request.size
        } else {
            0
        };
        Self {
            content,
            total_elements,
            total_pages,
        }
    }
}

/// Storage for courses and their lessons. Every lookup except
/// `find_by_id_any_status` and `count` only sees active courses.
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_page(
        &self,
        name_filter: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Course>, AppError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, AppError>;
    async fn find_by_id_any_status(&self, id: i64) -> Result<Option<Course>, AppError>;
    async fn find_by_name(&self, name: &str) -> Result<Vec<Course>, AppError>;
    async fn exists_active_by_name(
        &self,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn insert(&self, course: NewCourse) -> Result<Course, AppError>;
    /// Writes the course row and makes the stored lessons match `course.lessons`:
    /// lessons with an id are updated, lessons without one are inserted and
    /// stored lessons that are no longer listed are deleted.
    async fn update(&self, course: &Course) -> Result<Course, AppError>;
    /// Returns false when there is no active course with this id.
    async fn soft_delete(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Debug, FromRow)]
struct CourseRow {
    id: i64,
    name: String,
    category: String,
    status: String,
}

impl CourseRow {
    fn into_course(self, lessons: Vec<Lesson>) -> Result<Course, AppError> {
        let decode = |e: crate::models::ParseEnumError| sqlx::Error::Decode(Box::new(e));
        Ok(Course {
            id: self.id,
            name: self.name,
            category: self.category.parse().map_err(decode)?,
            status: self.status.parse().map_err(decode)?,
            lessons,
        })
    }
}

#[derive(Debug, FromRow)]
struct LessonRow {
    id: i64,
    name: String,
    youtube_url: String,
    course_id: i64,
}

#[derive(Clone)]
pub struct SqliteCourseRepository {
    db: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    async fn lessons_of(&self, course_id: i64) -> Result<Vec<Lesson>, AppError> {
        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT id, name, youtube_url FROM lessons WHERE course_id = ? ORDER BY id",
        )
        .bind(course_id)
        .fetch_all(&self.db)
        .await?;
        Ok(lessons)
    }

    async fn with_lessons(&self, row: CourseRow) -> Result<Course, AppError> {
        let lessons = self.lessons_of(row.id).await?;
        row.into_course(lessons)
    }

    /// Loads the lessons of several courses with one query.
    async fn with_all_lessons(&self, rows: Vec<CourseRow>) -> Result<Vec<Course>, AppError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT id, name, youtube_url, course_id FROM lessons WHERE course_id IN (",
        );
        let mut ids = query.separated(", ");
        for row in &rows {
            ids.push_bind(row.id);
        }
        ids.push_unseparated(") ORDER BY id");

        let lesson_rows: Vec<LessonRow> = query.build_query_as().fetch_all(&self.db).await?;

        let mut by_course: HashMap<i64, Vec<Lesson>> = HashMap::new();
        for lesson in lesson_rows {
            by_course.entry(lesson.course_id).or_default().push(Lesson {
                id: Some(lesson.id),
                name: lesson.name,
                youtube_url: lesson.youtube_url,
            });
        }

        rows.into_iter()
            .map(|row| {
                let lessons = by_course.remove(&row.id).unwrap_or_default();
                row.into_course(lessons)
            })
            .collect()
    }

    async fn fetch_row(&self, id: i64, only_active: bool) -> Result<Option<CourseRow>, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, category, status
            FROM courses
            WHERE id = ?1 AND (?2 = 0 OR status = 'Active')
            "#,
        )
        .bind(id)
        .bind(only_active)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn reload(&self, id: i64) -> Result<Course, AppError> {
        self.find_by_id_any_status(id)
            .await?
            .ok_or(AppError::NotFound(id))
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn find_page(
        &self,
        name_filter: Option<&str>,
        request: PageRequest,
    ) -> Result<Page<Course>, AppError> {
        let pattern = name_filter
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(|n| format!("%{}%", escape_like(n)));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM courses
            WHERE status = 'Active' AND (?1 IS NULL OR name LIKE ?1 ESCAPE '\')
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, category, status
            FROM courses
            WHERE status = 'Active' AND (?1 IS NULL OR name LIKE ?1 ESCAPE '\')
            ORDER BY id
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(&pattern)
        .bind(request.size)
        .bind(request.offset())
        .fetch_all(&self.db)
        .await?;

        let courses = self.with_all_lessons(rows).await?;
        Ok(Page::new(courses, total, request))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Course>, AppError> {
        match self.fetch_row(id, true).await? {
            Some(row) => Ok(Some(self.with_lessons(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_id_any_status(&self, id: i64) -> Result<Option<Course>, AppError> {
        match self.fetch_row(id, false).await? {
            Some(row) => Ok(Some(self.with_lessons(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Course>, AppError> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, category, status
            FROM courses
            WHERE name = ?1 AND status = 'Active'
            ORDER BY id
            "#,
        )
        .bind(name)
        .fetch_all(&self.db)
        .await?;
        self.with_all_lessons(rows).await
    }

    async fn exists_active_by_name(
        &self,
        name: &str,
        excluding: Option<i64>,
    ) -> Result<bool, AppError> {
        let found: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM courses
                WHERE name = ?1 AND status = 'Active' AND (?2 IS NULL OR id <> ?2)
            )
            "#,
        )
        .bind(name)
        .bind(excluding)
        .fetch_one(&self.db)
        .await?;
        Ok(found != 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }

    async fn insert(&self, course: NewCourse) -> Result<Course, AppError> {
        let mut tx = self.db.begin().await?;

        let id = sqlx::query("INSERT INTO courses (name, category, status) VALUES (?1, ?2, ?3)")
            .bind(&course.name)
            .bind(course.category.as_str())
            .bind(Status::Active.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_unique_violation(e, &course.name))?
            .last_insert_rowid();

        for lesson in &course.lessons {
            insert_lesson(&mut tx, id, lesson).await?;
        }

        tx.commit().await?;
        debug!("inserted course {} with {} lessons", id, course.lessons.len());

        self.reload(id).await
    }

    async fn update(&self, course: &Course) -> Result<Course, AppError> {
        let mut tx = self.db.begin().await?;

        let updated = sqlx::query(
            "UPDATE courses SET name = ?1, category = ?2, status = ?3 WHERE id = ?4",
        )
        .bind(&course.name)
        .bind(course.category.as_str())
        .bind(course.status.as_str())
        .bind(course.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, &course.name))?
        .rows_affected();

        if updated == 0 {
            return Err(AppError::NotFound(course.id));
        }

        let stored: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM lessons WHERE course_id = ?1")
                .bind(course.id)
                .fetch_all(&mut *tx)
                .await?;

        for stale in stored
            .iter()
            .filter(|id| !course.lessons.iter().any(|l| l.id == Some(**id)))
        {
            sqlx::query("DELETE FROM lessons WHERE id = ?1")
                .bind(stale)
                .execute(&mut *tx)
                .await?;
        }

        for lesson in &course.lessons {
            match lesson.id {
                Some(lesson_id) if stored.contains(&lesson_id) => {
                    sqlx::query(
                        r#"
                        UPDATE lessons
                        SET name = ?1, youtube_url = ?2
                        WHERE id = ?3 AND course_id = ?4
                        "#,
                    )
                    .bind(&lesson.name)
                    .bind(&lesson.youtube_url)
                    .bind(lesson_id)
                    .bind(course.id)
                    .execute(&mut *tx)
                    .await?;
                }
                _ => insert_lesson(&mut tx, course.id, lesson).await?,
            }
        }

        tx.commit().await?;
        debug!("updated course {} with {} lessons", course.id, course.lessons.len());

        self.reload(course.id).await
    }

    async fn soft_delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET status = 'Inactive'
            WHERE id = ?1 AND status = 'Active'
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?
        .rows_affected();

        Ok(result > 0)
    }
}

async fn insert_lesson(
    conn: &mut SqliteConnection,
    course_id: i64,
    lesson: &Lesson,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO lessons (name, youtube_url, course_id) VALUES (?1, ?2, ?3)")
        .bind(&lesson.name)
        .bind(&lesson.youtube_url)
        .bind(course_id)
        .execute(conn)
        .await?;
    Ok(())
}

fn map_unique_violation(err: sqlx::Error, name: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return AppError::duplicate_name(name);
        }
    }
    AppError::Database(err)
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
