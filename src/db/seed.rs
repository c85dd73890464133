use tracing::info;

use crate::db::CourseRepository;
use crate::error::AppError;
use crate::models::{Category, Lesson, NewCourse};

const DEMO_TOPICS: &[(&str, Category)] = &[
    ("Angular Fundamentals", Category::FrontEnd),
    ("Spring Boot Essentials", Category::BackEnd),
    ("React Hooks in Practice", Category::FrontEnd),
    ("REST API Design", Category::BackEnd),
    ("CSS Grid and Flexbox", Category::FrontEnd),
    ("SQL for Developers", Category::BackEnd),
];

const DEMO_VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Inserts `count` demo courses when the database holds no courses at all.
/// Returns how many were inserted.
pub async fn seed_demo_courses(
    repo: &dyn CourseRepository,
    count: usize,
) -> Result<usize, AppError> {
    if repo.count().await? > 0 {
        info!("database already has courses, skipping demo data");
        return Ok(0);
    }

    for index in 0..count {
        repo.insert(demo_course(index)).await?;
    }

    info!("seeded {} demo courses", count);
    Ok(count)
}

fn demo_course(index: usize) -> NewCourse {
    let (topic, category) = DEMO_TOPICS[index % DEMO_TOPICS.len()];
    let name = match index / DEMO_TOPICS.len() {
        0 => topic.to_string(),
        round => format!("{} {}", topic, round + 1),
    };

    NewCourse {
        lessons: vec![
            Lesson::new(format!("{} - Introduction", topic), DEMO_VIDEO_ID),
            Lesson::new(format!("{} - Next Steps", topic), DEMO_VIDEO_ID),
        ],
        name,
        category,
    }
}
