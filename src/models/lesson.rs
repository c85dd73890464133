use sqlx::FromRow;

/// A video lesson. `id` is `None` until the lesson has been stored.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Lesson {
    pub id: Option<i64>,
    pub name: String,
    pub youtube_url: String,
}

impl Lesson {
    pub fn new(name: impl Into<String>, youtube_url: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            youtube_url: youtube_url.into(),
        }
    }
}
