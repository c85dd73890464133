pub mod repository;
pub mod seed;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::error::AppError;

pub use repository::{CourseRepository, Page, PageRequest, SqliteCourseRepository};

/// Opens the pool. An in-memory database lives only as long as its
/// connection, so it gets exactly one connection that never expires.
pub async fn connect(config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool_options = if is_in_memory(&config.url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;
    info!("connected to {}", config.url);
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
