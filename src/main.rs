use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use courses_api::api::router;
use courses_api::config::Config;
use courses_api::db::{self, SqliteCourseRepository, seed};
use courses_api::state::AppState;

const DEMO_COURSE_COUNT: usize = 12;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "courses_api=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::new_from_env()?;

    let pool = db::connect(&config.database).await?;
    db::migrate(&pool).await?;

    if config.seed_demo_data {
        let repo = SqliteCourseRepository::new(pool.clone());
        seed::seed_demo_courses(&repo, DEMO_COURSE_COUNT).await?;
    }

    let state = AppState::new(pool);
    let app = router(state);

    let addr = config.server.addr();
    info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
