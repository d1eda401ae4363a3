// src/main.rs

use dotenvy::dotenv;
use quizroom::config::{Config, StorageBackend};
use quizroom::routes;
use quizroom::services::Services;
use quizroom::session::{SESSION_MAX_IDLE, SWEEP_INTERVAL};
use quizroom::state::AppState;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Wire the collaborator implementations chosen by configuration
    let services = match config.storage_backend {
        StorageBackend::Postgres => {
            let database_url = config
                .database_url
                .clone()
                .expect("DATABASE_URL must be set for the postgres backend");

            // Initialize Database Pool with Retry
            let mut retry_count = 0;
            let pool = loop {
                match PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(&database_url)
                    .await
                {
                    Ok(pool) => break pool,
                    Err(e) => {
                        retry_count += 1;
                        if retry_count > 5 {
                            panic!("Failed to connect to database after 5 retries: {}", e);
                        }
                        tracing::warn!(
                            "Database not ready, retrying in 2s... (Attempt {})",
                            retry_count
                        );
                        tokio::time::sleep(Duration::from_secs(2)).await;
                    }
                }
            };

            tracing::info!("Database connected...");

            // Run Migrations Automatically
            tracing::info!("Running migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .expect("Failed to run database migrations");
            tracing::info!("Migrations applied successfully.");

            Services::postgres(pool)
        }
        StorageBackend::Memory => {
            tracing::info!("Running with the in-memory storage backend");
            Services::memory()
        }
    };

    // Create AppState
    let state = AppState::new(services, config.clone());

    // Reclaim abandoned sessions and expired tombstones in the background
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let evicted = sessions.sweep(SESSION_MAX_IDLE);
            if evicted > 0 {
                tracing::info!("Swept {} abandoned session(s)", evicted);
            }
        }
    });

    // Create the Axum application router
    let app = routes::create_router(state);

    tracing::info!("Listening on {}", config.bind_address);

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .unwrap();

    // Start the server
    axum::serve(listener, app).await.unwrap();
}
