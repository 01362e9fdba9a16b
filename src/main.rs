use org_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{PostgresRepository, RepositoryState},
    storage::{LocalLogoStorage, LogoStorage, StorageState},
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging, the database (with migrations), logo storage and the
/// HTTP server, in that order. Any failure during startup is fatal.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise verbose for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "org_portal=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Database
    let pool = PgPoolOptions::new()
        .max_connections(config.max_db_connections)
        .connect(&config.db_url)
        .await
        .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("FATAL: Failed to apply database migrations.");

    let repo = Arc::new(PostgresRepository::new(pool)) as RepositoryState;

    // 4. Logo storage
    let logo_storage = LocalLogoStorage::new(&config.logo_dir);
    logo_storage
        .ensure_directory()
        .await
        .expect("FATAL: Failed to create the logo upload directory. Check LOGO_UPLOAD_DIR.");
    tracing::info!(dir = %config.logo_dir, "Logo uploads stored on local disk");

    let storage = Arc::new(logo_storage) as StorageState;

    // 5. Unified state
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState {
        repo,
        storage,
        config,
    };

    // 6. Router and server
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at: http://{bind_addr}/swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
