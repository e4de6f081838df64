use anyhow::Context;

mod app;
mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod inventory;
mod scheduling;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "tirestore=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = state::AppState::init().await?;

    sqlx::migrate!("./migrations")
        .run(&state.db)
        .await
        .context("run migrations")?;
    db::seed_if_empty(&state.db)
        .await
        .context("seed database")?;

    if state.config.debug {
        tracing::debug!(environment = %state.config.environment, "debug mode enabled");
    }

    app::serve(app::build_app(state)).await
}
