use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use setu::SetuConfig;
use setu_web_server::{create_router, run_session_sweeper, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setu_web_server=info,setu=info,tower_http=debug".into()),
        )
        .init();

    let config = SetuConfig::from_env().context("Invalid SETU_* configuration")?;
    let state = AppState::from_config(&config).context("Failed to load form configuration")?;

    info!(
        "Serving {} document types (dynamic fields: {}, date heuristic: {:?})",
        state.reconciler.config().len(),
        config.use_dynamic_fields,
        config.date_heuristic
    );
    if let Some(dir) = &config.scan_archive_dir {
        info!("Archiving scan results to {:?}", dir);
    }

    match config.session_idle_timeout {
        Some(max_idle) => {
            tokio::spawn(run_session_sweeper(state.sessions.clone(), max_idle));
        }
        None => info!("Idle form sessions are kept until submitted or cancelled"),
    }

    // Build our application with routes
    let app = create_router(state);

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
