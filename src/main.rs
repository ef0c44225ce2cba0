use std::sync::Arc;

use qoncier::accessibility::MotionSettings;
use qoncier::app::AppContext;
use qoncier::config::AppConfig;
use qoncier::feedback::TracingFeedback;
use qoncier::onboarding::{OnboardingRouteState, onboarding_routes};
use qoncier::store::{KeyValueStore, LibSqlStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("Qoncier v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   API: http://0.0.0.0:{}/api/onboarding/status", config.http_port);
    eprintln!("   Reduce motion: {}", config.reduce_motion);

    // ── Storage ─────────────────────────────────────────────────────────
    let store: Arc<dyn KeyValueStore> = Arc::new(
        LibSqlStore::new_local(&config.db_path)
            .await
            .unwrap_or_else(|e| {
                eprintln!(
                    "Error: Failed to open database at {}: {}",
                    config.db_path.display(),
                    e
                );
                std::process::exit(1);
            }),
    );

    // ── Application context ─────────────────────────────────────────────
    let ctx = AppContext::load(
        store,
        Arc::new(TracingFeedback),
        Arc::new(MotionSettings::new(config.reduce_motion)),
        config.reveal,
    )
    .await;
    eprintln!("   Root stack: {:?}\n", ctx.root_stack());

    // ── HTTP surface ────────────────────────────────────────────────────
    let app = onboarding_routes(OnboardingRouteState {
        tracker: ctx.onboarding.clone(),
    });
    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(port = config.http_port, "HTTP server started");
    axum::serve(listener, app).await?;

    Ok(())
}
