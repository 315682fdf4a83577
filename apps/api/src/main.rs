use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use consultation_cell::{ConsultationService, ConsultationState};
use shared_config::AppConfig;
use triage_cell::TriageState;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting consultation API server");

    // Load configuration
    let config = Arc::new(AppConfig::from_env());

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Create shared state
    let triage_state = Arc::new(TriageState::new(config.clone()));
    let consultation_state = Arc::new(ConsultationState::new(config.clone()));

    spawn_admission_trigger(
        consultation_state.service.clone(),
        config.admission_interval_secs,
    );

    // Build the application router
    let app = router::create_router(triage_state, consultation_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

/// Runs an admission pass over the waiting list every `period_secs`.
fn spawn_admission_trigger(service: Arc<ConsultationService>, period_secs: u64) {
    if period_secs == 0 {
        info!("Periodic admission disabled");
        return;
    }

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(period_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match service.run_admission().await {
                Ok(result) if !result.admitted.is_empty() => {
                    info!("Periodic admission opened {} rooms", result.new_rooms.len());
                }
                Ok(_) => debug!("Periodic admission found nobody to admit"),
                Err(e) => warn!("Periodic admission failed: {}", e),
            }
        }
    });
}
