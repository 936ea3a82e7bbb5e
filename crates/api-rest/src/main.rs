//! REST API server binary for the medical record service.

use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use medrec_core::{assignment_mode_from_env_value, CoreConfig, JsonRecordStore, RecordService};

/// Main entry point for the medrec REST API server.
///
/// Starts the REST server on the configured address (default: 0.0.0.0:3000)
/// with OpenAPI/Swagger documentation at `/swagger-ui`.
///
/// # Environment Variables
/// - `MEDREC_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `MEDREC_DATA_DIR`: Directory for record storage (default: "medrec_data")
/// - `MEDREC_ASSIGNMENT_MODE`: "legacy" (default) or "apply"; see
///   `medrec_core::AssignmentMode`
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the data directory cannot be created or read,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("medrec_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("MEDREC_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting medrec REST API on {}", addr);

    let data_dir =
        PathBuf::from(std::env::var("MEDREC_DATA_DIR").unwrap_or_else(|_| "medrec_data".into()));
    let assignment_mode =
        assignment_mode_from_env_value(std::env::var("MEDREC_ASSIGNMENT_MODE").ok())?;

    let cfg = Arc::new(CoreConfig::new(data_dir, assignment_mode)?);
    let store = Arc::new(JsonRecordStore::open(cfg.record_data_dir())?);

    let state = AppState {
        record_service: Arc::new(RecordService::new(cfg, store)),
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}
