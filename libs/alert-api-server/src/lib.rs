mod http;
mod page;

use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;

use alert_store::LogSearcher;

pub use page::render_alert;

#[derive(Clone)]
pub struct AppState {
    searcher: LogSearcher,
}

impl AppState {
    pub fn new(searcher: LogSearcher) -> Self {
        Self { searcher }
    }
}

/// Routes of the lookup API: a single `GET /{id}`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{id}", get(http::handle_alert))
        .with_state(state)
}

/// Alert lookup HTTP server. Returns once `shutdown` fires and in-flight
/// requests have drained.
pub async fn run(
    port: u16,
    searcher: LogSearcher,
    shutdown: CancellationToken,
) -> Result<(), String> {
    let app = router(AppState::new(searcher));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .map_err(|e| format!("bind api :{port}: {e}"))?;
    tracing::info!(port, "alert info server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| format!("axum serve: {e}"))?;

    Ok(())
}
