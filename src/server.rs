use crate::error::{DashboardError, DashboardResult};
use crate::loader;
use crate::page::build_dashboard;
use crate::types::ClaimRecord;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Where request handlers get the claims table from.
#[derive(Clone)]
enum DataSource {
    /// Loaded once at startup and shared read-only.
    Loaded(Arc<[ClaimRecord]>),
    /// Re-read from disk on every request (debug mode).
    Reload(PathBuf),
}

#[derive(Clone)]
pub struct AppState {
    source: DataSource,
}

impl AppState {
    pub fn new(records: Vec<ClaimRecord>) -> Self {
        Self {
            source: DataSource::Loaded(records.into()),
        }
    }

    pub fn reloading(path: impl Into<PathBuf>) -> Self {
        Self {
            source: DataSource::Reload(path.into()),
        }
    }

    fn records(&self) -> DashboardResult<Arc<[ClaimRecord]>> {
        match &self.source {
            DataSource::Loaded(records) => Ok(Arc::clone(records)),
            DataSource::Reload(path) => {
                debug!(path = %path.display(), "reloading dataset");
                let (records, _) = loader::load_claims(path)?;
                Ok(records.into())
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/", get(index)).with_state(state)
}

async fn index(State(state): State<AppState>) -> DashboardResult<Html<String>> {
    // Rendering is CPU-bound; keep it off the async workers.
    let html = tokio::task::spawn_blocking(move || {
        let records = state.records()?;
        build_dashboard(&records)
    })
    .await??;
    Ok(Html(html))
}

impl IntoResponse for DashboardError {
    fn into_response(self) -> Response {
        error!(error = %self, "dashboard request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("dashboard listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await
}
