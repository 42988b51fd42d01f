//! HTTP API for the screening service
//!
//! Endpoints:
//! - PATCH /evidence/toggle-exclude-reason - Apply or clear one reason
//! - PATCH /evidence/save - Replace an item's reason set
//! - POST /evidence/navigate - Resolve a navigation action
//! - GET /evidence/:id - Fetch one item
//! - GET /criteria - Configured criteria
//! - GET /health - Health check

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::core::navigator::{self, EvidenceCollection};
use crate::core::store::EvidenceStore;
use crate::types::{
    Criterion, ErrorBody, EvidenceId, EvidenceItem, HealthResponse, NavAction, NavigateRequest,
    NavigateResponse, SaveRequest, ScreenError, ToggleReasonRequest, ToggleResponse,
};

/// App state
pub struct AppState {
    pub store: RwLock<EvidenceStore>,
}

/// Error returned by handlers
pub struct ApiError(pub ScreenError);

impl From<ScreenError> for ApiError {
    fn from(err: ScreenError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ScreenError::NotFound(_) | ScreenError::EmptyCollection => StatusCode::NOT_FOUND,
            ScreenError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScreenError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScreenError::Transport(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        }
        let body = ErrorBody {
            error: self.0.to_string(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Create the API router
pub fn create_router(store: EvidenceStore) -> Router {
    let state = Arc::new(AppState {
        store: RwLock::new(store),
    });

    Router::new()
        .route("/health", get(health))
        .route("/criteria", get(criteria))
        .route("/evidence/toggle-exclude-reason", patch(toggle_exclude_reason))
        .route("/evidence/save", patch(save_status))
        .route("/evidence/navigate", post(navigate))
        .route("/evidence/:id", get(get_evidence))
        .with_state(state)
}

/// Health check endpoint
async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let store = state.store.read().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
        items: store.len(),
        filled: store.filled_count(),
    })
}

async fn criteria(State(state): State<Arc<AppState>>) -> Json<Vec<Criterion>> {
    let store = state.store.read().await;
    Json(store.criteria().to_vec())
}

async fn get_evidence(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<EvidenceItem>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.item(&EvidenceId::from(id.as_str()))?))
}

/// Apply or clear a single exclusion reason
async fn toggle_exclude_reason(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ToggleReasonRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let mut store = state.store.write().await;
    let resp = store.toggle_reason(&req.id, &req.exclude_reason, req.toggle)?;
    Ok(Json(resp))
}

/// Replace the reason set of one item
async fn save_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SaveRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let mut store = state.store.write().await;
    let resp = store.save_reasons(&req.cluster_id, &req.exclude_reasons)?;
    if let Some(claimed) = req.include {
        if claimed != resp.evidence.include() {
            warn!(
                id = %req.cluster_id,
                claimed,
                derived = resp.evidence.include(),
                "ignoring include flag that contradicts exclude reasons"
            );
        }
    }
    Ok(Json(resp))
}

/// Resolve a navigation action
async fn navigate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NavigateRequest>,
) -> Result<Json<NavigateResponse>, ApiError> {
    let store = state.store.read().await;
    let action = NavAction::from_wire(req.action, &req.cluster_id, req.target_id);
    let nav = navigator::navigate(&*store, &req.cluster_id, &action)?;
    if nav.all_filled {
        info!(current = %req.cluster_id, "all evidence filled");
    }

    let ids = store.ordered_ids();
    Ok(Json(NavigateResponse {
        evidence: nav.evidence,
        min_id: ids.first().cloned(),
        max_id: ids.last().cloned(),
        all_filled: nav.all_filled,
    }))
}

/// Run the API server
pub async fn run_server(addr: &str, store: EvidenceStore) -> Result<(), Box<dyn std::error::Error>> {
    let items = store.len();
    let router = create_router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, items, "screening API listening");
    info!("  PATCH /evidence/toggle-exclude-reason - Toggle one reason");
    info!("  PATCH /evidence/save                  - Save reason set");
    info!("  POST  /evidence/navigate              - Navigate");
    info!("  GET   /evidence/:id                   - Get evidence");
    info!("  GET   /criteria                       - Criteria");
    info!("  GET   /health                         - Health check");
    axum::serve(listener, router).await?;
    Ok(())
}
