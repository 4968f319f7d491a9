//! HTTP routes.
//!
//! - `GET /keys/random_ksv`: a fresh KSV as 10 hex digits, `text/plain`
//! - `GET /keys/{role}`: key document for a fresh KSV
//! - `GET /keys/{role}/{ksv}`: key document for the given 10-digit KSV

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use hdcp_keys::{KeyDocument, Ksv, Role, derive_key, generate_ksv};
use tower_http::trace::TraceLayer;

use crate::{AppState, error::ApiError};

/// Build the key service router around a loaded matrix.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/keys/random_ksv", get(random_ksv))
        .route("/keys/{role}", get(key_for_random_ksv))
        .route("/keys/{role}/{ksv}", get(key_for_ksv))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn random_ksv() -> String {
    generate_ksv().to_string()
}

async fn key_for_random_ksv(
    State(state): State<AppState>,
    Path(role): Path<String>,
) -> Result<Json<KeyDocument>, ApiError> {
    let role: Role = role.parse()?;
    Ok(Json(issue(&state, generate_ksv(), role)))
}

async fn key_for_ksv(
    State(state): State<AppState>,
    Path((role, ksv)): Path<(String, String)>,
) -> Result<Json<KeyDocument>, ApiError> {
    let role: Role = role.parse()?;
    let ksv = Ksv::parse_wire(&ksv)?;
    Ok(Json(issue(&state, ksv, role)))
}

fn issue(state: &AppState, ksv: Ksv, role: Role) -> KeyDocument {
    let key = derive_key(ksv, state.matrix(), role);
    tracing::debug!(%ksv, %role, "Issued device key");
    KeyDocument::new(ksv, &key)
}
