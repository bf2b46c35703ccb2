//! A relay that fetches playlist metadata on behalf of clients that cannot
//! reach the catalog directly, adding permissive CORS headers to the answer.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use songbattle_catalog::Client;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Body of the response to a request without credentials.
pub const TOKEN_MISSING: &str = "Authorization token missing";
/// Body of the response when the upstream lookup fails.
pub const FETCH_FAILED: &str = "Failed to fetch playlist";

/// Shared across handlers.
#[derive(Clone)]
pub struct RelayState {
    /// Talks to the upstream catalog.
    pub client: Arc<Client>,
}

impl RelayState {
    pub fn new(upstream_base_url: impl Into<String>) -> Self {
        Self {
            client: Arc::new(Client::new(upstream_base_url)),
        }
    }
}

pub fn build_router(state: RelayState) -> Router {
    Router::new()
        .route("/catalog/playlists/:playlist_id", get(get_playlist))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// GET /catalog/playlists/:playlist_id
///
/// Forwards the caller's `Authorization` header untouched, whatever bytes it
/// holds, and mirrors the upstream status on failure.
async fn get_playlist(
    State(state): State<RelayState>,
    Path(playlist_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty());
    let Some(authorization) = authorization else {
        tracing::warn!("rejecting playlist {playlist_id} request without authorization");
        return (StatusCode::UNAUTHORIZED, TOKEN_MISSING).into_response();
    };

    match state.client.forward_playlist(authorization, &playlist_id).await {
        Ok(body) => {
            tracing::info!("relayed playlist {playlist_id} ({} bytes)", body.len());
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(e) => {
            let status = e
                .status()
                .and_then(|status| StatusCode::from_u16(status).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            tracing::error!("failed to fetch playlist {playlist_id}: {e}");
            (status, FETCH_FAILED).into_response()
        }
    }
}
