//! Generic fetch endpoint
//!
//! `GET /fetch?url=<absolute http(s) URL>` streams the target back to the
//! caller with its content type preserved.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::{proxy::fetch::parse_target, routes::metrics::record_request, AppState};

/// Query parameters for `/fetch`
#[derive(Debug, Deserialize)]
pub struct FetchParams {
    pub url: Option<String>,
}

/// Handle fetch relay requests
pub async fn fetch(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FetchParams>,
) -> Response {
    let start_time = Instant::now();

    let result = match parse_target(params.url.as_deref()) {
        Ok(target) => state.fetch_relay.relay(target).await,
        Err(e) => Err(e),
    };

    let response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Fetch relay request failed");
            e.into_response()
        }
    };

    record_request(
        "/fetch",
        response.status().as_u16(),
        start_time.elapsed().as_secs_f64(),
    );
    response
}
