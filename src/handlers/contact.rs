use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::sync::Arc;

use crate::metrics::CONTACT_REQUESTS;
use crate::models::SuccessBody;
use crate::state::AppState;
use crate::submission::{client_key, process};

// post handler, body is parsed after the rate limit check
pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    CONTACT_REQUESTS.inc();

    let client = client_key(&headers);
    match process(&state, &client, &body, Utc::now()).await {
        Ok(_) => Json(SuccessBody { success: true }).into_response(),
        Err(e) => e.into_response(),
    }
}
