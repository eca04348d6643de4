use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::metrics::CONTACT_FAILURES;
use crate::models::ErrorBody;

pub const GENERIC_FAILURE: &str = "Failed to send message. Please try again.";

/// Failures from a [`RateStore`](crate::rate_limit::RateStore) backend.
///
/// The in-process store never fails; shared stores report connection
/// problems here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[allow(dead_code)]
    #[error("rate store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("delivery request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("delivery provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

// Everything a contact submission can fail with
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Too many requests. Please try again later.")]
    RateLimited,

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl ContactError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::MissingFields | Self::InvalidEmail => StatusCode::BAD_REQUEST,
            Self::MalformedBody(_) | Self::Store(_) | Self::Delivery(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    // what the caller is allowed to see
    pub fn public_message(&self) -> String {
        if self.status().is_server_error() {
            GENERIC_FAILURE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl IntoResponse for ContactError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            CONTACT_FAILURES.inc();
            error!(error = %self, "Contact form error");
        }
        (
            status,
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
