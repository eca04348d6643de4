use axum::{Json, http::HeaderMap};

use crate::geo::{classify, country_from_headers};
use crate::metrics::GEO_REQUESTS;
use crate::models::ConsentDecision;

// Always 200, unknown country means no banner
pub async fn geo_handler(headers: HeaderMap) -> Json<ConsentDecision> {
    GEO_REQUESTS.inc();

    let country = country_from_headers(&headers);
    Json(classify(country.as_deref()))
}
