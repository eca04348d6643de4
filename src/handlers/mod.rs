mod contact;
mod geo;
mod health;
mod metrics;

pub use contact::contact_handler;
pub use geo::geo_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

// creating the router with routes
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler)) // metrics endpoint
        .route("/api/contact", post(contact_handler))
        .route("/api/geo", get(geo_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::tests::{RecordingMailer, state_with};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn contact(ip: &str, body: Value) -> Request<Body> {
        Request::post("/api/contact")
            .header("content-type", "application/json")
            .header("x-forwarded-for", ip)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn geo(country: Option<&str>) -> Request<Body> {
        let mut req = Request::get("/api/geo");
        if let Some(c) = country {
            req = req.header("x-vercel-ip-country", c);
        }
        req.body(Body::empty()).unwrap()
    }

    fn valid() -> Value {
        json!({
            "name": "Test User",
            "email": "test@example.com",
            "message": "Test message",
            "timestamp": chrono::Utc::now().timestamp_millis() - 5000,
        })
    }

    #[tokio::test]
    async fn contact_success() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = router(Arc::new(state_with(mailer.clone())));

        let (status, body) = send(app, contact("10.0.0.1", valid())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
        assert_eq!(mailer.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn contact_missing_fields() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));

        let (status, body) = send(app, contact("10.0.0.2", json!({ "name": "Test" }))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");
    }

    #[tokio::test]
    async fn contact_invalid_email() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));
        let mut payload = valid();
        payload["email"] = json!("invalid-email");

        let (status, body) = send(app, contact("10.0.0.3", payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid email format");
    }

    #[tokio::test]
    async fn contact_honeypot_looks_successful() {
        let mailer = Arc::new(RecordingMailer::default());
        let app = router(Arc::new(state_with(mailer.clone())));
        let mut payload = valid();
        payload["honeypot"] = json!("filled-by-bot");

        let (status, body) = send(app, contact("10.0.0.4", payload)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn contact_delivery_failure_is_generic() {
        let mailer = Arc::new(RecordingMailer { fail: true, ..Default::default() });
        let app = router(Arc::new(state_with(mailer)));

        let (status, body) = send(app, contact("192.168.1.100", valid())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to send message. Please try again." }));
    }

    #[tokio::test]
    async fn contact_rate_limited_per_client() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));

        for _ in 0..3 {
            let (status, _) = send(app.clone(), contact("10.9.9.9", valid())).await;
            assert_eq!(status, StatusCode::OK);
        }
        let (status, body) = send(app.clone(), contact("10.9.9.9", valid())).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["error"], "Too many requests. Please try again later.");

        // another client is unaffected
        let (status, _) = send(app, contact("10.9.9.10", valid())).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn contact_malformed_json_is_generic_failure() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));
        let req = Request::post("/api/contact")
            .header("x-forwarded-for", "10.0.0.5")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(app, req).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to send message. Please try again.");
    }

    #[tokio::test]
    async fn geo_lookup() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));

        for (country, expected) in [(Some("DE"), true), (Some("GB"), true), (Some("BR"), true), (Some("US"), false), (Some("CA"), false)] {
            let (status, body) = send(app.clone(), geo(country)).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({ "country": country, "requiresConsent": expected }));
        }

        let (status, body) = send(app, geo(None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "country": null, "requiresConsent": false }));
    }

    #[tokio::test]
    async fn geo_cloudflare_fallback() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));
        let req = Request::get("/api/geo")
            .header("cf-ipcountry", "FR")
            .body(Body::empty())
            .unwrap();

        let (_, body) = send(app, req).await;
        assert_eq!(body, json!({ "country": "FR", "requiresConsent": true }));
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let app = router(Arc::new(state_with(Arc::new(RecordingMailer::default()))));
        let req = Request::get("/health").body(Body::empty()).unwrap();

        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }
}
