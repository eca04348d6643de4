use serde::{Deserialize, Serialize};

// Contact form body as posted by the site
#[derive(Deserialize, Debug, Default, Clone)]
pub struct ContactPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    // hidden field, real users leave it empty; any JSON type is accepted
    #[serde(default)]
    pub honeypot: Option<serde_json::Value>,
    // epoch millis when the form was opened
    #[serde(default)]
    pub timestamp: Option<f64>,
}

// Submission after validation and sanitizing
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDecision {
    pub country: Option<String>,
    pub requires_consent: bool,
}

#[derive(Serialize, Debug)]
pub struct SuccessBody {
    pub success: bool,
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}
