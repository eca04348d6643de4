//! Country lookup for the cookie consent banner.
//!
//! The hosting edge injects the visitor's ISO country code as a header;
//! the banner only asks for consent where local privacy law requires it.

use axum::http::HeaderMap;

use crate::models::ConsentDecision;

/// Countries where analytics cookies need opt-in consent.
pub const CONSENT_REQUIRED_COUNTRIES: &[&str] = &[
    // EU member states (GDPR)
    "AT", "BE", "BG", "HR", "CY", "CZ", "DK", "EE", "FI", "FR",
    "DE", "GR", "HU", "IE", "IT", "LV", "LT", "LU", "MT", "NL",
    "PL", "PT", "RO", "SK", "SI", "ES", "SE",
    // EEA
    "IS", "LI", "NO",
    // UK GDPR
    "GB",
    // LGPD
    "BR",
    "CH",
];

// Checked in order, first non-empty wins
pub const COUNTRY_HEADERS: [&str; 2] = ["x-vercel-ip-country", "cf-ipcountry"];

pub fn country_from_headers(headers: &HeaderMap) -> Option<String> {
    COUNTRY_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    })
}

pub fn requires_consent(country: &str) -> bool {
    CONSENT_REQUIRED_COUNTRIES.contains(&country)
}

/// Unknown countries never require consent.
pub fn classify(country: Option<&str>) -> ConsentDecision {
    ConsentDecision {
        country: country.map(str::to_string),
        requires_consent: country.is_some_and(requires_consent),
    }
}
