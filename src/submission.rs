//! Contact form pipeline: admission, bot filtering, validation,
//! sanitizing and delivery, in that order.

use axum::http::HeaderMap;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ContactError;
use crate::metrics::{CONTACT_BOT_DISCARDS, CONTACT_DELIVERED, CONTACT_RATE_LIMITED};
use crate::models::{ContactPayload, Submission};
use crate::state::AppState;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_EMAIL_CHARS: usize = 254;
pub const MAX_MESSAGE_CHARS: usize = 5000;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotSignal {
    Honeypot,
    TooFast { elapsed_ms: i64 },
}

// Both variants look the same to the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Discarded(BotSignal),
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

// Rate limit key: first x-forwarded-for hop, then x-real-ip
pub fn client_key(headers: &HeaderMap) -> String {
    header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| header(headers, "x-real-ip"))
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Cheap structural check, linear in the input and without regex.
///
/// Accepts anything with a local part before the first `@`, a `.` at
/// least two characters after it that is not the final character, and no
/// spaces. Multiple `@` are not rejected.
pub fn is_valid_email(email: &str) -> bool {
    let Some(at) = email.find('@') else {
        return false;
    };
    let Some(dot) = email.rfind('.') else {
        return false;
    };

    at >= 1 && dot >= at + 2 && dot + 1 < email.len() && !email.contains(' ')
}

fn truncate_trim(value: &str, max_chars: usize) -> String {
    let cut = value
        .char_indices()
        .nth(max_chars)
        .map_or(value.len(), |(idx, _)| idx);
    value[..cut].trim().to_string()
}

pub fn sanitize(name: &str, email: &str, message: &str) -> Submission {
    Submission {
        name: truncate_trim(name, MAX_NAME_CHARS),
        email: truncate_trim(email, MAX_EMAIL_CHARS),
        message: truncate_trim(message, MAX_MESSAGE_CHARS),
    }
}

// JavaScript truthiness, the form script may post any type here
fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn bot_signal(payload: &ContactPayload, state: &AppState, now: DateTime<Utc>) -> Option<BotSignal> {
    if payload.honeypot.as_ref().is_some_and(is_filled) {
        return Some(BotSignal::Honeypot);
    }

    // zero means the client never set it
    let started = payload.timestamp.filter(|t| *t != 0.0)?;
    let elapsed_ms = (now.timestamp_millis() as f64 - started) as i64;
    (elapsed_ms < state.min_fill_time.num_milliseconds())
        .then_some(BotSignal::TooFast { elapsed_ms })
}

fn required(field: Option<&String>) -> Result<&str, ContactError> {
    field
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(ContactError::MissingFields)
}

pub async fn process(
    state: &AppState,
    client: &str,
    body: &[u8],
    now: DateTime<Utc>,
) -> Result<Outcome, ContactError> {
    if state.rate_limiter.is_limited(client, now).await? {
        CONTACT_RATE_LIMITED.inc();
        info!(client, "Contact submission rate limited");
        return Err(ContactError::RateLimited);
    }

    let payload: ContactPayload = serde_json::from_slice(body)?;

    if let Some(signal) = bot_signal(&payload, state, now) {
        CONTACT_BOT_DISCARDS.inc();
        info!(client, ?signal, "Discarding bot submission");
        return Ok(Outcome::Discarded(signal));
    }

    let name = required(payload.name.as_ref())?;
    let email = required(payload.email.as_ref())?;
    let message = required(payload.message.as_ref())?;

    if !is_valid_email(email) {
        debug!(client, "Rejected malformed email");
        return Err(ContactError::InvalidEmail);
    }

    let submission = sanitize(name, email, message);
    state.mailer.deliver(&submission, now).await?;
    CONTACT_DELIVERED.inc();

    Ok(Outcome::Accepted)
}
