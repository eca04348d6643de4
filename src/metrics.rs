use lazy_static::lazy_static;
use prometheus::{Counter, Gauge, register_counter, register_gauge};


lazy_static! {
    pub static ref CONTACT_REQUESTS: Counter =
        register_counter!("contact_requests_total", "Total contact form submissions").unwrap();
    pub static ref CONTACT_RATE_LIMITED: Counter =
        register_counter!("contact_rate_limited_total", "Submissions rejected by the rate limiter").unwrap();
    pub static ref CONTACT_BOT_DISCARDS: Counter =
        register_counter!("contact_bot_discards_total", "Submissions silently dropped as bots").unwrap();
    pub static ref CONTACT_DELIVERED: Counter =
        register_counter!("contact_delivered_total", "Submissions handed to the mailer").unwrap();
    pub static ref CONTACT_FAILURES: Counter =
        register_counter!("contact_failures_total", "Submissions that failed internally").unwrap();
    pub static ref GEO_REQUESTS: Counter =
        register_counter!("geo_requests_total", "Total consent geo lookups").unwrap();
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("rate_limit_tracked_keys", "Client keys currently held by the rate store").unwrap();
}
