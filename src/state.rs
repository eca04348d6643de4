use chrono::TimeDelta;
use std::sync::Arc;
use crate::mailer::Mailer;
use crate::rate_limit::RateLimiter;
// app's shared state

pub struct AppState {
    pub rate_limiter: RateLimiter,
    pub mailer: Arc<dyn Mailer>, // log-only or Resend, picked at startup
    pub min_fill_time: TimeDelta, // faster submissions are bots
}
