use clap::Parser;
use std::time::Duration;

// CLI argument structure, every flag can also come from the environment
#[derive(Parser, Debug, Clone)]
#[command(name = "lusk-contact-gateway")]
#[command(about = "Contact form and consent geo API for lusk.app")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Rate limit max submissions per window
    #[arg(long, env = "RATE_LIMIT", default_value_t = 3)]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, env = "RATE_WINDOW", default_value_t = 60)]
    pub rate_window: u64,

    // Submissions filled faster than this (ms) are treated as bots
    #[arg(long, env = "MIN_FILL_MS", default_value_t = 3000)]
    pub min_fill_ms: i64,

    // How often the rate store is swept, in seconds
    #[arg(long, env = "SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval: u64,

    // Idle rate records older than this (seconds) are evicted
    #[arg(long = "retention", env = "RATE_RETENTION", default_value_t = 600)]
    pub rate_retention: u64,

    // Resend credential, log-only mode when missing
    #[arg(long, env = "RESEND_API_KEY", hide_env_values = true)]
    pub resend_api_key: Option<String>,

    #[arg(long, env = "RESEND_URL", default_value = "https://api.resend.com/emails")]
    pub resend_url: String,

    #[arg(long, env = "MAIL_FROM", default_value = "Lusk.app Contact <noreply@lusk.app>")]
    pub mail_from: String,

    #[arg(long, env = "MAIL_TO", default_value = "hello@lusk.app")]
    pub mail_to: String,

    // Outbound delivery timeout in seconds
    #[arg(long, env = "DELIVERY_TIMEOUT", default_value_t = 10)]
    pub delivery_timeout: u64,

    // Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    // retention never shorter than the window, or live windows would be dropped
    pub fn rate_retention(&self) -> Duration {
        Duration::from_secs(self.rate_retention.max(self.rate_window))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval.max(1))
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout)
    }

    // empty key counts as unset
    pub fn resend_api_key(&self) -> Option<&str> {
        self.resend_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}
