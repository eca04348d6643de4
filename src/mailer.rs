use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Args;
use crate::error::DeliveryError;
use crate::models::Submission;

/// Where accepted submissions end up.
#[async_trait]
pub trait Mailer: Send + Sync {
    // short name for startup logs
    fn kind(&self) -> &'static str;

    async fn deliver(
        &self,
        submission: &Submission,
        sent_at: DateTime<Utc>,
    ) -> Result<(), DeliveryError>;
}

// Used when no provider credential is configured: submissions only go to the log
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    fn kind(&self) -> &'static str {
        "log"
    }

    async fn deliver(
        &self,
        submission: &Submission,
        sent_at: DateTime<Utc>,
    ) -> Result<(), DeliveryError> {
        info!(
            name = %submission.name,
            email = %submission.email,
            contact_message = %submission.message,
            timestamp = %rfc3339(sent_at),
            "Contact form submission (email not configured)"
        );
        Ok(())
    }
}

// Resend API request format
#[derive(Serialize, Debug)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub reply_to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

pub struct ResendMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
    to: String,
    timeout: Duration,
}

impl ResendMailer {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
            to: to.into(),
            timeout,
        }
    }

    pub fn compose(&self, submission: &Submission, sent_at: DateTime<Utc>) -> OutboundEmail {
        OutboundEmail {
            from: self.from.clone(),
            to: vec![self.to.clone()],
            reply_to: submission.email.clone(),
            subject: format!("Contact Form: {}", submission.name),
            html: render_html(submission, sent_at),
            text: render_text(submission, sent_at),
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    fn kind(&self) -> &'static str {
        "resend"
    }

    async fn deliver(
        &self,
        submission: &Submission,
        sent_at: DateTime<Utc>,
    ) -> Result<(), DeliveryError> {
        let email = self.compose(submission, sent_at);

        let res = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&email)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body = %body, "Resend API error");
            return Err(DeliveryError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!(to = %self.to, "Contact email sent");
        Ok(())
    }
}

// Delivery strategy is fixed once at startup, handlers never look at the env
pub fn from_args(args: &Args) -> Result<Arc<dyn Mailer>, DeliveryError> {
    let Some(api_key) = args.resend_api_key() else {
        warn!("RESEND_API_KEY not set, contact submissions will only be logged");
        return Ok(Arc::new(LogMailer));
    };

    let client = reqwest::Client::builder().build()?;

    info!(endpoint = %args.resend_url, to = %args.mail_to, "Delivering contact mail via Resend");
    Ok(Arc::new(ResendMailer::new(
        client,
        args.resend_url.clone(),
        api_key,
        args.mail_from.clone(),
        args.mail_to.clone(),
        args.delivery_timeout(),
    )))
}

fn rfc3339(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// Fields go in as-is, readers of the mail must treat them as untrusted
pub fn render_html(s: &Submission, sent_at: DateTime<Utc>) -> String {
    format!(
        r##"
<h2>New Contact Form Submission</h2>
<p><strong>Name:</strong> {name}</p>
<p><strong>Email:</strong> {email}</p>
<p><strong>Message:</strong></p>
<p>{message}</p>
<hr>
<p style="color: #666; font-size: 12px;">
  Sent from lusk.app contact form at {at}
</p>
"##,
        name = s.name,
        email = s.email,
        message = s.message.replace('\n', "<br>"),
        at = rfc3339(sent_at),
    )
}

pub fn render_text(s: &Submission, sent_at: DateTime<Utc>) -> String {
    format!(
        "
New Contact Form Submission

Name: {name}
Email: {email}

Message:
{message}

---
Sent from lusk.app contact form at {at}
",
        name = s.name,
        email = s.email,
        message = s.message,
        at = rfc3339(sent_at),
    )
}
