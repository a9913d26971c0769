use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use crate::config::ApiConfig;
use crate::domain::repository::NotificationPort;
use crate::domain::types::{AdminLoginNotice, ContactMessage, LoginCodeEmail, Locale};
use crate::error::ApiError;
use crate::infra::templates::{self, RenderedEmail};

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Sender used by the log fallback when `MAIL_FROM` is unset.
const FALLBACK_SENDER: &str = "no-reply@localhost";

/// A fully addressed message handed to a [`Mailer`].
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a rendered message. The single seam between the relay and a provider.
#[allow(async_fn_in_trait)]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError>;
}

// ── HTTP provider ────────────────────────────────────────────────────────────

/// Transactional provider JSON API (`POST {api_url}` with a bearer key).
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
        })
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

// ── Log fallback ─────────────────────────────────────────────────────────────

/// Writes messages to the log instead of sending them. Used when no provider is configured.
#[derive(Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        tracing::info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            body = %email.text,
            "mail provider not configured; email logged instead of sent"
        );
        Ok(())
    }
}

/// Transport picked once at startup.
#[derive(Clone)]
pub enum MailTransport {
    Http(HttpMailer),
    Log(LogMailer),
}

impl MailTransport {
    pub fn from_config(config: &ApiConfig) -> Result<Self, MailError> {
        match &config.mail_api_key {
            Some(key) => Ok(Self::Http(HttpMailer::new(
                config.mail_api_url.clone(),
                key.clone(),
            )?)),
            None => Ok(Self::Log(LogMailer)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Log(_) => "log",
        }
    }
}

impl Mailer for MailTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        match self {
            Self::Http(m) => m.send(email).await,
            Self::Log(m) => m.send(email).await,
        }
    }
}

// ── Notification relay ───────────────────────────────────────────────────────

/// Static relay settings, fixed at construction.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub from: String,
    pub admin_emails: Vec<String>,
    pub site_name: String,
    pub default_locale: Locale,
}

impl NotifierConfig {
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            from: config
                .mail_from
                .clone()
                .unwrap_or_else(|| FALLBACK_SENDER.to_owned()),
            admin_emails: config.admin_emails.clone(),
            site_name: config.site_name.clone(),
            default_locale: config.default_locale(),
        }
    }
}

/// [`NotificationPort`] over any [`Mailer`].
#[derive(Clone)]
pub struct MailNotifier<M: Mailer> {
    pub mailer: M,
    pub config: NotifierConfig,
}

impl<M: Mailer> MailNotifier<M> {
    pub fn new(mailer: M, config: NotifierConfig) -> Self {
        Self { mailer, config }
    }

    fn envelope(
        &self,
        to: Vec<String>,
        rendered: RenderedEmail,
        reply_to: Option<String>,
    ) -> OutgoingEmail {
        OutgoingEmail {
            from: self.config.from.clone(),
            to,
            subject: rendered.subject,
            html: rendered.html,
            text: rendered.text,
            reply_to,
        }
    }
}

impl<M: Mailer> NotificationPort for MailNotifier<M> {
    async fn send_login_code(&self, email: &LoginCodeEmail) -> Result<(), ApiError> {
        let rendered = templates::login_code(email, &self.config.site_name);
        let outgoing = self.envelope(vec![email.to.clone()], rendered, None);
        self.mailer
            .send(&outgoing)
            .await
            .context("send login code email")?;
        tracing::info!(to = %email.to, reminder = email.reminder, "login code email sent");
        Ok(())
    }

    async fn send_admin_login_notice(&self, notice: &AdminLoginNotice) -> Result<(), ApiError> {
        if self.config.admin_emails.is_empty() {
            tracing::debug!(email = %notice.email, "no admin recipients; login notice skipped");
            return Ok(());
        }
        let rendered = templates::admin_login_notice(
            notice,
            &self.config.site_name,
            self.config.default_locale,
        );
        let outgoing = self.envelope(self.config.admin_emails.clone(), rendered, None);
        self.mailer
            .send(&outgoing)
            .await
            .context("send admin login notice")?;
        Ok(())
    }

    async fn send_contact_notification(&self, message: &ContactMessage) -> Result<(), ApiError> {
        let rendered = templates::contact_notification(
            message,
            &self.config.site_name,
            self.config.default_locale,
        );
        if self.config.admin_emails.is_empty() {
            tracing::warn!(
                from = %message.email,
                body = %rendered.text,
                "no admin recipients configured; contact message logged only"
            );
            return Ok(());
        }
        let outgoing = self.envelope(
            self.config.admin_emails.clone(),
            rendered,
            Some(message.email.clone()),
        );
        self.mailer
            .send(&outgoing)
            .await
            .context("send contact notification")?;
        tracing::info!(from = %message.email, "contact notification sent");
        Ok(())
    }

    async fn send_contact_acknowledgement(
        &self,
        message: &ContactMessage,
    ) -> Result<(), ApiError> {
        let rendered = templates::contact_acknowledgement(message, &self.config.site_name);
        let reply_to = self.config.admin_emails.first().cloned();
        let outgoing = self.envelope(vec![message.email.clone()], rendered, reply_to);
        self.mailer
            .send(&outgoing)
            .await
            .context("send contact acknowledgement")?;
        Ok(())
    }
}
