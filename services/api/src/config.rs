use chrono::TimeDelta;
use serde::{Deserialize, Deserializer};

use folio_core::config::{Config, ConfigError};

use crate::domain::types::Locale;

/// API service configuration loaded from environment variables.
///
/// Field `foo_bar` is read from `FOO_BAR`. List fields take comma-separated values.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// HMAC secret for signing session tokens. At least 32 bytes.
    pub jwt_secret: String,
    /// TCP port to listen on. Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Validity window of a login code and of the session token it buys.
    #[serde(default = "default_login_code_ttl_secs")]
    pub login_code_ttl_secs: i64,
    /// Apply pending migrations before serving.
    #[serde(default = "default_true")]
    pub run_migrations: bool,

    /// Transactional mail provider endpoint.
    #[serde(default = "default_mail_api_url")]
    pub mail_api_url: String,
    /// Provider API key. Unset → emails are written to the log instead.
    pub mail_api_key: Option<String>,
    /// Sender address. Required when `MAIL_API_KEY` is set.
    pub mail_from: Option<String>,
    /// Recipients of audit and contact-form notifications.
    #[serde(default, deserialize_with = "trimmed_list")]
    pub admin_emails: Vec<String>,
    #[serde(default = "default_site_name")]
    pub site_name: String,
    /// `pl` or `en`.
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Browser origins allowed by CORS. Empty → any origin.
    #[serde(default, deserialize_with = "trimmed_list")]
    pub cors_allowed_origins: Vec<String>,
    #[serde(default = "default_rate_limit_max_requests")]
    pub rate_limit_max_requests: u32,
    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// Contact details served on `GET /secure/contact`.
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_location: Option<String>,
}

/// Longest accepted `LOGIN_CODE_TTL_SECS`: one year.
pub const MAX_LOGIN_CODE_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Comma lists arrive untrimmed (`a@x.com, b@x.com`); drop padding and empty items.
fn trimmed_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Vec::<String>::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .map(|item| item.trim().to_owned())
        .filter(|item| !item.is_empty())
        .collect())
}

fn default_api_port() -> u16 {
    3000
}

fn default_login_code_ttl_secs() -> i64 {
    24 * 60 * 60
}

fn default_true() -> bool {
    true
}

fn default_mail_api_url() -> String {
    "https://api.resend.com/emails".to_owned()
}

fn default_site_name() -> String {
    "Portfolio".to_owned()
}

fn default_locale() -> String {
    "pl".to_owned()
}

fn default_rate_limit_max_requests() -> u32 {
    10
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

impl Config for ApiConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid("DATABASE_URL is empty".into()));
        }
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid(
                "JWT_SECRET must be at least 32 bytes".into(),
            ));
        }
        if !(1..=MAX_LOGIN_CODE_TTL_SECS).contains(&self.login_code_ttl_secs) {
            return Err(ConfigError::Invalid(format!(
                "LOGIN_CODE_TTL_SECS must be between 1 and {MAX_LOGIN_CODE_TTL_SECS}, got {}",
                self.login_code_ttl_secs
            )));
        }
        if self.mail_api_key.is_some() && self.mail_from.is_none() {
            return Err(ConfigError::Invalid(
                "MAIL_FROM is required when MAIL_API_KEY is set".into(),
            ));
        }
        if Locale::parse(&self.default_locale).is_none() {
            return Err(ConfigError::Invalid(format!(
                "DEFAULT_LOCALE must be `pl` or `en`, got `{}`",
                self.default_locale
            )));
        }
        if self.rate_limit_max_requests == 0 || self.rate_limit_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "rate limit requests and window must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl ApiConfig {
    /// Lifetime of a login code and of the session it buys. Bounded by `validate`.
    pub fn login_code_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.login_code_ttl_secs.clamp(1, MAX_LOGIN_CODE_TTL_SECS))
    }

    pub fn default_locale(&self) -> Locale {
        Locale::parse(&self.default_locale).unwrap_or_default()
    }

    /// Address shown on the guarded contact endpoint.
    pub fn public_contact_email(&self) -> Option<String> {
        self.contact_email
            .clone()
            .or_else(|| self.admin_emails.first().cloned())
    }
}
