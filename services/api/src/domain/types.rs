use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ApiError;

/// Email-identified account.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    /// Trimmed, lowercased.
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_language: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", whichever parts are known.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }

    pub fn preferred_locale(&self) -> Option<Locale> {
        self.preferred_language.as_deref().and_then(Locale::parse)
    }
}

/// Optional profile fields that may accompany a code request or signup.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferred_language: Option<String>,
}

impl ProfileUpdate {
    /// Trim every field and drop blanks. `preferred_language` is kept only if it is a known locale.
    pub fn cleaned(self) -> Self {
        fn clean(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
        }
        Self {
            first_name: clean(self.first_name),
            last_name: clean(self.last_name),
            preferred_language: clean(self.preferred_language)
                .and_then(|l| Locale::parse(&l))
                .map(|l| l.as_str().to_owned()),
        }
    }

    /// Enough to create an account without a separate signup.
    pub fn has_full_name(&self) -> bool {
        self.first_name.is_some() && self.last_name.is_some()
    }

    /// Fields that differ from `user`, or `None` when nothing would change.
    pub fn changes_for(&self, user: &User) -> Option<ProfileUpdate> {
        fn diff(new: &Option<String>, old: &Option<String>) -> Option<String> {
            match new {
                Some(v) if old.as_deref() != Some(v.as_str()) => Some(v.clone()),
                _ => None,
            }
        }
        let changes = ProfileUpdate {
            first_name: diff(&self.first_name, &user.first_name),
            last_name: diff(&self.last_name, &user.last_name),
            preferred_language: diff(&self.preferred_language, &user.preferred_language),
        };
        (changes.first_name.is_some()
            || changes.last_name.is_some()
            || changes.preferred_language.is_some())
        .then_some(changes)
    }
}

/// One-time numeric login code.
///
/// Transitions: active → consumed (verified) or active → revoked (superseded).
#[derive(Debug, Clone)]
pub struct LoginToken {
    pub id: Uuid,
    pub code: String,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub consumed_at: Option<DateTime<Utc>>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoginToken {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.consumed_at.is_none() && !self.is_expired_at(now)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(Utc::now())
    }
}

/// Length of a freshly minted login code.
pub const LOGIN_CODE_LEN: usize = 6;

/// Length used once `MAX_CODE_GENERATION_ATTEMPTS` six-digit candidates collided.
pub const FALLBACK_LOGIN_CODE_LEN: usize = 8;

/// Candidates checked against the store before falling back to the longer code.
pub const MAX_CODE_GENERATION_ATTEMPTS: usize = 10;

/// Inserts retried when the unique index on `code` rejects a candidate.
pub const MAX_CODE_INSERT_ATTEMPTS: usize = 3;

/// Email template language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    Pl,
    En,
}

impl Locale {
    /// Accepts bare tags and regional variants (`pl`, `PL`, `en-US`, `en_GB`).
    pub fn parse(tag: &str) -> Option<Self> {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "pl" => Some(Self::Pl),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pl => "pl",
            Self::En => "en",
        }
    }

    /// Request language first, then the user's stored preference, then `fallback`.
    pub fn resolve(request: Option<&str>, user: Option<&User>, fallback: Locale) -> Locale {
        request
            .and_then(Locale::parse)
            .or_else(|| user.and_then(User::preferred_locale))
            .unwrap_or(fallback)
    }
}

/// Who is asking, as far as the HTTP layer can tell. Used for audit emails only.
#[derive(Debug, Clone, Default)]
pub struct ClientMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub device: Option<String>,
    pub browser: Option<String>,
    pub language: Option<String>,
}

/// Login code delivered to the account owner.
#[derive(Debug, Clone)]
pub struct LoginCodeEmail {
    pub to: String,
    pub recipient_name: Option<String>,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub locale: Locale,
    /// Re-send of a still-valid code rather than a new one.
    pub reminder: bool,
    pub refresh_url: Option<String>,
}

/// Audit notice to the site owner about a code request.
#[derive(Debug, Clone)]
pub struct AdminLoginNotice {
    pub email: String,
    pub user_name: Option<String>,
    pub new_account: bool,
    pub reminder: bool,
    pub expires_at: DateTime<Utc>,
    pub client: ClientMetadata,
}

/// A submitted contact form.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
    pub phone: Option<String>,
    pub locale: Locale,
    pub client: ClientMetadata,
}

/// Trim + lowercase, then a structural sanity check: one `@`, non-empty
/// local part, dotted domain, no whitespace.
pub fn normalize_email(raw: &str) -> Result<String, ApiError> {
    let email = raw.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(email)
    } else {
        Err(ApiError::validation("Nieprawidłowy adres e-mail."))
    }
}
