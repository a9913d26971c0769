use chrono::{DateTime, Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::{LoginTokenRepository, NotificationPort, UserRepository};
use crate::domain::types::{
    AdminLoginNotice, ClientMetadata, FALLBACK_LOGIN_CODE_LEN, LOGIN_CODE_LEN, Locale,
    LoginCodeEmail, LoginToken, MAX_CODE_GENERATION_ATTEMPTS, MAX_CODE_INSERT_ATTEMPTS,
    ProfileUpdate, User, normalize_email,
};
use crate::error::ApiError;
use crate::infra::locks::KeyedLocks;

/// Random decimal string of `len` digits; leading zeros allowed.
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

pub struct RequestCodeInput {
    pub email: String,
    pub profile: ProfileUpdate,
    pub client: ClientMetadata,
    pub refresh_url: Option<String>,
}

#[derive(Debug)]
pub struct RequestCodeOutput {
    pub user: User,
    /// A new code was minted and emailed.
    pub code_sent: bool,
    /// A still-valid code existed before this call.
    pub existing_token_valid: bool,
    /// That existing code was emailed again as a reminder.
    pub resent_existing_token: bool,
    /// Expiry of the code that was emailed.
    pub valid_until: DateTime<Utc>,
    pub account_created: bool,
}

/// Issues login codes: reuse a live one, otherwise revoke and mint.
pub struct RequestCodeUseCase<U, T, N>
where
    U: UserRepository,
    T: LoginTokenRepository,
    N: NotificationPort,
{
    pub users: U,
    pub tokens: T,
    pub notifier: N,
    pub locks: KeyedLocks,
    pub ttl: Duration,
    pub default_locale: Locale,
}

impl<U, T, N> RequestCodeUseCase<U, T, N>
where
    U: UserRepository,
    T: LoginTokenRepository,
    N: NotificationPort,
{
    pub async fn execute(&self, input: RequestCodeInput) -> Result<RequestCodeOutput, ApiError> {
        let email = normalize_email(&input.email)?;
        let profile = input.profile.cleaned();

        let _guard = self.locks.lock(&email).await;

        let (user, account_created) = match self.users.find_by_email(&email).await? {
            Some(user) => match profile.changes_for(&user) {
                Some(changes) => (self.users.update_profile(user.id, &changes).await?, false),
                None => (user, false),
            },
            None if profile.has_full_name() => (self.create_user(&email, profile).await?, true),
            None => return Err(ApiError::ProfileRequired),
        };

        self.issue_for(user, account_created, &input.client, input.refresh_url)
            .await
    }

    /// Insert a fresh account for an already-normalized email.
    pub(crate) async fn create_user(
        &self,
        email: &str,
        profile: ProfileUpdate,
    ) -> Result<User, ApiError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_owned(),
            first_name: profile.first_name,
            last_name: profile.last_name,
            preferred_language: profile.preferred_language,
            created_at: now,
            updated_at: now,
        };
        self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, "user created");
        Ok(user)
    }

    /// Email `user` a code. Callers hold the per-email lock.
    pub(crate) async fn issue_for(
        &self,
        user: User,
        account_created: bool,
        client: &ClientMetadata,
        refresh_url: Option<String>,
    ) -> Result<RequestCodeOutput, ApiError> {
        let locale = Locale::resolve(client.language.as_deref(), Some(&user), self.default_locale);

        if let Some(existing) = self.tokens.find_active(user.id).await? {
            self.notifier
                .send_login_code(&self.code_email(&user, &existing, locale, true, refresh_url))
                .await?;
            self.notify_admin(&user, &existing, account_created, true, client)
                .await;
            tracing::info!(user_id = %user.id, "resent existing login code");
            return Ok(RequestCodeOutput {
                valid_until: existing.expires_at,
                user,
                code_sent: false,
                existing_token_valid: true,
                resent_existing_token: true,
                account_created,
            });
        }

        let revoked = self.tokens.revoke_active(user.id).await?;
        let token = self.mint(user.id).await?;
        self.notifier
            .send_login_code(&self.code_email(&user, &token, locale, false, refresh_url))
            .await?;
        self.notify_admin(&user, &token, account_created, false, client)
            .await;
        tracing::info!(user_id = %user.id, revoked, "issued new login code");

        Ok(RequestCodeOutput {
            valid_until: token.expires_at,
            user,
            code_sent: true,
            existing_token_valid: false,
            resent_existing_token: false,
            account_created,
        })
    }

    async fn mint(&self, user_id: Uuid) -> Result<LoginToken, ApiError> {
        for _ in 0..MAX_CODE_INSERT_ATTEMPTS {
            let now = Utc::now();
            let token = LoginToken {
                id: Uuid::new_v4(),
                code: self.unique_code().await?,
                user_id,
                expires_at: now + self.ttl,
                consumed_at: None,
                revoked: false,
                created_at: now,
                updated_at: now,
            };
            if self.tokens.try_insert(&token).await? {
                return Ok(token);
            }
            tracing::warn!(%user_id, "login code collided on insert; regenerating");
        }
        Err(anyhow::anyhow!("could not allocate a unique login code").into())
    }

    async fn unique_code(&self) -> Result<String, ApiError> {
        for _ in 0..MAX_CODE_GENERATION_ATTEMPTS {
            let code = generate_code(LOGIN_CODE_LEN);
            if !self.tokens.code_exists(&code).await? {
                return Ok(code);
            }
        }
        tracing::warn!("short login codes exhausted; falling back to long code");
        Ok(generate_code(FALLBACK_LOGIN_CODE_LEN))
    }

    fn code_email(
        &self,
        user: &User,
        token: &LoginToken,
        locale: Locale,
        reminder: bool,
        refresh_url: Option<String>,
    ) -> LoginCodeEmail {
        LoginCodeEmail {
            to: user.email.clone(),
            recipient_name: user.first_name.clone(),
            code: token.code.clone(),
            expires_at: token.expires_at,
            locale,
            reminder,
            refresh_url,
        }
    }

    /// Audit mail to the site owner. Never fails the request.
    async fn notify_admin(
        &self,
        user: &User,
        token: &LoginToken,
        new_account: bool,
        reminder: bool,
        client: &ClientMetadata,
    ) {
        let notice = AdminLoginNotice {
            email: user.email.clone(),
            user_name: user.display_name(),
            new_account,
            reminder,
            expires_at: token.expires_at,
            client: client.clone(),
        };
        if let Err(e) = self.notifier.send_admin_login_notice(&notice).await {
            tracing::warn!(error = ?e, user_id = %user.id, "admin login notice failed");
        }
    }
}
