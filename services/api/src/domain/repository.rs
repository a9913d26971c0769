#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{
    AdminLoginNotice, ContactMessage, LoginCodeEmail, LoginToken, ProfileUpdate, User,
};
use crate::error::ApiError;

/// Repository for email-identified accounts.
pub trait UserRepository: Send + Sync {
    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;

    /// Insert a new user. Fails with `UserAlreadyExists` on a duplicate email.
    async fn create(&self, user: &User) -> Result<(), ApiError>;

    /// Write the present fields of `changes` and bump `updated_at`.
    async fn update_profile(&self, id: Uuid, changes: &ProfileUpdate) -> Result<User, ApiError>;
}

/// Repository for one-time login codes.
pub trait LoginTokenRepository: Send + Sync {
    /// The newest active (unrevoked, unconsumed, unexpired) code for a user.
    async fn find_active(&self, user_id: Uuid) -> Result<Option<LoginToken>, ApiError>;

    /// Revoke every unrevoked, unconsumed code of a user. Returns rows touched.
    async fn revoke_active(&self, user_id: Uuid) -> Result<u64, ApiError>;

    /// Whether any code record (in any state) already uses `code`.
    async fn code_exists(&self, code: &str) -> Result<bool, ApiError>;

    /// Insert a code. Returns `false` if the unique index on `code` rejected it.
    async fn try_insert(&self, token: &LoginToken) -> Result<bool, ApiError>;

    /// Find a non-revoked code record of `user_id` matching `code`, regardless of expiry.
    async fn find_unrevoked(
        &self,
        user_id: Uuid,
        code: &str,
    ) -> Result<Option<LoginToken>, ApiError>;

    /// Mark consumed + revoked. Returns `false` if it was already consumed or revoked.
    async fn consume(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Outbound notifications. One implementation per transport lives in `infra::mail`.
pub trait NotificationPort: Send + Sync {
    /// Primary path: failures must reach the caller.
    async fn send_login_code(&self, email: &LoginCodeEmail) -> Result<(), ApiError>;

    async fn send_admin_login_notice(&self, notice: &AdminLoginNotice) -> Result<(), ApiError>;

    async fn send_contact_notification(&self, message: &ContactMessage) -> Result<(), ApiError>;

    async fn send_contact_acknowledgement(&self, message: &ContactMessage)
    -> Result<(), ApiError>;
}
