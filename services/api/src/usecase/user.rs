use crate::domain::repository::{LoginTokenRepository, NotificationPort, UserRepository};
use crate::domain::types::{ClientMetadata, ProfileUpdate, normalize_email};
use crate::error::ApiError;
use crate::usecase::login_code::{RequestCodeOutput, RequestCodeUseCase};

pub struct SignupInput {
    pub email: String,
    pub profile: ProfileUpdate,
    pub client: ClientMetadata,
    pub refresh_url: Option<String>,
}

/// Explicit account creation followed by the first login code.
///
/// The account is kept even when the first email fails; the caller recovers
/// through request-code, which is what the 409 on a retried signup points to.
pub struct SignupUseCase<U, T, N>
where
    U: UserRepository,
    T: LoginTokenRepository,
    N: NotificationPort,
{
    pub issuer: RequestCodeUseCase<U, T, N>,
}

impl<U, T, N> SignupUseCase<U, T, N>
where
    U: UserRepository,
    T: LoginTokenRepository,
    N: NotificationPort,
{
    pub async fn execute(&self, input: SignupInput) -> Result<RequestCodeOutput, ApiError> {
        let email = normalize_email(&input.email)?;
        let profile = input.profile.cleaned();

        let _guard = self.issuer.locks.lock(&email).await;

        if self.issuer.users.find_by_email(&email).await?.is_some() {
            return Err(ApiError::UserAlreadyExists);
        }
        let user = self.issuer.create_user(&email, profile).await?;

        self.issuer
            .issue_for(user, true, &input.client, input.refresh_url)
            .await
    }
}
