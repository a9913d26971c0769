use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use folio_auth_types::bearer::SessionSecret;

use crate::config::ApiConfig;
use crate::infra::db::{DbLoginTokenRepository, DbUserRepository};
use crate::infra::locks::KeyedLocks;
use crate::infra::mail::{MailNotifier, MailTransport, NotifierConfig};
use crate::infra::rate_limit::FixedWindowLimiter;
use crate::usecase::contact::SendContactUseCase;
use crate::usecase::login_code::RequestCodeUseCase;
use crate::usecase::session::VerifyCodeUseCase;
use crate::usecase::user::SignupUseCase;

type Notifier = MailNotifier<MailTransport>;
type Issuer = RequestCodeUseCase<DbUserRepository, DbLoginTokenRepository, Notifier>;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<ApiConfig>,
    pub notifier: Notifier,
    pub session_secret: SessionSecret,
    pub locks: KeyedLocks,
    pub limiter: FixedWindowLimiter,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: ApiConfig, transport: MailTransport) -> Self {
        let notifier = MailNotifier::new(transport, NotifierConfig::from_config(&config));
        let limiter = FixedWindowLimiter::new(
            config.rate_limit_max_requests,
            Duration::from_secs(config.rate_limit_window_secs),
        );
        Self {
            db,
            session_secret: SessionSecret(Arc::from(config.jwt_secret.as_str())),
            config: Arc::new(config),
            notifier,
            locks: KeyedLocks::new(),
            limiter,
        }
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn login_token_repo(&self) -> DbLoginTokenRepository {
        DbLoginTokenRepository {
            db: self.db.clone(),
        }
    }

    fn code_ttl(&self) -> chrono::Duration {
        self.config.login_code_ttl()
    }

    pub fn request_code_usecase(&self) -> Issuer {
        RequestCodeUseCase {
            users: self.user_repo(),
            tokens: self.login_token_repo(),
            notifier: self.notifier.clone(),
            locks: self.locks.clone(),
            ttl: self.code_ttl(),
            default_locale: self.config.default_locale(),
        }
    }

    pub fn verify_code_usecase(
        &self,
    ) -> VerifyCodeUseCase<DbUserRepository, DbLoginTokenRepository> {
        VerifyCodeUseCase {
            users: self.user_repo(),
            tokens: self.login_token_repo(),
            jwt_secret: self.config.jwt_secret.clone(),
            session_ttl: self.code_ttl(),
        }
    }

    pub fn signup_usecase(
        &self,
    ) -> SignupUseCase<DbUserRepository, DbLoginTokenRepository, Notifier> {
        SignupUseCase {
            issuer: self.request_code_usecase(),
        }
    }

    pub fn contact_usecase(&self) -> SendContactUseCase<Notifier> {
        SendContactUseCase {
            notifier: self.notifier.clone(),
            default_locale: self.config.default_locale(),
        }
    }
}

impl FromRef<AppState> for SessionSecret {
    fn from_ref(state: &AppState) -> Self {
        state.session_secret.clone()
    }
}
