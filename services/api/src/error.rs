use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header::RETRY_AFTER};
use axum::response::{IntoResponse, Response};

/// API service error variants. Messages are user-facing (Polish).
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Nie znaleziono konta. Podaj imię i nazwisko, aby je utworzyć.")]
    ProfileRequired,
    #[error("Konto z tym adresem e-mail już istnieje. Poproś o kod logowania.")]
    UserAlreadyExists,
    /// Unknown email and wrong code share this variant so callers cannot probe accounts.
    #[error("Nieprawidłowy kod lub e-mail.")]
    InvalidCode,
    #[error("Kod został już wykorzystany.")]
    CodeAlreadyUsed,
    #[error("Kod wygasł. Poproś o nowy.")]
    CodeExpired,
    #[error("Zbyt wiele żądań. Spróbuj ponownie później.")]
    RateLimited { retry_after: u64 },
    #[error("Wystąpił błąd serwera.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::ProfileRequired => "PROFILE_REQUIRED",
            Self::UserAlreadyExists => "USER_ALREADY_EXISTS",
            Self::InvalidCode => "INVALID_CODE",
            Self::CodeAlreadyUsed => "CODE_ALREADY_USED",
            Self::CodeExpired => "CODE_EXPIRED",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Malformed, incomplete or non-JSON bodies are plain validation failures.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejected request body");
        Self::validation("Nieprawidłowe dane żądania.")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ProfileRequired => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidCode | Self::CodeAlreadyUsed | Self::CodeExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // TraceLayer already records every status; only 500s carry a cause worth logging.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = ?e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        let mut response = (status, axum::Json(body)).into_response();
        if let Self::RateLimited { retry_after } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(RETRY_AFTER, value);
            }
        }
        response
    }
}
